use std::cell::OnceCell;

use nova_types::{
    array_element_type, ClassId, Diagnostic, Nullability, Substitution, Type, TypeEnv,
};

use crate::erasure::{ErasedSignature, SignatureMapper};
use crate::heuristics;
use crate::options::PropagationOptions;
use crate::signature::{MemberSignature, ValueParameter};

pub const INCOMPATIBLE_SUPER_METHODS: &str = "incompatible-super-methods";

/// A member of a supertype with the same simple name, expressed in the subclass's terms (type
/// arguments of the inheritance edge already substituted).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupertypeCandidate {
    pub owner: ClassId,
    /// Fully qualified name of `owner`; the sort key for deterministic merging.
    pub owner_name: String,
    pub signature: MemberSignature,
    /// `suspend` members never take part in propagation.
    pub is_suspend: bool,
}

/// Merges a member signature with the super members it overrides.
///
/// Never fails: problems become diagnostics and a best-effort signature is still produced.
pub struct OverrideReconciler<'a> {
    env: &'a dyn TypeEnv,
    mapper: &'a SignatureMapper,
    options: PropagationOptions,
}

/// One overridden parameter slot of one candidate, aligned with the member's parameter list.
struct SuperSlot<'c> {
    ty: Type,
    is_vararg: bool,
    /// `None` for a receiver that lines up with an ordinary parameter.
    name: Option<&'c str>,
    stable_name: bool,
}

impl<'a> OverrideReconciler<'a> {
    pub fn new(env: &'a dyn TypeEnv, options: PropagationOptions) -> Self {
        Self::with_mapper(env, SignatureMapper::shared(), options)
    }

    pub fn with_mapper(
        env: &'a dyn TypeEnv,
        mapper: &'a SignatureMapper,
        options: PropagationOptions,
    ) -> Self {
        Self {
            env,
            mapper,
            options,
        }
    }

    /// Candidates that `member` overrides: same name, same erased signature, not `suspend`.
    /// Sorted by owner name.
    pub fn select_relevant<'c>(
        &self,
        member: &MemberSignature,
        candidates: &'c [SupertypeCandidate],
    ) -> Vec<&'c SupertypeCandidate> {
        let erased: OnceCell<ErasedSignature> = OnceCell::new();
        let mut relevant: Vec<&SupertypeCandidate> = candidates
            .iter()
            .filter(|candidate| candidate.signature.name == member.name && !candidate.is_suspend)
            .filter(|candidate| {
                let ours = erased.get_or_init(|| self.mapper.erase_signature(self.env, member));
                self.mapper.erase_signature(self.env, &candidate.signature) == *ours
            })
            .collect();
        relevant.sort_by(|a, b| a.owner_name.cmp(&b.owner_name));
        relevant
    }

    pub fn reconcile_with_supertypes(
        &self,
        member: &MemberSignature,
        containing_class: ClassId,
        candidates: &[SupertypeCandidate],
    ) -> (MemberSignature, Vec<Diagnostic>) {
        let relevant = self.select_relevant(member, candidates);
        let mut diagnostics = Vec::new();
        let mut result = member.clone();

        tracing::debug!(
            target: "nova.signatures.reconcile",
            member = %member.name,
            candidates = candidates.len(),
            relevant = relevant.len(),
            "selected super candidates"
        );

        if relevant.is_empty() {
            result.has_stable_parameter_names = false;
            return (result, diagnostics);
        }

        // Candidates viewed in terms of the member's own type parameters.
        let supers: Vec<(MemberSignature, &SupertypeCandidate)> = relevant
            .iter()
            .map(|candidate| {
                let subst = candidate
                    .signature
                    .type_param_substitution(member)
                    .unwrap_or_else(Substitution::new);
                (candidate.signature.substitute(&subst), *candidate)
            })
            .collect();

        self.promote_extension_receiver(&mut result, &supers, &mut diagnostics);

        for idx in 0..result.value_params.len() {
            let slots: Vec<SuperSlot<'_>> = supers
                .iter()
                .filter_map(|(signature, candidate)| {
                    super_slot(&result, signature, candidate.signature.has_stable_parameter_names, idx)
                })
                .collect();
            if slots.is_empty() {
                continue;
            }
            let param = &mut result.value_params[idx];
            self.unify_vararg(param, &slots, &mut diagnostics);

            if let Some(name) = slots
                .iter()
                .find(|slot| slot.stable_name)
                .and_then(|slot| slot.name)
            {
                param.name = name.to_string();
            }

            let slot_types: Vec<Type> = slots.iter().map(|slot| slot.ty.clone()).collect();
            if let Some(fixed) =
                heuristics::raw_type_fix(self.env, containing_class, &param.ty, &slot_types)
            {
                param.ty = Type::type_var(fixed);
            }
            param.ty = propagate_parameter_nullability(&param.ty, &slot_types);
        }

        for (idx, type_param) in result.type_params.iter_mut().enumerate() {
            for (bound_idx, bound) in type_param.upper_bounds.iter_mut().enumerate() {
                let super_bounds: Vec<Type> = supers
                    .iter()
                    .filter_map(|(signature, _)| {
                        signature.type_params.get(idx)?.upper_bounds.get(bound_idx).cloned()
                    })
                    .collect();
                if !super_bounds.is_empty() {
                    *bound = propagate_parameter_nullability(bound, &super_bounds);
                }
            }
        }

        if let Some(return_type) = &result.return_type {
            let super_returns: Vec<Type> = supers
                .iter()
                .filter_map(|(signature, _)| signature.return_type.clone())
                .collect();
            if !super_returns.is_empty() {
                let propagated = propagate_return_nullability(return_type, &super_returns);
                diagnostics.extend(heuristics::array_return_covariance(
                    self.env,
                    &propagated,
                    &super_returns,
                ));
                result.return_type = Some(propagated);
            }
        }

        result.has_stable_parameter_names = relevant
            .iter()
            .any(|candidate| candidate.signature.has_stable_parameter_names);

        (result, diagnostics)
    }

    fn promote_extension_receiver(
        &self,
        result: &mut MemberSignature,
        supers: &[(MemberSignature, &SupertypeCandidate)],
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if result.receiver.is_some() {
            return;
        }
        let extensions = supers
            .iter()
            .filter(|(signature, _)| signature.receiver.is_some())
            .count();
        if extensions == 0 {
            return;
        }
        if extensions < supers.len() {
            if !self.options.platform_types {
                diagnostics.push(Diagnostic::error(
                    INCOMPATIBLE_SUPER_METHODS,
                    "Incompatible super methods: some are extension functions, some are not",
                ));
            }
            return;
        }
        if result.value_params.is_empty() {
            return;
        }

        let receiver = result.value_params.remove(0);
        result.receiver = Some(receiver.ty);
        for (index, param) in result.value_params.iter_mut().enumerate() {
            param.index = index;
        }
    }

    fn unify_vararg(
        &self,
        param: &mut ValueParameter,
        slots: &[SuperSlot<'_>],
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let varargs = slots.iter().filter(|slot| slot.is_vararg).count();
        if varargs > 0 && varargs < slots.len() {
            diagnostics.push(Diagnostic::error(
                INCOMPATIBLE_SUPER_METHODS,
                "Incompatible super methods: some have vararg parameter, some have not",
            ));
            return;
        }

        let all_vararg = varargs == slots.len();
        if all_vararg && !param.is_vararg() {
            let Some(element) = array_element_type(self.env, &param.ty) else {
                debug_assert!(false, "vararg conversion of a non-array parameter");
                return;
            };
            param.ty = param.ty.not_null();
            param.vararg_element = Some(element);
        } else if !all_vararg && param.is_vararg() {
            param.ty = param.ty.nullable();
            param.vararg_element = None;
        }
    }
}

/// Slot `idx` of `candidate`, accounting for a receiver that the member kept as a parameter.
fn super_slot<'c>(
    member: &MemberSignature,
    candidate: &'c MemberSignature,
    stable_names: bool,
    idx: usize,
) -> Option<SuperSlot<'c>> {
    let offset = match (&member.receiver, &candidate.receiver) {
        (None, Some(receiver)) => {
            if candidate.value_params.len() + 1 != member.value_params.len() {
                return None;
            }
            if idx == 0 {
                return Some(SuperSlot {
                    ty: receiver.clone(),
                    is_vararg: false,
                    name: None,
                    stable_name: false,
                });
            }
            1
        }
        _ => {
            if candidate.value_params.len() != member.value_params.len() {
                return None;
            }
            0
        }
    };
    let param = candidate.value_params.get(idx - offset)?;
    Some(SuperSlot {
        ty: param.ty.clone(),
        is_vararg: param.is_vararg(),
        name: Some(param.name.as_str()),
        stable_name: stable_names,
    })
}

/// A platform parameter type becomes not-null when every super type is not-null and nullable
/// when any is nullable.
fn propagate_parameter_nullability(ty: &Type, super_types: &[Type]) -> Type {
    if ty.nullability() != Nullability::Flexible {
        return ty.clone();
    }
    if super_types
        .iter()
        .all(|super_ty| super_ty.nullability() == Nullability::NotNull)
    {
        ty.not_null()
    } else if super_types
        .iter()
        .any(|super_ty| super_ty.nullability() == Nullability::Nullable)
    {
        ty.nullable()
    } else {
        ty.clone()
    }
}

/// A platform return type becomes not-null when any super return is not-null and nullable when
/// all are nullable.
fn propagate_return_nullability(ty: &Type, super_types: &[Type]) -> Type {
    if ty.nullability() != Nullability::Flexible {
        return ty.clone();
    }
    if super_types
        .iter()
        .any(|super_ty| super_ty.nullability() == Nullability::NotNull)
    {
        ty.not_null()
    } else if super_types
        .iter()
        .all(|super_ty| super_ty.nullability() == Nullability::Nullable)
    {
        ty.nullable()
    } else {
        ty.clone()
    }
}
