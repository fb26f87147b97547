use std::collections::HashMap;

use nova_alt_signature::{parse_alternative_signature, FunctionDecl, TypeNode, TypeReference};
use nova_types::{
    format_type, is_default_upper_bound, is_subtype, types_equivalent, ClassId, Type, TypeArg,
    TypeEnv, TypeParamId,
};

use crate::error::{MatchError, MismatchError, SignatureError, Slot, TypeUsage};
use crate::matcher::TypeMatcher;
use crate::options::PropagationOptions;
use crate::signature::{
    MemberKind, MemberSignature, TypeParameter, TypeParameterBuilder, ValueParameter,
};

/// Applies an alternative signature to a member's inferred signature.
///
/// All or nothing: either every slot reconciles and the refined signature is returned, or the
/// caller keeps the inferred one and reports the errors.
pub struct SignatureBuilder<'a> {
    env: &'a dyn TypeEnv,
    options: PropagationOptions,
}

impl<'a> SignatureBuilder<'a> {
    pub fn new(env: &'a dyn TypeEnv, options: PropagationOptions) -> Self {
        Self { env, options }
    }

    /// `overridden` are the super members `auto` overrides, already in the subclass's terms.
    pub fn build(
        &self,
        auto: &MemberSignature,
        containing_class: ClassId,
        alternative: Option<&str>,
        overridden: &[&MemberSignature],
    ) -> Result<MemberSignature, SignatureError> {
        let Some(text) = alternative else {
            return Ok(auto.clone());
        };

        let decl = parse_alternative_signature(text)?;
        if decl.receiver.is_some() {
            return Err(SignatureError::NotSupported(
                "Extension functions are not supported yet".to_string(),
            ));
        }

        let expected = self.expected_name(auto, containing_class);
        if decl.name != expected {
            return Err(SignatureError::NameMismatch {
                expected,
                actual: decl.name.clone(),
            });
        }
        if decl.params.len() != auto.value_params.len() {
            return Err(SignatureError::ValueParameterCount {
                expected: auto.value_params.len(),
                actual: decl.params.len(),
            });
        }
        if decl.type_params.len() != auto.type_params.len() {
            return Err(SignatureError::TypeParameterCount {
                expected: auto.type_params.len(),
                actual: decl.type_params.len(),
            });
        }

        let renamed: HashMap<TypeParamId, String> = auto
            .type_params
            .iter()
            .zip(&decl.type_params)
            .map(|(auto_param, alt_param)| (auto_param.id, alt_param.name.clone()))
            .collect();
        let matcher = TypeMatcher::new(self.env, self.options, &renamed);
        let mut errors = Vec::new();

        let type_params = self.build_type_params(auto, &decl, &matcher, &mut errors)?;
        let value_params = self.build_value_params(auto, &decl, &matcher, &mut errors)?;
        let return_type = self.build_return_type(auto, &decl, &matcher, &mut errors)?;

        if !errors.is_empty() {
            return Err(SignatureError::Mismatch(errors));
        }

        let built = MemberSignature {
            kind: auto.kind,
            name: auto.name.clone(),
            receiver: auto.receiver.clone(),
            value_params,
            type_params,
            return_type,
            has_stable_parameter_names: auto.has_stable_parameter_names,
        };

        if self.options.check_overrides && !self.options.platform_types && !overridden.is_empty() {
            let errors = self.check_overrides(&built, overridden);
            if !errors.is_empty() {
                return Err(SignatureError::Mismatch(errors));
            }
        }

        tracing::debug!(
            target: "nova.signatures",
            member = %built.name,
            "applied alternative signature"
        );
        Ok(built)
    }

    fn expected_name(&self, auto: &MemberSignature, containing_class: ClassId) -> String {
        match auto.kind {
            MemberKind::Method => auto.name.clone(),
            MemberKind::Constructor => self
                .env
                .class(containing_class)
                .map(|def| def.simple_name().to_string())
                .unwrap_or_else(|| auto.name.clone()),
        }
    }

    fn build_type_params(
        &self,
        auto: &MemberSignature,
        decl: &FunctionDecl,
        matcher: &TypeMatcher<'_>,
        errors: &mut Vec<MismatchError>,
    ) -> Result<Vec<TypeParameter>, SignatureError> {
        let mut out = Vec::with_capacity(auto.type_params.len());
        for (idx, (auto_param, alt_param)) in auto.type_params.iter().zip(&decl.type_params).enumerate()
        {
            let slot = Slot::TypeParameter(idx);
            let alt_bounds = decl.bounds_of(alt_param);
            let mut builder = TypeParameterBuilder::new(
                auto_param.id,
                auto_param.index,
                alt_param.name.clone(),
                auto_param.variance,
            );

            if alt_bounds.is_empty()
                && auto_param.upper_bounds.len() == 1
                && is_default_upper_bound(self.env, &auto_param.upper_bounds[0])
            {
                builder.add_upper_bound(self.env.default_upper_bound());
            } else if alt_bounds.len() != auto_param.upper_bounds.len() {
                errors.push(MismatchError::new(
                    slot,
                    format!(
                        "Upper bound number mismatch for {}. Expected {}, but found {}",
                        alt_param.name,
                        auto_param.upper_bounds.len(),
                        alt_bounds.len(),
                    ),
                ));
                for bound in &auto_param.upper_bounds {
                    builder.add_upper_bound(bound.clone());
                }
            } else {
                for (alt_bound, auto_bound) in alt_bounds.iter().zip(&auto_param.upper_bounds) {
                    let bound = collect(
                        matcher.reconcile(alt_bound, auto_bound, TypeUsage::UpperBound),
                        auto_bound,
                        slot,
                        errors,
                    )?;
                    builder.add_upper_bound(bound);
                }
            }
            out.push(builder.build(self.env));
        }
        Ok(out)
    }

    fn build_value_params(
        &self,
        auto: &MemberSignature,
        decl: &FunctionDecl,
        matcher: &TypeMatcher<'_>,
        errors: &mut Vec<MismatchError>,
    ) -> Result<Vec<ValueParameter>, SignatureError> {
        let mut out = Vec::with_capacity(auto.value_params.len());
        for (idx, (auto_param, alt_param)) in auto.value_params.iter().zip(&decl.params).enumerate() {
            let slot = Slot::ValueParameter(idx);
            if auto_param.is_vararg() != alt_param.is_vararg {
                let message = if auto_param.is_vararg() {
                    "Parameter in method signature is vararg, but in alternative signature it is not"
                } else {
                    "Parameter in method signature is not vararg, but in alternative signature it is"
                };
                errors.push(MismatchError::new(slot, message));
                out.push(auto_param.clone());
                continue;
            }

            let param = match &auto_param.vararg_element {
                Some(element) => {
                    let element = collect(
                        matcher.reconcile(&alt_param.ty, element, TypeUsage::MemberSignatureContravariant),
                        element,
                        slot,
                        errors,
                    )?;
                    ValueParameter {
                        name: alt_param.name.clone(),
                        ty: self.vararg_array_type(&auto_param.ty, &element),
                        vararg_element: Some(element),
                        ..auto_param.clone()
                    }
                }
                None => {
                    let ty = collect(
                        matcher.reconcile(
                            &alt_param.ty,
                            &auto_param.ty,
                            TypeUsage::MemberSignatureContravariant,
                        ),
                        &auto_param.ty,
                        slot,
                        errors,
                    )?;
                    ValueParameter {
                        name: alt_param.name.clone(),
                        ty,
                        ..auto_param.clone()
                    }
                }
            };
            out.push(param);
        }
        Ok(out)
    }

    fn build_return_type(
        &self,
        auto: &MemberSignature,
        decl: &FunctionDecl,
        matcher: &TypeMatcher<'_>,
        errors: &mut Vec<MismatchError>,
    ) -> Result<Option<Type>, SignatureError> {
        let (MemberKind::Method, Some(auto_return)) = (auto.kind, &auto.return_type) else {
            return Ok(auto.return_type.clone());
        };

        let unit;
        let alt_return = match &decl.return_type {
            Some(node) => node,
            None => {
                unit = TypeNode::Reference(TypeReference {
                    segments: vec!["Unit".to_string()],
                    args: Vec::new(),
                    span: decl.name_span.clone(),
                });
                &unit
            }
        };
        let ty = collect(
            matcher.reconcile(alt_return, auto_return, TypeUsage::MemberSignatureCovariant),
            auto_return,
            Slot::ReturnType,
            errors,
        )?;
        Ok(Some(ty))
    }

    /// The parameter type for a reconciled vararg element: a primitive array stays as inferred,
    /// anything else becomes `Array<out E>`.
    fn vararg_array_type(&self, auto_array: &Type, element: &Type) -> Type {
        let is_primitive_array = auto_array
            .class_id()
            .and_then(|id| self.env.primitive_array_element(id))
            .is_some_and(|primitive| element.class_id() == Some(primitive));
        if is_primitive_array {
            return auto_array.not_null();
        }
        Type::class(self.env.well_known().array, vec![TypeArg::out(element.clone())])
    }

    fn check_overrides(
        &self,
        built: &MemberSignature,
        overridden: &[&MemberSignature],
    ) -> Vec<MismatchError> {
        let mut errors = Vec::new();
        for super_member in overridden {
            let Some(subst) = super_member.type_param_substitution(built) else {
                continue;
            };
            let super_member = super_member.substitute(&subst);

            let super_params: Vec<&Type> = super_member
                .receiver
                .iter()
                .chain(super_member.value_params.iter().map(|param| &param.ty))
                .collect();
            if super_params.len() == built.value_params.len() {
                for (idx, (param, super_ty)) in built.value_params.iter().zip(super_params).enumerate()
                {
                    if !types_equivalent(&param.ty, super_ty) {
                        errors.push(MismatchError::new(
                            Slot::ValueParameter(idx),
                            format!(
                                "Parameter type changed for method which overrides another: {}, was: {}",
                                format_type(self.env, &param.ty),
                                format_type(self.env, super_ty),
                            ),
                        ));
                    }
                }
            }

            for (idx, (param, super_param)) in
                built.type_params.iter().zip(&super_member.type_params).enumerate()
            {
                let equivalent = param.upper_bounds.len() == super_param.upper_bounds.len()
                    && param
                        .upper_bounds
                        .iter()
                        .zip(&super_param.upper_bounds)
                        .all(|(ours, theirs)| types_equivalent(ours, theirs));
                if !equivalent {
                    errors.push(MismatchError::new(
                        Slot::TypeParameter(idx),
                        format!(
                            "Type parameter's upper bound changed for method which overrides another: {}, was: {}",
                            self.format_bounds(&param.upper_bounds),
                            self.format_bounds(&super_param.upper_bounds),
                        ),
                    ));
                }
            }

            if let (Some(ours), Some(theirs)) = (&built.return_type, &super_member.return_type) {
                if !is_subtype(self.env, ours, theirs) {
                    errors.push(MismatchError::new(
                        Slot::ReturnType,
                        format!(
                            "Return type is changed to not subtype for method which overrides another: {}, was: {}",
                            format_type(self.env, ours),
                            format_type(self.env, theirs),
                        ),
                    ));
                }
            }
        }
        errors
    }

    fn format_bounds(&self, bounds: &[Type]) -> String {
        bounds
            .iter()
            .map(|bound| format_type(self.env, bound))
            .collect::<Vec<_>>()
            .join(" & ")
    }
}

/// Record an accumulating mismatch (keeping `fallback` in the slot) or abort on an unsupported
/// construct.
fn collect(
    result: Result<Type, MatchError>,
    fallback: &Type,
    slot: Slot,
    errors: &mut Vec<MismatchError>,
) -> Result<Type, SignatureError> {
    match result {
        Ok(ty) => Ok(ty),
        Err(MatchError::Mismatch(message)) => {
            errors.push(MismatchError::new(slot, message));
            Ok(fallback.clone())
        }
        Err(MatchError::NotSupported(message)) => Err(SignatureError::NotSupported(message)),
    }
}
