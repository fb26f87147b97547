use std::collections::HashMap;

use nova_alt_signature::{TypeArgNode, TypeNode};
use nova_types::{
    format_type, platform_analogs, ClassId, ClassType, Nullability, Type, TypeArg, TypeEnv,
    TypeParamId, Variance,
};

use crate::error::{MatchError, TypeUsage};
use crate::options::PropagationOptions;

/// Structural comparison of an inferred type against an alternative-signature type node.
///
/// The result keeps the inferred declarations and takes nullability and projections from the
/// alternative, so the refined type never changes the member's erasure.
pub struct TypeMatcher<'a> {
    env: &'a dyn TypeEnv,
    options: PropagationOptions,
    /// Alternative-signature names of the member's own type parameters.
    renamed: &'a HashMap<TypeParamId, String>,
}

impl<'a> TypeMatcher<'a> {
    pub fn new(
        env: &'a dyn TypeEnv,
        options: PropagationOptions,
        renamed: &'a HashMap<TypeParamId, String>,
    ) -> Self {
        Self {
            env,
            options,
            renamed,
        }
    }

    pub fn reconcile(
        &self,
        alt: &TypeNode,
        inferred: &Type,
        usage: TypeUsage,
    ) -> Result<Type, MatchError> {
        if inferred.is_error() {
            return Ok(Type::Error);
        }

        let result = match alt {
            TypeNode::Nullable(inner) => {
                if usage != TypeUsage::TypeArgument
                    && inferred.nullability() == Nullability::NotNull
                {
                    return Err(MatchError::Mismatch(format!(
                        "Auto type '{}' is not-null, while type in alternative signature is nullable: '{}'",
                        format_type(self.env, inferred),
                        alt.render(),
                    )));
                }
                self.reconcile(inner, inferred, usage)?.nullable()
            }
            TypeNode::Reference(reference) => {
                self.reconcile_named(&reference.qualified_name(), &reference.args, alt, inferred)?
            }
            TypeNode::Function(function) => self.reconcile_named(
                &function.interface_name(),
                &function.interface_args(),
                alt,
                inferred,
            )?,
            TypeNode::SelfType { .. } => {
                return Err(MatchError::NotSupported(
                    "Self-types are not supported yet".to_string(),
                ));
            }
        };

        tracing::trace!(
            target: "nova.signatures",
            alternative = %alt.render(),
            inferred = %format_type(self.env, inferred),
            result = %format_type(self.env, &result),
            "matched type"
        );
        Ok(result)
    }

    fn reconcile_named(
        &self,
        name: &str,
        args: &[TypeArgNode],
        alt: &TypeNode,
        inferred: &Type,
    ) -> Result<Type, MatchError> {
        match inferred {
            Type::Error => Ok(Type::Error),
            Type::TypeVar(var) => {
                let expected = self.type_param_name(var.id);
                if args.is_empty() && expected.as_deref() == Some(name) {
                    Ok(Type::type_var(var.id))
                } else {
                    Err(self.name_mismatch(alt, inferred))
                }
            }
            Type::Class(class) => {
                let target = self
                    .matching_class(name, class.def)
                    .ok_or_else(|| self.name_mismatch(alt, inferred))?;

                if args.len() != class.args.len() {
                    if self.options.platform_types {
                        return Ok(inferred.clone());
                    }
                    return Err(MatchError::Mismatch(format!(
                        "'{}' type in method signature has {} type arguments, while '{}' in alternative signature has {} of them",
                        format_type(self.env, inferred),
                        class.args.len(),
                        alt.render(),
                        args.len(),
                    )));
                }

                let args = self.reconcile_args(args, class, target)?;
                Ok(Type::Class(ClassType {
                    def: target,
                    args,
                    nullability: Nullability::NotNull,
                }))
            }
        }
    }

    fn reconcile_args(
        &self,
        alt_args: &[TypeArgNode],
        inferred: &ClassType,
        target: ClassId,
    ) -> Result<Vec<TypeArg>, MatchError> {
        let inferred_params = self.class_type_params(inferred.def);
        let target_params = self.class_type_params(target);
        let target_name = self
            .env
            .class(target)
            .map(|def| def.name.clone())
            .unwrap_or_default();

        let mut out = Vec::with_capacity(alt_args.len());
        for (idx, (alt_arg, inferred_arg)) in alt_args.iter().zip(&inferred.args).enumerate() {
            let TypeArgNode::Projected {
                variance: alt_variance,
                ty: alt_ty,
            } = alt_arg
            else {
                out.push(inferred_arg.clone());
                continue;
            };

            let (inferred_variance, inferred_ty) = match inferred_arg {
                TypeArg::Projected { variance, ty } => (*variance, ty.clone()),
                TypeArg::Star => (
                    Variance::Out,
                    self.first_bound(inferred_params.get(idx).copied()),
                ),
            };

            let ty = self.reconcile(alt_ty, &inferred_ty, TypeUsage::TypeArgument)?;
            let declared = target_params
                .get(idx)
                .and_then(|id| self.env.type_param(*id))
                .map(|def| def.variance)
                .unwrap_or(Variance::Invariant);
            let variance =
                self.reconcile_projection(*alt_variance, inferred_variance, declared, &target_name)?;
            out.push(TypeArg::Projected { variance, ty });
        }
        Ok(out)
    }

    fn reconcile_projection(
        &self,
        alt: Variance,
        inferred: Variance,
        declared: Variance,
        class_name: &str,
    ) -> Result<Variance, MatchError> {
        if alt != inferred
            && inferred != Variance::Invariant
            && !(alt == Variance::Invariant && declared == inferred)
        {
            return Err(MatchError::Mismatch(format!(
                "Projection kind mismatch, actual: {inferred}, in alternative signature: {alt}"
            )));
        }
        if alt != Variance::Invariant && alt == declared {
            if self.options.strict_projections {
                return Err(MatchError::Mismatch(format!(
                    "Projection kind '{alt}' is conflicting with variance of {class_name}"
                )));
            }
            return Ok(inferred);
        }
        Ok(alt)
    }

    /// The class an alternative name denotes when matched against `inferred`: the inferred
    /// class itself, or one of its platform analogs.
    fn matching_class(&self, name: &str, inferred: ClassId) -> Option<ClassId> {
        let fq_name = &self.env.class(inferred)?.name;
        if names_match(name, fq_name) {
            return Some(inferred);
        }
        platform_analogs(fq_name)
            .find(|analog| names_match(name, analog))
            .and_then(|analog| self.env.lookup_class(analog))
    }

    fn type_param_name(&self, id: TypeParamId) -> Option<String> {
        self.renamed
            .get(&id)
            .cloned()
            .or_else(|| self.env.type_param(id).map(|def| def.name.clone()))
    }

    fn class_type_params(&self, id: ClassId) -> Vec<TypeParamId> {
        self.env
            .class(id)
            .map(|def| def.type_params.clone())
            .unwrap_or_default()
    }

    fn first_bound(&self, param: Option<TypeParamId>) -> Type {
        param
            .and_then(|id| self.env.type_param(id))
            .and_then(|def| def.upper_bounds.first().cloned())
            .unwrap_or_else(|| self.env.default_upper_bound())
    }

    fn name_mismatch(&self, alt: &TypeNode, inferred: &Type) -> MatchError {
        MatchError::Mismatch(format!(
            "Alternative signature type mismatch, expected: {}, actual: {}",
            alt.render(),
            format_type(self.env, inferred),
        ))
    }
}

/// `name` as written (simple or qualified) denotes `fq_name`.
fn names_match(name: &str, fq_name: &str) -> bool {
    name == fq_name
        || fq_name
            .strip_suffix(name)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
