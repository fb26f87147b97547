//! Narrow fix-ups applied while merging a member with the members it overrides.

use nova_types::{
    array_element_type, format_type, is_subtype, types_equivalent, ClassId, Diagnostic, Type,
    TypeArg, TypeEnv, TypeParamId, TypeParamOwner, Variance,
};

pub const ARRAY_RETURN_COVARIANCE: &str = "array-return-covariance";

/// Java arrays are covariant, Kotlin's are not: a Java override returning `String[]` for a
/// super method returning `Object[]` loads as `Array<String>` vs `Array<Any>`, which is not an
/// override in Kotlin. Suggest the annotation that would fix the super method.
pub fn array_return_covariance(
    env: &dyn TypeEnv,
    return_type: &Type,
    super_return_types: &[Type],
) -> Option<Diagnostic> {
    let element = invariant_array_element(env, return_type)?;

    super_return_types.iter().find_map(|super_return| {
        let super_element = invariant_array_element(env, super_return)?;
        if types_equivalent(&element, &super_element) || !is_subtype(env, &element, &super_element)
        {
            return None;
        }

        let suggested = Type::class(env.well_known().array, vec![TypeArg::out(super_element)])
            .with_nullability(super_return.nullability());
        tracing::debug!(
            target: "nova.signatures.reconcile",
            return_type = %format_type(env, return_type),
            "array return covariance"
        );
        Some(Diagnostic::warning(
            ARRAY_RETURN_COVARIANCE,
            format!(
                "Return type is not a subtype of overridden method. To fix it, add annotation with Kotlin signature to super method with type {} replaced with {} in return type",
                format_type(env, super_return),
                format_type(env, &suggested),
            ),
        ))
    })
}

fn invariant_array_element(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    match ty {
        Type::Class(class) if class.def == env.well_known().array => match class.args.first()? {
            TypeArg::Projected {
                variance: Variance::Invariant,
                ..
            } => array_element_type(env, ty),
            _ => None,
        },
        _ => None,
    }
}

/// A raw supertype (`class Sub<T> : Super`) leaves `Super.foo(t: T)` loaded on the subclass as
/// `foo(o: Any!)`. When every overridden slot is that same class type parameter, return the
/// type parameter the slot should be typed with.
pub fn raw_type_fix(
    env: &dyn TypeEnv,
    containing_class: ClassId,
    auto_type: &Type,
    super_slot_types: &[Type],
) -> Option<TypeParamId> {
    if auto_type.class_id() != Some(env.well_known().any) || !auto_type.args().is_empty() {
        return None;
    }

    let param = super_slot_types.first()?.type_param_id()?;
    if !super_slot_types
        .iter()
        .all(|ty| ty.type_param_id() == Some(param))
    {
        return None;
    }

    let def = env.type_param(param)?;
    let TypeParamOwner::Class(owner) = def.owner else {
        return None;
    };

    let containing = env.class(containing_class)?;
    let same_name = containing.type_params.iter().copied().find(|id| {
        env.type_param(*id)
            .is_some_and(|candidate| candidate.name == def.name)
    });
    let fixed = match same_name {
        Some(id) => Some(id),
        None if owner == containing_class => Some(param),
        None => None,
    };

    if fixed.is_some() {
        tracing::debug!(
            target: "nova.signatures.reconcile",
            type_param = %def.name,
            "raw type fix-up"
        );
    }
    fixed
}
