use std::collections::{HashSet, VecDeque};

use crate::{
    ClassType, Nullability, Substitution, Type, TypeArg, TypeEnv, TypeParamId, Variance,
};

/// `Type::class(any).nullable()` or a platform `Any!`: the bound every type parameter has when
/// nothing else is declared.
pub fn is_default_upper_bound(env: &dyn TypeEnv, ty: &Type) -> bool {
    ty.class_id() == Some(env.well_known().any) && ty.args().is_empty() && ty.nullability().admits_null()
}

/// Structural equality where platform (flexible) nullability is compatible with either
/// explicit nullability.
pub fn types_equivalent(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Error, _) | (_, Type::Error) => true,
        (Type::TypeVar(a), Type::TypeVar(b)) => {
            a.id == b.id && nullability_equivalent(a.nullability, b.nullability)
        }
        (Type::Class(a), Type::Class(b)) => {
            a.def == b.def
                && nullability_equivalent(a.nullability, b.nullability)
                && a.args.len() == b.args.len()
                && a.args.iter().zip(&b.args).all(|(a, b)| args_equivalent(a, b))
        }
        _ => false,
    }
}

fn nullability_equivalent(a: Nullability, b: Nullability) -> bool {
    a == b || a == Nullability::Flexible || b == Nullability::Flexible
}

fn args_equivalent(a: &TypeArg, b: &TypeArg) -> bool {
    match (a, b) {
        (TypeArg::Star, TypeArg::Star) => true,
        (
            TypeArg::Projected { variance: va, ty: ta },
            TypeArg::Projected { variance: vb, ty: tb },
        ) => va == vb && types_equivalent(ta, tb),
        _ => false,
    }
}

/// The substitution that maps `supertype`'s class type parameters to its arguments.
///
/// Raw occurrences (no arguments at all) produce an empty substitution, leaving the
/// supertype's own type parameters in place.
pub fn supertype_substitution(env: &dyn TypeEnv, supertype: &ClassType) -> Substitution {
    let Some(def) = env.class(supertype.def) else {
        return Substitution::new();
    };
    if supertype.args.len() != def.type_params.len() {
        return Substitution::new();
    }
    def.type_params
        .iter()
        .zip(&supertype.args)
        .map(|(param, arg)| {
            let ty = match arg {
                TypeArg::Projected { ty, .. } => ty.clone(),
                TypeArg::Star => first_bound(env, *param),
            };
            (*param, ty)
        })
        .collect()
}

fn first_bound(env: &dyn TypeEnv, param: TypeParamId) -> Type {
    env.type_param(param)
        .and_then(|def| def.upper_bounds.first().cloned())
        .unwrap_or_else(|| env.default_upper_bound())
}

/// View `ty` as an instantiation of `target` by walking the supertype graph and applying type
/// argument substitution along the way.
///
/// Example: `MutableList<String>` instantiated as `Collection` returns `Collection<String>`.
pub fn instantiate_as_supertype(
    env: &dyn TypeEnv,
    ty: &ClassType,
    target: crate::ClassId,
) -> Option<ClassType> {
    let mut queue = VecDeque::new();
    let mut seen = HashSet::new();
    queue.push_back(ClassType {
        nullability: Nullability::NotNull,
        ..ty.clone()
    });

    while let Some(current) = queue.pop_front() {
        if current.def == target {
            return Some(current);
        }
        if !seen.insert(current.def) {
            continue;
        }
        let Some(def) = env.class(current.def) else {
            continue;
        };
        let subst = supertype_substitution(env, &current);
        for supertype in &def.supertypes {
            if let Type::Class(class) = supertype.substitute(&subst) {
                queue.push_back(class);
            }
        }
    }

    None
}

/// Kotlin subtyping over the resolved type model. Platform nullability is lenient in both
/// directions; unresolved types are compatible with everything.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    is_subtype_inner(env, sub, sup, &mut HashSet::new())
}

fn is_subtype_inner(
    env: &dyn TypeEnv,
    sub: &Type,
    sup: &Type,
    seen_vars: &mut HashSet<TypeParamId>,
) -> bool {
    if sub.is_error() || sup.is_error() {
        return true;
    }
    if sub.nullability() == Nullability::Nullable && sup.nullability() == Nullability::NotNull {
        return false;
    }

    let wk = env.well_known();
    if sub.class_id() == Some(wk.nothing) {
        return true;
    }
    if sup.class_id() == Some(wk.any) {
        return true;
    }

    match (sub, sup) {
        (Type::TypeVar(a), Type::TypeVar(b)) if a.id == b.id => true,
        (Type::TypeVar(var), _) => {
            if !seen_vars.insert(var.id) {
                return false;
            }
            let bounds = env
                .type_param(var.id)
                .map(|def| def.upper_bounds.clone())
                .unwrap_or_default();
            let found = bounds.iter().any(|bound| {
                let bound = bound.with_nullability(combine_for_bound(var.nullability, bound));
                is_subtype_inner(env, &bound, sup, seen_vars)
            });
            seen_vars.remove(&var.id);
            found
        }
        (Type::Class(_), Type::TypeVar(_)) => false,
        (Type::Class(sub_class), Type::Class(sup_class)) => {
            let Some(viewed) = instantiate_as_supertype(env, sub_class, sup_class.def) else {
                return false;
            };
            if viewed.args.len() != sup_class.args.len() {
                // Raw occurrence on either side.
                return viewed.args.is_empty() || sup_class.args.is_empty();
            }
            let params = env
                .class(sup_class.def)
                .map(|def| def.type_params.clone())
                .unwrap_or_default();
            viewed
                .args
                .iter()
                .zip(&sup_class.args)
                .enumerate()
                .all(|(idx, (sub_arg, sup_arg))| {
                    let declared = params
                        .get(idx)
                        .and_then(|id| env.type_param(*id))
                        .map(|def| def.variance)
                        .unwrap_or(Variance::Invariant);
                    arg_contains(env, declared, sup_arg, sub_arg, seen_vars)
                })
        }
        _ => false,
    }
}

fn combine_for_bound(var: Nullability, bound: &Type) -> Nullability {
    if var == Nullability::NotNull {
        Nullability::NotNull
    } else {
        match bound.nullability() {
            Nullability::NotNull => var,
            other => other,
        }
    }
}

/// Whether `sup_arg` contains `sub_arg` for a parameter declared with `declared` variance.
fn arg_contains(
    env: &dyn TypeEnv,
    declared: Variance,
    sup_arg: &TypeArg,
    sub_arg: &TypeArg,
    seen_vars: &mut HashSet<TypeParamId>,
) -> bool {
    let (sup_variance, sup_ty) = match sup_arg {
        TypeArg::Star => return true,
        TypeArg::Projected { variance, ty } => (effective(declared, *variance), ty),
    };
    let (sub_variance, sub_ty) = match sub_arg {
        TypeArg::Star => return false,
        TypeArg::Projected { variance, ty } => (effective(declared, *variance), ty),
    };

    match sup_variance {
        Variance::Out => {
            sub_variance != Variance::In && is_subtype_inner(env, sub_ty, sup_ty, seen_vars)
        }
        Variance::In => {
            sub_variance != Variance::Out && is_subtype_inner(env, sup_ty, sub_ty, seen_vars)
        }
        Variance::Invariant => sub_variance == Variance::Invariant && types_equivalent(sub_ty, sup_ty),
    }
}

fn effective(declared: Variance, projection: Variance) -> Variance {
    if projection == Variance::Invariant {
        declared
    } else {
        projection
    }
}

/// Element type of `Array<E>` or of a primitive array (`IntArray` -> `Int`).
pub fn array_element_type(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    let Type::Class(class) = ty else {
        return None;
    };
    if class.def == env.well_known().array {
        return match class.args.first()? {
            TypeArg::Projected { ty, .. } => Some(ty.clone()),
            TypeArg::Star => Some(env.default_upper_bound()),
        };
    }
    env.primitive_array_element(class.def)
        .map(|element| Type::class(element, vec![]))
}
