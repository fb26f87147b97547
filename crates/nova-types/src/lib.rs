//! Resolved Kotlin-side types for members loaded from JVM class files.
//!
//! The binary reader produces signatures in terms of these types; alternative signatures and
//! supertype propagation (`nova-signature-propagation`) refine them. Everything here is a plain
//! immutable value: new types are produced by substitution, never by mutation.

use std::collections::HashMap;
use std::fmt;

mod analogs;
mod format;
mod store;
mod subtyping;

pub use crate::analogs::{is_platform_analog, platform_analogs, PLATFORM_ANALOGS};
pub use crate::format::format_type;
pub use crate::store::{
    ClassDef, ClassKind, TypeEnv, TypeParamDef, TypeParamOwner, TypeStore, WellKnown,
};
pub use crate::subtyping::{
    array_element_type, instantiate_as_supertype, is_default_upper_bound, is_subtype,
    supertype_substitution, types_equivalent,
};

/// A byte-span into a source string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParamId(u32);

impl TypeParamId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

/// Declaration-site variance of a type parameter, or use-site projection of a type argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    In,
    Out,
}

impl Variance {
    /// Keyword as written in source (`""` for invariant).
    pub fn keyword(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::In => "in",
            Variance::Out => "out",
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Invariant => f.write_str("invariant"),
            other => f.write_str(other.keyword()),
        }
    }
}

/// Nullability of a type occurrence.
///
/// `Flexible` is the platform nullability of types read from class files (`String!`): the value
/// may or may not be null and both interpretations are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Nullability {
    NotNull,
    Nullable,
    Flexible,
}

impl Nullability {
    pub fn admits_null(self) -> bool {
        !matches!(self, Nullability::NotNull)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeArg {
    Star,
    Projected { variance: Variance, ty: Type },
}

impl TypeArg {
    pub fn invariant(ty: Type) -> Self {
        TypeArg::Projected {
            variance: Variance::Invariant,
            ty,
        }
    }

    pub fn out(ty: Type) -> Self {
        TypeArg::Projected {
            variance: Variance::Out,
            ty,
        }
    }

    pub fn contravariant(ty: Type) -> Self {
        TypeArg::Projected {
            variance: Variance::In,
            ty,
        }
    }

    pub fn ty(&self) -> Option<&Type> {
        match self {
            TypeArg::Star => None,
            TypeArg::Projected { ty, .. } => Some(ty),
        }
    }

    /// Use-site projection; a star behaves like `out` of the parameter's bound.
    pub fn variance(&self) -> Variance {
        match self {
            TypeArg::Star => Variance::Out,
            TypeArg::Projected { variance, .. } => *variance,
        }
    }

    fn substitute(&self, subst: &Substitution) -> TypeArg {
        match self {
            TypeArg::Star => TypeArg::Star,
            TypeArg::Projected { variance, ty } => TypeArg::Projected {
                variance: *variance,
                ty: ty.substitute(subst),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<TypeArg>,
    pub nullability: Nullability,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub id: TypeParamId,
    pub nullability: Nullability,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// A type the binary reader could not resolve. Never a source of further errors.
    Error,
    Class(ClassType),
    TypeVar(TypeVar),
}

impl Type {
    pub fn class(def: ClassId, args: Vec<TypeArg>) -> Self {
        Type::Class(ClassType {
            def,
            args,
            nullability: Nullability::NotNull,
        })
    }

    pub fn type_var(id: TypeParamId) -> Self {
        Type::TypeVar(TypeVar {
            id,
            nullability: Nullability::NotNull,
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn nullability(&self) -> Nullability {
        match self {
            Type::Error => Nullability::Flexible,
            Type::Class(class) => class.nullability,
            Type::TypeVar(var) => var.nullability,
        }
    }

    pub fn with_nullability(&self, nullability: Nullability) -> Type {
        match self {
            Type::Error => Type::Error,
            Type::Class(class) => Type::Class(ClassType {
                nullability,
                ..class.clone()
            }),
            Type::TypeVar(var) => Type::TypeVar(TypeVar {
                id: var.id,
                nullability,
            }),
        }
    }

    pub fn nullable(&self) -> Type {
        self.with_nullability(Nullability::Nullable)
    }

    pub fn not_null(&self) -> Type {
        self.with_nullability(Nullability::NotNull)
    }

    pub fn flexible(&self) -> Type {
        self.with_nullability(Nullability::Flexible)
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(class) => Some(class.def),
            _ => None,
        }
    }

    pub fn type_param_id(&self) -> Option<TypeParamId> {
        match self {
            Type::TypeVar(var) => Some(var.id),
            _ => None,
        }
    }

    pub fn args(&self) -> &[TypeArg] {
        match self {
            Type::Class(class) => &class.args,
            _ => &[],
        }
    }

    /// Replace type variables according to `subst`, keeping nullability of the replaced
    /// occurrence where it is stronger than the substituted type's own.
    pub fn substitute(&self, subst: &Substitution) -> Type {
        match self {
            Type::Error => Type::Error,
            Type::Class(class) => Type::Class(ClassType {
                def: class.def,
                args: class.args.iter().map(|arg| arg.substitute(subst)).collect(),
                nullability: class.nullability,
            }),
            Type::TypeVar(var) => match subst.get(var.id) {
                Some(replacement) => {
                    let nullability =
                        combine_nullability(var.nullability, replacement.nullability());
                    replacement.with_nullability(nullability)
                }
                None => self.clone(),
            },
        }
    }
}

fn combine_nullability(occurrence: Nullability, replacement: Nullability) -> Nullability {
    match (occurrence, replacement) {
        (Nullability::Nullable, _) | (_, Nullability::Nullable) => Nullability::Nullable,
        (Nullability::Flexible, _) | (_, Nullability::Flexible) => Nullability::Flexible,
        (Nullability::NotNull, Nullability::NotNull) => Nullability::NotNull,
    }
}

/// A mapping from type parameters to the types that replace them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    map: HashMap<TypeParamId, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, param: TypeParamId, ty: Type) {
        self.map.insert(param, ty);
    }

    pub fn get(&self, param: TypeParamId) -> Option<&Type> {
        self.map.get(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromIterator<(TypeParamId, Type)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (TypeParamId, Type)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
