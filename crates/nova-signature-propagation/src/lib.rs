//! Signature propagation for members loaded from class files.
//!
//! A member read from bytecode carries an "auto" signature with platform nullability and
//! whatever generics survived erasure. This crate refines it in two phases:
//!
//! 1. [`SignatureBuilder`] applies a hand-written alternative signature slot by slot through the
//!    [`TypeMatcher`]. The phase is all or nothing: any [`SignatureError`] leaves the auto
//!    signature in place.
//! 2. [`OverrideReconciler`] merges the result with the super members it overrides (selected by
//!    erased signature). This phase always produces a signature and reports problems as
//!    [`Diagnostic`](nova_types::Diagnostic)s.
//!
//! [`SignatureBinder`] runs both for one member.

mod binder;
mod builder;
mod erasure;
mod error;
mod heuristics;
mod hierarchy;
mod matcher;
mod options;
mod reconciler;
mod signature;

pub use crate::binder::{BoundMember, MemberRequest, SignatureBinder};
pub use crate::builder::SignatureBuilder;
pub use crate::erasure::{BaseType, ErasedSignature, FieldType, SignatureMapper};
pub use crate::error::{MatchError, MismatchError, SignatureError, Slot, TypeUsage};
pub use crate::heuristics::{array_return_covariance, raw_type_fix, ARRAY_RETURN_COVARIANCE};
pub use crate::hierarchy::{
    collect_super_candidates, DeclaredMember, MemberTable, SupertypeHierarchy,
};
pub use crate::matcher::TypeMatcher;
pub use crate::options::PropagationOptions;
pub use crate::reconciler::{OverrideReconciler, SupertypeCandidate, INCOMPATIBLE_SUPER_METHODS};
pub use crate::signature::{
    MemberKind, MemberSignature, TypeParameter, TypeParameterBuilder, ValueParameter,
};
