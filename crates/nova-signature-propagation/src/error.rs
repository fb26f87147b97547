use std::fmt;

use nova_alt_signature::ParseError;

/// Where a type occurs; decides which checks the matcher applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeUsage {
    /// Return type.
    MemberSignatureCovariant,
    /// Value parameter type.
    MemberSignatureContravariant,
    UpperBound,
    /// Inside the argument list of another type. Nullability may be added here.
    TypeArgument,
}

/// The part of a member signature an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Member,
    TypeParameter(usize),
    ValueParameter(usize),
    ReturnType,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Member => f.write_str("member"),
            Slot::TypeParameter(idx) => write!(f, "type parameter #{idx}"),
            Slot::ValueParameter(idx) => write!(f, "value parameter #{idx}"),
            Slot::ReturnType => f.write_str("return type"),
        }
    }
}

/// One complete, user-facing sentence describing why an alternative signature was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MismatchError {
    pub slot: Slot,
    pub message: String,
}

impl MismatchError {
    pub fn new(slot: Slot, message: impl Into<String>) -> Self {
        Self {
            slot,
            message: message.into(),
        }
    }
}

/// Failure of a single type comparison.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("{0}")]
    Mismatch(String),
    #[error("{0}")]
    NotSupported(String),
}

/// Why an alternative signature could not be applied. The member keeps its inferred signature.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Alternative signature has syntax error at {}: {}", .0.span.start, .0.message)]
    Syntax(#[from] ParseError),
    #[error("Function names mismatch, original: {expected}, alternative: {actual}")]
    NameMismatch { expected: String, actual: String },
    #[error("Method signature has {expected} value parameters, but alternative signature has {actual}")]
    ValueParameterCount { expected: usize, actual: usize },
    #[error("Method signature has {expected} type parameters, but alternative signature has {actual}")]
    TypeParameterCount { expected: usize, actual: usize },
    /// A construct the engine deliberately does not handle yet.
    #[error("{0}")]
    NotSupported(String),
    #[error("{}", join_messages(.0))]
    Mismatch(Vec<MismatchError>),
}

impl SignatureError {
    /// The individual sentences to report, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            SignatureError::Mismatch(errors) => {
                errors.iter().map(|error| error.message.clone()).collect()
            }
            other => vec![other.to_string()],
        }
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, SignatureError::NotSupported(_))
    }
}

fn join_messages(errors: &[MismatchError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
