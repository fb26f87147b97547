//! Alternative signatures: hand-written Kotlin function headers attached to binary members.
//!
//! The text arrives as an escaped annotation value (`@KotlinSignature("fun get(key: String): V?")`).
//! This crate unescapes it, lexes and parses it into a small closed AST. Resolving the AST
//! against the member's inferred signature happens in `nova-signature-propagation`.

use std::ops::Range;

mod annotation;
mod ast;
mod lexer;
mod literals;
mod parser;

pub use crate::annotation::{
    find_alternative_signature, SignatureAnnotation, KOTLIN_SIGNATURE, OLD_KOTLIN_SIGNATURE,
};
pub use crate::ast::{
    FunctionDecl, FunctionTypeNode, ParamDecl, TypeArgNode, TypeNode, TypeParamDecl,
    TypeReference, WhereClause,
};
pub use crate::literals::{unescape_signature_literal, LiteralError};
pub use crate::parser::parse_alternative_signature;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    /// Byte range within the signature text.
    pub span: Range<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}
