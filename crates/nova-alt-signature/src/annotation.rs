use crate::literals::{unescape_signature_literal, LiteralError};

/// Annotation carrying an alternative signature.
pub const KOTLIN_SIGNATURE: &str = "kotlin.jvm.KotlinSignature";

/// Deprecated location of the same annotation, still present in older class files.
pub const OLD_KOTLIN_SIGNATURE: &str = "jet.runtime.typeinfo.KotlinSignature";

/// A string-valued annotation read from a binary member, e.g. from `RuntimeInvisibleAnnotations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureAnnotation {
    /// Fully qualified annotation name (dots, not slashes).
    pub fq_name: String,
    /// Escaped `value` element.
    pub literal: String,
}

impl SignatureAnnotation {
    pub fn new(fq_name: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            fq_name: fq_name.into(),
            literal: literal.into(),
        }
    }
}

/// Find and unescape the alternative signature among a member's annotations.
///
/// The current annotation wins over the legacy one when both are present. Blank values count as
/// absent.
pub fn find_alternative_signature(
    annotations: &[SignatureAnnotation],
) -> Result<Option<String>, LiteralError> {
    let found = [KOTLIN_SIGNATURE, OLD_KOTLIN_SIGNATURE]
        .iter()
        .find_map(|name| annotations.iter().find(|ann| ann.fq_name == *name));

    let Some(annotation) = found else {
        return Ok(None);
    };
    let text = unescape_signature_literal(&annotation.literal)?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(text))
}
