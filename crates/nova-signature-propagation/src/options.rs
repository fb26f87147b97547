/// Session-level switches for signature reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropagationOptions {
    /// Platform-types mode: type-argument arity mismatches silently keep the inferred type,
    /// mixed extension/non-extension super methods are not reported, and the builder skips
    /// override re-verification.
    pub platform_types: bool,
    /// Report a projection that repeats the declaration-site variance (`List<out T>`) as an
    /// error instead of normalizing it away. Used by tests.
    pub strict_projections: bool,
    /// Re-verify an annotated signature against the members it overrides.
    pub check_overrides: bool,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            platform_types: false,
            strict_projections: false,
            check_overrides: true,
        }
    }
}
