use nova_alt_signature::{find_alternative_signature, SignatureAnnotation};
use nova_types::{ClassId, Diagnostic, TypeEnv};

use crate::builder::SignatureBuilder;
use crate::erasure::SignatureMapper;
use crate::options::PropagationOptions;
use crate::reconciler::{OverrideReconciler, SupertypeCandidate};
use crate::signature::MemberSignature;

/// Everything needed to bind one binary member.
#[derive(Clone, Copy, Debug)]
pub struct MemberRequest<'a> {
    pub containing_class: ClassId,
    /// The signature the binary reader inferred.
    pub auto: &'a MemberSignature,
    pub annotations: &'a [SignatureAnnotation],
    /// Same-named members of the immediate supertypes, see
    /// [`collect_super_candidates`](crate::collect_super_candidates).
    pub candidates: &'a [SupertypeCandidate],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundMember {
    pub signature: MemberSignature,
    /// An alternative signature was present and applied.
    pub annotated: bool,
    /// Why the alternative signature was rejected; empty on success.
    pub signature_errors: Vec<String>,
    /// Findings from merging with super members.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the whole pipeline for a member: alternative signature, then supertypes.
pub struct SignatureBinder<'a> {
    env: &'a dyn TypeEnv,
    mapper: &'a SignatureMapper,
    options: PropagationOptions,
}

impl<'a> SignatureBinder<'a> {
    pub fn new(env: &'a dyn TypeEnv, options: PropagationOptions) -> Self {
        Self::with_mapper(env, SignatureMapper::shared(), options)
    }

    pub fn with_mapper(
        env: &'a dyn TypeEnv,
        mapper: &'a SignatureMapper,
        options: PropagationOptions,
    ) -> Self {
        Self {
            env,
            mapper,
            options,
        }
    }

    pub fn bind(&self, request: &MemberRequest<'_>) -> BoundMember {
        let reconciler = OverrideReconciler::with_mapper(self.env, self.mapper, self.options);
        let mut signature_errors = Vec::new();

        let alternative = match find_alternative_signature(request.annotations) {
            Ok(text) => text,
            Err(err) => {
                signature_errors.push(format!("Alternative signature has invalid escape: {err}"));
                None
            }
        };

        let overridden: Vec<&MemberSignature> = reconciler
            .select_relevant(request.auto, request.candidates)
            .into_iter()
            .map(|candidate| &candidate.signature)
            .collect();

        let builder = SignatureBuilder::new(self.env, self.options);
        let (built, annotated) = match builder.build(
            request.auto,
            request.containing_class,
            alternative.as_deref(),
            &overridden,
        ) {
            Ok(built) => (built, alternative.is_some()),
            Err(err) => {
                signature_errors = err.messages();
                tracing::debug!(
                    target: "nova.signatures",
                    member = %request.auto.name,
                    errors = signature_errors.len(),
                    not_supported = err.is_not_supported(),
                    "rejected alternative signature"
                );
                (request.auto.clone(), false)
            }
        };

        let (signature, diagnostics) =
            reconciler.reconcile_with_supertypes(&built, request.containing_class, request.candidates);

        BoundMember {
            signature,
            annotated,
            signature_errors,
            diagnostics,
        }
    }
}
