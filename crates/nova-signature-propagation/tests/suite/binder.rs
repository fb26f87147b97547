use nova_alt_signature::{SignatureAnnotation, KOTLIN_SIGNATURE};
use nova_signature_propagation::{
    collect_super_candidates, BoundMember, DeclaredMember, MemberRequest, MemberSignature,
    MemberTable, PropagationOptions, SignatureBinder, SupertypeCandidate, ValueParameter,
};
use nova_types::{ClassId, ClassKind, Type, TypeArg, TypeEnv, TypeStore, Variance};

use pretty_assertions::assert_eq;

use super::support::string;

struct Fixture {
    env: TypeStore,
    java_lookup: ClassId,
    candidates: Vec<SupertypeCandidate>,
    auto: MemberSignature,
}

impl Fixture {
    fn bind(&self, annotations: &[SignatureAnnotation]) -> BoundMember {
        let binder = SignatureBinder::new(&self.env, PropagationOptions::default());
        binder.bind(&MemberRequest {
            containing_class: self.java_lookup,
            auto: &self.auto,
            annotations,
            candidates: &self.candidates,
        })
    }
}

/// `interface Lookup<T> { fun find(key: String, fallback: T?): T? }` implemented by the Java
/// class `JavaLookup implements Lookup<String>`.
fn lookup_fixture() -> Fixture {
    let mut env = TypeStore::with_builtins();
    let lookup = env.add_generic_class(
        "p.Lookup",
        ClassKind::Interface,
        &[("T", Variance::Invariant)],
        |_| vec![],
    );
    let lookup_t = Type::type_var(env.class(lookup).unwrap().type_params[0]);
    let string_arg = TypeArg::invariant(string(&env));
    let java_lookup = env.add_generic_class("p.JavaLookup", ClassKind::Class, &[], |_| {
        vec![Type::class(lookup, vec![string_arg])]
    });

    let mut table = MemberTable::new(&env);
    table.add(
        lookup,
        DeclaredMember::new(
            MemberSignature::method(
                "find",
                vec![
                    ValueParameter::new(0, "key", string(&env)),
                    ValueParameter::new(1, "fallback", lookup_t.nullable()),
                ],
                lookup_t.nullable(),
            )
            .with_stable_parameter_names(true),
        ),
    );
    let candidates = collect_super_candidates(&env, &table, java_lookup, "find");

    let auto = MemberSignature::method(
        "find",
        vec![
            ValueParameter::new(0, "p0", string(&env).flexible()),
            ValueParameter::new(1, "p1", string(&env).flexible()),
        ],
        string(&env).flexible(),
    );

    Fixture {
        env,
        java_lookup,
        candidates,
        auto,
    }
}

fn annotation(text: &str) -> SignatureAnnotation {
    SignatureAnnotation::new(KOTLIN_SIGNATURE, text)
}

#[test]
fn candidates_are_seen_through_the_inheritance_edge() {
    let fixture = lookup_fixture();
    let env = &fixture.env;

    assert_eq!(fixture.candidates.len(), 1);
    let candidate = &fixture.candidates[0].signature;
    assert_eq!(candidate.value_params[1].ty, string(env).nullable());
    assert_eq!(candidate.return_type, Some(string(env).nullable()));
}

#[test]
fn matching_alternative_signature_is_applied() {
    let fixture = lookup_fixture();
    let env = &fixture.env;

    let bound = fixture.bind(&[annotation(
        "fun find(key: String, fallback: String?): String?",
    )]);

    assert!(bound.annotated);
    assert_eq!(bound.signature_errors, Vec::<String>::new());
    assert_eq!(bound.diagnostics, vec![]);

    let signature = &bound.signature;
    let params: Vec<(&str, &Type)> = signature
        .value_params
        .iter()
        .map(|param| (param.name.as_str(), &param.ty))
        .collect();
    assert_eq!(
        params,
        vec![("key", &string(env)), ("fallback", &string(env).nullable())]
    );
    assert_eq!(signature.return_type, Some(string(env).nullable()));
    assert!(signature.has_stable_parameter_names);
}

#[test]
fn rejected_alternative_falls_back_to_propagation() {
    let fixture = lookup_fixture();
    let env = &fixture.env;

    let bound = fixture.bind(&[annotation("fun find(key: String): String?")]);

    assert!(!bound.annotated);
    assert_eq!(
        bound.signature_errors,
        vec!["Method signature has 2 value parameters, but alternative signature has 1"]
    );

    // The auto signature still picks up nullability and names from the super member.
    let signature = &bound.signature;
    assert_eq!(signature.value_params[0].name, "key");
    assert_eq!(signature.value_params[0].ty, string(env));
    assert_eq!(signature.value_params[1].name, "fallback");
    assert_eq!(signature.value_params[1].ty, string(env).nullable());
    assert_eq!(signature.return_type, Some(string(env).nullable()));
}

#[test]
fn alternative_that_contradicts_super_member_is_rejected() {
    let fixture = lookup_fixture();

    let bound = fixture.bind(&[annotation(
        "fun find(key: String?, fallback: String?): String?",
    )]);

    assert!(!bound.annotated);
    assert_eq!(bound.signature_errors.len(), 1);
    assert_eq!(bound.signature.value_params[0].ty, string(&fixture.env));
}

#[test]
fn invalid_escape_is_reported_without_an_annotation() {
    let fixture = lookup_fixture();
    let env = &fixture.env;

    let bound = fixture.bind(&[annotation(r#""fun find(\q)""#)]);

    assert!(!bound.annotated);
    assert_eq!(
        bound.signature_errors,
        vec!["Alternative signature has invalid escape: Invalid escape sequence `\\q`"]
    );
    assert_eq!(bound.signature.value_params[0].ty, string(env));
}

#[test]
fn member_without_annotations_is_only_propagated() {
    let fixture = lookup_fixture();

    let bound = fixture.bind(&[]);

    assert!(!bound.annotated);
    assert!(bound.signature_errors.is_empty());
    assert_eq!(bound.signature.value_params[1].name, "fallback");
    assert!(bound.signature.has_stable_parameter_names);
}
