// Run locally (from the repo root):
//   cargo +nightly fuzz run fuzz_alt_signature -- -runs=1000
#![no_main]

use std::ops::Range;
use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use nova_alt_signature::{parse_alternative_signature, unescape_signature_literal};
use nova_signature_propagation::{
    MemberSignature, PropagationOptions, SignatureBuilder, ValueParameter,
};
use nova_types::{ClassId, ClassKind, Type, TypeArg, TypeEnv, TypeStore, Variance};

mod utils;

struct Fixture {
    env: TypeStore,
    owner: ClassId,
    members: Vec<MemberSignature>,
}

fn fixture() -> &'static Fixture {
    static FIXTURE: OnceLock<Fixture> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let mut env = TypeStore::with_builtins();
        let owner = env.add_generic_class("fuzz.Owner", ClassKind::Class, &[("T", Variance::Invariant)], |_| {
            vec![]
        });
        let known = env.well_known().clone();
        let string = Type::class(known.string, vec![]).flexible();
        let list = env
            .lookup_class("kotlin.collections.MutableList")
            .map(|list| Type::class(list, vec![TypeArg::invariant(string.clone())]).flexible())
            .unwrap_or_else(|| string.clone());
        let strings = Type::class(known.array, vec![TypeArg::out(string.clone())]);

        let members = vec![
            MemberSignature::method("foo", vec![], Type::class(known.unit, vec![])),
            MemberSignature::method(
                "foo",
                vec![
                    ValueParameter::new(0, "p0", string.clone()),
                    ValueParameter::new(1, "p1", list.clone()),
                ],
                list,
            ),
            MemberSignature::method(
                "foo",
                vec![ValueParameter::vararg(0, "p0", strings, string.clone())],
                string,
            ),
        ];

        Fixture {
            env,
            owner,
            members,
        }
    })
}

fn assert_span_in_bounds(label: &str, span: &Range<usize>, text_len: usize) {
    assert!(
        span.start <= span.end && span.end <= text_len,
        "{label}: span {span:?} out of bounds (len={text_len})"
    );
}

fuzz_target!(|data: &[u8]| {
    let Some(text) = utils::truncate_utf8(data) else {
        return;
    };
    let selector = data.first().copied().unwrap_or(0);

    // Oracle: never panic on malformed input; spans stay inside the text.
    let text = match unescape_signature_literal(text) {
        Ok(unescaped) => unescaped,
        Err(err) => {
            assert_span_in_bounds("unescape", &err.span, text.len());
            text.to_owned()
        }
    };
    if let Err(err) = parse_alternative_signature(&text) {
        assert_span_in_bounds("parse", &err.span, text.len());
        return;
    }

    let fixture = fixture();
    let member = &fixture.members[selector as usize % fixture.members.len()];
    let options = PropagationOptions {
        platform_types: selector & 0x10 != 0,
        strict_projections: selector & 0x20 != 0,
        check_overrides: true,
    };
    let builder = SignatureBuilder::new(&fixture.env, options);
    let overridden = [member];
    if let Ok(built) = builder.build(member, fixture.owner, Some(&text), &overridden) {
        assert_eq!(built.value_params.len(), member.value_params.len());
    }
});
