use nova_signature_propagation::{
    MemberSignature, PropagationOptions, SignatureBuilder, SignatureError, Slot, TypeParameter,
    ValueParameter,
};
use nova_types::{ClassId, Type, TypeArg, TypeEnv, TypeParamId, TypeParamOwner, TypeStore, Variance};

use pretty_assertions::assert_eq;

use super::support::{any, array_of, class, int, list_of, plain_class, string, unit};

fn build(
    env: &TypeStore,
    owner: ClassId,
    auto: &MemberSignature,
    text: &str,
) -> Result<MemberSignature, SignatureError> {
    SignatureBuilder::new(env, PropagationOptions::default()).build(auto, owner, Some(text), &[])
}

fn generic_identity(env: &mut TypeStore, bound: Type) -> (MemberSignature, TypeParamId) {
    let t = env.add_type_param(
        "T",
        Variance::Invariant,
        TypeParamOwner::Callable,
        vec![bound.clone()],
    );
    let auto = MemberSignature::method(
        "id",
        vec![ValueParameter::new(0, "p0", Type::type_var(t).flexible())],
        Type::type_var(t).flexible(),
    )
    .with_type_params(vec![TypeParameter {
        id: t,
        index: 0,
        name: "T".to_string(),
        variance: Variance::Invariant,
        upper_bounds: vec![bound],
    }]);
    (auto, t)
}

#[test]
fn no_alternative_signature_returns_auto_unchanged() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Dict");
    let auto = MemberSignature::method(
        "get",
        vec![ValueParameter::new(0, "p0", string(&env).flexible())],
        string(&env).flexible(),
    )
    .with_stable_parameter_names(true);

    let built = SignatureBuilder::new(&env, PropagationOptions::default())
        .build(&auto, owner, None, &[])
        .unwrap();
    assert_eq!(built, auto);
}

#[test]
fn platform_types_take_alternative_nullability() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Dict");
    let auto = MemberSignature::method(
        "get",
        vec![ValueParameter::new(0, "p0", string(&env).flexible())],
        string(&env).flexible(),
    );

    let built = build(&env, owner, &auto, "fun get(key: String): String?").unwrap();

    assert_eq!(built.value_params[0].name, "key");
    assert_eq!(built.value_params[0].ty, string(&env));
    assert_eq!(built.return_type, Some(string(&env).nullable()));
}

#[test]
fn exact_redeclaration_round_trips() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Strings");
    let auto = MemberSignature::method(
        "join",
        vec![
            ValueParameter::new(0, "parts", list_of(&env, string(&env))),
            ValueParameter::new(1, "separator", string(&env).nullable()),
        ],
        string(&env),
    );

    let built = build(
        &env,
        owner,
        &auto,
        "fun join(parts: List<String>, separator: String?): String",
    )
    .unwrap();
    assert_eq!(built, auto);
}

#[test]
fn value_parameter_count_mismatch_is_fatal() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Pair");
    let auto = MemberSignature::method(
        "of",
        vec![
            ValueParameter::new(0, "p0", any(&env).flexible()),
            ValueParameter::new(1, "p1", any(&env).flexible()),
        ],
        any(&env).flexible(),
    );

    let err = build(&env, owner, &auto, "fun of(a: Any, b: Any, c: Any): Any").unwrap_err();
    assert_eq!(
        err,
        SignatureError::ValueParameterCount {
            expected: 2,
            actual: 3
        }
    );
    assert_eq!(
        err.messages(),
        vec!["Method signature has 2 value parameters, but alternative signature has 3"]
    );
}

#[test]
fn implicit_bound_accepts_unbounded_alternative() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Util");
    let bound = any(&env).flexible();
    let (auto, t) = generic_identity(&mut env, bound);

    let built = build(&env, owner, &auto, "fun <T> id(value: T): T?").unwrap();

    assert_eq!(built.type_params[0].upper_bounds, vec![any(&env).nullable()]);
    assert_eq!(built.value_params[0].ty, Type::type_var(t));
    assert_eq!(built.return_type, Some(Type::type_var(t).nullable()));
}

#[test]
fn type_parameters_are_renamed_by_position() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Util");
    let bound = any(&env).flexible();
    let (auto, t) = generic_identity(&mut env, bound);

    let built = build(&env, owner, &auto, "fun <E> id(value: E): E").unwrap();
    assert_eq!(built.type_params[0].name, "E");
    assert_eq!(built.type_params[0].id, t);
    assert_eq!(built.value_params[0].ty, Type::type_var(t));

    // The auto name no longer refers to the parameter.
    let err = build(&env, owner, &auto, "fun <E> id(value: T): E").unwrap_err();
    assert_eq!(
        err.messages(),
        vec!["Alternative signature type mismatch, expected: T, actual: T!"]
    );
}

#[test]
fn explicit_bounds_must_match_in_number() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Util");
    let char_sequence = class(&env, "kotlin.CharSequence");
    let (auto, _) = generic_identity(&mut env, char_sequence.flexible());

    let err = build(&env, owner, &auto, "fun <T> id(value: T): T").unwrap_err();
    assert_eq!(
        err.messages(),
        vec!["Upper bound number mismatch for T. Expected 1, but found 0"]
    );

    let built = build(&env, owner, &auto, "fun <T : CharSequence> id(value: T): T").unwrap();
    assert_eq!(built.type_params[0].upper_bounds, vec![char_sequence.clone()]);

    let built =
        build(&env, owner, &auto, "fun <T> id(value: T): T where T : CharSequence?").unwrap();
    assert_eq!(built.type_params[0].upper_bounds, vec![char_sequence.nullable()]);
}

#[test]
fn nullable_alternative_for_not_null_parameter_is_rejected() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Text");
    let auto = MemberSignature::method(
        "trim",
        vec![ValueParameter::new(0, "p0", string(&env))],
        list_of(&env, string(&env)).flexible(),
    );

    let err = build(&env, owner, &auto, "fun trim(s: String?): List<String?>").unwrap_err();
    assert_eq!(
        err.messages(),
        vec!["Auto type 'kotlin.String' is not-null, while type in alternative signature is nullable: 'String?'"]
    );

    // Inside a type argument nullability may be added.
    let built = build(&env, owner, &auto, "fun trim(s: String): List<String?>").unwrap();
    assert_eq!(
        built.return_type,
        Some(list_of(&env, string(&env).nullable()))
    );
}

#[test]
fn mismatches_accumulate_across_slots() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Math");
    let auto = MemberSignature::method(
        "add",
        vec![
            ValueParameter::new(0, "p0", int(&env)),
            ValueParameter::new(1, "p1", int(&env)),
        ],
        int(&env),
    );

    let err = build(&env, owner, &auto, "fun add(a: Long, b: Int?): String").unwrap_err();
    let SignatureError::Mismatch(errors) = &err else {
        panic!("expected accumulated mismatches, got {err:?}");
    };
    let slots: Vec<Slot> = errors.iter().map(|error| error.slot).collect();
    assert_eq!(
        slots,
        vec![Slot::ValueParameter(0), Slot::ValueParameter(1), Slot::ReturnType]
    );
    assert_eq!(
        err.messages()[0],
        "Alternative signature type mismatch, expected: Long, actual: kotlin.Int"
    );
}

#[test]
fn missing_return_type_means_unit() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Runner");
    let auto = MemberSignature::method("run", vec![], unit(&env));
    assert!(build(&env, owner, &auto, "fun run()").is_ok());

    let auto = MemberSignature::method("call", vec![], string(&env).flexible());
    let err = build(&env, owner, &auto, "fun call()").unwrap_err();
    assert_eq!(
        err.messages(),
        vec!["Alternative signature type mismatch, expected: Unit, actual: kotlin.String!"]
    );
}

#[test]
fn constructors_are_named_after_their_class() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.geom.Point");
    let auto = MemberSignature::constructor(
        "Point",
        vec![
            ValueParameter::new(0, "p0", int(&env)),
            ValueParameter::new(1, "p1", list_of(&env, int(&env)).flexible()),
        ],
    );

    let built = build(&env, owner, &auto, "fun Point(x: Int, ys: List<Int>?)").unwrap();
    assert_eq!(built.return_type, None);
    assert_eq!(built.value_params[1].ty, list_of(&env, int(&env)).nullable());

    let err = build(&env, owner, &auto, "fun point(x: Int, ys: List<Int>)").unwrap_err();
    assert_eq!(
        err.messages(),
        vec!["Function names mismatch, original: Point, alternative: point"]
    );
}

#[test]
fn extension_and_self_type_signatures_are_not_supported() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Text");
    let auto = MemberSignature::method(
        "copy",
        vec![ValueParameter::new(0, "p0", string(&env).flexible())],
        string(&env).flexible(),
    );

    let err = build(&env, owner, &auto, "fun String.copy(): String").unwrap_err();
    assert!(err.is_not_supported());
    assert_eq!(err.to_string(), "Extension functions are not supported yet");

    let err = build(&env, owner, &auto, "fun copy(s: String): This").unwrap_err();
    assert_eq!(
        err,
        SignatureError::NotSupported("Self-types are not supported yet".to_string())
    );
}

#[test]
fn syntax_errors_are_fatal() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Text");
    let auto = MemberSignature::method("copy", vec![], string(&env).flexible());

    let err = build(&env, owner, &auto, "fun copy(): String = \"\"").unwrap_err();
    assert!(matches!(err, SignatureError::Syntax(_)), "{err:?}");
    assert!(err
        .to_string()
        .starts_with("Alternative signature has syntax error at 19:"));
}

#[test]
fn vararg_elements_are_reconciled_and_rewrapped() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Format");
    let element = any(&env).flexible();
    let auto = MemberSignature::method(
        "format",
        vec![
            ValueParameter::new(0, "p0", string(&env).flexible()),
            ValueParameter::vararg(
                1,
                "p1",
                array_of(&env, TypeArg::out(element.clone())).flexible(),
                element,
            ),
        ],
        string(&env).flexible(),
    );

    let built = build(
        &env,
        owner,
        &auto,
        "fun format(pattern: String, vararg args: Any?): String",
    )
    .unwrap();
    let args = &built.value_params[1];
    assert_eq!(args.name, "args");
    assert_eq!(args.vararg_element, Some(any(&env).nullable()));
    assert_eq!(args.ty, array_of(&env, TypeArg::out(any(&env).nullable())));

    let err = build(
        &env,
        owner,
        &auto,
        "fun format(pattern: String, args: Array<Any?>): String",
    )
    .unwrap_err();
    assert_eq!(
        err.messages(),
        vec!["Parameter in method signature is vararg, but in alternative signature it is not"]
    );
}

#[test]
fn primitive_vararg_keeps_primitive_array() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Ints");
    let int_array = class(&env, "kotlin.IntArray");
    let auto = MemberSignature::method(
        "sum",
        vec![ValueParameter::vararg(0, "p0", int_array.flexible(), int(&env))],
        int(&env),
    );

    let built = build(&env, owner, &auto, "fun sum(vararg xs: Int): Int").unwrap();
    assert_eq!(built.value_params[0].ty, int_array);
    assert_eq!(built.value_params[0].vararg_element, Some(int(&env)));
}

#[test]
fn override_divergence_is_reported() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.JavaDict");
    let auto = MemberSignature::method(
        "get",
        vec![ValueParameter::new(0, "p0", string(&env).flexible())],
        string(&env).flexible(),
    );
    let overridden = MemberSignature::method(
        "get",
        vec![ValueParameter::new(0, "key", string(&env))],
        string(&env),
    );

    let builder = SignatureBuilder::new(&env, PropagationOptions::default());
    let err = builder
        .build(&auto, owner, Some("fun get(key: String?): String?"), &[&overridden])
        .unwrap_err();
    assert_eq!(
        err.messages(),
        vec![
            "Parameter type changed for method which overrides another: kotlin.String?, was: kotlin.String",
            "Return type is changed to not subtype for method which overrides another: kotlin.String?, was: kotlin.String",
        ]
    );

    assert!(builder
        .build(&auto, owner, Some("fun get(key: String): String"), &[&overridden])
        .is_ok());

    let platform = PropagationOptions {
        platform_types: true,
        ..PropagationOptions::default()
    };
    assert!(SignatureBuilder::new(&env, platform)
        .build(&auto, owner, Some("fun get(key: String?): String?"), &[&overridden])
        .is_ok());
}

#[test]
fn override_bounds_are_compared_after_renaming() {
    let mut env = TypeStore::with_builtins();
    let owner = plain_class(&mut env, "p.Sorter");
    let comparable = env.well_known().comparable;
    let sub_t = env.add_type_param("T", Variance::Invariant, TypeParamOwner::Callable, vec![]);
    let super_t = env.add_type_param("T", Variance::Invariant, TypeParamOwner::Callable, vec![]);
    let comparable_of =
        |t| Type::class(comparable, vec![TypeArg::invariant(Type::type_var(t))]);

    let type_param = |id, bound: Type| TypeParameter {
        id,
        index: 0,
        name: "T".to_string(),
        variance: Variance::Invariant,
        upper_bounds: vec![bound],
    };
    let auto = MemberSignature::method(
        "max",
        vec![ValueParameter::new(0, "p0", Type::type_var(sub_t).flexible())],
        Type::type_var(sub_t).flexible(),
    )
    .with_type_params(vec![type_param(sub_t, comparable_of(sub_t).flexible())]);
    let overridden = MemberSignature::method(
        "max",
        vec![ValueParameter::new(0, "value", Type::type_var(super_t))],
        Type::type_var(super_t),
    )
    .with_type_params(vec![type_param(super_t, comparable_of(super_t))]);

    let builder = SignatureBuilder::new(&env, PropagationOptions::default());
    let built = builder
        .build(
            &auto,
            owner,
            Some("fun <T : Comparable<T>> max(value: T): T"),
            &[&overridden],
        )
        .unwrap();
    assert_eq!(built.type_params[0].upper_bounds, vec![comparable_of(sub_t)]);

    let err = builder
        .build(
            &auto,
            owner,
            Some("fun <T : Comparable<T>?> max(value: T): T"),
            &[&overridden],
        )
        .unwrap_err();
    assert_eq!(
        err.messages(),
        vec!["Type parameter's upper bound changed for method which overrides another: kotlin.Comparable<T>?, was: kotlin.Comparable<T>"]
    );
}
