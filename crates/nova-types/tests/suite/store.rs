use nova_types::{
    is_default_upper_bound, ClassDef, ClassKind, Type, TypeEnv, TypeParamOwner, TypeStore,
    Variance,
};

#[test]
fn intern_then_define_keeps_the_reserved_id() {
    let mut store = TypeStore::with_builtins();
    let id = store.intern_class_id("com.example.Node");
    let any = store.default_upper_bound();
    let t = store.add_type_param("T", Variance::Invariant, TypeParamOwner::Class(id), vec![any]);
    store.define_class(
        id,
        ClassDef {
            name: "com.example.Node".to_string(),
            kind: ClassKind::Class,
            type_params: vec![t],
            supertypes: vec![],
        },
    );

    assert_eq!(store.class_id("com.example.Node"), Some(id));
    assert_eq!(store.intern_class_id("com.example.Node"), id);
    assert_eq!(store.class(id).unwrap().simple_name(), "Node");
    assert_eq!(
        store.type_param(t).unwrap().owner,
        TypeParamOwner::Class(id)
    );
}

#[test]
fn default_upper_bound_is_nullable_any() {
    let store = TypeStore::with_builtins();
    let any = Type::class(store.well_known().any, vec![]);

    assert!(is_default_upper_bound(&store, &store.default_upper_bound()));
    assert!(is_default_upper_bound(&store, &any.flexible()));
    assert!(!is_default_upper_bound(&store, &any));
}
