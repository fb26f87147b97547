use nova_alt_signature::{parse_alternative_signature, TypeArgNode, TypeNode};
use nova_types::Variance;

use pretty_assertions::assert_eq;

fn rendered_params(text: &str) -> Vec<String> {
    let decl = parse_alternative_signature(text).unwrap();
    decl.params
        .iter()
        .map(|param| {
            let prefix = if param.is_vararg { "vararg " } else { "" };
            format!("{prefix}{}: {}", param.name, param.ty.render())
        })
        .collect()
}

#[test]
fn constructor_signature_has_no_return_type() {
    let decl = parse_alternative_signature("fun HashMap(initialCapacity: Int, loadFactor: Float)")
        .unwrap();
    assert_eq!(decl.name, "HashMap");
    assert_eq!(decl.return_type, None);
    assert_eq!(
        rendered_params("fun HashMap(initialCapacity: Int, loadFactor: Float)"),
        vec!["initialCapacity: Int", "loadFactor: Float"]
    );
}

#[test]
fn projections_and_stars() {
    let decl =
        parse_alternative_signature("fun copy(src: MutableList<out T>, dst: Map<*, in T?>)")
            .unwrap();

    let TypeNode::Reference(src) = &decl.params[0].ty else {
        panic!("expected reference");
    };
    assert_eq!(src.segments, vec!["MutableList"]);
    match &src.args[0] {
        TypeArgNode::Projected { variance, ty } => {
            assert_eq!(*variance, Variance::Out);
            assert_eq!(ty.render(), "T");
        }
        TypeArgNode::Star => panic!("expected projection"),
    }

    assert_eq!(decl.params[1].ty.render(), "Map<*, in T?>");
}

#[test]
fn qualified_and_nested_names() {
    assert_eq!(
        rendered_params("fun entries(e: java.util.Map.Entry<K, V>?, vararg xs: kotlin.Int)"),
        vec!["e: java.util.Map.Entry<K, V>?", "vararg xs: kotlin.Int"]
    );
}

#[test]
fn keywords_can_be_quoted() {
    let decl = parse_alternative_signature("fun `in`(`out`: String)").unwrap();
    assert_eq!(decl.name, "in");
    assert_eq!(decl.params[0].name, "out");
}

#[test]
fn multiple_where_clauses_attach_to_their_parameter() {
    let decl = parse_alternative_signature(
        "fun <T : Number, U> max(a: T, b: U): T where T : Comparable<T>, U : CharSequence",
    )
    .unwrap();

    let t_bounds: Vec<String> = decl
        .bounds_of(&decl.type_params[0])
        .into_iter()
        .map(TypeNode::render)
        .collect();
    let u_bounds: Vec<String> = decl
        .bounds_of(&decl.type_params[1])
        .into_iter()
        .map(TypeNode::render)
        .collect();
    assert_eq!(t_bounds, vec!["Number", "Comparable<T>"]);
    assert_eq!(u_bounds, vec!["CharSequence"]);
}

#[test]
fn syntax_errors_carry_spans() {
    let err = parse_alternative_signature("fun f(x: Int = 1)").unwrap_err();
    assert_eq!(err.span, 13..14);

    let err = parse_alternative_signature("fun <in T> f()").unwrap_err();
    assert!(
        err.message.starts_with("variance is not allowed"),
        "{}",
        err.message
    );

    let err = parse_alternative_signature("fun f(x: (A, B))").unwrap_err();
    assert_eq!(err.message, "expected `->` after function type parameters");

    assert!(parse_alternative_signature("val x: Int").is_err());
    assert!(parse_alternative_signature("fun f(x: List<Int)").is_err());
}

#[test]
fn deeply_nested_type_is_rejected_without_overflow() {
    let depth = 2500;
    let text = format!(
        "fun f(x: {}String{})",
        "List<".repeat(depth),
        ">".repeat(depth)
    );
    let err = parse_alternative_signature(&text).unwrap_err();
    assert_eq!(err.message, "type nesting too deep");

    let shallow = format!("fun f(x: {}String{})", "List<".repeat(32), ">".repeat(32));
    assert!(parse_alternative_signature(&shallow).is_ok());
}
