use nova_alt_signature::{
    find_alternative_signature, parse_alternative_signature, SignatureAnnotation,
    KOTLIN_SIGNATURE,
};

#[test]
fn escaped_annotation_value_parses() {
    let annotations = vec![SignatureAnnotation::new(
        KOTLIN_SIGNATURE,
        r#""fun format(pattern: String, vararg args: Any?): String ""#,
    )];

    let text = find_alternative_signature(&annotations).unwrap().unwrap();
    assert_eq!(
        text,
        "fun format(pattern: String, vararg args: Any?): String "
    );

    let decl = parse_alternative_signature(&text).unwrap();
    assert_eq!(decl.name, "format");
    assert!(decl.params[1].is_vararg);
}

#[test]
fn blank_value_counts_as_absent() {
    let annotations = vec![SignatureAnnotation::new(KOTLIN_SIGNATURE, "  ")];
    assert_eq!(find_alternative_signature(&annotations).unwrap(), None);
}

#[test]
fn malformed_escape_is_reported() {
    let annotations = vec![SignatureAnnotation::new(KOTLIN_SIGNATURE, "fun f\\")];
    let err = find_alternative_signature(&annotations).unwrap_err();
    assert_eq!(err.message, "Unterminated escape sequence");
}
