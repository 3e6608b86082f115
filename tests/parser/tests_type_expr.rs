//! Type expression parsing tests.

use raml::parser::{TokenKind, TypeExpr, parse_type_expr, tokenize};
use rstest::rstest;

fn name(n: &str) -> TypeExpr {
    TypeExpr::Name(n.into())
}

// ============================================================================
// Accepted expressions
// ============================================================================

#[rstest]
#[case("string", "string")]
#[case("Person[]", "Person[]")]
#[case("lib.Person", "lib.Person")]
#[case("date-only", "date-only")]
#[case("Cat | Dog", "Cat | Dog")]
#[case("(Cat | Dog)[]", "(Cat | Dog)[]")]
#[case("  Person [ ] ", "Person[]")]
#[case("string?", "string | nil")]
fn test_round_trips_through_display(#[case] input: &str, #[case] expected: &str) {
    let expr = parse_type_expr(input).unwrap_or_else(|e| panic!("'{input}': {e}"));
    assert_eq!(expr.to_string(), expected);
}

#[test]
fn test_union_binds_looser_than_array() {
    let expr = parse_type_expr("A | B[]").unwrap();
    assert_eq!(
        expr,
        TypeExpr::Union(vec![name("A"), TypeExpr::Array(Box::new(name("B")))])
    );
}

#[test]
fn test_names_lists_every_reference() {
    let expr = parse_type_expr("(lib.A | B)[] | string").unwrap();
    let names: Vec<&str> = expr.names().into_iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["lib.A", "B", "string"]);
}

#[rstest]
#[case("{\"type\": \"object\"}")]
#[case("<xs:schema/>")]
fn test_inline_schemas_are_opaque(#[case] input: &str) {
    assert!(matches!(parse_type_expr(input), Ok(TypeExpr::Schema(_))));
}

// ============================================================================
// Rejected expressions
// ============================================================================

#[rstest]
#[case("")]
#[case("Person[")]
#[case("| Cat")]
#[case("Cat |")]
#[case("(Cat | Dog")]
#[case("Foo[Bar]")]
#[case("Person$")]
fn test_syntax_errors(#[case] input: &str) {
    assert!(parse_type_expr(input).is_err(), "'{input}' should not parse");
}

#[test]
fn test_error_carries_range() {
    let error = parse_type_expr("Cat $ Dog").unwrap_err();
    assert_eq!(u32::from(error.range.start()), 4);
}

#[test]
fn test_tokenize() {
    let kinds: Vec<TokenKind> = tokenize("A[] | b?").into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Name,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Pipe,
            TokenKind::Name,
            TokenKind::Question,
        ]
    );
}
