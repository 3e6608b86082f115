//! Runtime type tests: inheritance, defaults, cycles and facets.

use raml::hir::{Model, TypeFailure, TypeHandle, TypeKind};
use raml::ModelConfig;
use rstest::rstest;

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;

fn types_api(types: &str) -> Model {
    model_from(&format!("#%RAML 1.0\ntitle: Types\ntypes:\n{types}"))
}

#[test]
fn test_inheritance_merges_properties() {
    let model = model_from(PERSON_API);
    let employee = type_named(&model, "Employee");
    let rt = model.runtime_type(employee).unwrap();
    assert_eq!(rt.kind, TypeKind::Object);
    assert_eq!(rt.name.as_deref(), Some("Employee"));

    let properties: Vec<&str> = rt
        .object_facets()
        .unwrap()
        .properties
        .keys()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(properties, vec!["id", "name", "email", "salary"]);
    assert!(!rt.property("email").unwrap().required);
    assert!(rt.property("salary").unwrap().required);

    let salary = model.runtime_type(rt.property("salary").unwrap().decl).unwrap();
    assert_eq!(salary.kind, TypeKind::Number);
    assert_eq!(salary.scalar_facets().unwrap().minimum, Some(0.0));
    assert_no_errors(&model);
}

#[test]
fn test_declared_type_names() {
    let model = model_from(PERSON_API);
    let employee = model.type_decl(type_named(&model, "Employee"));
    assert_eq!(employee.type_names(), ["Person".to_string()]);
    assert_eq!(employee.display_name(), "Employee");
}

#[rstest]
#[case("  Plain:\n", TypeKind::String)]
#[case("  Plain:\n    properties:\n      a: string\n", TypeKind::Object)]
#[case("  Plain:\n    items: string\n", TypeKind::Array)]
#[case("  Plain:\n    minimum: 1\n", TypeKind::Number)]
#[case("  Plain:\n    fileTypes: [image/png]\n", TypeKind::File)]
#[case("  Plain: integer\n", TypeKind::Integer)]
#[case("  Plain: string | nil\n", TypeKind::Union)]
#[case("  Plain: date-only[]\n", TypeKind::Array)]
fn test_default_and_shorthand_kinds(#[case] types: &str, #[case] kind: TypeKind) {
    let model = types_api(types);
    assert_eq!(model.type_kind(type_named(&model, "Plain")), Some(kind));
}

#[test]
fn test_bodies_default_to_any() {
    let model = model_from(
        "#%RAML 1.0\ntitle: T\n/upload:\n  post:\n    body:\n      application/json:\n",
    );
    let upload = resource_at(&model, "/upload");
    let post = model.child_method(upload, "post").unwrap();
    let body = model.method(post).base.body[0];
    assert_eq!(model.type_decl(body).name(), "application/json");
    assert_eq!(model.type_kind(body), Some(TypeKind::Any));
}

#[test]
fn test_multiple_inheritance() {
    let model = types_api(
        "  Named:\n    properties:\n      name: string\n  Aged:\n    properties:\n      age: integer\n  Person:\n    type: [Named, Aged]\n",
    );
    let rt = model.runtime_type(type_named(&model, "Person")).unwrap();
    assert!(rt.property("name").is_some());
    assert!(rt.property("age").is_some());
    assert_no_errors(&model);
}

#[test]
fn test_incompatible_parents() {
    let model = types_api("  Odd:\n    type: [string, integer]\n");
    let failure = model.runtime_type(type_named(&model, "Odd")).unwrap_err();
    assert!(matches!(failure, TypeFailure::Incompatible { .. }));
    assert_eq!(codes(&errors(&model)), vec!["E0003".to_string()]);
}

#[test]
fn test_integer_may_narrow_number() {
    let model = types_api("  Amount:\n    type: number\n    minimum: 0\n  Count:\n    type: [Amount, integer]\n");
    let rt = model.runtime_type(type_named(&model, "Count")).unwrap();
    assert_eq!(rt.kind, TypeKind::Integer);
    assert_eq!(rt.scalar_facets().unwrap().minimum, Some(0.0));
}

#[test]
fn test_inheritance_cycle_is_reported_once() {
    let model = types_api("  A:\n    type: B\n  B:\n    type: A\n");
    for name in ["A", "B"] {
        let failure = model.runtime_type(type_named(&model, name)).unwrap_err();
        assert_eq!(failure.to_string(), "cyclic inheritance: A -> B -> A");
    }
    let errors = errors(&model);
    assert_eq!(codes(&errors), vec!["E0007".to_string()]);
}

#[rstest]
#[case("  U: U | string\n", "cyclic inheritance: U -> U")]
#[case("  U: U | U\n", "cyclic inheritance: U -> U")]
#[case("  U: U | U | U\n", "cyclic inheritance: U -> U")]
#[case("  U: (string | U) | nil\n", "cyclic inheritance: U -> U")]
#[case("  U: A | string\n  A:\n    type: U\n", "cyclic inheritance: U -> A -> U")]
fn test_union_reaching_itself_is_a_cycle(#[case] types: &str, #[case] message: &str) {
    let model = types_api(types);
    let id = type_named(&model, "U");
    let failure = model.runtime_type(id).unwrap_err();
    assert!(failure.is_cycle());
    assert_eq!(failure.to_string(), message);
    assert_eq!(codes(&errors(&model)), vec!["E0007".to_string()]);
    assert_eq!(
        model.validate_instance(id, &raml::Value::from("text")),
        vec![message.to_string()]
    );
}

#[test]
fn test_recursive_unions_through_arrays_are_not_cycles() {
    let model = types_api("  Json: string | Json[]\n");
    let id = type_named(&model, "Json");
    assert_eq!(model.runtime_type(id).unwrap().kind, TypeKind::Union);
    assert_no_errors(&model);
}

#[test]
fn test_recursive_structures_are_not_cycles() {
    let model = types_api(
        "  Person:\n    properties:\n      name: string\n      friends: Person[]\n",
    );
    let rt = model.runtime_type(type_named(&model, "Person")).unwrap();
    let friends = model.runtime_type(rt.property("friends").unwrap().decl).unwrap();
    assert_eq!(friends.kind, TypeKind::Array);
    let items = friends.array_facets().unwrap().items.clone().unwrap();
    assert!(matches!(items, TypeHandle::Expr { .. }));
    let item = model.resolve_handle(&items).unwrap();
    assert_eq!(item.name.as_deref(), Some("Person"));
    assert_no_errors(&model);
}

#[test]
fn test_depth_limit() {
    let config = ModelConfig {
        max_inheritance_depth: 3,
        ..ModelConfig::default()
    };
    let model = Model::parse_with_config(
        "#%RAML 1.0\ntitle: T\ntypes:\n  T1: T2\n  T2: T3\n  T3: T4\n  T4: string\n",
        config,
    )
    .unwrap();
    let failure = model.runtime_type(type_named(&model, "T1")).unwrap_err();
    assert!(matches!(failure, TypeFailure::DepthExceeded { limit: 3, .. }));
    assert!(codes(&errors(&model)).contains(&"E0013".to_string()));
}

#[test]
fn test_syntax_errors_in_type_expressions() {
    let model = types_api("  Broken: Foo[Bar]\n");
    let failure = model.runtime_type(type_named(&model, "Broken")).unwrap_err();
    assert!(matches!(failure, TypeFailure::Syntax { .. }));
    assert_eq!(codes(&errors(&model)), vec!["E0008".to_string()]);
}

#[test]
fn test_unresolved_parent() {
    let model = types_api("  Lost:\n    type: Nowhere\n");
    let failure = model.runtime_type(type_named(&model, "Lost")).unwrap_err();
    assert_eq!(failure.to_string(), "unresolved type 'Nowhere'");
    assert_eq!(codes(&errors(&model)), vec!["E0001".to_string()]);
}

#[test]
fn test_fixed_user_facets() {
    let model = types_api(
        r#"  Currency:
    type: number
    facets:
      precision: integer
  Euro:
    type: Currency
    precision: 2
  Cent:
    type: Euro
    precision: 4
"#,
    );
    assert!(model.fixed_facets(type_named(&model, "Currency")).is_none());
    let euro = model.fixed_facets(type_named(&model, "Euro")).unwrap();
    assert_eq!(euro.raw().get("precision").and_then(|v| v.as_u64()), Some(2));

    let errors = errors(&model);
    assert_eq!(codes(&errors), vec!["E0011".to_string()]);
    assert!(errors[0].message.contains("'precision'"));
}

#[test]
fn test_facet_problems() {
    let model = types_api(
        "  Code:\n    type: string\n    minimum: 1\n  Short:\n    type: string\n    maxLength: -1\n  Bad:\n    type: string\n    pattern: \"[unclosed\"\n",
    );
    let diagnostics = model.diagnostics();
    let found = codes(&diagnostics);
    assert_eq!(found, vec!["W0001", "E0009", "E0009"]);
}

#[test]
fn test_schema_content_follows_named_types() {
    let model = model_from(
        r#"#%RAML 1.0
title: Schemas
schemas:
  UserSchema: |
    {"type": "object"}
types:
  User:
    type: UserSchema
"#,
    );
    let user = type_named(&model, "User");
    assert_eq!(model.type_kind(user), Some(TypeKind::External));
    let content = model.schema_content(user).unwrap();
    assert!(content.contains("\"object\""));
    assert!(model.type_decl(type_named(&model, "UserSchema")).schema().is_none());
}

#[test]
fn test_enum_and_union_accessors() {
    let model = types_api("  Color:\n    enum: [red, green]\n  Value: string | integer\n");
    let color = model.runtime_type(type_named(&model, "Color")).unwrap();
    assert_eq!(color.enum_values().map(<[_]>::len), Some(2));
    let value = model.runtime_type(type_named(&model, "Value")).unwrap();
    assert_eq!(value.union_branches().map(<[_]>::len), Some(2));
    assert!(value.object_facets().is_none());
}
