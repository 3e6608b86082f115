//! Instance validation tests.

use raml::Value;
use raml::hir::Model;
use rstest::rstest;
use serde_json::json;

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;

fn validate(model: &Model, name: &str, value: serde_json::Value) -> Vec<String> {
    model.validate_instance(type_named(model, name), &Value::from(value))
}

fn types_api(types: &str) -> Model {
    model_from(&format!("#%RAML 1.0\ntitle: Types\ntypes:\n{types}"))
}

#[test]
fn test_valid_instance() {
    let model = model_from(PERSON_API);
    let errors = validate(
        &model,
        "Employee",
        json!({"id": 1, "name": "Ada", "email": "ada@example.com", "salary": 10.5}),
    );
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn test_missing_required_property() {
    let model = model_from(PERSON_API);
    let errors = validate(&model, "Person", json!({"name": "Ada"}));
    assert_eq!(errors, vec!["Required property 'id' is missing"]);
}

#[test]
fn test_nested_messages_carry_their_location() {
    let model = model_from(PERSON_API);
    let errors = validate(
        &model,
        "Employee",
        json!({"id": "one", "name": "Ada", "email": "nobody", "salary": -1}),
    );
    assert_eq!(
        errors,
        vec![
            "id: Expected integer, got string",
            "email: Value 'nobody' does not match pattern '^.+@.+$'",
            "salary: Value must be greater than or equal to 0",
        ]
    );
}

#[test]
fn test_array_items() {
    let model = types_api("  Tags:\n    type: string[]\n    maxItems: 2\n    uniqueItems: true\n");
    assert!(validate(&model, "Tags", json!(["a", "b"])).is_empty());
    assert_eq!(
        validate(&model, "Tags", json!(["a", "a", 3])),
        vec![
            "Array must have at most 2 items",
            "Array items must be unique",
            "[2]: Expected string, got integer",
        ]
    );
}

#[test]
fn test_closed_objects() {
    let model = types_api(
        "  Point:\n    additionalProperties: false\n    properties:\n      x: number\n      /^meta-/: string\n",
    );
    assert!(validate(&model, "Point", json!({"x": 1, "meta-a": "b"})).is_empty());
    assert_eq!(
        validate(&model, "Point", json!({"x": 1, "y": 2, "meta-a": 1})),
        vec!["Unexpected property 'y'", "meta-a: Expected string, got integer"]
    );
}

#[rstest]
#[case("date-only", json!("2024-02-29"), true)]
#[case("date-only", json!("2024-02-30"), false)]
#[case("time-only", json!("12:30:00"), true)]
#[case("datetime-only", json!("2024-01-01T12:30:00"), true)]
#[case("datetime", json!("2024-01-01T12:30:00Z"), true)]
#[case("datetime", json!("2024-01-01"), false)]
#[case("boolean", json!(true), true)]
#[case("boolean", json!("true"), false)]
#[case("nil", json!(null), true)]
#[case("integer", json!(1.5), false)]
#[case("number", json!(1.5), true)]
#[case("any", json!({"a": [1]}), true)]
fn test_scalar_kinds(#[case] kind: &str, #[case] value: serde_json::Value, #[case] valid: bool) {
    let model = types_api(&format!("  Scalar: {kind}\n"));
    assert_eq!(validate(&model, "Scalar", value).is_empty(), valid);
}

#[test]
fn test_rfc2616_datetimes() {
    let model = types_api("  Stamp:\n    type: datetime\n    format: rfc2616\n");
    assert!(validate(&model, "Stamp", json!("Sun, 06 Nov 1994 08:49:37 GMT")).is_empty());
    assert_eq!(
        validate(&model, "Stamp", json!("1994-11-06T08:49:37Z")),
        vec!["Invalid datetime value '1994-11-06T08:49:37Z'"]
    );
}

#[test]
fn test_number_formats_and_steps() {
    let model = types_api(
        "  Small:\n    type: integer\n    format: int8\n  Even:\n    type: integer\n    multipleOf: 2\n",
    );
    assert_eq!(
        validate(&model, "Small", json!(300)),
        vec!["Value 300 is out of range for format int8"]
    );
    assert_eq!(
        validate(&model, "Even", json!(3)),
        vec!["Value must be a multiple of 2"]
    );
}

#[test]
fn test_enums_and_lengths() {
    let model = types_api(
        "  Color:\n    enum: [red, green]\n  Code:\n    type: string\n    minLength: 2\n    maxLength: 3\n",
    );
    assert!(validate(&model, "Color", json!("red")).is_empty());
    assert_eq!(
        validate(&model, "Color", json!("blue")),
        vec!["Value 'blue' must be one of: red, green"]
    );
    assert_eq!(
        validate(&model, "Code", json!("a")),
        vec!["Length must be at least 2"]
    );
}

#[test]
fn test_enum_is_checked_alongside_other_facets() {
    let model = types_api("  Code:\n    type: string\n    maxLength: 2\n    enum: [ab, cd]\n");
    assert!(validate(&model, "Code", json!("cd")).is_empty());
    assert_eq!(
        validate(&model, "Code", json!("xyz")),
        vec!["Length must be at most 2", "Value 'xyz' must be one of: ab, cd"]
    );
    assert_eq!(
        validate(&model, "Code", json!(12)),
        vec!["Expected string, got integer"]
    );
}

#[test]
fn test_union_reports_every_branch() {
    let model = types_api("  Id: integer | boolean\n");
    assert!(validate(&model, "Id", json!(7)).is_empty());
    assert_eq!(
        validate(&model, "Id", json!("seven")),
        vec![
            "Value does not match any member of the union",
            "integer: Expected integer, got string",
            "boolean: Expected boolean, got string",
        ]
    );
}

#[test]
fn test_union_discriminator_selects_a_branch() {
    let model = types_api(
        r#"  Shape:
    discriminator: kind
    properties:
      kind: string
  Circle:
    type: Shape
    properties:
      radius: number
  Square:
    type: Shape
    discriminatorValue: box
    properties:
      side: number
  Drawing: Circle | Square
"#,
    );
    assert!(validate(&model, "Drawing", json!({"kind": "Circle", "radius": 1})).is_empty());
    assert!(validate(&model, "Drawing", json!({"kind": "box", "side": 2})).is_empty());
    assert_eq!(
        validate(&model, "Drawing", json!({"kind": "box", "side": "wide"})),
        vec!["side: Expected number, got string"]
    );
}

#[test]
fn test_discriminator_value_is_not_inherited() {
    let model = types_api(
        r#"  A:
    discriminator: kind
    discriminatorValue: a
    properties:
      kind: string
  B:
    type: A
    properties:
      b: integer
  U: A | B
"#,
    );
    let b = model.runtime_type(type_named(&model, "B")).unwrap();
    assert!(b.object_facets().unwrap().discriminator_value.is_none());
    assert!(validate(&model, "U", json!({"kind": "a"})).is_empty());
    assert!(validate(&model, "U", json!({"kind": "B", "b": 1})).is_empty());
    assert_eq!(
        validate(&model, "U", json!({"kind": "B", "b": "notanint"})),
        vec!["b: Expected integer, got string"]
    );
}

#[test]
fn test_recursive_values() {
    let model = types_api(
        "  Node:\n    properties:\n      value: integer\n      children?: Node[]\n",
    );
    let value = json!({"value": 1, "children": [{"value": 2, "children": [{"value": "x"}]}]});
    assert_eq!(
        validate(&model, "Node", value),
        vec!["children: [0]: children: [0]: value: Expected integer, got string"]
    );
}

#[test]
fn test_failed_types_report_their_failure() {
    let model = types_api("  Lost: Nowhere\n");
    assert_eq!(
        validate(&model, "Lost", json!("anything")),
        vec!["unresolved type 'Nowhere'"]
    );
}

#[test]
fn test_strict_examples_are_checked() {
    let model = types_api(
        "  Age:\n    type: integer\n    minimum: 0\n    example: -3\n  Loose:\n    type: integer\n    example:\n      value: -3\n      strict: false\n",
    );
    let errors = errors(&model);
    assert_eq!(codes(&errors), vec!["E0010".to_string()]);
    assert!(errors[0].message.contains("greater than or equal to 0"));
}
