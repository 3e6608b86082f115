//! Expansion tests: resource types, traits, parameters and libraries.

use raml::hir::{DocId, Model, MethodId};
use raml::{MergePolicy, ModelConfig, Value};

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;

fn books_get(model: &Model) -> MethodId {
    let books = resource_at(model, "/books");
    model.child_method(books, "get").unwrap()
}

fn header_default(model: &Model, method: MethodId, header: &str) -> Option<Value> {
    model
        .method(method)
        .base
        .headers
        .iter()
        .map(|&id| model.type_decl(id))
        .find(|decl| decl.name() == header)
        .and_then(|decl| decl.default.clone())
}

#[test]
fn test_expand_returns_a_new_model() {
    let model = model_from(COLLECTION_API);
    let expanded = model.expand();
    assert!(!model.is_expanded());
    assert!(expanded.is_expanded());
    assert!(model.method(books_get(&model)).base.description.is_none());
}

#[test]
fn test_resource_type_parameters_are_substituted() {
    let expanded = model_from(COLLECTION_API).expand();
    let books = resource_at(&expanded, "/books");
    assert_eq!(
        expanded.resource(books).base.description.as_deref(),
        Some("All books")
    );

    let get = expanded.method(books_get(&expanded));
    assert_eq!(
        get.base.description.as_deref(),
        Some("List books, at most 20 per page")
    );
    let ok = get.base.response("200").unwrap();
    let body = expanded.type_decl(ok.body[0]);
    assert_eq!(body.name(), "application/json");
    assert_eq!(body.type_names(), ["Book[]".to_string()]);
    assert_no_errors(&expanded);
}

#[test]
fn test_optional_methods_need_an_explicit_method() {
    let expanded = model_from(COLLECTION_API).expand();
    let books = resource_at(&expanded, "/books");
    assert!(expanded.child_method(books, "post").is_none());

    let with_post = model_from(&COLLECTION_API.replace(
        "  get:\n    is: [traced]\n",
        "  get:\n    is: [traced]\n  post:\n",
    ))
    .expand();
    let books = resource_at(&with_post, "/books");
    let post = with_post.child_method(books, "post").unwrap();
    assert_eq!(
        with_post.method(post).base.description.as_deref(),
        Some("Create one book")
    );
    assert!(!with_post.method(post).optional);
}

#[test]
fn test_method_level_traits_win_over_resource_level() {
    let expanded = model_from(COLLECTION_API).expand();
    let get = books_get(&expanded);
    assert_eq!(
        header_default(&expanded, get, "X-Flag"),
        Some(Value::from("traced"))
    );
    let headers = names(&expanded, &expanded.method(get).base.headers);
    assert_eq!(headers, vec!["X-Flag", "X-Trace"]);
}

#[test]
fn test_explicit_declarations_win() {
    let source = COLLECTION_API.replace(
        "  get:\n    is: [traced]\n",
        "  get:\n    is: [traced]\n    description: Explicit\n    headers:\n      X-Flag:\n        default: explicit\n",
    );
    let expanded = model_from(&source).expand();
    let get = books_get(&expanded);
    assert_eq!(
        expanded.method(get).base.description.as_deref(),
        Some("Explicit")
    );
    assert_eq!(
        header_default(&expanded, get, "X-Flag"),
        Some(Value::from("explicit"))
    );
}

#[test]
fn test_resource_type_over_traits_policy() {
    let source = r#"#%RAML 1.0
title: Policy
resourceTypes:
  base:
    get:
      description: From the resource type
traits:
  described:
    description: From the trait
/items:
  type: base
  get:
    is: [described]
"#;
    let by_default = model_from(source).expand();
    let items = resource_at(&by_default, "/items");
    let get = by_default.child_method(items, "get").unwrap();
    assert_eq!(
        by_default.method(get).base.description.as_deref(),
        Some("From the trait")
    );

    let mut config = ModelConfig::default();
    config.expansion.merge_policy = MergePolicy::ResourceTypeOverTraits;
    let model = Model::parse_with_config(source, config).unwrap();
    let expanded = model.expand();
    let items = resource_at(&expanded, "/items");
    let get = expanded.child_method(items, "get").unwrap();
    assert_eq!(
        expanded.method(get).base.description.as_deref(),
        Some("From the resource type")
    );
}

#[test]
fn test_traits_applying_traits() {
    let source = r#"#%RAML 1.0
title: Nested
traits:
  base:
    description: base
    headers:
      X-Base: string
  derived:
    is: [base]
    description: derived
/items:
  get:
    is: [derived]
"#;
    let expanded = model_from(source).expand();
    let items = resource_at(&expanded, "/items");
    let get = expanded.method(expanded.child_method(items, "get").unwrap());
    assert_eq!(get.base.description.as_deref(), Some("derived"));
    assert_eq!(names(&expanded, &get.base.headers), vec!["X-Base"]);
}

#[test]
fn test_later_trait_replaces_a_header_whole() {
    let source = r#"#%RAML 1.0
title: Overlap
traits:
  t1:
    headers:
      X-Flag:
        default: one
        description: from t1
  t2:
    headers:
      X-Flag:
        default: two
/items:
  get:
    is: [t1, t2]
"#;
    let expanded = model_from(source).expand();
    let items = resource_at(&expanded, "/items");
    let get = expanded.child_method(items, "get").unwrap();
    let flag = expanded
        .method(get)
        .base
        .headers
        .iter()
        .map(|&id| expanded.type_decl(id))
        .find(|decl| decl.name() == "X-Flag")
        .unwrap();
    assert_eq!(flag.default, Some(Value::from("two")));
    assert!(flag.description.is_none());
    assert_no_errors(&expanded);
}

#[test]
fn test_reserved_parameters() {
    let source = r#"#%RAML 1.0
title: Reserved
traits:
  described:
    description: <<methodName | !uppercase>> <<resourcePath>> (<<resourcePathName>>)
/users/{id}:
  delete:
    is: [described]
"#;
    let expanded = model_from(source).expand();
    let users = resource_at(&expanded, "/users/{id}");
    let delete = expanded.child_method(users, "delete").unwrap();
    assert_eq!(
        expanded.method(delete).base.description.as_deref(),
        Some("DELETE /users/{id} (users)")
    );
}

#[test]
fn test_expansion_is_idempotent() {
    let once = model_from(COLLECTION_API).expand();
    let twice = once.expand();
    assert!(twice.is_expanded());
    assert_eq!(
        once.source(DocId::ROOT).root(),
        twice.source(DocId::ROOT).root()
    );
    assert_eq!(once.all_resources().len(), twice.all_resources().len());
}

#[test]
fn test_library_fragments_are_qualified() {
    let model = model_from_files(
        "api.raml",
        &[
            ("api.raml", LIBRARY_ROOT),
            ("libraries/shop.raml", SHOP_LIBRARY),
            ("libraries/common.raml", COMMON_LIBRARY),
        ],
    );
    let expanded = model.expand();
    let orders = resource_at(&expanded, "/orders");
    let get = expanded.method(expanded.child_method(orders, "get").unwrap());

    let applied: Vec<&str> = get.base.is.iter().map(|r| r.name()).collect();
    assert_eq!(applied, vec!["shop.paged"]);

    let page = expanded.type_decl(get.base.query_parameters[0]);
    assert_eq!(page.name(), "page");
    assert_eq!(page.type_names(), ["shop.common.Id".to_string()]);

    let body = expanded.type_decl(get.base.response("200").unwrap().body[0]);
    assert_eq!(body.type_names(), ["shop.Order[]".to_string()]);
    assert_no_errors(&expanded);
}

#[test]
fn test_resource_type_cycle_terminates() {
    let source = r#"#%RAML 1.0
title: Cycle
resourceTypes:
  first:
    type: second
    get:
  second:
    type: first
/loop:
  type: first
"#;
    let model = model_from(source);
    let expanded = model.expand();
    let looped = resource_at(&expanded, "/loop");
    assert!(expanded.child_method(looped, "get").is_none());

    let errors = errors(&model);
    assert_eq!(codes(&errors), vec!["E0007".to_string()]);
    assert!(errors[0].message.contains("first -> second -> first"));
}

#[test]
fn test_trait_cycle_terminates() {
    let source = r#"#%RAML 1.0
title: Cycle
traits:
  ping:
    is: [pong]
    description: ping
  pong:
    is: [ping]
/loop:
  get:
    is: [ping]
"#;
    let model = model_from(source);
    let expanded = model.expand();
    let looped = resource_at(&expanded, "/loop");
    let get = expanded.method(expanded.child_method(looped, "get").unwrap());
    assert_eq!(get.base.description.as_deref(), Some("ping"));
    assert_eq!(codes(&errors(&model)), vec!["E0007".to_string()]);
}

#[test]
fn test_template_warnings() {
    let source = r#"#%RAML 1.0
title: Warnings
traits:
  odd:
    description: <<missing>> and <<resourcePathName | !shout>>
/items:
  get:
    is: [odd]
"#;
    let expanded = model_from(source).expand();
    let diagnostics = expanded.diagnostics();
    let found = codes(&diagnostics);
    assert_eq!(found, vec!["W0002", "W0003"]);

    let items = resource_at(&expanded, "/items");
    let get = expanded.method(expanded.child_method(items, "get").unwrap());
    assert_eq!(
        get.base.description.as_deref(),
        Some("<<missing>> and items")
    );
}
