//! Name resolution tests: scopes, library namespaces and aggregations.

use raml::hir::{Model, ResolveResult, TypeKind};

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;

fn library_model() -> Model {
    model_from_files(
        "api.raml",
        &[
            ("api.raml", LIBRARY_ROOT),
            ("libraries/shop.raml", SHOP_LIBRARY),
            ("libraries/common.raml", COMMON_LIBRARY),
        ],
    )
}

#[test]
fn test_root_scope_names() {
    let model = model_from(PERSON_API);
    let person = type_named(&model, "Person");
    assert_eq!(model.type_decl(person).name(), "Person");
    assert!(model.find_type("Nobody").is_none());
}

#[test]
fn test_builtin_names_resolve_to_builtins() {
    let model = model_from(PERSON_API);
    assert_eq!(
        model.resolver().resolve_type("datetime"),
        ResolveResult::Builtin(TypeKind::DateTime)
    );
    assert_eq!(
        model.resolver().resolve_type("Unknown"),
        ResolveResult::NotFound
    );
}

#[test]
fn test_library_names_are_qualified_from_the_root() {
    let model = library_model();
    assert!(model.find_type("shop.Order").is_some());
    assert!(model.find_type("shop.common.Id").is_some());
    assert!(model.find_type("Order").is_none());
    assert!(model.find_type("common.Id").is_none());
}

#[test]
fn test_library_declarations_see_their_siblings() {
    let model = library_model();
    let shop = model.resolver().resolve_library("shop").unwrap();
    let resolver = model.resolver().with_scope(shop);
    assert!(resolver.resolve_type("Order").is_found());
    assert!(resolver.resolve_type("common.Id").is_found());
    assert!(resolver.resolve_trait("paged").is_found());
    assert_eq!(resolver.unknown_namespace("billing.Invoice"), Some("billing"));
    assert_eq!(resolver.unknown_namespace("common.Id"), None);
}

#[test]
fn test_all_traits_and_resource_types_use_namespace_paths() {
    let model = library_model();
    let traits: Vec<&str> = model.all_traits().keys().map(|n| n.as_str()).collect();
    assert_eq!(traits, vec!["shop.paged"]);
    let resource_types: Vec<&str> = model
        .all_resource_types()
        .keys()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(resource_types, vec!["shop.collection"]);

    let paged = model.all_traits()["shop.paged"];
    assert_eq!(model.trait_decl(paged).name(), "paged");
}

#[test]
fn test_namespace_paths() {
    let model = library_model();
    let shop = model.resolver().resolve_library("shop").unwrap();
    let common = model.resolver().resolve_library("shop.common").unwrap();
    assert_eq!(model.namespace_path(shop, common).as_deref(), Some("common"));
    assert_eq!(model.namespace_path(shop, shop).as_deref(), Some(""));
    assert_eq!(model.namespace_path(common, shop), None);
}

#[test]
fn test_library_types_build_across_namespaces() {
    let model = library_model();
    let order = type_named(&model, "shop.Order");
    let rt = model.runtime_type(order).unwrap();
    let id = rt.property("id").unwrap();
    let id_rt = model.runtime_type(id.decl).unwrap();
    assert_eq!(id_rt.kind, TypeKind::Integer);
    assert_eq!(id_rt.scalar_facets().unwrap().minimum, Some(1.0));
    assert_no_errors(&model);
}

#[test]
fn test_reference_resolution_on_applied_traits() {
    let model = model_from(COLLECTION_API);
    let books = resource_at(&model, "/books");
    let applied = &model.resource(books).base.is;
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].trait_decl(&model).unwrap().name(), "secured");
    let rt = model.resource(books).base.type_ref.as_ref().unwrap();
    assert_eq!(rt.resource_type(&model).unwrap().name(), "collection");
    assert_eq!(rt.param_map()["limit"].as_u64(), Some(20));
}

#[test]
fn test_unknown_namespace_is_reported() {
    let model = model_from(
        "#%RAML 1.0\ntitle: T\ntypes:\n  Thing:\n    type: billing.Invoice\n",
    );
    let found = codes(&errors(&model));
    assert_eq!(found, vec!["E0014".to_string()]);
}

#[test]
fn test_unresolved_names_are_reported() {
    let model = model_from(
        "#%RAML 1.0\ntitle: T\n/items:\n  type: missing\n  get:\n    is: [absent]\n",
    );
    let errors = errors(&model);
    assert_eq!(codes(&errors), vec!["E0001".to_string(), "E0001".to_string()]);
    assert!(errors.iter().any(|e| e.message.contains("resource type reference 'missing'")));
    assert!(errors.iter().any(|e| e.message.contains("trait reference 'absent'")));
}

#[test]
fn test_duplicate_and_reserved_names() {
    let model = model_from(
        "#%RAML 1.0\ntitle: T\ntypes:\n  string:\n    type: object\n",
    );
    assert_eq!(codes(&errors(&model)), vec!["E0015".to_string()]);
}
