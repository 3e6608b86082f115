//! URI parameter, resource tree and method identity tests.

use raml::RamlError;
use raml::hir::{TypeKind, template_parameter_names};

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;

const ITEMS: &str = "/users/{userId}/items/{itemId}";

#[test]
fn test_base_uri_parameters_follow_the_template() {
    let model = model_from(BASE_URI_API);
    assert_eq!(
        names(&model, model.base_uri_parameters()),
        vec!["organization", "version", "service"]
    );
    let service = model.base_uri_parameters()[2];
    let rt = model.runtime_type(service).unwrap();
    assert_eq!(rt.enum_values().map(<[_]>::len), Some(2));
    let organization = model.base_uri_parameters()[0];
    assert_eq!(model.type_kind(organization), Some(TypeKind::String));
    assert!(model.type_decl(organization).required);
}

#[test]
fn test_resource_tree() {
    let model = model_from(BASE_URI_API);
    let paths: Vec<String> = model
        .all_resources()
        .into_iter()
        .map(|id| model.complete_relative_uri(id))
        .collect();
    assert_eq!(paths, vec!["/users", "/users/{userId}", ITEMS]);

    let items = resource_at(&model, ITEMS);
    let user = model.resource(items).parent_resource().unwrap();
    assert_eq!(model.resource(user).relative_uri(), "/{userId}");
    assert_eq!(model.child_resource(Some(user), "/items/{itemId}"), Some(items));
    assert_eq!(
        model.resource_chain(items).len(),
        3
    );
}

#[test]
fn test_uri_parameters_per_level() {
    let model = model_from(BASE_URI_API);
    let items = resource_at(&model, ITEMS);
    assert_eq!(names(&model, model.uri_parameters(items)), vec!["itemId"]);
    assert_eq!(
        names(&model, &model.all_uri_parameters(items)),
        vec!["userId", "itemId"]
    );
    assert_eq!(
        names(&model, &model.absolute_uri_parameters(items)),
        vec!["organization", "version", "service", "userId", "itemId"]
    );

    let user = resource_at(&model, "/users/{userId}");
    let user_id = model.uri_parameters(user)[0];
    assert_eq!(model.type_kind(user_id), Some(TypeKind::Integer));
}

#[test]
fn test_absolute_uri_and_protocols() {
    let model = model_from(BASE_URI_API);
    let items = resource_at(&model, ITEMS);
    assert_eq!(
        model.absolute_uri(items),
        "https://{organization}.example.com/{version}/{service}/users/{userId}/items/{itemId}"
    );
    assert_eq!(model.all_protocols(), vec!["HTTPS"]);
    assert_eq!(
        template_parameter_names(model.api().base_uri.as_deref().unwrap()),
        vec!["organization", "version", "service"]
    );
}

#[test]
fn test_method_ids() {
    let model = model_from(BASE_URI_API);
    let items = resource_at(&model, ITEMS);
    let get = model.child_method(items, "get").unwrap();
    assert_eq!(model.method_id(get).unwrap(), format!("{ITEMS} get"));

    let catalog = model_from(COLLECTION_API);
    let collection = catalog.find_resource_type("collection").unwrap();
    let methods = &catalog.resource_type(collection).base.methods;
    let ids: Vec<String> = methods
        .iter()
        .map(|&m| catalog.method_id(m).unwrap())
        .collect();
    assert_eq!(ids, vec!["collection get", "collection post"]);
    assert!(catalog.method(methods[1]).optional);

    let secured = catalog.find_trait("secured").unwrap();
    let body = catalog.trait_decl(secured).body;
    assert!(matches!(
        catalog.method_id(body),
        Err(RamlError::InvalidUsage(_))
    ));
}
