//! Loading tests: headers, includes, libraries and declared views.

use raml::hir::{Model, SecuritySchemeKind, SecuritySchemeSettings, SourceSet};
use raml::{DocumentKind, RamlError};

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;

#[test]
fn test_missing_header_is_an_error() {
    let result = Model::parse("title: No header\n");
    assert!(matches!(result, Err(RamlError::MissingHeader(_))));
}

#[test]
fn test_missing_source_is_an_error() {
    let result = Model::load(&SourceSet::new(), "api.raml");
    assert!(matches!(result, Err(RamlError::SourceNotFound(_))));
}

#[test]
fn test_api_metadata() {
    let model = model_from(BASE_URI_API);
    let api = model.api();
    assert_eq!(api.kind, DocumentKind::Api);
    assert_eq!(api.title.as_deref(), Some("Tenants"));
    assert_eq!(api.version.as_deref(), Some("v1"));
    assert_eq!(api.raml_version(), "RAML10");
}

#[test]
fn test_include_inlines_yaml_and_text() {
    let model = model_from_files(
        "api.raml",
        &[
            (
                "api.raml",
                "#%RAML 1.0\ntitle: T\ntypes: !include types/all.raml\ndocumentation:\n  - title: Intro\n    content: !include docs/intro.md\n",
            ),
            ("types/all.raml", "Thing:\n  properties:\n    id: integer\n"),
            ("docs/intro.md", "# Hello"),
        ],
    );
    assert!(model.find_type("Thing").is_some());
    assert_eq!(model.api().documentation[0].content, "# Hello");
}

#[test]
fn test_include_cycle_is_an_error() {
    let mut sources = SourceSet::new();
    sources.insert("api.raml", "#%RAML 1.0\ntitle: T\ntypes: !include a.yaml\n");
    sources.insert("a.yaml", "A: !include a.yaml\n");
    assert!(matches!(
        Model::load(&sources, "api.raml"),
        Err(RamlError::IncludeCycle(_))
    ));
}

#[test]
fn test_uses_must_point_at_a_library() {
    let mut sources = SourceSet::new();
    sources.insert("api.raml", "#%RAML 1.0\ntitle: T\nuses:\n  other: other.raml\n");
    sources.insert("other.raml", "#%RAML 1.0\ntitle: Other\n");
    assert!(matches!(
        Model::load(&sources, "api.raml"),
        Err(RamlError::NotALibrary { .. })
    ));
}

#[test]
fn test_libraries_are_loaded_transitively() {
    let model = model_from_files(
        "api.raml",
        &[
            ("api.raml", LIBRARY_ROOT),
            ("libraries/shop.raml", SHOP_LIBRARY),
            ("libraries/common.raml", COMMON_LIBRARY),
        ],
    );
    let kinds: Vec<DocumentKind> = model.documents().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![DocumentKind::Api, DocumentKind::Library, DocumentKind::Library]
    );
    let shop = model.documents().nth(1).unwrap();
    assert!(shop.is_library());
    assert_eq!(shop.usage.as_deref(), Some("Shared shop declarations"));
}

#[test]
fn test_security_schemes() {
    let model = model_from(
        r#"#%RAML 1.0
title: Secure
securitySchemes:
  oauth:
    type: OAuth 2.0
    describedBy:
      headers:
        Authorization: string
    settings:
      accessTokenUri: https://auth.example.com/token
      authorizationGrants: [authorization_code]
      scopes: [read, write]
  custom:
    type: x-token
securedBy: [oauth, null]
/items:
  get:
"#,
    );
    let oauth = model.security_scheme(model.find_security_scheme("oauth").unwrap());
    assert_eq!(oauth.kind, Some(SecuritySchemeKind::OAuth2));
    match &oauth.settings {
        Some(SecuritySchemeSettings::OAuth2(settings)) => {
            assert_eq!(settings.scopes, vec!["read".to_string(), "write".to_string()]);
        }
        other => panic!("unexpected settings {other:?}"),
    }
    let described_by = model.method(oauth.described_by.unwrap());
    assert_eq!(names(&model, &described_by.base.headers), vec!["Authorization"]);

    let custom = model.security_scheme(model.find_security_scheme("custom").unwrap());
    assert_eq!(
        custom.kind,
        Some(SecuritySchemeKind::Custom("x-token".to_string()))
    );

    let items = resource_at(&model, "/items");
    let get = model.child_method(items, "get").unwrap();
    let secured: Vec<String> = model
        .all_secured_by(get)
        .iter()
        .map(|s| s.security_scheme_name().to_string())
        .collect();
    assert_eq!(secured, vec!["oauth".to_string(), "null".to_string()]);
    assert!(model.all_secured_by(get)[1].is_anonymous());
    assert_no_errors(&model);
}
