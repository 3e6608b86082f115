//! Semantic checker tests.

use raml::hir::{INLINE_DOCUMENT_PATH, SemanticChecker, Severity};

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;

#[test]
fn test_clean_documents_have_no_diagnostics() {
    for source in [PERSON_API, BASE_URI_API, COLLECTION_API] {
        let model = model_from(source);
        assert!(model.diagnostics().is_empty(), "{:?}", model.diagnostics());
    }
}

#[test]
fn test_checker_can_be_driven_directly() {
    let model = model_from("#%RAML 1.0\ntitle: T\ntypes:\n  A:\n    type: Missing\n");
    let mut checker = SemanticChecker::new(&model);
    checker.check_all();
    let diagnostics = checker.finish();
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(&*diagnostic.document, INLINE_DOCUMENT_PATH);
    let rendered = diagnostic.to_string();
    assert!(rendered.starts_with("error[E0001] api.raml#/types/A"), "{rendered}");
    assert!(rendered.ends_with(": unresolved type reference 'Missing'"), "{rendered}");
}

#[test]
fn test_duplicate_declarations_across_sections() {
    let model = model_from(
        "#%RAML 1.0\ntitle: T\ntypes:\n  Thing: string\nschemas:\n  Thing: string\n",
    );
    let errors = errors(&model);
    assert_eq!(codes(&errors), vec!["E0004".to_string()]);
    assert_eq!(errors[0].related.len(), 1);
}

#[test]
fn test_annotation_targets_and_values() {
    let model = model_from(
        r#"#%RAML 1.0
title: Annotated
annotationTypes:
  internal:
    type: boolean
    allowedTargets: [Method]
  owner: string
  marker:
(owner): platform
(internal): true
/items:
  (marker):
  get:
    (internal): not-a-flag
"#,
    );
    let errors = errors(&model);
    assert_eq!(codes(&errors), vec!["E0012", "E0010"]);
    assert!(errors[0].message.contains("not allowed on API"));
    assert!(errors[1].message.contains("Expected boolean, got string"));
}

#[test]
fn test_unknown_annotations_are_unresolved() {
    let model = model_from("#%RAML 1.0\ntitle: T\n(missing): 1\n");
    assert_eq!(codes(&errors(&model)), vec!["E0001".to_string()]);
}

#[test]
fn test_templates_are_not_validated() {
    let model = model_from(
        r#"#%RAML 1.0
title: Templates
annotationTypes:
  limit: integer
resourceTypes:
  paged:
    (limit): <<max>>
    get:
/items:
  type: { paged: { max: 10 } }
"#,
    );
    assert!(errors(&model).is_empty());
    let expanded = model.expand();
    assert_no_errors(&expanded);
}
