//! Model helpers for loading RAML sources and inspecting diagnostics.

use raml::hir::{Diagnostic, Model, ResourceId, Severity, SourceSet, TypeId};

/// Parse a single RAML document, panicking on loading errors.
pub fn model_from(source: &str) -> Model {
    match Model::parse(source) {
        Ok(model) => model,
        Err(error) => panic!("failed to load document: {error}"),
    }
}

/// Load `root` from a set of `(path, text)` files.
pub fn model_from_files(root: &str, files: &[(&str, &str)]) -> Model {
    let mut sources = SourceSet::new();
    for (path, text) in files {
        sources.insert(path, *text);
    }
    match Model::load(&sources, root) {
        Ok(model) => model,
        Err(error) => panic!("failed to load '{root}': {error}"),
    }
}

pub fn type_named(model: &Model, name: &str) -> TypeId {
    model
        .find_type(name)
        .unwrap_or_else(|| panic!("type '{name}' not found"))
}

pub fn resource_at(model: &Model, path: &str) -> ResourceId {
    model
        .resource_by_path(path)
        .unwrap_or_else(|| panic!("resource '{path}' not found"))
}

/// Names of the declarations behind a list of type ids.
pub fn names(model: &Model, ids: &[TypeId]) -> Vec<String> {
    ids.iter()
        .map(|&id| model.type_decl(id).name.to_string())
        .collect()
}

pub fn errors(model: &Model) -> Vec<Diagnostic> {
    model
        .diagnostics()
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .collect()
}

pub fn codes(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .filter_map(|d| d.code.as_deref().map(str::to_string))
        .collect()
}

/// Assert a model reports no errors.
pub fn assert_no_errors(model: &Model) {
    let errors = errors(model);
    assert!(
        errors.is_empty(),
        "Expected no errors, got {} error(s):\n{}",
        errors.len(),
        errors
            .iter()
            .map(|e| format!("  {e}"))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
