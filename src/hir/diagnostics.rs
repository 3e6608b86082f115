//! Diagnostics: semantic error reporting.
//!
//! Document-content problems never abort loading. They are collected as
//! [`Diagnostic`]s attached to the node path of the smallest enclosing node,
//! so the rest of the model stays usable.

use std::sync::Arc;

use crate::base::NodePath;
use crate::hir::ids::{DocId, TypeId};
use crate::hir::model::{Model, ReferenceKind};
use crate::hir::refs::AnnotationRef;
use crate::hir::template::has_template;
use crate::hir::types::{TypeFailure, TypeKind};
use crate::syntax::Value;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Path of the document containing this diagnostic.
    pub document: Arc<str>,
    /// Node the diagnostic is attached to, e.g. `/types/Person/properties/id`.
    pub path: NodePath,
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Optional related information.
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug)]
pub struct RelatedInfo {
    pub document: Arc<str>,
    pub path: NodePath,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(
        document: impl Into<Arc<str>>,
        path: NodePath,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self::new(document, path, Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(
        document: impl Into<Arc<str>>,
        path: NodePath,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self::new(document, path, Severity::Warning, message)
    }

    fn new(
        document: impl Into<Arc<str>>,
        path: NodePath,
        severity: Severity,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            document: document.into(),
            path,
            severity,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.code {
            Some(code) => write!(
                f,
                "{level}[{code}] {}#{}: {}",
                self.document, self.path, self.message
            ),
            None => write!(f, "{level} {}#{}: {}", self.document, self.path, self.message),
        }
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Semantic errors (resolution, type building, values)
/// - **W0001-W0099**: Warnings
pub mod codes {
    /// Name not found in scope.
    pub const UNRESOLVED_REFERENCE: &str = "E0001";
    /// Parents of a type cannot be combined.
    pub const INCOMPATIBLE_TYPES: &str = "E0003";
    /// Name declared twice in the same scope.
    pub const DUPLICATE_DECLARATION: &str = "E0004";
    /// Inheritance cycle (types, resource types or traits).
    pub const CYCLIC_INHERITANCE: &str = "E0007";
    /// Malformed `type` / `schema` expression.
    pub const TYPE_EXPRESSION_SYNTAX: &str = "E0008";
    /// Facet value of the wrong shape.
    pub const INVALID_FACET: &str = "E0009";
    /// Example or annotation value rejected by its type.
    pub const INVALID_VALUE: &str = "E0010";
    /// Subtype sets a facet an ancestor already fixed.
    pub const FIXED_FACET_OVERRIDE: &str = "E0011";
    /// Annotation applied to a target its type does not allow.
    pub const INVALID_ANNOTATION_TARGET: &str = "E0012";
    /// Inheritance deeper than the configured bound.
    pub const INHERITANCE_TOO_DEEP: &str = "E0013";
    /// Unknown library namespace.
    pub const INVALID_IMPORT: &str = "E0014";
    /// User declaration named like a built-in type.
    pub const RESERVED_NAME: &str = "E0015";

    /// Facet not known for the type's kind.
    pub const UNKNOWN_FACET: &str = "W0001";
    /// Template parameter without a value at the application site.
    pub const MISSING_TEMPLATE_PARAMETER: &str = "W0002";
    /// Unknown `!transform` in a template parameter.
    pub const UNKNOWN_TRANSFORM: &str = "W0003";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during lowering, expansion and semantic checks.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add an error with a code.
    pub fn error(
        &mut self,
        document: &Arc<str>,
        path: &NodePath,
        code: &'static str,
        message: impl Into<Arc<str>>,
    ) {
        self.add(Diagnostic::error(document.clone(), path.clone(), message).with_code(code));
    }

    /// Add a warning with a code.
    pub fn warning(
        &mut self,
        document: &Arc<str>,
        path: &NodePath,
        code: &'static str,
        message: impl Into<Arc<str>>,
    ) {
        self.add(Diagnostic::warning(document.clone(), path.clone(), message).with_code(code));
    }

    /// Add a duplicate declaration error pointing back at the first one.
    pub fn duplicate_declaration(
        &mut self,
        document: &Arc<str>,
        path: &NodePath,
        name: &str,
        existing: &NodePath,
    ) {
        self.add(
            Diagnostic::error(
                document.clone(),
                path.clone(),
                format!("duplicate declaration: '{name}' is already declared"),
            )
            .with_code(codes::DUPLICATE_DECLARATION)
            .with_related(RelatedInfo {
                document: document.clone(),
                path: existing.clone(),
                message: Arc::from(format!("previous declaration of '{name}'")),
            }),
        );
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific document.
    pub fn diagnostics_for_document(&self, document: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| &*d.document == document)
            .collect()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

// ============================================================================
// SEMANTIC CHECKER
// ============================================================================

/// Semantic checks over a whole model.
///
/// Lowering and expansion diagnostics are carried over; the checker adds
/// unresolved references, inheritance cycles, type building failures and
/// facet problems, and validates strict examples and annotation values.
pub struct SemanticChecker<'a> {
    model: &'a Model,
    collector: DiagnosticCollector,
}

impl<'a> SemanticChecker<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            collector: DiagnosticCollector::new(),
        }
    }

    /// Run every check.
    pub fn check_all(&mut self) {
        self.collector.extend(self.model.data.diagnostics.iter().cloned());
        self.check_references();
        self.check_resource_type_cycles();
        self.check_trait_cycles();
        self.check_types();
        self.check_annotations();
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.collector.finish()
    }

    fn doc_path(&self, doc: DocId) -> Arc<str> {
        Arc::from(self.model.document(doc).path.as_str())
    }

    /// Names that resolve to nothing. A dotted name whose namespace is not
    /// imported is reported as a bad import instead.
    fn check_references(&mut self) {
        let model = self.model;
        for site in &model.data.references {
            let resolver = model.resolver().with_scope(site.scope);
            let found = match site.kind {
                ReferenceKind::Type => resolver.resolve_type(&site.name).is_found(),
                ReferenceKind::AnnotationType => {
                    resolver.resolve_annotation_type(&site.name).is_found()
                }
                ReferenceKind::Trait => resolver.resolve_trait(&site.name).is_found(),
                ReferenceKind::ResourceType => {
                    resolver.resolve_resource_type(&site.name).is_found()
                }
                ReferenceKind::SecurityScheme => {
                    resolver.resolve_security_scheme(&site.name).is_found()
                }
            };
            if found {
                continue;
            }
            let document = self.doc_path(site.scope);
            match resolver.unknown_namespace(&site.name) {
                Some(namespace) => self.collector.error(
                    &document,
                    &site.path,
                    codes::INVALID_IMPORT,
                    format!("unknown library namespace '{namespace}' in '{}'", site.name),
                ),
                None => self.collector.error(
                    &document,
                    &site.path,
                    codes::UNRESOLVED_REFERENCE,
                    format!("unresolved {} reference '{}'", site.kind.display(), site.name),
                ),
            }
        }
    }

    /// Each cycle is reported once, on its smallest member.
    fn check_resource_type_cycles(&mut self) {
        let model = self.model;
        for id in model.resource_type_ids() {
            let Err(cycle) = model.resource_type_chain(id) else {
                continue;
            };
            if cycle.iter().min() != Some(&id) {
                continue;
            }
            let mut names: Vec<&str> = cycle
                .iter()
                .map(|&member| model.resource_type(member).name.as_str())
                .collect();
            names.push(model.resource_type(id).name.as_str());
            let decl = model.resource_type(id);
            self.collector.error(
                &self.doc_path(decl.doc),
                &decl.path,
                codes::CYCLIC_INHERITANCE,
                format!("resource type cycle: {}", names.join(" -> ")),
            );
        }
    }

    fn check_trait_cycles(&mut self) {
        let model = self.model;
        for id in model.trait_ids() {
            let Some(cycle) = model.trait_cycle(id) else {
                continue;
            };
            if cycle.iter().min() != Some(&id) {
                continue;
            }
            let mut names: Vec<&str> = cycle
                .iter()
                .map(|&member| model.trait_decl(member).name.as_str())
                .collect();
            names.push(model.trait_decl(id).name.as_str());
            let decl = model.trait_decl(id);
            self.collector.error(
                &self.doc_path(decl.doc),
                &decl.path,
                codes::CYCLIC_INHERITANCE,
                format!("trait cycle: {}", names.join(" -> ")),
            );
        }
    }

    /// Type building failures (reported where they originate), facet
    /// issues and strict examples.
    fn check_types(&mut self) {
        let model = self.model;
        for id in model.type_ids() {
            let decl = model.type_decl(id);
            let document = self.doc_path(decl.doc);
            let rt = match model.runtime_type(id) {
                Ok(rt) => rt,
                Err(failure) => {
                    if failure.origin() == id {
                        self.report_failure(&document, &decl.path, &failure);
                    }
                    continue;
                }
            };
            for issue in &rt.issues {
                let diagnostic = match issue.severity {
                    Severity::Error => {
                        Diagnostic::error(document.clone(), issue.path.clone(), issue.message.as_str())
                    }
                    Severity::Warning => {
                        Diagnostic::warning(document.clone(), issue.path.clone(), issue.message.as_str())
                    }
                };
                self.collector.add(diagnostic.with_code(issue.code));
            }
            if rt.kind != TypeKind::External {
                self.check_examples(id, &document);
            }
        }
    }

    fn report_failure(&mut self, document: &Arc<str>, path: &NodePath, failure: &TypeFailure) {
        let code = match failure {
            TypeFailure::Cycle { .. } => codes::CYCLIC_INHERITANCE,
            TypeFailure::Syntax { .. } => codes::TYPE_EXPRESSION_SYNTAX,
            TypeFailure::Incompatible { .. } => codes::INCOMPATIBLE_TYPES,
            TypeFailure::DepthExceeded { .. } => codes::INHERITANCE_TOO_DEEP,
            // Reported from the reference list.
            TypeFailure::Unresolved { .. } => return,
        };
        self.collector.error(document, path, code, failure.to_string());
    }

    fn check_examples(&mut self, id: TypeId, document: &Arc<str>) {
        let model = self.model;
        for example in &model.type_decl(id).examples {
            if !example.strict || contains_template(&example.value) {
                continue;
            }
            for error in model.validate_instance(id, &example.value) {
                self.collector.error(
                    document,
                    &example.path,
                    codes::INVALID_VALUE,
                    format!("invalid example: {error}"),
                );
            }
        }
    }

    fn check_annotations(&mut self) {
        let model = self.model;
        let mut applied: Vec<(DocId, &AnnotationRef)> = Vec::new();
        for doc in model.documents() {
            applied.extend(doc.annotations.iter().map(|a| (doc.id, a)));
            for item in &doc.documentation {
                applied.extend(item.annotations.iter().map(|a| (doc.id, a)));
            }
        }
        for decl in &model.data.types {
            applied.extend(decl.annotations.iter().map(|a| (decl.doc, a)));
        }
        for resource in &model.data.resources {
            applied.extend(resource.base.annotations.iter().map(|a| (resource.doc, a)));
        }
        for rt in &model.data.resource_types {
            applied.extend(rt.base.annotations.iter().map(|a| (rt.doc, a)));
        }
        for method in &model.data.methods {
            applied.extend(method.base.annotations.iter().map(|a| (method.doc, a)));
            for response in &method.base.responses {
                applied.extend(response.annotations.iter().map(|a| (method.doc, a)));
            }
        }
        for scheme in &model.data.schemes {
            applied.extend(scheme.annotations.iter().map(|a| (scheme.doc, a)));
        }

        for (doc, annotation) in applied {
            self.check_annotation(doc, annotation);
        }
    }

    fn check_annotation(&mut self, doc: DocId, annotation: &AnnotationRef) {
        let model = self.model;
        let Some(type_id) = annotation.annotation_type_id(model) else {
            return;
        };
        let document = self.doc_path(doc);
        let decl = model.type_decl(type_id);
        if let Some(facets) = &decl.annotation {
            if !facets.allows(annotation.target) {
                self.collector.error(
                    &document,
                    &annotation.path,
                    codes::INVALID_ANNOTATION_TARGET,
                    format!(
                        "annotation '({})' is not allowed on {}",
                        annotation.name, annotation.target
                    ),
                );
            }
        }
        let value = annotation.structured_value().into_raw();
        if contains_template(&value) {
            return;
        }
        for error in model.validate_instance(type_id, &value) {
            self.collector.error(
                &document,
                &annotation.path,
                codes::INVALID_VALUE,
                format!("invalid value for annotation '({})': {error}", annotation.name),
            );
        }
    }
}

fn contains_template(value: &Value) -> bool {
    match value {
        Value::String(text) => has_template(text),
        Value::Sequence(items) => items.iter().any(contains_template),
        Value::Mapping(map) => map
            .iter()
            .any(|(key, item)| has_template(key) || contains_template(item)),
        _ => false,
    }
}

impl Model {
    /// Every diagnostic of the model: lowering and expansion findings plus
    /// the semantic checks.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut checker = SemanticChecker::new(self);
        checker.check_all();
        let diagnostics = checker.finish();
        tracing::debug!(
            "[CHECK] {} diagnostic(s) for '{}'",
            diagnostics.len(),
            self.api().path
        );
        diagnostics
    }
}
