//! Declared view of type declarations.
//!
//! A [`TypeDeclaration`] reflects what was written: its `type` expression, its
//! own facets and its children. The inheritance-merged view is the
//! [`RuntimeType`](super::RuntimeType) built by
//! [`Model::runtime_type`](crate::hir::Model::runtime_type).

use std::fmt;

use indexmap::IndexMap;

use crate::base::{Name, NodePath};
use crate::hir::ids::{DocId, TypeId};
use crate::hir::refs::AnnotationRef;
use crate::parser::{TypeExpr, TypeExprError};
use crate::syntax::{TypeInstance, Value};

/// Where in the API a declaration appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelLocation {
    UriParameter,
    BaseUriParameter,
    Query,
    Header,
    Body,
    Annotation,
    Model,
    Unknown,
}

/// Coarse grouping of [`ModelLocation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    /// Parameters and bodies of resources, methods and responses.
    ApiStructure,
    /// `types`, `schemas` and `annotationTypes` entries.
    Declarations,
    /// Nested declarations: properties, items, facets.
    Models,
}

/// The parents of a declaration as written in `type` / `schema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSource {
    /// No `type` or `schema`; the kind follows from the facets present.
    Default,
    /// One expression, or several for multiple inheritance.
    Exprs(Vec<TypeExpr>),
    /// Expression with an unsubstituted `<<parameter>>`, inside a trait or
    /// resource type body.
    Template(String),
    Invalid(TypeExprError),
}

impl TypeSource {
    pub fn exprs(&self) -> &[TypeExpr] {
        match self {
            TypeSource::Exprs(exprs) => exprs,
            _ => &[],
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(self, TypeSource::Template(_))
    }
}

/// Things an annotation may be applied to (`allowedTargets`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationTarget {
    Api,
    DocumentationItem,
    Resource,
    Method,
    Response,
    RequestBody,
    ResponseBody,
    TypeDeclaration,
    Example,
    ResourceType,
    Trait,
    SecurityScheme,
    SecuritySchemeSettings,
    AnnotationType,
    Library,
    Overlay,
    Extension,
}

impl AnnotationTarget {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "API" => Self::Api,
            "DocumentationItem" => Self::DocumentationItem,
            "Resource" => Self::Resource,
            "Method" => Self::Method,
            "Response" => Self::Response,
            "RequestBody" => Self::RequestBody,
            "ResponseBody" => Self::ResponseBody,
            "TypeDeclaration" => Self::TypeDeclaration,
            "Example" => Self::Example,
            "ResourceType" => Self::ResourceType,
            "Trait" => Self::Trait,
            "SecurityScheme" => Self::SecurityScheme,
            "SecuritySchemeSettings" => Self::SecuritySchemeSettings,
            "AnnotationType" => Self::AnnotationType,
            "Library" => Self::Library,
            "Overlay" => Self::Overlay,
            "Extension" => Self::Extension,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::DocumentationItem => "DocumentationItem",
            Self::Resource => "Resource",
            Self::Method => "Method",
            Self::Response => "Response",
            Self::RequestBody => "RequestBody",
            Self::ResponseBody => "ResponseBody",
            Self::TypeDeclaration => "TypeDeclaration",
            Self::Example => "Example",
            Self::ResourceType => "ResourceType",
            Self::Trait => "Trait",
            Self::SecurityScheme => "SecurityScheme",
            Self::SecuritySchemeSettings => "SecuritySchemeSettings",
            Self::AnnotationType => "AnnotationType",
            Self::Library => "Library",
            Self::Overlay => "Overlay",
            Self::Extension => "Extension",
        }
    }
}

impl fmt::Display for AnnotationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability record of annotation type declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationFacets {
    /// Empty means "anywhere".
    pub allowed_targets: Vec<AnnotationTarget>,
    pub usage: Option<String>,
}

impl AnnotationFacets {
    pub fn allows(&self, target: AnnotationTarget) -> bool {
        self.allowed_targets.is_empty() || self.allowed_targets.contains(&target)
    }
}

/// One entry of `example` / `examples`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleSpec {
    /// Key in `examples`; `None` for the single `example` facet.
    pub name: Option<Name>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// Strict examples are validated against the declaration.
    pub strict: bool,
    pub value: Value,
    pub path: NodePath,
}

impl ExampleSpec {
    pub fn structured_value(&self) -> TypeInstance {
        TypeInstance::new(self.value.clone())
    }

    /// The example as text: strings verbatim, anything else as JSON.
    pub fn content(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_json().to_string(),
        }
    }
}

/// A type declaration: named type, annotation type, property, parameter,
/// body, array items or user facet declaration.
#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    /// Name without the optional `?` marker. Bodies are named by media type.
    pub name: Name,
    /// Document whose declarations are in scope for this node.
    pub doc: DocId,
    pub path: NodePath,
    pub location: ModelLocation,
    pub location_kind: LocationKind,
    pub source: TypeSource,
    /// `type` / `schema` as written.
    pub declared_types: Vec<String>,
    /// Anonymous declarations referenced by [`TypeExpr::Inline`].
    pub inline: Vec<TypeId>,
    pub properties: Vec<TypeId>,
    /// `/regex/` properties, keyed by the pattern without slashes.
    pub pattern_properties: Vec<(String, TypeId)>,
    pub items: Option<TypeId>,
    /// User facets declared through `facets`.
    pub facet_declarations: IndexMap<Name, TypeId>,
    pub required: bool,
    pub repeat: bool,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub examples: Vec<ExampleSpec>,
    pub annotations: Vec<AnnotationRef>,
    /// Present for `annotationTypes` entries only.
    pub annotation: Option<AnnotationFacets>,
    pub(crate) is_body: bool,
    /// The node as written, either a mapping or a shorthand expression.
    pub raw: Value,
}

impl TypeDeclaration {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `displayName`, defaulting to the name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// The declared `type` list, e.g. `["Person"]` or `["A", "B"]`.
    pub fn type_names(&self) -> &[String] {
        &self.declared_types
    }

    pub fn is_annotation_type(&self) -> bool {
        self.annotation.is_some()
    }

    /// `schema` facet as written (the legacy alias of `type`).
    pub fn schema(&self) -> Option<&str> {
        self.raw.get("schema").and_then(Value::as_str)
    }

    /// A facet value written directly on this node.
    pub fn facet(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// User facet declarations (`facets`).
    pub fn facets(&self) -> &IndexMap<Name, TypeId> {
        &self.facet_declarations
    }

    /// Value of the first example, if any.
    pub fn structured_example(&self) -> Option<TypeInstance> {
        self.examples.first().map(ExampleSpec::structured_value)
    }

    pub fn in_template(&self) -> bool {
        self.source.is_template()
    }
}
