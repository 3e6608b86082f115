//! Document roots: APIs, overlays, extensions and libraries.

use indexmap::IndexMap;

use crate::base::Name;
use crate::hir::ids::{DocId, ResourceId, ResourceTypeId, SchemeId, TraitId, TypeId};
use crate::hir::refs::{AnnotationRef, SecuritySchemeRef};
use crate::syntax::DocumentKind;

/// An entry of `documentation`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentationItem {
    pub title: String,
    pub content: String,
    pub annotations: Vec<AnnotationRef>,
}

/// A lowered document. Libraries only carry declarations; resources and
/// API metadata are empty for them.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocId,
    pub kind: DocumentKind,
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub base_uri: Option<String>,
    pub protocols: Vec<String>,
    pub media_types: Vec<String>,
    pub secured_by: Vec<SecuritySchemeRef>,
    pub documentation: Vec<DocumentationItem>,
    pub annotations: Vec<AnnotationRef>,
    /// Library `usage`.
    pub usage: Option<String>,
    /// `extends` of overlays and extensions.
    pub master_ref: Option<String>,
    pub types: IndexMap<Name, TypeId>,
    /// Legacy `schemas`, resolvable like `types`.
    pub schemas: IndexMap<Name, TypeId>,
    pub annotation_types: IndexMap<Name, TypeId>,
    pub traits: IndexMap<Name, TraitId>,
    pub resource_types: IndexMap<Name, ResourceTypeId>,
    pub security_schemes: IndexMap<Name, SchemeId>,
    /// Namespace to imported library.
    pub uses: IndexMap<Name, DocId>,
    /// `baseUriParameters` in template order, missing ones synthesized.
    pub base_uri_parameters: Vec<TypeId>,
    /// Top-level resources.
    pub resources: Vec<ResourceId>,
}

impl Document {
    pub(crate) fn new(id: DocId, kind: DocumentKind, path: &str) -> Self {
        Self {
            id,
            kind,
            path: path.to_string(),
            title: None,
            description: None,
            version: None,
            base_uri: None,
            protocols: Vec::new(),
            media_types: Vec::new(),
            secured_by: Vec::new(),
            documentation: Vec::new(),
            annotations: Vec::new(),
            usage: None,
            master_ref: None,
            types: IndexMap::new(),
            schemas: IndexMap::new(),
            annotation_types: IndexMap::new(),
            traits: IndexMap::new(),
            resource_types: IndexMap::new(),
            security_schemes: IndexMap::new(),
            uses: IndexMap::new(),
            base_uri_parameters: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn raml_version(&self) -> &'static str {
        "RAML10"
    }

    pub fn is_library(&self) -> bool {
        self.kind == DocumentKind::Library
    }

    /// The first declared media type.
    pub fn default_media_type(&self) -> Option<&str> {
        self.media_types.first().map(String::as_str)
    }
}
