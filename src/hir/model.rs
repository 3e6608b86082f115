//! The model: arenas of lowered declarations plus query caches.
//!
//! ```text
//! SourceSet::load          ← raw documents (root first, then libraries)
//!     │
//!     ▼
//! lower                    ← arenas: documents, types, traits, resources, ...
//!     │
//!     ▼
//! Model                    ← immutable data + memoized queries
//!     ├── runtime_type(id)       type system builder
//!     ├── expand()               trait / resource type expansion
//!     ├── validate_instance()    instance validator
//!     └── diagnostics()          semantic checks
//! ```

use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::base::{Name, NodePath};
use crate::config::ModelConfig;
use crate::error::RamlError;
use crate::hir::declarations::{ResourceType, SecurityScheme, Trait};
use crate::hir::diagnostics::Diagnostic;
use crate::hir::document::Document;
use crate::hir::ids::{DocId, MethodId, ResourceId, ResourceTypeId, SchemeId, TraitId, TypeId};
use crate::hir::lower::lower_documents;
use crate::hir::resource::{Method, Resource};
use crate::hir::source::SourceSet;
use crate::hir::types::{RuntimeResult, TypeDeclaration};
use crate::syntax::RawDocument;

/// Path used for documents parsed from a single string.
pub const INLINE_DOCUMENT_PATH: &str = "api.raml";

/// What a recorded name reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ReferenceKind {
    Type,
    AnnotationType,
    Trait,
    ResourceType,
    SecurityScheme,
}

impl ReferenceKind {
    pub(crate) fn display(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::AnnotationType => "annotation type",
            Self::Trait => "trait",
            Self::ResourceType => "resource type",
            Self::SecurityScheme => "security scheme",
        }
    }
}

/// A name written somewhere in a document, checked by the semantic checker.
#[derive(Debug, Clone)]
pub(crate) struct ReferenceSite {
    pub kind: ReferenceKind,
    pub name: Name,
    pub scope: DocId,
    pub path: NodePath,
}

/// Immutable lowered data.
#[derive(Debug, Clone)]
pub(crate) struct ModelData {
    pub config: ModelConfig,
    pub expanded: bool,
    pub sources: Vec<RawDocument>,
    pub documents: Vec<Document>,
    pub types: Vec<TypeDeclaration>,
    pub traits: Vec<Trait>,
    pub resource_types: Vec<ResourceType>,
    pub schemes: Vec<SecurityScheme>,
    pub resources: Vec<Resource>,
    pub methods: Vec<Method>,
    pub references: Vec<ReferenceSite>,
    /// Found while lowering or expanding.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compute-once caches. Entries are inserted if absent; results are
/// deterministic, so a racing second writer produces an equal value.
#[derive(Debug, Default)]
pub(crate) struct QueryCache {
    pub runtime: RwLock<FxHashMap<TypeId, RuntimeResult>>,
    pub regexes: RwLock<FxHashMap<String, Option<Arc<Regex>>>>,
    pub all_traits: OnceCell<IndexMap<Name, TraitId>>,
    pub all_resource_types: OnceCell<IndexMap<Name, ResourceTypeId>>,
}

/// A resolved RAML model.
///
/// Cloning is cheap and shares both the data and the caches.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) data: Arc<ModelData>,
    pub(crate) cache: Arc<QueryCache>,
}

impl Model {
    pub(crate) fn from_data(data: ModelData) -> Self {
        Self {
            data: Arc::new(data),
            cache: Arc::new(QueryCache::default()),
        }
    }

    /// Load `root` and everything it uses from a source set.
    pub fn load(sources: &SourceSet, root: &str) -> Result<Self, RamlError> {
        Self::load_with_config(sources, root, ModelConfig::default())
    }

    pub fn load_with_config(
        sources: &SourceSet,
        root: &str,
        config: ModelConfig,
    ) -> Result<Self, RamlError> {
        let documents = sources.load(root)?;
        tracing::debug!(
            "[MODEL] lowering {} document(s) from '{}'",
            documents.len(),
            root
        );
        Ok(Self::from_data(lower_documents(
            documents,
            config,
            false,
            Vec::new(),
        )))
    }

    /// Parse a single self-contained document.
    pub fn parse(text: &str) -> Result<Self, RamlError> {
        Self::parse_with_config(text, ModelConfig::default())
    }

    pub fn parse_with_config(text: &str, config: ModelConfig) -> Result<Self, RamlError> {
        let sources = SourceSet::new().with_file(INLINE_DOCUMENT_PATH, text);
        Self::load_with_config(&sources, INLINE_DOCUMENT_PATH, config)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.data.config
    }

    /// Whether this model is the output of [`Model::expand`].
    pub fn is_expanded(&self) -> bool {
        self.data.expanded
    }

    // ------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------

    /// The root document.
    pub fn api(&self) -> &Document {
        &self.data.documents[DocId::ROOT.index()]
    }

    pub fn document(&self, id: DocId) -> &Document {
        &self.data.documents[id.index()]
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.data.documents.iter()
    }

    /// The raw document a lowered document was built from.
    pub fn source(&self, id: DocId) -> &RawDocument {
        &self.data.sources[id.index()]
    }

    pub fn type_decl(&self, id: TypeId) -> &TypeDeclaration {
        &self.data.types[id.index()]
    }

    pub fn trait_decl(&self, id: TraitId) -> &Trait {
        &self.data.traits[id.index()]
    }

    pub fn resource_type(&self, id: ResourceTypeId) -> &ResourceType {
        &self.data.resource_types[id.index()]
    }

    pub fn security_scheme(&self, id: SchemeId) -> &SecurityScheme {
        &self.data.schemes[id.index()]
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.data.resources[id.index()]
    }

    pub fn method(&self, id: MethodId) -> &Method {
        &self.data.methods[id.index()]
    }

    pub(crate) fn contains_method(&self, id: MethodId) -> bool {
        id.index() < self.data.methods.len()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.data.types.len()).map(TypeId::new)
    }

    pub fn trait_ids(&self) -> impl Iterator<Item = TraitId> + '_ {
        (0..self.data.traits.len()).map(TraitId::new)
    }

    pub fn resource_type_ids(&self) -> impl Iterator<Item = ResourceTypeId> + '_ {
        (0..self.data.resource_types.len()).map(ResourceTypeId::new)
    }

    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        (0..self.data.methods.len()).map(MethodId::new)
    }

    // ------------------------------------------------------------------
    // Root-scope lookups
    // ------------------------------------------------------------------

    /// Look up a type as the root document sees it, e.g. `Person` or `lib.Person`.
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.resolver().resolve_type(name).declared()
    }

    pub fn find_annotation_type(&self, name: &str) -> Option<TypeId> {
        self.resolver().resolve_annotation_type(name).declared()
    }

    pub fn find_trait(&self, name: &str) -> Option<TraitId> {
        self.resolver().resolve_trait(name).declared()
    }

    pub fn find_resource_type(&self, name: &str) -> Option<ResourceTypeId> {
        self.resolver().resolve_resource_type(name).declared()
    }

    pub fn find_security_scheme(&self, name: &str) -> Option<SchemeId> {
        self.resolver().resolve_security_scheme(name).declared()
    }

    /// Find a resource by its complete relative URI, e.g. `/users/{id}`.
    pub fn resource_by_path(&self, complete_relative_uri: &str) -> Option<ResourceId> {
        self.all_resources()
            .into_iter()
            .find(|&id| self.complete_relative_uri(id) == complete_relative_uri)
    }

    // ------------------------------------------------------------------
    // Shared caches
    // ------------------------------------------------------------------

    /// Compile a pattern once per model. `None` for invalid patterns.
    pub(crate) fn regex(&self, pattern: &str) -> Option<Arc<Regex>> {
        if let Some(cached) = self.cache.regexes.read().get(pattern) {
            return cached.clone();
        }
        let compiled = Regex::new(pattern).ok().map(Arc::new);
        self.cache
            .regexes
            .write()
            .entry(pattern.to_string())
            .or_insert(compiled)
            .clone()
    }
}

impl FromStr for Model {
    type Err = RamlError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}
