//! High-level IR (HIR): the RAML semantic model.
//!
//! Raw documents are lowered once into arenas of declarations; everything
//! else is a query on the resulting [`Model`], memoized where it is costly.
//!
//! ## Key Types
//!
//! - [`Model`] - Lowered declarations plus query caches
//! - [`Resolver`] - Name resolution across `uses` imports
//! - [`TypeDeclaration`] / [`RuntimeType`] - Declared and effective types
//! - [`SemanticChecker`] - Model-wide diagnostics
//!
//! ## Query Layers
//!
//! ```text
//! SourceSet::load(root)       ← INPUT: raw documents
//!     │
//!     ▼
//! lower_documents             ← arenas (per model)
//!     │
//!     ▼
//! resolve_*(scope, name)      ← name resolution
//!     │
//!     ├── runtime_type(id)    ← type system builder (cached)
//!     ├── expand()            ← new model with traits / resource types applied
//!     ├── validate_instance() ← instance validator
//!     ▼
//! diagnostics()               ← semantic errors
//! ```

mod declarations;
mod diagnostics;
mod document;
mod expand;
mod ids;
mod lower;
mod model;
mod refs;
mod resolve;
mod resource;
mod source;
mod template;
mod types;
mod uri;
mod validate;

pub use declarations::{
    OAuth1Settings, OAuth2Settings, PassThroughSettings, ResourceType, SecurityScheme,
    SecuritySchemeKind, SecuritySchemeSettings, Trait,
};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, RelatedInfo, SemanticChecker, Severity, codes,
};
pub use document::{Document, DocumentationItem};
pub use ids::{DocId, MethodId, ResourceId, ResourceTypeId, SchemeId, TraitId, TypeId};
pub use model::{INLINE_DOCUMENT_PATH, Model};
pub use refs::{AnnotationRef, Reference, ResourceTypeRef, SecuritySchemeRef, TraitRef};
pub use resolve::{ResolveResult, Resolver};
pub use resource::{HTTP_METHODS, Method, MethodBase, MethodOwner, Resource, ResourceBase, Response};
pub use source::SourceSet;
pub use template::{
    RESERVED_PARAMETERS, Substitution, apply_transform, pluralize, singularize, substitute,
    template_parameters,
};
pub use types::{
    AnnotationFacets, AnnotationTarget, ArrayFacets, BUILTIN_TYPE_NAMES, ExampleSpec,
    LocationKind, ModelLocation, ObjectFacets, PatternProperty, PropertyShape, RuntimeResult,
    RuntimeType, ScalarFacets, TypeDeclaration, TypeFailure, TypeHandle, TypeIssue, TypeKind,
    TypeSource, builtin_type, is_builtin,
};
pub use uri::template_parameter_names;
