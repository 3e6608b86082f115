//! Resources, methods and responses.
//!
//! Resources form a tree through [`Resource::children`] / [`Resource::parent`];
//! both are arena keys, so the parent link does not own anything.

use crate::base::{Name, NodePath};
use crate::hir::ids::{DocId, MethodId, ResourceId, ResourceTypeId, SchemeId, TraitId, TypeId};
use crate::hir::refs::{AnnotationRef, ResourceTypeRef, SecuritySchemeRef, TraitRef};

/// HTTP methods a resource may declare.
pub const HTTP_METHODS: &[&str] = &[
    "get", "patch", "put", "post", "delete", "head", "options", "trace", "connect",
];

/// Check a mapping key for a method name, optionally with the `?` marker
/// resource types use for optional methods.
pub(crate) fn method_key(key: &str) -> Option<(&str, bool)> {
    let (name, optional) = match key.strip_suffix('?') {
        Some(name) => (name, true),
        None => (key, false),
    };
    HTTP_METHODS.contains(&name).then_some((name, optional))
}

/// A response of a method.
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code as written, e.g. `"200"`.
    pub code: Name,
    pub description: Option<String>,
    pub headers: Vec<TypeId>,
    pub body: Vec<TypeId>,
    pub annotations: Vec<AnnotationRef>,
    pub path: NodePath,
}

impl Response {
    /// `2xx` codes.
    pub fn is_ok_range(&self) -> bool {
        self.code.len() == 3
            && self.code.starts_with('2')
            && self.code.chars().all(|c| c.is_ascii_digit())
    }
}

/// Everything a method, trait or `describedBy` block can declare.
#[derive(Debug, Clone, Default)]
pub struct MethodBase {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub headers: Vec<TypeId>,
    pub query_parameters: Vec<TypeId>,
    pub query_string: Option<TypeId>,
    /// Bodies, named by media type.
    pub body: Vec<TypeId>,
    pub responses: Vec<Response>,
    pub protocols: Vec<String>,
    pub is: Vec<TraitRef>,
    pub secured_by: Vec<SecuritySchemeRef>,
    pub annotations: Vec<AnnotationRef>,
}

impl MethodBase {
    pub fn response(&self, code: &str) -> Option<&Response> {
        self.responses.iter().find(|r| r.code == code)
    }
}

/// The declaration that owns a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodOwner {
    Resource(ResourceId),
    ResourceType(ResourceTypeId),
    /// The body of a trait, kept in the method arena.
    Trait(TraitId),
    /// The `describedBy` block of a security scheme.
    SecurityScheme(SchemeId),
}

/// A method declaration.
#[derive(Debug, Clone)]
pub struct Method {
    /// Method name without the optional marker, e.g. `get`.
    pub method: Name,
    /// `get?` in a resource type.
    pub optional: bool,
    pub owner: MethodOwner,
    pub doc: DocId,
    pub path: NodePath,
    pub base: MethodBase,
}

impl Method {
    pub fn parent_resource(&self) -> Option<ResourceId> {
        match self.owner {
            MethodOwner::Resource(id) => Some(id),
            _ => None,
        }
    }
}

/// Everything a resource or resource type can declare.
#[derive(Debug, Clone, Default)]
pub struct ResourceBase {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub methods: Vec<MethodId>,
    pub is: Vec<TraitRef>,
    pub type_ref: Option<ResourceTypeRef>,
    pub secured_by: Vec<SecuritySchemeRef>,
    /// `uriParameters` as written.
    pub declared_uri_parameters: Vec<TypeId>,
    pub annotations: Vec<AnnotationRef>,
}

/// A resource of the API tree.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Segment relative to the parent, e.g. `/{id}`.
    pub relative_uri: String,
    pub parent: Option<ResourceId>,
    pub children: Vec<ResourceId>,
    pub doc: DocId,
    pub path: NodePath,
    pub base: ResourceBase,
    /// Parameters of the relative URI in template order, explicit
    /// declarations paired with their `{name}` and missing ones synthesized.
    pub uri_parameters: Vec<TypeId>,
}

impl Resource {
    pub fn relative_uri(&self) -> &str {
        &self.relative_uri
    }

    pub fn parent_resource(&self) -> Option<ResourceId> {
        self.parent
    }

    pub fn methods(&self) -> &[MethodId] {
        &self.base.methods
    }
}
