//! Name resolution: resolving references to their declarations.
//!
//! Scope is explicit: every lookup starts from a document ([`DocId`]).
//!
//! 1. Built-in type names always win and resolve to synthetic definitions.
//! 2. Dotted names (`lib.Name`, `outer.inner.Name`) walk the `uses`
//!    namespaces from the scope document; the last segment is looked up in
//!    the library reached.
//! 3. Undotted names are looked up in the scope document itself, so
//!    declarations of a library see their siblings unqualified.
//!
//! Aggregations across the whole import graph ([`Model::all_traits`],
//! [`Model::all_resource_types`]) are computed once and cached.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::base::Name;
use crate::hir::declarations::{ResourceType, SecurityScheme, Trait};
use crate::hir::document::Document;
use crate::hir::ids::{DocId, ResourceTypeId, SchemeId, TraitId, TypeId};
use crate::hir::model::Model;
use crate::hir::refs::{AnnotationRef, ResourceTypeRef, SecuritySchemeRef, TraitRef};
use crate::hir::types::{TypeDeclaration, TypeKind, is_builtin};

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

/// Result of resolving a name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveResult<T> {
    /// A user declaration.
    Found(T),
    /// A built-in type (type lookups only).
    Builtin(TypeKind),
    /// Nothing of that name is visible.
    NotFound,
}

impl<T: Copy> ResolveResult<T> {
    /// The user declaration, if the name resolved to one.
    pub fn declared(&self) -> Option<T> {
        match self {
            ResolveResult::Found(id) => Some(*id),
            _ => None,
        }
    }

    /// Check if resolution was successful.
    pub fn is_found(&self) -> bool {
        !matches!(self, ResolveResult::NotFound)
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolver for name lookups from one document scope.
#[derive(Clone, Debug)]
pub struct Resolver<'a> {
    model: &'a Model,
    scope: DocId,
}

impl Model {
    /// A resolver for the root document.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }
}

impl<'a> Resolver<'a> {
    /// Create a resolver for the root document.
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            scope: DocId::ROOT,
        }
    }

    /// Set the current scope.
    pub fn with_scope(mut self, scope: DocId) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> DocId {
        self.scope
    }

    /// Resolve a (possibly dotted) library namespace, e.g. `lib` or `lib.inner`.
    pub fn resolve_library(&self, namespace: &str) -> Option<DocId> {
        let mut doc = self.scope;
        for segment in namespace.split('.') {
            doc = *self.model.document(doc).uses.get(segment)?;
        }
        Some(doc)
    }

    /// The namespace prefix of `name` when it does not resolve to a library.
    pub fn unknown_namespace<'n>(&self, name: &'n str) -> Option<&'n str> {
        let (namespace, _) = name.rsplit_once('.')?;
        self.resolve_library(namespace).is_none().then_some(namespace)
    }

    pub fn resolve_type(&self, name: &str) -> ResolveResult<TypeId> {
        if is_builtin(name) {
            return TypeKind::from_builtin(name)
                .map(ResolveResult::Builtin)
                .unwrap_or(ResolveResult::NotFound);
        }
        self.lookup(name, "type", |doc, n| {
            doc.types.get(n).or_else(|| doc.schemas.get(n)).copied()
        })
    }

    pub fn resolve_annotation_type(&self, name: &str) -> ResolveResult<TypeId> {
        self.lookup(name, "annotation type", |doc, n| {
            doc.annotation_types.get(n).copied()
        })
    }

    pub fn resolve_trait(&self, name: &str) -> ResolveResult<TraitId> {
        self.lookup(name, "trait", |doc, n| doc.traits.get(n).copied())
    }

    pub fn resolve_resource_type(&self, name: &str) -> ResolveResult<ResourceTypeId> {
        self.lookup(name, "resource type", |doc, n| {
            doc.resource_types.get(n).copied()
        })
    }

    pub fn resolve_security_scheme(&self, name: &str) -> ResolveResult<SchemeId> {
        self.lookup(name, "security scheme", |doc, n| {
            doc.security_schemes.get(n).copied()
        })
    }

    fn lookup<T: Copy>(
        &self,
        name: &str,
        what: &str,
        get: impl Fn(&Document, &str) -> Option<T>,
    ) -> ResolveResult<T> {
        let (doc, local) = match name.rsplit_once('.') {
            Some((namespace, local)) => match self.resolve_library(namespace) {
                Some(doc) => (doc, local),
                None => {
                    tracing::debug!(
                        "[RESOLVE] unknown namespace '{}' for {} '{}' in {:?}",
                        namespace,
                        what,
                        name,
                        self.scope
                    );
                    return ResolveResult::NotFound;
                }
            },
            None => (self.scope, name),
        };

        match get(self.model.document(doc), local) {
            Some(found) => {
                tracing::trace!("[RESOLVE] {} '{}' found in {:?}", what, name, doc);
                ResolveResult::Found(found)
            }
            None => {
                tracing::debug!("[RESOLVE] {} '{}' not found in {:?}", what, name, doc);
                ResolveResult::NotFound
            }
        }
    }
}

// ============================================================================
// REFERENCE RESOLUTION
// ============================================================================

impl TraitRef {
    pub fn trait_id(&self, model: &Model) -> Option<TraitId> {
        Resolver::new(model)
            .with_scope(self.scope)
            .resolve_trait(&self.name)
            .declared()
    }

    /// The referenced trait. Its name is the last segment of this
    /// reference's name.
    pub fn trait_decl<'m>(&self, model: &'m Model) -> Option<&'m Trait> {
        self.trait_id(model).map(|id| model.trait_decl(id))
    }
}

impl ResourceTypeRef {
    pub fn resource_type_id(&self, model: &Model) -> Option<ResourceTypeId> {
        Resolver::new(model)
            .with_scope(self.scope)
            .resolve_resource_type(&self.name)
            .declared()
    }

    pub fn resource_type<'m>(&self, model: &'m Model) -> Option<&'m ResourceType> {
        self.resource_type_id(model).map(|id| model.resource_type(id))
    }
}

impl SecuritySchemeRef {
    /// `None` for unresolved names and for anonymous (`null`) access.
    pub fn security_scheme_id(&self, model: &Model) -> Option<SchemeId> {
        if self.is_anonymous() {
            return None;
        }
        Resolver::new(model)
            .with_scope(self.scope)
            .resolve_security_scheme(&self.name)
            .declared()
    }

    pub fn security_scheme<'m>(&self, model: &'m Model) -> Option<&'m SecurityScheme> {
        self.security_scheme_id(model)
            .map(|id| model.security_scheme(id))
    }
}

impl AnnotationRef {
    pub fn annotation_type_id(&self, model: &Model) -> Option<TypeId> {
        Resolver::new(model)
            .with_scope(self.scope)
            .resolve_annotation_type(&self.name)
            .declared()
    }

    pub fn annotation_type<'m>(&self, model: &'m Model) -> Option<&'m TypeDeclaration> {
        self.annotation_type_id(model).map(|id| model.type_decl(id))
    }
}

// ============================================================================
// IMPORT GRAPH QUERIES
// ============================================================================

impl Model {
    /// Documents reachable from `from` through `uses`, breadth first, each
    /// paired with the dotted namespace path that reaches it (`""` for
    /// `from` itself).
    pub fn uses_closure(&self, from: DocId) -> Vec<(String, DocId)> {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([(String::new(), from)]);
        let mut out = Vec::new();
        seen.insert(from);
        while let Some((prefix, doc)) = queue.pop_front() {
            for (namespace, &target) in &self.document(doc).uses {
                if seen.insert(target) {
                    let path = if prefix.is_empty() {
                        namespace.to_string()
                    } else {
                        format!("{prefix}.{namespace}")
                    };
                    queue.push_back((path, target));
                }
            }
            out.push((prefix, doc));
        }
        out
    }

    /// Namespace path under which `scope` sees declarations of `target`.
    /// `Some("")` when they are the same document.
    pub fn namespace_path(&self, scope: DocId, target: DocId) -> Option<String> {
        self.uses_closure(scope)
            .into_iter()
            .find(|(_, doc)| *doc == target)
            .map(|(path, _)| path)
    }

    /// Every trait visible from the root: root traits unqualified, library
    /// traits under their namespace path.
    pub fn all_traits(&self) -> &IndexMap<Name, TraitId> {
        self.cache
            .all_traits
            .get_or_init(|| self.aggregate(|doc| &doc.traits))
    }

    /// Every resource type visible from the root, named like [`Model::all_traits`].
    pub fn all_resource_types(&self) -> &IndexMap<Name, ResourceTypeId> {
        self.cache
            .all_resource_types
            .get_or_init(|| self.aggregate(|doc| &doc.resource_types))
    }

    fn aggregate<T: Copy>(
        &self,
        section: impl Fn(&Document) -> &IndexMap<Name, T>,
    ) -> IndexMap<Name, T> {
        let mut out = IndexMap::new();
        for (prefix, doc) in self.uses_closure(DocId::ROOT) {
            for (name, &id) in section(self.document(doc)) {
                let qualified = if prefix.is_empty() {
                    name.clone()
                } else {
                    Name::new(format!("{prefix}.{name}"))
                };
                out.entry(qualified).or_insert(id);
            }
        }
        out
    }

    /// The resource type chain starting at `id`, following `type`.
    ///
    /// `Err` carries the members of the cycle the chain runs into.
    pub fn resource_type_chain(
        &self,
        id: ResourceTypeId,
    ) -> Result<Vec<ResourceTypeId>, Vec<ResourceTypeId>> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self
            .resource_type(current)
            .base
            .type_ref
            .as_ref()
            .and_then(|r| r.resource_type_id(self))
        {
            if let Some(pos) = chain.iter().position(|&seen| seen == parent) {
                tracing::debug!("[RESOLVE] resource type cycle through {:?}", parent);
                return Err(chain.split_off(pos));
            }
            if chain.len() > self.config().max_inheritance_depth {
                return Err(chain);
            }
            chain.push(parent);
            current = parent;
        }
        Ok(chain)
    }

    /// A cycle of traits applying traits that passes through `id`.
    pub fn trait_cycle(&self, id: TraitId) -> Option<Vec<TraitId>> {
        let mut visited = FxHashSet::default();
        let mut path = vec![id];
        self.trait_cycle_from(id, id, &mut visited, &mut path)
            .then_some(path)
    }

    fn trait_cycle_from(
        &self,
        start: TraitId,
        current: TraitId,
        visited: &mut FxHashSet<TraitId>,
        path: &mut Vec<TraitId>,
    ) -> bool {
        if path.len() > self.config().max_inheritance_depth {
            return false;
        }
        let body = self.method(self.trait_decl(current).body);
        for applied in &body.base.is {
            let Some(next) = applied.trait_id(self) else {
                continue;
            };
            if next == start {
                return true;
            }
            if visited.insert(next) {
                path.push(next);
                if self.trait_cycle_from(start, next, visited, path) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }
}
