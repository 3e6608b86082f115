//! References to traits, resource types, security schemes and annotations.
//!
//! A reference is a name plus an optional parameter map, resolved in the
//! scope of the document it was written in. Resolution lives in
//! [`resolve`](super::resolve); these types only carry what was written.

use std::ops::Deref;

use crate::base::{Name, NodePath};
use crate::hir::ids::DocId;
use crate::hir::types::AnnotationTarget;
use crate::syntax::{TypeInstance, Value};

/// A name written at a reference site.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: Name,
    /// Parameter map, e.g. `{ collection: { item: User } }`.
    pub params: Option<TypeInstance>,
    /// Document scope the name resolves in.
    pub scope: DocId,
    pub path: NodePath,
}

impl Reference {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The reference as written: a bare name, or a single-key mapping.
    pub fn value(&self) -> Value {
        match &self.params {
            Some(params) => {
                let mut map = indexmap::IndexMap::new();
                map.insert(self.name.to_string(), params.raw().clone());
                Value::Mapping(map)
            }
            None => Value::String(self.name.to_string()),
        }
    }

    /// Parse a reference entry: `name`, `{ name: params }` or `null`.
    pub(crate) fn from_value(value: &Value, scope: DocId, path: NodePath) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self {
                name: Name::new(s.trim()),
                params: None,
                scope,
                path,
            }),
            Value::Null => Some(Self {
                name: Name::new_static("null"),
                params: None,
                scope,
                path,
            }),
            Value::Mapping(map) if map.len() == 1 => {
                let (name, params) = map.iter().next()?;
                Some(Self {
                    name: Name::new(name.trim()),
                    params: match params {
                        Value::Null => None,
                        other => Some(TypeInstance::new(other.clone())),
                    },
                    scope,
                    path,
                })
            }
            _ => None,
        }
    }

    /// Parameter values as strings keyed by name.
    pub fn param_map(&self) -> indexmap::IndexMap<String, Value> {
        self.params
            .as_ref()
            .and_then(|p| p.raw().as_mapping().cloned())
            .unwrap_or_default()
    }
}

macro_rules! reference_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(pub(crate) Reference);

        impl Deref for $name {
            type Target = Reference;

            fn deref(&self) -> &Reference {
                &self.0
            }
        }

        impl From<Reference> for $name {
            fn from(reference: Reference) -> Self {
                Self(reference)
            }
        }
    };
}

reference_type!(
    /// An entry of an `is` list.
    TraitRef
);
reference_type!(
    /// The `type` of a resource or resource type.
    ResourceTypeRef
);
reference_type!(
    /// An entry of a `securedBy` list. `null` stands for anonymous access.
    SecuritySchemeRef
);

impl SecuritySchemeRef {
    pub fn security_scheme_name(&self) -> &str {
        &self.name
    }

    /// `null` in `securedBy`: access without any scheme.
    pub fn is_anonymous(&self) -> bool {
        self.name == "null"
    }
}

/// An applied annotation, `(name): value`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRef {
    pub(crate) reference: Reference,
    pub target: AnnotationTarget,
}

impl AnnotationRef {
    pub(crate) fn new(
        name: &str,
        value: &Value,
        target: AnnotationTarget,
        scope: DocId,
        path: NodePath,
    ) -> Self {
        Self {
            reference: Reference {
                name: Name::new(name),
                params: Some(TypeInstance::new(value.clone())),
                scope,
                path,
            },
            target,
        }
    }

    /// The annotation value.
    pub fn structured_value(&self) -> TypeInstance {
        self.reference
            .params
            .clone()
            .unwrap_or_else(|| TypeInstance::new(Value::Null))
    }
}

impl Deref for AnnotationRef {
    type Target = Reference;

    fn deref(&self) -> &Reference {
        &self.reference
    }
}

/// Strip the parentheses of an annotation key, `(name)` to `name`.
pub(crate) fn annotation_name(key: &str) -> Option<&str> {
    key.strip_prefix('(')?.strip_suffix(')')
}
