//! Runtime types: the inheritance-merged view used for validation.
//!
//! Member types (property, item and union branch types) are kept as handles
//! and resolved on demand, so recursive structures such as
//! `Person { friends: Person[] }` are representable.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::base::{Name, NodePath};
use crate::hir::diagnostics::Severity;
use crate::hir::ids::{DocId, TypeId};
use crate::parser::{TypeExpr, TypeExprError};
use crate::syntax::Value;

/// The kind of a runtime type. Selects which capability record applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Any,
    Nil,
    String,
    Number,
    Integer,
    Boolean,
    DateOnly,
    TimeOnly,
    DateTimeOnly,
    DateTime,
    File,
    Object,
    Array,
    Union,
    /// Inline or referenced JSON / XML schema, kept opaque.
    External,
}

impl TypeKind {
    pub fn from_builtin(name: &str) -> Option<Self> {
        Some(match name {
            "any" => Self::Any,
            "nil" => Self::Nil,
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "date-only" => Self::DateOnly,
            "time-only" => Self::TimeOnly,
            "datetime-only" => Self::DateTimeOnly,
            "datetime" => Self::DateTime,
            "file" => Self::File,
            "object" => Self::Object,
            "array" => Self::Array,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Nil => "nil",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::DateOnly => "date-only",
            Self::TimeOnly => "time-only",
            Self::DateTimeOnly => "datetime-only",
            Self::DateTime => "datetime",
            Self::File => "file",
            Self::Object => "object",
            Self::Array => "array",
            Self::Union => "union",
            Self::External => "external",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Number
                | Self::Integer
                | Self::Boolean
                | Self::DateOnly
                | Self::TimeOnly
                | Self::DateTimeOnly
                | Self::DateTime
                | Self::File
                | Self::Nil
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            Self::DateOnly | Self::TimeOnly | Self::DateTimeOnly | Self::DateTime
        )
    }

    /// Whether a type of kind `self` may inherit from one of kind `parent`.
    pub(crate) fn extends(&self, parent: TypeKind) -> bool {
        *self == parent
            || parent == Self::Any
            || (*self == Self::Integer && parent == Self::Number)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A member type that is resolved lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHandle {
    /// A declaration of its own, e.g. an `items:` mapping or a property.
    Decl(TypeId),
    /// An expression such as `Person` or `string[]`, resolved in `scope`;
    /// inline members index into the declaration `owner`.
    Expr {
        expr: TypeExpr,
        scope: DocId,
        owner: TypeId,
    },
}

/// Facets of scalar kinds (string, number, integer, boolean, dates, file).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarFacets {
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub multiple_of: Option<f64>,
    /// Number format (`int32`, `double`, ...) or datetime format (`rfc3339`, `rfc2616`).
    pub format: Option<String>,
    pub enum_values: Option<Vec<Value>>,
    pub file_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyShape {
    pub name: Name,
    pub required: bool,
    pub decl: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternProperty {
    pub pattern: String,
    pub decl: TypeId,
}

/// Facets of object types.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectFacets {
    pub properties: IndexMap<Name, PropertyShape>,
    pub pattern_properties: Vec<PatternProperty>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
    pub additional_properties: bool,
    pub discriminator: Option<Name>,
    pub discriminator_value: Option<Value>,
}

impl Default for ObjectFacets {
    fn default() -> Self {
        Self {
            properties: IndexMap::new(),
            pattern_properties: Vec::new(),
            min_properties: None,
            max_properties: None,
            additional_properties: true,
            discriminator: None,
            discriminator_value: None,
        }
    }
}

/// Facets of array types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayFacets {
    pub items: Option<TypeHandle>,
    pub unique_items: bool,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

/// A problem with a type that does not stop it from being built.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeIssue {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    pub path: NodePath,
}

/// The resolved, inheritance-merged definition of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeType {
    pub kind: TypeKind,
    /// Name of the nearest named declaration, used as the default
    /// discriminator value.
    pub name: Option<Name>,
    pub(crate) scalar: ScalarFacets,
    pub(crate) object: ObjectFacets,
    pub(crate) array: ArrayFacets,
    pub(crate) branches: Vec<TypeHandle>,
    /// Schema text of external types.
    pub schema: Option<Arc<str>>,
    /// User facets declared by this type or an ancestor.
    pub user_facets: IndexMap<Name, TypeId>,
    /// User facet values set by this type or an ancestor; subtypes may not
    /// change them.
    pub fixed_facets: IndexMap<Name, Value>,
    /// Issues of the declaration itself, not inherited ones.
    pub issues: Vec<TypeIssue>,
}

impl RuntimeType {
    pub(crate) fn of_kind(kind: TypeKind, name: Option<Name>) -> Self {
        Self {
            kind,
            name,
            scalar: ScalarFacets::default(),
            object: ObjectFacets::default(),
            array: ArrayFacets::default(),
            branches: Vec::new(),
            schema: None,
            user_facets: IndexMap::new(),
            fixed_facets: IndexMap::new(),
            issues: Vec::new(),
        }
    }

    /// Scalar facets, for scalar kinds only.
    pub fn scalar_facets(&self) -> Option<&ScalarFacets> {
        self.kind.is_scalar().then_some(&self.scalar)
    }

    /// Object facets, for object types only.
    pub fn object_facets(&self) -> Option<&ObjectFacets> {
        (self.kind == TypeKind::Object).then_some(&self.object)
    }

    /// Array facets, for array types only.
    pub fn array_facets(&self) -> Option<&ArrayFacets> {
        (self.kind == TypeKind::Array).then_some(&self.array)
    }

    /// Union members, for union types only.
    pub fn union_branches(&self) -> Option<&[TypeHandle]> {
        (self.kind == TypeKind::Union).then_some(self.branches.as_slice())
    }

    /// `enum` applies to every kind that has values to compare.
    pub fn enum_values(&self) -> Option<&[Value]> {
        self.scalar.enum_values.as_deref()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyShape> {
        self.object_facets()?.properties.get(name)
    }
}

/// Permanent failure of a runtime type. Every type inheriting from a failed
/// type fails with the same marker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeFailure {
    #[error("cyclic inheritance: {}", .members.join(" -> "))]
    Cycle { origin: TypeId, members: Vec<Name> },
    #[error("unresolved type '{name}'")]
    Unresolved { origin: TypeId, name: Name },
    #[error("invalid type expression: {error}")]
    Syntax { origin: TypeId, error: TypeExprError },
    #[error("incompatible types: {message}")]
    Incompatible { origin: TypeId, message: String },
    #[error("inheritance deeper than {limit} levels")]
    DepthExceeded { origin: TypeId, limit: usize },
}

impl TypeFailure {
    /// The declaration where the failure was detected.
    pub fn origin(&self) -> TypeId {
        match self {
            Self::Cycle { origin, .. }
            | Self::Unresolved { origin, .. }
            | Self::Syntax { origin, .. }
            | Self::Incompatible { origin, .. }
            | Self::DepthExceeded { origin, .. } => *origin,
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }
}

pub type RuntimeResult = Result<Arc<RuntimeType>, TypeFailure>;
