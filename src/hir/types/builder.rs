//! Type system builder.
//!
//! The runtime type of a declaration is built by resolving its parents,
//! merging them left to right (later parents override earlier ones), then
//! applying the declaration's own facets and properties on top. Parent edges
//! are walked with an explicit stack, so inheritance cycles end in a
//! [`TypeFailure::Cycle`] instead of recursing forever. Results are cached
//! per [`TypeId`].

use std::sync::Arc;

use crate::base::Name;
use crate::hir::diagnostics::{Severity, codes};
use crate::hir::ids::{DocId, TypeId};
use crate::hir::model::Model;
use crate::hir::resolve::{ResolveResult, Resolver};
use crate::parser::TypeExpr;
use crate::syntax::{TypeInstance, Value};

use super::builtin::builtin_of_kind;
use super::decl::{LocationKind, TypeDeclaration, TypeSource};
use super::runtime::{
    PatternProperty, PropertyShape, RuntimeResult, RuntimeType, TypeFailure, TypeHandle,
    TypeIssue, TypeKind,
};

/// Keys that describe a declaration rather than constrain its values.
const DESCRIPTIVE_KEYS: &[&str] = &[
    "type",
    "schema",
    "displayName",
    "description",
    "default",
    "example",
    "examples",
    "facets",
    "xml",
    "required",
    "repeat",
    "allowedTargets",
    "usage",
];

const STRING_FACETS: &[&str] = &["pattern", "minLength", "maxLength", "enum"];
const NUMBER_FACETS: &[&str] = &["minimum", "maximum", "multipleOf", "format", "enum"];
const DATETIME_FACETS: &[&str] = &["format", "enum"];
const ENUM_FACETS: &[&str] = &["enum"];
const FILE_FACETS: &[&str] = &["fileTypes", "minLength", "maxLength"];
const OBJECT_FACETS: &[&str] = &[
    "properties",
    "minProperties",
    "maxProperties",
    "additionalProperties",
    "discriminator",
    "discriminatorValue",
];
const ARRAY_FACETS: &[&str] = &["items", "uniqueItems", "minItems", "maxItems"];
const UNION_FACETS: &[&str] = &["discriminator", "enum"];

fn facets_of(kind: TypeKind) -> &'static [&'static str] {
    match kind {
        TypeKind::String => STRING_FACETS,
        TypeKind::Number | TypeKind::Integer => NUMBER_FACETS,
        TypeKind::DateTime => DATETIME_FACETS,
        TypeKind::Boolean | TypeKind::DateOnly | TypeKind::TimeOnly | TypeKind::DateTimeOnly => {
            ENUM_FACETS
        }
        TypeKind::File => FILE_FACETS,
        TypeKind::Object => OBJECT_FACETS,
        TypeKind::Array => ARRAY_FACETS,
        TypeKind::Union => UNION_FACETS,
        TypeKind::Any | TypeKind::Nil | TypeKind::External => &[],
    }
}

impl Model {
    /// The runtime type of a declaration, built once and cached.
    pub fn runtime_type(&self, id: TypeId) -> RuntimeResult {
        TypeBuilder::new(self).build(id)
    }

    /// Resolve a member handle (property, items, union branch).
    pub fn resolve_handle(&self, handle: &TypeHandle) -> RuntimeResult {
        match handle {
            TypeHandle::Decl(id) => self.runtime_type(*id),
            TypeHandle::Expr { expr, scope, owner } => {
                TypeBuilder::new(self).expr(expr, *scope, *owner)
            }
        }
    }

    /// Kind of the runtime type, `None` when it failed to build.
    pub fn type_kind(&self, id: TypeId) -> Option<TypeKind> {
        self.runtime_type(id).ok().map(|rt| rt.kind)
    }

    /// User facet values fixed by this type or its ancestors.
    pub fn fixed_facets(&self, id: TypeId) -> Option<TypeInstance> {
        let rt = self.runtime_type(id).ok()?;
        if rt.fixed_facets.is_empty() {
            return None;
        }
        let map = rt
            .fixed_facets
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Some(TypeInstance::new(Value::Mapping(map)))
    }

    /// Text of the external schema a declaration uses, following named
    /// types and `schemas` entries.
    pub fn schema_content(&self, id: TypeId) -> Option<Arc<str>> {
        self.runtime_type(id).ok()?.schema.clone()
    }
}

struct TypeBuilder<'m> {
    model: &'m Model,
    /// Declarations whose parents are being resolved.
    stack: Vec<TypeId>,
}

impl<'m> TypeBuilder<'m> {
    fn new(model: &'m Model) -> Self {
        Self {
            model,
            stack: Vec::new(),
        }
    }

    fn build(&mut self, id: TypeId) -> RuntimeResult {
        if let Some(cached) = self.model.cache.runtime.read().get(&id) {
            return cached.clone();
        }

        if let Some(pos) = self.stack.iter().position(|&seen| seen == id) {
            return Err(self.cycle(&self.stack[pos..]));
        }
        let limit = self.model.config().max_inheritance_depth;
        if self.stack.len() >= limit {
            // Reported on the entry point, whose cached result carries it.
            let origin = self.stack.first().copied().unwrap_or(id);
            return Err(TypeFailure::DepthExceeded { origin, limit });
        }

        tracing::trace!("[TYPES] building {:?} '{}'", id, self.model.type_decl(id).name);
        self.stack.push(id);
        let result = self.compute(id);
        self.stack.pop();

        if let Err(failure) = &result {
            tracing::debug!("[TYPES] {:?} failed: {}", id, failure);
        }
        self.model
            .cache
            .runtime
            .write()
            .entry(id)
            .or_insert(result)
            .clone()
    }

    /// Failure for a cycle, rotated to start at its smallest member so every
    /// entry point reports the same cycle.
    fn cycle(&self, members: &[TypeId]) -> TypeFailure {
        let start = members
            .iter()
            .enumerate()
            .min_by_key(|(_, id)| **id)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let mut rotated: Vec<TypeId> = members[start..].to_vec();
        rotated.extend_from_slice(&members[..start]);
        let origin = rotated[0];
        rotated.push(origin);
        TypeFailure::Cycle {
            origin,
            members: rotated
                .iter()
                .map(|&id| self.model.type_decl(id).name.clone())
                .collect(),
        }
    }

    fn compute(&mut self, id: TypeId) -> RuntimeResult {
        let model = self.model;
        let decl = model.type_decl(id);
        let parents = match &decl.source {
            TypeSource::Default => vec![builtin_of_kind(default_kind(decl))],
            TypeSource::Template(_) => vec![builtin_of_kind(TypeKind::Any)],
            TypeSource::Invalid(error) => {
                return Err(TypeFailure::Syntax {
                    origin: id,
                    error: error.clone(),
                });
            }
            TypeSource::Exprs(exprs) => exprs
                .iter()
                .map(|expr| self.expr(expr, decl.doc, id))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let mut rt = merge_parents(id, &parents)?;
        rt.issues.clear();
        rt.object.discriminator_value = None;
        if decl.location_kind == LocationKind::Declarations {
            rt.name = Some(decl.name.clone());
        }
        self.apply_own(id, decl, &mut rt);
        Ok(Arc::new(rt))
    }

    fn expr(&mut self, expr: &TypeExpr, scope: DocId, owner: TypeId) -> RuntimeResult {
        match expr {
            TypeExpr::Name(name) => {
                match Resolver::new(self.model).with_scope(scope).resolve_type(name) {
                    ResolveResult::Builtin(kind) => Ok(builtin_of_kind(kind)),
                    ResolveResult::Found(id) => self.build(id),
                    ResolveResult::NotFound => Err(TypeFailure::Unresolved {
                        origin: owner,
                        name: name.clone(),
                    }),
                }
            }
            TypeExpr::Array(inner) => {
                let mut rt = RuntimeType::of_kind(TypeKind::Array, None);
                rt.array.items = Some(TypeHandle::Expr {
                    expr: (**inner).clone(),
                    scope,
                    owner,
                });
                Ok(Arc::new(rt))
            }
            TypeExpr::Union(members) => {
                for member in members {
                    self.check_member(member, scope, owner)?;
                }
                let mut rt = RuntimeType::of_kind(TypeKind::Union, None);
                rt.branches = members
                    .iter()
                    .map(|member| TypeHandle::Expr {
                        expr: member.clone(),
                        scope,
                        owner,
                    })
                    .collect();
                Ok(Arc::new(rt))
            }
            TypeExpr::Inline(index) => {
                let inline = self.model.type_decl(owner).inline.get(*index as usize).copied();
                match inline {
                    Some(inline) => self.build(inline),
                    None => Err(TypeFailure::Unresolved {
                        origin: owner,
                        name: Name::new(expr.to_string()),
                    }),
                }
            }
            TypeExpr::Schema(text) => {
                let mut rt = RuntimeType::of_kind(TypeKind::External, None);
                rt.schema = Some(text.clone());
                Ok(Arc::new(rt))
            }
        }
    }

    /// Build a union member that names a declaration, so a union reaching
    /// itself without an array in between fails as a cycle. Other failures
    /// stay with the member and surface when it is resolved.
    fn check_member(
        &mut self,
        member: &TypeExpr,
        scope: DocId,
        owner: TypeId,
    ) -> Result<(), TypeFailure> {
        let result = match member {
            TypeExpr::Name(_) | TypeExpr::Inline(_) => self.expr(member, scope, owner),
            TypeExpr::Union(members) => {
                for inner in members {
                    self.check_member(inner, scope, owner)?;
                }
                return Ok(());
            }
            TypeExpr::Array(_) | TypeExpr::Schema(_) => return Ok(()),
        };
        match result {
            Err(failure @ (TypeFailure::Cycle { .. } | TypeFailure::DepthExceeded { .. })) => {
                Err(failure)
            }
            _ => Ok(()),
        }
    }

    /// Apply what the declaration itself says on top of its inherited type.
    fn apply_own(&self, id: TypeId, decl: &TypeDeclaration, rt: &mut RuntimeType) {
        let inherited_user_facets = rt.user_facets.clone();
        let mut own_fixed = Vec::new();

        if let Some(map) = decl.raw.as_mapping() {
            for (key, value) in map {
                if DESCRIPTIVE_KEYS.contains(&key.as_str()) || key.starts_with('(') {
                    continue;
                }
                if facets_of(rt.kind).contains(&key.as_str()) {
                    if let Err(message) = apply_facet(rt, key, value) {
                        rt.issues.push(issue(decl, key, codes::INVALID_FACET, Severity::Error, message));
                    }
                } else if inherited_user_facets.contains_key(key.as_str()) {
                    own_fixed.push((key, value));
                } else {
                    rt.issues.push(issue(
                        decl,
                        key,
                        codes::UNKNOWN_FACET,
                        Severity::Warning,
                        format!("unknown facet '{key}' for a type of kind {}", rt.kind),
                    ));
                }
            }
        }

        for (key, value) in own_fixed {
            if rt.fixed_facets.contains_key(key.as_str()) {
                rt.issues.push(issue(
                    decl,
                    key,
                    codes::FIXED_FACET_OVERRIDE,
                    Severity::Error,
                    format!("facet '{key}' is already fixed by a parent type"),
                ));
            } else {
                rt.fixed_facets.insert(Name::new(key), value.clone());
            }
        }
        rt.user_facets.extend(
            decl.facet_declarations
                .iter()
                .map(|(name, &facet)| (name.clone(), facet)),
        );

        if rt.kind == TypeKind::Object {
            for &property in &decl.properties {
                let prop = self.model.type_decl(property);
                rt.object.properties.insert(
                    prop.name.clone(),
                    PropertyShape {
                        name: prop.name.clone(),
                        required: prop.required,
                        decl: property,
                    },
                );
            }
            for (pattern, property) in &decl.pattern_properties {
                if self.model.regex(pattern).is_none() {
                    rt.issues.push(issue(
                        decl,
                        "properties",
                        codes::INVALID_FACET,
                        Severity::Error,
                        format!("invalid property pattern '/{pattern}/'"),
                    ));
                    continue;
                }
                rt.object.pattern_properties.retain(|p| p.pattern != *pattern);
                rt.object.pattern_properties.push(PatternProperty {
                    pattern: pattern.clone(),
                    decl: *property,
                });
            }
        }
        if rt.kind == TypeKind::Array {
            if let Some(items) = decl.items {
                rt.array.items = Some(TypeHandle::Decl(items));
            }
        }
        if let Some(pattern) = &rt.scalar.pattern {
            let own = decl.raw.get("pattern").is_some();
            if own && rt.kind == TypeKind::String && self.model.regex(pattern).is_none() {
                let message = format!("invalid pattern '{pattern}'");
                rt.issues
                    .push(issue(decl, "pattern", codes::INVALID_FACET, Severity::Error, message));
            }
        }
        tracing::trace!(
            "[TYPES] {:?} resolved to {} with {} issue(s)",
            id,
            rt.kind,
            rt.issues.len()
        );
    }
}

/// Kind of a declaration without `type`: object or array when their facets
/// are present, `any` for bodies, `string` otherwise. Annotation types
/// written as `name:` with no value take no value (`nil`).
fn default_kind(decl: &TypeDeclaration) -> TypeKind {
    let has_any = |keys: &[&str]| keys.iter().any(|k| decl.raw.get(k).is_some());
    if !decl.properties.is_empty()
        || !decl.pattern_properties.is_empty()
        || has_any(OBJECT_FACETS)
    {
        TypeKind::Object
    } else if decl.items.is_some() || has_any(ARRAY_FACETS) {
        TypeKind::Array
    } else if has_any(&["fileTypes"]) {
        TypeKind::File
    } else if has_any(&["minimum", "maximum", "multipleOf"]) {
        TypeKind::Number
    } else if decl.is_body {
        TypeKind::Any
    } else if decl.is_annotation_type() && decl.raw.is_null() {
        TypeKind::Nil
    } else {
        TypeKind::String
    }
}

/// Merge parents left to right; a later parent overrides an earlier one.
fn merge_parents(id: TypeId, parents: &[Arc<RuntimeType>]) -> Result<RuntimeType, TypeFailure> {
    let Some((first, rest)) = parents.split_first() else {
        return Ok(RuntimeType::of_kind(TypeKind::Any, None));
    };
    let mut merged = (**first).clone();
    for parent in rest {
        let kind = if merged.kind == parent.kind || parent.kind == TypeKind::Any {
            merged.kind
        } else if merged.kind == TypeKind::Any {
            parent.kind
        } else if merged.kind.extends(parent.kind) {
            merged.kind
        } else if parent.kind.extends(merged.kind) {
            parent.kind
        } else {
            return Err(TypeFailure::Incompatible {
                origin: id,
                message: format!("cannot inherit from both {} and {}", merged.kind, parent.kind),
            });
        };
        merge_into(&mut merged, parent);
        merged.kind = kind;
    }
    Ok(merged)
}

fn merge_into(base: &mut RuntimeType, other: &RuntimeType) {
    let s = &other.scalar;
    let b = &mut base.scalar;
    b.pattern = s.pattern.clone().or(b.pattern.take());
    b.min_length = s.min_length.or(b.min_length);
    b.max_length = s.max_length.or(b.max_length);
    b.minimum = s.minimum.or(b.minimum);
    b.maximum = s.maximum.or(b.maximum);
    b.multiple_of = s.multiple_of.or(b.multiple_of);
    b.format = s.format.clone().or(b.format.take());
    b.enum_values = s.enum_values.clone().or(b.enum_values.take());
    if !s.file_types.is_empty() {
        b.file_types = s.file_types.clone();
    }

    let o = &other.object;
    let bo = &mut base.object;
    for (name, property) in &o.properties {
        bo.properties.insert(name.clone(), property.clone());
    }
    for pattern in &o.pattern_properties {
        bo.pattern_properties.retain(|p| p.pattern != pattern.pattern);
        bo.pattern_properties.push(pattern.clone());
    }
    bo.min_properties = o.min_properties.or(bo.min_properties);
    bo.max_properties = o.max_properties.or(bo.max_properties);
    bo.additional_properties = bo.additional_properties && o.additional_properties;
    bo.discriminator = o.discriminator.clone().or(bo.discriminator.take());

    let a = &other.array;
    let ba = &mut base.array;
    ba.items = a.items.clone().or(ba.items.take());
    ba.unique_items = ba.unique_items || a.unique_items;
    ba.min_items = a.min_items.or(ba.min_items);
    ba.max_items = a.max_items.or(ba.max_items);

    if !other.branches.is_empty() {
        base.branches = other.branches.clone();
    }
    base.schema = other.schema.clone().or(base.schema.take());
    base.name = other.name.clone().or(base.name.take());
    base.user_facets
        .extend(other.user_facets.iter().map(|(k, v)| (k.clone(), *v)));
    base.fixed_facets
        .extend(other.fixed_facets.iter().map(|(k, v)| (k.clone(), v.clone())));
}

fn apply_facet(rt: &mut RuntimeType, key: &str, value: &Value) -> Result<(), String> {
    let count = || {
        value
            .as_u64()
            .ok_or_else(|| format!("'{key}' must be a non-negative integer, found {value}"))
    };
    let number = || {
        value
            .as_f64()
            .ok_or_else(|| format!("'{key}' must be a number, found {value}"))
    };
    let text = || {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("'{key}' must be a string, found {value}"))
    };
    let flag = || {
        value
            .as_bool()
            .ok_or_else(|| format!("'{key}' must be a boolean, found {value}"))
    };

    match key {
        "pattern" => rt.scalar.pattern = Some(text()?),
        "minLength" => rt.scalar.min_length = Some(count()?),
        "maxLength" => rt.scalar.max_length = Some(count()?),
        "minimum" => rt.scalar.minimum = Some(number()?),
        "maximum" => rt.scalar.maximum = Some(number()?),
        "multipleOf" => {
            let step = number()?;
            if step <= 0.0 {
                return Err(format!("'multipleOf' must be positive, found {value}"));
            }
            rt.scalar.multiple_of = Some(step);
        }
        "format" => rt.scalar.format = Some(text()?),
        "enum" => match value {
            Value::Sequence(values) => rt.scalar.enum_values = Some(values.clone()),
            other => return Err(format!("'enum' must be an array, found {other}")),
        },
        "fileTypes" => rt.scalar.file_types = value.string_list(),
        "minProperties" => rt.object.min_properties = Some(count()?),
        "maxProperties" => rt.object.max_properties = Some(count()?),
        "additionalProperties" => rt.object.additional_properties = flag()?,
        "discriminator" => rt.object.discriminator = Some(Name::new(text()?)),
        "discriminatorValue" => {
            if !value.is_scalar() || value.is_null() {
                return Err(format!("'discriminatorValue' must be a scalar, found {value}"));
            }
            rt.object.discriminator_value = Some(value.clone());
        }
        "uniqueItems" => rt.array.unique_items = flag()?,
        "minItems" => rt.array.min_items = Some(count()?),
        "maxItems" => rt.array.max_items = Some(count()?),
        // `properties` and `items` are read from the lowered declaration.
        _ => {}
    }
    Ok(())
}

fn issue(
    decl: &TypeDeclaration,
    facet: &str,
    code: &'static str,
    severity: Severity,
    message: String,
) -> TypeIssue {
    TypeIssue {
        code,
        severity,
        message,
        path: decl.path.key(facet),
    }
}
