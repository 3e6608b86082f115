//! Instance validation.
//!
//! Checks a structured value against the runtime type of a declaration and
//! reports one message per violated facet. An empty list means the value is
//! valid. Messages for nested values are prefixed with their location, e.g.
//! `address: Required property 'city' is missing` or `[2]: Expected string,
//! got integer`.

use std::cell::RefCell;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::hir::ids::TypeId;
use crate::hir::model::Model;
use crate::hir::types::{RuntimeType, TypeHandle, TypeKind};
use crate::syntax::Value;

impl Model {
    /// Validate `value` against the type declared by `id`.
    pub fn validate_instance(&self, id: TypeId, value: &Value) -> Vec<String> {
        match self.runtime_type(id) {
            Ok(rt) => Validator::new(self).check(&rt, value, 0),
            Err(failure) => vec![failure.to_string()],
        }
    }

    /// Validate `value` against a member handle (items, union branch).
    pub fn validate_handle(&self, handle: &TypeHandle, value: &Value) -> Vec<String> {
        match self.resolve_handle(handle) {
            Ok(rt) => Validator::new(self).check(&rt, value, 0),
            Err(failure) => vec![failure.to_string()],
        }
    }
}

struct Validator<'m> {
    model: &'m Model,
    limit: usize,
    /// Unions being checked, with the value each is checked against.
    active: RefCell<Vec<(*const Value, Vec<TypeHandle>)>>,
}

impl<'m> Validator<'m> {
    fn new(model: &'m Model) -> Self {
        Self {
            model,
            limit: model.config().max_inheritance_depth,
            active: RefCell::new(Vec::new()),
        }
    }

    fn check(&self, rt: &RuntimeType, value: &Value, depth: usize) -> Vec<String> {
        if depth > self.limit {
            return vec![format!("Value nested deeper than {} levels", self.limit)];
        }
        let mut errors = match rt.kind {
            TypeKind::Any | TypeKind::External => Vec::new(),
            TypeKind::Nil => expect(value.is_null(), rt, value),
            TypeKind::String => self.check_string(rt, value),
            TypeKind::Number | TypeKind::Integer => check_number(rt, value),
            TypeKind::Boolean => expect(value.as_bool().is_some(), rt, value),
            TypeKind::DateOnly
            | TypeKind::TimeOnly
            | TypeKind::DateTimeOnly
            | TypeKind::DateTime => check_date(rt, value),
            TypeKind::File => check_file(rt, value),
            TypeKind::Object => self.check_object(rt, value, depth),
            TypeKind::Array => self.check_array(rt, value, depth),
            TypeKind::Union => return self.check_union(rt, value, depth),
        };
        if rt.kind.is_scalar() && !errors.iter().any(|e| e.starts_with("Expected ")) {
            errors.extend(check_enum(rt, value));
        }
        errors
    }

    fn resolve(&self, handle: &TypeHandle) -> Result<Arc<RuntimeType>, String> {
        self.model.resolve_handle(handle).map_err(|f| f.to_string())
    }

    fn check_string(&self, rt: &RuntimeType, value: &Value) -> Vec<String> {
        let Some(text) = value.as_str() else {
            return expect(false, rt, value);
        };
        let mut errors = check_length(rt, text.chars().count() as u64);
        if let Some(pattern) = &rt.scalar.pattern {
            if let Some(regex) = self.model.regex(pattern) {
                if !regex.is_match(text) {
                    errors.push(format!("Value '{text}' does not match pattern '{pattern}'"));
                }
            }
        }
        errors
    }

    fn check_object(&self, rt: &RuntimeType, value: &Value, depth: usize) -> Vec<String> {
        let Some(map) = value.as_mapping() else {
            return expect(false, rt, value);
        };
        let facets = &rt.object;
        let mut errors = Vec::new();

        if let Some(discriminator) = &facets.discriminator {
            if !map.contains_key(discriminator.as_str()) {
                errors.push(format!("Missing discriminator property '{discriminator}'"));
            }
        }

        for (name, property) in &facets.properties {
            match map.get(name.as_str()) {
                None if property.required => {
                    errors.push(format!("Required property '{name}' is missing"));
                }
                None => {}
                Some(item) => {
                    let nested = match self.model.runtime_type(property.decl) {
                        Ok(prop) => self.check(&prop, item, depth + 1),
                        Err(failure) => vec![failure.to_string()],
                    };
                    errors.extend(nested.into_iter().map(|e| format!("{name}: {e}")));
                }
            }
        }

        for (key, item) in map {
            if facets.properties.contains_key(key.as_str()) {
                continue;
            }
            let pattern = facets.pattern_properties.iter().find(|p| {
                self.model
                    .regex(&p.pattern)
                    .is_some_and(|regex| regex.is_match(key))
            });
            match pattern {
                Some(pattern) => {
                    let nested = match self.model.runtime_type(pattern.decl) {
                        Ok(prop) => self.check(&prop, item, depth + 1),
                        Err(failure) => vec![failure.to_string()],
                    };
                    errors.extend(nested.into_iter().map(|e| format!("{key}: {e}")));
                }
                None if !facets.additional_properties => {
                    errors.push(format!("Unexpected property '{key}'"));
                }
                None => {}
            }
        }

        let count = map.len() as u64;
        if let Some(min) = facets.min_properties.filter(|&min| count < min) {
            errors.push(format!("Object must have at least {min} properties"));
        }
        if let Some(max) = facets.max_properties.filter(|&max| count > max) {
            errors.push(format!("Object must have at most {max} properties"));
        }
        errors
    }

    fn check_array(&self, rt: &RuntimeType, value: &Value, depth: usize) -> Vec<String> {
        let Some(items) = value.as_sequence() else {
            return expect(false, rt, value);
        };
        let facets = &rt.array;
        let mut errors = Vec::new();

        let count = items.len() as u64;
        if let Some(min) = facets.min_items.filter(|&min| count < min) {
            errors.push(format!("Array must have at least {min} items"));
        }
        if let Some(max) = facets.max_items.filter(|&max| count > max) {
            errors.push(format!("Array must have at most {max} items"));
        }
        if facets.unique_items {
            let duplicate = items
                .iter()
                .enumerate()
                .any(|(i, item)| items[..i].contains(item));
            if duplicate {
                errors.push("Array items must be unique".to_string());
            }
        }

        if let Some(handle) = &facets.items {
            match self.resolve(handle) {
                Ok(item_type) => {
                    for (i, item) in items.iter().enumerate() {
                        let nested = self.check(&item_type, item, depth + 1);
                        errors.extend(nested.into_iter().map(|e| format!("[{i}]: {e}")));
                    }
                }
                Err(message) => errors.push(message),
            }
        }
        errors
    }

    fn check_union(&self, rt: &RuntimeType, value: &Value, depth: usize) -> Vec<String> {
        let key = (value as *const Value, rt.branches.clone());
        if self.active.borrow().contains(&key) {
            return vec!["Union refers to itself".to_string()];
        }
        self.active.borrow_mut().push(key);
        let errors = self.check_branches(rt, value, depth);
        self.active.borrow_mut().pop();
        errors
    }

    fn check_branches(&self, rt: &RuntimeType, value: &Value, depth: usize) -> Vec<String> {
        let branches: Vec<Arc<RuntimeType>> = rt
            .branches
            .iter()
            .filter_map(|handle| self.resolve(handle).ok())
            .collect();
        if branches.is_empty() {
            return vec!["Union has no resolvable members".to_string()];
        }

        if let Some(branch) = self.discriminated_branch(rt, &branches, value) {
            return self.check(&branch, value, depth + 1);
        }

        let mut combined = Vec::new();
        for branch in &branches {
            let errors = self.check(branch, value, depth + 1);
            if errors.is_empty() {
                return Vec::new();
            }
            let label = branch_label(branch);
            combined.extend(errors.into_iter().map(|e| format!("{label}: {e}")));
        }
        combined.insert(0, "Value does not match any member of the union".to_string());
        combined
    }

    /// The object branch a discriminator value selects: its
    /// `discriminatorValue`, a single-valued enum on the discriminator
    /// property, or its type name.
    fn discriminated_branch(
        &self,
        union: &RuntimeType,
        branches: &[Arc<RuntimeType>],
        value: &Value,
    ) -> Option<Arc<RuntimeType>> {
        let map = value.as_mapping()?;
        branches
            .iter()
            .filter(|b| b.kind == TypeKind::Object)
            .find(|branch| {
                let Some(discriminator) = union
                    .object
                    .discriminator
                    .as_ref()
                    .or(branch.object.discriminator.as_ref())
                else {
                    return false;
                };
                let Some(actual) = map.get(discriminator.as_str()) else {
                    return false;
                };
                if let Some(expected) = &branch.object.discriminator_value {
                    return expected == actual;
                }
                let single_enum = branch.property(discriminator).and_then(|p| {
                    let prop = self.model.runtime_type(p.decl).ok()?;
                    match prop.enum_values() {
                        Some([only]) => Some(only.clone()),
                        _ => None,
                    }
                });
                match single_enum {
                    Some(expected) => &expected == actual,
                    None => branch
                        .name
                        .as_ref()
                        .is_some_and(|name| actual.as_str() == Some(name.as_str())),
                }
            })
            .cloned()
    }
}

fn branch_label(branch: &RuntimeType) -> String {
    branch
        .name
        .as_ref()
        .map(|n| n.to_string())
        .unwrap_or_else(|| branch.kind.name().to_string())
}

fn expect(ok: bool, rt: &RuntimeType, value: &Value) -> Vec<String> {
    if ok {
        Vec::new()
    } else {
        vec![format!("Expected {}, got {}", rt.kind, value.type_name())]
    }
}

fn check_length(rt: &RuntimeType, length: u64) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(min) = rt.scalar.min_length.filter(|&min| length < min) {
        errors.push(format!("Length must be at least {min}"));
    }
    if let Some(max) = rt.scalar.max_length.filter(|&max| length > max) {
        errors.push(format!("Length must be at most {max}"));
    }
    errors
}

fn check_enum(rt: &RuntimeType, value: &Value) -> Vec<String> {
    match &rt.scalar.enum_values {
        Some(values) if !values.contains(value) => {
            let allowed: Vec<String> = values.iter().map(Value::to_display_string).collect();
            vec![format!(
                "Value {value} must be one of: {}",
                allowed.join(", ")
            )]
        }
        _ => Vec::new(),
    }
}

fn check_number(rt: &RuntimeType, value: &Value) -> Vec<String> {
    let Some(number) = value.as_number() else {
        return expect(false, rt, value);
    };
    if rt.kind == TypeKind::Integer && !number.is_integral() {
        return vec![format!("Expected integer, got {}", value.type_name())];
    }
    let n = number.as_f64();
    let facets = &rt.scalar;
    let mut errors = Vec::new();
    if let Some(min) = facets.minimum.filter(|&min| n < min) {
        errors.push(format!("Value must be greater than or equal to {min}"));
    }
    if let Some(max) = facets.maximum.filter(|&max| n > max) {
        errors.push(format!("Value must be less than or equal to {max}"));
    }
    if let Some(step) = facets.multiple_of {
        let ratio = n / step;
        if (ratio - ratio.round()).abs() > 1e-9 {
            errors.push(format!("Value must be a multiple of {step}"));
        }
    }
    if let Some(format) = &facets.format {
        let range = match format.as_str() {
            "int8" => Some((i8::MIN as f64, i8::MAX as f64)),
            "int16" => Some((i16::MIN as f64, i16::MAX as f64)),
            "int32" | "int" => Some((i32::MIN as f64, i32::MAX as f64)),
            "int64" | "long" => Some((i64::MIN as f64, i64::MAX as f64)),
            _ => None,
        };
        if let Some((low, high)) = range {
            if !number.is_integral() {
                errors.push(format!("Value must be an integer for format {format}"));
            } else if n < low || n > high {
                errors.push(format!("Value {number} is out of range for format {format}"));
            }
        } else if format == "float" && n.is_finite() && (n as f32).is_infinite() {
            errors.push(format!("Value {number} is out of range for format float"));
        }
    }
    errors
}

fn check_date(rt: &RuntimeType, value: &Value) -> Vec<String> {
    let Some(text) = value.as_str() else {
        return expect(false, rt, value);
    };
    let valid = match rt.kind {
        TypeKind::DateOnly => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        TypeKind::TimeOnly => NaiveTime::parse_from_str(text, "%H:%M:%S%.f").is_ok(),
        TypeKind::DateTimeOnly => {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        }
        _ => match rt.scalar.format.as_deref() {
            Some("rfc2616") => DateTime::parse_from_rfc2822(text).is_ok(),
            _ => DateTime::parse_from_rfc3339(text).is_ok(),
        },
    };
    if valid {
        Vec::new()
    } else {
        vec![format!("Invalid {} value '{text}'", rt.kind)]
    }
}

fn check_file(rt: &RuntimeType, value: &Value) -> Vec<String> {
    match value.as_str() {
        Some(content) => check_length(rt, content.len() as u64),
        None => expect(false, rt, value),
    }
}
