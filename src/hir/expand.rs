//! Trait and resource type expansion.
//!
//! Expansion works on the raw root document and lowers the result again:
//!
//! ```text
//! fragment (trait / resource type body)
//!     │  qualify names declared in libraries with their namespace path
//!     ▼
//!     │  substitute <<param>> tokens from the reference site
//!     ▼
//!     │  deep-merge into the resource / method
//!     ▼
//! expanded root document  →  lower_documents(.., expanded = true)
//! ```
//!
//! Precedence for a method, lowest first, with the default policy:
//! resource type method, resource-level traits, method-level traits (later
//! entries of `is` win), explicit declaration. `is` and `securedBy` lists
//! are merged rather than replaced, so references stay visible after
//! expansion.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::base::{Name, NodePath};
use crate::config::MergePolicy;
use crate::hir::diagnostics::{DiagnosticCollector, codes};
use crate::hir::ids::{DocId, ResourceId, ResourceTypeId, TraitId};
use crate::hir::lower::lower_documents;
use crate::hir::model::Model;
use crate::hir::refs::{Reference, annotation_name};
use crate::hir::resource::method_key;
use crate::hir::template::{has_template, substitute};
use crate::hir::types::is_builtin;
use crate::parser::{is_inline_schema, parse_type_expr};
use crate::syntax::Value;

type Mapping = IndexMap<String, Value>;

/// Keys whose values are lists of references, merged instead of replaced.
const LIST_KEYS: &[&str] = &["is", "securedBy", "protocols"];

/// Keys holding maps of type declarations.
const DECLARATION_MAP_KEYS: &[&str] = &[
    "properties",
    "queryParameters",
    "headers",
    "uriParameters",
    "baseUriParameters",
    "facets",
];

/// Keys whose named entries one trait replaces whole over another.
const REPLACED_ENTRY_KEYS: &[&str] = &[
    "queryParameters",
    "headers",
    "uriParameters",
    "baseUriParameters",
    "responses",
];

/// Keys whose values are instances or text, never names.
const OPAQUE_KEYS: &[&str] = &[
    "example",
    "examples",
    "default",
    "enum",
    "description",
    "displayName",
    "usage",
    "title",
    "content",
    "settings",
];

impl Model {
    /// Apply every resource type and trait to the resources and methods of
    /// the root document.
    ///
    /// Returns a new model; `self` is not modified. Expanding an expanded
    /// model returns an equal copy.
    pub fn expand(&self) -> Model {
        if self.is_expanded() {
            return Model::from_data((*self.data).clone());
        }

        let mut expander = Expander::new(self);
        let root = expander.expand_root();
        let diagnostics = expander.diagnostics.finish();
        tracing::debug!(
            "[EXPAND] '{}' expanded with {} diagnostic(s)",
            self.api().path,
            diagnostics.len()
        );

        let mut sources = self.data.sources.clone();
        sources[DocId::ROOT.index()] = self.source(DocId::ROOT).with_root(root);
        Model::from_data(lower_documents(
            sources,
            self.config().clone(),
            true,
            diagnostics,
        ))
    }
}

struct Expander<'m> {
    model: &'m Model,
    diagnostics: DiagnosticCollector,
    doc_path: Arc<str>,
}

/// Parameters every fragment applied to a resource can use.
#[derive(Debug, Clone, Default)]
struct Reserved {
    resource_path: String,
    resource_path_name: String,
}

impl<'m> Expander<'m> {
    fn new(model: &'m Model) -> Self {
        Self {
            model,
            diagnostics: DiagnosticCollector::new(),
            doc_path: Arc::from(model.api().path.as_str()),
        }
    }

    fn expand_root(&mut self) -> Value {
        let mut root = self.model.source(DocId::ROOT).root().clone();
        let Some(map) = root.as_mapping_mut() else {
            return root;
        };
        let keys: Vec<String> = map.keys().filter(|k| k.starts_with('/')).cloned().collect();
        for key in keys {
            let Some(id) = self.model.child_resource(None, &key) else {
                continue;
            };
            if let Some(slot) = map.get_mut(&key) {
                let path = NodePath::root().key(key.as_str());
                *slot = self.expand_resource(id, slot, &path);
            }
        }
        root
    }

    // ========================================================================
    // RESOURCES
    // ========================================================================

    fn expand_resource(&mut self, id: ResourceId, raw: &Value, path: &NodePath) -> Value {
        let mut explicit = raw.as_mapping().cloned().unwrap_or_default();

        let child_keys: Vec<String> = explicit
            .keys()
            .filter(|k| k.starts_with('/'))
            .cloned()
            .collect();
        for key in child_keys {
            let Some(child) = self.model.child_resource(Some(id), &key) else {
                continue;
            };
            if let Some(slot) = explicit.get_mut(&key) {
                *slot = self.expand_resource(child, slot, &path.key(key.as_str()));
            }
        }

        let reserved = self.reserved(id);
        let mut from_type = match explicit.get("type") {
            Some(type_ref) => self.flatten_resource_type(type_ref, &reserved, &path.key("type")),
            None => Mapping::new(),
        };

        // Optional methods of the resource type only apply to methods the
        // resource declares itself.
        let optional: Vec<String> = from_type
            .keys()
            .filter(|k| method_key(k).is_some_and(|(_, optional)| optional))
            .cloned()
            .collect();
        for key in optional {
            let Some(value) = from_type.shift_remove(&key) else {
                continue;
            };
            let name = key.trim_end_matches('?');
            if explicit.contains_key(name) {
                let merged = match from_type.shift_remove(name) {
                    Some(existing) => deep_merge(&value, &existing),
                    None => value,
                };
                from_type.insert(name.to_string(), merged);
            }
        }

        let resource_is = merge_lists(from_type.get("is"), explicit.get("is"));
        let method_names: Vec<String> = from_type
            .keys()
            .chain(explicit.keys())
            .filter(|k| method_key(k).is_some())
            .fold(Vec::new(), |mut names, k| {
                if !names.contains(k) {
                    names.push(k.clone());
                }
                names
            });

        let mut result = Mapping::new();
        for (key, value) in &from_type {
            if method_key(key).is_none() {
                result.insert(key.clone(), value.clone());
            }
        }
        let resource_level: Mapping = explicit
            .iter()
            .filter(|(k, _)| method_key(k).is_none())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut result = match deep_merge(&Value::Mapping(result), &Value::Mapping(resource_level)) {
            Value::Mapping(map) => map,
            _ => Mapping::new(),
        };
        if let Some(is) = &resource_is {
            result.insert("is".to_string(), is.clone());
        }

        for name in method_names {
            let method = self.expand_method(
                &name,
                from_type.get(&name),
                explicit.get(&name),
                resource_is.as_ref(),
                &reserved,
                &path.key(name.as_str()),
            );
            result.insert(name, method);
        }

        // Keep the source order of child resources after the methods.
        let children: Vec<(String, Value)> = explicit
            .iter()
            .filter(|(k, _)| k.starts_with('/'))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, value) in children {
            result.shift_remove(&key);
            result.insert(key, value);
        }
        Value::Mapping(result)
    }

    fn reserved(&self, id: ResourceId) -> Reserved {
        let resource_path = self.model.complete_relative_uri(id);
        let resource_path_name = resource_path
            .split('/')
            .rev()
            .find(|segment| !segment.is_empty() && !segment.contains('{'))
            .unwrap_or_default()
            .to_string();
        Reserved {
            resource_path,
            resource_path_name,
        }
    }

    /// The resource type chain applied at `type_ref`, parents merged under
    /// children, with `type` and `usage` removed.
    fn flatten_resource_type(
        &mut self,
        type_ref: &Value,
        reserved: &Reserved,
        path: &NodePath,
    ) -> Mapping {
        let mut levels: Vec<Mapping> = Vec::new();
        let mut visited: FxHashSet<ResourceTypeId> = FxHashSet::default();
        let mut next = Reference::from_value(type_ref, DocId::ROOT, path.clone());

        while let Some(reference) = next.take() {
            if reference.name.contains("<<") {
                break;
            }
            let Some(id) = self.model.resolver().resolve_resource_type(&reference.name).declared()
            else {
                break;
            };
            if !visited.insert(id) || visited.len() > self.model.config().max_inheritance_depth {
                tracing::debug!(
                    "[EXPAND] resource type cycle at '{}', chain not applied",
                    reference.name
                );
                return Mapping::new();
            }

            let decl = self.model.resource_type(id);
            tracing::debug!("[EXPAND] applying resource type '{}' at {}", reference.name, path);
            let body = self.fragment(&decl.raw, decl.doc);
            let mut params = reference.param_map();
            self.add_reserved(&mut params, reserved);
            let mut body = self.substitute_by_method(&body, &params, &reference.path);
            body.shift_remove("usage");
            next = body
                .shift_remove("type")
                .and_then(|parent| Reference::from_value(&parent, DocId::ROOT, reference.path.clone()));
            levels.push(body);
        }

        let mut flat = Mapping::new();
        for mut level in levels.into_iter().rev() {
            align_optional_methods(&mut flat, &mut level);
            flat = match deep_merge(&Value::Mapping(flat), &Value::Mapping(level)) {
                Value::Mapping(map) => map,
                _ => Mapping::new(),
            };
        }
        flat
    }

    // ========================================================================
    // METHODS & TRAITS
    // ========================================================================

    fn expand_method(
        &mut self,
        name: &str,
        from_type: Option<&Value>,
        explicit: Option<&Value>,
        resource_is: Option<&Value>,
        reserved: &Reserved,
        path: &NodePath,
    ) -> Value {
        let from_type = from_type.cloned().unwrap_or(Value::Null);
        let explicit = explicit.cloned().unwrap_or(Value::Null);
        let method_is = merge_lists(from_type.get("is"), explicit.get("is"));

        let mut applied = Value::Null;
        let all_refs = merge_lists(resource_is, method_is.as_ref());
        for item in all_refs.iter().flat_map(list_items) {
            let Some(reference) = Reference::from_value(item, DocId::ROOT, path.key("is")) else {
                continue;
            };
            let mut visited = Vec::new();
            let contribution = self.trait_value(&reference, name, reserved, &mut visited);
            applied = overlay_trait(&applied, &contribution);
        }

        let mut method = match self.model.config().expansion.merge_policy {
            MergePolicy::TraitsOverResourceType => deep_merge(&from_type, &applied),
            MergePolicy::ResourceTypeOverTraits => deep_merge(&applied, &from_type),
        };
        method = deep_merge(&method, &explicit);
        if let Some(map) = method.as_mapping_mut() {
            map.shift_remove("is");
            if let Some(is) = method_is {
                map.insert("is".to_string(), is);
            }
        }
        method
    }

    /// A trait's body at a reference site, with the traits it applies
    /// itself merged underneath.
    fn trait_value(
        &mut self,
        reference: &Reference,
        method_name: &str,
        reserved: &Reserved,
        visited: &mut Vec<TraitId>,
    ) -> Value {
        if reference.name.contains("<<") {
            return Value::Null;
        }
        let Some(id) = self.model.resolver().resolve_trait(&reference.name).declared() else {
            return Value::Null;
        };
        if visited.contains(&id) || visited.len() >= self.model.config().max_inheritance_depth {
            tracing::debug!("[EXPAND] trait cycle at '{}', not applied again", reference.name);
            return Value::Null;
        }
        visited.push(id);

        let decl = self.model.trait_decl(id);
        tracing::debug!("[EXPAND] applying trait '{}' to {}", reference.name, method_name);
        let body = self.fragment(&decl.raw, decl.doc);
        let mut params = reference.param_map();
        self.add_reserved(&mut params, reserved);
        if self.model.config().expansion.reserved_parameters {
            params.insert("methodName".to_string(), Value::from(method_name));
        }
        let mut body = match self.substitute(&body, &params, &reference.path) {
            Value::Mapping(map) => map,
            _ => Mapping::new(),
        };
        body.shift_remove("usage");

        let mut inherited = Value::Null;
        if let Some(nested) = body.shift_remove("is") {
            for item in list_items(&nested) {
                let Some(inner) = Reference::from_value(item, DocId::ROOT, reference.path.clone())
                else {
                    continue;
                };
                let contribution = self.trait_value(&inner, method_name, reserved, visited);
                inherited = overlay_trait(&inherited, &contribution);
            }
        }
        visited.pop();
        overlay_trait(&inherited, &Value::Mapping(body))
    }

    // ========================================================================
    // FRAGMENTS
    // ========================================================================

    /// A declaration body as seen from the root document.
    fn fragment(&self, raw: &Value, doc: DocId) -> Value {
        if doc == DocId::ROOT {
            return raw.clone();
        }
        match self.model.namespace_path(DocId::ROOT, doc) {
            Some(prefix) if !prefix.is_empty() => qualify(raw, &prefix, false),
            _ => raw.clone(),
        }
    }

    fn add_reserved(&self, params: &mut IndexMap<String, Value>, reserved: &Reserved) {
        if !self.model.config().expansion.reserved_parameters {
            return;
        }
        params
            .entry("resourcePath".to_string())
            .or_insert_with(|| Value::from(reserved.resource_path.as_str()));
        params
            .entry("resourcePathName".to_string())
            .or_insert_with(|| Value::from(reserved.resource_path_name.as_str()));
    }

    /// Substitute a resource type body; each method sees its own `methodName`.
    fn substitute_by_method(
        &mut self,
        body: &Value,
        params: &IndexMap<String, Value>,
        path: &NodePath,
    ) -> Mapping {
        let Some(map) = body.as_mapping() else {
            return Mapping::new();
        };
        let mut out = Mapping::new();
        for (key, value) in map {
            let mut single = Mapping::new();
            single.insert(key.clone(), value.clone());
            let substituted = match method_key(key) {
                Some((name, _)) if self.model.config().expansion.reserved_parameters => {
                    let mut params = params.clone();
                    params.insert("methodName".to_string(), Value::from(name));
                    self.substitute(&Value::Mapping(single), &params, path)
                }
                _ => self.substitute(&Value::Mapping(single), params, path),
            };
            if let Value::Mapping(entries) = substituted {
                out.extend(entries);
            }
        }
        out
    }

    fn substitute(
        &mut self,
        body: &Value,
        params: &IndexMap<String, Value>,
        path: &NodePath,
    ) -> Value {
        let result = substitute(body, params);
        let warnings = result
            .missing
            .iter()
            .map(|name| {
                (
                    codes::MISSING_TEMPLATE_PARAMETER,
                    format!("no value for template parameter '{name}'"),
                )
            })
            .chain(result.unknown_transforms.iter().map(|name| {
                (
                    codes::UNKNOWN_TRANSFORM,
                    format!("unknown template transform '!{name}'"),
                )
            }));
        for (code, message) in warnings {
            let reported = self
                .diagnostics
                .diagnostics()
                .iter()
                .any(|d| d.path == *path && *d.message == *message);
            if !reported {
                tracing::warn!("[EXPAND] {} at {}", message, path);
                self.diagnostics.warning(&self.doc_path, path, code, message);
            }
        }
        result.value
    }
}

// ============================================================================
// NAME QUALIFICATION
// ============================================================================

/// Prefix every declaration name in a library fragment with the namespace
/// path the root uses for that library. `in_declaration` is set inside type
/// declarations, where a mapping under `type` is an inline type rather than
/// a parameterised reference.
fn qualify(value: &Value, prefix: &str, in_declaration: bool) -> Value {
    let Some(map) = value.as_mapping() else {
        return value.clone();
    };
    let mut out = Mapping::with_capacity(map.len());
    for (key, item) in map {
        if let Some(annotation) = annotation_name(key) {
            out.insert(format!("({})", qualify_name(annotation, prefix)), item.clone());
            continue;
        }
        let qualified = match key.as_str() {
            _ if OPAQUE_KEYS.contains(&key.as_str()) => item.clone(),
            "type" | "schema" | "items" => match item {
                Value::String(text) => Value::String(qualify_expr(text, prefix)),
                Value::Sequence(items) => Value::Sequence(
                    items
                        .iter()
                        .map(|i| match i {
                            Value::String(text) => Value::String(qualify_expr(text, prefix)),
                            other => qualify(other, prefix, true),
                        })
                        .collect(),
                ),
                Value::Mapping(_) if in_declaration || key != "type" => qualify(item, prefix, true),
                Value::Mapping(_) => qualify_reference(item, prefix),
                other => other.clone(),
            },
            "is" | "securedBy" => Value::Sequence(
                list_items(item)
                    .map(|reference| qualify_reference(reference, prefix))
                    .collect(),
            ),
            "body" => qualify_body(item, prefix),
            _ if DECLARATION_MAP_KEYS.contains(&key.as_str()) => qualify_declarations(item, prefix),
            _ => qualify(item, prefix, in_declaration),
        };
        out.insert(key.clone(), qualified);
    }
    Value::Mapping(out)
}

fn qualify_declarations(value: &Value, prefix: &str) -> Value {
    let Some(map) = value.as_mapping() else {
        return value.clone();
    };
    Value::Mapping(
        map.iter()
            .map(|(name, decl)| (name.clone(), qualify_declaration(decl, prefix)))
            .collect(),
    )
}

fn qualify_declaration(value: &Value, prefix: &str) -> Value {
    match value {
        Value::String(text) => Value::String(qualify_expr(text, prefix)),
        other => qualify(other, prefix, true),
    }
}

fn qualify_body(value: &Value, prefix: &str) -> Value {
    let by_media_type = value
        .as_mapping()
        .is_some_and(|map| !map.is_empty() && map.keys().all(|k| k.contains('/')));
    if by_media_type {
        qualify_declarations(value, prefix)
    } else {
        qualify_declaration(value, prefix)
    }
}

/// `name` or `{name: params}`.
fn qualify_reference(value: &Value, prefix: &str) -> Value {
    match value {
        Value::String(name) if name != "null" => Value::String(qualify_name(name, prefix)),
        Value::Mapping(map) if map.len() == 1 => Value::Mapping(
            map.iter()
                .map(|(name, params)| (qualify_name(name, prefix), params.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn qualify_name(name: &str, prefix: &str) -> String {
    if has_template(name) || is_builtin(name) {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn qualify_expr(text: &str, prefix: &str) -> String {
    if has_template(text) || is_inline_schema(text) {
        return text.to_string();
    }
    match parse_type_expr(text) {
        Ok(expr) => expr
            .map_names(&mut |name| {
                if is_builtin(name) {
                    name.clone()
                } else {
                    Name::new(format!("{prefix}.{name}"))
                }
            })
            .to_string(),
        Err(_) => text.to_string(),
    }
}

// ============================================================================
// MERGING
// ============================================================================

/// Merge `high` over `low`. Mappings merge key by key, reference lists are
/// concatenated, anything else is replaced. A null `high` keeps `low`.
pub(crate) fn deep_merge(low: &Value, high: &Value) -> Value {
    match (low, high) {
        (_, Value::Null) => low.clone(),
        (Value::Mapping(low_map), Value::Mapping(high_map)) => {
            let mut out = low_map.clone();
            for (key, high_value) in high_map {
                let merged = if LIST_KEYS.contains(&key.as_str()) {
                    merge_lists(low_map.get(key), Some(high_value)).unwrap_or(Value::Null)
                } else {
                    match low_map.get(key) {
                        Some(low_value) => deep_merge(low_value, high_value),
                        None => high_value.clone(),
                    }
                };
                out.insert(key.clone(), merged);
            }
            Value::Mapping(out)
        }
        _ => high.clone(),
    }
}

/// Merge one trait's contribution over the traits applied before it. A
/// header, parameter, body or response the later trait declares replaces the
/// earlier entry of the same name whole.
fn overlay_trait(low: &Value, high: &Value) -> Value {
    let (Value::Mapping(low_map), Value::Mapping(high_map)) = (low, high) else {
        return deep_merge(low, high);
    };
    let mut out = low_map.clone();
    for (key, high_value) in high_map {
        let merged = match low_map.get(key) {
            None => high_value.clone(),
            Some(low_value) if REPLACED_ENTRY_KEYS.contains(&key.as_str()) => {
                replace_entries(low_value, high_value)
            }
            Some(low_value) if key == "body" && is_media_type_map(low_value) => {
                replace_entries(low_value, high_value)
            }
            Some(_) if LIST_KEYS.contains(&key.as_str()) => {
                merge_lists(low_map.get(key), Some(high_value)).unwrap_or(Value::Null)
            }
            Some(low_value) => deep_merge(low_value, high_value),
        };
        out.insert(key.clone(), merged);
    }
    Value::Mapping(out)
}

fn replace_entries(low: &Value, high: &Value) -> Value {
    match (low, high) {
        (_, Value::Null) => low.clone(),
        (Value::Mapping(low_map), Value::Mapping(high_map)) => {
            let mut out = low_map.clone();
            for (name, entry) in high_map {
                out.insert(name.clone(), entry.clone());
            }
            Value::Mapping(out)
        }
        _ => high.clone(),
    }
}

fn is_media_type_map(value: &Value) -> bool {
    value
        .as_mapping()
        .is_some_and(|map| !map.is_empty() && map.keys().all(|key| key.contains('/')))
}

/// Concatenate two reference lists. A reference named twice keeps its first
/// position and the later parameters.
fn merge_lists(low: Option<&Value>, high: Option<&Value>) -> Option<Value> {
    if low.is_none() && high.is_none() {
        return None;
    }
    let mut out: Vec<Value> = Vec::new();
    for item in low.into_iter().chain(high).flat_map(list_items) {
        let key = list_key(item);
        match out.iter().position(|existing| list_key(existing) == key) {
            Some(pos) => out[pos] = item.clone(),
            None => out.push(item.clone()),
        }
    }
    Some(Value::Sequence(out))
}

fn list_items(value: &Value) -> impl Iterator<Item = &Value> {
    let items: &[Value] = match value {
        Value::Sequence(items) => items,
        Value::Null => &[],
        other => std::slice::from_ref(other),
    };
    items.iter()
}

fn list_key(item: &Value) -> String {
    match item {
        Value::Mapping(map) if map.len() == 1 => map.keys().next().cloned().unwrap_or_default(),
        other => other.to_display_string(),
    }
}

/// Match `get?` in one level with `get` in the other, so both merge into
/// the same key. The result is optional only if both are.
fn align_optional_methods(low: &mut Mapping, high: &mut Mapping) {
    let rename = |from: &mut Mapping, to: &Mapping| {
        let keys: Vec<String> = from
            .keys()
            .filter(|k| method_key(k).is_some_and(|(_, optional)| optional))
            .cloned()
            .collect();
        for key in keys {
            let plain = key.trim_end_matches('?');
            if to.contains_key(plain) {
                if let Some(index) = from.get_index_of(&key) {
                    if let Some((_, value)) = from.shift_remove_index(index) {
                        from.shift_insert(index, plain.to_string(), value);
                    }
                }
            }
        }
    };
    rename(low, high);
    rename(high, low);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        Value::from(serde_yaml::from_str::<serde_yaml::Value>(text).unwrap())
    }

    #[test]
    fn test_deep_merge_prefers_high() {
        let low = yaml("description: low\nheaders:\n  A: string\n");
        let high = yaml("description: high\nheaders:\n  B: string\n");
        let merged = deep_merge(&low, &high);
        assert_eq!(merged.get("description"), Some(&Value::from("high")));
        let headers = merged.get("headers").unwrap().as_mapping().unwrap();
        assert_eq!(headers.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_null_high_keeps_low() {
        let low = yaml("description: low\n");
        assert_eq!(deep_merge(&low, &Value::Null), low);
    }

    #[test]
    fn test_reference_lists_concatenate_without_duplicates() {
        let low = yaml("is: [a, b]\n");
        let high = yaml("is: [b, {c: {x: 1}}]\n");
        let merged = deep_merge(&low, &high);
        let names: Vec<String> = list_items(merged.get("is").unwrap()).map(list_key).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_qualify_library_fragment() {
        let body = yaml(
            "is: [paged]\nbody:\n  application/json:\n    type: Item[] | nil\nheaders:\n  X-Id: Id\nresponses:\n  200:\n    body: string\n(tracked): yes\ndescription: Item list\n",
        );
        let qualified = qualify(&body, "lib", false);
        assert_eq!(qualified.get("is"), Some(&yaml("[lib.paged]")));
        let json = qualified.get("body").unwrap().get("application/json").unwrap();
        assert_eq!(json.get("type"), Some(&Value::from("lib.Item[] | nil")));
        let header = qualified.get("headers").unwrap().get("X-Id").unwrap();
        assert_eq!(header, &Value::from("lib.Id"));
        assert!(qualified.get("(lib.tracked)").is_some());
        let response = qualified.get("responses").unwrap().get("200").unwrap();
        assert_eq!(response.get("body"), Some(&Value::from("string")));
    }

    #[test]
    fn test_template_names_are_not_qualified() {
        assert_eq!(qualify_name("<<item>>", "lib"), "<<item>>");
        assert_eq!(qualify_expr("<<item>>[]", "lib"), "<<item>>[]");
    }

    #[test]
    fn test_align_optional_methods() {
        let mut parent = yaml("get:\n  description: parent\n")
            .as_mapping()
            .cloned()
            .unwrap();
        let mut child = yaml("get?:\n  description: child\n")
            .as_mapping()
            .cloned()
            .unwrap();
        align_optional_methods(&mut parent, &mut child);
        assert!(child.contains_key("get"));
        assert!(!child.contains_key("get?"));
    }

    #[test]
    fn test_later_trait_replaces_named_entries() {
        let low = yaml(
            "headers:\n  X-Flag:\n    default: one\n    description: first\n  X-Keep: string\nbody:\n  application/json:\n    type: A\n    example: {}\ndescription: low\n",
        );
        let high = yaml(
            "headers:\n  X-Flag:\n    default: two\nbody:\n  application/json:\n    type: B\n",
        );
        let merged = overlay_trait(&low, &high);
        assert_eq!(merged, yaml(
            "headers:\n  X-Flag:\n    default: two\n  X-Keep: string\nbody:\n  application/json:\n    type: B\ndescription: low\n",
        ));
    }
}
