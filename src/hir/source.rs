//! In-memory source sets and document loading.
//!
//! A [`SourceSet`] maps paths to document text. Loading a root document
//! parses it, inlines `!include` tags and follows `uses` transitively. Paths
//! are `/`-separated and relative to the including document; a leading `/`
//! makes a path relative to the root of the set.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};

use crate::base::Name;
use crate::error::RamlError;
use crate::syntax::{DocumentKind, RawDocument, Value, yaml_key, yaml_number};

/// Extensions whose included content is parsed as YAML.
const YAML_EXTENSIONS: &[&str] = &["raml", "yaml", "yml"];

/// A set of named documents.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: IndexMap<String, String>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`SourceSet::insert`].
    pub fn with_file(mut self, path: &str, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: &str, text: impl Into<String>) {
        self.files.insert(normalize_path(path), text.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(&normalize_path(path)).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Load `root` and every library it uses, directly or transitively.
    ///
    /// The root document comes first; each library is loaded once even when
    /// imports form a cycle.
    pub fn load(&self, root: &str) -> Result<Vec<RawDocument>, RamlError> {
        let root = normalize_path(root);
        let mut queued: IndexSet<String> = IndexSet::new();
        let mut queue = VecDeque::new();
        let mut documents = Vec::new();

        queued.insert(root.clone());
        queue.push_back((root, false));

        while let Some((path, as_library)) = queue.pop_front() {
            let mut document = self.load_document(&path)?;
            if as_library && document.kind() != DocumentKind::Library {
                return Err(RamlError::NotALibrary {
                    path,
                    kind: document.kind().to_string(),
                });
            }

            let mut uses = IndexMap::new();
            if let Some(entries) = document.root().get("uses").and_then(Value::as_mapping) {
                for (namespace, target) in entries {
                    let Some(target) = target.as_str() else {
                        continue;
                    };
                    let resolved = resolve_path(&path, target);
                    if queued.insert(resolved.clone()) {
                        queue.push_back((resolved.clone(), true));
                    }
                    uses.insert(Name::new(namespace), resolved);
                }
            }
            document.set_uses(uses);
            tracing::debug!("[LOAD] loaded {} document '{}'", document.kind(), path);
            documents.push(document);
        }

        Ok(documents)
    }

    fn load_document(&self, path: &str) -> Result<RawDocument, RamlError> {
        let text = self
            .get(path)
            .ok_or_else(|| RamlError::SourceNotFound(path.to_string()))?;
        let kind = DocumentKind::from_header(path, text)?;
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| RamlError::yaml(path, e))?;
        let mut stack = vec![path.to_string()];
        let root = self.convert(yaml, path, &mut stack)?;
        Ok(RawDocument::new(path, kind, root))
    }

    /// Convert YAML to a raw value, inlining `!include` tags.
    fn convert(
        &self,
        value: serde_yaml::Value,
        current: &str,
        stack: &mut Vec<String>,
    ) -> Result<Value, RamlError> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => yaml_number(&n),
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|item| self.convert(item, current, stack))
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut out = IndexMap::new();
                for (key, value) in map {
                    out.insert(yaml_key(&key), self.convert(value, current, stack)?);
                }
                Value::Mapping(out)
            }
            serde_yaml::Value::Tagged(tagged) => {
                let serde_yaml::value::TaggedValue { tag, value } = *tagged;
                match value {
                    serde_yaml::Value::String(target)
                        if tag.to_string().trim_start_matches('!') == "include" =>
                    {
                        self.include(&target, current, stack)?
                    }
                    other => self.convert(other, current, stack)?,
                }
            }
        })
    }

    fn include(
        &self,
        target: &str,
        current: &str,
        stack: &mut Vec<String>,
    ) -> Result<Value, RamlError> {
        let path = resolve_path(current, target.trim());
        if stack.contains(&path) {
            return Err(RamlError::IncludeCycle(path));
        }
        let text = self
            .get(&path)
            .ok_or_else(|| RamlError::SourceNotFound(path.clone()))?;

        let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        if !YAML_EXTENSIONS.contains(&extension) {
            tracing::trace!("[LOAD] including '{}' as text", path);
            return Ok(Value::String(text.to_string()));
        }

        let yaml: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| RamlError::yaml(&path, e))?;
        stack.push(path.clone());
        let value = self.convert(yaml, &path, stack);
        stack.pop();
        value
    }
}

/// Resolve `target` against the document at `from`.
pub(crate) fn resolve_path(from: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_path(absolute);
    }
    match from.rsplit_once('/') {
        Some((dir, _)) => normalize_path(&format!("{dir}/{target}")),
        None => normalize_path(target),
    }
}

/// Collapse `.` and `..` segments and duplicate slashes.
pub(crate) fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}
