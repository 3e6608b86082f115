//! Borrowed node views over a raw document.

use crate::base::NodePath;

use super::value::{Number, Value};

/// A raw node: a value plus its location in the document.
///
/// Nodes are cheap views; the underlying value tree is never mutated.
#[derive(Debug, Clone)]
pub struct RawNode<'a> {
    value: &'a Value,
    path: NodePath,
}

impl<'a> RawNode<'a> {
    pub fn new(value: &'a Value, path: NodePath) -> Self {
        Self { value, path }
    }

    /// View a whole document.
    pub fn root(value: &'a Value) -> Self {
        Self::new(value, NodePath::root())
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// The mapping key this node was reached through.
    pub fn key(&self) -> Option<&str> {
        self.path.last_key()
    }

    /// Attribute node for `name`, if this node is a mapping that has it.
    pub fn attr(&self, name: &str) -> Option<RawNode<'a>> {
        self.value
            .get(name)
            .map(|value| RawNode::new(value, self.path.key(name)))
    }

    /// String value of attribute `name`.
    pub fn attr_str(&self, name: &str) -> Option<&'a str> {
        self.value.get(name).and_then(Value::as_str)
    }

    /// Mapping entries in document order. Empty for non-mappings.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, RawNode<'a>)> + '_ {
        self.value
            .as_mapping()
            .into_iter()
            .flat_map(|map| map.iter())
            .map(|(k, v)| (k.as_str(), RawNode::new(v, self.path.key(k.as_str()))))
    }

    /// Sequence items. A scalar or mapping is treated as a one-element sequence.
    pub fn items(&self) -> Vec<RawNode<'a>> {
        match self.value {
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| RawNode::new(v, self.path.index(i)))
                .collect(),
            Value::Null => Vec::new(),
            _ => vec![self.clone()],
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn as_number(&self) -> Option<Number> {
        self.value.as_number()
    }

    pub fn is_mapping(&self) -> bool {
        self.value.as_mapping().is_some()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}
