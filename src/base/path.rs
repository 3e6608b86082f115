//! Node paths: positional information for raw nodes.
//!
//! The raw layer does not carry line/column data, so every node is located by
//! the chain of mapping keys and sequence indices leading to it from the
//! document root. Diagnostics render it as `/types/Person/properties/id`.

use std::fmt;

/// A single step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a node from the root of its document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

impl NodePath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the child reached through mapping key `key`.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Path of the child reached through sequence index `index`.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last mapping key on the path, if any.
    pub fn last_key(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|s| match s {
            PathSegment::Key(k) => Some(k.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    /// Check whether `self` is `other` or lies below it.
    pub fn starts_with(&self, other: &NodePath) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                // Keys that are URIs already start with a slash
                PathSegment::Key(k) if k.starts_with('/') => write!(f, "{k}")?,
                PathSegment::Key(k) => write!(f, "/{k}")?,
                PathSegment::Index(i) => write!(f, "/{i}")?,
            }
        }
        Ok(())
    }
}
