//! Raw documents: one parsed RAML file.

use std::fmt;

use indexmap::IndexMap;

use crate::base::Name;
use crate::error::RamlError;

use super::node::RawNode;
use super::value::Value;

const HEADER_PREFIX: &str = "#%RAML";

/// The kind of a RAML document, taken from its header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Api,
    Overlay,
    Extension,
    Library,
}

impl DocumentKind {
    /// Parse the header line of a document (`#%RAML 1.0 Library`).
    pub fn from_header(path: &str, text: &str) -> Result<Self, RamlError> {
        let first = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();

        let Some(rest) = first.strip_prefix(HEADER_PREFIX) else {
            return Err(RamlError::MissingHeader(path.to_string()));
        };
        let mut parts = rest.split_whitespace();
        let version = parts.next().unwrap_or_default();
        if version != "1.0" {
            return Err(RamlError::UnsupportedDocument {
                path: path.to_string(),
                header: first.to_string(),
            });
        }

        match parts.next() {
            None => Ok(DocumentKind::Api),
            Some("Library") => Ok(DocumentKind::Library),
            Some("Overlay") => Ok(DocumentKind::Overlay),
            Some("Extension") => Ok(DocumentKind::Extension),
            Some(_) => Err(RamlError::UnsupportedDocument {
                path: path.to_string(),
                header: first.to_string(),
            }),
        }
    }

    pub fn is_api_like(&self) -> bool {
        !matches!(self, DocumentKind::Library)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Api => "Api",
            DocumentKind::Overlay => "Overlay",
            DocumentKind::Extension => "Extension",
            DocumentKind::Library => "Library",
        };
        f.write_str(name)
    }
}

/// A parsed document with its `uses` edges resolved to source paths.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    path: String,
    kind: DocumentKind,
    root: Value,
    uses: IndexMap<Name, String>,
}

impl RawDocument {
    pub fn new(path: impl Into<String>, kind: DocumentKind, root: Value) -> Self {
        Self {
            path: path.into(),
            kind,
            root,
            uses: IndexMap::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn node(&self) -> RawNode<'_> {
        RawNode::root(&self.root)
    }

    /// Namespace key → library source path.
    pub fn uses(&self) -> &IndexMap<Name, String> {
        &self.uses
    }

    pub(crate) fn set_uses(&mut self, uses: IndexMap<Name, String>) {
        self.uses = uses;
    }

    /// Copy of this document with a different root value.
    pub fn with_root(&self, root: Value) -> Self {
        Self {
            path: self.path.clone(),
            kind: self.kind,
            root,
            uses: self.uses.clone(),
        }
    }
}
