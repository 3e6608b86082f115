//! Error types for loading documents and for caller-contract violations.
//!
//! Document-content problems (unresolved names, cycles, bad facets) are never
//! errors of this type; they are reported as [`Diagnostic`](crate::hir::Diagnostic)s
//! on the smallest enclosing node so the rest of the model stays usable.

use thiserror::Error;

/// Errors raised while loading a model or when the model API is misused.
#[derive(Debug, Error)]
pub enum RamlError {
    /// YAML parsing error.
    #[error("YAML error in '{path}': {message}")]
    Yaml { path: String, message: String },

    /// The document does not start with a `#%RAML 1.0` header.
    #[error("Missing '#%RAML 1.0' header in '{0}'")]
    MissingHeader(String),

    /// Header names a RAML version or fragment kind this model does not handle.
    #[error("Unsupported document '{path}': {header}")]
    UnsupportedDocument { path: String, header: String },

    /// A root, library or include path is not part of the source set.
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// `!include` chain that includes itself.
    #[error("Include cycle through '{0}'")]
    IncludeCycle(String),

    /// A library import must point at a `#%RAML 1.0 Library` document.
    #[error("'{path}' is imported as a library but is a {kind} document")]
    NotALibrary { path: String, kind: String },

    /// The caller used the model in a way that cannot be answered,
    /// e.g. asking for the id of a method that belongs to another model.
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),
}

impl RamlError {
    /// Create a YAML error.
    pub fn yaml(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Yaml {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid usage error.
    pub fn invalid_usage(message: impl Into<String>) -> Self {
        Self::InvalidUsage(message.into())
    }
}
