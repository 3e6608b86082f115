//! # raml-base
//!
//! Resolution, expansion and instance validation engine for the RAML 1.0
//! semantic model.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! hir       → Semantic model: resolution, type system, expansion, validation
//!   ↓
//! parser    → Logos lexer and type expression parser
//!   ↓
//! syntax    → Raw documents, nodes and structured values
//!   ↓
//! base      → Primitives (Name, NodePath, TextRange)
//! ```
//!
//! ## Example
//!
//! ```
//! use raml::Model;
//!
//! let model: Model = "#%RAML 1.0\ntitle: Pets\ntypes:\n  Pet:\n    properties:\n      id: integer\n"
//!     .parse()
//!     .unwrap();
//! let pet = model.find_type("Pet").unwrap();
//! let errors = model.validate_instance(pet, &raml::Value::Mapping(Default::default()));
//! assert_eq!(errors, vec!["Required property 'id' is missing".to_string()]);
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → parser → hir)
// ============================================================================

/// Foundation types: Name, NodePath, TextRange
pub mod base;

/// Raw documents and structured values
pub mod syntax;

/// Type expression lexer and parser
pub mod parser;

/// High-level IR: the semantic model
pub mod hir;

/// Model configuration
pub mod config;

/// Loading errors
pub mod error;

// Re-export commonly needed items
pub use base::{Name, NodePath, TextRange, TextSize};
pub use config::{ExpansionOptions, MergePolicy, ModelConfig};
pub use error::RamlError;
pub use hir::{Diagnostic, Model, Severity, SourceSet};
pub use syntax::{DocumentKind, RawDocument, TypeInstance, Value};
