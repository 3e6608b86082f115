//! Foundation types for the RAML model.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Name`] - Cheap, immutable declaration names
//! - [`NodePath`], [`PathSegment`] - Location of a node inside a raw document
//! - [`TextRange`], [`TextSize`] - Offsets inside a single scalar (type expressions)
//!
//! This module has NO dependencies on other raml modules.

mod path;

pub use path::{NodePath, PathSegment};
pub use text_size::{TextRange, TextSize};

/// Interned-by-value declaration name.
pub type Name = smol_str::SmolStr;

// Re-export text-size types for convenience
pub use text_size;
