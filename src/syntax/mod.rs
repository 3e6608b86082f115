//! Raw node layer: documents, nodes and structured values.
//!
//! Everything above this layer reads raw documents through [`RawNode`] views
//! and never mutates them. YAML text is turned into [`Value`] trees by the
//! loader in [`crate::hir::SourceSet`].

mod document;
mod instance;
mod node;
mod value;

pub use document::{DocumentKind, RawDocument};
pub use instance::{TypeInstance, TypeInstanceProperty};
pub use node::RawNode;
pub use value::{Number, Value};

pub(crate) use value::{yaml_key, yaml_number};
