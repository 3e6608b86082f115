//! Model configuration.
//!
//! Everything here has a sensible default; pass a [`ModelConfig`] to
//! [`Model::load_with_config`](crate::hir::Model::load_with_config) to change it.
//! The config is kept on the model and reused by `expand()`.

use serde::Deserialize;

/// Default bound for inheritance walks and recursive validation.
pub const DEFAULT_MAX_INHERITANCE_DEPTH: usize = 64;

/// Which contribution wins when a resource type and an applied trait both
/// provide the same key for a method.
///
/// Explicit method/resource declarations always win over both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// explicit > method-level traits > resource-level traits > resource type
    #[default]
    TraitsOverResourceType,
    /// explicit > resource type > method-level traits > resource-level traits
    ResourceTypeOverTraits,
}

/// Options for trait / resource type expansion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpansionOptions {
    pub merge_policy: MergePolicy,
    /// Provide `resourcePath`, `resourcePathName` and `methodName` to templates.
    pub reserved_parameters: bool,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::default(),
            reserved_parameters: true,
        }
    }
}

/// Configuration of a loaded model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    pub expansion: ExpansionOptions,
    /// Bound for every inheritance walk and for recursive instance validation.
    pub max_inheritance_depth: usize,
    /// Media type used to name bodies declared without one, when the API
    /// does not declare `mediaType` itself.
    pub default_media_type: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            expansion: ExpansionOptions::default(),
            max_inheritance_depth: DEFAULT_MAX_INHERITANCE_DEPTH,
            default_media_type: None,
        }
    }
}
