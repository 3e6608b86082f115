//! Shared test helpers.

pub mod model_helpers;
pub mod source_fixtures;
