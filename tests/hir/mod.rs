//! HIR layer tests
//!
//! Tests for the RAML semantic model:
//! - Loading, `!include` and `uses`
//! - Name resolution across libraries
//! - Runtime types
//! - Trait and resource type expansion
//! - Instance validation
//! - URI parameters
//! - Semantic diagnostics

mod tests_diagnostics;
mod tests_expansion;
mod tests_loading;
mod tests_resolution;
mod tests_type_system;
mod tests_uri_parameters;
mod tests_validation;
