//! Type declarations and the runtime type system.
//!
//! [`TypeDeclaration`]s are what documents say; [`RuntimeType`]s are what a
//! declaration means once its parents are resolved and merged.

mod builder;
mod builtin;
mod decl;
mod runtime;

pub use builtin::{BUILTIN_TYPE_NAMES, builtin_type, is_builtin};
pub use decl::{
    AnnotationFacets, AnnotationTarget, ExampleSpec, LocationKind, ModelLocation,
    TypeDeclaration, TypeSource,
};
pub use runtime::{
    ArrayFacets, ObjectFacets, PatternProperty, PropertyShape, RuntimeResult, RuntimeType,
    ScalarFacets, TypeFailure, TypeHandle, TypeIssue, TypeKind,
};
