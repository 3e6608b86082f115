//! Built-in types. They resolve to fixed synthetic definitions and can never
//! be shadowed by user declarations.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::runtime::{RuntimeType, TypeKind};
use crate::base::Name;

pub const BUILTIN_TYPE_NAMES: &[&str] = &[
    "any",
    "nil",
    "string",
    "number",
    "integer",
    "boolean",
    "date-only",
    "time-only",
    "datetime-only",
    "datetime",
    "file",
    "object",
    "array",
];

static BUILTINS: Lazy<FxHashMap<&'static str, Arc<RuntimeType>>> = Lazy::new(|| {
    BUILTIN_TYPE_NAMES
        .iter()
        .filter_map(|&name| {
            let kind = TypeKind::from_builtin(name)?;
            Some((name, Arc::new(RuntimeType::of_kind(kind, Some(Name::new_static(name))))))
        })
        .collect()
});

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains_key(name)
}

/// The runtime type of a built-in name.
pub fn builtin_type(name: &str) -> Option<Arc<RuntimeType>> {
    BUILTINS.get(name).cloned()
}

pub(crate) fn builtin_of_kind(kind: TypeKind) -> Arc<RuntimeType> {
    builtin_type(kind.name())
        .unwrap_or_else(|| Arc::new(RuntimeType::of_kind(kind, None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        assert!(is_builtin("string"));
        assert!(is_builtin("datetime-only"));
        assert!(!is_builtin("String"));
        assert_eq!(builtin_type("array").unwrap().kind, TypeKind::Array);
    }

    #[test]
    fn test_union_has_no_builtin_name() {
        let union = builtin_of_kind(TypeKind::Union);
        assert_eq!(union.kind, TypeKind::Union);
        assert!(union.name.is_none());
    }
}
