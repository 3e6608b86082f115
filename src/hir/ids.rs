//! Arena keys.
//!
//! Every cross-reference in the model is one of these keys, looked up in the
//! owning [`Model`](super::Model). Ids are only meaningful for the model that
//! produced them.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// Position of the entry in its arena.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

arena_id!(
    /// A loaded document. The root document is always [`DocId::ROOT`].
    DocId,
    "doc#"
);
arena_id!(
    /// A type declaration: named type, annotation type, property, parameter, body...
    TypeId,
    "type#"
);
arena_id!(TraitId, "trait#");
arena_id!(ResourceTypeId, "rt#");
arena_id!(SchemeId, "scheme#");
arena_id!(ResourceId, "res#");
arena_id!(MethodId, "method#");

impl DocId {
    pub const ROOT: DocId = DocId(0);
}
