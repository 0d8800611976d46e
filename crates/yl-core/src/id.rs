//! Stable handle for declarations owned by the resolved-AST arena.
//!
//! `DeclId` is a newtype over `u32` so that a handle into [`crate::arena::DeclArena`]
//! cannot be confused with an arbitrary integer at the type level. Resolved
//! reference nodes (`ResolvedDeclRefExpr`) hold a `DeclId` rather than a Rust
//! reference, which is how the "non-owning back-reference, no cycles"
//! invariant in the data model is expressed without borrowing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a declaration (function, parameter, or variable) inside a
/// [`crate::arena::DeclArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decl_id_display() {
        assert_eq!(format!("{}", DeclId(7)), "7");
    }

    #[test]
    fn decl_ids_compare_by_value() {
        assert_eq!(DeclId(3), DeclId(3));
        assert_ne!(DeclId(3), DeclId(4));
    }

    #[test]
    fn serde_roundtrip() {
        let id = DeclId(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: DeclId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
