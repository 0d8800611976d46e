//! The YL type system.
//!
//! YL has exactly two valid post-resolution types, `Number` and `Void`, plus
//! a `Custom` variant that only ever appears in parsed (pre-resolution) type
//! tokens -- the parser can produce it for an unrecognized type name, but
//! Sema always rejects it (`InvalidType`). There is no type registry: the
//! set of kinds is closed and small enough to be a plain enum.

use serde::{Deserialize, Serialize};

/// A type as it appears in the parsed or resolved tree.
///
/// `Custom` is a parser artifact: it exists only so the parser can represent
/// an unrecognized type name without failing outright, deferring the error
/// to Sema. No resolved node ever carries `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// The only scalar type in the language -- an IEEE-754 binary64.
    Number,
    /// The absence of a value; valid only as a function return type.
    Void,
    /// An unrecognized type name. Always rejected by Sema.
    Custom(String),
}

impl Type {
    /// The `println(n: number)` parameter type and var/return type family.
    pub fn number() -> Type {
        Type::Number
    }

    /// The `void` type used for statements-as-functions and `println`'s return.
    pub fn void() -> Type {
        Type::Void
    }

    /// A human-readable type name, used in diagnostic messages the way the
    /// reference implementation's `Type::name` field is.
    pub fn name(&self) -> &str {
        match self {
            Type::Number => "number",
            Type::Void => "void",
            Type::Custom(name) => name,
        }
    }

    /// `true` for `Number`/`Void`, `false` for `Custom`. Only types that pass
    /// this check may appear in a resolved tree.
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, Type::Custom(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_is_not_resolvable() {
        assert!(!Type::Custom("widget".into()).is_resolvable());
    }

    #[test]
    fn number_and_void_are_resolvable() {
        assert!(Type::Number.is_resolvable());
        assert!(Type::Void.is_resolvable());
    }

    #[test]
    fn name_reflects_kind() {
        assert_eq!(Type::Number.name(), "number");
        assert_eq!(Type::Void.name(), "void");
        assert_eq!(Type::Custom("Foo".into()).name(), "Foo");
    }

    #[test]
    fn serde_roundtrip() {
        let t = Type::Custom("Point".into());
        let json = serde_json::to_string(&t).unwrap();
        let back: Type = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
