//! Semantic error kinds for YL.
//!
//! Uses `thiserror` for structured, matchable error variants: one variant
//! per failure family, each carrying the `SourceLocation` and whatever
//! identifiers a caller needs to act on the failure (symbol name, expected
//! type, etc). `Display` (derived from `#[error("...")]`) produces the exact
//! diagnostic text; callers never hand-format error strings at the call
//! site.
//!
//! Several coarser error *kinds* (`Redeclaration`, `TypeMismatch`,
//! `InvalidType`, ...) cover more than one concrete situation here -- e.g.
//! `TypeMismatch` covers operator operands, assignment, call arguments,
//! return values, and initializers -- and each gets its own finer-grained
//! variant so the message can be specific. [`SemaError::kind`] maps back to
//! the coarser kind for callers that only care about the broad category.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loc::SourceLocation;

/// Which side of a binary operator produced a void operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperandSide {
    Lhs,
    Rhs,
}

impl std::fmt::Display for OperandSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OperandSide::Lhs => "LHS",
            OperandSide::Rhs => "RHS",
        })
    }
}

/// The coarse error-kind taxonomy. Several concrete [`SemaError`] variants
/// map to the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Redeclaration,
    UnresolvedSymbol,
    FunctionAsValue,
    TypeMismatch,
    VoidInExpression,
    ArgMismatch,
    InvalidType,
    ImmutableMutation,
    UninitializedUse,
    NonReturning,
    NonReturningSomePaths,
    MainShape,
}

/// Every way Sema can fail to resolve or validate a construct.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum SemaError {
    #[error("redeclaration of '{identifier}'")]
    Redeclaration {
        location: SourceLocation,
        identifier: String,
    },

    #[error("symbol '{identifier}' not found")]
    UnresolvedSymbol {
        location: SourceLocation,
        identifier: String,
    },

    #[error("expected to call function '{identifier}'")]
    FunctionAsValue {
        location: SourceLocation,
        identifier: String,
    },

    #[error("calling non-function symbol")]
    CallingNonFunction { location: SourceLocation },

    #[error("argument count mismatch in function call")]
    ArgMismatch {
        location: SourceLocation,
        expected: usize,
        actual: usize,
    },

    #[error("unexpected type of argument")]
    ArgTypeMismatch {
        location: SourceLocation,
        param_index: usize,
    },

    #[error("void expression cannot be used as operand to unary operator")]
    VoidUnaryOperand { location: SourceLocation },

    #[error("void expression cannot be used as {side} operand to binary operator")]
    VoidBinaryOperand {
        location: SourceLocation,
        side: OperandSide,
    },

    #[error("expected number in condition")]
    NonNumberCondition { location: SourceLocation },

    #[error("parameters are immutable and cannot be assigned")]
    AssignToParam { location: SourceLocation },

    #[error("assigned value type doesn't match variable type")]
    AssignTypeMismatch { location: SourceLocation },

    #[error("an uninitialized variable is expected to have a type specifier")]
    MissingTypeAndInitializer {
        location: SourceLocation,
        identifier: String,
    },

    #[error("variable '{identifier}' has invalid '{type_name}' type")]
    InvalidVariableType {
        location: SourceLocation,
        identifier: String,
        type_name: String,
    },

    #[error("parameter '{identifier}' has invalid '{type_name}' type")]
    InvalidParamType {
        location: SourceLocation,
        identifier: String,
        type_name: String,
    },

    #[error("function '{identifier}' has invalid '{type_name}' type")]
    InvalidFunctionType {
        location: SourceLocation,
        identifier: String,
        type_name: String,
    },

    #[error("initializer type mismatch")]
    InitializerTypeMismatch { location: SourceLocation },

    #[error("unexpected return value in void function")]
    UnexpectedReturnValue { location: SourceLocation },

    #[error("expected a return value")]
    MissingReturnValue { location: SourceLocation },

    #[error("unexpected return type")]
    ReturnTypeMismatch { location: SourceLocation },

    #[error("'main' function is expected to have 'void' type")]
    MainMustReturnVoid { location: SourceLocation },

    #[error("'main' function is expected to take no arguments")]
    MainMustTakeNoArgs { location: SourceLocation },

    #[error("non-void function doesn't return a value")]
    NonReturning { location: SourceLocation },

    #[error("non-void function doesn't return a value on every path")]
    NonReturningSomePaths { location: SourceLocation },

    #[error("'{identifier}' cannot be mutated")]
    ImmutableMutation {
        location: SourceLocation,
        identifier: String,
    },

    #[error("'{identifier}' is not initialized")]
    UninitializedUse {
        location: SourceLocation,
        identifier: String,
    },
}

impl SemaError {
    /// The location this error should be reported at.
    pub fn location(&self) -> &SourceLocation {
        match self {
            SemaError::Redeclaration { location, .. }
            | SemaError::UnresolvedSymbol { location, .. }
            | SemaError::FunctionAsValue { location, .. }
            | SemaError::CallingNonFunction { location }
            | SemaError::ArgMismatch { location, .. }
            | SemaError::ArgTypeMismatch { location, .. }
            | SemaError::VoidUnaryOperand { location }
            | SemaError::VoidBinaryOperand { location, .. }
            | SemaError::NonNumberCondition { location }
            | SemaError::AssignToParam { location }
            | SemaError::AssignTypeMismatch { location }
            | SemaError::MissingTypeAndInitializer { location, .. }
            | SemaError::InvalidVariableType { location, .. }
            | SemaError::InvalidParamType { location, .. }
            | SemaError::InvalidFunctionType { location, .. }
            | SemaError::InitializerTypeMismatch { location }
            | SemaError::UnexpectedReturnValue { location }
            | SemaError::MissingReturnValue { location }
            | SemaError::ReturnTypeMismatch { location }
            | SemaError::MainMustReturnVoid { location }
            | SemaError::MainMustTakeNoArgs { location }
            | SemaError::NonReturning { location }
            | SemaError::NonReturningSomePaths { location }
            | SemaError::ImmutableMutation { location, .. }
            | SemaError::UninitializedUse { location, .. } => location,
        }
    }

    /// The coarse [`ErrorKind`] this concrete error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SemaError::Redeclaration { .. } => ErrorKind::Redeclaration,
            SemaError::UnresolvedSymbol { .. } => ErrorKind::UnresolvedSymbol,
            SemaError::FunctionAsValue { .. } => ErrorKind::FunctionAsValue,
            SemaError::CallingNonFunction { .. } => ErrorKind::TypeMismatch,
            SemaError::ArgMismatch { .. } => ErrorKind::ArgMismatch,
            SemaError::ArgTypeMismatch { .. }
            | SemaError::AssignTypeMismatch { .. }
            | SemaError::InitializerTypeMismatch { .. }
            | SemaError::ReturnTypeMismatch { .. } => ErrorKind::TypeMismatch,
            SemaError::VoidUnaryOperand { .. } | SemaError::VoidBinaryOperand { .. } => {
                ErrorKind::VoidInExpression
            }
            SemaError::NonNumberCondition { .. } => ErrorKind::TypeMismatch,
            SemaError::AssignToParam { .. } => ErrorKind::ImmutableMutation,
            SemaError::MissingTypeAndInitializer { .. }
            | SemaError::InvalidVariableType { .. }
            | SemaError::InvalidParamType { .. }
            | SemaError::InvalidFunctionType { .. } => ErrorKind::InvalidType,
            SemaError::UnexpectedReturnValue { .. } | SemaError::MissingReturnValue { .. } => {
                ErrorKind::TypeMismatch
            }
            SemaError::MainMustReturnVoid { .. } | SemaError::MainMustTakeNoArgs { .. } => {
                ErrorKind::MainShape
            }
            SemaError::NonReturning { .. } => ErrorKind::NonReturning,
            SemaError::NonReturningSomePaths { .. } => ErrorKind::NonReturningSomePaths,
            SemaError::ImmutableMutation { .. } => ErrorKind::ImmutableMutation,
            SemaError::UninitializedUse { .. } => ErrorKind::UninitializedUse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("t.yl", 1, 1)
    }

    #[test]
    fn message_matches_reference_wording() {
        let err = SemaError::NonReturningSomePaths { location: loc() };
        assert_eq!(
            err.to_string(),
            "non-void function doesn't return a value on every path"
        );
    }

    #[test]
    fn kind_groups_type_mismatch_family() {
        assert_eq!(
            SemaError::ArgTypeMismatch {
                location: loc(),
                param_index: 0
            }
            .kind(),
            ErrorKind::TypeMismatch
        );
        assert_eq!(
            SemaError::InitializerTypeMismatch { location: loc() }.kind(),
            ErrorKind::TypeMismatch
        );
    }

    #[test]
    fn location_accessor_returns_carried_location() {
        let err = SemaError::UninitializedUse {
            location: loc(),
            identifier: "x".into(),
        };
        assert_eq!(*err.location(), loc());
    }
}
