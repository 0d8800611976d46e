//! Data model shared between the YL parser boundary and Sema: source
//! locations, the type system, the parsed AST, the resolved AST and its
//! declaration arena, diagnostics, and the semantic error enum.
//!
//! Lexing, parsing, and code generation are external collaborators and have
//! no representation in this crate beyond the parsed-AST *shape* they're
//! expected to produce and consume.

pub mod arena;
pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod id;
pub mod loc;
pub mod resolved;
pub mod types;

pub use arena::{Decl, DeclArena, FunctionDeclData, ParamDeclData, VarDeclData};
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use error::{ErrorKind, OperandSide, SemaError};
pub use id::DeclId;
pub use loc::SourceLocation;
pub use resolved::{BinaryOp, ResolvedBlock, ResolvedExpr, ResolvedExprKind, ResolvedStmt, UnaryOp};
pub use types::Type;
