//! The parsed AST -- Sema's input.
//!
//! Owned, recursive tree produced by the (external, out-of-scope) parser.
//! Every node carries a [`SourceLocation`]. Unlike the resolved tree, there
//! is no arena here: the parser hands Sema full ownership of a plain
//! recursive structure, and Sema consumes it node by node while building the
//! resolved tree in its own arena.

use serde::{Deserialize, Serialize};

use crate::loc::SourceLocation;
use crate::resolved::{BinaryOp, UnaryOp};
use crate::types::Type;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFunctionDecl {
    pub location: SourceLocation,
    pub identifier: String,
    pub return_type: Type,
    pub params: Vec<ParsedParamDecl>,
    pub body: ParsedBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedParamDecl {
    pub location: SourceLocation,
    pub identifier: String,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedVarDecl {
    pub location: SourceLocation,
    pub identifier: String,
    pub ty: Option<Type>,
    pub initializer: Option<ParsedExpr>,
    pub is_mutable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedBlock {
    pub location: SourceLocation,
    pub statements: Vec<ParsedStmt>,
}

/// A parsed statement. A closed sum, matched exhaustively by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParsedStmt {
    Expr(ParsedExpr),
    If {
        location: SourceLocation,
        condition: ParsedExpr,
        then_block: ParsedBlock,
        else_block: Option<ParsedBlock>,
    },
    While {
        location: SourceLocation,
        condition: ParsedExpr,
        body: ParsedBlock,
    },
    Return {
        location: SourceLocation,
        expr: Option<ParsedExpr>,
    },
    Decl {
        location: SourceLocation,
        var_decl: ParsedVarDecl,
    },
    Assignment {
        location: SourceLocation,
        variable: ParsedDeclRef,
        expr: ParsedExpr,
    },
}

impl ParsedStmt {
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParsedStmt::Expr(e) => e.location(),
            ParsedStmt::If { location, .. }
            | ParsedStmt::While { location, .. }
            | ParsedStmt::Return { location, .. }
            | ParsedStmt::Decl { location, .. }
            | ParsedStmt::Assignment { location, .. } => location,
        }
    }

    /// `true` for a `ReturnStmt`, used by block resolution to flag the first
    /// statement after it as unreachable.
    pub fn is_return(&self) -> bool {
        matches!(self, ParsedStmt::Return { .. })
    }
}

/// A bare declaration reference, as it appears on the LHS of an assignment
/// or as the callee of a call expression. Distinct from the general
/// `ParsedExpr::DeclRef` only in that the grammar positions guarantee it is
/// always a bare identifier, never a parenthesized or computed expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDeclRef {
    pub location: SourceLocation,
    pub identifier: String,
}

/// A parsed expression. A closed sum, matched exhaustively by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParsedExpr {
    NumberLiteral {
        location: SourceLocation,
        /// Raw lexeme, matching `[0-9]+\.[0-9]+`; parsed to `f64` by Sema.
        value: String,
    },
    StringLiteral {
        location: SourceLocation,
        value: String,
    },
    DeclRef(ParsedDeclRef),
    Call {
        location: SourceLocation,
        callee: ParsedDeclRef,
        args: Vec<ParsedExpr>,
    },
    Grouping {
        location: SourceLocation,
        inner: Box<ParsedExpr>,
    },
    Binary {
        location: SourceLocation,
        op: BinaryOp,
        lhs: Box<ParsedExpr>,
        rhs: Box<ParsedExpr>,
    },
    Unary {
        location: SourceLocation,
        op: UnaryOp,
        rhs: Box<ParsedExpr>,
    },
}

impl ParsedExpr {
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParsedExpr::NumberLiteral { location, .. }
            | ParsedExpr::StringLiteral { location, .. }
            | ParsedExpr::Call { location, .. }
            | ParsedExpr::Grouping { location, .. }
            | ParsedExpr::Binary { location, .. }
            | ParsedExpr::Unary { location, .. } => location,
            ParsedExpr::DeclRef(r) => &r.location,
        }
    }
}

/// Test-only builders for constructing parsed-AST fixtures without a lexer
/// or parser: Sema's input contract is the tree shape, not source text.
#[cfg(any(test, feature = "test-support"))]
pub mod builders {
    use super::*;

    pub fn loc(line: u32, column: u32) -> SourceLocation {
        SourceLocation::new("t.yl", line, column)
    }

    pub fn number(line: u32, value: &str) -> ParsedExpr {
        ParsedExpr::NumberLiteral {
            location: loc(line, 1),
            value: value.to_string(),
        }
    }

    pub fn string(line: u32, value: &str) -> ParsedExpr {
        ParsedExpr::StringLiteral {
            location: loc(line, 1),
            value: value.to_string(),
        }
    }

    pub fn decl_ref(line: u32, identifier: &str) -> ParsedExpr {
        ParsedExpr::DeclRef(ParsedDeclRef {
            location: loc(line, 1),
            identifier: identifier.to_string(),
        })
    }

    pub fn call(line: u32, identifier: &str, args: Vec<ParsedExpr>) -> ParsedExpr {
        ParsedExpr::Call {
            location: loc(line, 1),
            callee: ParsedDeclRef {
                location: loc(line, 1),
                identifier: identifier.to_string(),
            },
            args,
        }
    }

    pub fn block(line: u32, statements: Vec<ParsedStmt>) -> ParsedBlock {
        ParsedBlock {
            location: loc(line, 1),
            statements,
        }
    }

    pub fn let_decl(line: u32, identifier: &str, ty: Option<Type>, init: Option<ParsedExpr>) -> ParsedStmt {
        ParsedStmt::Decl {
            location: loc(line, 1),
            var_decl: ParsedVarDecl {
                location: loc(line, 1),
                identifier: identifier.to_string(),
                ty,
                initializer: init,
                is_mutable: false,
            },
        }
    }

    pub fn var_decl(line: u32, identifier: &str, ty: Option<Type>, init: Option<ParsedExpr>) -> ParsedStmt {
        ParsedStmt::Decl {
            location: loc(line, 1),
            var_decl: ParsedVarDecl {
                location: loc(line, 1),
                identifier: identifier.to_string(),
                ty,
                initializer: init,
                is_mutable: true,
            },
        }
    }

    pub fn assign(line: u32, identifier: &str, expr: ParsedExpr) -> ParsedStmt {
        ParsedStmt::Assignment {
            location: loc(line, 1),
            variable: ParsedDeclRef {
                location: loc(line, 1),
                identifier: identifier.to_string(),
            },
            expr,
        }
    }

    pub fn return_stmt(line: u32, expr: Option<ParsedExpr>) -> ParsedStmt {
        ParsedStmt::Return {
            location: loc(line, 1),
            expr,
        }
    }

    pub fn if_stmt(
        line: u32,
        condition: ParsedExpr,
        then_block: ParsedBlock,
        else_block: Option<ParsedBlock>,
    ) -> ParsedStmt {
        ParsedStmt::If {
            location: loc(line, 1),
            condition,
            then_block,
            else_block,
        }
    }

    pub fn while_stmt(line: u32, condition: ParsedExpr, body: ParsedBlock) -> ParsedStmt {
        ParsedStmt::While {
            location: loc(line, 1),
            condition,
            body,
        }
    }

    pub fn param(line: u32, identifier: &str, ty: Type) -> ParsedParamDecl {
        ParsedParamDecl {
            location: loc(line, 1),
            identifier: identifier.to_string(),
            ty,
        }
    }

    pub fn function(
        line: u32,
        identifier: &str,
        return_type: Type,
        params: Vec<ParsedParamDecl>,
        body: ParsedBlock,
    ) -> ParsedFunctionDecl {
        ParsedFunctionDecl {
            location: loc(line, 1),
            identifier: identifier.to_string(),
            return_type,
            params,
            body,
        }
    }
}
