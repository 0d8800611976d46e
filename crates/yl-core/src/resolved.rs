//! The resolved AST -- Sema's output.
//!
//! Every resolved expression carries a concrete [`Type`] plus an optional
//! constant value attached opportunistically by the constant expression
//! evaluator. Every resolved reference to a declaration holds a [`DeclId`]
//! handle into a [`crate::arena::DeclArena`] rather than a pointer or
//! `Rc`/`Weak` pair -- the arena is the sole owner, references only borrow
//! by index, so there is no possibility of an ownership cycle.

use serde::{Deserialize, Serialize};

use crate::id::DeclId;
use crate::loc::SourceLocation;
use crate::types::Type;

/// A fully resolved, type-checked expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedExpr {
    pub location: SourceLocation,
    pub ty: Type,
    /// Attached by the constant expression evaluator when the expression's
    /// value is known at compile time. `None` does not mean "not constant",
    /// only "not proven constant by this evaluator".
    pub constant_value: Option<f64>,
    pub kind: ResolvedExprKind,
}

impl ResolvedExpr {
    pub fn new(location: SourceLocation, ty: Type, kind: ResolvedExprKind) -> Self {
        ResolvedExpr {
            location,
            ty,
            constant_value: None,
            kind,
        }
    }

    pub fn with_constant_value(mut self, value: Option<f64>) -> Self {
        self.constant_value = value;
        self
    }
}

/// The shape of a resolved expression. A closed sum, matched exhaustively
/// everywhere it is consumed rather than modeled as a class hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolvedExprKind {
    NumberLiteral(f64),
    /// A non-owning reference to a declaration living in the arena.
    DeclRef(DeclId),
    Call {
        callee: DeclId,
        args: Vec<ResolvedExpr>,
    },
    Grouping(Box<ResolvedExpr>),
    Binary {
        op: BinaryOp,
        lhs: Box<ResolvedExpr>,
        rhs: Box<ResolvedExpr>,
    },
    Unary {
        op: UnaryOp,
        rhs: Box<ResolvedExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A fully resolved statement. Like expressions, a closed sum matched
/// exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolvedStmt {
    Expr(ResolvedExpr),
    If {
        location: SourceLocation,
        condition: ResolvedExpr,
        then_block: ResolvedBlock,
        else_block: Option<ResolvedBlock>,
    },
    While {
        location: SourceLocation,
        condition: ResolvedExpr,
        body: ResolvedBlock,
    },
    Return {
        location: SourceLocation,
        expr: Option<ResolvedExpr>,
    },
    /// Declares the variable identified by `DeclId`; the declaration's own
    /// data (type, mutability, initializer) lives in the arena entry.
    Decl {
        location: SourceLocation,
        var: DeclId,
    },
    Assignment {
        location: SourceLocation,
        variable: DeclId,
        expr: ResolvedExpr,
    },
}

impl ResolvedStmt {
    pub fn location(&self) -> &SourceLocation {
        match self {
            ResolvedStmt::Expr(e) => &e.location,
            ResolvedStmt::If { location, .. }
            | ResolvedStmt::While { location, .. }
            | ResolvedStmt::Return { location, .. }
            | ResolvedStmt::Decl { location, .. }
            | ResolvedStmt::Assignment { location, .. } => location,
        }
    }
}

/// A resolved `{ ... }` block: an ordered sequence of statements plus the
/// scope they were resolved in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedBlock {
    pub statements: Vec<ResolvedStmt>,
}

impl ResolvedBlock {
    pub fn new(statements: Vec<ResolvedStmt>) -> Self {
        ResolvedBlock { statements }
    }
}
