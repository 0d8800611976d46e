//! The constant expression evaluator (CEE).
//!
//! Pure, side-effect-free folder over resolved expressions. Invoked
//! opportunistically by the resolver after resolving each expression, so
//! that a value known at compile time is attached to
//! [`ResolvedExpr::constant_value`] for the CFG builder's edge-reachability
//! analysis to consume later. Never reports diagnostics -- failure to fold
//! is `None`, not an error.

use yl_core::resolved::{BinaryOp, UnaryOp};
use yl_core::{Decl, DeclArena, ResolvedExpr, ResolvedExprKind};

/// Attempts to evaluate `expr` to a constant `f64`.
///
/// `allow_side_effects` is threaded through unused by every current caller
/// (the resolver always passes `false`) but is preserved in the signature
/// because a future extension (e.g. folding through a call to a pure
/// built-in) would need to distinguish "may evaluate side-effecting
/// subexpressions" from "must be side-effect free".
pub fn evaluate(expr: &ResolvedExpr, allow_side_effects: bool, arena: &DeclArena) -> Option<f64> {
    match &expr.kind {
        ResolvedExprKind::NumberLiteral(value) => Some(*value),

        ResolvedExprKind::Grouping(inner) => evaluate(inner, allow_side_effects, arena),

        ResolvedExprKind::Unary { op, rhs } => {
            let rhs = evaluate(rhs, allow_side_effects, arena)?;
            Some(match op {
                UnaryOp::Neg => -rhs,
                UnaryOp::Not => {
                    if rhs == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
            })
        }

        ResolvedExprKind::Binary { op, lhs, rhs } => {
            evaluate_binary(*op, lhs, rhs, allow_side_effects, arena)
        }

        ResolvedExprKind::DeclRef(id) => {
            let Decl::Var(var) = arena.get(*id) else {
                return None;
            };
            if var.is_mutable {
                return None;
            }
            var.initializer.as_ref()?.constant_value
        }

        ResolvedExprKind::Call { .. } => None,
    }
}

fn evaluate_binary(
    op: BinaryOp,
    lhs: &ResolvedExpr,
    rhs: &ResolvedExpr,
    allow_side_effects: bool,
    arena: &DeclArena,
) -> Option<f64> {
    let lhs_value = evaluate(lhs, allow_side_effects, arena);

    // Short-circuit: the result is determined by the LHS alone once it's
    // known and "sufficient" -- 0.0 makes `&&` false, any non-zero makes
    // `||` true -- even if the RHS can't be folded.
    if let Some(l) = lhs_value {
        match op {
            BinaryOp::And if l == 0.0 => return Some(0.0),
            BinaryOp::Or if l != 0.0 => return Some(1.0),
            _ => {}
        }
    }

    let l = lhs_value?;
    let r = evaluate(rhs, allow_side_effects, arena)?;

    Some(match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
        BinaryOp::Lt => bool_to_f64(l < r),
        BinaryOp::Gt => bool_to_f64(l > r),
        BinaryOp::Eq => bool_to_f64(l == r),
        BinaryOp::Ne => bool_to_f64(l != r),
        BinaryOp::And => bool_to_f64(l != 0.0 && r != 0.0),
        BinaryOp::Or => bool_to_f64(l != 0.0 || r != 0.0),
    })
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
