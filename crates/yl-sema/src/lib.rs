//! Sema: the YL semantic-analysis pass.
//!
//! Consumes the parsed AST produced by the (out-of-scope) parser and
//! produces a resolved AST in a [`yl_core::DeclArena`], or a set of
//! diagnostics explaining why it couldn't. See [`sema::Sema`] for the
//! entry point.

mod cee;
mod cfg;
mod flow;
mod resolver;
mod scope;
mod sema;

pub use resolver::Resolver;
pub use sema::Sema;
