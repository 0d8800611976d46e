//! The declaration arena.
//!
//! Back-references from resolved reference expressions to the declarations
//! they bind are represented as an arena of declarations plus stable
//! integer handles ([`crate::id::DeclId`]), rather than shared ownership
//! with weak back-references. An arena gives stable handles, trivial
//! serialization, and no possibility of a reference cycle -- the arena is
//! the only owner.
//!
//! The allocation pattern (`next_id` implicit in `Vec` length, one `alloc`
//! entry point) is a monotonically growing id-indexed store, the same
//! shape as any arena-of-nodes-plus-integer-handles design.

use serde::{Deserialize, Serialize};

use crate::id::DeclId;
use crate::loc::SourceLocation;
use crate::resolved::{ResolvedBlock, ResolvedExpr};
use crate::types::Type;

/// A top-level function declaration. `body` is `None` until the two-phase
/// resolver has finished resolving every function signature: the shell
/// with a signature and no body is what makes a later-declared function
/// visible to an earlier one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclData {
    pub location: SourceLocation,
    pub identifier: String,
    pub return_type: Type,
    pub params: Vec<DeclId>,
    pub body: Option<ResolvedBlock>,
}

/// A function parameter. Parameters are always immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDeclData {
    pub location: SourceLocation,
    pub identifier: String,
    pub ty: Type,
}

/// A local variable, `let` (immutable) or `var` (mutable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDeclData {
    pub location: SourceLocation,
    pub identifier: String,
    pub ty: Type,
    pub is_mutable: bool,
    pub initializer: Option<ResolvedExpr>,
}

/// One declaration living in the arena. A closed sum of the three kinds of
/// thing a `DeclId` can point to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decl {
    Function(FunctionDeclData),
    Param(ParamDeclData),
    Var(VarDeclData),
}

impl Decl {
    pub fn identifier(&self) -> &str {
        match self {
            Decl::Function(f) => &f.identifier,
            Decl::Param(p) => &p.identifier,
            Decl::Var(v) => &v.identifier,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Decl::Function(f) => &f.location,
            Decl::Param(p) => &p.location,
            Decl::Var(v) => &v.location,
        }
    }

    pub fn ty(&self) -> &Type {
        match self {
            Decl::Function(f) => &f.return_type,
            Decl::Param(p) => &p.ty,
            Decl::Var(v) => &v.ty,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDeclData> {
        match self {
            Decl::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&VarDeclData> {
        match self {
            Decl::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_mutable_variable(&self) -> bool {
        matches!(self, Decl::Var(v) if v.is_mutable)
    }
}

/// The sole owner of every resolved declaration. The resolved forest is
/// rooted at an ordered list of top-level `DeclId`s (the functions, built-in
/// `println` first); everything else -- params, locals -- is reachable only
/// by following `DeclId`s stored in the tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclArena {
    decls: Vec<Decl>,
}

impl DeclArena {
    pub fn new() -> Self {
        DeclArena::default()
    }

    pub fn alloc(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_returns_increasing_ids() {
        let mut arena = DeclArena::new();
        let a = arena.alloc(Decl::Param(ParamDeclData {
            location: SourceLocation::builtin(),
            identifier: "a".into(),
            ty: Type::Number,
        }));
        let b = arena.alloc(Decl::Param(ParamDeclData {
            location: SourceLocation::builtin(),
            identifier: "b".into(),
            ty: Type::Number,
        }));
        assert_eq!(a.0, 0);
        assert_eq!(b.0, 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn get_returns_allocated_decl() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Decl::Var(VarDeclData {
            location: SourceLocation::builtin(),
            identifier: "x".into(),
            ty: Type::Number,
            is_mutable: false,
            initializer: None,
        }));
        assert_eq!(arena.get(id).identifier(), "x");
        assert!(!arena.get(id).is_mutable_variable());
    }
}
