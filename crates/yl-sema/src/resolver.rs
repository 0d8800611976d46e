//! The resolver: turns a parsed AST into the resolved AST, node by node.
//!
//! Runs in two phases, driven by [`crate::sema::Sema`]: first every
//! top-level function's *signature* is resolved and inserted into the
//! global scope (so forward references between functions work), then every
//! function's *body* is resolved against the now-complete global scope. A
//! single [`Resolver`] instance carries the scope stack, the arena every
//! resolved node is allocated into, and the identity of the function
//! currently being resolved (needed to validate `return` statements).

use yl_core::ast::{ParsedBlock, ParsedDeclRef, ParsedExpr, ParsedFunctionDecl, ParsedParamDecl, ParsedStmt, ParsedVarDecl};
use yl_core::resolved::{BinaryOp, ResolvedBlock, ResolvedExpr, ResolvedExprKind, ResolvedStmt, UnaryOp};
use yl_core::{
    Decl, DeclArena, DeclId, DiagnosticSink, FunctionDeclData, OperandSide, ParamDeclData, SemaError, SourceLocation, Type,
    VarDeclData,
};

use crate::cee;
use crate::scope::ScopeStack;

pub struct Resolver {
    pub arena: DeclArena,
    scopes: ScopeStack,
    current_function: Option<DeclId>,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            arena: DeclArena::new(),
            scopes: ScopeStack::new(),
            current_function: None,
        }
    }

    /// Unrecognized (`Custom`) parsed types never resolve; everything else
    /// passes through unchanged.
    fn resolve_type(&self, ty: &Type) -> Option<Type> {
        if ty.is_resolvable() {
            Some(ty.clone())
        } else {
            None
        }
    }

    pub fn resolve_unary_operator(
        &mut self,
        sink: &mut DiagnosticSink,
        op: UnaryOp,
        location: &SourceLocation,
        rhs: &ParsedExpr,
    ) -> Option<ResolvedExpr> {
        let resolved_rhs = self.resolve_expr(sink, rhs)?;

        if matches!(resolved_rhs.ty, Type::Void) {
            return sink.report_error(SemaError::VoidUnaryOperand {
                location: resolved_rhs.location.clone(),
            });
        }

        let ty = resolved_rhs.ty.clone();
        Some(ResolvedExpr::new(
            location.clone(),
            ty,
            ResolvedExprKind::Unary {
                op,
                rhs: Box::new(resolved_rhs),
            },
        ))
    }

    pub fn resolve_binary_operator(
        &mut self,
        sink: &mut DiagnosticSink,
        op: BinaryOp,
        location: &SourceLocation,
        lhs: &ParsedExpr,
        rhs: &ParsedExpr,
    ) -> Option<ResolvedExpr> {
        let resolved_lhs = self.resolve_expr(sink, lhs)?;
        let resolved_rhs = self.resolve_expr(sink, rhs)?;

        if matches!(resolved_lhs.ty, Type::Void) {
            return sink.report_error(SemaError::VoidBinaryOperand {
                location: resolved_lhs.location.clone(),
                side: OperandSide::Lhs,
            });
        }
        if matches!(resolved_rhs.ty, Type::Void) {
            return sink.report_error(SemaError::VoidBinaryOperand {
                location: resolved_rhs.location.clone(),
                side: OperandSide::Rhs,
            });
        }

        Some(ResolvedExpr::new(
            location.clone(),
            Type::Number,
            ResolvedExprKind::Binary {
                op,
                lhs: Box::new(resolved_lhs),
                rhs: Box::new(resolved_rhs),
            },
        ))
    }

    pub fn resolve_grouping_expr(
        &mut self,
        sink: &mut DiagnosticSink,
        location: &SourceLocation,
        inner: &ParsedExpr,
    ) -> Option<ResolvedExpr> {
        let resolved = self.resolve_expr(sink, inner)?;
        let ty = resolved.ty.clone();
        Some(ResolvedExpr::new(
            location.clone(),
            ty,
            ResolvedExprKind::Grouping(Box::new(resolved)),
        ))
    }

    fn resolve_decl_ref_expr(
        &mut self,
        sink: &mut DiagnosticSink,
        decl_ref: &ParsedDeclRef,
        in_call: bool,
    ) -> Option<(DeclId, Type)> {
        let Some((id, _depth)) = self.scopes.lookup(&decl_ref.identifier) else {
            return sink.report_error(SemaError::UnresolvedSymbol {
                location: decl_ref.location.clone(),
                identifier: decl_ref.identifier.clone(),
            });
        };

        let decl = self.arena.get(id);
        if !in_call && matches!(decl, Decl::Function(_)) {
            return sink.report_error(SemaError::FunctionAsValue {
                location: decl_ref.location.clone(),
                identifier: decl_ref.identifier.clone(),
            });
        }

        Some((id, decl.ty().clone()))
    }

    pub fn resolve_call_expr(
        &mut self,
        sink: &mut DiagnosticSink,
        location: &SourceLocation,
        callee: &ParsedDeclRef,
        args: &[ParsedExpr],
    ) -> Option<ResolvedExpr> {
        let (callee_id, _callee_ty) = self.resolve_decl_ref_expr(sink, callee, true)?;

        let Decl::Function(function) = self.arena.get(callee_id) else {
            return sink.report_error(SemaError::CallingNonFunction {
                location: location.clone(),
            });
        };
        let return_type = function.return_type.clone();
        let param_types: Vec<Type> = function
            .params
            .iter()
            .map(|id| self.arena.get(*id).ty().clone())
            .collect();

        if args.len() != param_types.len() {
            return sink.report_error(SemaError::ArgMismatch {
                location: location.clone(),
                expected: param_types.len(),
                actual: args.len(),
            });
        }

        let mut resolved_args = Vec::with_capacity(args.len());
        for (idx, (arg, expected_ty)) in args.iter().zip(param_types.iter()).enumerate() {
            let mut resolved_arg = self.resolve_expr(sink, arg)?;
            if &resolved_arg.ty != expected_ty {
                return sink.report_error(SemaError::ArgTypeMismatch {
                    location: resolved_arg.location.clone(),
                    param_index: idx,
                });
            }
            let constant_value = cee::evaluate(&resolved_arg, false, &self.arena);
            resolved_arg = resolved_arg.with_constant_value(constant_value);
            resolved_args.push(resolved_arg);
        }

        Some(ResolvedExpr::new(
            location.clone(),
            return_type,
            ResolvedExprKind::Call {
                callee: callee_id,
                args: resolved_args,
            },
        ))
    }

    pub fn resolve_expr(&mut self, sink: &mut DiagnosticSink, expr: &ParsedExpr) -> Option<ResolvedExpr> {
        match expr {
            ParsedExpr::NumberLiteral { location, value } => {
                let parsed = value.parse::<f64>().expect("lexer guarantees a valid number lexeme");
                Some(ResolvedExpr::new(location.clone(), Type::Number, ResolvedExprKind::NumberLiteral(parsed)).with_constant_value(Some(parsed)))
            }
            ParsedExpr::StringLiteral { .. } => {
                // String literals exist only as `println` argument sugar.
                // Every other position that can hold one (a var-decl
                // initializer) intercepts it before calling into here, so
                // this arm is never actually reached.
                unreachable!("string literals are not a valid standalone expression")
            }
            ParsedExpr::DeclRef(decl_ref) => {
                let (id, ty) = self.resolve_decl_ref_expr(sink, decl_ref, false)?;
                Some(ResolvedExpr::new(decl_ref.location.clone(), ty, ResolvedExprKind::DeclRef(id)))
            }
            ParsedExpr::Call { location, callee, args } => self.resolve_call_expr(sink, location, callee, args),
            ParsedExpr::Grouping { location, inner } => self.resolve_grouping_expr(sink, location, inner),
            ParsedExpr::Binary { location, op, lhs, rhs } => self.resolve_binary_operator(sink, *op, location, lhs, rhs),
            ParsedExpr::Unary { location, op, rhs } => self.resolve_unary_operator(sink, *op, location, rhs),
        }
    }

    pub fn resolve_if_stmt(
        &mut self,
        sink: &mut DiagnosticSink,
        location: &SourceLocation,
        condition: &ParsedExpr,
        then_block: &ParsedBlock,
        else_block: &Option<ParsedBlock>,
    ) -> Option<ResolvedStmt> {
        let mut resolved_condition = self.resolve_expr(sink, condition)?;
        if !matches!(resolved_condition.ty, Type::Number) {
            return sink.report_error(SemaError::NonNumberCondition {
                location: resolved_condition.location.clone(),
            });
        }

        let resolved_then = self.resolve_block(sink, then_block)?;
        let resolved_else = match else_block {
            Some(block) => Some(self.resolve_block(sink, block)?),
            None => None,
        };

        let constant_value = cee::evaluate(&resolved_condition, false, &self.arena);
        resolved_condition = resolved_condition.with_constant_value(constant_value);

        Some(ResolvedStmt::If {
            location: location.clone(),
            condition: resolved_condition,
            then_block: resolved_then,
            else_block: resolved_else,
        })
    }

    pub fn resolve_while_stmt(
        &mut self,
        sink: &mut DiagnosticSink,
        location: &SourceLocation,
        condition: &ParsedExpr,
        body: &ParsedBlock,
    ) -> Option<ResolvedStmt> {
        let mut resolved_condition = self.resolve_expr(sink, condition)?;
        if !matches!(resolved_condition.ty, Type::Number) {
            return sink.report_error(SemaError::NonNumberCondition {
                location: resolved_condition.location.clone(),
            });
        }

        let resolved_body = self.resolve_block(sink, body)?;

        let constant_value = cee::evaluate(&resolved_condition, false, &self.arena);
        resolved_condition = resolved_condition.with_constant_value(constant_value);

        Some(ResolvedStmt::While {
            location: location.clone(),
            condition: resolved_condition,
            body: resolved_body,
        })
    }

    pub fn resolve_decl_stmt(
        &mut self,
        sink: &mut DiagnosticSink,
        location: &SourceLocation,
        var_decl: &ParsedVarDecl,
    ) -> Option<ResolvedStmt> {
        let id = self.resolve_var_decl(sink, var_decl)?;
        if !self.insert_decl_to_current_scope(sink, var_decl.location.clone(), &var_decl.identifier, id) {
            return None;
        }
        Some(ResolvedStmt::Decl {
            location: location.clone(),
            var: id,
        })
    }

    pub fn resolve_assignment(
        &mut self,
        sink: &mut DiagnosticSink,
        location: &SourceLocation,
        variable: &ParsedDeclRef,
        expr: &ParsedExpr,
    ) -> Option<ResolvedStmt> {
        let (lhs_id, lhs_ty) = self.resolve_decl_ref_expr(sink, variable, false)?;

        if matches!(self.arena.get(lhs_id), Decl::Param(_)) {
            return sink.report_error(SemaError::AssignToParam {
                location: variable.location.clone(),
            });
        }

        let mut resolved_rhs = self.resolve_expr(sink, expr)?;
        if resolved_rhs.ty != lhs_ty {
            return sink.report_error(SemaError::AssignTypeMismatch {
                location: resolved_rhs.location.clone(),
            });
        }

        let constant_value = cee::evaluate(&resolved_rhs, false, &self.arena);
        resolved_rhs = resolved_rhs.with_constant_value(constant_value);

        Some(ResolvedStmt::Assignment {
            location: location.clone(),
            variable: lhs_id,
            expr: resolved_rhs,
        })
    }

    pub fn resolve_return_stmt(
        &mut self,
        sink: &mut DiagnosticSink,
        location: &SourceLocation,
        expr: &Option<ParsedExpr>,
    ) -> Option<ResolvedStmt> {
        let current_function = self
            .current_function
            .expect("return statement resolved outside a function body");
        let return_type = self
            .arena
            .get(current_function)
            .as_function()
            .expect("current_function always names a Decl::Function")
            .return_type
            .clone();

        if matches!(return_type, Type::Void) && expr.is_some() {
            return sink.report_error(SemaError::UnexpectedReturnValue {
                location: location.clone(),
            });
        }
        if !matches!(return_type, Type::Void) && expr.is_none() {
            return sink.report_error(SemaError::MissingReturnValue {
                location: location.clone(),
            });
        }

        let resolved_expr = match expr {
            Some(expr) => {
                let mut resolved = self.resolve_expr(sink, expr)?;
                if resolved.ty != return_type {
                    return sink.report_error(SemaError::ReturnTypeMismatch {
                        location: resolved.location.clone(),
                    });
                }
                let constant_value = cee::evaluate(&resolved, false, &self.arena);
                resolved = resolved.with_constant_value(constant_value);
                Some(resolved)
            }
            None => None,
        };

        Some(ResolvedStmt::Return {
            location: location.clone(),
            expr: resolved_expr,
        })
    }

    pub fn resolve_stmt(&mut self, sink: &mut DiagnosticSink, stmt: &ParsedStmt) -> Option<ResolvedStmt> {
        match stmt {
            ParsedStmt::Expr(expr) => Some(ResolvedStmt::Expr(self.resolve_expr(sink, expr)?)),
            ParsedStmt::If {
                location,
                condition,
                then_block,
                else_block,
            } => self.resolve_if_stmt(sink, location, condition, then_block, else_block),
            ParsedStmt::Assignment { location, variable, expr } => {
                self.resolve_assignment(sink, location, variable, expr)
            }
            ParsedStmt::Decl { location, var_decl } => self.resolve_decl_stmt(sink, location, var_decl),
            ParsedStmt::While { location, condition, body } => self.resolve_while_stmt(sink, location, condition, body),
            ParsedStmt::Return { location, expr } => self.resolve_return_stmt(sink, location, expr),
        }
    }

    /// Resolves a `{ ... }` block in a fresh scope. Warns (does not error)
    /// on exactly the first statement that directly follows a `return`.
    ///
    /// Opens and closes the scope around [`Self::resolve_block_body`] rather
    /// than holding a guard across the loop -- see the [`crate::scope`]
    /// module docs for why.
    pub fn resolve_block(&mut self, sink: &mut DiagnosticSink, block: &ParsedBlock) -> Option<ResolvedBlock> {
        self.scopes.push();
        let result = self.resolve_block_body(sink, block);
        self.scopes.pop();
        result
    }

    /// Resolves every statement in `block` even after an earlier one fails,
    /// so a block with multiple independent errors surfaces all of them in
    /// one pass instead of stopping at the first. Only the final `Option`
    /// reflects whether any statement failed.
    fn resolve_block_body(&mut self, sink: &mut DiagnosticSink, block: &ParsedBlock) -> Option<ResolvedBlock> {
        let mut resolved_statements = Vec::with_capacity(block.statements.len());
        let mut report_unreachable_count = 0u32;
        let mut error = false;

        for stmt in &block.statements {
            match self.resolve_stmt(sink, stmt) {
                Some(resolved) => resolved_statements.push(resolved),
                None => error = true,
            }

            if report_unreachable_count == 1 {
                sink.report_warning(stmt.location().clone(), "unreachable statement");
                report_unreachable_count += 1;
            }

            if stmt.is_return() {
                report_unreachable_count += 1;
            }
        }

        if error {
            None
        } else {
            Some(ResolvedBlock::new(resolved_statements))
        }
    }

    pub fn resolve_param_decl(&mut self, sink: &mut DiagnosticSink, param: &ParsedParamDecl) -> Option<DeclId> {
        let ty = self.resolve_type(&param.ty);
        let ty = match ty {
            Some(ty) if !matches!(ty, Type::Void) => ty,
            _ => {
                return sink.report_error(SemaError::InvalidParamType {
                    location: param.location.clone(),
                    identifier: param.identifier.clone(),
                    type_name: param.ty.name().to_string(),
                });
            }
        };

        Some(self.arena.alloc(Decl::Param(ParamDeclData {
            location: param.location.clone(),
            identifier: param.identifier.clone(),
            ty,
        })))
    }

    pub fn resolve_var_decl(&mut self, sink: &mut DiagnosticSink, var_decl: &ParsedVarDecl) -> Option<DeclId> {
        if var_decl.ty.is_none() && var_decl.initializer.is_none() {
            return sink.report_error(SemaError::MissingTypeAndInitializer {
                location: var_decl.location.clone(),
                identifier: var_decl.identifier.clone(),
            });
        }

        let resolved_initializer = match &var_decl.initializer {
            // A string literal is never a valid initializer -- it has no
            // resolved type to unify with the variable's. Caught here,
            // before `resolve_expr`, which only ever sees a string literal
            // as `println` call-argument sugar.
            Some(ParsedExpr::StringLiteral { location, .. }) => {
                return sink.report_error(SemaError::InitializerTypeMismatch {
                    location: location.clone(),
                });
            }
            Some(init) => Some(self.resolve_expr(sink, init)?),
            None => None,
        };

        let resolvable_type = var_decl
            .ty
            .clone()
            .unwrap_or_else(|| resolved_initializer.as_ref().unwrap().ty.clone());
        let ty = self.resolve_type(&resolvable_type);
        let ty = match ty {
            Some(ty) if !matches!(ty, Type::Void) => ty,
            _ => {
                return sink.report_error(SemaError::InvalidVariableType {
                    location: var_decl.location.clone(),
                    identifier: var_decl.identifier.clone(),
                    type_name: resolvable_type.name().to_string(),
                });
            }
        };

        let resolved_initializer = match resolved_initializer {
            Some(mut init) => {
                if init.ty != ty {
                    return sink.report_error(SemaError::InitializerTypeMismatch {
                        location: init.location.clone(),
                    });
                }
                let constant_value = cee::evaluate(&init, false, &self.arena);
                init = init.with_constant_value(constant_value);
                Some(init)
            }
            None => None,
        };

        Some(self.arena.alloc(Decl::Var(VarDeclData {
            location: var_decl.location.clone(),
            identifier: var_decl.identifier.clone(),
            ty,
            is_mutable: var_decl.is_mutable,
            initializer: resolved_initializer,
        })))
    }

    /// Phase 1: resolves a function's signature only (return type + params)
    /// and allocates its `Decl::Function` shell with `body: None`. Called
    /// for every top-level function before any body is resolved, so a
    /// function can call one declared later in the source.
    pub fn resolve_function_signature(
        &mut self,
        sink: &mut DiagnosticSink,
        function: &ParsedFunctionDecl,
    ) -> Option<DeclId> {
        self.scopes.push();
        let result = self.resolve_function_signature_body(sink, function);
        self.scopes.pop();
        result
    }

    fn resolve_function_signature_body(
        &mut self,
        sink: &mut DiagnosticSink,
        function: &ParsedFunctionDecl,
    ) -> Option<DeclId> {
        let return_type = match self.resolve_type(&function.return_type) {
            Some(ty) => ty,
            None => {
                return sink.report_error(SemaError::InvalidFunctionType {
                    location: function.location.clone(),
                    identifier: function.identifier.clone(),
                    type_name: function.return_type.name().to_string(),
                });
            }
        };

        if function.identifier == "main" {
            if !matches!(return_type, Type::Void) {
                return sink.report_error(SemaError::MainMustReturnVoid {
                    location: function.location.clone(),
                });
            }
            if !function.params.is_empty() {
                return sink.report_error(SemaError::MainMustTakeNoArgs {
                    location: function.location.clone(),
                });
            }
        }

        let mut params = Vec::with_capacity(function.params.len());
        for param in &function.params {
            let id = self.resolve_param_decl(sink, param)?;
            if !self.insert_decl_to_current_scope(sink, param.location.clone(), &param.identifier, id) {
                return None;
            }
            params.push(id);
        }

        // The caller pops the param scope right after this returns; the
        // body is resolved later in its own fresh scope with the same
        // params re-inserted, matching the two-phase protocol in `Sema`.
        Some(self.arena.alloc(Decl::Function(FunctionDeclData {
            location: function.location.clone(),
            identifier: function.identifier.clone(),
            return_type,
            params,
            body: None,
        })))
    }

    /// Phase 2: resolves one function's body against the now-complete
    /// global scope, re-inserting its already-resolved params into a fresh
    /// scope first.
    pub fn resolve_function_body(
        &mut self,
        sink: &mut DiagnosticSink,
        function_id: DeclId,
        parsed_body: &ParsedBlock,
    ) -> bool {
        self.scopes.push();
        let result = self.resolve_function_body_scoped(sink, function_id, parsed_body);
        self.scopes.pop();
        result
    }

    fn resolve_function_body_scoped(
        &mut self,
        sink: &mut DiagnosticSink,
        function_id: DeclId,
        parsed_body: &ParsedBlock,
    ) -> bool {
        self.current_function = Some(function_id);

        let params = self
            .arena
            .get(function_id)
            .as_function()
            .expect("function_id always names a Decl::Function")
            .params
            .clone();
        for param_id in &params {
            let identifier = self.arena.get(*param_id).identifier().to_string();
            let location = self.arena.get(*param_id).location().clone();
            self.insert_decl_to_current_scope(sink, location, &identifier, *param_id);
        }

        let Some(resolved_body) = self.resolve_block(sink, parsed_body) else {
            self.current_function = None;
            return false;
        };

        if let Decl::Function(f) = self.arena.get_mut(function_id) {
            f.body = Some(resolved_body);
        }
        self.current_function = None;
        true
    }

    /// The builtin `println(n: number) -> void`, inserted into the global
    /// scope before any user function so a user declaration literally named
    /// `println` is caught as a redeclaration rather than silently shadowing
    /// it.
    pub fn install_builtin_println(&mut self, sink: &mut DiagnosticSink) -> DeclId {
        let location = SourceLocation::builtin();
        let param = self.arena.alloc(Decl::Param(ParamDeclData {
            location: location.clone(),
            identifier: "n".to_string(),
            ty: Type::Number,
        }));
        let id = self.arena.alloc(Decl::Function(FunctionDeclData {
            location: location.clone(),
            identifier: "println".to_string(),
            return_type: Type::Void,
            params: vec![param],
            body: Some(ResolvedBlock::new(vec![])),
        }));
        self.insert_decl_to_current_scope(sink, location, "println", id);
        id
    }

    /// Opens the outermost scope `println` and every top-level function are
    /// inserted into.
    pub fn open_global_scope(&mut self) {
        self.scopes.push();
    }

    pub fn close_global_scope(&mut self) {
        self.scopes.pop();
    }

    /// Inserts `id` into the innermost open scope. Fails (and reports) only
    /// when `identifier` already exists **in that same scope**; shadowing an
    /// outer scope's declaration is allowed silently.
    pub fn insert_decl_to_current_scope(
        &mut self,
        sink: &mut DiagnosticSink,
        location: SourceLocation,
        identifier: &str,
        id: DeclId,
    ) -> bool {
        if self.scopes.insert_current(identifier, id) {
            true
        } else {
            sink.report_error::<()>(SemaError::Redeclaration {
                location,
                identifier: identifier.to_string(),
            });
            false
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yl_core::ast::builders::*;

    fn resolver_with_global_scope() -> Resolver {
        let mut resolver = Resolver::new();
        resolver.open_global_scope();
        resolver
    }

    #[test]
    fn missing_type_and_initializer_is_an_error() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let var_decl = match let_decl(1, "x", None, None) {
            ParsedStmt::Decl { var_decl, .. } => var_decl,
            _ => unreachable!(),
        };
        let result = resolver.resolve_var_decl(&mut sink, &var_decl);
        assert!(result.is_none());
        assert!(sink.diagnostics()[0].message.contains('x'));
    }

    #[test]
    fn initializer_type_is_inferred_when_no_type_is_given() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let var_decl = match let_decl(1, "x", None, Some(number(1, "1.0"))) {
            ParsedStmt::Decl { var_decl, .. } => var_decl,
            _ => unreachable!(),
        };
        let id = resolver.resolve_var_decl(&mut sink, &var_decl).expect("resolves cleanly");
        assert!(!sink.has_errors());
        assert_eq!(*resolver.arena.get(id).ty(), Type::Number);
    }

    #[test]
    fn a_string_literal_initializer_is_a_type_mismatch() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let var_decl = match let_decl(1, "x", Some(Type::Number), Some(string(1, "s"))) {
            ParsedStmt::Decl { var_decl, .. } => var_decl,
            _ => unreachable!(),
        };
        let result = resolver.resolve_var_decl(&mut sink, &var_decl);
        assert!(result.is_none());
        assert_eq!(
            sink.diagnostics()[0].message,
            SemaError::InitializerTypeMismatch { location: loc(1, 1) }.to_string()
        );
    }

    #[test]
    fn redeclaration_in_the_same_scope_is_rejected() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let id = resolver.arena.alloc(Decl::Var(VarDeclData {
            location: loc(1, 1),
            identifier: "x".into(),
            ty: Type::Number,
            is_mutable: false,
            initializer: None,
        }));
        assert!(resolver.insert_decl_to_current_scope(&mut sink, loc(1, 1), "x", id));
        assert!(!resolver.insert_decl_to_current_scope(&mut sink, loc(2, 1), "x", id));
        assert!(sink.has_errors());
    }

    #[test]
    fn calling_a_function_with_the_wrong_argument_count_is_rejected() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let function = function(1, "f", Type::Void, vec![param(1, "n", Type::Number)], block(1, vec![]));
        let id = resolver.resolve_function_signature(&mut sink, &function).expect("resolves");
        assert!(resolver.insert_decl_to_current_scope(&mut sink, loc(1, 1), "f", id));

        let resolved = resolver.resolve_call_expr(&mut sink, &loc(2, 1), &ParsedDeclRef { location: loc(2, 1), identifier: "f".into() }, &[]);
        assert!(resolved.is_none());
        assert!(sink.has_errors());
    }

    #[test]
    fn referencing_a_function_without_calling_it_is_rejected() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        resolver.install_builtin_println(&mut sink);
        assert!(!sink.has_errors());

        let result = resolver.resolve_expr(&mut sink, &decl_ref(1, "println"));
        assert!(result.is_none());
        assert!(sink.has_errors());
    }

    #[test]
    fn a_user_function_literally_named_println_is_a_redeclaration() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        resolver.install_builtin_println(&mut sink);

        let function = function(1, "println", Type::Void, vec![param(1, "n", Type::Number)], block(1, vec![]));
        let id = resolver.resolve_function_signature(&mut sink, &function).expect("signature resolves");
        assert!(!resolver.insert_decl_to_current_scope(&mut sink, loc(1, 1), "println", id));
        assert!(sink.has_errors());
    }

    #[test]
    fn assigning_to_a_parameter_is_rejected() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let id = resolver.arena.alloc(Decl::Param(ParamDeclData {
            location: loc(1, 1),
            identifier: "p".into(),
            ty: Type::Number,
        }));
        assert!(resolver.insert_decl_to_current_scope(&mut sink, loc(1, 1), "p", id));

        let result = resolver.resolve_assignment(
            &mut sink,
            &loc(2, 1),
            &ParsedDeclRef { location: loc(2, 1), identifier: "p".into() },
            &number(2, "1.0"),
        );
        assert!(result.is_none());
        assert!(sink.has_errors());
    }

    #[test]
    fn a_void_operand_is_rejected_in_a_binary_expression() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let void_fn = function(1, "f", Type::Void, vec![], block(1, vec![]));
        let id = resolver.resolve_function_signature(&mut sink, &void_fn).expect("resolves");
        assert!(resolver.insert_decl_to_current_scope(&mut sink, loc(1, 1), "f", id));

        let result = resolver.resolve_binary_operator(
            &mut sink,
            BinaryOp::Add,
            &loc(2, 1),
            &call(2, "f", vec![]),
            &number(2, "1.0"),
        );
        assert!(result.is_none());
        assert!(sink.has_errors());
    }

    #[test]
    fn a_non_number_condition_is_rejected_in_an_if_statement() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let void_fn = function(1, "f", Type::Void, vec![], block(1, vec![]));
        let id = resolver.resolve_function_signature(&mut sink, &void_fn).expect("resolves");
        assert!(resolver.insert_decl_to_current_scope(&mut sink, loc(1, 1), "f", id));

        let result = resolver.resolve_if_stmt(&mut sink, &loc(2, 1), &call(2, "f", vec![]), &block(2, vec![]), &None);
        assert!(result.is_none());
        assert!(sink.has_errors());
    }

    #[test]
    fn main_must_return_void() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let main_fn = function(1, "main", Type::Number, vec![], block(1, vec![return_stmt(1, Some(number(1, "0.0")))]));
        let result = resolver.resolve_function_signature(&mut sink, &main_fn);
        assert!(result.is_none());
        assert!(sink.has_errors());
    }

    #[test]
    fn main_must_take_no_parameters() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let main_fn = function(1, "main", Type::Void, vec![param(1, "argc", Type::Number)], block(1, vec![]));
        let result = resolver.resolve_function_signature(&mut sink, &main_fn);
        assert!(result.is_none());
        assert!(sink.has_errors());
    }

    #[test]
    fn an_unreachable_statement_is_a_warning_only_once() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let body = block(
            1,
            vec![
                return_stmt(1, None),
                ParsedStmt::Expr(number(2, "1.0")),
                ParsedStmt::Expr(number(3, "2.0")),
            ],
        );
        let resolved = resolver.resolve_block(&mut sink, &body);
        assert!(resolved.is_some());
        let warnings = sink.diagnostics().iter().filter(|d| d.is_warning).count();
        assert_eq!(warnings, 1);
    }

    #[test]
    fn every_failing_statement_in_a_block_is_resolved_and_reported() {
        // Two sibling statements, each independently unresolvable -- both
        // must surface their own diagnostic, not just the first.
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let body = block(
            1,
            vec![
                ParsedStmt::Expr(call(1, "missing1", vec![])),
                ParsedStmt::Expr(call(2, "missing2", vec![])),
            ],
        );
        let resolved = resolver.resolve_block(&mut sink, &body);
        assert!(resolved.is_none());
        let errors: Vec<_> = sink.diagnostics().iter().filter(|d| !d.is_warning).collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("missing1"));
        assert!(errors[1].message.contains("missing2"));
    }

    #[test]
    fn a_scope_closed_by_resolve_block_does_not_leak_its_declarations() {
        let mut resolver = resolver_with_global_scope();
        let mut sink = DiagnosticSink::new();
        let body = block(1, vec![let_decl(1, "x", None, Some(number(1, "1.0")))]);
        resolver.resolve_block(&mut sink, &body).expect("resolves");

        let result = resolver.resolve_expr(&mut sink, &decl_ref(2, "x"));
        assert!(result.is_none());
        assert!(sink.has_errors());
    }
}
