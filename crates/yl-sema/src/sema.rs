//! The Sema driver: turns a parsed translation unit into a resolved one.
//!
//! Runs the [`crate::resolver::Resolver`] in the two phases described there,
//! then runs the flow-sensitive checks ([`crate::flow`]) over every
//! successfully resolved body. Mirrors the reference implementation's
//! `Sema::resolveAST` exactly, including its all-or-nothing result: any
//! error anywhere in the translation unit means the whole thing resolves to
//! nothing, even if most of it was fine.

use yl_core::ast::ParsedFunctionDecl;
use yl_core::{Decl, DeclArena, DeclId, Diagnostic, DiagnosticSink};

use crate::cfg::CfgBuilder;
use crate::flow;
use crate::resolver::Resolver;

/// Runs Sema over a whole translation unit (every top-level function in
/// source order) and collects the result.
pub struct Sema {
    resolver: Resolver,
    sink: DiagnosticSink,
}

impl Sema {
    pub fn new() -> Self {
        Sema {
            resolver: Resolver::new(),
            sink: DiagnosticSink::new(),
        }
    }

    /// Resolves every function in `functions`. Returns the arena and the
    /// ordered list of resolved top-level declarations (`println` first) on
    /// success, or `None` if any diagnostic was an error -- matching
    /// `resolveAST`'s `if (error) return {};`.
    pub fn resolve_ast(mut self, functions: &[ParsedFunctionDecl]) -> (Option<(DeclArena, Vec<DeclId>)>, Vec<Diagnostic>) {
        self.resolver.open_global_scope();

        let mut resolved_tree = Vec::with_capacity(functions.len() + 1);
        let println_id = self.resolver.install_builtin_println(&mut self.sink);
        resolved_tree.push(println_id);

        let mut error = self.sink.has_errors();

        for function in functions {
            let signature = self.resolver.resolve_function_signature(&mut self.sink, function);
            let inserted = match signature {
                Some(id) => self
                    .resolver
                    .insert_decl_to_current_scope(&mut self.sink, function.location.clone(), &function.identifier, id)
                    .then_some(id),
                None => None,
            };
            match inserted {
                Some(id) => resolved_tree.push(id),
                None => error = true,
            }
        }

        if !error {
            for (function, &id) in functions.iter().zip(resolved_tree.iter().skip(1)) {
                if !self.resolver.resolve_function_body(&mut self.sink, id, &function.body) {
                    error = true;
                    continue;
                }
                error |= self.run_flow_sensitive_checks(id);
            }
        }

        self.resolver.close_global_scope();

        if error || self.sink.has_errors() {
            (None, self.sink.diagnostics().to_vec())
        } else {
            (Some((self.resolver.arena, resolved_tree)), self.sink.diagnostics().to_vec())
        }
    }

    /// Builds the CFG for `function_id`'s now-resolved body and runs both
    /// flow-sensitive checks over it, recording any failures into the sink.
    fn run_flow_sensitive_checks(&mut self, function_id: DeclId) -> bool {
        let Decl::Function(function) = self.resolver.arena.get(function_id) else {
            unreachable!("function_id always names a Decl::Function");
        };
        let body = function.body.as_ref().expect("body resolved just before this call");
        let return_type = function.return_type.clone();
        let location = function.location.clone();

        let cfg = CfgBuilder::new().build(body);
        let mut error = false;

        if let Some(err) = flow::check_return_on_all_paths(&cfg, &return_type, &location) {
            self.sink.report_error::<()>(err);
            error = true;
        }

        let init_errors = flow::check_variable_initialization(&cfg, &self.resolver.arena);
        if !init_errors.is_empty() {
            error = true;
            for err in init_errors {
                self.sink.report_error::<()>(err);
            }
        }

        error
    }
}

impl Default for Sema {
    fn default() -> Self {
        Sema::new()
    }
}
