//! The control-flow graph builder.
//!
//! Lowers a resolved function body into a directed graph of basic blocks.
//! Each block holds its dataflow-relevant nodes in reverse execution order
//! (tail first); edges carry a `reachable` flag so that a statically-folded
//! branch condition can mark its non-taken side as dead before the
//! flow-sensitive checker ever runs a worklist over it.
//!
//! Block numbering is descending: `entry` is the highest index, `exit` is
//! index `0`, matching the iteration direction
//! (`for bb = entry down to exit`) the reference implementation's
//! return-path and initialization checkers use. Internally this is backed
//! by a `petgraph::graph::DiGraph` rather than a hand-rolled adjacency list.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use yl_core::id::DeclId;
use yl_core::resolved::{ResolvedBlock, ResolvedExpr, ResolvedExprKind, ResolvedStmt};

/// One dataflow-relevant occurrence inside a basic block.
///
/// The reference compiler's CFG stores raw `Stmt*` pointers and relies on
/// `Expr` being a subclass of `Stmt`, so every sub-expression -- not just
/// top-level statements -- can appear in a block's statement list and be
/// inspected by the flow-sensitive checker. Rust has no such shared base
/// between `ResolvedStmt` and `ResolvedExpr`, so `FlowNode` is the
/// flattened, explicit equivalent: a declaration, an assignment, a return,
/// or a single variable read reached while walking an expression.
#[derive(Debug, Clone, Copy)]
pub enum FlowNode<'a> {
    /// A `let`/`var` declaration statement, naming the variable declared.
    DeclStmt(&'a ResolvedStmt, DeclId),
    /// An assignment statement, naming the assigned variable.
    Assignment(&'a ResolvedStmt, DeclId),
    /// A single variable read reached while flattening an expression.
    DeclRef(&'a ResolvedExpr, DeclId),
    /// A return statement (with or without a value).
    Return(&'a ResolvedStmt),
}

struct StagingBlock<'a> {
    /// Built in forward (execution) order, reversed once finalized.
    nodes: Vec<FlowNode<'a>>,
}

/// Builds a [`Cfg`] from a resolved function body.
#[derive(Default)]
pub struct CfgBuilder<'a> {
    blocks: Vec<StagingBlock<'a>>,
    edges: Vec<(usize, usize, bool)>,
    exit_temp: usize,
}

impl<'a> CfgBuilder<'a> {
    pub fn new() -> Self {
        CfgBuilder::default()
    }

    pub fn build(mut self, body: &'a ResolvedBlock) -> Cfg<'a> {
        let exit_temp = self.alloc_block();
        let entry_temp = self.alloc_block();
        self.exit_temp = exit_temp;

        let tail = self.process_statements(&body.statements, entry_temp);
        if let Some(tail) = tail {
            self.add_edge(tail, exit_temp, true);
        }

        self.finalize(entry_temp, exit_temp)
    }

    fn alloc_block(&mut self) -> usize {
        self.blocks.push(StagingBlock { nodes: Vec::new() });
        self.blocks.len() - 1
    }

    fn add_edge(&mut self, from: usize, to: usize, reachable: bool) {
        self.edges.push((from, to, reachable));
    }

    /// Processes a statement list starting at `current`. Returns the block
    /// subsequent sibling statements should be appended to if control can
    /// fall through past this list, or `None` if every path through it
    /// terminates in a `return`.
    fn process_statements(&mut self, statements: &'a [ResolvedStmt], mut current: usize) -> Option<usize> {
        let mut live = true;

        for stmt in statements {
            if !live {
                // Unreachable: still gets a block (contract: every block is
                // reachable from entry or is dead), just no predecessor.
                current = self.alloc_block();
            }

            match stmt {
                ResolvedStmt::Decl { var, .. } => {
                    self.blocks[current].nodes.push(FlowNode::DeclStmt(stmt, *var));
                }
                ResolvedStmt::Assignment { variable, expr, .. } => {
                    self.flatten_expr(expr, current);
                    self.blocks[current]
                        .nodes
                        .push(FlowNode::Assignment(stmt, *variable));
                }
                ResolvedStmt::Expr(expr) => {
                    self.flatten_expr(expr, current);
                }
                ResolvedStmt::Return { expr, .. } => {
                    if let Some(expr) = expr {
                        self.flatten_expr(expr, current);
                    }
                    self.blocks[current].nodes.push(FlowNode::Return(stmt));
                    self.add_edge(current, self.exit_temp, true);
                    live = false;
                }
                ResolvedStmt::If {
                    condition,
                    then_block,
                    else_block,
                    ..
                } => {
                    self.flatten_expr(condition, current);
                    let (then_reachable, else_reachable) = branch_reachability(condition);

                    let then_start = self.alloc_block();
                    let else_start = self.alloc_block();
                    self.add_edge(current, then_start, then_reachable);
                    self.add_edge(current, else_start, else_reachable);

                    let then_open = self.process_statements(&then_block.statements, then_start);
                    let else_open = match else_block {
                        Some(else_block) => self.process_statements(&else_block.statements, else_start),
                        None => Some(else_start),
                    };

                    match (then_open, else_open) {
                        (None, None) => {
                            live = false;
                            current = self.alloc_block();
                        }
                        (Some(a), None) => current = a,
                        (None, Some(b)) => current = b,
                        (Some(a), Some(b)) => {
                            let join = self.alloc_block();
                            self.add_edge(a, join, true);
                            self.add_edge(b, join, true);
                            current = join;
                        }
                    }
                }
                ResolvedStmt::While { condition, body, .. } => {
                    let cond_block = self.alloc_block();
                    self.add_edge(current, cond_block, true);
                    self.flatten_expr(condition, cond_block);
                    let (body_reachable, after_reachable) = branch_reachability(condition);

                    let body_start = self.alloc_block();
                    let after_loop = self.alloc_block();
                    self.add_edge(cond_block, body_start, body_reachable);
                    self.add_edge(cond_block, after_loop, after_reachable);

                    if let Some(tail) = self.process_statements(&body.statements, body_start) {
                        self.add_edge(tail, cond_block, true);
                    }

                    current = after_loop;
                    live = after_reachable;
                }
            }
        }

        if live {
            Some(current)
        } else {
            None
        }
    }

    fn flatten_expr(&mut self, expr: &'a ResolvedExpr, block: usize) {
        match &expr.kind {
            ResolvedExprKind::NumberLiteral(_) => {}
            ResolvedExprKind::DeclRef(id) => {
                self.blocks[block].nodes.push(FlowNode::DeclRef(expr, *id));
            }
            ResolvedExprKind::Call { args, .. } => {
                for arg in args {
                    self.flatten_expr(arg, block);
                }
            }
            ResolvedExprKind::Grouping(inner) => self.flatten_expr(inner, block),
            ResolvedExprKind::Binary { lhs, rhs, .. } => {
                self.flatten_expr(lhs, block);
                self.flatten_expr(rhs, block);
            }
            ResolvedExprKind::Unary { rhs, .. } => self.flatten_expr(rhs, block),
        }
    }

    fn finalize(self, entry_temp: usize, exit_temp: usize) -> Cfg<'a> {
        let n = self.blocks.len();
        // Final numbering: exit = 0, entry = n - 1, everything else packed
        // into the remaining slots in original (temp) order.
        let mut final_of = vec![0usize; n];
        let mut next = 1;
        for temp in 0..n {
            if temp == exit_temp {
                final_of[temp] = 0;
            } else if temp == entry_temp {
                final_of[temp] = n - 1;
            } else {
                final_of[temp] = next;
                next += 1;
            }
        }

        let mut ordered: Vec<Option<StagingBlock<'a>>> = self.blocks.into_iter().map(Some).collect();
        let mut graph = DiGraph::<Vec<FlowNode<'a>>, bool>::with_capacity(n, self.edges.len());
        let mut by_final: Vec<Option<usize>> = vec![None; n];
        for temp in 0..n {
            by_final[final_of[temp]] = Some(temp);
        }
        for final_id in 0..n {
            let temp = by_final[final_id].expect("every final slot is populated");
            let mut nodes = ordered[temp].take().unwrap().nodes;
            nodes.reverse();
            let idx = graph.add_node(nodes);
            debug_assert_eq!(idx.index(), final_id);
        }

        for (from, to, reachable) in self.edges {
            graph.add_edge(
                NodeIndex::new(final_of[from]),
                NodeIndex::new(final_of[to]),
                reachable,
            );
        }

        Cfg {
            graph,
            entry: final_of[entry_temp],
            exit: final_of[exit_temp],
        }
    }
}

/// Given a branch condition, determines which side is statically reachable.
/// `None` (not foldable) means both sides are reachable -- nothing proven.
fn branch_reachability(condition: &ResolvedExpr) -> (bool, bool) {
    match condition.constant_value {
        Some(value) if value != 0.0 => (true, false),
        Some(_) => (false, true),
        None => (true, true),
    }
}

/// The control-flow graph for one function body.
pub struct Cfg<'a> {
    graph: DiGraph<Vec<FlowNode<'a>>, bool>,
    pub entry: usize,
    pub exit: usize,
}

impl<'a> Cfg<'a> {
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn statements(&self, bb: usize) -> &[FlowNode<'a>] {
        &self.graph[NodeIndex::new(bb)]
    }

    pub fn predecessors(&self, bb: usize) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.graph
            .edges_directed(NodeIndex::new(bb), Direction::Incoming)
            .map(|e| (e.source().index(), *e.weight()))
    }

    pub fn successors(&self, bb: usize) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.graph
            .edges_directed(NodeIndex::new(bb), Direction::Outgoing)
            .map(|e| (e.target().index(), *e.weight()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yl_core::loc::SourceLocation;
    use yl_core::types::Type;

    fn loc() -> SourceLocation {
        SourceLocation::new("t.yl", 1, 1)
    }

    fn number(value: f64) -> ResolvedExpr {
        ResolvedExpr::new(loc(), Type::Number, ResolvedExprKind::NumberLiteral(value)).with_constant_value(Some(value))
    }

    fn unknown_cond() -> ResolvedExpr {
        ResolvedExpr::new(loc(), Type::Number, ResolvedExprKind::DeclRef(DeclId(0)))
    }

    fn ret(expr: Option<ResolvedExpr>) -> ResolvedStmt {
        ResolvedStmt::Return { location: loc(), expr }
    }

    #[test]
    fn single_block_body_has_entry_and_exit_only() {
        let body = ResolvedBlock::new(vec![ResolvedStmt::Expr(number(1.0))]);
        let cfg = CfgBuilder::new().build(&body);
        assert_eq!(cfg.len(), 2);
        assert_eq!(cfg.entry, 1);
        assert_eq!(cfg.exit, 0);
        let succ: Vec<_> = cfg.successors(cfg.entry).collect();
        assert_eq!(succ, vec![(cfg.exit, true)]);
    }

    #[test]
    fn unconditional_return_is_the_only_edge_to_exit() {
        let body = ResolvedBlock::new(vec![ret(Some(number(1.0)))]);
        let cfg = CfgBuilder::new().build(&body);
        let succ: Vec<_> = cfg.successors(cfg.entry).collect();
        assert_eq!(succ, vec![(cfg.exit, true)]);
        // The block's tail (stored first, reverse order) is the return.
        assert!(matches!(cfg.statements(cfg.entry)[0], FlowNode::Return(_)));
    }

    #[test]
    fn statements_after_return_land_in_an_orphan_block() {
        let body = ResolvedBlock::new(vec![ret(None), ResolvedStmt::Expr(number(1.0))]);
        let cfg = CfgBuilder::new().build(&body);
        // entry -> exit via the return; nothing falls off the end, so no
        // extra edge is added for the dead trailing statement's block.
        assert_eq!(cfg.predecessors(cfg.exit).count(), 1);
        // Some block in the graph has no predecessors and no return marker:
        // it's the orphaned trailing statement.
        let orphan = (0..cfg.len()).find(|&bb| bb != cfg.entry && cfg.predecessors(bb).count() == 0);
        assert!(orphan.is_some());
    }

    #[test]
    fn constant_false_condition_marks_then_branch_unreachable() {
        let then_block = ResolvedBlock::new(vec![ResolvedStmt::Expr(number(1.0))]);
        let body = ResolvedBlock::new(vec![ResolvedStmt::If {
            location: loc(),
            condition: number(0.0),
            then_block,
            else_block: None,
        }]);
        let cfg = CfgBuilder::new().build(&body);
        let succ: Vec<_> = cfg.successors(cfg.entry).collect();
        assert_eq!(succ.len(), 2);
        let reachable_count = succ.iter().filter(|(_, r)| *r).count();
        assert_eq!(reachable_count, 1, "exactly one branch should be marked reachable");
    }

    #[test]
    fn non_foldable_condition_keeps_both_branches_reachable() {
        let then_block = ResolvedBlock::new(vec![ResolvedStmt::Expr(number(1.0))]);
        let body = ResolvedBlock::new(vec![ResolvedStmt::If {
            location: loc(),
            condition: unknown_cond(),
            then_block,
            else_block: None,
        }]);
        let cfg = CfgBuilder::new().build(&body);
        let succ: Vec<_> = cfg.successors(cfg.entry).collect();
        assert!(succ.iter().all(|(_, reachable)| *reachable));
    }

    #[test]
    fn if_both_branches_return_blocks_fall_through() {
        let then_block = ResolvedBlock::new(vec![ret(Some(number(1.0)))]);
        let else_block = ResolvedBlock::new(vec![ret(Some(number(2.0)))]);
        let body = ResolvedBlock::new(vec![ResolvedStmt::If {
            location: loc(),
            condition: unknown_cond(),
            then_block,
            else_block: Some(else_block),
        }]);
        let cfg = CfgBuilder::new().build(&body);
        // Both branches return directly to exit; nothing falls off the end
        // of the function, so exit has exactly two predecessors.
        assert_eq!(cfg.predecessors(cfg.exit).count(), 2);
    }

    #[test]
    fn always_true_while_condition_makes_after_loop_dead() {
        let body_block = ResolvedBlock::new(vec![ResolvedStmt::Expr(number(1.0))]);
        let body = ResolvedBlock::new(vec![ResolvedStmt::While {
            location: loc(),
            condition: number(1.0),
            body: body_block,
        }]);
        let cfg = CfgBuilder::new().build(&body);
        // The function falls off the end only if `after_loop` is reachable;
        // an always-true condition makes it dead, so nothing reaches exit.
        assert_eq!(cfg.predecessors(cfg.exit).count(), 0);
    }

    #[test]
    fn while_loop_body_has_a_back_edge_to_the_condition_block() {
        let body_block = ResolvedBlock::new(vec![ResolvedStmt::Expr(number(1.0))]);
        let body = ResolvedBlock::new(vec![ResolvedStmt::While {
            location: loc(),
            condition: unknown_cond(),
            body: body_block,
        }]);
        let cfg = CfgBuilder::new().build(&body);
        // Condition block's predecessors: the pre-header and the loop body's
        // back edge.
        let cond_block = cfg.successors(cfg.entry).next().unwrap().0;
        assert_eq!(cfg.predecessors(cond_block).count(), 2);
    }
}
