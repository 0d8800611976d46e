//! Flow-sensitive checks that run over a function body's [`Cfg`] once it's
//! been built: return-on-all-paths, and a four-point-lattice dataflow
//! analysis that catches both uninitialized reads and illegal mutation of
//! immutable variables in one pass.

use std::collections::{HashMap, HashSet};

use yl_core::{Decl, DeclArena, DeclId, SemaError, SourceLocation, Type};

use crate::cfg::{Cfg, FlowNode};

/// Walks `cfg` from `entry` along reachable edges. A non-void function must
/// either never reach a block whose tail statement is a `return` without
/// also being able to reach `exit`, or it must return on every path.
///
/// Mirrors the reference implementation's worklist exactly: a block counts
/// as "returning" only if its tail statement (stored first, since blocks
/// are kept in reverse execution order) is a `Return`; everything else
/// keeps walking successors.
pub fn check_return_on_all_paths(
    cfg: &Cfg,
    return_type: &Type,
    fn_location: &SourceLocation,
) -> Option<SemaError> {
    if matches!(return_type, Type::Void) {
        return None;
    }

    let mut return_count = 0usize;
    let mut exit_reached = false;
    let mut visited = HashSet::new();
    let mut worklist = vec![cfg.entry];

    while let Some(bb) = worklist.pop() {
        if !visited.insert(bb) {
            continue;
        }

        if bb == cfg.exit {
            exit_reached = true;
        }

        let stmts = cfg.statements(bb);
        if !stmts.is_empty() && matches!(stmts[0], FlowNode::Return(_)) {
            return_count += 1;
            continue;
        }

        for (succ, reachable) in cfg.successors(bb) {
            if reachable {
                worklist.push(succ);
            }
        }
    }

    if exit_reached || return_count == 0 {
        if return_count > 0 {
            Some(SemaError::NonReturningSomePaths {
                location: fn_location.clone(),
            })
        } else {
            Some(SemaError::NonReturning {
                location: fn_location.clone(),
            })
        }
    } else {
        None
    }
}

/// One point in the four-point lattice tracked per variable, per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Not yet observed along any predecessor path.
    Bottom,
    Unassigned,
    Assigned,
    /// Assigned on some incoming paths, unassigned (or absent) on others.
    Top,
}

fn join(a: State, b: State) -> State {
    match (a, b) {
        (a, b) if a == b => a,
        (State::Bottom, other) | (other, State::Bottom) => other,
        _ => State::Top,
    }
}

type Lattice = HashMap<DeclId, State>;

/// Runs a fixpoint dataflow pass:
/// forward, per-block lattices joined from predecessors, blocks visited in
/// descending index order (`entry` down to `exit`). Reports exactly the
/// errors still pending once the lattice stops changing -- intermediate
/// iterations' diagnostics are always discarded, since a variable flagged
/// "uninitialized" in an early, not-yet-converged iteration may turn out
/// assigned once a back edge's contribution is folded in.
pub fn check_variable_initialization(cfg: &Cfg, arena: &DeclArena) -> Vec<SemaError> {
    let mut cur_lattices: Vec<Lattice> = vec![Lattice::new(); cfg.len()];
    let mut pending_errors: Vec<SemaError> = Vec::new();

    let mut changed = true;
    while changed {
        changed = false;
        pending_errors.clear();

        let mut bb = cfg.entry;
        loop {
            let mut tmp = Lattice::new();
            for (pred, _reachable) in cfg.predecessors(bb) {
                for (&decl, &state) in &cur_lattices[pred] {
                    let entry = tmp.entry(decl).or_insert(State::Bottom);
                    *entry = join(*entry, state);
                }
            }

            for node in cfg.statements(bb) {
                match node {
                    FlowNode::DeclStmt(_, var) => {
                        let has_initializer = matches!(
                            arena.get(*var),
                            Decl::Var(v) if v.initializer.is_some()
                        );
                        tmp.insert(
                            *var,
                            if has_initializer {
                                State::Assigned
                            } else {
                                State::Unassigned
                            },
                        );
                    }
                    FlowNode::Assignment(stmt, var) => {
                        if let Decl::Var(v) = arena.get(*var) {
                            let state = *tmp.get(var).unwrap_or(&State::Bottom);
                            if !v.is_mutable && state != State::Unassigned {
                                pending_errors.push(SemaError::ImmutableMutation {
                                    location: stmt.location().clone(),
                                    identifier: v.identifier.clone(),
                                });
                            }
                        }
                        tmp.insert(*var, State::Assigned);
                    }
                    FlowNode::DeclRef(expr, var) => {
                        if let Decl::Var(v) = arena.get(*var) {
                            let state = *tmp.get(var).unwrap_or(&State::Bottom);
                            if state != State::Assigned {
                                pending_errors.push(SemaError::UninitializedUse {
                                    location: expr.location.clone(),
                                    identifier: v.identifier.clone(),
                                });
                            }
                        }
                    }
                    FlowNode::Return(_) => {}
                }
            }

            if cur_lattices[bb] != tmp {
                cur_lattices[bb] = tmp;
                changed = true;
            }

            if bb == cfg.exit {
                break;
            }
            bb -= 1;
        }
    }

    pending_errors
}
