//! AST-to-AST rewrite passes.
//!
//! OverpassQL has no `if` statement, no loop-exit primitive and no nested
//! call arguments, so everything the backend cannot print is rewritten here
//! into the shapes it can: plain assignments, `for`-each over a named set,
//! and flat calls. A single-step rewriter is applied until it reports no
//! change; every rule strictly reduces the number of rewritable constructs,
//! so the fixpoint is reached in a linear number of passes.
//!
//! Conditional execution leans on an OverpassQL trick: a `foreach` over an
//! empty set runs zero times, and over a singleton exactly once. Relation
//! `2186646` is used as an arbitrary existing singleton to drive that.

mod exits;

use crate::ast::scan::{contains_break, contains_continue};
use crate::ast::{Expr, Number, Stmt, UnaryOp};
use crate::names::{NameGen, COND_SLOT};

/// An arbitrary existing OSM relation, used as a dummy non-empty set.
pub const PLACEHOLDER_RELATION: i64 = 2186646;

/// Safety cap; real inputs converge long before this.
const MAX_FIXPOINT_PASSES: usize = 1000;

/// Rewrite `body` until only backend-printable statements remain.
pub fn desugar(body: Vec<Stmt>, names: &mut NameGen) -> Vec<Stmt> {
    let mut body = body;
    for pass in 0..MAX_FIXPOINT_PASSES {
        let (next, changed) = rewrite_stmts(body, names);
        body = next;
        log::debug!("desugar pass {pass}: changed={changed}");
        if !changed {
            return body;
        }
    }
    log::warn!("desugar did not converge after {MAX_FIXPOINT_PASSES} passes");
    body
}

/// Apply the single-step rewriter to each statement of a list.
pub fn rewrite_stmts(body: Vec<Stmt>, names: &mut NameGen) -> (Vec<Stmt>, bool) {
    let mut out = Vec::with_capacity(body.len());
    let mut changed = false;
    for stmt in body {
        changed |= rewrite_stmt(stmt, &mut out, names);
    }
    (out, changed)
}

/// Rewrite one statement, appending its replacement(s) to `out`. Returns
/// whether anything changed.
fn rewrite_stmt(stmt: Stmt, out: &mut Vec<Stmt>, names: &mut NameGen) -> bool {
    match stmt {
        Stmt::If { test, body, orelse } => {
            lower_if(test, body, orelse, out, names);
            true
        }

        Stmt::For {
            target,
            iter,
            body,
            orelse,
        } => {
            if contains_break(&body) {
                exits::lower_break(target, iter, body, orelse, out, names);
                true
            } else if contains_continue(&body) {
                exits::lower_continue(target, iter, body, orelse, out, names);
                true
            } else if !matches!(iter, Expr::Name(_)) {
                // Hoist a computed iterator into a named set.
                let slot = names.fresh("for");
                out.push(assign(&slot, iter));
                out.push(Stmt::For {
                    target,
                    iter: Expr::Name(slot),
                    body,
                    orelse,
                });
                true
            } else {
                let (body, changed) = rewrite_stmts(body, names);
                out.push(Stmt::For {
                    target,
                    iter,
                    body,
                    orelse,
                });
                changed
            }
        }

        Stmt::Assign {
            target,
            value:
                Expr::Call {
                    func,
                    args,
                    keywords,
                },
        } if needs_arg_hoist(&args) => {
            let args = hoist_args(args, out, names);
            out.push(Stmt::Assign {
                target,
                value: Expr::Call {
                    func,
                    args,
                    keywords,
                },
            });
            true
        }

        Stmt::Expr {
            value:
                Expr::Call {
                    func,
                    args,
                    keywords,
                },
        } if needs_arg_hoist(&args) => {
            let args = hoist_args(args, out, names);
            out.push(Stmt::Expr {
                value: Expr::Call {
                    func,
                    args,
                    keywords,
                },
            });
            true
        }

        other => {
            out.push(other);
            false
        }
    }
}

// ---------------------------------------------------------------------------
// If lowering
// ---------------------------------------------------------------------------

/// Lower an `if` statement to a conditional set and a zero-or-one loop.
///
/// ```text
/// if test: body            →  tmpifNr = Relation(2186646)
/// else: orelse                tmpifN = tmpifNr if test else Set()
///                             for tmp_ in tmpifN: body
///                             tmpifN = tmpifNr if not (test) else Set()
///                             for tmp_ in tmpifN: orelse
/// ```
///
/// The last two statements are emitted only for a non-empty `orelse`.
fn lower_if(
    test: Expr,
    body: Vec<Stmt>,
    orelse: Vec<Stmt>,
    out: &mut Vec<Stmt>,
    names: &mut NameGen,
) {
    let flag = names.fresh("if");
    let holder = format!("{flag}r");
    let else_test = (!orelse.is_empty()).then(|| test.clone());

    out.push(assign(&holder, placeholder_relation()));
    out.push(assign(
        &flag,
        Expr::IfExp {
            test: Box::new(test),
            body: Box::new(name(&holder)),
            orelse: Box::new(empty_set()),
        },
    ));
    out.push(cond_loop(&flag, body));

    if let Some(test) = else_test {
        out.push(assign(
            &flag,
            Expr::IfExp {
                test: Box::new(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(test),
                }),
                body: Box::new(name(&holder)),
                orelse: Box::new(empty_set()),
            },
        ));
        out.push(cond_loop(&flag, orelse));
    }
}

fn cond_loop(flag: &str, body: Vec<Stmt>) -> Stmt {
    Stmt::For {
        target: COND_SLOT.to_string(),
        iter: name(flag),
        body,
        orelse: vec![],
    }
}

// ---------------------------------------------------------------------------
// Call-argument hoisting
// ---------------------------------------------------------------------------

/// Does this argument list need flattening before emission?
///
/// Only the first positional argument matters: the backend inlines names,
/// numeric literals and marker calls (`Around`, `Regex`, …), and the check
/// recurses through the latter.
fn needs_arg_hoist(args: &[Expr]) -> bool {
    match args.first() {
        None | Some(Expr::Name(_)) | Some(Expr::Num(_)) => false,
        Some(Expr::Call { args, .. }) => needs_arg_hoist(args),
        Some(_) => true,
    }
}

/// Replace a complex first argument with a fresh name, emitting the hoisted
/// assignment, and recurse through nested calls.
fn hoist_args(mut args: Vec<Expr>, out: &mut Vec<Stmt>, names: &mut NameGen) -> Vec<Expr> {
    if let Some(first) = args.first_mut() {
        match first {
            Expr::Name(_) | Expr::Num(_) => {}
            Expr::Call { args: inner, .. } => {
                let taken = std::mem::take(inner);
                *inner = hoist_args(taken, out, names);
            }
            other => {
                let slot = names.fresh("call");
                let value = std::mem::replace(other, Expr::Name(slot.clone()));
                out.push(Stmt::Assign {
                    target: slot,
                    value,
                });
            }
        }
    }
    args
}

// ---------------------------------------------------------------------------
// Shared constructors
// ---------------------------------------------------------------------------

pub(crate) fn name(id: &str) -> Expr {
    Expr::Name(id.to_string())
}

pub(crate) fn assign(target: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        target: target.to_string(),
        value,
    }
}

/// `Relation(2186646)` — the dummy singleton.
pub(crate) fn placeholder_relation() -> Expr {
    Expr::Call {
        func: Box::new(name("Relation")),
        args: vec![Expr::Num(Number::Int(PLACEHOLDER_RELATION))],
        keywords: vec![],
    }
}

/// `Set()` — the empty set.
pub(crate) fn empty_set() -> Expr {
    Expr::Call {
        func: Box::new(name("Set")),
        args: vec![],
        keywords: vec![],
    }
}
