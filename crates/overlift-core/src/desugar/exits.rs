//! `break` / `continue` lowering.
//!
//! OverpassQL cannot leave a `foreach` early. The replacement is a *flag
//! set*: non-empty while the loop is live, emptied to simulate the exit.
//! Every statement of the loop body is wrapped in a one-element `for` over
//! the flag, so once the flag is emptied the remaining statements run zero
//! times. Emptying is done by `Way.filter(flag)` — filtering a relation
//! singleton for ways yields the empty set.
//!
//! For `break` the flag is created once, before the loop; for `continue`
//! it is re-created at the top of every iteration.

use crate::ast::{Expr, Stmt};
use crate::names::{GATE_SLOT, NameGen};

use super::{assign, name, placeholder_relation};

#[derive(Clone, Copy, PartialEq)]
enum Exit {
    Break,
    Continue,
}

/// Lower a loop whose body contains a `break`.
pub(super) fn lower_break(
    target: String,
    iter: Expr,
    body: Vec<Stmt>,
    orelse: Vec<Stmt>,
    out: &mut Vec<Stmt>,
    names: &mut NameGen,
) {
    let flag = names.fresh("break");
    out.push(assign(&flag, placeholder_relation()));

    let else_flag = (!orelse.is_empty()).then(|| format!("{flag}else"));
    if let Some(else_flag) = &else_flag {
        out.push(assign(else_flag, placeholder_relation()));
    }

    out.push(Stmt::For {
        target,
        iter,
        body: gate_body(body, &flag, Exit::Break),
        orelse: vec![],
    });

    if let Some(else_flag) = else_flag {
        // Two dependent gate loops consume the else clause: the first runs
        // off the loop flag and empties the else flag, the second runs the
        // clause off whatever is left in the else flag.
        out.push(gate(&flag, extinguish(&else_flag)));
        out.push(Stmt::For {
            target: GATE_SLOT.to_string(),
            iter: name(&else_flag),
            body: orelse,
            orelse: vec![],
        });
    }
}

/// Lower a loop whose body contains a `continue`.
pub(super) fn lower_continue(
    target: String,
    iter: Expr,
    body: Vec<Stmt>,
    orelse: Vec<Stmt>,
    out: &mut Vec<Stmt>,
    names: &mut NameGen,
) {
    let flag = names.fresh("continue");
    let mut new_body = vec![assign(&flag, placeholder_relation())];
    new_body.extend(gate_body(body, &flag, Exit::Continue));
    out.push(Stmt::For {
        target,
        iter,
        body: new_body,
        orelse,
    });
}

/// Wrap every statement in a flag gate, rewriting the matching exit
/// statement into a flag extinguish. `if` statements share the enclosing
/// loop, so both of their branches are rewritten with the same flag.
fn gate_body(body: Vec<Stmt>, flag: &str, mode: Exit) -> Vec<Stmt> {
    body.into_iter()
        .map(|stmt| {
            let inner = match stmt {
                Stmt::Break if mode == Exit::Break => extinguish(flag),
                Stmt::Continue if mode == Exit::Continue => extinguish(flag),
                Stmt::If { test, body, orelse } => Stmt::If {
                    test,
                    body: gate_body(body, flag, mode),
                    orelse: gate_body(orelse, flag, mode),
                },
                other => other,
            };
            gate(flag, inner)
        })
        .collect()
}

/// `for _ in flag: stmt` — runs `stmt` only while the flag is live.
fn gate(flag: &str, stmt: Stmt) -> Stmt {
    Stmt::For {
        target: GATE_SLOT.to_string(),
        iter: name(flag),
        body: vec![stmt],
        orelse: vec![],
    }
}

/// `flag = Way.filter(flag)` — empties the relation-singleton flag.
fn extinguish(flag: &str) -> Stmt {
    assign(
        flag,
        Expr::Call {
            func: Box::new(Expr::Attribute {
                value: Box::new(name("Way")),
                attr: "filter".to_string(),
            }),
            args: vec![name(flag)],
            keywords: vec![],
        },
    )
}
