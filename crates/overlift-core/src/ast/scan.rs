//! Shallow statement scans.
//!
//! Desugaring needs to know whether a loop body contains a `break` or a
//! `continue` *belonging to that loop*. The scan therefore descends into
//! both branches of an `if` (which shares the enclosing loop) but treats
//! every other statement — in particular nested `for` loops, which rebind
//! `break`/`continue` to themselves — as a single opaque node.

use super::Stmt;

/// Does `body` contain a statement matching `pred`, looking through `if`
/// branches but not into any other nested body?
pub fn scan(body: &[Stmt], pred: fn(&Stmt) -> bool) -> bool {
    body.iter().any(|stmt| {
        pred(stmt)
            || match stmt {
                Stmt::If { body, orelse, .. } => scan(body, pred) || scan(orelse, pred),
                _ => false,
            }
    })
}

/// Does `body` contain a `break` at this loop's level?
pub fn contains_break(body: &[Stmt]) -> bool {
    scan(body, |stmt| matches!(stmt, Stmt::Break))
}

/// Does `body` contain a `continue` at this loop's level?
pub fn contains_continue(body: &[Stmt]) -> bool {
    scan(body, |stmt| matches!(stmt, Stmt::Continue))
}
