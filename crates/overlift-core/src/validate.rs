//! Input-side identifier validation.
//!
//! Runs before desugaring, on the user's tree only. Two checks per
//! identifier the user can bind or reference:
//!
//! - well-formedness per Unicode XID (`_` allowed as a leading character);
//! - no use of the reserved `tmp` prefix, which desugaring owns.

use unicode_ident::{is_xid_continue, is_xid_start};

use crate::ast::{Expr, Keyword, Stmt};
use crate::error::CoreError;
use crate::names::TMP_PREFIX;

/// Check every identifier in `body`.
pub fn validate(body: &[Stmt]) -> Result<(), CoreError> {
    for stmt in body {
        validate_stmt(stmt)?;
    }
    Ok(())
}

fn validate_stmt(stmt: &Stmt) -> Result<(), CoreError> {
    match stmt {
        Stmt::Assign { target, value } => {
            check_ident(target)?;
            validate_expr(value)
        }
        Stmt::Expr { value } => validate_expr(value),
        Stmt::If { test, body, orelse } => {
            validate_expr(test)?;
            validate(body)?;
            validate(orelse)
        }
        Stmt::For {
            target,
            iter,
            body,
            orelse,
        } => {
            check_ident(target)?;
            validate_expr(iter)?;
            validate(body)?;
            validate(orelse)
        }
        Stmt::Break | Stmt::Continue => Ok(()),
    }
}

fn validate_expr(expr: &Expr) -> Result<(), CoreError> {
    match expr {
        Expr::Name(id) => check_ident(id),
        Expr::Attribute { value, .. } => validate_expr(value),
        Expr::Subscript { value, index } => {
            validate_expr(value)?;
            validate_expr(index)
        }
        Expr::Binary { left, right, .. }
        | Expr::Bool { left, right, .. }
        | Expr::Compare { left, right, .. } => {
            validate_expr(left)?;
            validate_expr(right)
        }
        Expr::Unary { operand, .. } => validate_expr(operand),
        Expr::IfExp { test, body, orelse } => {
            validate_expr(test)?;
            validate_expr(body)?;
            validate_expr(orelse)
        }
        Expr::Call {
            func,
            args,
            keywords,
        } => {
            validate_expr(func)?;
            for arg in args {
                validate_expr(arg)?;
            }
            for Keyword { value, .. } in keywords {
                validate_expr(value)?;
            }
            Ok(())
        }
        Expr::Num(_) | Expr::Str(_) | Expr::Constant(_) | Expr::Ellipsis => Ok(()),
    }
}

fn check_ident(name: &str) -> Result<(), CoreError> {
    if name.starts_with(TMP_PREFIX) {
        return Err(CoreError::ReservedName {
            name: name.to_string(),
        });
    }
    let mut chars = name.chars();
    let well_formed = match chars.next() {
        Some(first) => {
            (is_xid_start(first) || first == '_') && chars.all(is_xid_continue)
        }
        None => false,
    };
    if !well_formed {
        return Err(CoreError::UnsupportedInput(format!(
            "{name:?} is not a valid identifier"
        )));
    }
    Ok(())
}
