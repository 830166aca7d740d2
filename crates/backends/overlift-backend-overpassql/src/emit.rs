//! Statement and expression emission.

use std::fmt::Write;

use overlift_core::ast::{BinOp, BoolOp, CmpKind, Const, Expr, Module, Stmt, UnaryOp};
use overlift_core::error::CoreError;
use overlift_core::names::TMP_PREFIX;

use crate::calls;

/// Emit a whole module as OverpassQL text.
///
/// A leading `Settings(...)` statement, if present, becomes `[key:value]`
/// header lines and is removed from the body before the main walk.
pub fn emit_module(module: &Module) -> Result<String, CoreError> {
    let mut body: &[Stmt] = &module.body;
    let mut out = String::new();

    if let Some(keywords) = settings_keywords(body.first()) {
        for kw in keywords {
            let value = match &kw.value {
                // String settings are dequoted: [timeout:900], not [timeout:"900"].
                Expr::Str(s) => s.clone(),
                other => emit_expr(other)?,
            };
            let _ = writeln!(out, "[{}:{}]", kw.arg, value);
        }
        body = &body[1..];
    }

    log::trace!("emitting {} statements", body.len());

    let mut fragments = Vec::with_capacity(body.len());
    for stmt in body {
        let fragment = emit_stmt(stmt)?;
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
    }
    out.push_str(&fragments.join("\n"));
    Ok(out)
}

/// The keyword list of a leading `Settings(...)` statement, if that is what
/// `stmt` is.
fn settings_keywords(stmt: Option<&Stmt>) -> Option<&[overlift_core::ast::Keyword]> {
    match stmt {
        Some(Stmt::Expr {
            value: Expr::Call { func, keywords, .. },
        }) if matches!(func.as_ref(), Expr::Name(id) if id == "Settings") => Some(keywords),
        _ => None,
    }
}

/// Emit one statement (possibly multi-line, unindented; enclosing loops
/// indent their children).
fn emit_stmt(stmt: &Stmt) -> Result<String, CoreError> {
    match stmt {
        Stmt::Assign {
            target,
            value: Expr::IfExp { test, body, orelse },
        } => emit_cond_assign(&format!(".{target}"), test, body, orelse),

        Stmt::Assign { target, value } => {
            Ok(format!("({};) -> .{};", emit_expr(value)?, target))
        }

        Stmt::Expr {
            value: Expr::IfExp { test, body, orelse },
        } => emit_cond_assign("._", test, body, orelse),

        Stmt::Expr { value } => emit_expr(value),

        Stmt::For {
            target,
            iter,
            body,
            orelse,
        } => {
            if !orelse.is_empty() {
                return Err(CoreError::Unsupported(
                    "for loops with an else clause are not supported".to_string(),
                ));
            }
            if !matches!(iter, Expr::Name(_)) {
                return Err(CoreError::Unsupported(
                    "loop iterators must be reduced to a named set before emission".to_string(),
                ));
            }
            let mut out = format!("foreach{}->.{}(", emit_expr(iter)?, target);
            for stmt in body {
                let fragment = emit_stmt(stmt)?;
                if fragment.is_empty() {
                    continue;
                }
                for line in fragment.lines() {
                    out.push_str("\n  ");
                    out.push_str(line);
                }
            }
            out.push_str("\n);");
            Ok(out)
        }

        Stmt::If { .. } => Err(CoreError::Unsupported(
            "if statements must be lowered before emission".to_string(),
        )),
        Stmt::Break => Err(CoreError::Unsupported(
            "break must be lowered before emission".to_string(),
        )),
        Stmt::Continue => Err(CoreError::Unsupported(
            "continue must be lowered before emission".to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Emit an expression fragment. Named sets carry a leading dot.
pub(crate) fn emit_expr(expr: &Expr) -> Result<String, CoreError> {
    match expr {
        Expr::Name(id) => Ok(format!(".{id}")),
        Expr::Attribute { value, attr } => Ok(format!("{}.{attr}", emit_expr(value)?)),
        Expr::Num(n) => Ok(n.to_string()),
        Expr::Str(s) => Ok(format!("\"{s}\"")),
        Expr::Constant(c) => Ok(match c {
            Const::True => "true",
            Const::False => "false",
            Const::Null => "null",
        }
        .to_string()),
        Expr::Ellipsis => Err(CoreError::Unsupported(
            "... is only valid as a tag-filter value".to_string(),
        )),
        Expr::Subscript { value, index } => {
            let v = emit_expr(value)?;
            let v = v.strip_prefix('.').unwrap_or(&v);
            Ok(format!("{v}[{}]", emit_expr(index)?))
        }
        Expr::Binary { op, left, right } => emit_binary(*op, left, right),
        Expr::Bool { op, left, right } => {
            let symbol = match op {
                BoolOp::And => "&&",
                BoolOp::Or => "||",
            };
            Ok(format!("{} {symbol} {}", emit_expr(left)?, emit_expr(right)?))
        }
        Expr::Unary { op, operand } => {
            let symbol = match op {
                UnaryOp::Neg => "-",
                UnaryOp::Not => "!",
            };
            Ok(format!("{symbol}{}", emit_expr(operand)?))
        }
        Expr::Compare { op, left, right } => {
            let symbol = match op {
                CmpKind::Eq => "==",
                CmpKind::Ne => "!=",
                CmpKind::Lt => "<",
                CmpKind::Le => "<=",
                CmpKind::Gt => ">",
                CmpKind::Ge => ">=",
            };
            Ok(format!("{} {symbol} {}", emit_expr(left)?, emit_expr(right)?))
        }
        Expr::IfExp { .. } => Err(CoreError::Unsupported(
            "conditional expressions are only valid as the right-hand side of an assignment"
                .to_string(),
        )),
        Expr::Call {
            func,
            args,
            keywords,
        } => calls::emit_call(func, args, keywords),
    }
}

/// Dispatch a binary operator, classifying `+`/`-` operands as scalar or
/// set by whether the emitted fragment parses as a number.
fn emit_binary(op: BinOp, left: &Expr, right: &Expr) -> Result<String, CoreError> {
    let l = emit_expr(left)?;
    let r = emit_expr(right)?;
    match op {
        BinOp::Add => match (is_scalar(&l), is_scalar(&r)) {
            (true, true) => Ok(format!("{l} + {r}")),
            (false, false) => Ok(format!("({l}; {r})")),
            (true, false) => Err(CoreError::OperatorType(
                "You cannot add a number to a set".to_string(),
            )),
            (false, true) => Err(CoreError::OperatorType(
                "You cannot add a set to a number".to_string(),
            )),
        },
        BinOp::Sub => match (is_scalar(&l), is_scalar(&r)) {
            (true, true) => Ok(format!("{l} - {r}")),
            (false, false) => Ok(format!("({l}; - {r})")),
            (true, false) => Err(CoreError::OperatorType(
                "You cannot subtract a set from a number".to_string(),
            )),
            (false, true) => Err(CoreError::OperatorType(
                "You cannot subtract a number from a set".to_string(),
            )),
        },
        BinOp::Mul => Ok(format!("{l} * {r}")),
        BinOp::Div => Ok(format!("{l} / {r}")),
        BinOp::FloorDiv => Err(CoreError::UnsupportedOperator(
            "floor division has no OverpassQL equivalent".to_string(),
        )),
    }
}

fn is_scalar(fragment: &str) -> bool {
    fragment.parse::<f64>().is_ok()
}

// ---------------------------------------------------------------------------
// Conditional expressions
// ---------------------------------------------------------------------------

/// Emit `name = body if test else orelse`.
///
/// OverpassQL has no conditional expression, so the value is built by
/// filtering: assign the then-value to `name`, keep it only where the test
/// holds (across all four object types), and, for a non-empty else, union
/// in the else-value filtered by the negated test via a companion set.
fn emit_cond_assign(
    name: &str,
    test: &Expr,
    body: &Expr,
    orelse: &Expr,
) -> Result<String, CoreError> {
    let t = emit_expr(test)?;
    let a = emit_expr(body)?;
    let b = emit_expr(orelse)?;

    let mut out = format!("({a};) -> {name};");
    if b == "()" {
        let _ = write!(out, "\n{}", four_type_filter(name, &t));
    } else if matches!(b.as_str(), "way" | "area" | "node" | "relation") {
        // Else-branch is a bare typed set: a single type-specialized filter
        // replaces the four-way scaffold.
        let _ = write!(out, "\n{b}{name}(if: {t}) -> {name};");
    } else {
        let companion = format!(".{TMP_PREFIX}{}", &name[1..]);
        let _ = write!(out, "\n{}", four_type_filter(name, &t));
        let _ = write!(out, "\n({b};) -> {companion};");
        let _ = write!(
            out,
            "\n({name}; way{companion}(if: !({t})); area{companion}(if: !({t})); \
             node{companion}(if: !({t})); relation{companion}(if: !({t}));) -> {name};"
        );
    }
    Ok(out)
}

/// `(way N(if: t); area N(if: t); node N(if: t); relation N(if: t);) -> N;`
fn four_type_filter(name: &str, test: &str) -> String {
    format!(
        "(way{name}(if: {test}); area{name}(if: {test}); \
         node{name}(if: {test}); relation{name}(if: {test});) -> {name};"
    )
}
