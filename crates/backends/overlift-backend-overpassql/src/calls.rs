//! Call classification and emission.
//!
//! Calls split on the shape of their name: dotted names are methods on a
//! named set (`roads.filter(...)`, `everything.recurse_down`), bare names
//! are the global vocabulary (locator constructors, `Set`, `out`, `is_in`,
//! `Around`, regex markers). Anything else is not Overpass.

use std::collections::BTreeSet;

use overlift_core::ast::{Const, Expr, Keyword};
use overlift_core::error::CoreError;

use crate::emit::emit_expr;

pub(crate) fn emit_call(
    func: &Expr,
    args: &[Expr],
    keywords: &[Keyword],
) -> Result<String, CoreError> {
    let dotted = emit_expr(func)?;
    let name = dotted.strip_prefix('.').unwrap_or(&dotted);

    if let Some((set, _)) = name.split_once('.') {
        return emit_set_method(set, name, args);
    }

    match name {
        // Pure syntactic filler; emits nothing.
        "noop" => Ok(String::new()),
        "Set" => {
            let parts = args.iter().map(emit_expr).collect::<Result<Vec<_>, _>>()?;
            Ok(format!("({})", parts.join("; ")))
        }
        "Way" | "Node" | "Area" | "Relation" => emit_locator(name, args, keywords),
        "Regex" | "NotRegex" => {
            if args.len() != 1 {
                return Err(CoreError::Arity(format!(
                    "{name} calls take exactly one positional argument"
                )));
            }
            Ok(format!("{name}({})", emit_expr(&args[0])?))
        }
        "is_in" => emit_is_in(args),
        "Around" => emit_around(args),
        "out" => emit_out(args, keywords),
        // `Settings` is only meaningful as the leading statement, where the
        // module emitter consumes it; anywhere else it is not a name we know.
        _ => Err(CoreError::UnknownName {
            name: name.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Set methods
// ---------------------------------------------------------------------------

fn emit_set_method(set: &str, name: &str, args: &[Expr]) -> Result<String, CoreError> {
    if name.ends_with(".intersect") {
        // `waySet.intersect(a, b)` → `way.a.b`
        let ty = set.strip_suffix("Set").unwrap_or(set).to_lowercase();
        let mut out = ty;
        for arg in args {
            out.push_str(&emit_expr(arg)?);
        }
        Ok(out)
    } else if name.ends_with(".filter") {
        if args.len() != 1 {
            return Err(CoreError::Arity(
                "filter calls take exactly one positional argument".to_string(),
            ));
        }
        Ok(format!("{}{}", set.to_lowercase(), emit_expr(&args[0])?))
    } else if name.ends_with(".recurse_up_relations") {
        Ok(format!(".{set} <<"))
    } else if name.ends_with(".recurse_down_relations") {
        Ok(format!(".{set} >>"))
    } else if name.ends_with(".recurse_up") {
        Ok(format!(".{set} <"))
    } else if name.ends_with(".recurse_down") {
        Ok(format!(".{set} >"))
    } else {
        Err(CoreError::UnknownName {
            name: name.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Locator constructors
// ---------------------------------------------------------------------------

/// Emit `Way`/`Node`/`Area`/`Relation` constructors: the lowercased type,
/// the keyword tag filters, and the locator argument (id, area set, or
/// around clause).
fn emit_locator(name: &str, args: &[Expr], keywords: &[Keyword]) -> Result<String, CoreError> {
    let ty = name.to_lowercase();
    let mut tags = String::new();
    for kw in keywords {
        tags.push_str(&tag_filter(kw)?);
    }
    match args.len() {
        0 => Ok(format!("{ty}{tags}")),
        1 => {
            let arg = emit_expr(&args[0])?;
            if let Some(clause) = arg.strip_prefix("around") {
                Ok(format!("{ty}{tags}(around{clause})"))
            } else if arg.parse::<f64>().is_ok() {
                // A bare number is an object id.
                Ok(format!("{ty}{tags}({arg})"))
            } else {
                // Anything else is a named set to search within, as an area.
                Ok(format!("{ty}{tags}(area{arg})"))
            }
        }
        _ => Err(CoreError::Arity(
            "Locator calls support 1 or 0 positional arguments".to_string(),
        )),
    }
}

/// Compile one keyword argument into a tag filter.
fn tag_filter(kw: &Keyword) -> Result<String, CoreError> {
    let key = &kw.arg;
    Ok(match &kw.value {
        Expr::Constant(Const::Null) => format!("[!\"{key}\"]"),
        Expr::Ellipsis => format!("[\"{key}\"]"),
        Expr::Call { func, args, .. } if is_bare_name(func, "Regex") && args.len() == 1 => {
            format!("[\"{key}\"~{}]", emit_expr(&args[0])?)
        }
        Expr::Call { func, args, .. } if is_bare_name(func, "NotRegex") && args.len() == 1 => {
            format!("[\"{key}\"!~{}]", emit_expr(&args[0])?)
        }
        // String values land between the quotes verbatim.
        Expr::Str(s) => format!("[\"{key}\"=\"{s}\"]"),
        other => format!("[\"{key}\"=\"{}\"]", emit_expr(other)?),
    })
}

fn is_bare_name(func: &Expr, expected: &str) -> bool {
    matches!(func, Expr::Name(id) if id == expected)
}

// ---------------------------------------------------------------------------
// is_in / Around
// ---------------------------------------------------------------------------

fn emit_is_in(args: &[Expr]) -> Result<String, CoreError> {
    match args {
        [] => Ok("is_in".to_string()),
        [element] => Ok(format!("{} is_in", emit_expr(element)?)),
        [lat, lon] => Ok(format!("is_in({}, {})", emit_expr(lat)?, emit_expr(lon)?)),
        _ => Err(CoreError::Arity(
            "is_in calls support at most two positional arguments".to_string(),
        )),
    }
}

fn emit_around(args: &[Expr]) -> Result<String, CoreError> {
    match args {
        [radius] => Ok(format!("around:{}", emit_expr(radius)?)),
        [set, radius] => Ok(format!(
            "around{}:{}",
            emit_expr(set)?,
            emit_expr(radius)?
        )),
        [radius, lat, lon] => Ok(format!(
            "around:{},{},{}",
            emit_expr(radius)?,
            emit_expr(lat)?,
            emit_expr(lon)?
        )),
        _ => Err(CoreError::Arity(
            "Around calls support one to three positional arguments".to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// out
// ---------------------------------------------------------------------------

/// Emit `out(...)`. Keyword names are output channels; `count` gets its own
/// statement ahead of the rest.
fn emit_out(args: &[Expr], keywords: &[Keyword]) -> Result<String, CoreError> {
    let element = match args.first() {
        None => "._".to_string(),
        Some(arg) => emit_expr(arg)?,
    };
    let mut channels: BTreeSet<&str> = keywords.iter().map(|kw| kw.arg.as_str()).collect();

    let mut lines = Vec::new();
    if channels.remove("count") {
        lines.push(format!("{element} out count;"));
    }
    if lines.is_empty() || !channels.is_empty() {
        let rest = channels.iter().copied().collect::<Vec<_>>().join(" ");
        lines.push(format!("{element} out {rest};"));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlift_core::ast::Number;
    use pretty_assertions::assert_eq;

    fn name(id: &str) -> Expr {
        Expr::Name(id.to_string())
    }

    fn num(n: i64) -> Expr {
        Expr::Num(Number::Int(n))
    }

    fn call(func: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            func: Box::new(name(func)),
            args,
            keywords: vec![],
        }
    }

    fn method(set: &str, method: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            func: Box::new(Expr::Attribute {
                value: Box::new(name(set)),
                attr: method.to_string(),
            }),
            args,
            keywords: vec![],
        }
    }

    fn keyword(arg: &str, value: Expr) -> Keyword {
        Keyword {
            arg: arg.to_string(),
            value,
        }
    }

    fn emit(expr: &Expr) -> String {
        emit_expr(expr).unwrap()
    }

    #[test]
    fn locator_by_id() {
        assert_eq!(emit(&call("Node", vec![num(1)])), "node(1)");
        assert_eq!(emit(&call("Relation", vec![num(2186646)])), "relation(2186646)");
    }

    #[test]
    fn locator_by_area_set() {
        assert_eq!(emit(&call("Way", vec![name("town")])), "way(area.town)");
    }

    #[test]
    fn locator_with_around_clause() {
        let around = call("Around", vec![num(100)]);
        assert_eq!(emit(&call("Node", vec![around])), "node(around:100)");

        let near = call("Around", vec![name("stations"), num(50)]);
        assert_eq!(
            emit(&call("Way", vec![near])),
            "way(around.stations:50)"
        );
    }

    #[test]
    fn around_with_coordinates() {
        let expr = call(
            "Around",
            vec![
                num(100),
                Expr::Num(Number::Float(50.7)),
                Expr::Num(Number::Float(7.1)),
            ],
        );
        assert_eq!(emit(&expr), "around:100,50.7,7.1");
    }

    #[test]
    fn around_arity_is_checked() {
        assert!(matches!(
            emit_expr(&call("Around", vec![])),
            Err(CoreError::Arity(_))
        ));
        assert!(matches!(
            emit_expr(&call("Around", vec![num(1), num(2), num(3), num(4)])),
            Err(CoreError::Arity(_))
        ));
    }

    #[test]
    fn locator_tag_filters() {
        let expr = Expr::Call {
            func: Box::new(name("Way")),
            args: vec![],
            keywords: vec![
                keyword("highway", Expr::Ellipsis),
                keyword("name", Expr::Str("Main Street".to_string())),
                keyword("foot", Expr::Constant(Const::Null)),
                keyword("ref", call("Regex", vec![Expr::Str("^A[0-9]+".to_string())])),
                keyword(
                    "surface",
                    call("NotRegex", vec![Expr::Str("gravel".to_string())]),
                ),
            ],
        };
        assert_eq!(
            emit(&expr),
            "way[\"highway\"][\"name\"=\"Main Street\"][!\"foot\"]\
             [\"ref\"~\"^A[0-9]+\"][\"surface\"!~\"gravel\"]"
        );
    }

    #[test]
    fn locator_numeric_tag_value() {
        let expr = Expr::Call {
            func: Box::new(name("Node")),
            args: vec![],
            keywords: vec![keyword("admin_level", num(8))],
        };
        assert_eq!(emit(&expr), "node[\"admin_level\"=\"8\"]");
    }

    #[test]
    fn locator_rejects_two_positionals() {
        match emit_expr(&call("Way", vec![num(1), num(2)])) {
            Err(CoreError::Arity(message)) => {
                assert_eq!(message, "Locator calls support 1 or 0 positional arguments");
            }
            other => panic!("Expected Arity, got: {other:?}"),
        }
    }

    #[test]
    fn set_literal() {
        assert_eq!(emit(&call("Set", vec![])), "()");
        assert_eq!(
            emit(&call("Set", vec![name("a"), name("b")])),
            "(.a; .b)"
        );
    }

    #[test]
    fn filter_and_intersect_methods() {
        assert_eq!(emit(&method("Way", "filter", vec![name("live")])), "way.live");
        assert_eq!(
            emit(&method("waySet", "intersect", vec![name("a"), name("b")])),
            "way.a.b"
        );
    }

    #[test]
    fn recurse_methods() {
        assert_eq!(emit(&method("xs", "recurse_up", vec![])), ".xs <");
        assert_eq!(emit(&method("xs", "recurse_down", vec![])), ".xs >");
        assert_eq!(emit(&method("xs", "recurse_up_relations", vec![])), ".xs <<");
        assert_eq!(emit(&method("xs", "recurse_down_relations", vec![])), ".xs >>");
    }

    #[test]
    fn unknown_method_is_an_error() {
        match emit_expr(&method("xs", "explode", vec![])) {
            Err(CoreError::UnknownName { name }) => assert_eq!(name, "xs.explode"),
            other => panic!("Expected UnknownName, got: {other:?}"),
        }
    }

    #[test]
    fn unknown_global_is_an_error() {
        match emit_expr(&call("Teleport", vec![])) {
            Err(CoreError::UnknownName { name }) => assert_eq!(name, "Teleport"),
            other => panic!("Expected UnknownName, got: {other:?}"),
        }
    }

    #[test]
    fn is_in_forms() {
        assert_eq!(emit(&call("is_in", vec![])), "is_in");
        assert_eq!(emit(&call("is_in", vec![name("x")])), ".x is_in");
        assert_eq!(
            emit(&call(
                "is_in",
                vec![Expr::Num(Number::Float(50.7)), Expr::Num(Number::Float(7.1))]
            )),
            "is_in(50.7, 7.1)"
        );
        assert!(matches!(
            emit_expr(&call("is_in", vec![num(1), num(2), num(3)])),
            Err(CoreError::Arity(_))
        ));
    }

    #[test]
    fn out_defaults_to_the_anonymous_set() {
        assert_eq!(emit(&call("out", vec![])), "._ out ;");
    }

    #[test]
    fn out_with_element_and_channels() {
        let expr = Expr::Call {
            func: Box::new(name("out")),
            args: vec![name("x")],
            keywords: vec![
                keyword("ids", Expr::Constant(Const::True)),
                keyword("geom", Expr::Constant(Const::True)),
            ],
        };
        assert_eq!(emit(&expr), ".x out geom ids;");
    }

    #[test]
    fn out_count_gets_its_own_statement() {
        let expr = Expr::Call {
            func: Box::new(name("out")),
            args: vec![name("x")],
            keywords: vec![
                keyword("count", Expr::Constant(Const::True)),
                keyword("ids", Expr::Constant(Const::True)),
            ],
        };
        assert_eq!(emit(&expr), ".x out count;\n.x out ids;");

        let count_only = Expr::Call {
            func: Box::new(name("out")),
            args: vec![name("x")],
            keywords: vec![keyword("count", Expr::Constant(Const::True))],
        };
        assert_eq!(emit(&count_only), ".x out count;");
    }

    #[test]
    fn regex_marker_survives_expression_position() {
        assert_eq!(
            emit(&call("Regex", vec![Expr::Str("^A".to_string())])),
            "Regex(\"^A\")"
        );
    }
}
