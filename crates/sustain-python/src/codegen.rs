//! Source regeneration from the typed AST.
//!
//! Emission is a pure function of the tree: four-space indents, one
//! statement per line, verbatim nodes reproduced with their original
//! relative indentation. Output is semantically equivalent to the input
//! for untouched trees, whitespace aside.

use crate::ast::{CmpOp, Expr, ExprKind, Module, Stmt, StmtKind};

/// Emit a whole module as Python source.
pub fn emit_module(module: &Module) -> String {
    // Only indented blocks need a `pass` stub; an empty module is just
    // empty source.
    if module.body.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    emit_block_at(&mut out, &module.body, 0);
    out
}

fn indent_of(level: usize) -> String {
    "    ".repeat(level)
}

fn emit_block_at(out: &mut String, body: &[Stmt], level: usize) {
    if body.is_empty() {
        out.push_str(&indent_of(level));
        out.push_str("pass\n");
        return;
    }
    for stmt in body {
        emit_stmt(out, stmt, level);
    }
}

fn emit_stmt(out: &mut String, stmt: &Stmt, level: usize) {
    let pad = indent_of(level);
    match &stmt.kind {
        StmtKind::Assign { target, value } => {
            out.push_str(&format!("{pad}{} = {}\n", emit_expr(target), emit_expr(value)));
        }
        StmtKind::Expr(expr) => {
            out.push_str(&format!("{pad}{}\n", emit_expr(expr)));
        }
        StmtKind::If { test, body, orelse } => {
            out.push_str(&format!("{pad}if {}:\n", emit_expr(test)));
            emit_block_at(out, body, level + 1);
            emit_orelse(out, orelse, level);
        }
        StmtKind::For { target, iter, body } => {
            out.push_str(&format!(
                "{pad}for {} in {}:\n",
                emit_target(target),
                emit_expr(iter)
            ));
            emit_block_at(out, body, level + 1);
        }
        StmtKind::While { test, body } => {
            out.push_str(&format!("{pad}while {}:\n", emit_expr(test)));
            emit_block_at(out, body, level + 1);
        }
        StmtKind::FunctionDef {
            name,
            signature,
            decorators,
            body,
        } => {
            for decorator in decorators {
                out.push_str(&format!("{pad}@{decorator}\n"));
            }
            out.push_str(&format!("{pad}def {name}{signature}:\n"));
            emit_block_at(out, body, level + 1);
        }
        StmtKind::ClassDef {
            name,
            bases,
            decorators,
            body,
        } => {
            for decorator in decorators {
                out.push_str(&format!("{pad}@{decorator}\n"));
            }
            match bases {
                Some(bases) => out.push_str(&format!("{pad}class {name}{bases}:\n")),
                None => out.push_str(&format!("{pad}class {name}:\n")),
            }
            emit_block_at(out, body, level + 1);
        }
        StmtKind::Return(value) => match value {
            Some(value) => out.push_str(&format!("{pad}return {}\n", emit_expr(value))),
            None => out.push_str(&format!("{pad}return\n")),
        },
        StmtKind::Import(line) => {
            emit_raw_lines(out, line, &pad);
        }
        StmtKind::Pass => {
            out.push_str(&format!("{pad}pass\n"));
        }
        StmtKind::Verbatim(text) => {
            emit_raw_lines(out, text, &pad);
        }
    }
}

/// An `elif` chain round-trips as `elif` when the else-branch is exactly
/// one nested `if`.
fn emit_orelse(out: &mut String, orelse: &[Stmt], level: usize) {
    if orelse.is_empty() {
        return;
    }
    let pad = indent_of(level);
    if let [Stmt {
        kind: StmtKind::If { test, body, orelse },
        ..
    }] = orelse
    {
        out.push_str(&format!("{pad}elif {}:\n", emit_expr(test)));
        emit_block_at(out, body, level + 1);
        emit_orelse(out, orelse, level);
        return;
    }
    out.push_str(&format!("{pad}else:\n"));
    emit_block_at(out, orelse, level + 1);
}

/// Verbatim text keeps its internal relative indentation; only the first
/// column moves to the current level.
fn emit_raw_lines(out: &mut String, text: &str, pad: &str) {
    for line in text.lines() {
        out.push_str(pad);
        out.push_str(line);
        out.push('\n');
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Emit one expression as source text.
pub fn emit_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Name(name) => name.clone(),
        ExprKind::Literal(text) => text.clone(),
        ExprKind::List(items) => format!("[{}]", join(items)),
        ExprKind::Tuple(items) => match items.as_slice() {
            [] => "()".to_string(),
            [single] => format!("({},)", emit_expr(single)),
            _ => format!("({})", join(items)),
        },
        ExprKind::Set(items) => {
            if items.is_empty() {
                // There is no empty-set literal.
                "set()".to_string()
            } else {
                format!("{{{}}}", join(items))
            }
        }
        ExprKind::Dict(pairs) => {
            let inner: Vec<String> = pairs
                .iter()
                .map(|(key, value)| format!("{}: {}", emit_expr(key), emit_expr(value)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        ExprKind::ListComp(text) | ExprKind::DictComp(text) | ExprKind::Verbatim(text) => {
            text.clone()
        }
        ExprKind::Call { func, args } => format!("{}({})", emit_expr(func), join(args)),
        ExprKind::Attribute { value, attr } => format!("{}.{}", emit_expr(value), attr),
        ExprKind::Subscript { value, index } => {
            format!("{}[{}]", emit_expr(value), emit_expr(index))
        }
        ExprKind::BinOp { left, op, right } => {
            format!("{} {} {}", emit_expr(left), op, emit_expr(right))
        }
        ExprKind::Compare { left, op, right } => {
            let op = match op {
                CmpOp::In => "in",
                CmpOp::NotIn => "not in",
                CmpOp::Other(text) => text,
            };
            format!("{} {} {}", emit_expr(left), op, emit_expr(right))
        }
        ExprKind::Paren(inner) => format!("({})", emit_expr(inner)),
    }
}

/// Loop targets drop tuple parentheses: `for k, v in ...`.
fn emit_target(target: &Expr) -> String {
    match &target.kind {
        ExprKind::Tuple(items) if !items.is_empty() => join(items),
        _ => emit_expr(target),
    }
}

fn join(items: &[Expr]) -> String {
    items
        .iter()
        .map(emit_expr)
        .collect::<Vec<String>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_module;

    fn round_trip(source: &str) -> String {
        emit_module(&parse_module(source).unwrap())
    }

    #[test]
    fn empty_module_emits_nothing() {
        assert_eq!(round_trip(""), "");
    }

    #[test]
    fn assignment_round_trips() {
        assert_eq!(round_trip("x = [1, 2, 3]\n"), "x = [1, 2, 3]\n");
    }

    #[test]
    fn if_else_round_trips() {
        let source = "if x in names:\n    print(x)\nelse:\n    pass\n";
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn elif_chain_round_trips_as_elif() {
        let source = "if a:\n    pass\nelif b:\n    pass\nelse:\n    pass\n";
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn for_loop_target_has_no_parens() {
        let source = "for k, v in pairs:\n    d[k] = v\n";
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn nested_function_keeps_indentation() {
        let source = "def outer(a, b):\n    if a:\n        return b\n    return a\n";
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn verbatim_statement_survives_inside_block() {
        let source = "def f():\n    try:\n        g()\n    except ValueError:\n        pass\n";
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn grouping_parens_are_preserved() {
        assert_eq!(round_trip("x = (a + b) * c\n"), "x = (a + b) * c\n");
    }

    #[test]
    fn empty_set_constructor_is_not_a_literal() {
        let expr = Expr::new(1, ExprKind::Set(Vec::new()));
        assert_eq!(emit_expr(&expr), "set()");
    }

    #[test]
    fn single_element_tuple_keeps_trailing_comma() {
        let source = "x = (1,)\n";
        assert_eq!(round_trip(source), source);
    }
}
