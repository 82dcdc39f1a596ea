//! Parsing: source text → typed AST via tree-sitter-python.
//!
//! The tree-sitter CST is lowered into the closed [`crate::ast`] subset.
//! Constructs the analyzer has no opinion about (try/with, lambdas,
//! starred arguments, chained comparisons, ...) are captured verbatim so
//! the rewriter can reproduce them untouched.
//!
//! Invalid input fails here with a [`ParseError`]; the detector and the
//! auto-fixer only ever see well-formed trees.

use thiserror::Error;
use tree_sitter::{Node, Parser};

use crate::ast::{CmpOp, Expr, ExprKind, Module, Stmt, StmtKind};

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by the parse step.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input is not syntactically valid Python.
    #[error("syntax error at line {line}, column {col}: near {near:?}")]
    Syntax { line: u32, col: u32, near: String },

    /// The tree-sitter grammar could not be loaded.
    #[error("parser initialization failed: {message}")]
    Language { message: String },
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse a Python module into the typed AST.
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ParseError::Language {
            message: e.to_string(),
        })?;

    let tree = parser.parse(source, None).ok_or(ParseError::Language {
        message: "tree-sitter returned no tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        let error = first_error(root).unwrap_or(root);
        let pos = error.start_position();
        let near: String = text(error, source).chars().take(24).collect();
        return Err(ParseError::Syntax {
            line: pos.row as u32 + 1,
            col: pos.column as u32 + 1,
            near,
        });
    }

    Ok(Module {
        body: lower_block(root, source),
    })
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

// ============================================================================
// Lowering Helpers
// ============================================================================

fn text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// Strip the node's starting column from continuation lines so verbatim
/// text can be re-indented at emission.
fn dedented_text(node: Node, source: &str) -> String {
    let raw = text(node, source);
    let col = node.start_position().column;
    let mut lines = raw.lines();
    let mut out = String::new();
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        let strip = line
            .char_indices()
            .take_while(|(i, c)| *i < col && *c == ' ')
            .count();
        out.push_str(&line[strip..]);
    }
    out
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

// ============================================================================
// Statement Lowering
// ============================================================================

fn lower_block(node: Node, source: &str) -> Vec<Stmt> {
    named_children(node)
        .into_iter()
        .map(|child| lower_stmt(child, source))
        .collect()
}

fn lower_stmt(node: Node, source: &str) -> Stmt {
    let line = line_of(node);
    let kind = match node.kind() {
        "expression_statement" => lower_expression_statement(node, source),
        "if_statement" => lower_if(node, source),
        "for_statement" => lower_for(node, source),
        "while_statement" => lower_while(node, source),
        "function_definition" => lower_function(node, source, Vec::new()),
        "class_definition" => lower_class(node, source, Vec::new()),
        "decorated_definition" => lower_decorated(node, source),
        "import_statement" | "import_from_statement" | "future_import_statement" => {
            StmtKind::Import(text(node, source).to_string())
        }
        "return_statement" => {
            let value = named_children(node)
                .first()
                .map(|child| lower_expr(*child, source));
            StmtKind::Return(value)
        }
        "pass_statement" => StmtKind::Pass,
        _ => StmtKind::Verbatim(dedented_text(node, source)),
    };
    Stmt::new(line, kind)
}

fn lower_expression_statement(node: Node, source: &str) -> StmtKind {
    // `a = 1; b = 2` packs several children into one statement node;
    // keep those verbatim rather than dropping the tail.
    let children = named_children(node);
    let [inner] = children[..] else {
        return StmtKind::Verbatim(dedented_text(node, source));
    };
    if inner.kind() == "assignment" {
        // Annotated assignments stay verbatim; only plain `target = value`
        // enters the typed subset.
        if inner.child_by_field_name("type").is_some() {
            return StmtKind::Verbatim(dedented_text(node, source));
        }
        if let (Some(left), Some(right)) = (
            inner.child_by_field_name("left"),
            inner.child_by_field_name("right"),
        ) {
            return StmtKind::Assign {
                target: lower_expr(left, source),
                value: lower_expr(right, source),
            };
        }
        return StmtKind::Verbatim(dedented_text(node, source));
    }
    if inner.kind() == "augmented_assignment" {
        return StmtKind::Verbatim(dedented_text(node, source));
    }
    StmtKind::Expr(lower_expr(inner, source))
}

fn lower_if(node: Node, source: &str) -> StmtKind {
    let test = node
        .child_by_field_name("condition")
        .map(|c| lower_expr(c, source))
        .unwrap_or_else(|| verbatim_expr(node, source));
    let body = node
        .child_by_field_name("consequence")
        .map(|c| lower_block(c, source))
        .unwrap_or_default();

    let mut cursor = node.walk();
    let alternatives: Vec<Node> = node
        .children_by_field_name("alternative", &mut cursor)
        .collect();
    let orelse = lower_alternatives(&alternatives, source);

    StmtKind::If { test, body, orelse }
}

fn lower_alternatives(alternatives: &[Node], source: &str) -> Vec<Stmt> {
    let Some((head, rest)) = alternatives.split_first() else {
        return Vec::new();
    };
    match head.kind() {
        "elif_clause" => {
            let test = head
                .child_by_field_name("condition")
                .map(|c| lower_expr(c, source))
                .unwrap_or_else(|| verbatim_expr(*head, source));
            let body = head
                .child_by_field_name("consequence")
                .map(|c| lower_block(c, source))
                .unwrap_or_default();
            let orelse = lower_alternatives(rest, source);
            vec![Stmt::new(line_of(*head), StmtKind::If { test, body, orelse })]
        }
        "else_clause" => head
            .child_by_field_name("body")
            .map(|c| lower_block(c, source))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn lower_for(node: Node, source: &str) -> StmtKind {
    // `for ... else` is outside the subset.
    if node.child_by_field_name("alternative").is_some() {
        return StmtKind::Verbatim(dedented_text(node, source));
    }
    let (Some(left), Some(right), Some(body)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
        node.child_by_field_name("body"),
    ) else {
        return StmtKind::Verbatim(dedented_text(node, source));
    };
    StmtKind::For {
        target: lower_expr(left, source),
        iter: lower_expr(right, source),
        body: lower_block(body, source),
    }
}

fn lower_while(node: Node, source: &str) -> StmtKind {
    if node.child_by_field_name("alternative").is_some() {
        return StmtKind::Verbatim(dedented_text(node, source));
    }
    let (Some(condition), Some(body)) = (
        node.child_by_field_name("condition"),
        node.child_by_field_name("body"),
    ) else {
        return StmtKind::Verbatim(dedented_text(node, source));
    };
    StmtKind::While {
        test: lower_expr(condition, source),
        body: lower_block(body, source),
    }
}

fn lower_function(node: Node, source: &str, decorators: Vec<String>) -> StmtKind {
    let (Some(name), Some(parameters), Some(body)) = (
        node.child_by_field_name("name"),
        node.child_by_field_name("parameters"),
        node.child_by_field_name("body"),
    ) else {
        return StmtKind::Verbatim(dedented_text(node, source));
    };
    let mut signature = text(parameters, source).to_string();
    if let Some(return_type) = node.child_by_field_name("return_type") {
        signature.push_str(" -> ");
        signature.push_str(text(return_type, source));
    }
    StmtKind::FunctionDef {
        name: text(name, source).to_string(),
        signature,
        decorators,
        body: lower_block(body, source),
    }
}

fn lower_class(node: Node, source: &str, decorators: Vec<String>) -> StmtKind {
    let (Some(name), Some(body)) = (
        node.child_by_field_name("name"),
        node.child_by_field_name("body"),
    ) else {
        return StmtKind::Verbatim(dedented_text(node, source));
    };
    let bases = node
        .child_by_field_name("superclasses")
        .map(|n| text(n, source).to_string());
    StmtKind::ClassDef {
        name: text(name, source).to_string(),
        bases,
        decorators,
        body: lower_block(body, source),
    }
}

fn lower_decorated(node: Node, source: &str) -> StmtKind {
    let decorators: Vec<String> = named_children(node)
        .into_iter()
        .filter(|child| child.kind() == "decorator")
        .map(|child| text(child, source).trim_start_matches('@').to_string())
        .collect();
    let Some(definition) = node.child_by_field_name("definition") else {
        return StmtKind::Verbatim(dedented_text(node, source));
    };
    match definition.kind() {
        "function_definition" => lower_function(definition, source, decorators),
        "class_definition" => lower_class(definition, source, decorators),
        _ => StmtKind::Verbatim(dedented_text(node, source)),
    }
}

// ============================================================================
// Expression Lowering
// ============================================================================

fn verbatim_expr(node: Node, source: &str) -> Expr {
    Expr::new(
        line_of(node),
        ExprKind::Verbatim(dedented_text(node, source)),
    )
}

fn lower_expr(node: Node, source: &str) -> Expr {
    let line = line_of(node);
    let kind = match node.kind() {
        "identifier" => ExprKind::Name(text(node, source).to_string()),
        "integer" | "float" | "string" | "concatenated_string" | "true" | "false" | "none" => {
            ExprKind::Literal(text(node, source).to_string())
        }
        "list" => ExprKind::List(lower_elements(node, source)),
        "set" => ExprKind::Set(lower_elements(node, source)),
        "tuple" | "pattern_list" | "tuple_pattern" | "expression_list" => {
            ExprKind::Tuple(lower_elements(node, source))
        }
        "dictionary" => return lower_dict(node, source),
        "list_comprehension" => ExprKind::ListComp(dedented_text(node, source)),
        "dictionary_comprehension" => ExprKind::DictComp(dedented_text(node, source)),
        "call" => return lower_call(node, source),
        "attribute" => return lower_attribute(node, source),
        "subscript" => return lower_subscript(node, source),
        "binary_operator" => return lower_binop(node, source),
        "comparison_operator" => return lower_comparison(node, source),
        "parenthesized_expression" => match named_children(node).into_iter().next() {
            Some(inner) => ExprKind::Paren(Box::new(lower_expr(inner, source))),
            None => ExprKind::Verbatim(dedented_text(node, source)),
        },
        _ => ExprKind::Verbatim(dedented_text(node, source)),
    };
    Expr::new(line, kind)
}

fn lower_elements(node: Node, source: &str) -> Vec<Expr> {
    named_children(node)
        .into_iter()
        .map(|child| lower_expr(child, source))
        .collect()
}

fn lower_dict(node: Node, source: &str) -> Expr {
    let children = named_children(node);
    // Splats (`{**a}`) fall outside the subset.
    if children.iter().any(|c| c.kind() != "pair") {
        return verbatim_expr(node, source);
    }
    let mut pairs = Vec::new();
    for pair in children {
        let (Some(key), Some(value)) = (
            pair.child_by_field_name("key"),
            pair.child_by_field_name("value"),
        ) else {
            return verbatim_expr(node, source);
        };
        pairs.push((lower_expr(key, source), lower_expr(value, source)));
    }
    Expr::new(line_of(node), ExprKind::Dict(pairs))
}

fn lower_call(node: Node, source: &str) -> Expr {
    let (Some(function), Some(arguments)) = (
        node.child_by_field_name("function"),
        node.child_by_field_name("arguments"),
    ) else {
        return verbatim_expr(node, source);
    };
    let args = if arguments.kind() == "argument_list" {
        named_children(arguments)
            .into_iter()
            .map(|arg| match arg.kind() {
                // Keyword/splat arguments ride along as verbatim text.
                "keyword_argument" | "list_splat" | "dictionary_splat" => {
                    verbatim_expr(arg, source)
                }
                _ => lower_expr(arg, source),
            })
            .collect()
    } else {
        // `f(x for x in y)` — a bare generator argument.
        vec![verbatim_expr(arguments, source)]
    };
    Expr::new(
        line_of(node),
        ExprKind::Call {
            func: Box::new(lower_expr(function, source)),
            args,
        },
    )
}

fn lower_attribute(node: Node, source: &str) -> Expr {
    let (Some(object), Some(attribute)) = (
        node.child_by_field_name("object"),
        node.child_by_field_name("attribute"),
    ) else {
        return verbatim_expr(node, source);
    };
    Expr::new(
        line_of(node),
        ExprKind::Attribute {
            value: Box::new(lower_expr(object, source)),
            attr: text(attribute, source).to_string(),
        },
    )
}

fn lower_subscript(node: Node, source: &str) -> Expr {
    let Some(value) = node.child_by_field_name("value") else {
        return verbatim_expr(node, source);
    };
    let mut cursor = node.walk();
    let subscripts: Vec<Node> = node
        .children_by_field_name("subscript", &mut cursor)
        .collect();
    // Multi-dimensional subscripts and slices stay verbatim.
    let [index] = subscripts.as_slice() else {
        return verbatim_expr(node, source);
    };
    if index.kind() == "slice" {
        return verbatim_expr(node, source);
    }
    Expr::new(
        line_of(node),
        ExprKind::Subscript {
            value: Box::new(lower_expr(value, source)),
            index: Box::new(lower_expr(*index, source)),
        },
    )
}

fn lower_binop(node: Node, source: &str) -> Expr {
    let (Some(left), Some(operator), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("operator"),
        node.child_by_field_name("right"),
    ) else {
        return verbatim_expr(node, source);
    };
    Expr::new(
        line_of(node),
        ExprKind::BinOp {
            left: Box::new(lower_expr(left, source)),
            op: text(operator, source).to_string(),
            right: Box::new(lower_expr(right, source)),
        },
    )
}

fn lower_comparison(node: Node, source: &str) -> Expr {
    let operands = named_children(node);
    let mut cursor = node.walk();
    let operators: Vec<Node> = node
        .children_by_field_name("operators", &mut cursor)
        .collect();
    // Chained comparisons (`a < b < c`) stay verbatim.
    let ([left, right], [operator]) = (operands.as_slice(), operators.as_slice()) else {
        return verbatim_expr(node, source);
    };
    let op = match text(*operator, source) {
        "in" => CmpOp::In,
        "not in" => CmpOp::NotIn,
        other => CmpOp::Other(other.to_string()),
    };
    Expr::new(
        line_of(node),
        ExprKind::Compare {
            left: Box::new(lower_expr(*left, source)),
            op,
            right: Box::new(lower_expr(*right, source)),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_parses_to_empty_module() {
        let module = parse_module("").unwrap();
        assert!(module.body.is_empty());
    }

    #[test]
    fn assignment_lowers_to_typed_nodes() {
        let module = parse_module("names = [\"a\", \"b\"]\n").unwrap();
        assert_eq!(module.body.len(), 1);
        let StmtKind::Assign { target, value } = &module.body[0].kind else {
            panic!("expected assignment, got {:?}", module.body[0].kind);
        };
        assert_eq!(target.as_name(), Some("names"));
        assert!(matches!(&value.kind, ExprKind::List(items) if items.len() == 2));
    }

    #[test]
    fn membership_condition_lowers_to_compare_in() {
        let module = parse_module("if x in names:\n    pass\n").unwrap();
        let StmtKind::If { test, body, .. } = &module.body[0].kind else {
            panic!("expected if statement");
        };
        let ExprKind::Compare { op, right, .. } = &test.kind else {
            panic!("expected comparison");
        };
        assert_eq!(*op, CmpOp::In);
        assert_eq!(right.as_name(), Some("names"));
        assert!(matches!(body[0].kind, StmtKind::Pass));
    }

    #[test]
    fn invalid_source_fails_with_position() {
        let err = parse_module("def broken(:\n").unwrap_err();
        match err {
            ParseError::Syntax { line, .. } => assert_eq!(line, 1),
            other => panic!("expected syntax error, got {other}"),
        }
    }

    #[test]
    fn unsupported_statement_becomes_verbatim() {
        let module = parse_module("try:\n    pass\nexcept ValueError:\n    pass\n").unwrap();
        assert!(matches!(&module.body[0].kind, StmtKind::Verbatim(text) if text.starts_with("try:")));
    }

    #[test]
    fn elif_chain_nests_in_orelse() {
        let source = "if a:\n    pass\nelif b:\n    pass\nelse:\n    pass\n";
        let module = parse_module(source).unwrap();
        let StmtKind::If { orelse, .. } = &module.body[0].kind else {
            panic!("expected if statement");
        };
        assert_eq!(orelse.len(), 1);
        let StmtKind::If { orelse: tail, .. } = &orelse[0].kind else {
            panic!("expected nested elif");
        };
        assert_eq!(tail.len(), 1);
    }

    #[test]
    fn decorated_class_keeps_decorator_names() {
        let module = parse_module("@dataclass\nclass Point:\n    pass\n").unwrap();
        let StmtKind::ClassDef {
            name, decorators, ..
        } = &module.body[0].kind
        else {
            panic!("expected class definition");
        };
        assert_eq!(name, "Point");
        assert_eq!(decorators, &["dataclass".to_string()]);
    }
}
