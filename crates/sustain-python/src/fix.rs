//! Auto-fixer: structural rewrites of a freshly parsed tree.
//!
//! Independent of the detector — rewriting mutates the tree, so this
//! pass re-walks the module with its own minimal context tracking and
//! exact structural preconditions. A rule either matches its shape
//! completely or leaves the code untouched; applying the fixer to its
//! own output reports `changed == false`.
//!
//! Rewrites:
//! 1. `if x in name` (name not a set) — inject `_name_set = set(name)`
//!    and test against the new binding
//! 2. `q.pop(0)` → `q.popleft()` (plus deque import)
//! 3. `q = [...]` → `q = deque([...])` for names flagged by rule 2
//! 4. `for k in d.keys():` → `for k in d:`
//! 5. `for k, v in it: d[k] = v` → `d = {k: v for k, v in it}`
//! 6. `list(set(x))` / `set(list(x))` → `set(x)`
//! 7. `reversed(list(x))` → `reversed(x)`
//! 8. bare `OrderedDict()` → `{}`

use std::collections::{BTreeSet, HashMap, HashSet};
use std::mem;

use tracing::debug;

use crate::ast::{CmpOp, Expr, ExprKind, Module, Stmt, StmtKind};
use crate::codegen::{emit_expr, emit_module};
use crate::parse::{parse_module, ParseError};

const DEQUE_IMPORT: &str = "from collections import deque";

// ============================================================================
// Output
// ============================================================================

/// Result of one auto-fix invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// The rewritten source text (normalized whitespace).
    pub source: String,
    /// Whether any rewrite rule fired.
    pub changed: bool,
    /// Import lines that were prepended because a rewrite requires them.
    pub imports_added: Vec<String>,
}

/// Rewrite the source, applying every fix rule whose structural
/// precondition matches exactly.
pub fn autofix(source: &str) -> Result<FixOutcome, ParseError> {
    let mut module = parse_module(source)?;
    let mut fixer = Fixer::default();
    fixer.run(&mut module);
    let imports_added = fixer.prepend_imports(&mut module);
    debug!(changed = fixer.changed, "auto-fix pass complete");
    Ok(FixOutcome {
        source: emit_module(&module),
        changed: fixer.changed,
        imports_added,
    })
}

// ============================================================================
// Fix Plans and Context
// ============================================================================

/// A pending `_name_set = set(name)` injection.
struct SetInjection {
    name: String,
    /// Top-level statement index to insert after; `None` means the top
    /// of the module.
    insert_after: Option<usize>,
}

/// Per-invocation rewrite state; freshly allocated per `autofix` call.
#[derive(Default)]
struct Fixer {
    /// Names currently bound to a set literal or `set(...)` result.
    known_sets: HashSet<String>,
    /// Most recent top-level assignment per simple name; injected set
    /// bindings go right after the anchor so the name is in scope.
    anchors: HashMap<String, usize>,
    /// Names whose `.pop(0)` calls were rewritten and that must become
    /// deques.
    deque_vars: HashSet<String>,
    /// Names bound to a non-set value inside a nested scope; membership
    /// tests on these get no injected module-level binding.
    nested_bindings: HashSet<String>,
    injections: Vec<SetInjection>,
    injected: HashSet<String>,
    imports: BTreeSet<&'static str>,
    changed: bool,
}

impl Fixer {
    fn run(&mut self, module: &mut Module) {
        // Phase 1: left-to-right rewrite pass, tracking context as it
        // goes. Tracking looks at the statement after its own rewrites,
        // so a collapsed `list(set(x))` already counts as a set binding.
        for index in 0..module.body.len() {
            let mut stmt = mem::replace(&mut module.body[index], Stmt::new(0, StmtKind::Pass));
            self.fix_stmt(&mut stmt);
            self.track_top_level_assign(&stmt, index);
            module.body[index] = stmt;
        }

        // Phase 2: wrap list-literal bindings of names flagged for
        // popleft conversion.
        for stmt in &mut module.body {
            self.convert_list_to_deque(stmt);
        }

        // Phase 3: splice in the planned set bindings, bottom-up so the
        // recorded indices stay valid.
        let mut injections = mem::take(&mut self.injections);
        injections.sort_by_key(|plan| std::cmp::Reverse(insert_index(plan)));
        for plan in injections {
            let at = insert_index(&plan);
            let name = &plan.name;
            let binding = Stmt::new(
                0,
                StmtKind::Assign {
                    target: Expr::new(0, ExprKind::Name(format!("_{name}_set"))),
                    value: Expr::new(
                        0,
                        ExprKind::Call {
                            func: Box::new(Expr::new(0, ExprKind::Name("set".to_string()))),
                            args: vec![Expr::new(0, ExprKind::Name(name.clone()))],
                        },
                    ),
                },
            );
            module.body.insert(at, binding);
        }
    }

    fn track_top_level_assign(&mut self, stmt: &Stmt, index: usize) {
        let StmtKind::Assign { target, value } = &stmt.kind else {
            return;
        };
        let Some(name) = target.as_name() else {
            return;
        };
        if matches!(value.kind, ExprKind::Set(_)) || value.is_call_to("set") {
            self.known_sets.insert(name.to_string());
        }
        self.anchors.insert(name.to_string(), index);
    }

    // ------------------------------------------------------------------
    // Statement Rewrites
    // ------------------------------------------------------------------

    fn fix_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Assign { value, .. } => self.fix_expr(value),
            StmtKind::Expr(expr) => self.fix_expr(expr),
            StmtKind::If { test, body, orelse } => {
                self.rewrite_membership(test);
                self.fix_expr(test);
                self.fix_block(body);
                self.fix_block(orelse);
            }
            StmtKind::For { .. } => self.fix_for(stmt),
            StmtKind::While { test, body } => {
                self.fix_expr(test);
                self.fix_block(body);
            }
            StmtKind::FunctionDef { body, .. } | StmtKind::ClassDef { body, .. } => {
                self.fix_block(body)
            }
            StmtKind::Return(Some(value)) => self.fix_expr(value),
            StmtKind::Return(None)
            | StmtKind::Import(_)
            | StmtKind::Pass
            | StmtKind::Verbatim(_) => {}
        }
    }

    fn fix_block(&mut self, body: &mut [Stmt]) {
        for stmt in body {
            self.fix_stmt(stmt);
            self.track_nested_assign(stmt);
        }
    }

    /// Assignments inside function/class/loop bodies update the
    /// known-set table like top-level ones, but never become injection
    /// anchors. The top-level loop does not reach here.
    fn track_nested_assign(&mut self, stmt: &Stmt) {
        let StmtKind::Assign { target, value } = &stmt.kind else {
            return;
        };
        let Some(name) = target.as_name() else {
            return;
        };
        if matches!(value.kind, ExprKind::Set(_)) || value.is_call_to("set") {
            self.known_sets.insert(name.to_string());
        } else {
            self.nested_bindings.insert(name.to_string());
        }
    }

    /// Rules 4 and 5, then the generic walk.
    fn fix_for(&mut self, stmt: &mut Stmt) {
        if self.rewrite_manual_dict_loop(stmt) {
            return;
        }
        let StmtKind::For { iter, body, .. } = &mut stmt.kind else {
            return;
        };
        self.rewrite_keys_loop(iter);
        self.fix_expr(iter);
        self.fix_block(body);
    }

    /// Rule 4: `for k in d.keys():` → `for k in d:`.
    fn rewrite_keys_loop(&mut self, iter: &mut Expr) {
        let ExprKind::Call { func, args } = &iter.kind else {
            return;
        };
        if !args.is_empty() {
            return;
        }
        let ExprKind::Attribute { value, attr } = &func.kind else {
            return;
        };
        if attr != "keys" || value.as_name().is_none() {
            return;
        }
        debug!("rewriting dict.keys() loop");
        *iter = (**value).clone();
        self.changed = true;
    }

    /// Rule 5: the exact shape `for k, v in it: d[k] = v`.
    fn rewrite_manual_dict_loop(&mut self, stmt: &mut Stmt) -> bool {
        let StmtKind::For { target, iter, body } = &stmt.kind else {
            return false;
        };
        let ExprKind::Tuple(loop_vars) = &target.kind else {
            return false;
        };
        let [key_var, value_var] = loop_vars.as_slice() else {
            return false;
        };
        let (Some(key), Some(value)) = (key_var.as_name(), value_var.as_name()) else {
            return false;
        };
        let [Stmt {
            kind:
                StmtKind::Assign {
                    target: assign_target,
                    value: assign_value,
                },
            ..
        }] = body.as_slice()
        else {
            return false;
        };
        let ExprKind::Subscript {
            value: dict_expr,
            index,
        } = &assign_target.kind
        else {
            return false;
        };
        let Some(dict_name) = dict_expr.as_name() else {
            return false;
        };
        if index.as_name() != Some(key) || assign_value.as_name() != Some(value) {
            return false;
        }

        debug!(dict = dict_name, "rewriting manual dict loop to comprehension");
        let comp = format!("{{{key}: {value} for {key}, {value} in {}}}", emit_expr(iter));
        let line = stmt.line;
        stmt.kind = StmtKind::Assign {
            target: Expr::new(line, ExprKind::Name(dict_name.to_string())),
            value: Expr::new(line, ExprKind::DictComp(comp)),
        };
        self.changed = true;
        true
    }

    /// Rule 1: membership test against a non-set name.
    fn rewrite_membership(&mut self, test: &mut Expr) {
        let ExprKind::Compare {
            op: CmpOp::In,
            right,
            ..
        } = &mut test.kind
        else {
            return;
        };
        let Some(name) = right.as_name().map(str::to_string) else {
            return;
        };
        if self.known_sets.contains(&name) {
            return;
        }
        // A name bound only in a nested scope is not visible where the
        // injected binding would land.
        if !self.anchors.contains_key(&name) && self.nested_bindings.contains(&name) {
            return;
        }
        debug!(name, "rewriting membership test to set lookup");
        let set_name = format!("_{name}_set");
        if self.injected.insert(name.clone()) {
            self.injections.push(SetInjection {
                insert_after: self.anchors.get(&name).copied(),
                name,
            });
        }
        // The injected binding holds a set; later tests reuse it.
        self.known_sets.insert(set_name.clone());
        right.kind = ExprKind::Name(set_name);
        self.changed = true;
    }

    /// Rule 3: wrap the list literal of a popleft-converted name.
    fn convert_list_to_deque(&mut self, stmt: &mut Stmt) {
        let StmtKind::Assign { target, value } = &mut stmt.kind else {
            return;
        };
        let Some(name) = target.as_name() else {
            return;
        };
        if !self.deque_vars.contains(name) || !matches!(value.kind, ExprKind::List(_)) {
            return;
        }
        debug!(name, "converting list literal to deque");
        let line = value.line;
        let literal = mem::replace(&mut value.kind, ExprKind::Verbatim(String::new()));
        value.kind = ExprKind::Call {
            func: Box::new(Expr::new(line, ExprKind::Name("deque".to_string()))),
            args: vec![Expr::new(line, literal)],
        };
        self.imports.insert(DEQUE_IMPORT);
        self.changed = true;
    }

    // ------------------------------------------------------------------
    // Expression Rewrites
    // ------------------------------------------------------------------

    /// Apply the expression-level rules to this node until none fires,
    /// then recurse. The fixpoint loop keeps nested matches (for example
    /// `list(set(list(x)))`) from surviving into a second invocation.
    fn fix_expr(&mut self, expr: &mut Expr) {
        loop {
            let fired = self.rewrite_pop_zero(expr)
                || self.rewrite_redundant_conversion(expr)
                || self.rewrite_reversed_temp_list(expr)
                || self.rewrite_ordered_dict(expr);
            if !fired {
                break;
            }
        }

        match &mut expr.kind {
            ExprKind::Call { func, args } => {
                self.fix_expr(func);
                for arg in args {
                    self.fix_expr(arg);
                }
            }
            ExprKind::Attribute { value, .. } => self.fix_expr(value),
            ExprKind::Subscript { value, index } => {
                self.fix_expr(value);
                self.fix_expr(index);
            }
            ExprKind::BinOp { left, right, .. } | ExprKind::Compare { left, right, .. } => {
                self.fix_expr(left);
                self.fix_expr(right);
            }
            ExprKind::Paren(inner) => self.fix_expr(inner),
            ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Set(items) => {
                for item in items {
                    self.fix_expr(item);
                }
            }
            ExprKind::Dict(pairs) => {
                for (key, value) in pairs {
                    self.fix_expr(key);
                    self.fix_expr(value);
                }
            }
            ExprKind::Name(_)
            | ExprKind::Literal(_)
            | ExprKind::ListComp(_)
            | ExprKind::DictComp(_)
            | ExprKind::Verbatim(_) => {}
        }
    }

    /// Rule 2: `q.pop(0)` → `q.popleft()`.
    fn rewrite_pop_zero(&mut self, expr: &mut Expr) -> bool {
        let ExprKind::Call { func, args } = &mut expr.kind else {
            return false;
        };
        let ExprKind::Attribute { value, attr } = &mut func.kind else {
            return false;
        };
        if attr != "pop" {
            return false;
        }
        let Some(name) = value.as_name() else {
            return false;
        };
        let is_pop_zero = matches!(
            args.as_slice(),
            [Expr {
                kind: ExprKind::Literal(text),
                ..
            }] if text == "0"
        );
        if !is_pop_zero {
            return false;
        }
        debug!(name, "rewriting pop(0) to popleft()");
        self.deque_vars.insert(name.to_string());
        self.imports.insert(DEQUE_IMPORT);
        *attr = "popleft".to_string();
        args.clear();
        self.changed = true;
        true
    }

    /// Rule 6: `list(set(x))` / `set(list(x))` → `set(x)`.
    fn rewrite_redundant_conversion(&mut self, expr: &mut Expr) -> bool {
        let ExprKind::Call { func, args } = &expr.kind else {
            return false;
        };
        let Some(outer) = func.as_name() else {
            return false;
        };
        if !matches!(outer, "list" | "set") {
            return false;
        }
        let [arg] = args.as_slice() else {
            return false;
        };
        let ExprKind::Call {
            func: inner_func,
            args: inner_args,
        } = &arg.kind
        else {
            return false;
        };
        let Some(inner) = inner_func.as_name() else {
            return false;
        };
        let redundant = (outer == "list" && inner == "set") || (outer == "set" && inner == "list");
        let [inner_arg] = inner_args.as_slice() else {
            return false;
        };
        if !redundant {
            return false;
        }
        debug!(outer, inner, "collapsing redundant conversion");
        let line = expr.line;
        expr.kind = ExprKind::Call {
            func: Box::new(Expr::new(line, ExprKind::Name("set".to_string()))),
            args: vec![inner_arg.clone()],
        };
        self.changed = true;
        true
    }

    /// Rule 7: `reversed(list(x))` → `reversed(x)`.
    fn rewrite_reversed_temp_list(&mut self, expr: &mut Expr) -> bool {
        let ExprKind::Call { func, args } = &mut expr.kind else {
            return false;
        };
        if func.as_name() != Some("reversed") {
            return false;
        }
        let [arg] = args.as_mut_slice() else {
            return false;
        };
        let ExprKind::Call {
            func: inner_func,
            args: inner_args,
        } = &mut arg.kind
        else {
            return false;
        };
        if inner_func.as_name() != Some("list") {
            return false;
        }
        let [inner_arg] = inner_args.as_mut_slice() else {
            return false;
        };
        debug!("collapsing reversed(list(...))");
        let unwrapped = mem::replace(inner_arg, Expr::new(0, ExprKind::Verbatim(String::new())));
        *arg = unwrapped;
        self.changed = true;
        true
    }

    /// Rule 8: bare `OrderedDict()` → `{}`.
    fn rewrite_ordered_dict(&mut self, expr: &mut Expr) -> bool {
        let ExprKind::Call { func, args } = &expr.kind else {
            return false;
        };
        if func.as_name() != Some("OrderedDict") || !args.is_empty() {
            return false;
        }
        debug!("replacing empty OrderedDict() with dict literal");
        expr.kind = ExprKind::Dict(Vec::new());
        self.changed = true;
        true
    }

    // ------------------------------------------------------------------
    // Imports
    // ------------------------------------------------------------------

    fn prepend_imports(&mut self, module: &mut Module) -> Vec<String> {
        let mut added = Vec::new();
        for import in mem::take(&mut self.imports) {
            let present = module
                .body
                .iter()
                .any(|stmt| matches!(&stmt.kind, StmtKind::Import(line) if line.trim() == import));
            if present {
                continue;
            }
            module
                .body
                .insert(0, Stmt::new(0, StmtKind::Import(import.to_string())));
            added.push(import.to_string());
        }
        added
    }
}

fn insert_index(plan: &SetInjection) -> usize {
    plan.insert_after.map_or(0, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_code_reports_unchanged() {
        let outcome = autofix("print('hello')\n").unwrap();
        assert!(!outcome.changed);
        assert!(outcome.imports_added.is_empty());
        assert_eq!(outcome.source, "print('hello')\n");
    }

    #[test]
    fn nested_redundant_conversion_collapses_in_one_pass() {
        let outcome = autofix("x = list(set(list(y)))\n").unwrap();
        assert_eq!(outcome.source, "x = set(y)\n");
        let second = autofix(&outcome.source).unwrap();
        assert!(!second.changed);
    }

    #[test]
    fn ordered_dict_in_argument_position_is_replaced() {
        let outcome = autofix("init(OrderedDict())\n").unwrap();
        assert_eq!(outcome.source, "init({})\n");
    }

    #[test]
    fn pop_with_nonzero_index_is_left_alone() {
        let outcome = autofix("q.pop(1)\n").unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.source, "q.pop(1)\n");
    }
}
