//! Pattern detection: a single read-only pre-order pass over the typed
//! AST that records data-structure usage and inefficient idioms.
//!
//! All traversal state lives in a [`DetectContext`] scoped to one
//! `detect` call. Names become "known sets"/"known deques" at the moment
//! their defining assignment is visited; later uses consult the context
//! as it stands, never future assignments.

use std::collections::HashSet;

use tracing::debug;

use sustain_core::{Category, DetectionRecord, UsageContext};

use crate::ast::{CmpOp, Expr, ExprKind, Stmt, StmtKind};
use crate::parse::{parse_module, ParseError};

// ============================================================================
// Entry Point
// ============================================================================

/// Analyze Python source and return detection records in
/// first-encountered order.
pub fn detect(source: &str) -> Result<Vec<DetectionRecord>, ParseError> {
    let module = parse_module(source)?;
    let mut detector = Detector::default();
    detector.walk_block(&module.body);
    debug!(records = detector.records.len(), "detection pass complete");
    Ok(detector.records)
}

// ============================================================================
// Traversal Context
// ============================================================================

/// Per-invocation traversal state; freshly allocated per `detect` call.
#[derive(Debug, Default)]
struct DetectContext {
    known_sets: HashSet<String>,
    known_deques: HashSet<String>,
}

#[derive(Default)]
struct Detector {
    ctx: DetectContext,
    records: Vec<DetectionRecord>,
}

impl Detector {
    fn record(&mut self, record: DetectionRecord) {
        self.records.push(record);
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn walk_block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.walk_stmt(stmt);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assign { target, value } => self.walk_assign(stmt.line, target, value),
            StmtKind::Expr(expr) => self.walk_expr(expr),
            StmtKind::If { test, body, orelse } => {
                self.check_membership_test(test);
                self.walk_expr(test);
                self.walk_block(body);
                self.walk_block(orelse);
            }
            StmtKind::For { target, iter, body } => {
                self.check_dict_view_loop(stmt.line, iter);
                self.check_manual_dict_loop(body);
                self.walk_expr(target);
                self.walk_expr(iter);
                self.walk_block(body);
            }
            StmtKind::While { test, body } => {
                self.walk_expr(test);
                self.walk_block(body);
            }
            StmtKind::FunctionDef { body, .. } => self.walk_block(body),
            StmtKind::ClassDef {
                name,
                decorators,
                body,
                ..
            } => {
                self.check_class_def(stmt.line, name, decorators);
                self.walk_block(body);
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.walk_expr(value);
                }
            }
            StmtKind::Import(_) | StmtKind::Pass | StmtKind::Verbatim(_) => {}
        }
    }

    fn walk_assign(&mut self, line: u32, target: &Expr, value: &Expr) {
        // `store[key] = store.get(key, 0) + 1`
        if is_manual_counter_value(value) {
            self.record(
                DetectionRecord::new(
                    line,
                    Category::Dict,
                    "Manual counter pattern (dict.get + 1).",
                )
                .with_context(UsageContext::ManualCounter),
            );
        }

        if let Some(name) = target.as_name() {
            let is_set_binding =
                matches!(value.kind, ExprKind::Set(_)) || value.is_call_to("set");
            if is_set_binding {
                debug!(name, "registered known set");
                self.ctx.known_sets.insert(name.to_string());
            }
            if value.is_call_to("deque") {
                debug!(name, "registered known deque");
                self.ctx.known_deques.insert(name.to_string());
            }
        }

        self.walk_expr(value);
    }

    // ------------------------------------------------------------------
    // Contextual Checks
    // ------------------------------------------------------------------

    fn check_membership_test(&mut self, test: &Expr) {
        let ExprKind::Compare {
            op: CmpOp::In,
            right,
            ..
        } = &test.kind
        else {
            return;
        };
        let efficient = matches!(right.kind, ExprKind::Set(_))
            || right
                .as_name()
                .is_some_and(|name| self.ctx.known_sets.contains(name));
        let collection = right.as_name().unwrap_or("collection");
        let (category, note) = if efficient {
            (Category::Set, "efficient — using set")
        } else {
            (Category::List, "consider using a set")
        };
        self.record(
            DetectionRecord::new(
                test.line,
                category,
                format!("Membership test on {collection} ({note})."),
            )
            .with_context(UsageContext::MembershipTest)
            .with_efficiency(efficient),
        );
    }

    fn check_dict_view_loop(&mut self, line: u32, iter: &Expr) {
        let ExprKind::Call { func, .. } = &iter.kind else {
            return;
        };
        let ExprKind::Attribute { value, attr } = &func.kind else {
            return;
        };
        if value.as_name().is_some() && matches!(attr.as_str(), "keys" | "values" | "items") {
            self.record(
                DetectionRecord::new(
                    line,
                    Category::Dict,
                    format!("Iteration over dict.{attr}() detected."),
                )
                .with_context(UsageContext::DictKeysLoop),
            );
        }
    }

    fn check_manual_dict_loop(&mut self, body: &[Stmt]) {
        let [Stmt {
            line,
            kind: StmtKind::Assign { target, .. },
        }] = body
        else {
            return;
        };
        let ExprKind::Subscript { value, .. } = &target.kind else {
            return;
        };
        let Some(name) = value.as_name() else {
            return;
        };
        self.record(
            DetectionRecord::new(
                *line,
                Category::Dict,
                format!("Manual dict built via loop to `{name}`."),
            )
            .with_context(UsageContext::ManualDictLoop),
        );
    }

    fn check_class_def(&mut self, line: u32, name: &str, decorators: &[String]) {
        let lowered = name.to_lowercase();
        let user_defined = if lowered.contains("stack") {
            Some((Category::UserStack, "LIFO structure."))
        } else if lowered.contains("queue") {
            Some((Category::UserQueue, "FIFO structure."))
        } else if lowered.contains("linkedlist") {
            Some((Category::UserLinkedList, "Custom linked list."))
        } else if lowered.contains("tree") {
            Some((Category::UserTree, "Custom tree structure."))
        } else if lowered.contains("graph") {
            Some((Category::UserGraph, "Custom graph structure."))
        } else {
            None
        };
        if let Some((category, detail)) = user_defined {
            self.record(DetectionRecord::new(line, category, detail));
        }
        if decorators.iter().any(|d| d == "dataclass") {
            self.record(DetectionRecord::new(
                line,
                Category::DataClass,
                "Structured data container (Python 3.7+).",
            ));
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn walk_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::List(items) => {
                self.record(DetectionRecord::new(
                    expr.line,
                    Category::List,
                    "Ordered, mutable, allows duplicates.",
                ));
                self.walk_all(items);
            }
            ExprKind::Tuple(items) => {
                self.record(DetectionRecord::new(
                    expr.line,
                    Category::Tuple,
                    "Ordered, immutable, allows duplicates.",
                ));
                self.walk_all(items);
            }
            ExprKind::Set(items) => {
                self.record(DetectionRecord::new(
                    expr.line,
                    Category::Set,
                    "Unordered, mutable, no duplicates.",
                ));
                self.walk_all(items);
            }
            ExprKind::Dict(pairs) => {
                self.record(DetectionRecord::new(
                    expr.line,
                    Category::Dict,
                    "Key-value pairs, mutable, ordered since Python 3.7+.",
                ));
                for (key, value) in pairs {
                    self.walk_expr(key);
                    self.walk_expr(value);
                }
            }
            ExprKind::ListComp(_) => {
                self.record(DetectionRecord::new(
                    expr.line,
                    Category::ListComp,
                    "List comprehension (implicit list construction).",
                ));
            }
            ExprKind::Call { func, args } => {
                self.check_call(expr.line, func, args);
                self.walk_expr(func);
                self.walk_all(args);
            }
            ExprKind::Attribute { value, .. } => self.walk_expr(value),
            ExprKind::Subscript { value, index } => {
                self.walk_expr(value);
                self.walk_expr(index);
            }
            ExprKind::BinOp { left, right, .. } | ExprKind::Compare { left, right, .. } => {
                self.walk_expr(left);
                self.walk_expr(right);
            }
            ExprKind::Paren(inner) => self.walk_expr(inner),
            ExprKind::Name(_)
            | ExprKind::Literal(_)
            | ExprKind::DictComp(_)
            | ExprKind::Verbatim(_) => {}
        }
    }

    fn walk_all(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.walk_expr(expr);
        }
    }

    fn check_call(&mut self, line: u32, func: &Expr, args: &[Expr]) {
        match &func.kind {
            ExprKind::Name(name) => {
                self.check_constructor(line, name);
                self.check_redundant_conversion(line, name, args);
                self.check_reversed_temp_list(line, name, args);
            }
            ExprKind::Attribute { value, attr } => {
                self.check_module_call(line, value, attr);
                self.check_queue_attr(line, value, attr);
            }
            _ => {}
        }
    }

    fn check_constructor(&mut self, line: u32, name: &str) {
        let record = match name {
            "deque" => Some((Category::Deque, "Fast queue operations (collections.deque).")),
            "Counter" => Some((Category::Counter, "Counts elements (collections.Counter).")),
            "OrderedDict" => Some((
                Category::OrderedDict,
                "Preserves insertion order (collections.OrderedDict).",
            )),
            "defaultdict" => Some((
                Category::DefaultDict,
                "Auto-initialising dictionary (collections.defaultdict).",
            )),
            "frozenset" => Some((Category::FrozenSet, "Immutable set, hashable.")),
            "namedtuple" => Some((
                Category::NamedTuple,
                "Lightweight immutable object with named fields.",
            )),
            "heapq" | "heappush" | "heappop" => Some((
                Category::PriorityQueue,
                "Heap-based priority queue (heapq module).",
            )),
            _ => None,
        };
        if let Some((category, detail)) = record {
            self.record(DetectionRecord::new(line, category, detail));
        }
    }

    fn check_module_call(&mut self, line: u32, value: &Expr, attr: &str) {
        let Some(module) = value.as_name() else {
            return;
        };
        if module == "heapq" && matches!(attr, "heappush" | "heappop") {
            self.record(DetectionRecord::new(
                line,
                Category::PriorityQueue,
                "Heap-based priority queue (heapq).",
            ));
        }
        if module == "array" && attr == "array" {
            self.record(DetectionRecord::new(
                line,
                Category::Array,
                "Memory-efficient array (array.array).",
            ));
        }
    }

    /// `.append`/`.pop`/`.popleft`/`.appendleft` on a simple name: fine on
    /// a known deque, a queue-like smell on anything else.
    fn check_queue_attr(&mut self, line: u32, value: &Expr, attr: &str) {
        if !matches!(attr, "append" | "pop" | "popleft" | "appendleft") {
            return;
        }
        let Some(name) = value.as_name() else {
            return;
        };
        let efficient = self.ctx.known_deques.contains(name);
        let (category, detail) = if efficient {
            (
                Category::Deque,
                format!("{attr} usage detected (efficient — using deque)."),
            )
        } else {
            (
                Category::List,
                format!("{attr} usage detected (may indicate inefficient queue use)."),
            )
        };
        self.record(
            DetectionRecord::new(line, category, detail)
                .with_context(UsageContext::AppendOrPop)
                .with_efficiency(efficient),
        );
    }

    fn check_redundant_conversion(&mut self, line: u32, outer: &str, args: &[Expr]) {
        if !matches!(outer, "list" | "set") {
            return;
        }
        let [arg] = args else {
            return;
        };
        let ExprKind::Call { func, .. } = &arg.kind else {
            return;
        };
        let Some(inner) = func.as_name() else {
            return;
        };
        let redundant = (outer == "list" && inner == "set") || (outer == "set" && inner == "list");
        if redundant {
            let category = if outer == "list" {
                Category::List
            } else {
                Category::Set
            };
            self.record(
                DetectionRecord::new(
                    line,
                    category,
                    format!("{outer}({inner}(...)) detected — may be redundant."),
                )
                .with_context(UsageContext::RedundantConversion),
            );
        }
    }

    fn check_reversed_temp_list(&mut self, line: u32, name: &str, args: &[Expr]) {
        if name != "reversed" {
            return;
        }
        let [arg] = args else {
            return;
        };
        if arg.is_call_to("list") {
            self.record(
                DetectionRecord::new(
                    line,
                    Category::List,
                    "reversed(list(...)) detected — creates unnecessary temporary list.",
                )
                .with_context(UsageContext::ReversedTempList),
            );
        }
    }
}

fn is_manual_counter_value(value: &Expr) -> bool {
    let ExprKind::BinOp { left, op, .. } = &value.kind else {
        return false;
    };
    if op != "+" {
        return false;
    }
    let ExprKind::Call { func, .. } = &left.kind else {
        return false;
    };
    matches!(&func.kind, ExprKind::Attribute { attr, .. } if attr == "get")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contexts(records: &[DetectionRecord]) -> Vec<Option<UsageContext>> {
        records.iter().map(|r| r.context).collect()
    }

    #[test]
    fn no_patterns_yields_no_records() {
        let records = detect("print('hello')\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn literal_structures_are_recorded() {
        let records = detect("a = [1]\nb = (1, 2)\nc = {1}\nd = {'k': 1}\n").unwrap();
        let categories: Vec<Category> = records.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![Category::List, Category::Tuple, Category::Set, Category::Dict]
        );
    }

    #[test]
    fn membership_on_plain_list_is_inefficient() {
        let source = "names = [\"a\", \"b\"]\nif \"a\" in names:\n    pass\n";
        let records = detect(source).unwrap();
        let membership = records
            .iter()
            .find(|r| r.context == Some(UsageContext::MembershipTest))
            .expect("membership record");
        assert!(!membership.detail.contains("efficient"));
        assert_eq!(membership.efficient, Some(false));
        assert!(membership.detail.contains("names"));
    }

    #[test]
    fn membership_on_known_set_is_efficient() {
        let source = "names = {\"a\", \"b\"}\nif \"a\" in names:\n    pass\n";
        let records = detect(source).unwrap();
        let membership = records
            .iter()
            .find(|r| r.context == Some(UsageContext::MembershipTest))
            .expect("membership record");
        assert!(membership.detail.contains("efficient"));
        assert_eq!(membership.efficient, Some(true));
        assert_eq!(membership.category, Category::Set);
    }

    #[test]
    fn set_constructor_binding_counts_as_known_set() {
        let source = "names = set(load())\nif \"a\" in names:\n    pass\n";
        let records = detect(source).unwrap();
        let membership = records
            .iter()
            .find(|r| r.context == Some(UsageContext::MembershipTest))
            .expect("membership record");
        assert_eq!(membership.efficient, Some(true));
    }

    #[test]
    fn membership_on_set_literal_is_efficient() {
        let records = detect("if x in {1, 2, 3}:\n    pass\n").unwrap();
        assert_eq!(records[0].context, Some(UsageContext::MembershipTest));
        assert_eq!(records[0].efficient, Some(true));
        // The set literal itself is also recorded, after the membership check.
        assert_eq!(records[1].category, Category::Set);
    }

    #[test]
    fn no_backward_inference_for_sets() {
        // The set assignment comes after the test; it must not count.
        let source = "if \"a\" in names:\n    pass\nnames = {\"a\"}\n";
        let records = detect(source).unwrap();
        let membership = records
            .iter()
            .find(|r| r.context == Some(UsageContext::MembershipTest))
            .expect("membership record");
        assert_eq!(membership.efficient, Some(false));
    }

    #[test]
    fn manual_counter_is_detected() {
        let source = "d = {}\nd['x'] = d.get('x', 0) + 1\n";
        let records = detect(source).unwrap();
        assert!(contexts(&records).contains(&Some(UsageContext::ManualCounter)));
    }

    #[test]
    fn list_pop_is_queue_smell_but_deque_is_fine() {
        let source = "q = []\nq.append(1)\nq.pop(0)\n";
        let records = detect(source).unwrap();
        let queue_records: Vec<&DetectionRecord> = records
            .iter()
            .filter(|r| r.context == Some(UsageContext::AppendOrPop))
            .collect();
        assert_eq!(queue_records.len(), 2);
        assert!(queue_records.iter().all(|r| r.category == Category::List));

        let source = "q = deque()\nq.append(1)\nq.popleft()\n";
        let records = detect(source).unwrap();
        let queue_records: Vec<&DetectionRecord> = records
            .iter()
            .filter(|r| r.context == Some(UsageContext::AppendOrPop))
            .collect();
        assert_eq!(queue_records.len(), 2);
        assert!(queue_records.iter().all(|r| r.category == Category::Deque));
        assert!(queue_records.iter().all(|r| r.efficient == Some(true)));
    }

    #[test]
    fn constructors_map_to_their_categories() {
        let source = "a = Counter()\nb = OrderedDict()\nc = defaultdict(int)\n\
                      d = frozenset([1])\ne = namedtuple('P', 'x y')\nf = array.array('i')\n\
                      heapq.heappush(h, 1)\n";
        let records = detect(source).unwrap();
        let categories: Vec<Category> = records.iter().map(|r| r.category).collect();
        assert!(categories.contains(&Category::Counter));
        assert!(categories.contains(&Category::OrderedDict));
        assert!(categories.contains(&Category::DefaultDict));
        assert!(categories.contains(&Category::FrozenSet));
        assert!(categories.contains(&Category::NamedTuple));
        assert!(categories.contains(&Category::Array));
        assert!(categories.contains(&Category::PriorityQueue));
    }

    #[test]
    fn dict_view_loop_is_detected() {
        let records = detect("for k in d.keys():\n    print(k)\n").unwrap();
        let record = records
            .iter()
            .find(|r| r.context == Some(UsageContext::DictKeysLoop))
            .expect("dict view record");
        assert!(record.detail.contains("keys"));
    }

    #[test]
    fn manual_dict_loop_is_detected() {
        let records = detect("for k, v in pairs:\n    d[k] = v\n").unwrap();
        assert!(contexts(&records).contains(&Some(UsageContext::ManualDictLoop)));
    }

    #[test]
    fn two_statement_loop_body_is_not_manual_dict_loop() {
        let records = detect("for k, v in pairs:\n    d[k] = v\n    print(k)\n").unwrap();
        assert!(!contexts(&records).contains(&Some(UsageContext::ManualDictLoop)));
    }

    #[test]
    fn redundant_conversions_are_detected() {
        let records = detect("x = list(set([1, 2, 3]))\n").unwrap();
        assert!(contexts(&records).contains(&Some(UsageContext::RedundantConversion)));

        let records = detect("y = set(list(data))\n").unwrap();
        assert!(contexts(&records).contains(&Some(UsageContext::RedundantConversion)));

        let records = detect("z = reversed(list(data))\n").unwrap();
        assert!(contexts(&records).contains(&Some(UsageContext::ReversedTempList)));
    }

    #[test]
    fn user_defined_classes_are_classified() {
        let source = "class MyStack:\n    pass\nclass TaskQueue:\n    pass\n\
                      class BinaryTree:\n    pass\n";
        let records = detect(source).unwrap();
        let categories: Vec<Category> = records.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![Category::UserStack, Category::UserQueue, Category::UserTree]
        );
    }

    #[test]
    fn dataclass_decorator_is_detected() {
        let records = detect("@dataclass\nclass Point:\n    x: int = 0\n").unwrap();
        assert!(records.iter().any(|r| r.category == Category::DataClass));
    }

    #[test]
    fn syntax_error_surfaces_as_parse_error() {
        assert!(detect("def broken(:\n").is_err());
    }

    #[test]
    fn records_are_ordered_by_first_encounter() {
        let source = "a = [1]\nb = {2}\nif x in b:\n    pass\n";
        let records = detect(source).unwrap();
        let lines: Vec<u32> = records.iter().map(|r| r.line).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }
}
