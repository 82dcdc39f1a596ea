//! End-to-end detection scenarios over real Python snippets.

use sustain_core::{suggest, Category, DetectionRecord, UsageContext};
use sustain_python::detect;

fn detect_ok(source: &str) -> Vec<DetectionRecord> {
    detect(source).expect("source should parse")
}

fn with_context(records: &[DetectionRecord], context: UsageContext) -> Vec<DetectionRecord> {
    records
        .iter()
        .filter(|r| r.context == Some(context))
        .cloned()
        .collect()
}

#[test]
fn membership_test_on_list_flows_through_to_a_set_suggestion() {
    let source = "names = [\"a\", \"b\"]\nif \"a\" in names:\n    print(\"found\")\n";
    let records = detect_ok(source);

    let membership = with_context(&records, UsageContext::MembershipTest);
    assert_eq!(membership.len(), 1);
    assert_eq!(membership[0].line, 2);
    assert_eq!(membership[0].category, Category::List);
    assert_eq!(membership[0].efficient, Some(false));

    let suggestions = suggest(&records);
    let sets: Vec<_> = suggestions
        .iter()
        .filter(|s| s.context == Some(UsageContext::MembershipTest))
        .collect();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].suggestion, "Use a set for membership testing.");
    assert!(sets[0].snippet.is_some());
}

#[test]
fn membership_test_on_set_yields_no_suggestion() {
    let source = "names = {\"a\", \"b\"}\nif \"a\" in names:\n    print(\"found\")\n";
    let records = detect_ok(source);
    let membership = with_context(&records, UsageContext::MembershipTest);
    assert_eq!(membership.len(), 1);
    assert_eq!(membership[0].efficient, Some(true));

    let suggestions = suggest(&records);
    assert!(suggestions
        .iter()
        .all(|s| s.context != Some(UsageContext::MembershipTest)));
}

#[test]
fn manual_counter_pattern_suggests_counter() {
    let source = "counts = {}\nfor word in words:\n    counts[word] = counts.get(word, 0) + 1\n";
    let records = detect_ok(source);
    let counters = with_context(&records, UsageContext::ManualCounter);
    assert_eq!(counters.len(), 1);
    assert_eq!(counters[0].category, Category::Dict);

    let suggestions = suggest(&records);
    let counter_suggestion = suggestions
        .iter()
        .find(|s| s.context == Some(UsageContext::ManualCounter))
        .expect("counter suggestion");
    assert!(counter_suggestion.suggestion.contains("collections.Counter"));
    assert!(counter_suggestion
        .snippet
        .as_deref()
        .is_some_and(|s| s.contains("Counter")));
}

#[test]
fn list_used_as_queue_suggests_deque() {
    let source = "q = []\nq.append(1)\nq.pop(0)\n";
    let records = detect_ok(source);
    let queue_records = with_context(&records, UsageContext::AppendOrPop);
    assert_eq!(queue_records.len(), 2);
    assert!(queue_records.iter().all(|r| r.category == Category::List));
    assert!(queue_records.iter().all(|r| r.efficient == Some(false)));

    let suggestions = suggest(&records);
    let deque_suggestions: Vec<_> = suggestions
        .iter()
        .filter(|s| s.suggestion.contains("deque"))
        .collect();
    assert_eq!(deque_suggestions.len(), 2);
}

#[test]
fn deque_used_as_queue_yields_no_suggestion() {
    let source = "q = deque()\nq.append(1)\nq.popleft()\n";
    let records = detect_ok(source);
    let queue_records = with_context(&records, UsageContext::AppendOrPop);
    assert_eq!(queue_records.len(), 2);
    assert!(queue_records.iter().all(|r| r.efficient == Some(true)));

    let suggestions = suggest(&records);
    assert!(suggestions
        .iter()
        .all(|s| s.context != Some(UsageContext::AppendOrPop)));
}

#[test]
fn redundant_conversion_is_reported_once_with_fix_snippet() {
    let source = "unique = list(set([1, 2, 3]))\n";
    let records = detect_ok(source);
    let redundant = with_context(&records, UsageContext::RedundantConversion);
    assert_eq!(redundant.len(), 1);
    assert_eq!(redundant[0].category, Category::List);
    assert!(redundant[0].detail.contains("list(set(...))"));

    let suggestions = suggest(&records);
    let conversion = suggestions
        .iter()
        .find(|s| s.context == Some(UsageContext::RedundantConversion))
        .expect("conversion suggestion");
    assert!(conversion.suggestion.contains("redundant"));
}

#[test]
fn dict_view_loops_and_manual_dict_loops_are_both_flagged() {
    let source = "for k in config.keys():\n    print(k)\nfor k, v in pairs:\n    lookup[k] = v\n";
    let records = detect_ok(source);
    assert_eq!(with_context(&records, UsageContext::DictKeysLoop).len(), 1);
    assert_eq!(with_context(&records, UsageContext::ManualDictLoop).len(), 1);

    let suggestions = suggest(&records);
    assert!(suggestions.iter().any(|s| s.suggestion.contains("directly")));
    assert!(suggestions
        .iter()
        .any(|s| s.suggestion.contains("comprehension")));
}

#[test]
fn nested_scopes_are_traversed() {
    let source = "def handler(items):\n    seen = []\n    for item in items:\n        if item in seen:\n            continue\n        seen.append(item)\n";
    let records = detect_ok(source);
    let membership = with_context(&records, UsageContext::MembershipTest);
    assert_eq!(membership.len(), 1);
    assert_eq!(membership[0].efficient, Some(false));
    assert!(membership[0].detail.contains("seen"));
}

#[test]
fn clean_code_produces_no_suggestions() {
    let source = "def add(a, b):\n    return a + b\n";
    let records = detect_ok(source);
    assert!(suggest(&records).is_empty());
}
