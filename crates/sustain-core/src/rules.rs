//! Declarative suggestion rules and the engine that applies them.
//!
//! Each rule is a pure predicate over a [`DetectionRecord`] plus fixed
//! suggestion/explanation/impact text. The engine evaluates every rule
//! against every record: the shipped table is disjoint per context tag,
//! but overlap — were a rule ever added that overlaps — would produce
//! multiple suggestions rather than being silently suppressed.

use tracing::debug;

use crate::snippets::fix_snippet;
use crate::types::{Category, DetectionRecord, SuggestionRecord, UsageContext};

// ============================================================================
// Rule Type
// ============================================================================

/// A condition→suggestion mapping.
///
/// Rules are immutable and order-independent in effect; they are stored
/// in a fixed list only so output ordering is deterministic.
pub struct Rule {
    /// Stable identifier, used in logs.
    pub name: &'static str,
    condition: fn(&DetectionRecord) -> bool,
    /// The recommended alternative.
    pub suggestion: &'static str,
    /// Why the alternative is better.
    pub explanation: &'static str,
    /// Estimated improvement.
    pub impact: &'static str,
}

impl Rule {
    /// Whether this rule applies to the given record.
    pub fn matches(&self, record: &DetectionRecord) -> bool {
        (self.condition)(record)
    }

    fn apply(&self, record: &DetectionRecord) -> Option<SuggestionRecord> {
        if !self.matches(record) {
            return None;
        }
        debug!(rule = self.name, line = record.line, "rule matched");
        Some(SuggestionRecord {
            line: record.line,
            category: record.category,
            context: record.context,
            suggestion: self.suggestion.to_string(),
            explanation: self.explanation.to_string(),
            impact: self.impact.to_string(),
            snippet: fix_snippet(self.suggestion, record.context).map(str::to_string),
        })
    }
}

// ============================================================================
// Rule Conditions
// ============================================================================

fn is_inefficient_membership_test(record: &DetectionRecord) -> bool {
    record.context == Some(UsageContext::MembershipTest) && record.efficient != Some(true)
}

fn is_manual_counter(record: &DetectionRecord) -> bool {
    record.context == Some(UsageContext::ManualCounter)
}

fn is_queue_like_list_usage(record: &DetectionRecord) -> bool {
    record.context == Some(UsageContext::AppendOrPop) && record.efficient != Some(true)
}

fn is_dict_view_loop(record: &DetectionRecord) -> bool {
    record.context == Some(UsageContext::DictKeysLoop)
}

fn is_redundant_conversion(record: &DetectionRecord) -> bool {
    record.context == Some(UsageContext::RedundantConversion)
}

fn is_manual_dict_loop(record: &DetectionRecord) -> bool {
    record.context == Some(UsageContext::ManualDictLoop)
}

fn is_reversed_temp_list(record: &DetectionRecord) -> bool {
    record.context == Some(UsageContext::ReversedTempList)
}

fn is_plain_ordered_dict(record: &DetectionRecord) -> bool {
    record.context.is_none() && record.category == Category::OrderedDict
}

// ============================================================================
// Rule Table
// ============================================================================

/// The canonical rule set, one rule per usage-context tag plus the
/// context-free OrderedDict rule.
pub static RULES: [Rule; 8] = [
    Rule {
        name: "membership-test-on-list",
        condition: is_inefficient_membership_test,
        suggestion: "Use a set for membership testing.",
        explanation: "Sets offer O(1) lookup time compared to O(n) for lists.",
        impact: "Can reduce lookup time and CPU cycles significantly, improving sustainability.",
    },
    Rule {
        name: "manual-counter",
        condition: is_manual_counter,
        suggestion: "Use collections.Counter instead of manual dictionary counting.",
        explanation: "Cleaner, more efficient counting with optimised memory handling.",
        impact: "Reduces repeated memory operations and redundant instructions.",
    },
    Rule {
        name: "queue-like-list",
        condition: is_queue_like_list_usage,
        suggestion: "Consider using collections.deque for queue operations.",
        explanation: "Deques are optimised for appending and popping from both ends.",
        impact: "Reduces unnecessary re-indexing in lists, saving computational effort.",
    },
    Rule {
        name: "dict-view-loop",
        condition: is_dict_view_loop,
        suggestion: "Iterate over the dictionary directly instead of its .keys()/.values()/.items() view.",
        explanation: "Iterating the mapping itself avoids building an intermediate view object.",
        impact: "Removes needless view-object churn from loops.",
    },
    Rule {
        name: "redundant-conversion",
        condition: is_redundant_conversion,
        suggestion: "Remove the redundant list()/set() wrapping.",
        explanation: "Converting between list and set back-to-back does the same work twice.",
        impact: "Halves the conversion cost and the temporary allocations.",
    },
    Rule {
        name: "manual-dict-loop",
        condition: is_manual_dict_loop,
        suggestion: "Build the dictionary with a comprehension or dict(zip(...)).",
        explanation: "A comprehension constructs the mapping in one pass without per-iteration statement overhead.",
        impact: "Cuts interpreter overhead for every inserted key.",
    },
    Rule {
        name: "reversed-temp-list",
        condition: is_reversed_temp_list,
        suggestion: "Avoid materialising a temporary list before reversing.",
        explanation: "reversed() accepts any sequence; the intermediate list is an unnecessary copy.",
        impact: "Saves one full copy of the data per call.",
    },
    Rule {
        name: "plain-ordered-dict",
        condition: is_plain_ordered_dict,
        suggestion: "Prefer a plain dict; OrderedDict is rarely needed since Python 3.7.",
        explanation: "Plain dicts preserve insertion order; OrderedDict only pays off for move_to_end() or order-sensitive equality.",
        impact: "Smaller memory footprint and faster construction.",
    },
];

// ============================================================================
// Engine
// ============================================================================

/// Apply every rule to every detection record, in table order.
///
/// One record may yield zero or more suggestions; with the shipped table
/// at most one rule matches any given record.
pub fn suggest(records: &[DetectionRecord]) -> Vec<SuggestionRecord> {
    let mut suggestions = Vec::new();
    for record in records {
        for rule in &RULES {
            if let Some(suggestion) = rule.apply(record) {
                suggestions.push(suggestion);
            }
        }
    }
    debug!(
        detections = records.len(),
        suggestions = suggestions.len(),
        "rule evaluation complete"
    );
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(context: UsageContext) -> DetectionRecord {
        DetectionRecord::new(1, Category::List, "test").with_context(context)
    }

    #[test]
    fn inefficient_membership_test_matches() {
        let r = record(UsageContext::MembershipTest).with_efficiency(false);
        let suggestions = suggest(&[r]);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].suggestion.contains("set"));
    }

    #[test]
    fn efficient_membership_test_is_ignored() {
        let r = DetectionRecord::new(1, Category::Set, "test")
            .with_context(UsageContext::MembershipTest)
            .with_efficiency(true);
        assert!(suggest(&[r]).is_empty());
    }

    #[test]
    fn manual_counter_suggests_counter() {
        let r = DetectionRecord::new(2, Category::Dict, "manual counter")
            .with_context(UsageContext::ManualCounter);
        let suggestions = suggest(&[r]);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].suggestion.contains("Counter"));
        assert_eq!(suggestions[0].line, 2);
    }

    #[test]
    fn deque_backed_append_is_ignored() {
        let r = DetectionRecord::new(1, Category::Deque, "append on deque")
            .with_context(UsageContext::AppendOrPop)
            .with_efficiency(true);
        assert!(suggest(&[r]).is_empty());
    }

    #[test]
    fn list_backed_pop_suggests_deque() {
        let r = record(UsageContext::AppendOrPop).with_efficiency(false);
        let suggestions = suggest(&[r]);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].suggestion.contains("deque"));
    }

    #[test]
    fn ordered_dict_without_context_matches() {
        let r = DetectionRecord::new(4, Category::OrderedDict, "OrderedDict constructor");
        let suggestions = suggest(&[r]);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].suggestion.contains("plain dict"));
    }

    #[test]
    fn plain_literal_records_yield_nothing() {
        let records = vec![
            DetectionRecord::new(1, Category::List, "list literal"),
            DetectionRecord::new(2, Category::Dict, "dict literal"),
        ];
        assert!(suggest(&records).is_empty());
    }

    #[test]
    fn each_context_tag_matches_exactly_one_rule() {
        let contexts = [
            UsageContext::MembershipTest,
            UsageContext::ManualCounter,
            UsageContext::AppendOrPop,
            UsageContext::DictKeysLoop,
            UsageContext::RedundantConversion,
            UsageContext::ManualDictLoop,
            UsageContext::ReversedTempList,
        ];
        for context in contexts {
            let r = record(context).with_efficiency(false);
            let matching = RULES.iter().filter(|rule| rule.matches(&r)).count();
            assert_eq!(matching, 1, "context {context} should match one rule");
        }
    }
}
