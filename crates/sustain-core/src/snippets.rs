//! Static fix-snippet lookup.
//!
//! Maps a suggestion to a short illustrative code example by keyword
//! substrings in the suggestion text plus the usage-context tag. This is
//! a presentation aid only; snippets are not derived from the code under
//! analysis and are not type-checked against it.

use crate::types::UsageContext;

/// Placeholder returned when no snippet rule matches.
pub const NO_SNIPPET: &str = "# No fix snippet available for this suggestion.";

/// Look up the illustrative snippet for a suggestion, if one exists.
pub fn fix_snippet(suggestion: &str, context: Option<UsageContext>) -> Option<&'static str> {
    let text = suggestion.to_lowercase();

    if text.contains("counter") {
        return Some(
            "from collections import Counter\n\
             counts = Counter()\n\
             counts.update(your_data_here)\n",
        );
    }

    if text.contains("set") && context == Some(UsageContext::MembershipTest) {
        return Some(
            "data = {\"a\", \"b\", \"c\"}  # use a set instead of a list\n\
             if item in data:\n    \
                 print(\"Found\")\n",
        );
    }

    if text.contains("deque") && context == Some(UsageContext::AppendOrPop) {
        return Some(
            "from collections import deque\n\
             queue = deque()\n\
             queue.append(\"item\")\n\
             queue.popleft()\n",
        );
    }

    if text.contains("directly") && context == Some(UsageContext::DictKeysLoop) {
        return Some(
            "my_dict = {\"a\": 1, \"b\": 2}\n\
             for key in my_dict:\n    \
                 print(key)\n",
        );
    }

    if text.contains("redundant") && context == Some(UsageContext::RedundantConversion) {
        return Some(
            "# drop wrapping like list(set(...)) or set(list(...))\n\
             unique_items = set(data)\n",
        );
    }

    if text.contains("comprehension") && context == Some(UsageContext::ManualDictLoop) {
        return Some("result = {k: v for k, v in pairs}\n");
    }

    if text.contains("revers") && context == Some(UsageContext::ReversedTempList) {
        return Some(
            "for item in reversed(data):\n    \
                 print(item)\n",
        );
    }

    if text.contains("plain dict") || text.contains("ordereddict") {
        return Some(
            "ordered = {}\n\
             ordered[\"key\"] = \"value\"  # insertion order is preserved\n",
        );
    }

    if text.contains("defaultdict") {
        return Some(
            "from collections import defaultdict\n\
             d = defaultdict(int)\n\
             d[key] += 1\n",
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_suggestion_has_counter_snippet() {
        let snippet = fix_snippet(
            "Use collections.Counter instead of manual dictionary counting.",
            Some(UsageContext::ManualCounter),
        );
        assert!(snippet.unwrap().contains("Counter()"));
    }

    #[test]
    fn membership_snippet_requires_context() {
        let text = "Use a set for membership testing.";
        assert!(fix_snippet(text, Some(UsageContext::MembershipTest)).is_some());
        assert!(fix_snippet(text, None).is_none());
    }

    #[test]
    fn deque_snippet_shows_popleft() {
        let snippet = fix_snippet(
            "Consider using collections.deque for queue operations.",
            Some(UsageContext::AppendOrPop),
        );
        assert!(snippet.unwrap().contains("popleft"));
    }

    #[test]
    fn unknown_suggestion_has_no_snippet() {
        assert!(fix_snippet("Rewrite everything in assembly.", None).is_none());
    }
}
