//! Stable record types shared between the detector, the rule engine,
//! and downstream renderers (text, JSON, Markdown, CSV).
//!
//! These two record shapes — [`DetectionRecord`] and [`SuggestionRecord`] —
//! are the contract the report generators depend on verbatim, so field
//! names and serialization are kept deliberately boring.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Structure Categories
// ============================================================================

/// The kind of data structure (or structure-shaped construct) a detection
/// refers to.
///
/// This is a closed set: a construct the detector does not recognize is
/// simply not recorded, there is no catch-all variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    List,
    Tuple,
    Set,
    Dict,
    ListComp,
    Deque,
    Counter,
    OrderedDict,
    DefaultDict,
    FrozenSet,
    NamedTuple,
    Array,
    PriorityQueue,
    UserStack,
    UserQueue,
    UserLinkedList,
    UserTree,
    UserGraph,
    DataClass,
}

impl Category {
    /// Human-readable label used in reports and CSV rows.
    pub fn label(&self) -> &'static str {
        match self {
            Category::List => "List",
            Category::Tuple => "Tuple",
            Category::Set => "Set",
            Category::Dict => "Dictionary",
            Category::ListComp => "List Comprehension",
            Category::Deque => "Deque",
            Category::Counter => "Counter",
            Category::OrderedDict => "OrderedDict",
            Category::DefaultDict => "DefaultDict",
            Category::FrozenSet => "FrozenSet",
            Category::NamedTuple => "NamedTuple",
            Category::Array => "Array",
            Category::PriorityQueue => "Priority Queue",
            Category::UserStack => "User-Defined Stack",
            Category::UserQueue => "User-Defined Queue",
            Category::UserLinkedList => "User-Defined Linked List",
            Category::UserTree => "User-Defined Tree",
            Category::UserGraph => "User-Defined Graph",
            Category::DataClass => "DataClass",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Usage Contexts
// ============================================================================

/// Why a pattern was flagged, as opposed to *what* structure it involves.
///
/// A record without a context tag is a plain structural observation (for
/// example a list literal) that no rule targets directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageContext {
    MembershipTest,
    ManualCounter,
    AppendOrPop,
    DictKeysLoop,
    RedundantConversion,
    ManualDictLoop,
    ReversedTempList,
}

impl UsageContext {
    /// Stable snake_case tag, matching the serialized form.
    pub fn tag(&self) -> &'static str {
        match self {
            UsageContext::MembershipTest => "membership_test",
            UsageContext::ManualCounter => "manual_counter",
            UsageContext::AppendOrPop => "append_or_pop",
            UsageContext::DictKeysLoop => "dict_keys_loop",
            UsageContext::RedundantConversion => "redundant_conversion",
            UsageContext::ManualDictLoop => "manual_dict_loop",
            UsageContext::ReversedTempList => "reversed_temp_list",
        }
    }
}

impl fmt::Display for UsageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================================
// Detection Records
// ============================================================================

/// One recognized structural or idiomatic pattern occurrence.
///
/// Immutable once created; produced only by the detector. Many records may
/// share a line (a single statement can contain several structures).
///
/// The `efficient` field carries the efficient/inefficient verdict
/// explicitly rather than encoded in `detail` text, so consumers never
/// have to re-parse presentation strings. `None` means the distinction
/// does not apply to this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// 1-indexed source line where the pattern starts.
    pub line: u32,
    /// Structural category of the detected pattern.
    pub category: Category,
    /// Human-readable description of the occurrence.
    pub detail: String,
    /// Why the pattern was flagged, when a rule targets it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<UsageContext>,
    /// Explicit efficiency verdict, where the distinction applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficient: Option<bool>,
}

impl DetectionRecord {
    /// Create a plain structural record with no context tag.
    pub fn new(line: u32, category: Category, detail: impl Into<String>) -> Self {
        DetectionRecord {
            line,
            category,
            detail: detail.into(),
            context: None,
            efficient: None,
        }
    }

    /// Attach a usage-context tag.
    pub fn with_context(mut self, context: UsageContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach an explicit efficiency verdict.
    pub fn with_efficiency(mut self, efficient: bool) -> Self {
        self.efficient = Some(efficient);
        self
    }
}

// ============================================================================
// Suggestion Records
// ============================================================================

/// A recommended alternative pattern derived from a [`DetectionRecord`]
/// by exactly one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    /// 1-indexed source line the suggestion applies to.
    pub line: u32,
    /// Category of the structure as currently written.
    pub category: Category,
    /// Usage-context tag of the originating detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<UsageContext>,
    /// The recommended alternative.
    pub suggestion: String,
    /// Why the alternative is better.
    pub explanation: String,
    /// Estimated improvement, as fixed descriptive text.
    pub impact: String,
    /// Illustrative corrected code, when a snippet rule matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}
