//! Core record types and rule logic for sustain.
//!
//! This crate is language-agnostic: it defines the stable
//! detection/suggestion record set, the declarative rule engine, the
//! static fix-snippet lookup, the sustainability score, and report
//! rendering. Parsing and tree rewriting live in `sustain-python`.

pub mod report;
pub mod rules;
pub mod score;
pub mod snippets;
pub mod types;

pub use rules::{suggest, Rule, RULES};
pub use score::sustainability_score;
pub use snippets::{fix_snippet, NO_SNIPPET};
pub use types::{Category, DetectionRecord, SuggestionRecord, UsageContext};
