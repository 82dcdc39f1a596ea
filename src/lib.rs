//! sustain: data-structure sustainability analysis for Python code.
//!
//! The root crate is CLI glue over the two library crates:
//! `sustain-core` (records, rules, snippets, score, reports) and
//! `sustain-python` (parsing, detection, auto-fix). Nothing here does
//! analysis of its own.

pub mod cli;
pub mod output;

pub use sustain_core::{
    suggest, sustainability_score, Category, DetectionRecord, SuggestionRecord, UsageContext,
};
pub use sustain_python::{autofix, detect, FixOutcome, ParseError};
