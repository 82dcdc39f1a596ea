//! Output shapes and rendering for the CLI.
//!
//! The JSON envelope is the machine contract; the text renderers are
//! for humans. Both are pure functions over the core record types.

use serde::{Deserialize, Serialize};

use sustain_core::{DetectionRecord, SuggestionRecord, NO_SNIPPET};

/// Full analysis result for one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// Input path, as given on the command line.
    pub file: String,
    /// Aggregate sustainability score (0–100).
    pub score: u8,
    /// Every detected structure and usage pattern, in source order.
    pub detections: Vec<DetectionRecord>,
    /// Rule matches derived from the detections.
    pub suggestions: Vec<SuggestionRecord>,
}

/// Fix result for one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixOutput {
    /// Input path, as given on the command line.
    pub file: String,
    /// Whether any rewrite rule fired.
    pub changed: bool,
    /// Import lines the rewrite added.
    pub imports_added: Vec<String>,
    /// The rewritten source.
    pub source: String,
}

/// Human-readable suggestion listing, one block per suggestion.
pub fn render_suggestions(suggestions: &[SuggestionRecord], verbose: bool) -> String {
    if suggestions.is_empty() {
        return "No suggestions found. Great job!\n".to_string();
    }
    let mut out = String::new();
    for suggestion in suggestions {
        out.push_str(&format!("Line {}: {}\n", suggestion.line, suggestion.suggestion));
        if verbose {
            out.push_str(&format!("  Explanation: {}\n", suggestion.explanation));
            out.push_str(&format!("  Impact: {}\n", suggestion.impact));
            let snippet = suggestion.snippet.as_deref().unwrap_or(NO_SNIPPET);
            out.push_str("  Example fix:\n");
            for line in snippet.trim_end().lines() {
                out.push_str(&format!("    {line}\n"));
            }
        }
    }
    out
}
