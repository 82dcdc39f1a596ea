//! Markdown and CSV rendering of detection and suggestion records.
//!
//! Thin presentation helpers over the stable record types; no analysis
//! logic lives here.

use chrono::Local;

use crate::snippets::NO_SNIPPET;
use crate::types::{DetectionRecord, SuggestionRecord};

// ============================================================================
// Markdown Report
// ============================================================================

/// Render the Markdown sustainability report.
pub fn markdown_report(suggestions: &[SuggestionRecord], score: Option<u8>) -> String {
    let mut lines = Vec::new();

    lines.push("# Data Structure Sustainability Suggestions Report".to_string());
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    lines.push(format!("_Generated on {timestamp}_\n"));

    if let Some(score) = score {
        lines.push(format!("## Sustainability Score: {score}/100\n"));
    }

    if suggestions.is_empty() {
        lines.push("No suggestions found. Great job!\n".to_string());
    } else {
        for suggestion in suggestions {
            lines.push(format!("### Line {}", suggestion.line));
            lines.push(format!("- **Current structure:** {}", suggestion.category));
            if let Some(context) = suggestion.context {
                lines.push(format!("- **Usage context:** {context}"));
            }
            lines.push(format!("- **Suggestion:** {}", suggestion.suggestion));
            lines.push(format!("- **Explanation:** {}", suggestion.explanation));
            lines.push(format!("- **Impact:** {}", suggestion.impact));
            lines.push("- **Example fix:**".to_string());
            lines.push("```python".to_string());
            let snippet = suggestion.snippet.as_deref().unwrap_or(NO_SNIPPET);
            lines.push(snippet.trim_end().to_string());
            lines.push("```\n".to_string());
        }
    }

    lines.join("\n")
}

// ============================================================================
// CSV Export
// ============================================================================

/// Render detections and suggestions as CSV, one row per record.
///
/// Columns: `line,structure_type,details,usage_context,impact_estimate`.
/// Detection rows leave the impact column empty.
pub fn csv_rows(records: &[DetectionRecord], suggestions: &[SuggestionRecord]) -> String {
    let mut out = String::from("line,structure_type,details,usage_context,impact_estimate\n");

    for record in records {
        push_row(
            &mut out,
            record.line,
            record.category.label(),
            &record.detail,
            record.context.map(|c| c.tag()).unwrap_or(""),
            "",
        );
    }
    for suggestion in suggestions {
        push_row(
            &mut out,
            suggestion.line,
            suggestion.category.label(),
            &suggestion.suggestion,
            suggestion.context.map(|c| c.tag()).unwrap_or(""),
            &suggestion.impact,
        );
    }

    out
}

fn push_row(out: &mut String, line: u32, kind: &str, details: &str, context: &str, impact: &str) {
    let fields = [
        line.to_string(),
        escape_csv(kind),
        escape_csv(details),
        escape_csv(context),
        escape_csv(impact),
    ];
    out.push_str(&fields.join(","));
    out.push('\n');
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
