//! CLI command implementations.
//!
//! Thin glue: read the file, call the core, render the result. Parse
//! failures surface as errors; the binary maps them to a non-zero exit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use sustain_core::{report, suggest, sustainability_score};
use sustain_python::{autofix, detect, ParseError};

use crate::output::{AnalysisOutput, FixOutput};

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file could not be read or output could not be written.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input is not valid Python.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn read_input(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(path: &Path, contents: &str) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Commands
// ============================================================================

/// Options for `sustain analyze`.
#[derive(Debug, Default)]
pub struct AnalyzeOptions {
    /// Write a Markdown report here.
    pub report: Option<PathBuf>,
    /// Write detection/suggestion CSV rows here.
    pub export_csv: Option<PathBuf>,
}

/// Analyze one file: detect, suggest, score, and optionally write the
/// report and CSV side outputs.
pub fn run_analyze(input: &Path, options: &AnalyzeOptions) -> Result<AnalysisOutput, CliError> {
    let source = read_input(input)?;
    let detections = detect(&source)?;
    let suggestions = suggest(&detections);
    let score = sustainability_score(suggestions.len());
    info!(
        file = %input.display(),
        detections = detections.len(),
        suggestions = suggestions.len(),
        score,
        "analysis complete"
    );

    if let Some(report_path) = &options.report {
        let markdown = report::markdown_report(&suggestions, Some(score));
        write_output(report_path, &markdown)?;
    }
    if let Some(csv_path) = &options.export_csv {
        let csv = report::csv_rows(&detections, &suggestions);
        write_output(csv_path, &csv)?;
    }

    Ok(AnalysisOutput {
        file: input.display().to_string(),
        score,
        detections,
        suggestions,
    })
}

/// Auto-fix one file, optionally writing the result back in place or to
/// a separate path.
pub fn run_fix(
    input: &Path,
    write: bool,
    output: Option<&Path>,
) -> Result<FixOutput, CliError> {
    let source = read_input(input)?;
    let outcome = autofix(&source)?;
    info!(
        file = %input.display(),
        changed = outcome.changed,
        "auto-fix complete"
    );

    if let Some(output_path) = output {
        write_output(output_path, &outcome.source)?;
    } else if write && outcome.changed {
        write_output(input, &outcome.source)?;
    }

    Ok(FixOutput {
        file: input.display().to_string(),
        changed: outcome.changed,
        imports_added: outcome.imports_added,
        source: outcome.source,
    })
}
