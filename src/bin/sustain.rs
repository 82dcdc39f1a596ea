//! sustain CLI binary entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sustain::cli::{run_analyze, run_fix, AnalyzeOptions};
use sustain::output::render_suggestions;

/// Static analyzer that flags inefficient data-structure idioms in
/// Python code and rewrites a safe subset of them.
#[derive(Parser)]
#[command(name = "sustain")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a Python file and print suggestions.
    Analyze {
        /// Path to the Python file to analyse.
        input: PathBuf,

        /// Save a Markdown report to this path.
        #[arg(long)]
        report: Option<PathBuf>,

        /// Export detection and suggestion data as CSV to this path.
        #[arg(long)]
        export_csv: Option<PathBuf>,

        /// Display the sustainability score.
        #[arg(long)]
        score: bool,

        /// Print explanations, impact estimates, and fix snippets.
        #[arg(long)]
        verbose: bool,

        /// Emit the full analysis as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Rewrite inefficient patterns in a Python file.
    Fix {
        /// Path to the Python file to fix.
        input: PathBuf,

        /// Apply changes to the input file (default: print to stdout).
        #[arg(long)]
        write: bool,

        /// Write the fixed source to this path instead.
        #[arg(long, conflicts_with = "write")]
        output: Option<PathBuf>,

        /// Emit the fix result as JSON instead of the source text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Analyze {
            input,
            report,
            export_csv,
            score,
            verbose,
            json,
        } => {
            let options = AnalyzeOptions { report, export_csv };
            let analysis = run_analyze(&input, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print!("{}", render_suggestions(&analysis.suggestions, verbose));
                if score {
                    println!("Sustainability Score: {}/100", analysis.score);
                }
            }
            Ok(())
        }
        Commands::Fix {
            input,
            write,
            output,
            json,
        } => {
            let fix = run_fix(&input, write, output.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&fix)?);
            } else if !write && output.is_none() {
                print!("{}", fix.source);
            } else if fix.changed {
                println!("fixed: {}", fix.file);
            } else {
                println!("no changes: {}", fix.file);
            }
            Ok(())
        }
    }
}
