//! Python language support for sustain.
//!
//! Parses Python source with tree-sitter into a closed typed AST, runs
//! the read-only pattern-detection pass, and applies the structural
//! auto-fix pass. See [`detect`] and [`autofix`] for the entry points.

pub mod ast;
pub mod codegen;
pub mod detect;
pub mod fix;
pub mod parse;

pub use detect::detect;
pub use fix::{autofix, FixOutcome};
pub use parse::{parse_module, ParseError};
