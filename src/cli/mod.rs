//! CLI module for the Braintrust provider.
//!
//! This module provides the command-line interface for running provider
//! operations against JSON or YAML documents.

mod commands;
mod input;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use input::{load_document, parse_document, STDIN};
pub use output::OutputFormatter;
