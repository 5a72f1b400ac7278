//! CLI command definitions.
//!
//! Every provider operation is exposed as a subcommand taking JSON or YAML
//! documents, so resources can be exercised without a host framework.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Braintrust provider - manage Braintrust objects declaratively.
#[derive(Parser, Debug)]
#[command(name = "braintrust-provider")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the provider configuration file.
    #[arg(short, long, global = true, env = "BRAINTRUST_PROVIDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the provider schema, or the schema of one type.
    Schema {
        /// Resource or data source type, e.g. `braintrust_project`.
        type_name: Option<String>,

        /// Look the type up among data sources instead of resources.
        #[arg(short, long)]
        data_source: bool,
    },

    /// Validate the provider configuration, or a resource/data source document.
    Validate {
        /// Type to validate the document against.
        type_name: Option<String>,

        /// Document to validate (file path or `-` for stdin).
        #[arg(short, long, requires = "type_name")]
        input: Option<PathBuf>,

        /// Validate against the data source schema.
        #[arg(short, long)]
        data_source: bool,
    },

    /// Read a data source.
    ReadDataSource {
        /// Data source type.
        type_name: String,

        /// Data source configuration (file path or `-` for stdin).
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Create a resource from its planned state.
    Create {
        /// Resource type.
        type_name: String,

        /// Planned state (file path or `-` for stdin).
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Refresh a resource from its current state.
    Read {
        /// Resource type.
        type_name: String,

        /// Current state (file path or `-` for stdin).
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Update a resource in place.
    Update {
        /// Resource type.
        type_name: String,

        /// Prior state.
        #[arg(long)]
        prior: PathBuf,

        /// Planned state.
        #[arg(long)]
        planned: PathBuf,
    },

    /// Delete a resource.
    Delete {
        /// Resource type.
        type_name: String,

        /// Current state (file path or `-` for stdin).
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Import an existing object into state.
    Import {
        /// Resource type.
        type_name: String,

        /// Object id (views take `<object_type>/<object_id>/<view_id>`).
        id: String,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update() {
        let cli = Cli::try_parse_from([
            "braintrust-provider",
            "--output",
            "json",
            "update",
            "braintrust_role",
            "--prior",
            "prior.json",
            "--planned",
            "planned.yaml",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Update {
                type_name,
                prior,
                planned,
            } => {
                assert_eq!(type_name, "braintrust_role");
                assert_eq!(prior, PathBuf::from("prior.json"));
                assert_eq!(planned, PathBuf::from("planned.yaml"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_validate_input_requires_type() {
        let result = Cli::try_parse_from(["braintrust-provider", "validate", "--input", "x.json"]);
        assert!(result.is_err());
    }
}
