//! Braintrust provider CLI entrypoint.
//!
//! Runs single provider operations from the command line. Documents are
//! read from files or stdin, results go to stdout and logs to stderr.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use braintrust_provider::cli::{Cli, Commands, OutputFormatter, load_document};
use braintrust_provider::config::{ConfigParser, find_config_file};
use braintrust_provider::error::{ProviderError, Result};
use braintrust_provider::framework::Diagnostics;
use braintrust_provider::provider::{BraintrustProvider, Response, TypeCategory};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point. Returns whether the command succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let formatter = OutputFormatter::new(cli.output);
    let config_path = cli.config.as_deref();

    let operation = match cli.command {
        Commands::Schema {
            type_name,
            data_source,
        } => return cmd_schema(type_name.as_deref(), data_source, &formatter),
        Commands::Validate {
            type_name,
            input,
            data_source,
        } => {
            return cmd_validate(
                config_path,
                type_name.as_deref(),
                input.as_deref(),
                data_source,
                &formatter,
            );
        }
        other => other,
    };

    let (provider, mut diagnostics) = configured_provider(config_path)?;
    if diagnostics.has_errors() {
        return emit_response(&formatter, &Response::diagnostics(diagnostics));
    }

    let mut response = match operation {
        Commands::ReadDataSource { type_name, input } => {
            provider.read_data_source(&type_name, load_document(&input)?).await
        }
        Commands::Create { type_name, input } => {
            provider.create(&type_name, load_document(&input)?).await
        }
        Commands::Read { type_name, state } => {
            provider.read(&type_name, load_document(&state)?).await
        }
        Commands::Update {
            type_name,
            prior,
            planned,
        } => {
            let prior = load_document(&prior)?;
            let planned = load_document(&planned)?;
            provider.update(&type_name, prior, planned).await
        }
        Commands::Delete { type_name, state } => {
            provider.delete(&type_name, load_document(&state)?).await
        }
        Commands::Import { type_name, id } => provider.import(&type_name, &id).await,
        Commands::Schema { .. } | Commands::Validate { .. } => {
            return Err(ProviderError::Internal(String::from("command already handled")));
        }
    };

    // Configuration warnings come first.
    diagnostics.extend(response.diagnostics);
    response.diagnostics = diagnostics;
    emit_response(&formatter, &response)
}

/// Show the provider schema.
fn cmd_schema(type_name: Option<&str>, data_source: bool, formatter: &OutputFormatter) -> Result<bool> {
    let schema = BraintrustProvider::new().schema();

    let Some(type_name) = type_name else {
        write_stdout(&formatter.format_provider_schema(&schema))?;
        return Ok(true);
    };

    let types = if data_source {
        &schema.data_sources
    } else {
        &schema.resources
    };
    match types.get(type_name) {
        Some(type_schema) => {
            write_stdout(&formatter.format_type_schema(type_name, type_schema))?;
            Ok(true)
        }
        None => {
            let kind = if data_source { "data source" } else { "resource" };
            eprintln!("Unknown {kind} type: {type_name}");
            Ok(false)
        }
    }
}

/// Validate the provider configuration or a document.
fn cmd_validate(
    config_path: Option<&Path>,
    type_name: Option<&str>,
    input: Option<&Path>,
    data_source: bool,
    formatter: &OutputFormatter,
) -> Result<bool> {
    let provider = BraintrustProvider::new();

    let diagnostics = match (type_name, input) {
        (Some(type_name), Some(input)) => {
            let category = if data_source {
                TypeCategory::DataSource
            } else {
                TypeCategory::Resource
            };
            info!("Validating {} against {type_name}", input.display());
            provider.validate(category, type_name, &load_document(input)?)
        }
        (Some(type_name), None) => {
            eprintln!("Nothing to validate for {type_name}: pass --input");
            return Ok(false);
        }
        (None, _) => {
            let block = load_provider_block(config_path)?;
            provider.validate_provider_config(&block)
        }
    };

    write_stdout(&formatter.format_diagnostics(&diagnostics))?;
    Ok(!diagnostics.has_errors())
}

/// Builds the provider and configures it from the provider block.
///
/// The provider is left unconfigured when the returned diagnostics
/// contain errors.
fn configured_provider(config_path: Option<&Path>) -> Result<(BraintrustProvider, Diagnostics)> {
    let block = load_provider_block(config_path)?;
    let mut provider = BraintrustProvider::new();
    let diagnostics = provider.configure(block);
    Ok((provider, diagnostics))
}

/// Loads the provider block from `--config`, a discovered file, or nothing.
fn load_provider_block(config_path: Option<&Path>) -> Result<serde_json::Value> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(".").ok(),
    };
    let Some(path) = path else {
        debug!("No provider configuration file; using environment only");
        return Ok(serde_json::json!({}));
    };

    let parser = ConfigParser::new().with_base_path(path.parent().unwrap_or_else(|| Path::new(".")));
    parser.load_dotenv()?;
    let block = parser.load_file(&path)?;
    Ok(serde_json::to_value(block)?)
}

fn emit_response(formatter: &OutputFormatter, response: &Response) -> Result<bool> {
    write_stdout(&formatter.format_response(response))?;
    Ok(!response.has_errors())
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
