//! Configuration parser for the provider block.
//!
//! Values are resolved with the precedence: provider block, then
//! environment variables (optionally loaded from `.env`), then defaults.

use crate::api::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{ConfigError, Result};
use crate::framework::Attr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::provider::{
    ENV_API_KEY, ENV_API_URL, ENV_ORG_NAME, ENV_TIMEOUT_SECS, ProviderConfig, ResolvedConfig,
};

/// Configuration parser for loading the provider block.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving `.env`.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads the provider block from a JSON or YAML file.
    ///
    /// Files ending in `.json` are read as JSON, everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ProviderConfig> {
        let path = path.as_ref();
        info!("Loading provider configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to read file: {e}"),
            location: Some(path.display().to_string()),
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            self.parse_json(&content, Some(path))
        } else {
            self.parse_yaml(&content, Some(path))
        }
    }

    /// Parses the provider block from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ProviderConfig> {
        debug!("Parsing YAML provider configuration");

        serde_yaml::from_str(content).map_err(|e| {
            ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            }
            .into()
        })
    }

    /// Parses the provider block from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn parse_json(&self, content: &str, source: Option<&Path>) -> Result<ProviderConfig> {
        debug!("Parsing JSON provider configuration");

        serde_json::from_str(content).map_err(|e| {
            ConfigError::ParseError {
                message: format!("JSON parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            }
            .into()
        })
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to load .env file: {e}"),
                location: Some(env_path.display().to_string()),
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Resolves the block against the process environment.
    ///
    /// # Errors
    ///
    /// See [`ConfigParser::resolve_with`].
    pub fn resolve(&self, block: &ProviderConfig) -> Result<ResolvedConfig> {
        Self::resolve_with(block, |name| std::env::var(name).ok())
    }

    /// Resolves the block, reading fallbacks through `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is still unknown, no API key is
    /// available, or the timeout is not a positive number.
    pub fn resolve_with<F>(block: &ProviderConfig, env: F) -> Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|value| !value.is_empty());

        let api_key = string_setting(&block.api_key, "api_key", || lookup(ENV_API_KEY))?
            .ok_or_else(|| ConfigError::MissingApiKey {
                env_var: ENV_API_KEY.to_string(),
            })?;

        let api_url = string_setting(&block.api_url, "api_url", || lookup(ENV_API_URL))?
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let org_name = string_setting(&block.org_name, "org_name", || lookup(ENV_ORG_NAME))?;

        let timeout_secs = match &block.timeout_secs {
            Attr::Unknown => return Err(unknown_setting("timeout_secs")),
            Attr::Known(value) => positive_timeout(*value)?,
            Attr::Null => match lookup(ENV_TIMEOUT_SECS) {
                Some(raw) => {
                    let value = raw.trim().parse::<i64>().map_err(|e| {
                        ConfigError::validation(
                            format!("{ENV_TIMEOUT_SECS} is not an integer: {e}"),
                            "timeout_secs",
                        )
                    })?;
                    positive_timeout(value)?
                }
                None => DEFAULT_TIMEOUT_SECS,
            },
        };

        debug!("Resolved provider configuration for {api_url}");

        Ok(ResolvedConfig {
            api_key,
            api_url,
            org_name,
            timeout_secs,
        })
    }
}

fn string_setting(
    attr: &Attr<String>,
    field: &str,
    fallback: impl FnOnce() -> Option<String>,
) -> Result<Option<String>> {
    match attr {
        Attr::Unknown => Err(unknown_setting(field)),
        Attr::Known(value) if !value.is_empty() => Ok(Some(value.clone())),
        Attr::Known(_) | Attr::Null => Ok(fallback()),
    }
}

fn unknown_setting(field: &str) -> crate::error::ProviderError {
    ConfigError::validation(
        format!("`{field}` depends on a value that is not known yet"),
        field,
    )
    .into()
}

fn positive_timeout(value: i64) -> Result<u64> {
    u64::try_from(value)
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| {
            ConfigError::validation(
                format!("timeout must be a positive number of seconds, got {value}"),
                "timeout_secs",
            )
            .into()
        })
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "braintrust.provider.yaml",
    "braintrust.provider.yml",
    "braintrust.provider.json",
];

/// Finds the configuration file in the current directory or parent directories.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }
    .into())
}
