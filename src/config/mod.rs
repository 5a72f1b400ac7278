//! Provider configuration.
//!
//! This module handles everything about the `provider` block:
//! - Its schema and typed representation
//! - Loading it from files, `.env` and environment variables
//! - Validation before a client is built

mod parser;
mod provider;
mod validator;

pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
pub use provider::{
    ENV_API_KEY, ENV_API_URL, ENV_ORG_NAME, ENV_TIMEOUT_SECS, ProviderConfig, ResolvedConfig,
};
pub use validator::{ConfigValidator, ValidationIssue, ValidationResult};
