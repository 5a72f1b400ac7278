//! Validation of the provider configuration.
//!
//! Block validation runs at `validate` time, before environment fallbacks
//! are applied; it collects every problem instead of stopping at the first.
//! Resolved validation runs right before a client is built.

use crate::error::{ConfigError, Result};
use reqwest::Url;
use tracing::debug;

use super::provider::{ProviderConfig, ResolvedConfig};
use crate::framework::Attr;

/// Validator for the provider configuration.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all issues found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationIssue>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The field that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks the provider block as written.
    ///
    /// Unset values are fine here; they may still come from the environment.
    #[must_use]
    pub fn validate_block(&self, config: &ProviderConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        for (field, unknown) in [
            ("api_key", config.api_key.is_unknown()),
            ("api_url", config.api_url.is_unknown()),
            ("org_name", config.org_name.is_unknown()),
            ("timeout_secs", config.timeout_secs.is_unknown()),
        ] {
            if unknown {
                result.errors.push(ValidationIssue {
                    field: field.to_string(),
                    message: format!("`{field}` must be known when the provider is configured"),
                });
            }
        }

        if let Attr::Known(key) = &config.api_key
            && key.trim().is_empty()
        {
            result
                .warnings
                .push(String::from("`api_key` is empty; BRAINTRUST_API_KEY will be used"));
        }

        if let Some(url) = config.api_url.non_empty() {
            Self::validate_url(url, &mut result);
        }

        if let Attr::Known(timeout) = config.timeout_secs
            && timeout <= 0
        {
            result.errors.push(ValidationIssue {
                field: String::from("timeout_secs"),
                message: format!("timeout must be a positive number of seconds, got {timeout}"),
            });
        }

        result
    }

    /// Checks fully resolved settings.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self, config: &ResolvedConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        if config.api_key.trim().is_empty() {
            result.errors.push(ValidationIssue {
                field: String::from("api_key"),
                message: String::from("API key cannot be empty"),
            });
        }

        Self::validate_url(&config.api_url, &mut result);

        if config.timeout_secs == 0 {
            result.errors.push(ValidationIssue {
                field: String::from("timeout_secs"),
                message: String::from("timeout must be positive"),
            });
        }

        if result.errors.is_empty() {
            debug!("Provider configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }
            .into())
        }
    }

    fn validate_url(raw: &str, result: &mut ValidationResult) {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                if url.scheme() == "http" && !is_local(&url) {
                    result
                        .warnings
                        .push(format!("`api_url` {raw} is not using HTTPS"));
                }
            }
            Ok(url) => result.errors.push(ValidationIssue {
                field: String::from("api_url"),
                message: format!("unsupported URL scheme `{}`", url.scheme()),
            }),
            Err(e) => result.errors.push(ValidationIssue {
                field: String::from("api_url"),
                message: format!("invalid URL `{raw}`: {e}"),
            }),
        }
    }
}

fn is_local(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(url: &str) -> ResolvedConfig {
        ResolvedConfig {
            api_key: String::from("sk-test"),
            api_url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_resolved_config() {
        let result = ConfigValidator::new()
            .validate(&resolved("https://api.braintrust.dev"))
            .unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_rejects_bad_scheme() {
        assert!(
            ConfigValidator::new()
                .validate(&resolved("ftp://example.com"))
                .is_err()
        );
        assert!(ConfigValidator::new().validate(&resolved("not a url")).is_err());
    }

    #[test]
    fn test_plain_http_warns_unless_local() {
        let validator = ConfigValidator::new();
        let remote = validator.validate(&resolved("http://example.com")).unwrap();
        assert_eq!(remote.warning_count(), 1);
        let local = validator.validate(&resolved("http://localhost:8000")).unwrap();
        assert_eq!(local.warning_count(), 0);
    }

    #[test]
    fn test_block_reports_unknown_values() {
        let block = ProviderConfig {
            api_key: Attr::Unknown,
            timeout_secs: Attr::Known(-5),
            ..Default::default()
        };

        let result = ConfigValidator::new().validate_block(&block);

        assert_eq!(result.error_count(), 2);
        assert_eq!(result.errors[0].field, "api_key");
        assert_eq!(result.errors[1].field, "timeout_secs");
    }

    #[test]
    fn test_empty_block_is_valid() {
        let result = ConfigValidator::new().validate_block(&ProviderConfig::default());
        assert!(result.is_valid());
    }
}
