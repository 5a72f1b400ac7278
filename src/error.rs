//! Error types for the Braintrust provider.
//!
//! Every failure a provider operation can hit falls into one of four
//! categories: invalid input from configuration, a lookup that matched no
//! entity, a lookup that matched several, or a failure reported by the
//! Braintrust API. Provider configuration problems get their own branch.
//! None of them are retried and none of them abort anything beyond the
//! single operation that raised them.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider configuration errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid resource or data source input.
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    /// Name or id lookup failures.
    #[error("{0}")]
    Lookup(#[from] LookupError),

    /// Braintrust API errors.
    #[error("Braintrust API error: {0}")]
    Api(#[from] ApiError),

    /// JSON (de)serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Provider configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// No API key in configuration or environment.
    #[error("Missing API key: set `api_key` or the {env_var} environment variable")]
    MissingApiKey {
        /// Environment variable consulted as a fallback.
        env_var: String,
    },
}

/// Invalid configuration of a resource or data source.
#[derive(Debug, Error)]
pub enum InputError {
    /// Two attributes were set that cannot be combined.
    #[error("`{first}` and `{second}` cannot both be set")]
    Conflicting {
        /// First attribute.
        first: String,
        /// Second attribute.
        second: String,
    },

    /// A required attribute is missing.
    #[error("`{attribute}` is required")]
    Missing {
        /// The missing attribute.
        attribute: String,
    },

    /// None of a set of mutually exclusive attributes was set.
    #[error("exactly one of {} must be set", quote_list(.attributes))]
    ExactlyOneOf {
        /// The candidate attributes.
        attributes: Vec<String>,
    },

    /// A value that must be known was still unknown.
    #[error("`{attribute}` must be known")]
    Unknown {
        /// The unknown attribute.
        attribute: String,
    },

    /// A limit that is zero or negative.
    #[error("`limit` must be greater than zero, got {value}")]
    NonPositiveLimit {
        /// The rejected value.
        value: i64,
    },

    /// A limit that does not fit the platform integer range.
    #[error("`limit` {value} exceeds the supported range")]
    LimitOutOfRange {
        /// The rejected value.
        value: i64,
    },

    /// An attribute with a malformed value.
    #[error("`{attribute}`: {message}")]
    Invalid {
        /// The attribute.
        attribute: String,
        /// What is wrong with it.
        message: String,
    },

    /// A change the API cannot apply in place.
    #[error("{kind} cannot be updated in place: {reason}")]
    UpdateNotSupported {
        /// Entity kind.
        kind: &'static str,
        /// Why the update is refused.
        reason: String,
    },

    /// The state or configuration payload could not be decoded.
    #[error("could not decode {what}: {message}")]
    Decode {
        /// What was being decoded.
        what: String,
        /// Decoder message.
        message: String,
    },

    /// An unregistered resource or data source type.
    #[error("unknown {category} type `{type_name}`")]
    UnknownType {
        /// `resource` or `data source`.
        category: &'static str,
        /// The requested type name.
        type_name: String,
    },
}

/// Outcome of a lookup that did not produce exactly one live entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No live entity matched.
    #[error("no {kind} found with {key} \"{value}\"")]
    NotFound {
        /// Entity kind.
        kind: &'static str,
        /// Attribute the lookup used.
        key: &'static str,
        /// Value looked up.
        value: String,
    },

    /// More than one live entity matched.
    #[error("{count} {kind}s found with {key} \"{value}\"; the lookup must match exactly one")]
    Ambiguous {
        /// Entity kind.
        kind: &'static str,
        /// Attribute the lookup used.
        key: &'static str,
        /// Value looked up.
        value: String,
        /// Number of matches.
        count: usize,
    },
}

/// Braintrust API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed.
    #[error("authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("request failed: {status} - {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from API.
        message: String,
    },

    /// Rate limited.
    #[error("rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds the API asked us to wait.
        retry_after_secs: u64,
    },

    /// The addressed object does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind.
        kind: &'static str,
        /// Object id.
        id: String,
    },

    /// Network error.
    #[error("network error: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from API.
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error means the remote object does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::NotFound { .. }) | Self::Lookup(LookupError::NotFound { .. })
        )
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl InputError {
    /// Creates an error for a malformed attribute.
    #[must_use]
    pub fn invalid(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Creates an error for a missing attribute.
    #[must_use]
    pub fn missing(attribute: impl Into<String>) -> Self {
        Self::Missing {
            attribute: attribute.into(),
        }
    }

    /// Creates an error for two conflicting attributes.
    #[must_use]
    pub fn conflicting(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::Conflicting {
            first: first.into(),
            second: second.into(),
        }
    }
}

impl ApiError {
    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_of_message() {
        let err = InputError::ExactlyOneOf {
            attributes: vec![String::from("id"), String::from("name")],
        };
        assert_eq!(err.to_string(), "exactly one of `id`, `name` must be set");
    }

    #[test]
    fn test_lookup_messages_are_distinct() {
        let not_found = LookupError::NotFound {
            kind: "project",
            key: "name",
            value: String::from("demo"),
        };
        let ambiguous = LookupError::Ambiguous {
            kind: "project",
            key: "name",
            value: String::from("demo"),
            count: 2,
        };
        assert_eq!(not_found.to_string(), "no project found with name \"demo\"");
        assert!(ambiguous.to_string().starts_with("2 projects found"));
    }

    #[test]
    fn test_is_not_found() {
        let api = ProviderError::Api(ApiError::NotFound {
            kind: "dataset",
            id: String::from("abc"),
        });
        assert!(api.is_not_found());
        assert!(!ProviderError::internal("boom").is_not_found());
    }
}
