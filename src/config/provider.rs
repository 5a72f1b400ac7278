//! The provider configuration block.

use serde::{Deserialize, Serialize};

use crate::api::{BraintrustClient, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "BRAINTRUST_API_KEY";
/// Environment variable overriding the API URL.
pub const ENV_API_URL: &str = "BRAINTRUST_API_URL";
/// Environment variable naming the default organization.
pub const ENV_ORG_NAME: &str = "BRAINTRUST_ORG_NAME";
/// Environment variable overriding the request timeout.
pub const ENV_TIMEOUT_SECS: &str = "BRAINTRUST_TIMEOUT_SECS";

/// The `provider "braintrust"` block as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key; falls back to `BRAINTRUST_API_KEY`.
    pub api_key: Attr<String>,
    /// API base URL; falls back to `BRAINTRUST_API_URL`.
    pub api_url: Attr<String>,
    /// Organization new top-level objects are created in.
    pub org_name: Attr<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Attr<i64>,
}

/// Provider settings after environment fallbacks and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// API key.
    pub api_key: String,
    /// API base URL.
    pub api_url: String,
    /// Default organization name.
    pub org_name: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Schema of the provider block.
    #[must_use]
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Braintrust provider configuration")
            .with_attribute(
                "api_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Braintrust API key. Defaults to BRAINTRUST_API_KEY."),
            )
            .with_attribute(
                "api_url",
                Attribute::optional_string().with_description(
                    "Braintrust API URL. Defaults to BRAINTRUST_API_URL or https://api.braintrust.dev.",
                ),
            )
            .with_attribute(
                "org_name",
                Attribute::optional_string()
                    .with_description("Organization used when creating top-level objects."),
            )
            .with_attribute(
                "timeout_secs",
                Attribute::optional_int64()
                    .with_description("HTTP request timeout in seconds. Defaults to 30."),
            )
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            org_name: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ResolvedConfig {
    /// Builds an API client from these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn client(&self) -> Result<BraintrustClient> {
        BraintrustClient::with_options(&self.api_key, &self.api_url, self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_decodes_unknown_values() {
        let config: ProviderConfig = serde_json::from_value(json!({
            "api_key": {"$unknown": true},
            "org_name": "acme",
        }))
        .unwrap();

        assert!(config.api_key.is_unknown());
        assert!(config.api_url.is_null());
        assert_eq!(config.org_name, Attr::Known(String::from("acme")));
    }

    #[test]
    fn test_block_rejects_unknown_fields() {
        let result: std::result::Result<ProviderConfig, _> =
            serde_json::from_value(json!({"api_token": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_marks_api_key_sensitive() {
        let schema = ProviderConfig::schema();
        assert!(schema.attributes["api_key"].flags.sensitive);
        assert!(schema.attributes["timeout_secs"].flags.optional);
    }
}
