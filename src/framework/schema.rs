//! Schema types describing the provider, its resources and its data sources.
//!
//! Schemas drive validation of incoming configuration and document which
//! attributes are inputs, which are computed, and which are sensitive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::diagnostic::{Diagnostic, Diagnostics};
use super::value::is_unknown_marker;

/// The type of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A string value.
    String,
    /// A 64-bit integer.
    Int64,
    /// A boolean value.
    Bool,
    /// A list of values of a single type.
    List(Box<AttributeType>),
    /// A map from string keys to values of a single type.
    Map(Box<AttributeType>),
    /// An object with a fixed set of attributes.
    Object(BTreeMap<String, AttributeType>),
}

impl AttributeType {
    /// Create a list type.
    #[must_use]
    pub fn list(element_type: Self) -> Self {
        Self::List(Box::new(element_type))
    }

    /// Create a map type.
    #[must_use]
    pub fn map(element_type: Self) -> Self {
        Self::Map(Box::new(element_type))
    }

    /// Create an object type from `(name, type)` pairs.
    #[must_use]
    pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, Self)>) -> Self {
        Self::Object(
            fields
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        )
    }

    /// Object type mirroring the attributes of a schema.
    #[must_use]
    pub fn object_of(schema: &Schema) -> Self {
        Self::Object(
            schema
                .attributes
                .iter()
                .map(|(name, attr)| (name.clone(), attr.attr_type.clone()))
                .collect(),
        )
    }

    fn matches(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match (self, value) {
            (_, Value::Null) | (Self::String, Value::String(_)) | (Self::Bool, Value::Bool(_)) => {
                true
            }
            (Self::Int64, Value::Number(n)) => n.is_i64(),
            (Self::List(element), Value::Array(items)) => items.iter().all(|i| element.matches(i)),
            (Self::Map(element), Value::Object(entries)) => {
                entries.values().all(|v| element.matches(v))
            }
            (Self::Object(fields), Value::Object(entries)) => entries.iter().all(|(k, v)| {
                fields.get(k).is_some_and(|ty| ty.matches(v))
            }),
            _ => false,
        }
    }
}

/// Describes how an attribute can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// The attribute is required in configuration.
    pub required: bool,
    /// The attribute is optional in configuration.
    pub optional: bool,
    /// The attribute is computed by the provider (read-only).
    pub computed: bool,
    /// The attribute is sensitive and should be hidden in logs/UI.
    pub sensitive: bool,
}

impl AttributeFlags {
    /// Flags for a required attribute.
    #[must_use]
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Flags for an optional attribute.
    #[must_use]
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    /// Flags for a computed attribute.
    #[must_use]
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Default::default()
        }
    }

    /// Flags for an optional attribute that the provider fills in when omitted.
    #[must_use]
    pub fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Default::default()
        }
    }
}

/// Describes a single attribute in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The type of the attribute.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Flags describing how the attribute can be used.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Human-readable description of the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Changing this attribute forces the resource to be replaced.
    #[serde(default)]
    pub force_new: bool,
}

impl Attribute {
    /// Create a new attribute with the given type and flags.
    #[must_use]
    pub const fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            force_new: false,
        }
    }

    /// A required string attribute.
    #[must_use]
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::required())
    }

    /// An optional string attribute.
    #[must_use]
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional())
    }

    /// A computed string attribute.
    #[must_use]
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::computed())
    }

    /// An optional string attribute filled in by the provider when omitted.
    #[must_use]
    pub fn optional_computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional_computed())
    }

    /// An optional int64 attribute.
    #[must_use]
    pub fn optional_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::optional())
    }

    /// An optional bool attribute filled in by the provider when omitted.
    #[must_use]
    pub fn optional_computed_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::optional_computed())
    }

    /// A computed bool attribute.
    #[must_use]
    pub fn computed_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::computed())
    }

    /// An optional list of strings.
    #[must_use]
    pub fn optional_string_list() -> Self {
        Self::new(
            AttributeType::list(AttributeType::String),
            AttributeFlags::optional(),
        )
    }

    /// An optional list of strings filled in by the provider when omitted.
    #[must_use]
    pub fn optional_computed_string_list() -> Self {
        Self::new(
            AttributeType::list(AttributeType::String),
            AttributeFlags::optional_computed(),
        )
    }

    /// A computed list of strings.
    #[must_use]
    pub fn computed_string_list() -> Self {
        Self::new(
            AttributeType::list(AttributeType::String),
            AttributeFlags::computed(),
        )
    }

    /// An optional map of strings.
    #[must_use]
    pub fn optional_string_map() -> Self {
        Self::new(
            AttributeType::map(AttributeType::String),
            AttributeFlags::optional(),
        )
    }

    /// A computed map of strings.
    #[must_use]
    pub fn computed_string_map() -> Self {
        Self::new(
            AttributeType::map(AttributeType::String),
            AttributeFlags::computed(),
        )
    }

    /// A computed list of objects shaped like `element`.
    #[must_use]
    pub fn computed_object_list(element: &Schema) -> Self {
        Self::new(
            AttributeType::list(AttributeType::object_of(element)),
            AttributeFlags::computed(),
        )
    }

    /// Set the description for this attribute.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark this attribute as forcing resource replacement when changed.
    #[must_use]
    pub const fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Mark this attribute as sensitive.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
    }
}

/// Schema for a resource, a data source, or the provider block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// The version of this schema.
    #[serde(default)]
    pub version: u64,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attributes keyed by name.
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    /// Create an empty schema at version 0.
    #[must_use]
    pub fn v0() -> Self {
        Self::default()
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an attribute to the schema.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Validates a configuration object against this schema.
    ///
    /// Reports attributes the schema does not declare, required attributes
    /// that are null, values set on computed-only attributes, and values of
    /// the wrong type. Unknown values pass every check except the
    /// undeclared-attribute one.
    #[must_use]
    pub fn validate_config(&self, config: &serde_json::Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        let Some(entries) = config.as_object() else {
            if !config.is_null() {
                diagnostics.push(
                    Diagnostic::error("Invalid configuration")
                        .with_detail("configuration must be a JSON object"),
                );
            }
            return diagnostics;
        };

        for name in entries.keys() {
            if !self.attributes.contains_key(name) {
                diagnostics.push(
                    Diagnostic::error("Unsupported attribute")
                        .with_detail(format!("an attribute named `{name}` is not expected here"))
                        .with_attribute(name.clone()),
                );
            }
        }

        for (name, attr) in &self.attributes {
            let value = entries.get(name).unwrap_or(&serde_json::Value::Null);
            if is_unknown_marker(value) {
                continue;
            }

            if attr.flags.required && value.is_null() {
                diagnostics.push(
                    Diagnostic::error("Missing required attribute")
                        .with_detail(format!("the attribute `{name}` is required"))
                        .with_attribute(name.clone()),
                );
            }

            let configurable = attr.flags.required || attr.flags.optional;
            if !configurable && !value.is_null() {
                diagnostics.push(
                    Diagnostic::error("Value for unconfigurable attribute")
                        .with_detail(format!("`{name}` is computed and cannot be set"))
                        .with_attribute(name.clone()),
                );
            }

            if !attr.attr_type.matches(value) {
                diagnostics.push(
                    Diagnostic::error("Incorrect attribute value type")
                        .with_detail(format!("`{name}` must be of type {:?}", attr.attr_type))
                        .with_attribute(name.clone()),
                );
            }
        }

        diagnostics
    }
}

/// Full schema of the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Schema for provider configuration.
    #[serde(default)]
    pub provider: Schema,
    /// Schemas for each resource type.
    #[serde(default)]
    pub resources: BTreeMap<String, Schema>,
    /// Schemas for each data source type.
    #[serde(default)]
    pub data_sources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    /// Create a new empty provider schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider configuration schema.
    #[must_use]
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Add a resource schema.
    #[must_use]
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Add a data source schema.
    #[must_use]
    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project_schema() -> Schema {
        Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("limit", Attribute::optional_int64())
    }

    #[test]
    fn test_attribute_flags() {
        let required = AttributeFlags::required();
        assert!(required.required);
        assert!(!required.optional);
        assert!(!required.computed);

        let optional_computed = AttributeFlags::optional_computed();
        assert!(optional_computed.optional);
        assert!(optional_computed.computed);
    }

    #[test]
    fn test_attribute_builders() {
        let attr = Attribute::required_string()
            .with_description("Object id")
            .with_force_new()
            .sensitive();

        assert_eq!(attr.attr_type, AttributeType::String);
        assert!(attr.flags.required);
        assert!(attr.flags.sensitive);
        assert!(attr.force_new);
        assert_eq!(attr.description.as_deref(), Some("Object id"));
    }

    #[test]
    fn test_valid_config_has_no_diagnostics() {
        let diags = project_schema().validate_config(&json!({"name": "demo", "limit": 5}));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_missing_required_attribute() {
        let diags = project_schema().validate_config(&json!({"description": "x"}));
        assert!(diags.has_errors());
        assert_eq!(diags.iter().next().map(|d| d.summary.as_str()), Some("Missing required attribute"));
    }

    #[test]
    fn test_unknown_satisfies_required() {
        let diags = project_schema().validate_config(&json!({"name": {"$unknown": true}}));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_false_unknown_marker_is_type_checked() {
        let diags = project_schema().validate_config(&json!({"name": {"$unknown": false}}));
        assert_eq!(
            diags.iter().next().map(|d| d.summary.as_str()),
            Some("Incorrect attribute value type")
        );
    }

    #[test]
    fn test_computed_and_undeclared_attributes_rejected() {
        let diags = project_schema().validate_config(&json!({
            "name": "demo",
            "id": "123",
            "colour": "red",
        }));
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_type_mismatch() {
        let diags = project_schema().validate_config(&json!({"name": "demo", "limit": "ten"}));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_provider_schema_builder() {
        let schema = ProviderSchema::new()
            .with_provider_config(
                Schema::v0().with_attribute("api_key", Attribute::optional_string().sensitive()),
            )
            .with_resource("braintrust_project", project_schema())
            .with_data_source("braintrust_projects", Schema::v0());

        assert!(schema.provider.attributes.contains_key("api_key"));
        assert!(schema.resources.contains_key("braintrust_project"));
        assert!(schema.data_sources.contains_key("braintrust_projects"));
    }
}
