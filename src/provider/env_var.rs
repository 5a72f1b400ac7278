//! Environment variables: `braintrust_env_var` resource and data sources.
//!
//! The API never returns a variable's value. The resource keeps whatever
//! value it last wrote; data sources expose everything but the value.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext, Resource};
use crate::api::{CreateEnvVar, EnvVar, ListOptions, PatchEnvVar};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_env_var";
const LIST_TYPE_NAME: &str = "braintrust_env_vars";

/// Readable state of one environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVarModel {
    pub id: Attr<String>,
    pub object_type: Attr<String>,
    pub object_id: Attr<String>,
    pub name: Attr<String>,
    pub created: Attr<String>,
    pub used: Attr<String>,
}

impl From<&EnvVar> for EnvVarModel {
    fn from(var: &EnvVar) -> Self {
        Self {
            id: Attr::Known(var.id.clone()),
            object_type: Attr::from_non_empty(var.object_type.clone()),
            object_id: Attr::from_non_empty(var.object_id.clone()),
            name: Attr::Known(var.name.clone()),
            created: common::timestamp(var.created.as_ref()),
            used: common::timestamp(var.used.as_ref()),
        }
    }
}

/// Resource state: the readable attributes plus the write-only value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVarResourceModel {
    #[serde(flatten)]
    pub var: EnvVarModel,
    pub value: Attr<String>,
}

impl EnvVarResourceModel {
    fn from_remote(var: &EnvVar, value: Attr<String>) -> Self {
        Self {
            var: EnvVarModel::from(var),
            value,
        }
    }
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single environment variable by id or name.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("name", Attribute::optional_computed_string())
        .with_attribute(
            "object_type",
            Attribute::optional_computed_string()
                .with_description("Owner type: `organization`, `project` or `function`."),
        )
        .with_attribute("object_id", Attribute::optional_computed_string())
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("used", Attribute::computed_string())
}

/// `braintrust_env_var` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVarDataSource;

#[async_trait]
impl DataSource for EnvVarDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: EnvVarModel = common::decode(TYPE_NAME, config)?;

        let var: EnvVar = match common::selector(&config.id, &[("name", &config.name)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { value, .. } => {
                // Names are only unique per owner.
                let options = ListOptions::new()
                    .with("env_var_name", value)
                    .with("object_type", common::required("object_type", &config.object_type)?)
                    .with("object_id", common::required("object_id", &config.object_id)?);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&EnvVarModel::from(&var))
    }
}

/// State of the `braintrust_env_vars` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVarsModel {
    pub env_var_name: Attr<String>,
    pub object_type: Attr<String>,
    pub object_id: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub env_vars: Attr<Vec<EnvVarModel>>,
}

/// `braintrust_env_vars` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVarsDataSource;

#[async_trait]
impl DataSource for EnvVarsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists environment variables.")
            .with_attribute("env_var_name", Attribute::optional_string())
            .with_attribute("object_type", Attribute::optional_string())
            .with_attribute("object_id", Attribute::optional_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "env_vars",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: EnvVarsModel = common::decode(LIST_TYPE_NAME, config)?;

        let env_var_name = common::known_filter("env_var_name", &model.env_var_name)?;
        let object_type = common::known_filter("object_type", &model.object_type)?;
        let object_id = common::known_filter("object_id", &model.object_id)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("ids", ids.is_some()), ("env_var_name", env_var_name.is_some()))?;
        if object_id.is_some() && object_type.is_none() {
            return Err(crate::error::InputError::missing("object_type").into());
        }
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with_opt("env_var_name", env_var_name)
            .with_opt("object_type", object_type)
            .with_opt("object_id", object_id)
            .with_ids(ids.unwrap_or_default());
        let vars: Vec<EnvVar> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&vars));
        model.env_vars = Attr::Known(vars.iter().map(EnvVarModel::from).collect());
        common::encode(&model)
    }
}

/// `braintrust_env_var` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVarResource;

#[async_trait]
impl Resource for EnvVarResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A secret environment variable available to functions.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "object_type",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("Owner type: `organization`, `project` or `function`."),
            )
            .with_attribute("object_id", Attribute::required_string().with_force_new())
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "value",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Secret value. Write-only; never read back."),
            )
            .with_attribute("created", Attribute::computed_string())
            .with_attribute("used", Attribute::computed_string())
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: EnvVarResourceModel = common::decode(TYPE_NAME, planned)?;
        let body = CreateEnvVar {
            object_type: common::required("object_type", &planned.var.object_type)?,
            object_id: common::required("object_id", &planned.var.object_id)?,
            name: common::required("name", &planned.var.name)?,
            value: common::optional(&planned.value),
        };

        let var: EnvVar = ctx.client.create(&body).await?;
        common::encode(&EnvVarResourceModel::from_remote(&var, planned.value))
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: EnvVarResourceModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.var.id)?;

        let remote = common::read_remote::<EnvVar>(&ctx.client, &id, &ListOptions::new()).await?;
        remote
            .map(|var| common::encode(&EnvVarResourceModel::from_remote(&var, state.value)))
            .transpose()
    }

    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value> {
        let prior: EnvVarResourceModel = common::decode(TYPE_NAME, prior)?;
        let planned: EnvVarResourceModel = common::decode(TYPE_NAME, planned)?;
        let id = common::required("id", &prior.var.id)?;

        let patch = PatchEnvVar {
            name: common::required("name", &planned.var.name)?,
            value: common::changed_string(&prior.value, &planned.value),
        };

        let var: EnvVar = ctx.client.update(&id, &patch).await?;
        // Unknown means the value was not changed by this plan.
        let value = if planned.value.is_unknown() {
            prior.value
        } else {
            planned.value
        };
        common::encode(&EnvVarResourceModel::from_remote(&var, value))
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: EnvVarResourceModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.var.id)?;
        common::delete_remote::<EnvVar>(&ctx.client, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_state_is_flat() {
        let var: EnvVar = serde_json::from_value(json!({
            "id": "v1",
            "object_type": "project",
            "object_id": "p1",
            "name": "OPENAI_API_KEY",
        }))
        .unwrap();

        let state = EnvVarResourceModel::from_remote(&var, Attr::Known(String::from("sk-1")));
        let encoded = serde_json::to_value(&state).unwrap();

        assert_eq!(encoded["name"], "OPENAI_API_KEY");
        assert_eq!(encoded["value"], "sk-1");
        assert_eq!(encoded["used"], Value::Null);

        let decoded: EnvVarResourceModel = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_unknown_value_decodes() {
        let state: EnvVarResourceModel = serde_json::from_value(json!({
            "name": "TOKEN",
            "value": {"$unknown": true},
        }))
        .unwrap();
        assert!(state.value.is_unknown());
        assert_eq!(state.var.name, Attr::Known(String::from("TOKEN")));
    }
}
