//! Prompts: `braintrust_prompt` resource and data sources.
//!
//! Prompt definitions are free-form JSON and travel as JSON text in
//! `prompt_data`. State keeps the configured text as long as it encodes
//! the same value the API returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext, Resource};
use crate::api::{CreatePrompt, ListOptions, PatchPrompt, Prompt};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_prompt";
const LIST_TYPE_NAME: &str = "braintrust_prompts";

/// State of one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptModel {
    pub id: Attr<String>,
    pub project_id: Attr<String>,
    pub name: Attr<String>,
    pub slug: Attr<String>,
    pub description: Attr<String>,
    pub prompt_data: Attr<String>,
    pub tags: Attr<Vec<String>>,
    pub function_type: Attr<String>,
    pub org_id: Attr<String>,
    pub created: Attr<String>,
}

impl PromptModel {
    fn from_remote(prompt: &Prompt, prior_data: &Attr<String>) -> Result<Self> {
        Ok(Self {
            id: Attr::Known(prompt.id.clone()),
            project_id: Attr::from_non_empty(prompt.project_id.clone()),
            name: Attr::Known(prompt.name.clone()),
            slug: Attr::from_non_empty(prompt.slug.clone()),
            description: Attr::from_optional(prompt.description.as_deref()),
            prompt_data: common::json_text(prompt.prompt_data.as_ref(), prior_data)?,
            tags: common::string_list(prompt.tags.as_ref()),
            function_type: Attr::from_optional(prompt.function_type.as_deref()),
            org_id: Attr::from_optional(prompt.org_id.as_deref()),
            created: common::timestamp(prompt.created.as_ref()),
        })
    }
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single prompt by id, name or slug.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("name", Attribute::optional_computed_string())
        .with_attribute("slug", Attribute::optional_computed_string())
        .with_attribute(
            "project_id",
            Attribute::optional_computed_string()
                .with_description("Restricts a name or slug lookup to one project."),
        )
        .with_attribute("description", Attribute::computed_string())
        .with_attribute("prompt_data", Attribute::computed_string())
        .with_attribute("tags", Attribute::computed_string_list())
        .with_attribute("function_type", Attribute::computed_string())
        .with_attribute("org_id", Attribute::computed_string())
        .with_attribute("created", Attribute::computed_string())
}

/// `braintrust_prompt` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptDataSource;

#[async_trait]
impl DataSource for PromptDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: PromptModel = common::decode(TYPE_NAME, config)?;
        let project_id = common::known_filter("project_id", &config.project_id)?;
        let selector =
            common::selector(&config.id, &[("name", &config.name), ("slug", &config.slug)])?;

        let prompt: Prompt = match selector {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { key: "slug", value } => {
                let options = ListOptions::new()
                    .with("slug", value)
                    .with_opt("project_id", project_id);
                common::find_by_key(&ctx.client, &options, "slug", value, |p: &Prompt| {
                    p.slug.as_str()
                })
                .await?
            }
            Selector::By { value, .. } => {
                let options = ListOptions::new()
                    .with("prompt_name", value)
                    .with_opt("project_id", project_id);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&PromptModel::from_remote(&prompt, &Attr::Null)?)
    }
}

/// State of the `braintrust_prompts` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsModel {
    pub prompt_name: Attr<String>,
    pub slug: Attr<String>,
    pub project_id: Attr<String>,
    pub project_name: Attr<String>,
    pub org_name: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub prompts: Attr<Vec<PromptModel>>,
}

/// `braintrust_prompts` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptsDataSource;

#[async_trait]
impl DataSource for PromptsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists prompts.")
            .with_attribute("prompt_name", Attribute::optional_string())
            .with_attribute("slug", Attribute::optional_string())
            .with_attribute("project_id", Attribute::optional_string())
            .with_attribute("project_name", Attribute::optional_string())
            .with_attribute("org_name", Attribute::optional_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "prompts",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: PromptsModel = common::decode(LIST_TYPE_NAME, config)?;

        let prompt_name = common::known_filter("prompt_name", &model.prompt_name)?;
        let slug = common::known_filter("slug", &model.slug)?;
        let project_id = common::known_filter("project_id", &model.project_id)?;
        let project_name = common::known_filter("project_name", &model.project_name)?;
        let org_name = common::known_filter("org_name", &model.org_name)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("project_id", project_id.is_some()), ("project_name", project_name.is_some()))?;
        common::exclusive(("ids", ids.is_some()), ("prompt_name", prompt_name.is_some()))?;
        common::exclusive(("ids", ids.is_some()), ("slug", slug.is_some()))?;
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with_opt("prompt_name", prompt_name)
            .with_opt("slug", slug)
            .with_opt("project_id", project_id)
            .with_opt("project_name", project_name)
            .with_opt("org_name", org_name)
            .with_ids(ids.unwrap_or_default());
        let prompts: Vec<Prompt> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&prompts));
        model.prompts = Attr::Known(
            prompts
                .iter()
                .map(|prompt| PromptModel::from_remote(prompt, &Attr::Null))
                .collect::<Result<_>>()?,
        );
        common::encode(&model)
    }
}

/// `braintrust_prompt` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptResource;

#[async_trait]
impl Resource for PromptResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A Braintrust prompt.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("project_id", Attribute::required_string().with_force_new())
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "slug",
                Attribute::required_string().with_description("Stable identifier used by SDKs."),
            )
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "prompt_data",
                Attribute::optional_string()
                    .with_description("Prompt definition (messages, model, parameters) as JSON."),
            )
            .with_attribute("tags", Attribute::optional_string_list())
            .with_attribute(
                "function_type",
                Attribute::optional_computed_string().with_force_new(),
            )
            .with_attribute("org_id", Attribute::computed_string())
            .with_attribute("created", Attribute::computed_string())
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: PromptModel = common::decode(TYPE_NAME, planned)?;
        let body = CreatePrompt {
            project_id: common::required("project_id", &planned.project_id)?,
            name: common::required("name", &planned.name)?,
            slug: common::required("slug", &planned.slug)?,
            description: common::optional(&planned.description),
            prompt_data: common::parse_json_text("prompt_data", &planned.prompt_data)?,
            tags: planned.tags.as_known().cloned(),
            function_type: common::optional(&planned.function_type),
        };

        let prompt: Prompt = ctx.client.create(&body).await?;
        common::encode(&PromptModel::from_remote(&prompt, &planned.prompt_data)?)
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: PromptModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;

        let Some(prompt) =
            common::read_remote::<Prompt>(&ctx.client, &id, &ListOptions::new()).await?
        else {
            return Ok(None);
        };
        common::encode(&PromptModel::from_remote(&prompt, &state.prompt_data)?).map(Some)
    }

    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value> {
        let prior: PromptModel = common::decode(TYPE_NAME, prior)?;
        let planned: PromptModel = common::decode(TYPE_NAME, planned)?;
        let id = common::required("id", &prior.id)?;

        let prompt_data = if common::changed_string(&prior.prompt_data, &planned.prompt_data).is_some()
        {
            common::parse_json_text("prompt_data", &planned.prompt_data)?
                .or_else(|| Some(Value::Object(serde_json::Map::new())))
        } else {
            None
        };
        let tags = match (&prior.tags, &planned.tags) {
            (_, Attr::Unknown) => None,
            (prior, Attr::Null) if !prior.is_null() => Some(Vec::new()),
            (prior, planned) => common::changed(prior, planned),
        };
        let patch = PatchPrompt {
            name: common::changed_string(&prior.name, &planned.name),
            slug: common::changed_string(&prior.slug, &planned.slug),
            description: common::changed_string(&prior.description, &planned.description),
            prompt_data,
            tags,
        };

        let prompt: Prompt = ctx.client.update(&id, &patch).await?;
        common::encode(&PromptModel::from_remote(&prompt, &planned.prompt_data)?)
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: PromptModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        common::delete_remote::<Prompt>(&ctx.client, &id).await
    }
}
