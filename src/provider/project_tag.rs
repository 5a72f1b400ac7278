//! Project tags: `braintrust_project_tag` resource and data sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext, Resource};
use crate::api::{CreateProjectTag, ListOptions, PatchProjectTag, ProjectTag};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_project_tag";
const LIST_TYPE_NAME: &str = "braintrust_project_tags";

/// State of one project tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectTagModel {
    pub id: Attr<String>,
    pub project_id: Attr<String>,
    pub name: Attr<String>,
    pub description: Attr<String>,
    pub color: Attr<String>,
    pub created: Attr<String>,
    pub user_id: Attr<String>,
}

impl From<&ProjectTag> for ProjectTagModel {
    fn from(tag: &ProjectTag) -> Self {
        Self {
            id: Attr::Known(tag.id.clone()),
            project_id: Attr::from_non_empty(tag.project_id.clone()),
            name: Attr::Known(tag.name.clone()),
            description: Attr::from_optional(tag.description.as_deref()),
            color: Attr::from_optional(tag.color.as_deref()),
            created: common::timestamp(tag.created.as_ref()),
            user_id: Attr::from_optional(tag.user_id.as_deref()),
        }
    }
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single project tag by id or name.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("name", Attribute::optional_computed_string())
        .with_attribute("project_id", Attribute::optional_computed_string())
        .with_attribute("description", Attribute::computed_string())
        .with_attribute("color", Attribute::computed_string())
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("user_id", Attribute::computed_string())
}

/// `braintrust_project_tag` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectTagDataSource;

#[async_trait]
impl DataSource for ProjectTagDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: ProjectTagModel = common::decode(TYPE_NAME, config)?;
        let project_id = common::known_filter("project_id", &config.project_id)?;

        let tag: ProjectTag = match common::selector(&config.id, &[("name", &config.name)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { value, .. } => {
                let options = ListOptions::new()
                    .with("project_tag_name", value)
                    .with_opt("project_id", project_id);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&ProjectTagModel::from(&tag))
    }
}

/// State of the `braintrust_project_tags` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectTagsModel {
    pub project_tag_name: Attr<String>,
    pub project_id: Attr<String>,
    pub project_name: Attr<String>,
    pub org_name: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub project_tags: Attr<Vec<ProjectTagModel>>,
}

/// `braintrust_project_tags` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectTagsDataSource;

#[async_trait]
impl DataSource for ProjectTagsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists project tags.")
            .with_attribute("project_tag_name", Attribute::optional_string())
            .with_attribute("project_id", Attribute::optional_string())
            .with_attribute("project_name", Attribute::optional_string())
            .with_attribute("org_name", Attribute::optional_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "project_tags",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: ProjectTagsModel = common::decode(LIST_TYPE_NAME, config)?;

        let tag_name = common::known_filter("project_tag_name", &model.project_tag_name)?;
        let project_id = common::known_filter("project_id", &model.project_id)?;
        let project_name = common::known_filter("project_name", &model.project_name)?;
        let org_name = common::known_filter("org_name", &model.org_name)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("project_id", project_id.is_some()), ("project_name", project_name.is_some()))?;
        common::exclusive(("ids", ids.is_some()), ("project_tag_name", tag_name.is_some()))?;
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with_opt("project_tag_name", tag_name)
            .with_opt("project_id", project_id)
            .with_opt("project_name", project_name)
            .with_opt("org_name", org_name)
            .with_ids(ids.unwrap_or_default());
        let tags: Vec<ProjectTag> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&tags));
        model.project_tags = Attr::Known(tags.iter().map(ProjectTagModel::from).collect());
        common::encode(&model)
    }
}

/// `braintrust_project_tag` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectTagResource;

#[async_trait]
impl Resource for ProjectTagResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A tag that can be applied to logs and experiments in a project.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("project_id", Attribute::required_string().with_force_new())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "color",
                Attribute::optional_string().with_description("Display color, e.g. `#e11d48`."),
            )
            .with_attribute("created", Attribute::computed_string())
            .with_attribute("user_id", Attribute::computed_string())
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: ProjectTagModel = common::decode(TYPE_NAME, planned)?;
        let body = CreateProjectTag {
            project_id: common::required("project_id", &planned.project_id)?,
            name: common::required("name", &planned.name)?,
            description: common::optional(&planned.description),
            color: common::optional(&planned.color),
        };

        let tag: ProjectTag = ctx.client.create(&body).await?;
        common::encode(&ProjectTagModel::from(&tag))
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: ProjectTagModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;

        let remote = common::read_remote::<ProjectTag>(&ctx.client, &id, &ListOptions::new()).await?;
        remote.map(|tag| common::encode(&ProjectTagModel::from(&tag))).transpose()
    }

    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value> {
        let prior: ProjectTagModel = common::decode(TYPE_NAME, prior)?;
        let planned: ProjectTagModel = common::decode(TYPE_NAME, planned)?;
        let id = common::required("id", &prior.id)?;

        let patch = PatchProjectTag {
            name: common::changed_string(&prior.name, &planned.name),
            description: common::changed_string(&prior.description, &planned.description),
            color: common::changed_string(&prior.color, &planned.color),
        };

        let tag: ProjectTag = ctx.client.update(&id, &patch).await?;
        common::encode(&ProjectTagModel::from(&tag))
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: ProjectTagModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        common::delete_remote::<ProjectTag>(&ctx.client, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_wire_strings_are_null() {
        let tag: ProjectTag = serde_json::from_value(json!({
            "id": "t1",
            "project_id": "p1",
            "name": "regression",
            "description": "",
            "color": "#ff0000",
        }))
        .unwrap();

        let model = ProjectTagModel::from(&tag);

        assert!(model.description.is_null());
        assert_eq!(model.color, Attr::Known(String::from("#ff0000")));
        assert!(model.created.is_null());
    }

    #[test]
    fn test_project_id_forces_replacement() {
        let schema = ProjectTagResource.schema();
        assert!(schema.attributes["project_id"].force_new);
        assert!(!schema.attributes["name"].force_new);
    }
}
