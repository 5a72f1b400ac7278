//! Projects: `braintrust_project` resource and data sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext, Resource};
use crate::api::{CreateProject, ListOptions, PatchProject, Project};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_project";
const LIST_TYPE_NAME: &str = "braintrust_projects";

/// State of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectModel {
    pub id: Attr<String>,
    pub name: Attr<String>,
    pub org_id: Attr<String>,
    pub org_name: Attr<String>,
    pub settings: Attr<String>,
    pub created: Attr<String>,
    pub user_id: Attr<String>,
}

impl ProjectModel {
    fn from_remote(project: &Project, org_name: Attr<String>, prior_settings: &Attr<String>) -> Result<Self> {
        Ok(Self {
            id: Attr::Known(project.id.clone()),
            name: Attr::Known(project.name.clone()),
            org_id: Attr::from_non_empty(project.org_id.clone()),
            org_name,
            settings: common::json_text(project.settings.as_ref(), prior_settings)?,
            created: common::timestamp(project.created.as_ref()),
            user_id: Attr::from_optional(project.user_id.as_deref()),
        })
    }
}

fn resource_schema() -> Schema {
    Schema::v0()
        .with_description("A Braintrust project.")
        .with_attribute("id", Attribute::computed_string().with_description("Project id."))
        .with_attribute("name", Attribute::required_string().with_description("Project name."))
        .with_attribute(
            "org_name",
            Attribute::optional_string()
                .with_force_new()
                .with_description("Organization to create the project in. Defaults to the provider's org_name."),
        )
        .with_attribute("org_id", Attribute::computed_string())
        .with_attribute(
            "settings",
            Attribute::optional_computed_string().with_description("Project settings as JSON."),
        )
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("user_id", Attribute::computed_string())
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single project by id or name.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("name", Attribute::optional_computed_string())
        .with_attribute(
            "org_name",
            Attribute::optional_string().with_description("Restricts a name lookup to one organization."),
        )
        .with_attribute("org_id", Attribute::computed_string())
        .with_attribute("settings", Attribute::computed_string())
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("user_id", Attribute::computed_string())
}

/// `braintrust_project` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectDataSource;

#[async_trait]
impl DataSource for ProjectDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: ProjectModel = common::decode(TYPE_NAME, config)?;
        let org_name = common::known_filter("org_name", &config.org_name)?;

        let project: Project = match common::selector(&config.id, &[("name", &config.name)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { value, .. } => {
                let options = ListOptions::new()
                    .with("project_name", value)
                    .with_opt("org_name", org_name);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&ProjectModel::from_remote(
            &project,
            config.org_name.clone(),
            &Attr::Null,
        )?)
    }
}

/// State of the `braintrust_projects` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsModel {
    pub project_name: Attr<String>,
    pub org_name: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub projects: Attr<Vec<ProjectModel>>,
}

/// `braintrust_projects` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectsDataSource;

#[async_trait]
impl DataSource for ProjectsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists projects.")
            .with_attribute("project_name", Attribute::optional_string())
            .with_attribute("org_name", Attribute::optional_string())
            .with_attribute(
                "ids",
                Attribute::optional_computed_string_list()
                    .with_description("Restricts the listing to these ids; set to the ids found."),
            )
            .with_attribute(
                "limit",
                Attribute::optional_int64().with_description("Maximum number of projects to fetch."),
            )
            .with_attribute(
                "projects",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: ProjectsModel = common::decode(LIST_TYPE_NAME, config)?;

        let project_name = common::known_filter("project_name", &model.project_name)?;
        let org_name = common::known_filter("org_name", &model.org_name)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("ids", ids.is_some()), ("project_name", project_name.is_some()))?;
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with_opt("project_name", project_name)
            .with_opt("org_name", org_name)
            .with_ids(ids.unwrap_or_default());
        let projects: Vec<Project> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&projects));
        model.projects = Attr::Known(
            projects
                .iter()
                .map(|project| ProjectModel::from_remote(project, Attr::Null, &Attr::Null))
                .collect::<Result<_>>()?,
        );
        common::encode(&model)
    }
}

/// `braintrust_project` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectResource;

#[async_trait]
impl Resource for ProjectResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        resource_schema()
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: ProjectModel = common::decode(TYPE_NAME, planned)?;
        let body = CreateProject {
            name: common::required("name", &planned.name)?,
            org_name: common::optional(&planned.org_name).or_else(|| ctx.org_name.clone()),
        };
        let settings = common::parse_json_text("settings", &planned.settings)?;

        let mut project: Project = ctx.client.create(&body).await?;
        if settings.is_some() {
            let patch = PatchProject {
                settings,
                ..Default::default()
            };
            project = ctx.client.update(&project.id, &patch).await?;
        }

        common::encode(&ProjectModel::from_remote(
            &project,
            planned.org_name,
            &planned.settings,
        )?)
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: ProjectModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;

        let Some(project) =
            common::read_remote::<Project>(&ctx.client, &id, &ListOptions::new()).await?
        else {
            return Ok(None);
        };
        common::encode(&ProjectModel::from_remote(&project, state.org_name, &state.settings)?)
            .map(Some)
    }

    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value> {
        let prior: ProjectModel = common::decode(TYPE_NAME, prior)?;
        let planned: ProjectModel = common::decode(TYPE_NAME, planned)?;
        let id = common::required("id", &prior.id)?;

        let settings = if common::changed_string(&prior.settings, &planned.settings).is_some() {
            common::parse_json_text("settings", &planned.settings)?
                .or_else(|| Some(Value::Object(serde_json::Map::new())))
        } else {
            None
        };
        let patch = PatchProject {
            name: common::changed_string(&prior.name, &planned.name),
            settings,
        };

        let project: Project = ctx.client.update(&id, &patch).await?;
        common::encode(&ProjectModel::from_remote(
            &project,
            planned.org_name,
            &planned.settings,
        )?)
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: ProjectModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        common::delete_remote::<Project>(&ctx.client, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_from_remote() {
        let project: Project = serde_json::from_value(json!({
            "id": "p1",
            "org_id": "o1",
            "name": "demo",
            "created": "2024-05-01T12:00:00Z",
            "settings": {"comparison_key": "input"},
        }))
        .unwrap();

        let model = ProjectModel::from_remote(&project, Attr::Null, &Attr::Null).unwrap();

        assert_eq!(model.name, Attr::Known(String::from("demo")));
        assert_eq!(model.created, Attr::Known(String::from("2024-05-01T12:00:00Z")));
        assert_eq!(
            model.settings,
            Attr::Known(String::from("{\"comparison_key\":\"input\"}"))
        );
        assert!(model.user_id.is_null());
    }

    #[test]
    fn test_element_schema_is_computed() {
        let schema = ProjectsDataSource.schema();
        assert!(schema.attributes["projects"].flags.computed);
        assert!(schema.attributes["ids"].flags.optional);
    }
}
