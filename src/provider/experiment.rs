//! Experiments: `braintrust_experiment` resource and data sources.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext, Resource};
use crate::api::{CreateExperiment, Experiment, ListOptions, PatchExperiment};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_experiment";
const LIST_TYPE_NAME: &str = "braintrust_experiments";

/// State of one experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentModel {
    pub id: Attr<String>,
    pub project_id: Attr<String>,
    pub name: Attr<String>,
    pub description: Attr<String>,
    pub base_exp_id: Attr<String>,
    pub dataset_id: Attr<String>,
    pub dataset_version: Attr<String>,
    pub public: Attr<bool>,
    pub metadata: Attr<BTreeMap<String, String>>,
    pub created: Attr<String>,
    pub user_id: Attr<String>,
}

impl From<&Experiment> for ExperimentModel {
    fn from(experiment: &Experiment) -> Self {
        Self {
            id: Attr::Known(experiment.id.clone()),
            project_id: Attr::from_non_empty(experiment.project_id.clone()),
            name: Attr::Known(experiment.name.clone()),
            description: Attr::from_optional(experiment.description.as_deref()),
            base_exp_id: Attr::from_optional(experiment.base_exp_id.as_deref()),
            dataset_id: Attr::from_optional(experiment.dataset_id.as_deref()),
            dataset_version: Attr::from_optional(experiment.dataset_version.as_deref()),
            public: Attr::Known(experiment.public),
            metadata: common::metadata_attr(experiment.metadata.as_ref()),
            created: common::timestamp(experiment.created.as_ref()),
            user_id: Attr::from_optional(experiment.user_id.as_deref()),
        }
    }
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single experiment by id or name.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("name", Attribute::optional_computed_string())
        .with_attribute(
            "project_id",
            Attribute::optional_computed_string()
                .with_description("Restricts a name lookup to one project."),
        )
        .with_attribute("description", Attribute::computed_string())
        .with_attribute("base_exp_id", Attribute::computed_string())
        .with_attribute("dataset_id", Attribute::computed_string())
        .with_attribute("dataset_version", Attribute::computed_string())
        .with_attribute("public", Attribute::computed_bool())
        .with_attribute("metadata", Attribute::computed_string_map())
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("user_id", Attribute::computed_string())
}

/// `braintrust_experiment` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExperimentDataSource;

#[async_trait]
impl DataSource for ExperimentDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: ExperimentModel = common::decode(TYPE_NAME, config)?;
        let project_id = common::known_filter("project_id", &config.project_id)?;

        let experiment: Experiment = match common::selector(&config.id, &[("name", &config.name)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { value, .. } => {
                let options = ListOptions::new()
                    .with("experiment_name", value)
                    .with_opt("project_id", project_id);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&ExperimentModel::from(&experiment))
    }
}

/// State of the `braintrust_experiments` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentsModel {
    pub experiment_name: Attr<String>,
    pub project_id: Attr<String>,
    pub project_name: Attr<String>,
    pub org_name: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub experiments: Attr<Vec<ExperimentModel>>,
}

/// `braintrust_experiments` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExperimentsDataSource;

#[async_trait]
impl DataSource for ExperimentsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists experiments.")
            .with_attribute("experiment_name", Attribute::optional_string())
            .with_attribute("project_id", Attribute::optional_string())
            .with_attribute("project_name", Attribute::optional_string())
            .with_attribute("org_name", Attribute::optional_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "experiments",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: ExperimentsModel = common::decode(LIST_TYPE_NAME, config)?;

        let experiment_name = common::known_filter("experiment_name", &model.experiment_name)?;
        let project_id = common::known_filter("project_id", &model.project_id)?;
        let project_name = common::known_filter("project_name", &model.project_name)?;
        let org_name = common::known_filter("org_name", &model.org_name)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("project_id", project_id.is_some()), ("project_name", project_name.is_some()))?;
        common::exclusive(("ids", ids.is_some()), ("experiment_name", experiment_name.is_some()))?;
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with_opt("experiment_name", experiment_name)
            .with_opt("project_id", project_id)
            .with_opt("project_name", project_name)
            .with_opt("org_name", org_name)
            .with_ids(ids.unwrap_or_default());
        let experiments: Vec<Experiment> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&experiments));
        model.experiments = Attr::Known(experiments.iter().map(ExperimentModel::from).collect());
        common::encode(&model)
    }
}

/// `braintrust_experiment` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExperimentResource;

#[async_trait]
impl Resource for ExperimentResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A Braintrust experiment.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("project_id", Attribute::required_string().with_force_new())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "base_exp_id",
                Attribute::optional_string().with_description("Experiment to compare against."),
            )
            .with_attribute("dataset_id", Attribute::optional_string())
            .with_attribute("dataset_version", Attribute::optional_string())
            .with_attribute(
                "public",
                Attribute::optional_computed_bool()
                    .with_description("Whether the experiment is visible outside the organization."),
            )
            .with_attribute("metadata", Attribute::optional_string_map())
            .with_attribute("created", Attribute::computed_string())
            .with_attribute("user_id", Attribute::computed_string())
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: ExperimentModel = common::decode(TYPE_NAME, planned)?;
        let body = CreateExperiment {
            project_id: common::required("project_id", &planned.project_id)?,
            name: Some(common::required("name", &planned.name)?),
            description: common::optional(&planned.description),
            base_exp_id: common::optional(&planned.base_exp_id),
            dataset_id: common::optional(&planned.dataset_id),
            dataset_version: common::optional(&planned.dataset_version),
            public: planned.public.as_known().copied(),
            metadata: common::metadata_value(&planned.metadata),
            ensure_new: None,
        };

        let experiment: Experiment = ctx.client.create(&body).await?;
        common::encode(&ExperimentModel::from(&experiment))
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: ExperimentModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;

        let remote = common::read_remote::<Experiment>(&ctx.client, &id, &ListOptions::new()).await?;
        remote
            .map(|experiment| common::encode(&ExperimentModel::from(&experiment)))
            .transpose()
    }

    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value> {
        let prior: ExperimentModel = common::decode(TYPE_NAME, prior)?;
        let planned: ExperimentModel = common::decode(TYPE_NAME, planned)?;
        let id = common::required("id", &prior.id)?;

        let metadata = if planned.metadata == prior.metadata || planned.metadata.is_unknown() {
            None
        } else {
            Some(common::metadata_value(&planned.metadata).unwrap_or_default())
        };
        let patch = PatchExperiment {
            name: common::changed_string(&prior.name, &planned.name),
            description: common::changed_string(&prior.description, &planned.description),
            base_exp_id: common::changed_string(&prior.base_exp_id, &planned.base_exp_id),
            dataset_id: common::changed_string(&prior.dataset_id, &planned.dataset_id),
            dataset_version: common::changed_string(&prior.dataset_version, &planned.dataset_version),
            public: common::changed(&prior.public, &planned.public),
            metadata,
        };

        let experiment: Experiment = ctx.client.update(&id, &patch).await?;
        common::encode(&ExperimentModel::from(&experiment))
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: ExperimentModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        common::delete_remote::<Experiment>(&ctx.client, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_from_remote_keeps_public_flag() {
        let experiment: Experiment = serde_json::from_value(json!({
            "id": "e1",
            "project_id": "p1",
            "name": "baseline",
            "public": true,
            "dataset_id": null,
        }))
        .unwrap();

        let model = ExperimentModel::from(&experiment);

        assert_eq!(model.public, Attr::Known(true));
        assert!(model.dataset_id.is_null());
        assert!(model.metadata.is_null());
    }
}
