//! Datasets: `braintrust_dataset` resource and data sources.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext, Resource};
use crate::api::{CreateDataset, Dataset, ListOptions, PatchDataset};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_dataset";
const LIST_TYPE_NAME: &str = "braintrust_datasets";

/// State of one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetModel {
    pub id: Attr<String>,
    pub project_id: Attr<String>,
    pub name: Attr<String>,
    pub description: Attr<String>,
    pub metadata: Attr<BTreeMap<String, String>>,
    pub created: Attr<String>,
    pub user_id: Attr<String>,
}

impl From<&Dataset> for DatasetModel {
    fn from(dataset: &Dataset) -> Self {
        Self {
            id: Attr::Known(dataset.id.clone()),
            project_id: Attr::from_non_empty(dataset.project_id.clone()),
            name: Attr::Known(dataset.name.clone()),
            description: Attr::from_optional(dataset.description.as_deref()),
            metadata: common::metadata_attr(dataset.metadata.as_ref()),
            created: common::timestamp(dataset.created.as_ref()),
            user_id: Attr::from_optional(dataset.user_id.as_deref()),
        }
    }
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single dataset by id or name.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("name", Attribute::optional_computed_string())
        .with_attribute(
            "project_id",
            Attribute::optional_computed_string()
                .with_description("Restricts a name lookup to one project."),
        )
        .with_attribute("description", Attribute::computed_string())
        .with_attribute("metadata", Attribute::computed_string_map())
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("user_id", Attribute::computed_string())
}

/// `braintrust_dataset` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetDataSource;

#[async_trait]
impl DataSource for DatasetDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: DatasetModel = common::decode(TYPE_NAME, config)?;
        let project_id = common::known_filter("project_id", &config.project_id)?;

        let dataset: Dataset = match common::selector(&config.id, &[("name", &config.name)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { value, .. } => {
                let options = ListOptions::new()
                    .with("dataset_name", value)
                    .with_opt("project_id", project_id);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&DatasetModel::from(&dataset))
    }
}

/// State of the `braintrust_datasets` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetsModel {
    pub dataset_name: Attr<String>,
    pub project_id: Attr<String>,
    pub project_name: Attr<String>,
    pub org_name: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub datasets: Attr<Vec<DatasetModel>>,
}

/// `braintrust_datasets` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetsDataSource;

#[async_trait]
impl DataSource for DatasetsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists datasets.")
            .with_attribute("dataset_name", Attribute::optional_string())
            .with_attribute("project_id", Attribute::optional_string())
            .with_attribute("project_name", Attribute::optional_string())
            .with_attribute("org_name", Attribute::optional_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "datasets",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: DatasetsModel = common::decode(LIST_TYPE_NAME, config)?;

        let dataset_name = common::known_filter("dataset_name", &model.dataset_name)?;
        let project_id = common::known_filter("project_id", &model.project_id)?;
        let project_name = common::known_filter("project_name", &model.project_name)?;
        let org_name = common::known_filter("org_name", &model.org_name)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("project_id", project_id.is_some()), ("project_name", project_name.is_some()))?;
        common::exclusive(("ids", ids.is_some()), ("dataset_name", dataset_name.is_some()))?;
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with_opt("dataset_name", dataset_name)
            .with_opt("project_id", project_id)
            .with_opt("project_name", project_name)
            .with_opt("org_name", org_name)
            .with_ids(ids.unwrap_or_default());
        let datasets: Vec<Dataset> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&datasets));
        model.datasets = Attr::Known(datasets.iter().map(DatasetModel::from).collect());
        common::encode(&model)
    }
}

/// `braintrust_dataset` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetResource;

#[async_trait]
impl Resource for DatasetResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A Braintrust dataset.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "project_id",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("Project the dataset belongs to."),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "metadata",
                Attribute::optional_string_map().with_description("User metadata."),
            )
            .with_attribute("created", Attribute::computed_string())
            .with_attribute("user_id", Attribute::computed_string())
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: DatasetModel = common::decode(TYPE_NAME, planned)?;
        let body = CreateDataset {
            project_id: common::required("project_id", &planned.project_id)?,
            name: common::required("name", &planned.name)?,
            description: common::optional(&planned.description),
            metadata: common::metadata_value(&planned.metadata),
        };

        let dataset: Dataset = ctx.client.create(&body).await?;
        common::encode(&DatasetModel::from(&dataset))
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: DatasetModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;

        let remote = common::read_remote::<Dataset>(&ctx.client, &id, &ListOptions::new()).await?;
        remote
            .map(|dataset| common::encode(&DatasetModel::from(&dataset)))
            .transpose()
    }

    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value> {
        let prior: DatasetModel = common::decode(TYPE_NAME, prior)?;
        let planned: DatasetModel = common::decode(TYPE_NAME, planned)?;
        let id = common::required("id", &prior.id)?;

        let metadata = if planned.metadata == prior.metadata || planned.metadata.is_unknown() {
            None
        } else {
            Some(common::metadata_value(&planned.metadata).unwrap_or_default())
        };
        let patch = PatchDataset {
            name: common::changed_string(&prior.name, &planned.name),
            description: common::changed_string(&prior.description, &planned.description),
            metadata,
        };

        let dataset: Dataset = ctx.client.update(&id, &patch).await?;
        common::encode(&DatasetModel::from(&dataset))
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: DatasetModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        common::delete_remote::<Dataset>(&ctx.client, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_description_maps_to_null() {
        let dataset: Dataset = serde_json::from_value(json!({
            "id": "d1",
            "project_id": "p1",
            "name": "golden",
            "description": "",
            "metadata": {"owner": "ml"},
        }))
        .unwrap();

        let model = DatasetModel::from(&dataset);

        assert!(model.description.is_null());
        assert_eq!(model.metadata.as_known().unwrap()["owner"], "ml");
    }
}
