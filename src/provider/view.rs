//! Saved views: `braintrust_view` resource and data sources.
//!
//! Views live inside an object (`object_type` + `object_id`) and every
//! request carries that scope. Imports therefore take
//! `<object_type>/<object_id>/<view_id>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext, Resource};
use crate::api::{CreateView, ListOptions, PatchView, View, ViewScope};
use crate::error::{InputError, Result};
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_view";
const LIST_TYPE_NAME: &str = "braintrust_views";

/// State of one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewModel {
    pub id: Attr<String>,
    pub object_type: Attr<String>,
    pub object_id: Attr<String>,
    pub view_type: Attr<String>,
    pub name: Attr<String>,
    pub view_data: Attr<String>,
    pub options: Attr<String>,
    pub created: Attr<String>,
    pub user_id: Attr<String>,
}

impl ViewModel {
    fn from_remote(view: &View, prior: &Self) -> Result<Self> {
        Ok(Self {
            id: Attr::Known(view.id.clone()),
            object_type: Attr::from_non_empty(view.object_type.clone()),
            object_id: Attr::from_non_empty(view.object_id.clone()),
            view_type: Attr::from_optional(view.view_type.as_deref()),
            name: Attr::Known(view.name.clone()),
            view_data: common::json_text(view.view_data.as_ref(), &prior.view_data)?,
            options: common::json_text(view.options.as_ref(), &prior.options)?,
            created: common::timestamp(view.created.as_ref()),
            user_id: Attr::from_optional(view.user_id.as_deref()),
        })
    }

    fn scope(&self) -> Result<ViewScope> {
        Ok(ViewScope::new(
            common::required("object_type", &self.object_type)?,
            common::required("object_id", &self.object_id)?,
        ))
    }
}

fn scope_options(scope: &ViewScope) -> ListOptions {
    ListOptions::new()
        .with("object_type", scope.object_type.as_str())
        .with("object_id", scope.object_id.as_str())
}

/// Splits `<object_type>/<object_id>/<view_id>`.
fn parse_import_id(id: &str) -> Result<(ViewScope, &str)> {
    let parts: Vec<&str> = id.split('/').collect();
    match parts.as_slice() {
        [object_type, object_id, view_id]
            if !object_type.is_empty() && !object_id.is_empty() && !view_id.is_empty() =>
        {
            common::validate_uuid("id", view_id)?;
            Ok((ViewScope::new(*object_type, *object_id), *view_id))
        }
        _ => Err(InputError::invalid(
            "id",
            format!("expected <object_type>/<object_id>/<view_id>, got \"{id}\""),
        )
        .into()),
    }
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single view by id or name within an object.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("name", Attribute::optional_computed_string())
        .with_attribute("object_type", Attribute::required_string())
        .with_attribute("object_id", Attribute::required_string())
        .with_attribute("view_type", Attribute::computed_string())
        .with_attribute("view_data", Attribute::computed_string())
        .with_attribute("options", Attribute::computed_string())
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("user_id", Attribute::computed_string())
}

/// `braintrust_view` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewDataSource;

#[async_trait]
impl DataSource for ViewDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: ViewModel = common::decode(TYPE_NAME, config)?;
        let options = scope_options(&config.scope()?);

        let view: View = match common::selector(&config.id, &[("name", &config.name)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &options).await?,
            Selector::By { value, .. } => {
                let options = options.with("view_name", value);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&ViewModel::from_remote(&view, &ViewModel::default())?)
    }
}

/// State of the `braintrust_views` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsModel {
    pub object_type: Attr<String>,
    pub object_id: Attr<String>,
    pub view_name: Attr<String>,
    pub view_type: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub views: Attr<Vec<ViewModel>>,
}

/// `braintrust_views` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewsDataSource;

#[async_trait]
impl DataSource for ViewsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists the views of one object.")
            .with_attribute("object_type", Attribute::required_string())
            .with_attribute("object_id", Attribute::required_string())
            .with_attribute("view_name", Attribute::optional_string())
            .with_attribute("view_type", Attribute::optional_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "views",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: ViewsModel = common::decode(LIST_TYPE_NAME, config)?;

        let scope = ViewScope::new(
            common::required("object_type", &model.object_type)?,
            common::required("object_id", &model.object_id)?,
        );
        let view_name = common::known_filter("view_name", &model.view_name)?;
        let view_type = common::known_filter("view_type", &model.view_type)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("ids", ids.is_some()), ("view_name", view_name.is_some()))?;
        let limit = common::validate_limit(&model.limit)?;

        let options = scope_options(&scope)
            .with_opt("view_name", view_name)
            .with_opt("view_type", view_type)
            .with_ids(ids.unwrap_or_default());
        let views: Vec<View> = common::list_live(&ctx.client, &options, limit).await?;

        let empty = ViewModel::default();
        model.ids = Attr::Known(common::ids_of(&views));
        model.views = Attr::Known(
            views
                .iter()
                .map(|view| ViewModel::from_remote(view, &empty))
                .collect::<Result<_>>()?,
        );
        common::encode(&model)
    }
}

/// `braintrust_view` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewResource;

#[async_trait]
impl Resource for ViewResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A saved table view.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "object_type",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("Type of the object the view belongs to."),
            )
            .with_attribute("object_id", Attribute::required_string().with_force_new())
            .with_attribute(
                "view_type",
                Attribute::required_string()
                    .with_description("Table the view applies to, e.g. `experiments`."),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "view_data",
                Attribute::optional_string().with_description("View definition as JSON."),
            )
            .with_attribute(
                "options",
                Attribute::optional_string().with_description("Display options as JSON."),
            )
            .with_attribute("created", Attribute::computed_string())
            .with_attribute("user_id", Attribute::computed_string())
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: ViewModel = common::decode(TYPE_NAME, planned)?;
        let scope = planned.scope()?;
        let body = CreateView {
            object_type: scope.object_type,
            object_id: scope.object_id,
            view_type: common::required("view_type", &planned.view_type)?,
            name: common::required("name", &planned.name)?,
            view_data: common::parse_json_text("view_data", &planned.view_data)?,
            options: common::parse_json_text("options", &planned.options)?,
        };

        let view: View = ctx.client.create(&body).await?;
        common::encode(&ViewModel::from_remote(&view, &planned)?)
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: ViewModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        let options = scope_options(&state.scope()?);

        let Some(view) = common::read_remote::<View>(&ctx.client, &id, &options).await? else {
            return Ok(None);
        };
        common::encode(&ViewModel::from_remote(&view, &state)?).map(Some)
    }

    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value> {
        let prior: ViewModel = common::decode(TYPE_NAME, prior)?;
        let planned: ViewModel = common::decode(TYPE_NAME, planned)?;
        let id = common::required("id", &prior.id)?;
        let scope = prior.scope()?;

        let patch = PatchView {
            object_type: scope.object_type,
            object_id: scope.object_id,
            view_type: common::changed_string(&prior.view_type, &planned.view_type),
            name: common::changed_string(&prior.name, &planned.name),
            view_data: changed_json("view_data", &prior.view_data, &planned.view_data)?,
            options: changed_json("options", &prior.options, &planned.options)?,
        };

        let view: View = ctx.client.update(&id, &patch).await?;
        common::encode(&ViewModel::from_remote(&view, &planned)?)
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: ViewModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        let scope = state.scope()?;

        match ctx.client.delete_scoped::<View, _>(&id, &scope).await {
            Err(err) if err.is_not_found() => {
                debug!("view {id} was already deleted");
                Ok(())
            }
            other => other,
        }
    }

    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<Option<Value>> {
        let (scope, view_id) = parse_import_id(id)?;
        let state = ViewModel {
            id: Attr::Known(view_id.to_string()),
            object_type: Attr::Known(scope.object_type),
            object_id: Attr::Known(scope.object_id),
            ..ViewModel::default()
        };
        self.read(ctx, common::encode(&state)?).await
    }
}

/// JSON text that changed; a cleared value is sent as an empty object.
fn changed_json(attribute: &str, prior: &Attr<String>, planned: &Attr<String>) -> Result<Option<Value>> {
    if common::changed_string(prior, planned).is_none() {
        return Ok(None);
    }
    Ok(common::parse_json_text(attribute, planned)?
        .or_else(|| Some(Value::Object(serde_json::Map::new()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_id() {
        let (scope, id) =
            parse_import_id("project/p1/8b1c6b1e-3f0a-4c57-9d1a-3d0f5c1e2a44").unwrap();
        assert_eq!(scope, ViewScope::new("project", "p1"));
        assert_eq!(id, "8b1c6b1e-3f0a-4c57-9d1a-3d0f5c1e2a44");

        assert!(parse_import_id("8b1c6b1e-3f0a-4c57-9d1a-3d0f5c1e2a44").is_err());
        assert!(parse_import_id("project//8b1c6b1e-3f0a-4c57-9d1a-3d0f5c1e2a44").is_err());
        assert!(parse_import_id("project/p1/not-a-uuid").is_err());
    }

    #[test]
    fn test_changed_json_clears_to_empty_object() {
        let prior = Attr::Known(String::from("{\"a\":1}"));

        assert_eq!(changed_json("view_data", &prior, &prior).unwrap(), None);
        assert_eq!(
            changed_json("view_data", &prior, &Attr::Null).unwrap(),
            Some(serde_json::json!({}))
        );
        assert!(changed_json("view_data", &prior, &Attr::Known(String::from("{"))).is_err());
    }
}
