//! ACLs: `braintrust_acl` resource and data sources.
//!
//! An ACL grants one user or group either a permission or a role on one
//! object. ACLs cannot be edited; every attribute forces a replacement.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common;
use super::{DataSource, ProviderContext, Resource};
use crate::api::{Acl, CreateAcl, ListOptions};
use crate::error::{InputError, Result};
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_acl";
const LIST_TYPE_NAME: &str = "braintrust_acls";

/// State of one ACL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclModel {
    pub id: Attr<String>,
    pub object_type: Attr<String>,
    pub object_id: Attr<String>,
    pub user_id: Attr<String>,
    pub group_id: Attr<String>,
    pub permission: Attr<String>,
    pub restrict_object_type: Attr<String>,
    pub role_id: Attr<String>,
    pub object_org_id: Attr<String>,
    pub created: Attr<String>,
}

impl From<&Acl> for AclModel {
    fn from(acl: &Acl) -> Self {
        Self {
            id: Attr::Known(acl.id.clone()),
            object_type: Attr::from_non_empty(acl.object_type.clone()),
            object_id: Attr::from_non_empty(acl.object_id.clone()),
            user_id: Attr::from_optional(acl.user_id.as_deref()),
            group_id: Attr::from_optional(acl.group_id.as_deref()),
            permission: Attr::from_optional(acl.permission.as_deref()),
            restrict_object_type: Attr::from_optional(acl.restrict_object_type.as_deref()),
            role_id: Attr::from_optional(acl.role_id.as_deref()),
            object_org_id: Attr::from_optional(acl.object_org_id.as_deref()),
            created: common::timestamp(acl.created.as_ref()),
        }
    }
}

/// Requires exactly one of two string attributes to be set.
fn exactly_one(first: (&str, &Attr<String>), second: (&str, &Attr<String>)) -> Result<()> {
    match (first.1.non_empty(), second.1.non_empty()) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        (Some(_), Some(_)) => Err(InputError::conflicting(first.0, second.0).into()),
        (None, None) => Err(InputError::ExactlyOneOf {
            attributes: vec![first.0.to_string(), second.0.to_string()],
        }
        .into()),
    }
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single ACL by id.")
        .with_attribute("id", Attribute::required_string())
        .with_attribute("object_type", Attribute::computed_string())
        .with_attribute("object_id", Attribute::computed_string())
        .with_attribute("user_id", Attribute::computed_string())
        .with_attribute("group_id", Attribute::computed_string())
        .with_attribute("permission", Attribute::computed_string())
        .with_attribute("restrict_object_type", Attribute::computed_string())
        .with_attribute("role_id", Attribute::computed_string())
        .with_attribute("object_org_id", Attribute::computed_string())
        .with_attribute("created", Attribute::computed_string())
}

/// `braintrust_acl` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct AclDataSource;

#[async_trait]
impl DataSource for AclDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: AclModel = common::decode(TYPE_NAME, config)?;
        let id = match common::selector(&config.id, &[])? {
            common::Selector::Id(id) => id,
            common::Selector::By { key, .. } => {
                return Err(InputError::invalid(key, "ACLs can only be looked up by id").into());
            }
        };

        let acl: Acl = common::find_by_id(&ctx.client, id, &ListOptions::new()).await?;
        common::encode(&AclModel::from(&acl))
    }
}

/// State of the `braintrust_acls` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AclsModel {
    pub object_type: Attr<String>,
    pub object_id: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub acls: Attr<Vec<AclModel>>,
}

/// `braintrust_acls` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct AclsDataSource;

#[async_trait]
impl DataSource for AclsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists the ACLs on one object.")
            .with_attribute("object_type", Attribute::required_string())
            .with_attribute("object_id", Attribute::required_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "acls",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: AclsModel = common::decode(LIST_TYPE_NAME, config)?;

        let object_type = common::required("object_type", &model.object_type)?;
        let object_id = common::required("object_id", &model.object_id)?;
        let ids = common::known_ids(&model.ids)?;
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with("object_type", object_type)
            .with("object_id", object_id)
            .with_ids(ids.unwrap_or_default());
        let acls: Vec<Acl> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&acls));
        model.acls = Attr::Known(acls.iter().map(AclModel::from).collect());
        common::encode(&model)
    }
}

/// `braintrust_acl` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct AclResource;

#[async_trait]
impl Resource for AclResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A Braintrust access control entry.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "object_type",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("Type of the protected object, e.g. `project`."),
            )
            .with_attribute("object_id", Attribute::required_string().with_force_new())
            .with_attribute(
                "user_id",
                Attribute::optional_string()
                    .with_force_new()
                    .with_description("Grantee user. Conflicts with `group_id`."),
            )
            .with_attribute(
                "group_id",
                Attribute::optional_string()
                    .with_force_new()
                    .with_description("Grantee group. Conflicts with `user_id`."),
            )
            .with_attribute(
                "permission",
                Attribute::optional_string()
                    .with_force_new()
                    .with_description("Granted permission. Conflicts with `role_id`."),
            )
            .with_attribute(
                "restrict_object_type",
                Attribute::optional_string().with_force_new(),
            )
            .with_attribute(
                "role_id",
                Attribute::optional_string()
                    .with_force_new()
                    .with_description("Granted role. Conflicts with `permission`."),
            )
            .with_attribute("object_org_id", Attribute::computed_string())
            .with_attribute("created", Attribute::computed_string())
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: AclModel = common::decode(TYPE_NAME, planned)?;
        exactly_one(("user_id", &planned.user_id), ("group_id", &planned.group_id))?;
        exactly_one(("permission", &planned.permission), ("role_id", &planned.role_id))?;

        let body = CreateAcl {
            object_type: common::required("object_type", &planned.object_type)?,
            object_id: common::required("object_id", &planned.object_id)?,
            user_id: common::optional(&planned.user_id),
            group_id: common::optional(&planned.group_id),
            permission: common::optional(&planned.permission),
            restrict_object_type: common::optional(&planned.restrict_object_type),
            role_id: common::optional(&planned.role_id),
        };

        let acl: Acl = ctx.client.create(&body).await?;
        common::encode(&AclModel::from(&acl))
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: AclModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;

        let remote = common::read_remote::<Acl>(&ctx.client, &id, &ListOptions::new()).await?;
        remote.map(|acl| common::encode(&AclModel::from(&acl))).transpose()
    }

    async fn update(&self, _ctx: &ProviderContext, _prior: Value, _planned: Value) -> Result<Value> {
        Err(InputError::UpdateNotSupported {
            kind: "acl",
            reason: String::from("every attribute forces a new ACL"),
        }
        .into())
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: AclModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        common::delete_remote::<Acl>(&ctx.client, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    fn known(value: &str) -> Attr<String> {
        Attr::Known(value.to_string())
    }

    #[test]
    fn test_exactly_one_grantee() {
        assert!(exactly_one(("user_id", &known("u1")), ("group_id", &Attr::Null)).is_ok());
        assert!(matches!(
            exactly_one(("user_id", &known("u1")), ("group_id", &known("g1"))),
            Err(ProviderError::Input(InputError::Conflicting { .. }))
        ));
        assert!(matches!(
            exactly_one(("user_id", &Attr::Null), ("group_id", &known(""))),
            Err(ProviderError::Input(InputError::ExactlyOneOf { .. }))
        ));
    }

    #[tokio::test]
    async fn test_update_is_refused() {
        let config = crate::config::ResolvedConfig {
            api_key: String::from("sk-test"),
            ..Default::default()
        };
        let ctx = ProviderContext::from_config(&config).unwrap();

        let err = AclResource
            .update(&ctx, serde_json::json!({}), serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Input(InputError::UpdateNotSupported { kind: "acl", .. })
        ));
    }
}
