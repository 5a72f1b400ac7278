//! Groups: `braintrust_group` resource and data sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext, Resource};
use crate::api::{CreateGroup, Group, ListOptions, PatchGroup};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};
use crate::reconcile::diff_membership;

const TYPE_NAME: &str = "braintrust_group";
const LIST_TYPE_NAME: &str = "braintrust_groups";

/// State of one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupModel {
    pub id: Attr<String>,
    pub name: Attr<String>,
    pub description: Attr<String>,
    pub member_users: Attr<Vec<String>>,
    pub member_groups: Attr<Vec<String>>,
    pub org_name: Attr<String>,
    pub org_id: Attr<String>,
    pub created: Attr<String>,
    pub user_id: Attr<String>,
}

impl GroupModel {
    fn from_remote(group: &Group, org_name: Attr<String>) -> Self {
        Self {
            id: Attr::Known(group.id.clone()),
            name: Attr::Known(group.name.clone()),
            description: Attr::from_optional(group.description.as_deref()),
            member_users: common::string_list(group.member_users.as_ref()),
            member_groups: common::string_list(group.member_groups.as_ref()),
            org_name,
            org_id: Attr::from_non_empty(group.org_id.clone()),
            created: common::timestamp(group.created.as_ref()),
            user_id: Attr::from_optional(group.user_id.as_deref()),
        }
    }
}

fn build_patch(remote: &Group, prior: &GroupModel, planned: &GroupModel) -> PatchGroup {
    let users = diff_membership(
        remote.member_users.as_deref().unwrap_or_default(),
        &planned.member_users,
    );
    let groups = diff_membership(
        remote.member_groups.as_deref().unwrap_or_default(),
        &planned.member_groups,
    );
    debug!(
        "Group {} membership: +{} -{} users, +{} -{} groups",
        remote.id,
        users.to_add.len(),
        users.to_remove.len(),
        groups.to_add.len(),
        groups.to_remove.len()
    );

    PatchGroup {
        name: common::changed_string(&prior.name, &planned.name),
        description: common::changed_string(&prior.description, &planned.description),
        add_member_users: users.additions().map(<[_]>::to_vec),
        remove_member_users: users.removals().map(<[_]>::to_vec),
        add_member_groups: groups.additions().map(<[_]>::to_vec),
        remove_member_groups: groups.removals().map(<[_]>::to_vec),
    }
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single group by id or name.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("name", Attribute::optional_computed_string())
        .with_attribute("description", Attribute::computed_string())
        .with_attribute("member_users", Attribute::computed_string_list())
        .with_attribute("member_groups", Attribute::computed_string_list())
        .with_attribute("org_name", Attribute::optional_string())
        .with_attribute("org_id", Attribute::computed_string())
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("user_id", Attribute::computed_string())
}

/// `braintrust_group` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupDataSource;

#[async_trait]
impl DataSource for GroupDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: GroupModel = common::decode(TYPE_NAME, config)?;
        let org_name = common::known_filter("org_name", &config.org_name)?;

        let group: Group = match common::selector(&config.id, &[("name", &config.name)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { value, .. } => {
                let options = ListOptions::new()
                    .with("group_name", value)
                    .with_opt("org_name", org_name);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&GroupModel::from_remote(&group, config.org_name.clone()))
    }
}

/// State of the `braintrust_groups` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupsModel {
    pub group_name: Attr<String>,
    pub org_name: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub groups: Attr<Vec<GroupModel>>,
}

/// `braintrust_groups` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupsDataSource;

#[async_trait]
impl DataSource for GroupsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists groups.")
            .with_attribute("group_name", Attribute::optional_string())
            .with_attribute("org_name", Attribute::optional_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "groups",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: GroupsModel = common::decode(LIST_TYPE_NAME, config)?;

        let group_name = common::known_filter("group_name", &model.group_name)?;
        let org_name = common::known_filter("org_name", &model.org_name)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("ids", ids.is_some()), ("group_name", group_name.is_some()))?;
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with_opt("group_name", group_name)
            .with_opt("org_name", org_name)
            .with_ids(ids.unwrap_or_default());
        let groups: Vec<Group> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&groups));
        model.groups = Attr::Known(
            groups
                .iter()
                .map(|group| GroupModel::from_remote(group, Attr::Null))
                .collect(),
        );
        common::encode(&model)
    }
}

/// `braintrust_group` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupResource;

#[async_trait]
impl Resource for GroupResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A Braintrust permission group.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "member_users",
                Attribute::optional_string_list().with_description("Ids of member users."),
            )
            .with_attribute(
                "member_groups",
                Attribute::optional_string_list()
                    .with_description("Ids of groups whose members belong to this group."),
            )
            .with_attribute("org_name", Attribute::optional_string().with_force_new())
            .with_attribute("org_id", Attribute::computed_string())
            .with_attribute("created", Attribute::computed_string())
            .with_attribute("user_id", Attribute::computed_string())
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: GroupModel = common::decode(TYPE_NAME, planned)?;
        let body = CreateGroup {
            name: common::required("name", &planned.name)?,
            description: common::optional(&planned.description),
            member_users: planned.member_users.as_known().cloned(),
            member_groups: planned.member_groups.as_known().cloned(),
            org_name: common::optional(&planned.org_name).or_else(|| ctx.org_name.clone()),
        };

        let group: Group = ctx.client.create(&body).await?;
        common::encode(&GroupModel::from_remote(&group, planned.org_name))
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: GroupModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;

        let remote = common::read_remote::<Group>(&ctx.client, &id, &ListOptions::new()).await?;
        remote
            .map(|group| common::encode(&GroupModel::from_remote(&group, state.org_name)))
            .transpose()
    }

    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value> {
        let prior: GroupModel = common::decode(TYPE_NAME, prior)?;
        let planned: GroupModel = common::decode(TYPE_NAME, planned)?;
        let id = common::required("id", &prior.id)?;

        let remote: Group = ctx.client.get(&id).await?;
        let patch = build_patch(&remote, &prior, &planned);

        let group: Group = ctx.client.update(&id, &patch).await?;
        common::encode(&GroupModel::from_remote(&group, planned.org_name))
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: GroupModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        common::delete_remote::<Group>(&ctx.client, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_diffs_users_and_groups() {
        let remote: Group = serde_json::from_value(json!({
            "id": "g1",
            "org_id": "o1",
            "name": "reviewers",
            "member_users": ["u1", "u2"],
            "member_groups": ["g9"],
        }))
        .unwrap();
        let prior = GroupModel::from_remote(&remote, Attr::Null);
        let planned = GroupModel {
            name: Attr::Known(String::from("approvers")),
            member_users: Attr::Known(vec![String::from("u2"), String::from("u3")]),
            ..prior.clone()
        };

        let patch = build_patch(&remote, &prior, &planned);

        assert_eq!(patch.name.as_deref(), Some("approvers"));
        assert_eq!(patch.add_member_users, Some(vec![String::from("u3")]));
        assert_eq!(patch.remove_member_users, Some(vec![String::from("u1")]));
        assert!(patch.add_member_groups.is_none());
        assert!(patch.remove_member_groups.is_none());
    }
}
