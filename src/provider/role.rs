//! Roles: `braintrust_role` resource and data sources.
//!
//! The API only changes role membership incrementally, so updates read the
//! remote role and send the `add_*` / `remove_*` deltas toward the plan.
//! Only unrestricted permission grants are managed; grants limited to an
//! object type are left untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext, Resource};
use crate::api::{CreateRole, ListOptions, MemberPermission, PatchRole, Role};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};
use crate::reconcile::diff_membership;

const TYPE_NAME: &str = "braintrust_role";
const LIST_TYPE_NAME: &str = "braintrust_roles";

/// State of one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleModel {
    pub id: Attr<String>,
    pub name: Attr<String>,
    pub description: Attr<String>,
    pub member_permissions: Attr<Vec<String>>,
    pub member_roles: Attr<Vec<String>>,
    pub org_name: Attr<String>,
    pub org_id: Attr<String>,
    pub created: Attr<String>,
    pub user_id: Attr<String>,
}

impl RoleModel {
    fn from_remote(role: &Role, org_name: Attr<String>) -> Self {
        let permissions: Vec<String> = unrestricted(role)
            .into_iter()
            .map(|grant| grant.permission)
            .collect();
        Self {
            id: Attr::Known(role.id.clone()),
            name: Attr::Known(role.name.clone()),
            description: Attr::from_optional(role.description.as_deref()),
            member_permissions: common::string_list(Some(&permissions)),
            member_roles: common::string_list(role.member_roles.as_ref()),
            org_name,
            org_id: Attr::from_optional(role.org_id.as_deref()),
            created: common::timestamp(role.created.as_ref()),
            user_id: Attr::from_optional(role.user_id.as_deref()),
        }
    }
}

fn unrestricted(role: &Role) -> Vec<MemberPermission> {
    role.member_permissions
        .iter()
        .flatten()
        .filter(|grant| grant.restrict_object_type.as_deref().is_none_or(str::is_empty))
        .map(|grant| MemberPermission::new(grant.permission.clone()))
        .collect()
}

fn grants(permissions: &Attr<Vec<String>>) -> Attr<Vec<MemberPermission>> {
    permissions
        .clone()
        .map(|names| names.into_iter().map(MemberPermission::new).collect())
}

/// Builds the patch that moves `remote` to `planned`.
fn build_patch(remote: &Role, prior: &RoleModel, planned: &RoleModel) -> PatchRole {
    let permissions = diff_membership(&unrestricted(remote), &grants(&planned.member_permissions));
    let roles = diff_membership(
        remote.member_roles.as_deref().unwrap_or_default(),
        &planned.member_roles,
    );
    debug!(
        "Role {} membership: +{} -{} permissions, +{} -{} roles",
        remote.id,
        permissions.to_add.len(),
        permissions.to_remove.len(),
        roles.to_add.len(),
        roles.to_remove.len()
    );

    PatchRole {
        name: common::changed_string(&prior.name, &planned.name),
        description: common::changed_string(&prior.description, &planned.description),
        add_member_permissions: permissions.additions().map(<[_]>::to_vec),
        remove_member_permissions: permissions.removals().map(<[_]>::to_vec),
        add_member_roles: roles.additions().map(<[_]>::to_vec),
        remove_member_roles: roles.removals().map(<[_]>::to_vec),
    }
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single role by id or name.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("name", Attribute::optional_computed_string())
        .with_attribute("description", Attribute::computed_string())
        .with_attribute("member_permissions", Attribute::computed_string_list())
        .with_attribute("member_roles", Attribute::computed_string_list())
        .with_attribute(
            "org_name",
            Attribute::optional_string().with_description("Restricts a name lookup to one organization."),
        )
        .with_attribute("org_id", Attribute::computed_string())
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("user_id", Attribute::computed_string())
}

/// `braintrust_role` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleDataSource;

#[async_trait]
impl DataSource for RoleDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: RoleModel = common::decode(TYPE_NAME, config)?;
        let org_name = common::known_filter("org_name", &config.org_name)?;

        let role: Role = match common::selector(&config.id, &[("name", &config.name)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { value, .. } => {
                let options = ListOptions::new()
                    .with("role_name", value)
                    .with_opt("org_name", org_name);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&RoleModel::from_remote(&role, config.org_name.clone()))
    }
}

/// State of the `braintrust_roles` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesModel {
    pub role_name: Attr<String>,
    pub org_name: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub roles: Attr<Vec<RoleModel>>,
}

/// `braintrust_roles` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolesDataSource;

#[async_trait]
impl DataSource for RolesDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists roles.")
            .with_attribute("role_name", Attribute::optional_string())
            .with_attribute("org_name", Attribute::optional_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "roles",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: RolesModel = common::decode(LIST_TYPE_NAME, config)?;

        let role_name = common::known_filter("role_name", &model.role_name)?;
        let org_name = common::known_filter("org_name", &model.org_name)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("ids", ids.is_some()), ("role_name", role_name.is_some()))?;
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with_opt("role_name", role_name)
            .with_opt("org_name", org_name)
            .with_ids(ids.unwrap_or_default());
        let roles: Vec<Role> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&roles));
        model.roles = Attr::Known(
            roles
                .iter()
                .map(|role| RoleModel::from_remote(role, Attr::Null))
                .collect(),
        );
        common::encode(&model)
    }
}

/// `braintrust_role` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleResource;

#[async_trait]
impl Resource for RoleResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A Braintrust role.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "member_permissions",
                Attribute::optional_string_list()
                    .with_description("Permissions granted to members, e.g. read or update."),
            )
            .with_attribute(
                "member_roles",
                Attribute::optional_string_list()
                    .with_description("Ids of roles whose permissions members inherit."),
            )
            .with_attribute("org_name", Attribute::optional_string().with_force_new())
            .with_attribute("org_id", Attribute::computed_string())
            .with_attribute("created", Attribute::computed_string())
            .with_attribute("user_id", Attribute::computed_string())
    }

    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value> {
        let planned: RoleModel = common::decode(TYPE_NAME, planned)?;
        let body = CreateRole {
            name: common::required("name", &planned.name)?,
            description: common::optional(&planned.description),
            member_permissions: grants(&planned.member_permissions).into_known(),
            member_roles: planned.member_roles.as_known().cloned(),
            org_name: common::optional(&planned.org_name).or_else(|| ctx.org_name.clone()),
        };

        let role: Role = ctx.client.create(&body).await?;
        common::encode(&RoleModel::from_remote(&role, planned.org_name))
    }

    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>> {
        let state: RoleModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;

        let remote = common::read_remote::<Role>(&ctx.client, &id, &ListOptions::new()).await?;
        remote
            .map(|role| common::encode(&RoleModel::from_remote(&role, state.org_name)))
            .transpose()
    }

    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value> {
        let prior: RoleModel = common::decode(TYPE_NAME, prior)?;
        let planned: RoleModel = common::decode(TYPE_NAME, planned)?;
        let id = common::required("id", &prior.id)?;

        let remote: Role = ctx.client.get(&id).await?;
        let patch = build_patch(&remote, &prior, &planned);

        let role: Role = ctx.client.update(&id, &patch).await?;
        common::encode(&RoleModel::from_remote(&role, planned.org_name))
    }

    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()> {
        let state: RoleModel = common::decode(TYPE_NAME, state)?;
        let id = common::required("id", &state.id)?;
        common::delete_remote::<Role>(&ctx.client, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn remote(permissions: serde_json::Value, roles: serde_json::Value) -> Role {
        serde_json::from_value(json!({
            "id": "r1",
            "name": "reviewer",
            "member_permissions": permissions,
            "member_roles": roles,
        }))
        .unwrap()
    }

    fn names(items: &[&str]) -> Attr<Vec<String>> {
        Attr::Known(items.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn test_patch_sends_permission_deltas() {
        let role = remote(
            json!([{"permission": "read"}, {"permission": "delete"}]),
            json!([]),
        );
        let prior = RoleModel::from_remote(&role, Attr::Null);
        let planned = RoleModel {
            member_permissions: names(&["read", "update"]),
            ..prior.clone()
        };

        let patch = build_patch(&role, &prior, &planned);

        assert_eq!(
            patch.add_member_permissions,
            Some(vec![MemberPermission::new("update")])
        );
        assert_eq!(
            patch.remove_member_permissions,
            Some(vec![MemberPermission::new("delete")])
        );
        assert_eq!(patch.add_member_roles, None);
        assert_eq!(patch.name, None);
    }

    #[test]
    fn test_unknown_membership_is_left_alone() {
        let role = remote(json!([{"permission": "read"}]), json!(["r2"]));
        let prior = RoleModel::from_remote(&role, Attr::Null);
        let planned = RoleModel {
            member_permissions: Attr::Unknown,
            member_roles: Attr::Unknown,
            ..prior.clone()
        };

        let patch = build_patch(&role, &prior, &planned);

        assert!(patch.add_member_permissions.is_none());
        assert!(patch.remove_member_permissions.is_none());
        assert!(patch.remove_member_roles.is_none());
    }

    #[test]
    fn test_null_membership_removes_everything() {
        let role = remote(json!([]), json!(["r2", "r3"]));
        let prior = RoleModel::from_remote(&role, Attr::Null);
        let planned = RoleModel {
            member_roles: Attr::Null,
            ..prior.clone()
        };

        let patch = build_patch(&role, &prior, &planned);

        assert_eq!(
            patch.remove_member_roles,
            Some(vec![String::from("r2"), String::from("r3")])
        );
    }

    #[test]
    fn test_restricted_grants_are_not_managed() {
        let role = remote(
            json!([
                {"permission": "read", "restrict_object_type": "project"},
                {"permission": "read", "restrict_object_type": null},
            ]),
            json!(null),
        );
        let model = RoleModel::from_remote(&role, Attr::Null);
        assert_eq!(model.member_permissions, names(&["read"]));

        let planned = RoleModel {
            member_permissions: Attr::Null,
            ..model.clone()
        };
        let patch = build_patch(&role, &model, &planned);
        assert_eq!(
            patch.remove_member_permissions,
            Some(vec![MemberPermission::new("read")])
        );
    }
}
