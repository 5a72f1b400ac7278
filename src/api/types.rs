//! Braintrust API types and data structures.
//!
//! Response types default every missing field so that older or newer API
//! versions with extra or absent fields still decode. Request bodies skip
//! unset fields entirely; a patch only touches what it carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reconcile::{Named, SoftDeleted};

use super::client::ApiObject;

type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Implements the lookup traits for a wire type.
macro_rules! api_object {
    ($ty:ty, $path:literal, $kind:literal, deleted_at) => {
        api_object!(@object $ty, $path, $kind);
        impl SoftDeleted for $ty {
            fn deleted_at(&self) -> Option<&str> {
                self.deleted_at.as_deref()
            }
        }
    };
    ($ty:ty, $path:literal, $kind:literal) => {
        api_object!(@object $ty, $path, $kind);
        impl SoftDeleted for $ty {
            fn deleted_at(&self) -> Option<&str> {
                None
            }
        }
    };
    (@object $ty:ty, $path:literal, $kind:literal) => {
        impl ApiObject for $ty {
            const PATH: &'static str = $path;
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

macro_rules! named {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Named for $ty {
                fn name(&self) -> &str {
                    &self.name
                }
            }
        )+
    };
}

// ============================================================================
// Objects
// ============================================================================

/// An organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    /// Unique identifier.
    pub id: String,
    /// Organization name.
    pub name: String,
    /// Data plane API URL, when self-hosted.
    pub api_url: Option<String>,
    /// Whether the universal API is enabled.
    pub is_universal_api: Option<bool>,
    /// AI proxy URL.
    pub proxy_url: Option<String>,
    /// Realtime URL.
    pub realtime_url: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
}

/// A project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    /// Unique identifier.
    pub id: String,
    /// Owning organization.
    pub org_id: String,
    /// Project name.
    pub name: String,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<String>,
    /// Creator.
    pub user_id: Option<String>,
    /// Free-form project settings.
    pub settings: Option<serde_json::Value>,
}

/// A dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    /// Unique identifier.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Dataset name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<String>,
    /// Creator.
    pub user_id: Option<String>,
    /// User metadata.
    pub metadata: Option<JsonMap>,
}

/// An experiment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Experiment {
    /// Unique identifier.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Experiment name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Experiment this one compares against.
    pub base_exp_id: Option<String>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<String>,
    /// Dataset the experiment ran on.
    pub dataset_id: Option<String>,
    /// Version of that dataset.
    pub dataset_version: Option<String>,
    /// Whether the experiment is publicly visible.
    pub public: bool,
    /// Creator.
    pub user_id: Option<String>,
    /// User metadata.
    pub metadata: Option<JsonMap>,
}

/// A prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompt {
    /// Unique identifier.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Owning organization.
    pub org_id: Option<String>,
    /// Prompt name.
    pub name: String,
    /// Stable slug, unique within the project.
    pub slug: String,
    /// Description.
    pub description: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Prompt definition (messages, model, parameters).
    pub prompt_data: Option<serde_json::Value>,
    /// Tags.
    pub tags: Option<Vec<String>>,
    /// User metadata.
    pub metadata: Option<JsonMap>,
    /// Function type, e.g. `llm` or `scorer`.
    pub function_type: Option<String>,
}

/// A permission granted by a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberPermission {
    /// Permission name, e.g. `read`.
    pub permission: String,
    /// Object type the permission is limited to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict_object_type: Option<String>,
}

/// A role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    /// Unique identifier.
    pub id: String,
    /// Owning organization; `None` for built-in roles.
    pub org_id: Option<String>,
    /// Creator.
    pub user_id: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Role name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<String>,
    /// Permissions granted to members.
    pub member_permissions: Option<Vec<MemberPermission>>,
    /// Roles inherited by members.
    pub member_roles: Option<Vec<String>>,
}

/// A group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    /// Unique identifier.
    pub id: String,
    /// Owning organization.
    pub org_id: String,
    /// Creator.
    pub user_id: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Group name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<String>,
    /// Member user ids.
    pub member_users: Option<Vec<String>>,
    /// Member group ids.
    pub member_groups: Option<Vec<String>>,
}

/// An access control entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Acl {
    /// Unique identifier.
    pub id: String,
    /// Type of the object the ACL applies to.
    pub object_type: String,
    /// Id of the object the ACL applies to.
    pub object_id: String,
    /// Grantee user.
    pub user_id: Option<String>,
    /// Grantee group.
    pub group_id: Option<String>,
    /// Granted permission.
    pub permission: Option<String>,
    /// Object type the permission is limited to.
    pub restrict_object_type: Option<String>,
    /// Granted role.
    pub role_id: Option<String>,
    /// Organization of the object.
    #[serde(rename = "_object_org_id")]
    pub object_org_id: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
}

/// A user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
}

/// An environment variable (secret) attached to an object.
///
/// The value is write-only and never returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVar {
    /// Unique identifier.
    pub id: String,
    /// `organization`, `project` or `function`.
    pub object_type: String,
    /// Id of the owning object.
    pub object_id: String,
    /// Variable name.
    pub name: String,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Last time the variable was read by a function.
    pub used: Option<DateTime<Utc>>,
}

/// A project tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectTag {
    /// Unique identifier.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Creator.
    pub user_id: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Tag name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Display color.
    pub color: Option<String>,
}

/// A saved view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct View {
    /// Unique identifier.
    pub id: String,
    /// Type of the object the view belongs to.
    pub object_type: String,
    /// Id of the object the view belongs to.
    pub object_id: String,
    /// Kind of table the view applies to.
    pub view_type: Option<String>,
    /// View name.
    pub name: String,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// View definition.
    pub view_data: Option<serde_json::Value>,
    /// Display options.
    pub options: Option<serde_json::Value>,
    /// Creator.
    pub user_id: Option<String>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<String>,
}

api_object!(Organization, "organization", "organization");
api_object!(Project, "project", "project", deleted_at);
api_object!(Dataset, "dataset", "dataset", deleted_at);
api_object!(Experiment, "experiment", "experiment", deleted_at);
api_object!(Prompt, "prompt", "prompt");
api_object!(Role, "role", "role", deleted_at);
api_object!(Group, "group", "group", deleted_at);
api_object!(Acl, "acl", "acl");
api_object!(User, "user", "user");
api_object!(EnvVar, "env_var", "environment variable");
api_object!(ProjectTag, "project_tag", "project tag");
api_object!(View, "view", "view", deleted_at);

named!(Organization, Project, Dataset, Experiment, Prompt, Role, Group, EnvVar, ProjectTag, View);

// ============================================================================
// Requests
// ============================================================================

/// Body for creating a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateProject {
    /// Project name.
    pub name: String,
    /// Organization to create the project in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

/// Body for patching a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchProject {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

/// Body for creating a dataset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateDataset {
    /// Owning project.
    pub project_id: String,
    /// Dataset name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// User metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
}

/// Body for patching a dataset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchDataset {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
}

/// Body for creating an experiment.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateExperiment {
    /// Owning project.
    pub project_id: String,
    /// Experiment name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Baseline experiment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_exp_id: Option<String>,
    /// Dataset the experiment runs on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    /// Version of that dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_version: Option<String>,
    /// Public visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// User metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
    /// Fail instead of renaming when the name is taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensure_new: Option<bool>,
}

/// Body for patching an experiment.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchExperiment {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New baseline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_exp_id: Option<String>,
    /// New dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    /// New dataset version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_version: Option<String>,
    /// New visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// New metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
}

/// Body for creating a prompt.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreatePrompt {
    /// Owning project.
    pub project_id: String,
    /// Prompt name.
    pub name: String,
    /// Slug.
    pub slug: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Prompt definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_data: Option<serde_json::Value>,
    /// Tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Function type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_type: Option<String>,
}

/// Body for patching a prompt.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchPrompt {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New prompt definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_data: Option<serde_json::Value>,
    /// New tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Body for creating a role.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRole {
    /// Role name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Permissions granted to members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_permissions: Option<Vec<MemberPermission>>,
    /// Roles inherited by members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_roles: Option<Vec<String>>,
    /// Organization to create the role in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

/// Body for patching a role. Membership changes are incremental.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchRole {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Permissions to grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_member_permissions: Option<Vec<MemberPermission>>,
    /// Permissions to revoke.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_member_permissions: Option<Vec<MemberPermission>>,
    /// Roles to inherit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_member_roles: Option<Vec<String>>,
    /// Roles to stop inheriting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_member_roles: Option<Vec<String>>,
}

/// Body for creating a group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateGroup {
    /// Group name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Member users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_users: Option<Vec<String>>,
    /// Member groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_groups: Option<Vec<String>>,
    /// Organization to create the group in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

/// Body for patching a group. Membership changes are incremental.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchGroup {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Users to add.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_member_users: Option<Vec<String>>,
    /// Users to remove.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_member_users: Option<Vec<String>>,
    /// Groups to add.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_member_groups: Option<Vec<String>>,
    /// Groups to remove.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_member_groups: Option<Vec<String>>,
}

/// Body for creating an ACL.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateAcl {
    /// Object type.
    pub object_type: String,
    /// Object id.
    pub object_id: String,
    /// Grantee user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Grantee group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Granted permission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    /// Object type restriction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_object_type: Option<String>,
    /// Granted role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
}

/// Body for creating an environment variable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateEnvVar {
    /// Owner type.
    pub object_type: String,
    /// Owner id.
    pub object_id: String,
    /// Variable name.
    pub name: String,
    /// Secret value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Body for patching an environment variable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchEnvVar {
    /// New name.
    pub name: String,
    /// New value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Body for creating a project tag.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateProjectTag {
    /// Owning project.
    pub project_id: String,
    /// Tag name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Body for patching a project tag.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchProjectTag {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The object a view belongs to. Views are addressed within this scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewScope {
    /// Object type.
    pub object_type: String,
    /// Object id.
    pub object_id: String,
}

/// Body for creating a view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateView {
    /// Owning object type.
    pub object_type: String,
    /// Owning object id.
    pub object_id: String,
    /// Table the view applies to.
    pub view_type: String,
    /// View name.
    pub name: String,
    /// View definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_data: Option<serde_json::Value>,
    /// Display options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

/// Body for patching a view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchView {
    /// Owning object type.
    pub object_type: String,
    /// Owning object id.
    pub object_id: String,
    /// New table type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_type: Option<String>,
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_data: Option<serde_json::Value>,
    /// New options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

impl ViewScope {
    /// Creates a scope.
    #[must_use]
    pub fn new(object_type: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            object_id: object_id.into(),
        }
    }
}

impl MemberPermission {
    /// Creates an unrestricted permission grant.
    #[must_use]
    pub fn new(permission: impl Into<String>) -> Self {
        Self {
            permission: permission.into(),
            restrict_object_type: None,
        }
    }
}
