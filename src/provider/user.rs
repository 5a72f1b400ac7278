//! Users: `braintrust_user` and `braintrust_users` data sources.
//!
//! Users are matched by email rather than name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext};
use crate::api::{ListOptions, User};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_user";
const LIST_TYPE_NAME: &str = "braintrust_users";

/// State of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserModel {
    pub id: Attr<String>,
    pub email: Attr<String>,
    pub given_name: Attr<String>,
    pub family_name: Attr<String>,
    pub avatar_url: Attr<String>,
    pub org_name: Attr<String>,
    pub created: Attr<String>,
}

impl UserModel {
    fn from_remote(user: &User, org_name: Attr<String>) -> Self {
        Self {
            id: Attr::Known(user.id.clone()),
            email: Attr::from_optional(user.email.as_deref()),
            given_name: Attr::from_optional(user.given_name.as_deref()),
            family_name: Attr::from_optional(user.family_name.as_deref()),
            avatar_url: Attr::from_optional(user.avatar_url.as_deref()),
            org_name,
            created: common::timestamp(user.created.as_ref()),
        }
    }
}

fn email_of(user: &User) -> &str {
    user.email.as_deref().unwrap_or_default()
}

fn data_source_schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a single user by id or email.")
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute("email", Attribute::optional_computed_string())
        .with_attribute("given_name", Attribute::computed_string())
        .with_attribute("family_name", Attribute::computed_string())
        .with_attribute("avatar_url", Attribute::computed_string())
        .with_attribute(
            "org_name",
            Attribute::optional_string().with_description("Organization to search in."),
        )
        .with_attribute("created", Attribute::computed_string())
}

/// `braintrust_user` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDataSource;

#[async_trait]
impl DataSource for UserDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: UserModel = common::decode(TYPE_NAME, config)?;
        let org_name = common::known_filter("org_name", &config.org_name)?;

        let user: User = match common::selector(&config.id, &[("email", &config.email)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { key, value } => {
                let options = ListOptions::new()
                    .with("email", value)
                    .with_opt("org_name", org_name);
                common::find_by_key(&ctx.client, &options, key, value, email_of).await?
            }
        };

        common::encode(&UserModel::from_remote(&user, config.org_name.clone()))
    }
}

/// State of the `braintrust_users` data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersModel {
    pub given_name: Attr<String>,
    pub family_name: Attr<String>,
    pub email: Attr<String>,
    pub org_name: Attr<String>,
    pub ids: Attr<Vec<String>>,
    pub limit: Attr<i64>,
    pub users: Attr<Vec<UserModel>>,
}

/// `braintrust_users` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsersDataSource;

#[async_trait]
impl DataSource for UsersDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Lists users in an organization.")
            .with_attribute("given_name", Attribute::optional_string())
            .with_attribute("family_name", Attribute::optional_string())
            .with_attribute("email", Attribute::optional_string())
            .with_attribute("org_name", Attribute::optional_string())
            .with_attribute("ids", Attribute::optional_computed_string_list())
            .with_attribute("limit", Attribute::optional_int64())
            .with_attribute(
                "users",
                Attribute::computed_object_list(&common::computed_schema(&data_source_schema())),
            )
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let mut model: UsersModel = common::decode(LIST_TYPE_NAME, config)?;

        let given_name = common::known_filter("given_name", &model.given_name)?;
        let family_name = common::known_filter("family_name", &model.family_name)?;
        let email = common::known_filter("email", &model.email)?;
        let org_name = common::known_filter("org_name", &model.org_name)?;
        let ids = common::known_ids(&model.ids)?;
        common::exclusive(("ids", ids.is_some()), ("email", email.is_some()))?;
        let limit = common::validate_limit(&model.limit)?;

        let options = ListOptions::new()
            .with_opt("given_name", given_name)
            .with_opt("family_name", family_name)
            .with_opt("email", email)
            .with_opt("org_name", org_name)
            .with_ids(ids.unwrap_or_default());
        let users: Vec<User> = common::list_live(&ctx.client, &options, limit).await?;

        model.ids = Attr::Known(common::ids_of(&users));
        model.users = Attr::Known(
            users
                .iter()
                .map(|user| UserModel::from_remote(user, Attr::Null))
                .collect(),
        );
        common::encode(&model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_email_matches_nothing() {
        let user: User = serde_json::from_value(json!({"id": "u1"})).unwrap();
        assert_eq!(email_of(&user), "");

        let model = UserModel::from_remote(&user, Attr::Null);
        assert!(model.email.is_null());
        assert!(model.given_name.is_null());
    }
}
