//! Organizations: the `braintrust_organization` data source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{self, Selector};
use super::{DataSource, ProviderContext};
use crate::api::{ListOptions, Organization};
use crate::error::Result;
use crate::framework::{Attr, Attribute, Schema};

const TYPE_NAME: &str = "braintrust_organization";

/// State of the `braintrust_organization` data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationModel {
    pub id: Attr<String>,
    pub name: Attr<String>,
    pub api_url: Attr<String>,
    pub is_universal_api: Attr<bool>,
    pub proxy_url: Attr<String>,
    pub realtime_url: Attr<String>,
    pub created: Attr<String>,
}

impl From<&Organization> for OrganizationModel {
    fn from(org: &Organization) -> Self {
        Self {
            id: Attr::Known(org.id.clone()),
            name: Attr::Known(org.name.clone()),
            api_url: Attr::from_optional(org.api_url.as_deref()),
            is_universal_api: Attr::from_option(org.is_universal_api),
            proxy_url: Attr::from_optional(org.proxy_url.as_deref()),
            realtime_url: Attr::from_optional(org.realtime_url.as_deref()),
            created: common::timestamp(org.created.as_ref()),
        }
    }
}

/// `braintrust_organization` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationDataSource;

#[async_trait]
impl DataSource for OrganizationDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Looks up an organization the API key belongs to, by id or name.")
            .with_attribute("id", Attribute::optional_computed_string())
            .with_attribute("name", Attribute::optional_computed_string())
            .with_attribute(
                "api_url",
                Attribute::computed_string().with_description("Data plane URL, when self-hosted."),
            )
            .with_attribute("is_universal_api", Attribute::computed_bool())
            .with_attribute("proxy_url", Attribute::computed_string())
            .with_attribute("realtime_url", Attribute::computed_string())
            .with_attribute("created", Attribute::computed_string())
    }

    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value> {
        let config: OrganizationModel = common::decode(TYPE_NAME, config)?;

        let org: Organization = match common::selector(&config.id, &[("name", &config.name)])? {
            Selector::Id(id) => common::find_by_id(&ctx.client, id, &ListOptions::new()).await?,
            Selector::By { value, .. } => {
                let options = ListOptions::new().with("org_name", value);
                common::find_by_name(&ctx.client, &options, value).await?
            }
        };

        common::encode(&OrganizationModel::from(&org))
    }
}
