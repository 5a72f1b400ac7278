//! Resources, data sources and the provider dispatcher.
//!
//! Every resource and data source works on JSON objects shaped like its
//! [`Schema`]. Implementations decode those objects into typed models,
//! talk to the API through [`BraintrustClient`], and encode the resulting
//! state back. [`BraintrustProvider`] routes operations by type name and
//! turns every error into diagnostics; nothing escapes a single operation.

mod common;

mod acl;
mod dataset;
mod env_var;
mod experiment;
mod group;
mod organization;
mod project;
mod project_tag;
mod prompt;
mod role;
mod user;
mod view;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::BraintrustClient;
use crate::config::{ConfigParser, ConfigValidator, ProviderConfig, ResolvedConfig};
use crate::error::{ApiError, ConfigError, InputError, ProviderError, Result};
use crate::framework::{Diagnostic, Diagnostics, ProviderSchema, Schema};

pub use common::TYPE_PREFIX;

/// Shared state handed to every operation once the provider is configured.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    /// API client.
    pub client: BraintrustClient,
    /// Organization used when a resource does not name one.
    pub org_name: Option<String>,
}

impl ProviderContext {
    /// Builds a context from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        Ok(Self {
            client: config.client()?,
            org_name: config.org_name.clone(),
        })
    }
}

/// A read-only lookup.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name, e.g. `braintrust_project`.
    fn type_name(&self) -> &'static str;

    /// Schema of the data source.
    fn schema(&self) -> Schema;

    /// Performs the lookup described by `config` and returns the state.
    async fn read(&self, ctx: &ProviderContext, config: Value) -> Result<Value>;
}

/// A managed remote object.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `braintrust_project`.
    fn type_name(&self) -> &'static str;

    /// Schema of the resource.
    fn schema(&self) -> Schema;

    /// Creates the object and returns its state.
    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<Value>;

    /// Refreshes state. `None` means the object is gone remotely.
    async fn read(&self, ctx: &ProviderContext, state: Value) -> Result<Option<Value>>;

    /// Applies `planned` over `prior` and returns the new state.
    async fn update(&self, ctx: &ProviderContext, prior: Value, planned: Value) -> Result<Value>;

    /// Deletes the object. Deleting a missing object succeeds.
    async fn delete(&self, ctx: &ProviderContext, state: Value) -> Result<()>;

    /// Imports an existing object by id.
    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<Option<Value>> {
        common::validate_uuid("id", id)?;
        self.read(ctx, serde_json::json!({ "id": id })).await
    }
}

/// Result of a provider operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Response {
    /// New state; `None` when there is none (errors, removed resources).
    pub state: Option<Value>,
    /// Diagnostics raised by the operation.
    pub diagnostics: Diagnostics,
}

impl Response {
    /// A successful response.
    #[must_use]
    pub fn ok(state: Option<Value>) -> Self {
        Self {
            state,
            diagnostics: Diagnostics::new(),
        }
    }

    /// A response carrying only diagnostics.
    #[must_use]
    pub const fn diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            state: None,
            diagnostics,
        }
    }

    /// A failed response.
    #[must_use]
    pub fn error(err: &ProviderError) -> Self {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push_error(err);
        Self::diagnostics(diagnostics)
    }

    /// Returns true if any error diagnostic was raised.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

impl From<Result<Option<Value>>> for Response {
    fn from(result: Result<Option<Value>>) -> Self {
        match result {
            Ok(state) => Self::ok(state),
            Err(err) => {
                debug!("Operation failed: {err}");
                Self::error(&err)
            }
        }
    }
}

/// Which registry a type name is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    /// Managed resources.
    Resource,
    /// Read-only data sources.
    DataSource,
}

impl TypeCategory {
    const fn label(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::DataSource => "data source",
        }
    }
}

/// The Braintrust provider: registry of resources and data sources.
pub struct BraintrustProvider {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
    context: Option<ProviderContext>,
}

impl std::fmt::Debug for BraintrustProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraintrustProvider")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .field("configured", &self.context.is_some())
            .finish()
    }
}

impl Default for BraintrustProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BraintrustProvider {
    /// Creates an unconfigured provider with every type registered.
    #[must_use]
    pub fn new() -> Self {
        let mut provider = Self {
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
            context: None,
        };

        provider.register_data_source(organization::OrganizationDataSource);
        provider.register_data_source(project::ProjectDataSource);
        provider.register_data_source(project::ProjectsDataSource);
        provider.register_data_source(dataset::DatasetDataSource);
        provider.register_data_source(dataset::DatasetsDataSource);
        provider.register_data_source(experiment::ExperimentDataSource);
        provider.register_data_source(experiment::ExperimentsDataSource);
        provider.register_data_source(prompt::PromptDataSource);
        provider.register_data_source(prompt::PromptsDataSource);
        provider.register_data_source(role::RoleDataSource);
        provider.register_data_source(role::RolesDataSource);
        provider.register_data_source(group::GroupDataSource);
        provider.register_data_source(group::GroupsDataSource);
        provider.register_data_source(user::UserDataSource);
        provider.register_data_source(user::UsersDataSource);
        provider.register_data_source(acl::AclDataSource);
        provider.register_data_source(acl::AclsDataSource);
        provider.register_data_source(env_var::EnvVarDataSource);
        provider.register_data_source(env_var::EnvVarsDataSource);
        provider.register_data_source(project_tag::ProjectTagDataSource);
        provider.register_data_source(project_tag::ProjectTagsDataSource);
        provider.register_data_source(view::ViewDataSource);
        provider.register_data_source(view::ViewsDataSource);

        provider.register_resource(project::ProjectResource);
        provider.register_resource(dataset::DatasetResource);
        provider.register_resource(experiment::ExperimentResource);
        provider.register_resource(prompt::PromptResource);
        provider.register_resource(role::RoleResource);
        provider.register_resource(group::GroupResource);
        provider.register_resource(acl::AclResource);
        provider.register_resource(env_var::EnvVarResource);
        provider.register_resource(project_tag::ProjectTagResource);
        provider.register_resource(view::ViewResource);

        provider
    }

    fn register_resource(&mut self, resource: impl Resource + 'static) {
        self.resources.insert(resource.type_name(), Box::new(resource));
    }

    fn register_data_source(&mut self, data_source: impl DataSource + 'static) {
        self.data_sources
            .insert(data_source.type_name(), Box::new(data_source));
    }

    /// Names of every registered resource type.
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    /// Names of every registered data source type.
    pub fn data_source_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }

    /// Full schema of the provider.
    #[must_use]
    pub fn schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        for (name, resource) in &self.resources {
            schema = schema.with_resource(*name, resource.schema());
        }
        for (name, data_source) in &self.data_sources {
            schema = schema.with_data_source(*name, data_source.schema());
        }
        schema
    }

    /// Returns true once [`BraintrustProvider::configure`] succeeded.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.context.is_some()
    }

    /// Configures the provider from its block and the process environment.
    pub fn configure(&mut self, config: Value) -> Diagnostics {
        let parser = ConfigParser::new();
        if let Err(err) = parser.load_dotenv() {
            let mut diagnostics = Diagnostics::new();
            diagnostics.push_error(&err);
            return diagnostics;
        }
        self.configure_with(config, |name| std::env::var(name).ok())
    }

    /// Configures the provider, reading environment fallbacks through `env`.
    pub fn configure_with<F>(&mut self, config: Value, env: F) -> Diagnostics
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut diagnostics = ProviderConfig::schema().validate_config(&config);
        if diagnostics.has_errors() {
            return diagnostics;
        }

        let result = common::decode::<ProviderConfig>("provider configuration", config)
            .and_then(|block| ConfigParser::resolve_with(&block, env))
            .and_then(|resolved| {
                let report = ConfigValidator::new().validate(&resolved)?;
                for warning in report.warnings {
                    diagnostics.push(Diagnostic::warning("Provider configuration").with_detail(warning));
                }
                ProviderContext::from_config(&resolved)
            });

        match result {
            Ok(context) => {
                info!("Provider configured for {}", context.client.base_url());
                self.context = Some(context);
            }
            Err(err) => diagnostics.push_error(&err),
        }
        diagnostics
    }

    /// Configures the provider with an already resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn configure_resolved(&mut self, config: &ResolvedConfig) -> Result<()> {
        self.context = Some(ProviderContext::from_config(config)?);
        Ok(())
    }

    /// Validates the provider block without configuring.
    #[must_use]
    pub fn validate_provider_config(&self, config: &Value) -> Diagnostics {
        let mut diagnostics = ProviderConfig::schema().validate_config(config);
        if diagnostics.has_errors() {
            return diagnostics;
        }
        match common::decode::<ProviderConfig>("provider configuration", config.clone()) {
            Ok(block) => {
                let report = ConfigValidator::new().validate_block(&block);
                for issue in report.errors {
                    diagnostics.push(
                        Diagnostic::error("Invalid provider configuration")
                            .with_detail(issue.message)
                            .with_attribute(issue.field),
                    );
                }
                for warning in report.warnings {
                    diagnostics.push(Diagnostic::warning("Provider configuration").with_detail(warning));
                }
            }
            Err(err) => diagnostics.push_error(&err),
        }
        diagnostics
    }

    /// Validates a resource or data source configuration against its schema.
    #[must_use]
    pub fn validate(&self, category: TypeCategory, type_name: &str, config: &Value) -> Diagnostics {
        match self.schema_of(category, type_name) {
            Ok(schema) => schema.validate_config(config),
            Err(err) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push_error(&err);
                diagnostics
            }
        }
    }

    fn schema_of(&self, category: TypeCategory, type_name: &str) -> Result<Schema> {
        let schema = match category {
            TypeCategory::Resource => self.resources.get(type_name).map(|r| r.schema()),
            TypeCategory::DataSource => self.data_sources.get(type_name).map(|d| d.schema()),
        };
        schema.ok_or_else(|| unknown_type(category, type_name))
    }

    fn context(&self) -> Result<&ProviderContext> {
        self.context.as_ref().ok_or_else(|| {
            ConfigError::validation("the provider has not been configured", "provider").into()
        })
    }

    fn resource(&self, type_name: &str) -> Result<&dyn Resource> {
        self.resources
            .get(type_name)
            .map(|resource| &**resource)
            .ok_or_else(|| unknown_type(TypeCategory::Resource, type_name))
    }

    /// Reads a data source.
    pub async fn read_data_source(&self, type_name: &str, config: Value) -> Response {
        let Some(data_source) = self.data_sources.get(type_name) else {
            return Response::error(&unknown_type(TypeCategory::DataSource, type_name));
        };

        let diagnostics = data_source.schema().validate_config(&config);
        if diagnostics.has_errors() {
            return Response::diagnostics(diagnostics);
        }

        info!("Reading data source {type_name}");
        let result = match self.context() {
            Ok(ctx) => data_source.read(ctx, config).await.map(Some),
            Err(err) => Err(err),
        };
        Response::from(result)
    }

    /// Creates a resource.
    pub async fn create(&self, type_name: &str, planned: Value) -> Response {
        info!("Creating {type_name}");
        Response::from(self.try_create(type_name, planned).await)
    }

    /// Refreshes a resource. A resource gone remotely yields no state.
    pub async fn read(&self, type_name: &str, state: Value) -> Response {
        debug!("Reading {type_name}");
        Response::from(self.try_read(type_name, state).await)
    }

    /// Updates a resource in place.
    pub async fn update(&self, type_name: &str, prior: Value, planned: Value) -> Response {
        info!("Updating {type_name}");
        Response::from(self.try_update(type_name, prior, planned).await)
    }

    /// Deletes a resource.
    pub async fn delete(&self, type_name: &str, state: Value) -> Response {
        info!("Deleting {type_name}");
        Response::from(self.try_delete(type_name, state).await)
    }

    /// Imports an existing object.
    pub async fn import(&self, type_name: &str, id: &str) -> Response {
        info!("Importing {type_name} {id}");
        Response::from(self.try_import(type_name, id).await)
    }

    async fn try_create(&self, type_name: &str, planned: Value) -> Result<Option<Value>> {
        let resource = self.resource(type_name)?;
        let state = resource.create(self.context()?, planned).await?;
        Ok(Some(state))
    }

    async fn try_read(&self, type_name: &str, state: Value) -> Result<Option<Value>> {
        let resource = self.resource(type_name)?;
        let refreshed = resource.read(self.context()?, state).await?;
        if refreshed.is_none() {
            warn!("{type_name} no longer exists remotely; removing it from state");
        }
        Ok(refreshed)
    }

    async fn try_update(
        &self,
        type_name: &str,
        prior: Value,
        planned: Value,
    ) -> Result<Option<Value>> {
        let resource = self.resource(type_name)?;
        let state = resource.update(self.context()?, prior, planned).await?;
        Ok(Some(state))
    }

    async fn try_delete(&self, type_name: &str, state: Value) -> Result<Option<Value>> {
        let resource = self.resource(type_name)?;
        resource.delete(self.context()?, state).await?;
        Ok(None)
    }

    async fn try_import(&self, type_name: &str, id: &str) -> Result<Option<Value>> {
        let resource = self.resource(type_name)?;
        match resource.import(self.context()?, id).await? {
            Some(state) => Ok(Some(state)),
            None => Err(ApiError::NotFound {
                kind: resource.type_name().trim_start_matches(TYPE_PREFIX),
                id: id.to_string(),
            }
            .into()),
        }
    }
}

fn unknown_type(category: TypeCategory, type_name: &str) -> ProviderError {
    InputError::UnknownType {
        category: category.label(),
        type_name: type_name.to_string(),
    }
    .into()
}
