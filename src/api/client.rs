//! Braintrust REST API client implementation.
//!
//! This module provides the HTTP client for the `/v1` object endpoints.
//! Every call is a single request: failures surface to the caller as
//! [`ApiError`] and nothing is retried.

use reqwest::{Client, RequestBuilder, Response, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{ApiError, Result};

use super::options::ListOptions;

/// Braintrust API base URL.
pub const DEFAULT_API_URL: &str = "https://api.braintrust.dev";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Number of objects requested per list page.
pub const PAGE_SIZE: usize = 100;

/// Rate-limit wait assumed when the API sends no `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// An object type served under `/v1/{PATH}`.
pub trait ApiObject: DeserializeOwned + Send {
    /// Path segment of the object endpoint.
    const PATH: &'static str;
    /// Human-readable kind used in messages.
    const KIND: &'static str;

    /// Object id.
    fn id(&self) -> &str;
}

/// List endpoint response envelope.
#[derive(Debug, serde::Deserialize)]
struct ListResponse<T> {
    objects: Vec<T>,
}

/// Braintrust API client.
#[derive(Debug, Clone)]
pub struct BraintrustClient {
    /// HTTP client.
    client: Client,
    /// API key.
    api_key: String,
    /// Base URL without trailing slash.
    base_url: String,
}

impl BraintrustClient {
    /// Creates a client against the public Braintrust API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_options(api_key: &str, base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url<T: ApiObject>(&self) -> String {
        format!("{}/v1/{}", self.base_url, T::PATH)
    }

    fn object_url<T: ApiObject>(&self, id: &str) -> String {
        format!("{}/v1/{}/{id}", self.base_url, T::PATH)
    }

    /// Fetches one object by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] on 404, or another error if the call fails.
    pub async fn get<T: ApiObject>(&self, id: &str) -> Result<T> {
        self.get_scoped(id, &ListOptions::new()).await
    }

    /// Fetches one object by id with extra query parameters.
    ///
    /// Scoped objects such as views need their owner in the query.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] on 404, or another error if the call fails.
    pub async fn get_scoped<T: ApiObject>(&self, id: &str, options: &ListOptions) -> Result<T> {
        debug!("GET {} {id}", T::KIND);
        let request = self
            .client
            .get(self.object_url::<T>(id))
            .query(options.as_query());
        let response = self.execute::<T>(request, Some(id)).await?;
        parse_json(response).await
    }

    /// Fetches a single page of objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list<T: ApiObject>(&self, options: &ListOptions) -> Result<Vec<T>> {
        trace!("GET {} list {:?}", T::KIND, options.as_query());
        let request = self
            .client
            .get(self.collection_url::<T>())
            .query(options.as_query());
        let response = self.execute::<T>(request, None).await?;
        let page: ListResponse<T> = parse_json(response).await?;
        Ok(page.objects)
    }

    /// Fetches every object matching `options`, following the
    /// `starting_after` cursor until a short page or `limit` is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn list_all<T: ApiObject>(
        &self,
        options: &ListOptions,
        limit: Option<usize>,
    ) -> Result<Vec<T>> {
        let mut objects: Vec<T> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page_size = limit.map_or(PAGE_SIZE, |limit| {
                PAGE_SIZE.min(limit.saturating_sub(objects.len()))
            });
            if page_size == 0 {
                break;
            }

            let mut page_options = options.clone().with_limit(page_size);
            if let Some(cursor) = &cursor {
                page_options = page_options.with_starting_after(cursor);
            }

            let page = self.list::<T>(&page_options).await?;
            let fetched = page.len();
            let next = page.last().map(|object| object.id().to_string());
            objects.extend(page);

            if fetched < page_size || next.is_none() || next == cursor {
                break;
            }
            cursor = next;
        }

        debug!("Listed {} {} objects", objects.len(), T::KIND);
        Ok(objects)
    }

    /// Creates an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create<T: ApiObject, B: Serialize + Sync>(&self, body: &B) -> Result<T> {
        debug!("POST {}", T::KIND);
        let request = self.client.post(self.collection_url::<T>()).json(body);
        let response = self.execute::<T>(request, None).await?;
        parse_json(response).await
    }

    /// Partially updates an object.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] on 404, or another error if the call fails.
    pub async fn update<T: ApiObject, B: Serialize + Sync>(&self, id: &str, body: &B) -> Result<T> {
        debug!("PATCH {} {id}", T::KIND);
        let request = self.client.patch(self.object_url::<T>(id)).json(body);
        let response = self.execute::<T>(request, Some(id)).await?;
        parse_json(response).await
    }

    /// Deletes an object.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] on 404, or another error if the call fails.
    pub async fn delete<T: ApiObject>(&self, id: &str) -> Result<()> {
        debug!("DELETE {} {id}", T::KIND);
        let request = self.client.delete(self.object_url::<T>(id));
        self.execute::<T>(request, Some(id)).await?;
        Ok(())
    }

    /// Deletes an object whose endpoint requires a scope in the body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] on 404, or another error if the call fails.
    pub async fn delete_scoped<T: ApiObject, B: Serialize + Sync>(
        &self,
        id: &str,
        body: &B,
    ) -> Result<()> {
        debug!("DELETE {} {id} (scoped)", T::KIND);
        let request = self.client.delete(self.object_url::<T>(id)).json(body);
        self.execute::<T>(request, Some(id)).await?;
        Ok(())
    }

    /// Sends a request and maps error statuses.
    async fn execute<T: ApiObject>(
        &self,
        request: RequestBuilder,
        id: Option<&str>,
    ) -> Result<Response> {
        let response = request
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        trace!("{} response status {status}", T::KIND);

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            return Err(ApiError::RateLimited {
                retry_after_secs: retry_after,
            }
            .into());
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                String::from("Invalid API key")
            } else {
                body
            };
            return Err(ApiError::AuthenticationFailed { message }.into());
        }

        if status.as_u16() == 404 {
            if let Some(id) = id {
                return Err(ApiError::NotFound {
                    kind: T::KIND,
                    id: id.to_string(),
                }
                .into());
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::api_error(status.as_u16(), body).into());
        }

        Ok(response)
    }
}

async fn parse_json<R: DeserializeOwned>(response: Response) -> Result<R> {
    response
        .json()
        .await
        .map_err(|e| ApiError::invalid_response(format!("Failed to parse response: {e}")).into())
}
