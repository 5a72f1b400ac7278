//! Shared helpers for integration tests against a mock Braintrust API.

#![allow(dead_code)]

use braintrust_provider::BraintrustProvider;
use serde_json::{Value, json};
use wiremock::MockServer;

pub const API_KEY: &str = "test-key";

pub const PROJECT_ID: &str = "3f0b2c8e-5d1a-4b7e-9c2f-1a2b3c4d5e6f";
pub const ROLE_ID: &str = "7d9e1f20-4a3b-4c5d-8e6f-a1b2c3d4e5f6";
pub const GROUP_ID: &str = "0c1d2e3f-4a5b-4c6d-9e7f-8a9b0c1d2e3f";
pub const VIEW_ID: &str = "8b1c6b1e-3f0a-4c57-9d1a-3d0f5c1e2a44";

/// A provider configured against `server`, with `acme` as default organization.
pub fn provider(server: &MockServer) -> BraintrustProvider {
    let mut provider = BraintrustProvider::new();
    let diagnostics = provider.configure_with(
        json!({
            "api_key": API_KEY,
            "api_url": server.uri(),
            "org_name": "acme",
        }),
        |_| None,
    );
    assert!(!diagnostics.has_errors(), "{diagnostics:?}");
    provider
}

/// A wire project.
pub fn project(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "org_id": "org-1",
        "name": name,
        "created": "2024-05-01T12:00:00Z",
        "deleted_at": null,
        "user_id": "user-1",
    })
}

/// A list response envelope.
pub fn page(objects: Vec<Value>) -> Value {
    json!({ "objects": objects })
}

/// Summaries of every diagnostic, for readable assertions.
pub fn summaries(response: &braintrust_provider::Response) -> Vec<String> {
    response
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.summary.clone())
        .collect()
}
