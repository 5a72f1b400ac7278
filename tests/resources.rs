//! Resource lifecycle operations against a mock Braintrust API.

mod common;

use braintrust_provider::BraintrustProvider;
use common::{PROJECT_ID, ROLE_ID, VIEW_ID, project, provider, summaries};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENV_VAR_ID: &str = "2e4f6a8c-0b1d-4e3f-a5b7-c9d1e3f5a7b9";

#[tokio::test]
async fn test_project_create_uses_default_org() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/project"))
        .and(body_json(json!({"name": "demo", "org_name": "acme"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(project(PROJECT_ID, "demo")))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .create("braintrust_project", json!({"name": "demo"}))
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["id"], PROJECT_ID);
    assert_eq!(state["org_id"], "org-1");
}

#[tokio::test]
async fn test_project_create_applies_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project(PROJECT_ID, "demo")))
        .expect(1)
        .mount(&server)
        .await;
    let mut configured = project(PROJECT_ID, "demo");
    configured["settings"] = json!({"comparison_key": "input"});
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/project/{PROJECT_ID}")))
        .and(body_json(json!({"settings": {"comparison_key": "input"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(configured))
        .expect(1)
        .mount(&server)
        .await;

    let settings = r#"{ "comparison_key": "input" }"#;
    let response = provider(&server)
        .create(
            "braintrust_project",
            json!({"name": "demo", "settings": settings}),
        )
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    // Equivalent JSON keeps the configured text.
    assert_eq!(response.state.unwrap()["settings"], settings);
}

#[tokio::test]
async fn test_read_of_missing_project_drops_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/project/{PROJECT_ID}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let response = provider(&server)
        .read("braintrust_project", json!({"id": PROJECT_ID, "name": "demo"}))
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert!(response.state.is_none());
}

#[tokio::test]
async fn test_read_of_soft_deleted_project_drops_state() {
    let server = MockServer::start().await;
    let mut deleted = project(PROJECT_ID, "demo");
    deleted["deleted_at"] = json!("2024-06-01T00:00:00Z");
    Mock::given(method("GET"))
        .and(path(format!("/v1/project/{PROJECT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(deleted))
        .mount(&server)
        .await;

    let response = provider(&server)
        .read("braintrust_project", json!({"id": PROJECT_ID}))
        .await;

    assert!(!response.has_errors());
    assert!(response.state.is_none());
}

#[tokio::test]
async fn test_delete_of_missing_project_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/v1/project/{PROJECT_ID}")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .delete("braintrust_project", json!({"id": PROJECT_ID}))
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    assert!(response.state.is_none());
}

#[tokio::test]
async fn test_import_of_missing_project_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/project/{PROJECT_ID}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let response = provider(&server)
        .import("braintrust_project", PROJECT_ID)
        .await;

    assert_eq!(summaries(&response), ["Project not found"]);
}

#[tokio::test]
async fn test_role_update_sends_permission_deltas() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/role/{ROLE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ROLE_ID,
            "name": "reviewer",
            "member_permissions": [{"permission": "read"}, {"permission": "delete"}],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/role/{ROLE_ID}")))
        .and(body_json(json!({
            "add_member_permissions": [{"permission": "update"}],
            "remove_member_permissions": [{"permission": "delete"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ROLE_ID,
            "name": "reviewer",
            "member_permissions": [{"permission": "read"}, {"permission": "update"}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let prior = json!({
        "id": ROLE_ID,
        "name": "reviewer",
        "member_permissions": ["read", "delete"],
    });
    let planned = json!({
        "id": ROLE_ID,
        "name": "reviewer",
        "member_permissions": ["read", "update"],
    });
    let response = provider(&server)
        .update("braintrust_role", prior, planned)
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    assert_eq!(
        response.state.unwrap()["member_permissions"],
        json!(["read", "update"])
    );
}

#[tokio::test]
async fn test_env_var_value_is_kept_in_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/env_var"))
        .and(body_json(json!({
            "object_type": "project",
            "object_id": PROJECT_ID,
            "name": "OPENAI_API_KEY",
            "value": "sk-secret",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ENV_VAR_ID,
            "object_type": "project",
            "object_id": PROJECT_ID,
            "name": "OPENAI_API_KEY",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .create(
            "braintrust_env_var",
            json!({
                "object_type": "project",
                "object_id": PROJECT_ID,
                "name": "OPENAI_API_KEY",
                "value": "sk-secret",
            }),
        )
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["id"], ENV_VAR_ID);
    assert_eq!(state["value"], "sk-secret");
}

#[tokio::test]
async fn test_acl_update_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let acl = json!({
        "id": "4c3b2a19-0f8e-4d7c-b6a5-948372615041",
        "object_type": "project",
        "object_id": PROJECT_ID,
        "user_id": "5d4c3b2a-1908-4f7e-a6d5-c4b3a2918070",
        "permission": "read",
    });
    let mut planned = acl.clone();
    planned["permission"] = json!("update");

    let response = provider(&server)
        .update("braintrust_acl", acl, planned)
        .await;

    assert_eq!(summaries(&response), ["Invalid input"]);
    assert!(response.state.is_none());
}

#[tokio::test]
async fn test_view_delete_sends_scope() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/v1/view/{VIEW_ID}")))
        .and(body_json(json!({"object_type": "project", "object_id": PROJECT_ID})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": VIEW_ID})))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .delete(
            "braintrust_view",
            json!({
                "id": VIEW_ID,
                "object_type": "project",
                "object_id": PROJECT_ID,
                "name": "triage",
            }),
        )
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
}

#[tokio::test]
async fn test_view_import_reads_within_scope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/view/{VIEW_ID}")))
        .and(query_param("object_type", "project"))
        .and(query_param("object_id", PROJECT_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": VIEW_ID,
            "object_type": "project",
            "object_id": PROJECT_ID,
            "view_type": "experiments",
            "name": "triage",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .import("braintrust_view", &format!("project/{PROJECT_ID}/{VIEW_ID}"))
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["name"], "triage");
    assert_eq!(state["object_id"], PROJECT_ID);
}

#[tokio::test]
async fn test_rejected_key_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/project/{PROJECT_ID}")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let response = provider(&server)
        .read("braintrust_project", json!({"id": PROJECT_ID}))
        .await;

    assert_eq!(summaries(&response), ["Braintrust API error"]);
}

#[tokio::test]
async fn test_unconfigured_provider_reports_error() {
    let response = BraintrustProvider::new()
        .create("braintrust_project", json!({"name": "demo"}))
        .await;

    assert_eq!(summaries(&response), ["Invalid provider configuration"]);
}

fn env_var_state(value: serde_json::Value) -> serde_json::Value {
    json!({
        "id": ENV_VAR_ID,
        "object_type": "project",
        "object_id": PROJECT_ID,
        "name": "TOKEN",
        "value": value,
    })
}

async fn mount_env_var_patch(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/env_var/{ENV_VAR_ID}")))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ENV_VAR_ID,
            "object_type": "project",
            "object_id": PROJECT_ID,
            "name": "TOKEN",
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_env_var_cleared_value_leaves_state_empty() {
    let server = MockServer::start().await;
    mount_env_var_patch(&server, json!({"name": "TOKEN", "value": ""})).await;

    let response = provider(&server)
        .update(
            "braintrust_env_var",
            env_var_state(json!("sk-old")),
            env_var_state(json!(null)),
        )
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    assert_eq!(response.state.unwrap()["value"], json!(null));
}

#[tokio::test]
async fn test_env_var_unknown_value_keeps_prior() {
    let server = MockServer::start().await;
    mount_env_var_patch(&server, json!({"name": "TOKEN"})).await;

    let response = provider(&server)
        .update(
            "braintrust_env_var",
            env_var_state(json!("sk-old")),
            env_var_state(json!({"$unknown": true})),
        )
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    assert_eq!(response.state.unwrap()["value"], "sk-old");
}

#[tokio::test]
async fn test_env_var_new_value_is_sent() {
    let server = MockServer::start().await;
    mount_env_var_patch(&server, json!({"name": "TOKEN", "value": "sk-new"})).await;

    let response = provider(&server)
        .update(
            "braintrust_env_var",
            env_var_state(json!("sk-old")),
            env_var_state(json!("sk-new")),
        )
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    assert_eq!(response.state.unwrap()["value"], "sk-new");
}
