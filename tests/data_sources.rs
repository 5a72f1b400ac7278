//! Data source lookups against a mock Braintrust API.

mod common;

use common::{PROJECT_ID, page, project, provider, summaries};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OTHER_ID: &str = "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d";

#[tokio::test]
async fn test_project_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/project"))
        .and(query_param("project_name", "demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            project(OTHER_ID, "demo-staging"),
            project(PROJECT_ID, "demo"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"name": "demo"}))
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["id"], PROJECT_ID);
    assert_eq!(state["name"], "demo");
    assert_eq!(state["created"], "2024-05-01T12:00:00Z");
}

#[tokio::test]
async fn test_project_name_lookup_passes_org_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/project"))
        .and(query_param("project_name", "demo"))
        .and(query_param("org_name", "acme"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(vec![project(PROJECT_ID, "demo")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source(
            "braintrust_project",
            json!({"name": "demo", "org_name": "acme"}),
        )
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    assert_eq!(response.state.unwrap()["org_name"], "acme");
}

#[tokio::test]
async fn test_ambiguous_name_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            project(PROJECT_ID, "demo"),
            project(OTHER_ID, "demo"),
        ])))
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"name": "demo"}))
        .await;

    assert!(response.state.is_none());
    assert_eq!(summaries(&response), ["Multiple projects found"]);
}

#[tokio::test]
async fn test_soft_deleted_duplicate_is_ignored() {
    let server = MockServer::start().await;
    let mut deleted = project(OTHER_ID, "demo");
    deleted["deleted_at"] = json!("2024-06-01T00:00:00Z");
    Mock::given(method("GET"))
        .and(path("/v1/project"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![deleted, project(PROJECT_ID, "demo")])),
        )
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"name": "demo"}))
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    assert_eq!(response.state.unwrap()["id"], PROJECT_ID);
}

#[tokio::test]
async fn test_name_matching_is_exact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/project"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(vec![project(PROJECT_ID, "Demo")])),
        )
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"name": "demo"}))
        .await;

    assert_eq!(summaries(&response), ["Project not found"]);
}

#[tokio::test]
async fn test_id_and_name_conflict_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source(
            "braintrust_project",
            json!({"id": PROJECT_ID, "name": "demo"}),
        )
        .await;

    assert_eq!(summaries(&response), ["Invalid input"]);
}

#[tokio::test]
async fn test_missing_selector_is_invalid() {
    let server = MockServer::start().await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({}))
        .await;

    assert_eq!(summaries(&response), ["Invalid input"]);
}

#[tokio::test]
async fn test_malformed_id_is_invalid() {
    let server = MockServer::start().await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"id": "not-a-uuid"}))
        .await;

    assert_eq!(summaries(&response), ["Invalid input"]);
}

#[tokio::test]
async fn test_soft_deleted_id_is_not_found() {
    let server = MockServer::start().await;
    let mut deleted = project(PROJECT_ID, "demo");
    deleted["deleted_at"] = json!("2024-06-01T00:00:00Z");
    Mock::given(method("GET"))
        .and(path(format!("/v1/project/{PROJECT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(deleted))
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"id": PROJECT_ID}))
        .await;

    assert_eq!(summaries(&response), ["Project not found"]);
}

#[tokio::test]
async fn test_missing_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/project/{PROJECT_ID}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"id": PROJECT_ID}))
        .await;

    assert_eq!(summaries(&response), ["Project not found"]);
}

#[tokio::test]
async fn test_api_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/project"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"name": "demo"}))
        .await;

    assert_eq!(summaries(&response), ["Braintrust API error"]);
}

#[tokio::test]
async fn test_projects_listing_drops_soft_deleted() {
    let server = MockServer::start().await;
    let mut deleted = project(OTHER_ID, "old");
    deleted["deleted_at"] = json!("2024-06-01T00:00:00Z");
    Mock::given(method("GET"))
        .and(path("/v1/project"))
        .and(query_param("limit", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![project(PROJECT_ID, "demo"), deleted])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source("braintrust_projects", json!({"limit": 5}))
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["ids"], json!([PROJECT_ID]));
    assert_eq!(state["projects"][0]["name"], "demo");
    assert_eq!(state["projects"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_projects_limit_must_be_positive() {
    let server = MockServer::start().await;

    let response = provider(&server)
        .read_data_source("braintrust_projects", json!({"limit": 0}))
        .await;

    assert_eq!(summaries(&response), ["Invalid input"]);
}

#[tokio::test]
async fn test_projects_ids_and_name_conflict() {
    let server = MockServer::start().await;

    let response = provider(&server)
        .read_data_source(
            "braintrust_projects",
            json!({"ids": [PROJECT_ID], "project_name": "demo"}),
        )
        .await;

    assert_eq!(summaries(&response), ["Invalid input"]);
}

#[tokio::test]
async fn test_undeclared_attribute_fails_validation() {
    let server = MockServer::start().await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"name": "demo", "colour": "red"}))
        .await;

    assert!(response.has_errors());
    assert!(response.state.is_none());
}

#[tokio::test]
async fn test_unknown_name_is_invalid_input() {
    let server = MockServer::start().await;

    let response = provider(&server)
        .read_data_source("braintrust_project", json!({"name": {"$unknown": true}}))
        .await;

    assert_eq!(summaries(&response), ["Invalid input"]);
}

#[tokio::test]
async fn test_user_by_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            json!({"id": OTHER_ID, "email": "bob@example.com"}),
            json!({"id": PROJECT_ID, "email": "ada@example.com", "given_name": "Ada"}),
        ])))
        .mount(&server)
        .await;

    let response = provider(&server)
        .read_data_source("braintrust_user", json!({"email": "ada@example.com"}))
        .await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["id"], PROJECT_ID);
    assert_eq!(state["given_name"], "Ada");
}
