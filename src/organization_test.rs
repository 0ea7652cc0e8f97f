use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{Value, json};

use super::*;
use crate::net::types::MemberRole;
use crate::test_support::{UNREACHABLE_URL, gateway_for, spawn_stub};

fn org_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "createdAt": "2024-01-01T00:00:00Z",
        "ownerId": "u1",
        "members": [{ "id": "u1", "email": "u1@example.com", "displayName": "Alice", "role": "owner", "joinedAt": "2024-01-01" }],
    })
}

async fn org_backend() -> OrganizationClient {
    let router = Router::new()
        .route(
            "/api/v1/organizations",
            get(|| async { Json(json!([org_json("o1", "Acme")])) }).post(|Json(body): Json<Value>| async move {
                let name = body["name"].as_str().unwrap_or_default().to_owned();
                (StatusCode::CREATED, Json(org_json("o2", &name)))
            }),
        )
        .route(
            "/api/v1/organizations/{id}",
            get(|Path(id): Path<String>| async move {
                if id == "o1" {
                    (StatusCode::OK, Json(org_json("o1", "Acme")))
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({})))
                }
            })
            .put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                Json(org_json(&id, body["name"].as_str().unwrap_or("unchanged")))
            })
            .delete(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/api/v1/organizations/{id}/members",
            axum::routing::post(|Json(body): Json<Value>| async move {
                if body["role"] == "owner" {
                    return (StatusCode::BAD_REQUEST, Json(json!({ "message": "Cannot add another owner" })));
                }
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "id": "u9",
                        "email": body["email"],
                        "displayName": "Bob",
                        "role": body["role"],
                        "joinedAt": "2024-02-02",
                    })),
                )
            })
            .delete(|Json(body): Json<Value>| async move {
                if body["memberId"] == "u9" {
                    (StatusCode::OK, Json(json!({ "success": true })))
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({ "error": "Member not found" })))
                }
            }),
        );
    let mut api = ApiService::new(gateway_for(&spawn_stub(router).await));
    api.set_token("tok");
    OrganizationClient::new(api)
}

#[tokio::test]
async fn list_decodes_bare_array() {
    let orgs = org_backend().await.list().await.into_result().unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].members[0].role, MemberRole::Owner);
}

#[tokio::test]
async fn create_returns_new_organization() {
    let client = org_backend().await;
    let response = client.create(&CreateOrganizationData { name: "Beta".to_owned() }).await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(response.data().unwrap().name, "Beta");
}

#[tokio::test]
async fn get_missing_uses_details_fallback() {
    let failure = org_backend().await.get("nope").await.into_result().unwrap_err();
    assert_eq!(failure.status_code, 404);
    assert_eq!(failure.message, DETAILS_FAILED);
}

#[tokio::test]
async fn update_and_delete() {
    let client = org_backend().await;
    let data = UpdateOrganizationData { name: Some("Renamed".to_owned()) };
    assert_eq!(client.update("o1", &data).await.into_result().unwrap().name, "Renamed");
    assert_eq!(client.delete("o1").await, ApiResponse::Success { data: (), status_code: 204 });
}

#[tokio::test]
async fn add_member_reports_backend_message() {
    let client = org_backend().await;
    let added = client
        .add_member("o1", &AddMemberData { email: "bob@example.com".to_owned(), role: MemberRole::Admin })
        .await
        .into_result()
        .unwrap();
    assert_eq!(added.role, MemberRole::Admin);

    let failure = client
        .add_member("o1", &AddMemberData { email: "eve@example.com".to_owned(), role: MemberRole::Owner })
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(failure.message, "Cannot add another owner");
}

#[tokio::test]
async fn remove_member_sends_member_id_body() {
    let client = org_backend().await;
    assert!(client.remove_member("o1", "u9").await.is_success());
    let failure = client.remove_member("o1", "u0").await.into_result().unwrap_err();
    assert_eq!(failure.message, "Member not found");
}

#[tokio::test]
async fn unreachable_backend_is_network_failure_not_mock_data() {
    let client = OrganizationClient::new(ApiService::new(gateway_for(UNREACHABLE_URL)));
    let failure = client.list().await.into_result().unwrap_err();
    assert!(failure.is_network());
}
