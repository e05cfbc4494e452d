//! HTTP API Tests
//!
//! Drives the full router with in-process requests:
//!
//! 1. Authentication and the role gate run before body validation
//! 2. Ticket flows return the documented status codes and messages
//! 3. Listing and thread access respect role scoping
//!
//! ## Running
//!
//! ```bash
//! cargo test -p helpdeskd --test api_tests
//! ```

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use helpdesk_shared::{NewUser, Role};
use helpdeskd::db::{Database, DbLocation};
use helpdeskd::metrics::HelpdeskMetrics;
use helpdeskd::server::{router, AppState};
use helpdeskd::HelpdeskService;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// ============================================================================
// Harness
// ============================================================================

struct Api {
    app: Router,
    manager: String,
    agent: String,
    agent_id: i64,
    customer: String,
    other_customer: String,
}

async fn account(service: &HelpdeskService, name: &str, role: Role) -> (i64, String) {
    let user = service
        .create_user(NewUser {
            name: name.to_string(),
            email: format!("{}@helpdesk.test", name),
            role,
        })
        .await
        .unwrap();
    let token = service.issue_token(user.id).await.unwrap();
    (user.id, token)
}

async fn api() -> Api {
    let db = Database::open(DbLocation::Memory, Duration::from_secs(1))
        .await
        .unwrap();
    let metrics = Arc::new(HelpdeskMetrics::new().unwrap());
    let service = HelpdeskService::new(db, metrics);

    let (_, manager) = account(&service, "maria", Role::Manager).await;
    let (agent_id, agent) = account(&service, "sven", Role::Support).await;
    let (_, customer) = account(&service, "ana", Role::User).await;
    let (_, other_customer) = account(&service, "omar", Role::User).await;

    Api {
        app: router(Arc::new(AppState::new(service))),
        manager,
        agent,
        agent_id,
        customer,
        other_customer,
    }
}

impl Api {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_ticket(&self, token: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/v1/tickets",
                Some(token),
                Some(json!({
                    "title": "Laptop will not boot",
                    "description": "Black screen after the firmware update",
                    "priority": "HIGH"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["ticket"]["id"].as_i64().unwrap()
    }
}

// ============================================================================
// Test: Authentication and Gate Ordering
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let api = api().await;
    let (status, body) = api.send(Method::GET, "/v1/tickets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].as_str().unwrap().contains("No token provided"));
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let api = api().await;
    let (status, _) = api
        .send(Method::GET, "/v1/tickets", Some("deadbeef"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_gate_runs_before_validation() {
    let api = api().await;
    // Empty body would be a 400, but SUPPORT may not create tickets at all
    let (status, body) = api
        .send(Method::POST, "/v1/tickets", Some(&api.agent), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden: Insufficient permissions");
}

#[tokio::test]
async fn test_user_cannot_change_status() {
    let api = api().await;
    let id = api.create_ticket(&api.customer).await;
    let (status, _) = api
        .send(
            Method::PATCH,
            &format!("/v1/tickets/{}/status", id),
            Some(&api.customer),
            Some(json!({ "status": "CLOSED" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Test: Ticket Flows
// ============================================================================

#[tokio::test]
async fn test_create_ticket_validation() {
    let api = api().await;
    let (status, body) = api
        .send(
            Method::POST,
            "/v1/tickets",
            Some(&api.customer),
            Some(json!({ "title": "Hi", "description": "Something is broken" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title minimum length is 5 characters");

    let (status, _) = api
        .send(
            Method::POST,
            "/v1/tickets",
            Some(&api.customer),
            Some(json!({
                "title": "Keyboard",
                "description": "Several keys stopped working",
                "priority": "URGENT"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assign_resolve_close_flow() {
    let api = api().await;
    let id = api.create_ticket(&api.customer).await;

    let (status, body) = api
        .send(
            Method::PATCH,
            &format!("/v1/tickets/{}/assign", id),
            Some(&api.manager),
            Some(json!({ "assigneeId": api.agent_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(
        body["message"],
        "Ticket assigned successfully and status updated to IN_PROGRESS"
    );
    assert_eq!(body["ticket"]["status"], "IN_PROGRESS");
    assert_eq!(body["ticket"]["assigned_to"], api.agent_id);

    let (status, body) = api
        .send(
            Method::PATCH,
            &format!("/v1/tickets/{}/status", id),
            Some(&api.agent),
            Some(json!({ "status": "RESOLVED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["ticket"]["status"], "RESOLVED");

    let (status, body) = api
        .send(
            Method::PATCH,
            &format!("/v1/tickets/{}/status", id),
            Some(&api.agent),
            Some(json!({ "status": "IN_PROGRESS" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid status transition from RESOLVED to IN_PROGRESS"
    );

    let (status, _) = api
        .send(
            Method::PATCH,
            &format!("/v1/tickets/{}/status", id),
            Some(&api.manager),
            Some(json!({ "status": "CLOSED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, history) = api
        .send(
            Method::GET,
            &format!("/v1/tickets/{}/history", id),
            Some(&api.customer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2]["new_status"], "CLOSED");
}

#[tokio::test]
async fn test_assign_to_user_role_rejected() {
    let api = api().await;
    let id = api.create_ticket(&api.customer).await;
    let (_, users) = api
        .send(Method::GET, "/v1/users", Some(&api.manager), None)
        .await;
    let customer_id = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["role"] == "USER")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let (status, body) = api
        .send(
            Method::PATCH,
            &format!("/v1/tickets/{}/assign", id),
            Some(&api.manager),
            Some(json!({ "assigneeId": customer_id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot assign ticket to a USER role");
}

#[tokio::test]
async fn test_status_on_missing_ticket_is_not_found() {
    let api = api().await;
    let (status, body) = api
        .send(
            Method::PATCH,
            "/v1/tickets/9999/status",
            Some(&api.manager),
            Some(json!({ "status": "CLOSED" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ticket not found");
}

#[tokio::test]
async fn test_delete_ticket() {
    let api = api().await;
    let id = api.create_ticket(&api.customer).await;
    let uri = format!("/v1/tickets/{}", id);

    let (status, _) = api.send(Method::DELETE, &uri, Some(&api.agent), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = api
        .send(Method::DELETE, &uri, Some(&api.manager), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = api
        .send(Method::DELETE, &uri, Some(&api.manager), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_json_bad_request() {
    let api = api().await;
    for (method, uri) in [
        (Method::GET, "/v1/tickets/abc/history"),
        (Method::DELETE, "/v1/tickets/abc"),
        (Method::DELETE, "/v1/comments/first"),
    ] {
        let (status, body) = api.send(method, uri, Some(&api.manager), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["message"].is_string(), "{} returned {}", uri, body);
    }
}

#[tokio::test]
async fn test_non_numeric_id_still_gated_first() {
    let api = api().await;
    let (status, _) = api
        .send(Method::DELETE, "/v1/tickets/abc", Some(&api.customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Test: Role Scoping
// ============================================================================

#[tokio::test]
async fn test_listing_is_role_scoped() {
    let api = api().await;
    let mine = api.create_ticket(&api.customer).await;
    api.create_ticket(&api.other_customer).await;

    let (_, list) = api
        .send(Method::GET, "/v1/tickets", Some(&api.customer), None)
        .await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], mine);
    assert_eq!(list[0]["creator_name"], "ana");

    let (_, list) = api
        .send(Method::GET, "/v1/tickets", Some(&api.manager), None)
        .await;
    assert_eq!(list.as_array().unwrap().len(), 2);

    // Support sees nothing until something is assigned
    let (_, list) = api
        .send(Method::GET, "/v1/tickets", Some(&api.agent), None)
        .await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_thread_access() {
    let api = api().await;
    let id = api.create_ticket(&api.customer).await;
    let uri = format!("/v1/tickets/{}/comments", id);

    let (status, body) = api
        .send(
            Method::POST,
            &uri,
            Some(&api.customer),
            Some(json!({ "comment": "Still broken this morning" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["comment"]["id"].as_i64().unwrap();

    let (status, body) = api
        .send(Method::GET, &uri, Some(&api.other_customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Forbidden: You do not have access to this ticket"
    );

    let (status, thread) = api.send(Method::GET, &uri, Some(&api.manager), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread[0]["author_name"], "ana");
    assert_eq!(thread[0]["author_role"], "USER");

    let comment_uri = format!("/v1/comments/{}", comment_id);
    let (status, _) = api
        .send(
            Method::PATCH,
            &comment_uri,
            Some(&api.other_customer),
            Some(json!({ "comment": "hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = api
        .send(
            Method::PATCH,
            &comment_uri,
            Some(&api.customer),
            Some(json!({ "comment": "Fixed after a restart" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comment"]["comment"], "Fixed after a restart");

    let (status, _) = api
        .send(Method::DELETE, &comment_uri, Some(&api.manager), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// ============================================================================
// Test: Users, Health and Metrics
// ============================================================================

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let api = api().await;
    let (status, body) = api
        .send(
            Method::POST,
            "/v1/users",
            Some(&api.manager),
            Some(json!({ "name": "Ana Again", "email": "ANA@helpdesk.test", "role": "SUPPORT" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let api = api().await;
    let (status, body) = api.send(Method::GET, "/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");

    let id = api.create_ticket(&api.customer).await;
    api.send(
        Method::PATCH,
        &format!("/v1/tickets/{}/status", id),
        Some(&api.manager),
        Some(json!({ "status": "CLOSED" })),
    )
    .await;

    let response = api
        .app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("helpdesk_transitions_total{from=\"OPEN\",to=\"CLOSED\"} 1"));
}
