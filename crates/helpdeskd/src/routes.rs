//! API routes for helpdeskd
//!
//! Handlers resolve the caller, apply the authorization gate, validate the
//! payload, and only then hand off to the service. A malformed body is
//! reported after the gate so unauthorized callers learn nothing about the
//! expected shape.

use crate::auth::AuthUser;
use crate::error::HelpdeskError;
use crate::server::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch},
    Json, Router,
};
use helpdesk_shared::{
    AssignRequest, CommentRequest, CommentView, Operation, StatusLogEntry, StatusRequest,
    TicketRequest, TicketSummary, User, UserRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Errors
// ============================================================================

/// HTTP rendering of a `HelpdeskError`
#[derive(Debug)]
pub struct ApiError(pub HelpdeskError);

impl From<HelpdeskError> for ApiError {
    fn from(err: HelpdeskError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(HelpdeskError::InvalidInput(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(HelpdeskError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            HelpdeskError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HelpdeskError::Forbidden(_) => StatusCode::FORBIDDEN,
            HelpdeskError::NotFound(_) => StatusCode::NOT_FOUND,
            HelpdeskError::InvalidInput(_) | HelpdeskError::InvalidTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            HelpdeskError::Store(_) | HelpdeskError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if self.0.is_internal() {
            error!("  Internal error: {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    Ok(payload?.0)
}

type IdPath = Result<Path<i64>, PathRejection>;

fn path_id(path: IdPath) -> ApiResult<i64> {
    Ok(path?.0)
}

/// Confirmation message with an optional payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse<T> {
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

fn message<T>(text: &str, data: T) -> MessageResponse<T> {
    MessageResponse {
        message: text.to_string(),
        data,
    }
}

// ============================================================================
// Health & Metrics Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/health", get(health_check))
        .route("/metrics", get(metrics))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    state.service.metrics().record_request("health");
    Json(HealthResponse {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn metrics(State(state): State<AppStateArc>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.service.metrics().render(),
    )
}

// ============================================================================
// User Routes
// ============================================================================

pub fn user_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/users", get(list_users).post(create_user))
}

async fn create_user(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse<serde_json::Value>>)> {
    state.service.metrics().record_request("create_user");
    auth.require(Operation::CreateUser)?;
    let input = body(payload)?.validate().map_err(HelpdeskError::from)?;

    let user = state.service.create_user(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(message("User created successfully", json!({ "user": user }))),
    ))
}

async fn list_users(State(state): State<AppStateArc>, auth: AuthUser) -> ApiResult<Json<Vec<User>>> {
    state.service.metrics().record_request("list_users");
    auth.require(Operation::ListUsers)?;
    Ok(Json(state.service.list_users().await?))
}

// ============================================================================
// Ticket Routes
// ============================================================================

pub fn ticket_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/tickets", get(list_tickets).post(create_ticket))
        .route("/v1/tickets/:id", delete(delete_ticket))
        .route("/v1/tickets/:id/assign", patch(assign_ticket))
        .route("/v1/tickets/:id/status", patch(update_status))
        .route("/v1/tickets/:id/history", get(ticket_history))
        .route(
            "/v1/tickets/:id/comments",
            get(list_comments).post(add_comment),
        )
}

async fn create_ticket(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    payload: Result<Json<TicketRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse<serde_json::Value>>)> {
    state.service.metrics().record_request("create_ticket");
    let creator = auth.require(Operation::CreateTicket)?;
    let input = body(payload)?.validate().map_err(HelpdeskError::from)?;

    let ticket = state.service.create_ticket(creator, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(message("Ticket created successfully", json!({ "ticket": ticket }))),
    ))
}

async fn list_tickets(
    State(state): State<AppStateArc>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<TicketSummary>>> {
    state.service.metrics().record_request("list_tickets");
    let viewer = auth.require(Operation::ListTickets)?;
    Ok(Json(state.service.list_tickets(viewer).await?))
}

async fn assign_ticket(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    ticket_id: IdPath,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse<serde_json::Value>>> {
    state.service.metrics().record_request("assign_ticket");
    let requester = auth.require(Operation::AssignTicket)?;
    let ticket_id = path_id(ticket_id)?;
    let assignment = body(payload)?.validate().map_err(HelpdeskError::from)?;

    let outcome = state
        .service
        .assign_ticket(ticket_id, assignment, requester)
        .await?;
    Ok(Json(message(
        "Ticket assigned successfully and status updated to IN_PROGRESS",
        json!({ "ticket": outcome.ticket }),
    )))
}

async fn update_status(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    ticket_id: IdPath,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse<serde_json::Value>>> {
    state.service.metrics().record_request("update_status");
    let requester = auth.require(Operation::UpdateStatus)?;
    let ticket_id = path_id(ticket_id)?;
    let change = body(payload)?.validate().map_err(HelpdeskError::from)?;

    let outcome = state
        .service
        .update_status(ticket_id, change, requester)
        .await?;
    Ok(Json(message(
        "Ticket status updated successfully",
        json!({ "ticket": outcome.ticket }),
    )))
}

async fn delete_ticket(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    ticket_id: IdPath,
) -> ApiResult<StatusCode> {
    state.service.metrics().record_request("delete_ticket");
    let requester = auth.require(Operation::DeleteTicket)?;
    let ticket_id = path_id(ticket_id)?;
    state.service.delete_ticket(ticket_id, requester).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn ticket_history(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    ticket_id: IdPath,
) -> ApiResult<Json<Vec<StatusLogEntry>>> {
    state.service.metrics().record_request("ticket_history");
    let viewer = auth.require(Operation::TicketThread)?;
    let ticket_id = path_id(ticket_id)?;
    Ok(Json(state.service.ticket_history(ticket_id, viewer).await?))
}

// ============================================================================
// Comment Routes
// ============================================================================

pub fn comment_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/comments/:id", patch(update_comment).delete(delete_comment))
}

async fn add_comment(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    ticket_id: IdPath,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse<serde_json::Value>>)> {
    state.service.metrics().record_request("add_comment");
    let author = auth.require(Operation::TicketThread)?;
    let ticket_id = path_id(ticket_id)?;
    let input = body(payload)?.validate().map_err(HelpdeskError::from)?;

    let comment = state.service.add_comment(ticket_id, input, author).await?;
    Ok((
        StatusCode::CREATED,
        Json(message("Comment added successfully", json!({ "comment": comment }))),
    ))
}

async fn list_comments(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    ticket_id: IdPath,
) -> ApiResult<Json<Vec<CommentView>>> {
    state.service.metrics().record_request("list_comments");
    let viewer = auth.require(Operation::TicketThread)?;
    let ticket_id = path_id(ticket_id)?;
    Ok(Json(state.service.list_comments(ticket_id, viewer).await?))
}

async fn update_comment(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    comment_id: IdPath,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse<serde_json::Value>>> {
    state.service.metrics().record_request("update_comment");
    let requester = auth.require(Operation::TicketThread)?;
    let comment_id = path_id(comment_id)?;
    let input = body(payload)?.validate().map_err(HelpdeskError::from)?;

    let comment = state
        .service
        .update_comment(comment_id, input, requester)
        .await?;
    Ok(Json(message(
        "Comment updated successfully",
        json!({ "comment": comment }),
    )))
}

async fn delete_comment(
    State(state): State<AppStateArc>,
    auth: AuthUser,
    comment_id: IdPath,
) -> ApiResult<StatusCode> {
    state.service.metrics().record_request("delete_comment");
    let requester = auth.require(Operation::TicketThread)?;
    let comment_id = path_id(comment_id)?;
    state.service.delete_comment(comment_id, requester).await?;
    Ok(StatusCode::NO_CONTENT)
}
