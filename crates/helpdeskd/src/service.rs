//! Async facade over the lifecycle engine, queries and stores.
//!
//! Every method moves its store work onto the blocking pool through
//! [`Database::call`] and records the outcome in the metrics registry.

use crate::auth;
use crate::comments;
use crate::db::Database;
use crate::error::{HelpdeskError, Result};
use crate::lifecycle::{self, AssignOutcome, StatusOutcome};
use crate::metrics::HelpdeskMetrics;
use crate::queries;
use crate::store::{tickets, users};
use chrono::Utc;
use helpdesk_shared::{
    Assignment, Comment, CommentId, CommentView, Identity, NewComment, NewTicket, NewUser,
    Operation, StatusChange, StatusLogEntry, Ticket, TicketId, TicketSummary, User, UserId,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct HelpdeskService {
    db: Database,
    metrics: Arc<HelpdeskMetrics>,
}

impl HelpdeskService {
    pub fn new(db: Database, metrics: Arc<HelpdeskMetrics>) -> Self {
        Self { db, metrics }
    }

    pub fn metrics(&self) -> &HelpdeskMetrics {
        &self.metrics
    }

    fn observe<T>(&self, operation: Operation, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.metrics.record_rejection(operation.as_str(), err.reason());
        }
        result
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub async fn assign_ticket(
        &self,
        ticket_id: TicketId,
        assignment: Assignment,
        requester: Identity,
    ) -> Result<AssignOutcome> {
        let result = self
            .db
            .call(move |conn| {
                lifecycle::assign_ticket(conn, ticket_id, assignment.assignee_id, requester.id)
            })
            .await;

        if let Ok(AssignOutcome {
            transition: Some(entry),
            ..
        }) = &result
        {
            self.metrics
                .record_transition(entry.old_status.as_str(), entry.new_status.as_str());
        }
        self.observe(Operation::AssignTicket, result)
    }

    pub async fn update_status(
        &self,
        ticket_id: TicketId,
        change: StatusChange,
        requester: Identity,
    ) -> Result<StatusOutcome> {
        let result = self
            .db
            .call(move |conn| lifecycle::update_status(conn, ticket_id, change.status, requester))
            .await;

        if let Ok(outcome) = &result {
            self.metrics.record_transition(
                outcome.transition.old_status.as_str(),
                outcome.transition.new_status.as_str(),
            );
        }
        self.observe(Operation::UpdateStatus, result)
    }

    // ------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------

    pub async fn create_ticket(&self, creator: Identity, input: NewTicket) -> Result<Ticket> {
        let result = self
            .db
            .call(move |conn| Ok(tickets::insert(conn, creator.id, &input, Utc::now())?))
            .await;
        if let Ok(ticket) = &result {
            info!("Ticket {} created by {}", ticket.id, creator.id);
        }
        self.observe(Operation::CreateTicket, result)
    }

    pub async fn list_tickets(&self, viewer: Identity) -> Result<Vec<TicketSummary>> {
        let result = self
            .db
            .call(move |conn| queries::list_tickets(conn, viewer))
            .await;
        self.observe(Operation::ListTickets, result)
    }

    pub async fn delete_ticket(&self, ticket_id: TicketId, requester: Identity) -> Result<()> {
        let result = self
            .db
            .call(move |conn| {
                if tickets::delete(conn, ticket_id)? {
                    Ok(())
                } else {
                    Err(HelpdeskError::NotFound("Ticket"))
                }
            })
            .await;
        match &result {
            Ok(()) => info!("Ticket {} deleted by {}", ticket_id, requester.id),
            Err(err) => warn!("Delete of ticket {} by {} failed: {}", ticket_id, requester.id, err),
        }
        self.observe(Operation::DeleteTicket, result)
    }

    pub async fn ticket_history(
        &self,
        ticket_id: TicketId,
        viewer: Identity,
    ) -> Result<Vec<StatusLogEntry>> {
        let result = self
            .db
            .call(move |conn| queries::ticket_history(conn, ticket_id, viewer))
            .await;
        self.observe(Operation::TicketThread, result)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn add_comment(
        &self,
        ticket_id: TicketId,
        input: NewComment,
        author: Identity,
    ) -> Result<Comment> {
        let result = self
            .db
            .call(move |conn| comments::add_comment(conn, ticket_id, &input, author))
            .await;
        self.observe(Operation::TicketThread, result)
    }

    pub async fn list_comments(
        &self,
        ticket_id: TicketId,
        viewer: Identity,
    ) -> Result<Vec<CommentView>> {
        let result = self
            .db
            .call(move |conn| queries::ticket_comments(conn, ticket_id, viewer))
            .await;
        self.observe(Operation::TicketThread, result)
    }

    pub async fn update_comment(
        &self,
        comment_id: CommentId,
        input: NewComment,
        requester: Identity,
    ) -> Result<Comment> {
        let result = self
            .db
            .call(move |conn| comments::update_comment(conn, comment_id, &input, requester))
            .await;
        self.observe(Operation::TicketThread, result)
    }

    pub async fn delete_comment(&self, comment_id: CommentId, requester: Identity) -> Result<()> {
        let result = self
            .db
            .call(move |conn| comments::delete_comment(conn, comment_id, requester))
            .await;
        self.observe(Operation::TicketThread, result)
    }

    // ------------------------------------------------------------------
    // Users and tokens
    // ------------------------------------------------------------------

    pub async fn create_user(&self, input: NewUser) -> Result<User> {
        let result = self
            .db
            .call(move |conn| {
                if users::email_exists(conn, &input.email)? {
                    return Err(HelpdeskError::InvalidInput(
                        "Email already registered".to_string(),
                    ));
                }
                Ok(users::insert(conn, &input, Utc::now())?)
            })
            .await;
        if let Ok(user) = &result {
            info!("User {} created with role {}", user.id, user.role);
        }
        self.observe(Operation::CreateUser, result)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let result = self.db.call(|conn| Ok(users::list(conn)?)).await;
        self.observe(Operation::ListUsers, result)
    }

    pub async fn issue_token(&self, user_id: UserId) -> Result<String> {
        self.db
            .call(move |conn| auth::issue_token(conn, user_id))
            .await
    }

    pub async fn resolve_token(&self, token: String) -> Result<Identity> {
        self.db
            .call(move |conn| auth::resolve_token(conn, &token))
            .await
    }
}
