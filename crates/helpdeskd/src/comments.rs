//! Comment rules: ticket access for posting, authorship for editing.

use crate::error::{HelpdeskError, Result};
use crate::queries::accessible_ticket;
use crate::store::comments;
use chrono::Utc;
use helpdesk_shared::{Comment, CommentId, Identity, NewComment, Role, TicketId};
use rusqlite::Connection;

/// Post a comment on a ticket the author can access.
pub fn add_comment(
    conn: &Connection,
    ticket_id: TicketId,
    input: &NewComment,
    author: Identity,
) -> Result<Comment> {
    accessible_ticket(conn, ticket_id, author)?;
    Ok(comments::insert(conn, ticket_id, author.id, &input.comment, Utc::now())?)
}

/// Load a comment the requester may modify: its author, or any manager.
fn editable_comment(
    conn: &Connection,
    comment_id: CommentId,
    requester: Identity,
    verb: &str,
) -> Result<Comment> {
    let comment = comments::find(conn, comment_id)?.ok_or(HelpdeskError::NotFound("Comment"))?;
    if comment.user_id != requester.id && requester.role != Role::Manager {
        return Err(HelpdeskError::Forbidden(format!(
            "Forbidden: You can only {} your own comments unless you are a MANAGER",
            verb
        )));
    }
    Ok(comment)
}

pub fn update_comment(
    conn: &Connection,
    comment_id: CommentId,
    input: &NewComment,
    requester: Identity,
) -> Result<Comment> {
    let mut comment = editable_comment(conn, comment_id, requester, "edit")?;
    comments::update_text(conn, comment_id, &input.comment)?;
    comment.comment = input.comment.clone();
    Ok(comment)
}

pub fn delete_comment(conn: &Connection, comment_id: CommentId, requester: Identity) -> Result<()> {
    editable_comment(conn, comment_id, requester, "delete")?;
    comments::delete(conn, comment_id)?;
    Ok(())
}
