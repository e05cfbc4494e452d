//! Bearer token identity resolution.
//!
//! Tokens are random 32-byte values handed out by `helpdeskd issue-token`.
//! The database stores only their SHA-256 digest; a request's token is
//! hashed and looked up to recover `{id, role}`.

use crate::error::{HelpdeskError, Result};
use crate::server::AppState;
use crate::store::{tokens, users};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use helpdesk_shared::{authorize, Identity, Operation, UserId};
use rand::RngCore;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

const TOKEN_BYTES: usize = 32;

/// SHA-256 hex digest of a token
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Issue a new token for an existing user. Returns the plaintext token,
/// which is not recoverable afterwards.
pub fn issue_token(conn: &Connection, user_id: UserId) -> Result<String> {
    if users::find(conn, user_id)?.is_none() {
        return Err(HelpdeskError::NotFound("User"));
    }
    let token = generate_token();
    tokens::insert(conn, &hash_token(&token), user_id, Utc::now())?;
    Ok(token)
}

/// Resolve a plaintext token to its owner's identity.
pub fn resolve_token(conn: &Connection, token: &str) -> Result<Identity> {
    tokens::resolve(conn, &hash_token(token))?
        .ok_or(HelpdeskError::Unauthorized("Invalid token"))
}

/// Extract the token from an `Authorization: Bearer <token>` header value
fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authenticated caller, extracted from the request headers
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    /// Authorization gate for `operation`.
    pub fn require(&self, operation: Operation) -> Result<Identity> {
        authorize(self.0.role, operation).map_err(|denied| {
            warn!(
                "Denied {} for user {} ({})",
                operation, self.0.id, self.0.role
            );
            HelpdeskError::from(denied)
        })?;
        Ok(self.0)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = crate::routes::ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(HelpdeskError::Unauthorized("No token provided"))?;

        let token = bearer_token(header)
            .ok_or(HelpdeskError::Unauthorized("No token provided"))?
            .to_string();

        let identity = state.service.resolve_token(token).await?;

        debug!("Authenticated user {} ({})", identity.id, identity.role);
        Ok(AuthUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_connection;
    use helpdesk_shared::{NewUser, Role};

    #[test]
    fn test_bearer_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_token_roundtrip() {
        let conn = open_memory_connection().unwrap();
        let user = users::insert(
            &conn,
            &NewUser {
                name: "Sam".into(),
                email: "sam@helpdesk.test".into(),
                role: Role::Support,
            },
            Utc::now(),
        )
        .unwrap();

        let token = issue_token(&conn, user.id).unwrap();
        assert_eq!(token.len(), TOKEN_BYTES * 2);

        let identity = resolve_token(&conn, &token).unwrap();
        assert_eq!(identity, Identity::new(user.id, Role::Support));

        assert!(matches!(
            resolve_token(&conn, "not-a-token"),
            Err(HelpdeskError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_plaintext_token_not_stored() {
        let conn = open_memory_connection().unwrap();
        let user = users::insert(
            &conn,
            &NewUser {
                name: "Ana".into(),
                email: "ana@helpdesk.test".into(),
                role: Role::User,
            },
            Utc::now(),
        )
        .unwrap();
        let token = issue_token(&conn, user.id).unwrap();
        let stored: String = conn
            .query_row("SELECT token_hash FROM api_tokens", [], |r| r.get(0))
            .unwrap();
        assert_ne!(stored, token);
        assert_eq!(stored, hash_token(&token));
    }

    #[test]
    fn test_issue_token_for_unknown_user() {
        let conn = open_memory_connection().unwrap();
        assert!(matches!(
            issue_token(&conn, 42),
            Err(HelpdeskError::NotFound("User"))
        ));
    }

    #[test]
    fn test_require_gate() {
        let user = AuthUser(Identity::new(3, Role::User));
        assert!(user.require(Operation::CreateTicket).is_ok());
        assert!(matches!(
            user.require(Operation::AssignTicket),
            Err(HelpdeskError::Forbidden(_))
        ));
    }
}
