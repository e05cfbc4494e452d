//! Helpdesk daemon library
//!
//! Ticket lifecycle engine, role-scoped queries, SQLite persistence and the
//! HTTP API. The binary in `main.rs` wires these together.

pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod queries;
pub mod routes;
pub mod server;
pub mod service;
pub mod store;

pub use error::{HelpdeskError, Result};
pub use service::HelpdeskService;
