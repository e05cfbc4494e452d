//! Helpdesk Daemon - ticket lifecycle service
//!
//! Serves the HTTP API and provides bootstrap commands for creating users
//! and issuing API tokens.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use helpdesk_shared::UserRequest;
use helpdeskd::config::Config;
use helpdeskd::db::{Database, DbLocation};
use helpdeskd::metrics::HelpdeskMetrics;
use helpdeskd::server::{self, AppState};
use helpdeskd::HelpdeskService;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "helpdeskd")]
#[command(about = "Helpdesk ticketing daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (overrides /etc/helpdesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand (defaults to serve)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,

    /// Create a user account
    CreateUser {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// MANAGER, SUPPORT or USER
        #[arg(long)]
        role: String,
    },

    /// Issue an API token for an existing user
    IssueToken {
        #[arg(long)]
        user_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db = Database::open(
        DbLocation::File(config.database.path.clone()),
        config.database.busy_timeout(),
    )
    .await?;
    let metrics = Arc::new(HelpdeskMetrics::new().context("Failed to register metrics")?);
    let service = HelpdeskService::new(db, metrics);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("Helpdesk Daemon v{} starting", env!("CARGO_PKG_VERSION"));
            server::run(AppState::new(service), &config.server.bind_addr).await?;
        }
        Commands::CreateUser { name, email, role } => {
            let input = UserRequest {
                name: Some(name),
                email: Some(email),
                role: Some(role),
            }
            .validate()?;
            let user = service.create_user(input).await?;
            println!("Created user {} ({}) with role {}", user.id, user.email, user.role);
        }
        Commands::IssueToken { user_id } => {
            let token = service.issue_token(user_id).await?;
            println!("{}", token);
        }
    }

    Ok(())
}
