//! hrdesk-server – entry point.
//!
//! Startup order for `serve`:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Open the database and run pending migrations.
//! 4. Build the Gemini-backed retrieval pipeline.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.
//!
//! `create-user` provisions an account and prints its access token once.

mod config;
mod entities;
mod error;
mod media;
mod middleware;
mod routes;
mod schemas;
mod state;
mod views;


use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hrdesk_rag::{GeminiChat, GeminiConfig, GeminiEmbedder, RagPipeline};
use tracing::{info, warn};

use crate::config::Config;
use crate::entities::{AnyStore, UserStore};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "hrdesk-server")]
#[command(about = "HR policy question answering over uploaded documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Create a user and print its access token
    CreateUser {
        #[arg(long)]
        username: String,

        /// May manage documents
        #[arg(long)]
        staff: bool,

        #[arg(long)]
        superuser: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    init_tracing(&cfg);

    // ── 3. Database ────────────────────────────────────────────────────────────
    let store = AnyStore::connect(&cfg.database_url).await?;
    info!(database_url = %cfg.database_url, "database ready");

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(cfg, store).await,
        Commands::CreateUser { username, staff, superuser } => {
            let token = middleware::auth::generate_token();
            let user = store
                .create_user(&username, &middleware::auth::hash_token(&token), staff, superuser)
                .await?;
            info!(id = user.id, username = %user.username, admin = user.is_admin(), "user created");
            println!("{token}");
            Ok(())
        }
    }
}

fn init_tracing(cfg: &Config) {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: HRDESK_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "hrdesk-server starting");
}

async fn serve(cfg: Config, store: AnyStore) -> anyhow::Result<()> {
    // ── 4. Retrieval pipeline ──────────────────────────────────────────────────
    if cfg.google_api_key.is_empty() {
        warn!("GOOGLE_API_KEY is not set; questions will be answered with an apology");
    }
    let mut gemini = GeminiConfig::new(cfg.google_api_key.clone());
    gemini.base_url = cfg.gemini_base_url.clone();
    let embedder = GeminiEmbedder::new(gemini.clone(), cfg.embedding_model.clone())?;
    let chat = GeminiChat::new(gemini, cfg.chat_model.clone())?;
    let rag = RagPipeline::new(Arc::new(embedder), Arc::new(chat));

    tokio::fs::create_dir_all(cfg.documents_dir()).await?;

    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        store: Arc::new(store),
        rag,
        templates: Arc::new(views::environment()?),
    });

    // ── 5. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hrdesk-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c   => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
