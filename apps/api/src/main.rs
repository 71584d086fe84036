mod assessment;
mod auth;
mod cli;
mod config;
mod db;
mod errors;
mod feedback;
mod llm_client;
mod models;
mod recruiter;
mod report;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use redis::aio::ConnectionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::session::RedisSessionStore;
use crate::assessment::store::PgAssessmentStore;
use crate::auth::password::hash_password;
use crate::auth::Authenticator;
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::HashPassword { password }) => {
            println!("{}", hash_password(&password)?);
            Ok(())
        }
        Some(Commands::Serve) | None => serve().await,
    }
}

async fn serve() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Persona API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    let redis = ConnectionManager::new(redis).await?;
    info!(
        "Redis session store ready (ttl {}s)",
        config.session_ttl_secs
    );

    let llm = LlmClient::new(&config.llm)?;
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        store: Arc::new(PgAssessmentStore::new(db)),
        sessions: Arc::new(RedisSessionStore::new(redis, config.session_ttl_secs)),
        llm,
        auth: Arc::new(Authenticator::from_config(&config.auth)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
