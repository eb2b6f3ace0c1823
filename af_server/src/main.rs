//! ActsFile authentication server.
//!
//! Serves the auth HTTP API over an in-memory user store.

use std::net::SocketAddr;
use std::sync::Arc;

use actsfile::{
    auth::{AuthManager, LogNotifier},
    db::InMemoryUserRepository,
};
use af_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use anyhow::Error;
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run the ActsFile authentication server

USAGE:
  af_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  JWT_SECRET               Token signing secret (required, >= 32 chars)
  PASSWORD_PEPPER          Password hashing pepper (required, >= 16 chars)
  APP_ENV                  Environment name; `development` exposes error details
  SESSION_TTL_SECS         Session token lifetime      [default: 604800]
  VERIFICATION_TTL_SECS    Email verification lifetime [default: 86400]
  RESET_TTL_SECS           Password reset lifetime     [default: 3600]
  METRICS_BIND             Prometheus exporter address (optional)
  DEMO_USER_EMAIL          Seed a verified demo account (with DEMO_USER_PASSWORD)
  (A .env file in the working directory is loaded if present)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;

    logging::init();

    let config = ServerConfig::from_env(bind)?;
    info!(
        "Starting ActsFile auth server at {} ({})",
        config.bind, config.environment
    );

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    let users = Arc::new(InMemoryUserRepository::new());
    let auth_manager = AuthManager::new(
        users,
        Arc::new(LogNotifier),
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
    )
    .with_lifetimes(config.tokens.lifetimes());

    if let Some(seed) = &config.seed_user {
        let user = auth_manager
            .seed_verified_user(&seed.name, &seed.email, &seed.password)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed demo user: {}", e))?;
        info!("Seeded verified demo account {}", user.email);
    }

    let app = api::create_router(AppState::new(auth_manager, &config.environment));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
