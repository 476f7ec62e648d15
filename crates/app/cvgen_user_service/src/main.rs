//! User service binary.
//!
//! Owns credentials, issues the cookie token pair and answers the auth check
//! other services delegate to.

use std::sync::Arc;

use clap::Parser;
use cvgen_api::config::ApiConfig;
use cvgen_core::startup::{STARTUP_ATTEMPTS, STARTUP_RETRY_DELAY, wait_until_ready};
use cvgen_core::users::{MemoryUserRepository, UserRepository};
use tracing::info;

/// CLI arguments for the user service.
#[derive(Parser, Debug)]
#[command(name = "cvgen_user_service", about = "Resume generator user service")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind_addr: String,

    /// HS256 signing secret, at least 32 bytes. Must match every verifying service.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Mark auth cookies `Secure`.
    #[arg(long, env = "SECURE_COOKIES", default_value_t = false)]
    secure_cookies: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let args = Args::parse();

    let config = ApiConfig {
        bind_addr: args.bind_addr,
        jwt_secret: args.jwt_secret,
        secure_cookies: args.secure_cookies,
        auth_service_url: None,
        check_timeout: cvgen_api::config::DEFAULT_CHECK_TIMEOUT,
        strict_delegation: false,
    };
    config.validate()?;
    info!(?config, version = cvgen_core::version(), "starting cvgen_user_service");

    let repo = Arc::new(MemoryUserRepository::new());
    wait_until_ready("user repository", STARTUP_ATTEMPTS, STARTUP_RETRY_DELAY, || {
        repo.ping()
    })
    .await?;

    let state = cvgen_api::UserServiceState::new(config.clone(), repo);
    let app = cvgen_api::user_service_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "user service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("user service stopped");
    Ok(())
}

const DEFAULT_FILTER: &str = "info,cvgen_api=debug,cvgen_core=debug";

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
