//! Resume service binary.
//!
//! Verifies session cookies locally and delegates refreshes to the user
//! service's auth check.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cvgen_api::config::{ApiConfig, parse_url};
use cvgen_api::services::remote_auth::{HttpAuthAuthority, HttpClientSettings};
use cvgen_core::resumes::{MemoryResumeIndex, ResumeIndex};
use cvgen_core::startup::{STARTUP_ATTEMPTS, STARTUP_RETRY_DELAY, wait_until_ready};
use tracing::info;

/// CLI arguments for the resume service.
#[derive(Parser, Debug)]
#[command(name = "cvgen_resume_service", about = "Resume generator resume service")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8081")]
    bind_addr: String,

    /// HS256 secret shared with the user service, at least 32 bytes.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Base URL of the user service.
    #[arg(long, env = "AUTH_SERVICE_URL", default_value = "http://127.0.0.1:8080")]
    auth_service_url: String,

    /// Upper bound for one auth check, in milliseconds.
    #[arg(long, env = "AUTH_CHECK_TIMEOUT_MS", default_value_t = 5000)]
    auth_check_timeout_ms: u64,

    /// Confirm every request with the user service, even with a valid access token.
    #[arg(long, env = "STRICT_DELEGATION", default_value_t = false)]
    strict_delegation: bool,

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
        auth_service_url: Some(parse_url("AUTH_SERVICE_URL", &args.auth_service_url)?),
        check_timeout: Duration::from_millis(args.auth_check_timeout_ms),
        strict_delegation: args.strict_delegation,
    };
    config.validate()?;
    info!(?config, version = cvgen_core::version(), "starting cvgen_resume_service");

    let client = HttpClientSettings::with_timeout(config.check_timeout).build_client()?;
    let authority = Arc::new(HttpAuthAuthority::new(
        client,
        config.require_auth_service_url()?,
    )?);
    info!(url = %authority.check_url(), "delegating auth checks");

    let index = Arc::new(MemoryResumeIndex::new());
    wait_until_ready("resume index", STARTUP_ATTEMPTS, STARTUP_RETRY_DELAY, || {
        index.ping()
    })
    .await?;

    let state = cvgen_api::ResumeServiceState::new(config.clone(), index, authority);
    let app = cvgen_api::resume_service_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "resume service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("resume service stopped");
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
