// # dyndnsd - DynDNS Daemon
//
// Thin HTTP shell over dyndns-core. All classification, reconciliation and
// verification logic lives in the core crate.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the zone backend and running the self-test
// 4. Serving `GET /` and `GET /dyn` until SIGINT/SIGTERM
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `DYNDNS_BIND_ADDRESS`: Listen address (default `0.0.0.0:8080`)
// - `DYNDNS_AUTH`: `username:password` for HTTP Basic auth on `/dyn` (optional)
// - `DYNDNS_PROJECT_ID`: Project owning the managed zone
// - `DYNDNS_DNS_ZONE_NAME`: Managed zone identifier
// - `DYNDNS_DOMAIN_NAME`: Hostname whose A/AAAA records are kept in sync
// - `DYNDNS_BACKEND`: Zone backend (`memory`)
// - `DYNDNS_LOG_LEVEL`: trace, debug, info, warn, error (default `info`)
//
// ## Example
//
// ```bash
// export DYNDNS_PROJECT_ID=my-project
// export DYNDNS_DNS_ZONE_NAME=example-zone
// export DYNDNS_DOMAIN_NAME=home.example.com
// export DYNDNS_AUTH=router:s3cret
//
// dyndnsd
// ```

mod auth;
mod routes;

use anyhow::{Context, Result};
use auth::BasicCredentials;
use dyndns_core::{DyndnsConfig, MemoryZone, Reconciler, ZoneBackend, ZoneConfig};
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Startup delay when `/dyn` is served without authentication
const UNAUTHENTICATED_STARTUP_DELAY: Duration = Duration::from_secs(5);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DyndnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error, failed self-test or failed bind
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DyndnsExitCode> for ExitCode {
    fn from(code: DyndnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    bind_address: String,
    auth: Option<String>,
    project_id: String,
    zone_name: String,
    domain_name: String,
    backend_type: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            bind_address: env::var("DYNDNS_BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            auth: env::var("DYNDNS_AUTH").ok().filter(|s| !s.is_empty()),
            project_id: env::var("DYNDNS_PROJECT_ID").unwrap_or_default(),
            zone_name: env::var("DYNDNS_DNS_ZONE_NAME").unwrap_or_default(),
            domain_name: env::var("DYNDNS_DOMAIN_NAME").unwrap_or_default(),
            backend_type: env::var("DYNDNS_BACKEND").unwrap_or_else(|_| "memory".to_string()),
            log_level: env::var("DYNDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the configuration
    ///
    /// Checks required fields, the bind address, the credentials format, the
    /// backend type and the log level. Domain name rules are checked by
    /// `DyndnsConfig::validate`.
    fn validate(&self) -> Result<()> {
        if self.project_id.is_empty() {
            anyhow::bail!(
                "DYNDNS_PROJECT_ID is required. \
                Set it via: export DYNDNS_PROJECT_ID=your-project"
            );
        }

        if self.zone_name.is_empty() {
            anyhow::bail!(
                "DYNDNS_DNS_ZONE_NAME is required. \
                Set it via: export DYNDNS_DNS_ZONE_NAME=your-zone"
            );
        }

        if self.domain_name.is_empty() {
            anyhow::bail!(
                "DYNDNS_DOMAIN_NAME is required. \
                Set it via: export DYNDNS_DOMAIN_NAME=home.example.com"
            );
        }

        self.bind_address
            .parse::<SocketAddr>()
            .with_context(|| format!("DYNDNS_BIND_ADDRESS '{}' is not valid", self.bind_address))?;

        if let Some(ref raw) = self.auth {
            BasicCredentials::parse(raw)?;
        }

        match self.backend_type.as_str() {
            "memory" => {}
            _ => anyhow::bail!(
                "DYNDNS_BACKEND '{}' is not supported. \
                Supported backends: memory",
                self.backend_type
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DYNDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.dyndns_config()
            .validate()
            .context("Invalid DNS configuration")?;

        Ok(())
    }

    fn dyndns_config(&self) -> DyndnsConfig {
        DyndnsConfig::new(
            ZoneConfig::new(&self.project_id, &self.zone_name),
            &self.domain_name,
        )
    }

    fn credentials(&self) -> Result<Option<BasicCredentials>> {
        self.auth.as_deref().map(BasicCredentials::parse).transpose()
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DyndnsExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DyndnsExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DyndnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let (reconciler, credentials, listener) = match startup(&config).await {
            Ok(parts) => parts,
            Err(e) => {
                error!("Startup failed: {:#}", e);
                return DyndnsExitCode::ConfigError;
            }
        };

        if let Err(e) = serve(reconciler, credentials, listener).await {
            error!("Daemon error: {:#}", e);
            DyndnsExitCode::RuntimeError
        } else {
            DyndnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the backend and reconciler, run the self-test and bind the listener
async fn startup(
    config: &Config,
) -> Result<(Reconciler, Option<BasicCredentials>, TcpListener)> {
    let dyndns_config = Arc::new(config.dyndns_config());
    let backend = build_backend(config, &dyndns_config)?;

    info!(
        backend = backend.backend_name(),
        project_id = %dyndns_config.zone.project_id,
        zone = %dyndns_config.zone.zone_name,
        domain = %dyndns_config.domain_name,
        "Configuration loaded"
    );

    let reconciler = Reconciler::new(backend, dyndns_config)?;

    reconciler
        .self_test()
        .await
        .context("Credential self-test failed")?;
    info!("Self-test passed");

    let credentials = config.credentials()?;
    match credentials {
        Some(ref credentials) => {
            info!(username = credentials.username(), "Basic authentication enabled on /dyn");
        }
        None => {
            warn!(
                "No DYNDNS_AUTH configured, /dyn is open to anyone. \
                Delaying startup by {:?}",
                UNAUTHENTICATED_STARTUP_DELAY
            );
            tokio::time::sleep(UNAUTHENTICATED_STARTUP_DELAY).await;
        }
    }

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    Ok((reconciler, credentials, listener))
}

fn build_backend(config: &Config, dyndns_config: &DyndnsConfig) -> Result<Arc<dyn ZoneBackend>> {
    match config.backend_type.as_str() {
        "memory" => Ok(Arc::new(MemoryZone::new(
            &dyndns_config.zone,
            parent_domain(&dyndns_config.domain_name),
        ))),
        other => anyhow::bail!("Unsupported backend: {}", other),
    }
}

/// Zone apex for a hostname: everything after the first label
fn parent_domain(fqdn: &str) -> String {
    match fqdn.split_once('.') {
        Some((_, parent)) if !parent.is_empty() => parent.to_string(),
        _ => fqdn.to_string(),
    }
}

/// Serve until a shutdown signal arrives
async fn serve(
    reconciler: Reconciler,
    credentials: Option<BasicCredentials>,
    listener: TcpListener,
) -> Result<()> {
    let local_addr = listener.local_addr()?;
    let app = routes::build_router(reconciler, credentials);

    info!(address = %local_addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutting down daemon");
    Ok(())
}

async fn shutdown_signal() {
    match wait_for_shutdown().await {
        Ok(signal) => info!("Received shutdown signal: {}", signal),
        Err(e) => {
            // Without signal handlers the process can only be killed.
            error!("Shutdown error: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
