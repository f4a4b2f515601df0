// # dyndns-update
//
// One-shot updater: looks up this host's public IPv4 and IPv6 address and
// submits them to a DynDNS server.
//
// ## Configuration
//
// - `DYNDNS_SERVER_URL`: Base URL of the server (required)
// - `DYNDNS_USERNAME` / `DYNDNS_PASSWORD`: HTTP Basic credentials (optional)
// - `DYNDNS_IP_PROVIDER`: icanhazipcom, ipifyorg, ifconfigme, ipsb, identme
//   (default icanhazipcom)
// - `DYNDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)

use anyhow::{Context, Result};
use dyndns_client::lookup::provider_or_default;
use dyndns_client::{DEFAULT_PROVIDER, PublicIpLookup, UpdateClient};
use dyndns_core::{AddressFamily, Outcome, RecordOutcome};
use std::env;
use std::net::IpAddr;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

struct Config {
    server_url: String,
    username: Option<String>,
    password: Option<String>,
    ip_provider: String,
    log_level: String,
}

impl Config {
    fn from_env() -> Result<Self> {
        Ok(Self {
            server_url: env::var("DYNDNS_SERVER_URL").context(
                "DYNDNS_SERVER_URL is required. \
                Set it via: export DYNDNS_SERVER_URL=https://dyndns.example.com",
            )?,
            username: env::var("DYNDNS_USERNAME").ok().filter(|s| !s.is_empty()),
            password: env::var("DYNDNS_PASSWORD").ok().filter(|s| !s.is_empty()),
            ip_provider: env::var("DYNDNS_IP_PROVIDER")
                .unwrap_or_else(|_| DEFAULT_PROVIDER.to_string()),
            log_level: env::var("DYNDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ExitCode::from(1);
        }
    };

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
        return ExitCode::from(1);
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    match rt.block_on(run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Update failed: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let lookup = PublicIpLookup::new(provider_or_default(&config.ip_provider))?;

    let mut client = UpdateClient::new(&config.server_url)?;
    match (config.username, config.password) {
        (Some(username), Some(password)) => client = client.with_basic_auth(username, password),
        (None, None) => {}
        _ => warn!("Only one of DYNDNS_USERNAME and DYNDNS_PASSWORD is set, sending no credentials"),
    }

    let (v4, v6) = tokio::join!(
        lookup_family(&lookup, AddressFamily::V4),
        lookup_family(&lookup, AddressFamily::V6),
    );

    let envelope = client.update(v4, v6).await?;

    report(&envelope.name, &envelope.v4);
    report(&envelope.name, &envelope.v6);
    Ok(())
}

/// A failed lookup is logged and the family is sent empty
async fn lookup_family(lookup: &PublicIpLookup, family: AddressFamily) -> Option<IpAddr> {
    match lookup.lookup(family).await {
        Ok(address) => {
            info!(provider = lookup.provider().name, ?family, %address, "Public address found");
            Some(address)
        }
        Err(e) => {
            warn!(provider = lookup.provider().name, ?family, error = %e, "Public address lookup failed");
            None
        }
    }
}

fn report(domain: &str, outcome: &RecordOutcome) {
    let rr_type = outcome.record_type.as_str();
    match outcome.outcome {
        Outcome::Created => info!(rr_type, domain, ip = %outcome.value, "Record created"),
        Outcome::Updated => info!(rr_type, domain, ip = %outcome.value, "Record updated"),
        Outcome::Failed => error!(
            rr_type,
            domain,
            ip = %outcome.value,
            error = outcome.error.as_deref().unwrap_or_default(),
            "Record update failed"
        ),
        Outcome::Skipped => info!(
            rr_type,
            domain,
            reason = outcome.error.as_deref().unwrap_or_default(),
            "Record skipped"
        ),
    }
}
