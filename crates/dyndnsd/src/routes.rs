//! HTTP routes of the daemon
//!
//! - `GET /`: banner, never authenticated
//! - `GET /dyn?ip_address=<v4>&ipv6_address=<v6>`: publish the submitted
//!   addresses and return the update envelope
//!
//! `/dyn` always answers `200`: per-family success or failure lives in the
//! envelope, not in the status code.

use crate::auth::{BasicCredentials, require_basic_auth};
use axum::{
    Json, Router,
    extract::{ConnectInfo, Query, State},
    http::HeaderMap,
    middleware,
    routing::get,
};
use dyndns_core::reconciler::NO_ADDRESS_PROVIDED;
use dyndns_core::{Outcome, RecordOutcome, Reconciler, UpdateEnvelope};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Text served on `/`
pub const BANNER: &str = "Simple DynDNS Server";

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Reconciler,
}

/// Query parameters of `/dyn`
#[derive(Debug, Default, Deserialize)]
pub struct DynParams {
    pub ip_address: Option<String>,
    pub ipv6_address: Option<String>,
}

/// Build the router; `/dyn` is guarded when credentials are given
pub fn build_router(reconciler: Reconciler, credentials: Option<BasicCredentials>) -> Router {
    let mut protected = Router::new().route("/dyn", get(dyn_update));

    if let Some(credentials) = credentials {
        protected = protected.route_layer(middleware::from_fn_with_state(
            Arc::new(credentials),
            require_basic_auth,
        ));
    }

    Router::new()
        .route("/", get(index))
        .merge(protected)
        .with_state(AppState { reconciler })
}

async fn index() -> &'static str {
    BANNER
}

async fn dyn_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Query(params): Query<DynParams>,
) -> Json<UpdateEnvelope> {
    let from = client_address(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    let envelope = state
        .reconciler
        .update(params.ip_address.as_deref(), params.ipv6_address.as_deref())
        .await;

    log_outcome(&from, &envelope.name, &envelope.v4);
    log_outcome(&from, &envelope.name, &envelope.v6);

    Json(envelope)
}

/// Caller address for logging
///
/// First `X-Forwarded-For` entry, then the socket peer, then `-`.
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match (forwarded, peer) {
        (Some(forwarded), _) => forwarded.to_string(),
        (None, Some(peer)) => peer.ip().to_string(),
        (None, None) => "-".to_string(),
    }
}

fn log_outcome(from: &str, domain: &str, outcome: &RecordOutcome) {
    let rr_type = outcome.record_type.as_str();
    let error = outcome.error.as_deref().unwrap_or_default();

    match outcome.outcome {
        Outcome::Created => {
            info!(rr_type, from, domain, ip = %outcome.value, "DNS record created");
        }
        Outcome::Updated => {
            info!(rr_type, from, domain, ip = %outcome.value, "DNS record updated");
        }
        Outcome::Failed => {
            error!(rr_type, from, domain, ip = %outcome.value, error, "DNS record update failed");
        }
        Outcome::Skipped if error == NO_ADDRESS_PROVIDED => {
            debug!(rr_type, from, domain, "No address provided");
        }
        Outcome::Skipped => {
            warn!(rr_type, from, domain, reason = error, "Address rejected");
        }
    }
}
