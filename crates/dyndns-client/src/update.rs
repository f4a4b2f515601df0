//! Calls the daemon's `/dyn` endpoint

use dyndns_core::{Error, Result, UpdateEnvelope};
use reqwest::StatusCode;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

const UPDATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Submits addresses to a DynDNS server
pub struct UpdateClient {
    server_url: String,
    credentials: Option<(String, String)>,
    client: reqwest::Client,
}

impl UpdateClient {
    /// Create a client for the server at `server_url` (scheme, host, port)
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        let server_url = server_url.into();
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(Error::config(format!(
                "Server URL must use HTTP or HTTPS scheme. Got: {}",
                server_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(UPDATE_TIMEOUT)
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            server_url,
            credentials: None,
            client,
        })
    }

    /// Send HTTP Basic credentials with every update
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    fn dyn_url(&self) -> String {
        format!("{}/dyn", self.server_url.trim_end_matches('/'))
    }

    /// Submit both addresses; a family that is `None` is sent empty
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateEnvelope)`: The server's per-family results
    /// - `Err(Error::Authentication)`: If the server answered 401
    /// - `Err(Error::Http)`: On transport failure, any other non-2xx status,
    ///   or an undecodable body
    pub async fn update(&self, v4: Option<IpAddr>, v6: Option<IpAddr>) -> Result<UpdateEnvelope> {
        let url = self.dyn_url();
        debug!(url = %url, ?v4, ?v6, "Submitting addresses");

        let mut request = self.client.get(&url).query(&update_query(v4, v6));
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", url, e)))?;

        check_status(response.status())?;

        response
            .json::<UpdateEnvelope>()
            .await
            .map_err(|e| Error::http(format!("Failed to decode update envelope: {}", e)))
    }
}

impl std::fmt::Debug for UpdateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateClient")
            .field("server_url", &self.server_url)
            .field(
                "username",
                &self.credentials.as_ref().map(|(username, _)| username),
            )
            .finish()
    }
}

fn update_query(v4: Option<IpAddr>, v6: Option<IpAddr>) -> [(&'static str, String); 2] {
    let render = |address: Option<IpAddr>| address.map(|a| a.to_string()).unwrap_or_default();
    [("ip_address", render(v4)), ("ipv6_address", render(v6))]
}

fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(Error::auth("server rejected the credentials")),
        StatusCode::INTERNAL_SERVER_ERROR => Err(Error::http("server reported an internal error")),
        other => Err(Error::http(format!("unexpected HTTP status {}", other))),
    }
}
