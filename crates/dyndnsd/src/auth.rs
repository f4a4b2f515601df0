//! HTTP Basic authentication for the update endpoint

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tracing::warn;

/// Expected `username:password` pair
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl BasicCredentials {
    /// Parse a `username:password` string
    ///
    /// The password may contain ':'; the username may not.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let (username, password) = raw
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("DYNDNS_AUTH must have the form username:password"))?;

        if username.is_empty() || password.is_empty() {
            anyhow::bail!("DYNDNS_AUTH username and password cannot be empty");
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check an `Authorization` header value
    pub fn matches_header(&self, value: &str) -> bool {
        let Some(encoded) = value
            .strip_prefix("Basic ")
            .or_else(|| value.strip_prefix("basic "))
        else {
            return false;
        };

        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };

        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };

        match decoded.split_once(':') {
            Some((username, password)) => {
                username == self.username && password == self.password
            }
            None => false,
        }
    }

    /// Header value a client would send for these credentials
    pub fn to_header_value(&self) -> String {
        format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", self.username, self.password))
        )
    }
}

// Keeps the password out of logs
impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Middleware rejecting requests without matching Basic credentials
pub async fn require_basic_auth(
    State(credentials): State<Arc<BasicCredentials>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| credentials.matches_header(value));

    if authorized {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Rejected request with missing or invalid credentials");

    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"dyndns\""),
    );
    response
}
