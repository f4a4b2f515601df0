//! Public IP lookup
//!
//! Each provider exposes one plain-text endpoint per address family that
//! answers with the caller's address.

use dyndns_core::{AddressFamily, Error, Result};
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout of one lookup request
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Name of the provider used when none (or an unknown one) is configured
pub const DEFAULT_PROVIDER: &str = "icanhazipcom";

/// A "what is my IP" service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpProvider {
    pub name: &'static str,
    pub ipv4_url: &'static str,
    pub ipv6_url: &'static str,
}

impl IpProvider {
    /// Endpoint answering with the address of `family`
    pub fn url(&self, family: AddressFamily) -> &'static str {
        match family {
            AddressFamily::V4 => self.ipv4_url,
            AddressFamily::V6 => self.ipv6_url,
        }
    }
}

/// Known providers
pub const PROVIDERS: &[IpProvider] = &[
    IpProvider {
        name: "icanhazipcom",
        ipv4_url: "https://ipv4.icanhazip.com/",
        ipv6_url: "https://ipv6.icanhazip.com/",
    },
    IpProvider {
        name: "ipifyorg",
        ipv4_url: "https://api.ipify.org/",
        ipv6_url: "https://api6.ipify.org/",
    },
    IpProvider {
        name: "ifconfigme",
        ipv4_url: "https://ipv4.ifconfig.me/",
        ipv6_url: "https://ipv6.ifconfig.me/",
    },
    IpProvider {
        name: "ipsb",
        ipv4_url: "https://api-ipv4.ip.sb/ip",
        ipv6_url: "https://api-ipv6.ip.sb/ip",
    },
    IpProvider {
        name: "identme",
        ipv4_url: "https://v4.ident.me/",
        ipv6_url: "https://v6.ident.me/",
    },
];

/// Look up a provider by name
pub fn provider(name: &str) -> Option<&'static IpProvider> {
    PROVIDERS.iter().find(|provider| provider.name == name)
}

/// Look up a provider by name, falling back to [`DEFAULT_PROVIDER`]
pub fn provider_or_default(name: &str) -> &'static IpProvider {
    if let Some(found) = provider(name) {
        return found;
    }

    let available: Vec<&str> = PROVIDERS.iter().map(|provider| provider.name).collect();
    warn!(
        requested = name,
        fallback = DEFAULT_PROVIDER,
        available = ?available,
        "Unknown IP provider, using default"
    );
    &PROVIDERS[0]
}

/// Fetches this host's public addresses from one provider
pub struct PublicIpLookup {
    provider: &'static IpProvider,
    client: reqwest::Client,
}

impl PublicIpLookup {
    pub fn new(provider: &'static IpProvider) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { provider, client })
    }

    pub fn provider(&self) -> &'static IpProvider {
        self.provider
    }

    /// Fetch the public address of `family`
    ///
    /// # Returns
    ///
    /// - `Err(Error::Http)`: If the request fails or answers with a non-2xx status
    /// - `Err(Error::InvalidInput)`: If the body is not an address of `family`
    pub async fn lookup(&self, family: AddressFamily) -> Result<IpAddr> {
        let url = self.provider.url(family);
        debug!(provider = self.provider.name, url, ?family, "Looking up public address");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} answered with HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response from {}: {}", url, e)))?;

        parse_ip_body(&body, family)
    }
}

/// Parse a provider's plain-text answer
pub fn parse_ip_body(body: &str, family: AddressFamily) -> Result<IpAddr> {
    let text = body.trim();

    let address: IpAddr = text
        .parse()
        .map_err(|_| Error::invalid_input(format!("Invalid IP address: {:?}", text)))?;

    if AddressFamily::of(&address) != family {
        return Err(Error::invalid_input(format!(
            "Expected {:?} address, got: {}",
            family, address
        )));
    }

    Ok(address)
}
