//! Configuration types for the DynDNS system
//!
//! Built once at startup, validated, then shared read-only with the
//! reconciler. Nothing here is mutated while serving requests.

use serde::{Deserialize, Serialize};

/// TTL of every published A/AAAA record, in seconds
pub const RECORD_TTL: u32 = 1;

/// Main DynDNS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DyndnsConfig {
    /// Managed zone the records live in
    pub zone: ZoneConfig,

    /// Fully qualified domain name kept in sync (always ends with '.')
    pub domain_name: String,
}

impl DyndnsConfig {
    /// Create a configuration, normalizing the domain name to an FQDN
    pub fn new(zone: ZoneConfig, domain_name: impl Into<String>) -> Self {
        Self {
            zone,
            domain_name: to_fqdn(domain_name.into()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.zone.validate()?;
        validate_domain_name(&self.domain_name)
    }
}

/// Managed zone coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Project owning the zone
    pub project_id: String,

    /// Zone identifier within the project
    pub zone_name: String,
}

impl ZoneConfig {
    pub fn new(project_id: impl Into<String>, zone_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            zone_name: zone_name.into(),
        }
    }

    /// Validate the zone configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.project_id.trim().is_empty() {
            return Err(crate::Error::config("Project ID cannot be empty"));
        }
        if self.zone_name.trim().is_empty() {
            return Err(crate::Error::config("DNS zone name cannot be empty"));
        }
        Ok(())
    }
}

/// Append the root label if the name does not already end with one
pub fn to_fqdn(domain: String) -> String {
    if domain.is_empty() || domain.ends_with('.') {
        domain
    } else {
        tracing::info!("Appending '.' to domain name to get FQDN: {}.", domain);
        format!("{}.", domain)
    }
}

/// Validate that a string is a valid fully qualified domain name
///
/// Basic RFC 1035 checks: total length, label length, label characters and
/// hyphen placement. The trailing root label is allowed.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    let name = domain.strip_suffix('.').unwrap_or(domain);

    if name.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if name.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            name.len(),
            name
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}
