// # Zone Backend Trait
//
// Defines the capability the reconciler needs from a managed DNS zone.
//
// ## Implementations
//
// - In-memory: `crate::backend::MemoryZone`
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::traits::{RecordSet, RecordType, ZoneBackend};
//
// async fn publish(zone: &dyn ZoneBackend) -> dyndns_core::Result<()> {
//     let record = RecordSet::single("home.example.com.", RecordType::A, 1, "8.8.8.8");
//     match zone.get("home.example.com.", RecordType::A).await? {
//         None => zone.create(&record).await?,
//         Some(_) => zone.patch(&record).await?,
//     };
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// DNS record type managed by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    #[serde(rename = "A")]
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type ("A" or "AAAA")
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(crate::Error::invalid_input(format!(
                "unsupported record type: {}",
                other
            ))),
        }
    }
}

/// A resource record set in the zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Fully qualified record name (with trailing dot)
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Record data, one entry per value
    pub rrdatas: Vec<String>,
}

impl RecordSet {
    /// Build a record set carrying a single value
    pub fn single(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: u32,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            ttl,
            rrdatas: vec![value.into()],
        }
    }

    /// First value of the record set, if any
    pub fn first_value(&self) -> Option<&str> {
        self.rrdatas.first().map(String::as_str)
    }
}

/// Metadata about the managed zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// Zone identifier
    pub name: String,
    /// DNS name the zone serves (e.g. "example.com.")
    pub dns_name: String,
}

/// Capability over one managed DNS zone
///
/// Every operation is scoped to the zone the backend was constructed for.
///
/// # Thread Safety
///
/// Implementations are shared across concurrent requests and must be usable
/// from many tasks at once. Reconciliations for different names or record
/// types never conflict.
///
/// # Retries
///
/// Implementations decide their own retry and deadline policy. The reconciler
/// makes exactly one call per step and reports a failure immediately.
#[async_trait]
pub trait ZoneBackend: Send + Sync {
    /// Read the zone's metadata
    async fn describe_zone(&self) -> Result<ZoneInfo, crate::Error>;

    /// Look up a record set
    ///
    /// # Returns
    ///
    /// - `Ok(Some(RecordSet))`: The record exists
    /// - `Ok(None)`: No record with this name and type
    /// - `Err(Error)`: The lookup itself failed
    async fn get(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<RecordSet>, crate::Error>;

    /// Create a record set, returning the record as acknowledged by the backend
    async fn create(&self, record: &RecordSet) -> Result<RecordSet, crate::Error>;

    /// Replace an existing record set's data and TTL, returning the
    /// record as acknowledged by the backend
    async fn patch(&self, record: &RecordSet) -> Result<RecordSet, crate::Error>;

    /// Delete a record set
    async fn delete(&self, name: &str, record_type: RecordType) -> Result<(), crate::Error>;

    /// Backend name (for logging)
    fn backend_name(&self) -> &'static str;
}
