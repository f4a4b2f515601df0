// # Memory Zone Backend
//
// In-memory implementation of ZoneBackend.
//
// ## Purpose
//
// Holds record sets in a HashMap for the lifetime of the process. Used by
// the daemon when no remote backend is configured and by tests that need a
// zone without network access.
//
// ## Crash Behavior
//
// - All records are lost on restart
// - The first update after a restart is reported as `created`

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::ZoneConfig;
use crate::traits::zone_backend::{RecordSet, RecordType, ZoneBackend, ZoneInfo};

type RecordKey = (String, RecordType);

/// In-memory zone backend
///
/// Records are stored verbatim, so the acknowledged value always equals the
/// submitted one. Clones share the same records.
///
/// # Example
///
/// ```rust,no_run
/// use dyndns_core::backend::MemoryZone;
/// use dyndns_core::config::ZoneConfig;
/// use dyndns_core::traits::{RecordSet, RecordType, ZoneBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let zone = MemoryZone::new(&ZoneConfig::new("project", "zone"), "example.com.");
///
///     let record = RecordSet::single("home.example.com.", RecordType::A, 1, "8.8.8.8");
///     zone.create(&record).await?;
///
///     let stored = zone.get("home.example.com.", RecordType::A).await?;
///     assert_eq!(stored, Some(record));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryZone {
    info: ZoneInfo,
    records: Arc<RwLock<HashMap<RecordKey, RecordSet>>>,
}

impl MemoryZone {
    /// Create an empty zone serving `dns_name`
    pub fn new(zone: &ZoneConfig, dns_name: impl Into<String>) -> Self {
        Self {
            info: ZoneInfo {
                name: zone.zone_name.clone(),
                dns_name: dns_name.into(),
            },
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of record sets in the zone
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the zone holds no record sets
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Names and types of all record sets
    pub async fn list(&self) -> Vec<RecordKey> {
        self.records.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ZoneBackend for MemoryZone {
    async fn describe_zone(&self) -> Result<ZoneInfo, Error> {
        Ok(self.info.clone())
    }

    async fn get(&self, name: &str, record_type: RecordType) -> Result<Option<RecordSet>, Error> {
        let guard = self.records.read().await;
        Ok(guard.get(&(name.to_string(), record_type)).cloned())
    }

    async fn create(&self, record: &RecordSet) -> Result<RecordSet, Error> {
        let mut guard = self.records.write().await;
        let key = (record.name.clone(), record.record_type);

        if guard.contains_key(&key) {
            return Err(Error::conflict(format!(
                "record set already exists: {} ({})",
                record.name, record.record_type
            )));
        }

        guard.insert(key, record.clone());
        Ok(record.clone())
    }

    async fn patch(&self, record: &RecordSet) -> Result<RecordSet, Error> {
        let mut guard = self.records.write().await;

        match guard.get_mut(&(record.name.clone(), record.record_type)) {
            Some(existing) => {
                existing.ttl = record.ttl;
                existing.rrdatas = record.rrdatas.clone();
                Ok(existing.clone())
            }
            None => Err(Error::not_found(format!(
                "record set not found: {} ({})",
                record.name, record.record_type
            ))),
        }
    }

    async fn delete(&self, name: &str, record_type: RecordType) -> Result<(), Error> {
        let mut guard = self.records.write().await;

        match guard.remove(&(name.to_string(), record_type)) {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!(
                "record set not found: {} ({})",
                name, record_type
            ))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
