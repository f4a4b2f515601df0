//! Startup credential self-test
//!
//! Exercises the backend end-to-end once before any request is served:
//! read the zone, create a throwaway record, delete it. Any failing step is
//! fatal; the caller must not start serving.

use crate::config::DyndnsConfig;
use crate::error::{Result, SelfTestStep};
use crate::traits::{RecordSet, RecordType, ZoneBackend};
use tracing::{debug, info};

/// Label prefix of the sentinel record
pub const SENTINEL_RECORD_PREFIX: &str = "_dyndns_credential_validation_record";

/// Value written to the sentinel record
pub const SENTINEL_VALUE: &str = "127.255.255.254";

/// TTL of the sentinel record
pub const SENTINEL_TTL: u32 = 300;

/// Name of the sentinel record for a given timestamp
pub fn sentinel_name(domain_name: &str, unix_seconds: i64) -> String {
    format!("{}.{}.{}", SENTINEL_RECORD_PREFIX, unix_seconds, domain_name)
}

/// Verify read, write and delete access to the zone
///
/// # Returns
///
/// - `Ok(())`: All three steps succeeded and the sentinel record is gone
/// - `Err(Error::SelfTest)`: Names the step that failed
pub async fn self_test(backend: &dyn ZoneBackend, config: &DyndnsConfig) -> Result<()> {
    let zone = backend
        .describe_zone()
        .await
        .map_err(|e| crate::Error::self_test(SelfTestStep::Read, format!("failed to get managed zone: {}", e)))?;
    debug!(zone = %zone.name, dns_name = %zone.dns_name, "Zone readable");

    let name = sentinel_name(&config.domain_name, chrono::Utc::now().timestamp());
    let sentinel = RecordSet::single(name.as_str(), RecordType::A, SENTINEL_TTL, SENTINEL_VALUE);

    backend.create(&sentinel).await.map_err(|e| {
        crate::Error::self_test(
            SelfTestStep::Write,
            format!("failed to create resource record set: {}", e),
        )
    })?;
    debug!(name = %name, "Sentinel record created");

    backend.delete(&name, RecordType::A).await.map_err(|e| {
        crate::Error::self_test(
            SelfTestStep::Cleanup,
            format!("failed to delete resource record set: {}", e),
        )
    })?;

    info!(
        backend = backend.backend_name(),
        zone = %zone.name,
        "Credentials validated successfully"
    );
    Ok(())
}
