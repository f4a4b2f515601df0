//! Record reconciliation
//!
//! The Reconciler turns an accepted address into a create-or-patch against
//! the zone and reports one outcome per family.
//!
//! ## Flow
//!
//! ```text
//!  raw v4 ──► classify ──► Verdict ──► reconcile(A)    ──┐
//!                                                         ├──► UpdateEnvelope
//!  raw v6 ──► classify ──► Verdict ──► reconcile(AAAA) ──┘
//! ```
//!
//! For an accepted address:
//!
//! 1. `get(name, type)` on the backend
//! 2. not found → `create`, found → `patch` (TTL is always [`RECORD_TTL`])
//! 3. the acknowledged record data must be exactly the submitted value,
//!    otherwise the outcome is `failed` with a verification mismatch
//!
//! Rejected verdicts never reach the backend. Families are independent:
//! there is no cross-family transaction and no retry at this layer.

use crate::address::{AddressFamily, RejectReason, Verdict, classify_optional};
use crate::config::{DyndnsConfig, RECORD_TTL};
use crate::envelope::{RecordOutcome, UpdateEnvelope};
use crate::error::{Error, Result};
use crate::traits::{RecordSet, RecordType, ZoneBackend};
use std::sync::Arc;
use tracing::debug;

/// Error reported for a family that was not submitted at all
pub const NO_ADDRESS_PROVIDED: &str = "no address provided";

/// Which backend write was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Create,
    Patch,
}

/// Publishes validated addresses into the managed zone
///
/// Holds no per-request state. One instance is shared by all requests;
/// concurrency safety is delegated to the backend.
#[derive(Clone)]
pub struct Reconciler {
    backend: Arc<dyn ZoneBackend>,
    config: Arc<DyndnsConfig>,
}

impl Reconciler {
    /// Create a reconciler for the configured domain
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)`: If the configuration is invalid
    pub fn new(backend: Arc<dyn ZoneBackend>, config: Arc<DyndnsConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// The FQDN this reconciler keeps in sync
    pub fn domain_name(&self) -> &str {
        &self.config.domain_name
    }

    /// Run the startup self-test against this reconciler's backend
    pub async fn self_test(&self) -> Result<()> {
        crate::selftest::self_test(self.backend.as_ref(), &self.config).await
    }

    /// Classify both submitted addresses, publish the accepted ones and
    /// merge the two outcomes
    ///
    /// `None` means the family was not submitted. Both families run
    /// concurrently and never affect each other's outcome.
    pub async fn update(&self, v4: Option<&str>, v6: Option<&str>) -> UpdateEnvelope {
        let v4_verdict = classify_optional(v4, AddressFamily::V4);
        let v6_verdict = classify_optional(v6, AddressFamily::V6);
        let name = self.domain_name();

        let (v4_outcome, v6_outcome) = tokio::join!(
            self.reconcile(name, RecordType::A, &v4_verdict),
            self.reconcile(name, RecordType::Aaaa, &v6_verdict),
        );

        UpdateEnvelope::assemble(name, v4_outcome, v6_outcome)
    }

    /// Publish one family's verdict as a record of `record_type` under `name`
    ///
    /// Never returns an error: every failure is folded into the outcome.
    pub async fn reconcile(
        &self,
        name: &str,
        record_type: RecordType,
        verdict: &Verdict,
    ) -> RecordOutcome {
        let address = match verdict {
            Verdict::Accepted(address) => *address,
            Verdict::Rejected(reason) => {
                debug!(%record_type, name, reason = %reason, "Skipping record, address rejected");
                return RecordOutcome::skipped(name, record_type, skip_message(*reason));
            }
        };

        if AddressFamily::of(&address) != AddressFamily::from(record_type) {
            debug!(%record_type, name, %address, "Skipping record, address family does not match");
            return RecordOutcome::skipped(
                name,
                record_type,
                RejectReason::WrongFamily.as_str(),
            );
        }

        let value = address.to_string();

        match self.publish(name, record_type, &value).await {
            Ok(WriteKind::Create) => {
                debug!(%record_type, name, %value, "DNS record created");
                RecordOutcome::created(name, record_type, value)
            }
            Ok(WriteKind::Patch) => {
                debug!(%record_type, name, %value, "DNS record updated");
                RecordOutcome::updated(name, record_type, value)
            }
            Err(e) => {
                debug!(%record_type, name, %value, error = %e, "Failed to publish DNS record");
                RecordOutcome::failed(name, record_type, value, e)
            }
        }
    }

    /// Create or patch the record and verify the acknowledged value
    async fn publish(&self, name: &str, record_type: RecordType, value: &str) -> Result<WriteKind> {
        let existing = self.backend.get(name, record_type).await.map_err(|e| {
            Error::backend(format!("failed to look up resource record set: {}", e))
        })?;

        let record = RecordSet::single(name, record_type, RECORD_TTL, value);

        let (kind, acknowledged) = match existing {
            None => {
                debug!(%record_type, name, backend = self.backend.backend_name(), "Record not found, creating");
                let acknowledged = self.backend.create(&record).await.map_err(|e| {
                    Error::backend(format!("failed to create resource record set: {}", e))
                })?;
                (WriteKind::Create, acknowledged)
            }
            Some(_) => {
                debug!(%record_type, name, backend = self.backend.backend_name(), "Record exists, patching");
                let acknowledged = self.backend.patch(&record).await.map_err(|e| {
                    Error::backend(format!("failed to patch resource record set: {}", e))
                })?;
                (WriteKind::Patch, acknowledged)
            }
        };

        if acknowledged.rrdatas.len() == 1 && acknowledged.rrdatas[0] == value {
            Ok(kind)
        } else {
            Err(Error::verification(
                record_type,
                value,
                acknowledged.rrdatas.join(","),
            ))
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("backend", &self.backend.backend_name())
            .field("config", &self.config)
            .finish()
    }
}

/// Error text for a skipped family
fn skip_message(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::Missing => NO_ADDRESS_PROVIDED,
        other => other.as_str(),
    }
}
