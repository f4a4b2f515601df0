//! Per-family outcomes and the per-request update envelope
//!
//! Wire shape of one family's result:
//!
//! ```json
//! {"rr_type":"A","success":true,"created":true,"updated":false,"value":"8.8.8.8"}
//! ```
//!
//! `error` is omitted when there is none, never emitted as `null`.

use crate::traits::RecordType;
use serde::{Deserialize, Serialize};

/// What happened to one family's record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Record did not exist and was created
    Created,
    /// Record existed and was replaced
    Updated,
    /// Backend call failed or acknowledged a different value
    Failed,
    /// No backend call was made
    Skipped,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Created | Outcome::Updated)
    }
}

/// Result of publishing one family's record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireRecordResult", try_from = "WireRecordResult")]
pub struct RecordOutcome {
    /// Record name; cleared once the outcome is placed in an envelope
    pub name: Option<String>,
    pub record_type: RecordType,
    /// Address that was (attempted to be) published, empty if none
    pub value: String,
    pub outcome: Outcome,
    /// Present iff the outcome is `Failed` or `Skipped`
    pub error: Option<String>,
}

impl RecordOutcome {
    pub fn created(name: &str, record_type: RecordType, value: impl Into<String>) -> Self {
        Self::success(name, record_type, value, Outcome::Created)
    }

    pub fn updated(name: &str, record_type: RecordType, value: impl Into<String>) -> Self {
        Self::success(name, record_type, value, Outcome::Updated)
    }

    pub fn failed(
        name: &str,
        record_type: RecordType,
        value: impl Into<String>,
        error: impl ToString,
    ) -> Self {
        Self {
            name: Some(name.to_string()),
            record_type,
            value: value.into(),
            outcome: Outcome::Failed,
            error: Some(error.to_string()),
        }
    }

    pub fn skipped(name: &str, record_type: RecordType, error: impl Into<String>) -> Self {
        Self {
            name: Some(name.to_string()),
            record_type,
            value: String::new(),
            outcome: Outcome::Skipped,
            error: Some(error.into()),
        }
    }

    fn success(name: &str, record_type: RecordType, value: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: Some(name.to_string()),
            record_type,
            value: value.into(),
            outcome,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Serialized form of [`RecordOutcome`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireRecordResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    rr_type: RecordType,
    success: bool,
    created: bool,
    updated: bool,
    #[serde(default)]
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<RecordOutcome> for WireRecordResult {
    fn from(outcome: RecordOutcome) -> Self {
        Self {
            name: outcome.name,
            rr_type: outcome.record_type,
            success: outcome.outcome.is_success(),
            created: outcome.outcome == Outcome::Created,
            updated: outcome.outcome == Outcome::Updated,
            value: outcome.value,
            error: outcome.error.filter(|e| !e.is_empty()),
        }
    }
}

impl TryFrom<WireRecordResult> for RecordOutcome {
    type Error = String;

    fn try_from(wire: WireRecordResult) -> Result<Self, Self::Error> {
        let outcome = match (wire.success, wire.created, wire.updated) {
            (true, true, false) => Outcome::Created,
            (true, false, true) => Outcome::Updated,
            (false, false, false) if wire.value.is_empty() => Outcome::Skipped,
            (false, false, false) => Outcome::Failed,
            (success, created, updated) => {
                return Err(format!(
                    "inconsistent result flags: success={} created={} updated={}",
                    success, created, updated
                ));
            }
        };

        Ok(Self {
            name: wire.name,
            record_type: wire.rr_type,
            value: wire.value,
            outcome,
            error: wire.error,
        })
    }
}

/// Aggregate result of one update request
///
/// Built fresh per request and discarded after it is returned. There is no
/// overall status: each family must be inspected on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEnvelope {
    /// Domain the records belong to
    pub name: String,
    pub v4: RecordOutcome,
    pub v6: RecordOutcome,
}

impl UpdateEnvelope {
    /// Merge two independent outcomes under one domain name
    ///
    /// Per-outcome names are cleared; the name lives at the top level.
    pub fn assemble(name: impl Into<String>, mut v4: RecordOutcome, mut v6: RecordOutcome) -> Self {
        v4.name = None;
        v6.name = None;
        Self {
            name: name.into(),
            v4,
            v6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_created_wire_shape() {
        let outcome = RecordOutcome::created("home.example.com.", RecordType::A, "8.8.8.8");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "home.example.com.",
                "rr_type": "A",
                "success": true,
                "created": true,
                "updated": false,
                "value": "8.8.8.8",
            })
        );
    }

    #[test]
    fn test_error_omitted_not_null() {
        let outcome = RecordOutcome::updated("home.example.com.", RecordType::Aaaa, "2606:4700::1");
        let text = serde_json::to_string(&outcome).unwrap();
        assert!(!text.contains("error"));
        assert!(!text.contains("null"));
    }

    #[test]
    fn test_skipped_wire_shape() {
        let outcome = RecordOutcome::skipped("home.example.com.", RecordType::A, "loopback");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["created"], json!(false));
        assert_eq!(value["updated"], json!(false));
        assert_eq!(value["value"], json!(""));
        assert_eq!(value["error"], json!("loopback"));
    }

    #[test]
    fn test_envelope_clears_inner_names() {
        let envelope = UpdateEnvelope::assemble(
            "home.example.com.",
            RecordOutcome::created("home.example.com.", RecordType::A, "8.8.8.8"),
            RecordOutcome::skipped("home.example.com.", RecordType::Aaaa, "no address provided"),
        );

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["name"], json!("home.example.com."));
        assert!(value["v4"].get("name").is_none());
        assert!(value["v6"].get("name").is_none());
        assert_eq!(value["v4"]["rr_type"], json!("A"));
        assert_eq!(value["v6"]["rr_type"], json!("AAAA"));
    }

    #[test]
    fn test_envelope_decodes_from_wire() {
        let body = json!({
            "name": "home.example.com.",
            "v4": {"rr_type": "A", "success": false, "created": false, "updated": false,
                   "value": "8.8.8.8", "error": "Zone backend error: unavailable"},
            "v6": {"rr_type": "AAAA", "success": true, "created": false, "updated": true,
                   "value": "2606:4700::1"},
        });

        let envelope: UpdateEnvelope = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.v4.outcome, Outcome::Failed);
        assert_eq!(envelope.v6.outcome, Outcome::Updated);
        assert_eq!(envelope.v6.error, None);
    }

    #[test]
    fn test_inconsistent_flags_rejected() {
        let body = json!({"rr_type": "A", "success": true, "created": true, "updated": true, "value": "8.8.8.8"});
        assert!(serde_json::from_value::<RecordOutcome>(body).is_err());
    }
}
