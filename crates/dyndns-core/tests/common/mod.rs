//! Test doubles and common utilities for reconciliation contract tests
//!
//! `MockZone` wraps a real `MemoryZone` and can be told to fail or to
//! misreport individual operations, while counting every call it receives.

#![allow(dead_code)]

use dyndns_core::error::Result;
use dyndns_core::traits::{RecordSet, RecordType, ZoneBackend, ZoneInfo};
use dyndns_core::{DyndnsConfig, Error, MemoryZone, Reconciler, ZoneConfig};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const DOMAIN: &str = "home.example.com.";

/// Operations a `MockZone` can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Describe,
    Get,
    Create,
    Patch,
    Delete,
}

/// A zone backend that counts calls and injects failures
#[derive(Clone)]
pub struct MockZone {
    inner: MemoryZone,
    calls: Arc<AtomicUsize>,
    log: Arc<Mutex<Vec<(Op, Option<RecordType>)>>>,
    failures: Arc<Mutex<Vec<(Op, Option<RecordType>)>>>,
    acknowledge_with: Arc<Mutex<Option<String>>>,
    acknowledge_extra: Arc<Mutex<Vec<String>>>,
}

impl MockZone {
    pub fn new() -> Self {
        Self {
            inner: MemoryZone::new(&zone_config(), "example.com."),
            calls: Arc::new(AtomicUsize::new(0)),
            log: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
            acknowledge_with: Arc::new(Mutex::new(None)),
            acknowledge_extra: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail `op` for every record type
    pub fn fail(&self, op: Op) {
        self.failures.lock().unwrap().push((op, None));
    }

    /// Fail `op` only for `record_type`
    pub fn fail_for(&self, op: Op, record_type: RecordType) {
        self.failures.lock().unwrap().push((op, Some(record_type)));
    }

    /// Store writes as submitted but acknowledge `value` instead
    pub fn acknowledge_with(&self, value: &str) {
        *self.acknowledge_with.lock().unwrap() = Some(value.to_string());
    }

    /// Store writes as submitted but append `value` to the acknowledgement
    pub fn acknowledge_extra(&self, value: &str) {
        self.acknowledge_extra.lock().unwrap().push(value.to_string());
    }

    /// Total number of backend calls
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls in the order they were received
    pub fn calls(&self) -> Vec<(Op, Option<RecordType>)> {
        self.log.lock().unwrap().clone()
    }

    /// The underlying zone, for inspecting stored records
    pub fn zone(&self) -> &MemoryZone {
        &self.inner
    }

    fn enter(&self, op: Op, record_type: Option<RecordType>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push((op, record_type));

        let fails = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .any(|(failing_op, failing_type)| {
                *failing_op == op && (failing_type.is_none() || *failing_type == record_type)
            });

        if fails {
            return Err(Error::backend(format!("injected {:?} failure", op)));
        }
        Ok(())
    }

    fn acknowledged(&self, mut record: RecordSet) -> RecordSet {
        if let Some(value) = self.acknowledge_with.lock().unwrap().clone() {
            record.rrdatas = vec![value];
        }
        record
            .rrdatas
            .extend(self.acknowledge_extra.lock().unwrap().iter().cloned());
        record
    }
}

#[async_trait::async_trait]
impl ZoneBackend for MockZone {
    async fn describe_zone(&self) -> Result<ZoneInfo> {
        self.enter(Op::Describe, None)?;
        self.inner.describe_zone().await
    }

    async fn get(&self, name: &str, record_type: RecordType) -> Result<Option<RecordSet>> {
        self.enter(Op::Get, Some(record_type))?;
        self.inner.get(name, record_type).await
    }

    async fn create(&self, record: &RecordSet) -> Result<RecordSet> {
        self.enter(Op::Create, Some(record.record_type))?;
        let stored = self.inner.create(record).await?;
        Ok(self.acknowledged(stored))
    }

    async fn patch(&self, record: &RecordSet) -> Result<RecordSet> {
        self.enter(Op::Patch, Some(record.record_type))?;
        let stored = self.inner.patch(record).await?;
        Ok(self.acknowledged(stored))
    }

    async fn delete(&self, name: &str, record_type: RecordType) -> Result<()> {
        self.enter(Op::Delete, Some(record_type))?;
        self.inner.delete(name, record_type).await
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

pub fn zone_config() -> ZoneConfig {
    ZoneConfig::new("test-project", "test-zone")
}

pub fn config() -> Arc<DyndnsConfig> {
    Arc::new(DyndnsConfig::new(zone_config(), DOMAIN))
}

/// A reconciler over a fresh `MockZone`, plus a handle to that zone
pub fn reconciler() -> (Reconciler, MockZone) {
    let zone = MockZone::new();
    let reconciler =
        Reconciler::new(Arc::new(zone.clone()), config()).expect("valid test config");
    (reconciler, zone)
}

/// Current value of a record in the mock zone
pub async fn stored_value(zone: &MockZone, record_type: RecordType) -> Option<String> {
    zone.zone()
        .get(DOMAIN, record_type)
        .await
        .unwrap()
        .and_then(|record| record.first_value().map(str::to_string))
}
