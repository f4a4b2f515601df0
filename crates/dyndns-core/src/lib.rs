// # dyndns-core
//
// Core library for the DynDNS server.
//
// ## Architecture Overview
//
// A client reports its public addresses; the server keeps one hostname's
// A and AAAA records in line with them.
//
// - **address**: Classifies a submitted address as publishable or rejected
// - **Reconciler**: Creates or patches the record and verifies the result
// - **ZoneBackend**: Trait for the managed DNS zone (get/create/patch/delete)
// - **UpdateEnvelope**: Per-request result with one outcome per family
// - **selftest**: Startup check of read, write and delete access
//
// ## Design Principles
//
// 1. **Independent families**: v4 and v6 never block or roll back each other
// 2. **No ambient state**: configuration is built once and passed explicitly
// 3. **Verified writes**: a write only counts if the backend echoes the value
// 4. **Library-First**: the daemon is a thin shell over this crate

pub mod address;
pub mod backend;
pub mod config;
pub mod envelope;
pub mod error;
pub mod reconciler;
pub mod selftest;
pub mod traits;

// Re-export core types for convenience
pub use address::{AddressFamily, RejectReason, Verdict, classify, classify_optional};
pub use backend::MemoryZone;
pub use config::{DyndnsConfig, RECORD_TTL, ZoneConfig};
pub use envelope::{Outcome, RecordOutcome, UpdateEnvelope};
pub use error::{Error, Result, SelfTestStep};
pub use reconciler::Reconciler;
pub use selftest::self_test;
pub use traits::{RecordSet, RecordType, ZoneBackend, ZoneInfo};
