//! Core traits for the DynDNS system
//!
//! - [`ZoneBackend`]: Read and write resource record sets in a managed zone

pub mod zone_backend;

pub use zone_backend::{RecordSet, RecordType, ZoneBackend, ZoneInfo};
