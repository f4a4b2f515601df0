// # dyndns-client
//
// Client side of the DynDNS system.
//
// ## Purpose
//
// - **lookup**: asks a public "what is my IP" service for this host's IPv4
//   and IPv6 address
// - **update**: submits those addresses to the daemon's `/dyn` endpoint and
//   decodes the update envelope
//
// The daemon does all classification and record handling; this crate only
// transports addresses and results.

pub mod lookup;
pub mod update;

pub use lookup::{DEFAULT_PROVIDER, IpProvider, PROVIDERS, PublicIpLookup, provider};
pub use update::UpdateClient;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("dyndns-client/", env!("CARGO_PKG_VERSION"));
