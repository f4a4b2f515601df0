//! Address classification
//!
//! Decides whether a submitted address may be published in the zone.
//! Checks run in a fixed order and the first failing check wins:
//!
//! 1. empty input → `missing`
//! 2. not an IP literal → `invalid`
//! 3. loopback → `loopback`
//! 4. unspecified → `unspecified`
//! 5. multicast (any scope) → `multicast`
//! 6. link-local unicast → `link-local`
//! 7. private use (RFC 1918 / RFC 4193) → `private`
//! 8. other family than requested → `wrong-family`
//! 9. reserved or unroutable → `reserved`
//!
//! IPv4-mapped IPv6 literals (`::ffff:a.b.c.d`) are treated as the IPv4
//! address they carry.

use crate::traits::RecordType;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Address family a submitted value is expected to belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4, published as an A record
    V4,
    /// IPv6, published as an AAAA record
    V6,
}

impl AddressFamily {
    /// Record type used to publish addresses of this family
    pub fn record_type(&self) -> RecordType {
        match self {
            AddressFamily::V4 => RecordType::A,
            AddressFamily::V6 => RecordType::Aaaa,
        }
    }

    /// Family of a parsed address
    pub fn of(address: &IpAddr) -> Self {
        match address {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }
}

impl From<RecordType> for AddressFamily {
    fn from(record_type: RecordType) -> Self {
        match record_type {
            RecordType::A => AddressFamily::V4,
            RecordType::Aaaa => AddressFamily::V6,
        }
    }
}

/// Why an address was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    Missing,
    Invalid,
    Loopback,
    Unspecified,
    Multicast,
    LinkLocal,
    Private,
    WrongFamily,
    Reserved,
}

impl RejectReason {
    /// Stable machine-readable reason
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Missing => "missing",
            RejectReason::Invalid => "invalid",
            RejectReason::Loopback => "loopback",
            RejectReason::Unspecified => "unspecified",
            RejectReason::Multicast => "multicast",
            RejectReason::LinkLocal => "link-local",
            RejectReason::Private => "private",
            RejectReason::WrongFamily => "wrong-family",
            RejectReason::Reserved => "reserved",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one submitted address
///
/// An accepted verdict always carries the canonical address and a rejected
/// one always carries a reason; there is no other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted(IpAddr),
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Verdict::Rejected(_))
    }

    /// The canonical address, present only when accepted
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            Verdict::Accepted(address) => Some(*address),
            Verdict::Rejected(_) => None,
        }
    }

    /// The rejection reason, present only when rejected
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Verdict::Accepted(_) => None,
            Verdict::Rejected(reason) => Some(*reason),
        }
    }
}

/// Classify a raw submitted string against the expected family
///
/// Pure function: no I/O, no shared state.
pub fn classify(raw: &str, family: AddressFamily) -> Verdict {
    if raw.is_empty() {
        return Verdict::Rejected(RejectReason::Missing);
    }

    let address = match raw.parse::<IpAddr>() {
        Ok(address) => address.to_canonical(),
        Err(_) => return Verdict::Rejected(RejectReason::Invalid),
    };

    match rejection(&address, family) {
        Some(reason) => Verdict::Rejected(reason),
        None => Verdict::Accepted(address),
    }
}

/// Classify an optional value; an absent value is `missing`
pub fn classify_optional(raw: Option<&str>, family: AddressFamily) -> Verdict {
    classify(raw.unwrap_or_default(), family)
}

fn rejection(address: &IpAddr, family: AddressFamily) -> Option<RejectReason> {
    if address.is_loopback() {
        return Some(RejectReason::Loopback);
    }
    if address.is_unspecified() {
        return Some(RejectReason::Unspecified);
    }
    if address.is_multicast() {
        return Some(RejectReason::Multicast);
    }
    if is_link_local_unicast(address) {
        return Some(RejectReason::LinkLocal);
    }
    if is_private(address) {
        return Some(RejectReason::Private);
    }
    if AddressFamily::of(address) != family {
        return Some(RejectReason::WrongFamily);
    }
    if is_reserved(address) {
        return Some(RejectReason::Reserved);
    }
    None
}

fn is_link_local_unicast(address: &IpAddr) -> bool {
    match address {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => V6_LINK_LOCAL.contains(v6),
    }
}

fn is_private(address: &IpAddr) -> bool {
    match address {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(v6) => V6_UNIQUE_LOCAL.contains(v6),
    }
}

fn is_reserved(address: &IpAddr) -> bool {
    match address {
        IpAddr::V4(v4) => V4_RESERVED.iter().any(|net| net.contains(v4)),
        IpAddr::V6(v6) => !V6_GLOBAL_UNICAST.contains(v6),
    }
}

/// IPv4 prefix
#[derive(Debug, Clone, Copy)]
struct V4Net {
    network: Ipv4Addr,
    prefix: u8,
}

impl V4Net {
    const fn new(network: Ipv4Addr, prefix: u8) -> Self {
        Self { network, prefix }
    }

    fn contains(&self, address: &Ipv4Addr) -> bool {
        let mask = u32::MAX.checked_shl(32 - u32::from(self.prefix)).unwrap_or(0);
        u32::from(*address) & mask == u32::from(self.network) & mask
    }
}

/// IPv6 prefix
#[derive(Debug, Clone, Copy)]
struct V6Net {
    network: Ipv6Addr,
    prefix: u8,
}

impl V6Net {
    const fn new(network: Ipv6Addr, prefix: u8) -> Self {
        Self { network, prefix }
    }

    fn contains(&self, address: &Ipv6Addr) -> bool {
        let mask = u128::MAX.checked_shl(128 - u32::from(self.prefix)).unwrap_or(0);
        u128::from(*address) & mask == u128::from(self.network) & mask
    }
}

/// Reserved and unroutable IPv4 ranges
const V4_RESERVED: &[V4Net] = &[
    // "This" network
    V4Net::new(Ipv4Addr::new(0, 0, 0, 0), 8),
    // Shared address space (carrier-grade NAT)
    V4Net::new(Ipv4Addr::new(100, 64, 0, 0), 10),
    // IETF protocol assignments
    V4Net::new(Ipv4Addr::new(192, 0, 0, 0), 24),
    // TEST-NET-1
    V4Net::new(Ipv4Addr::new(192, 0, 2, 0), 24),
    // Benchmarking
    V4Net::new(Ipv4Addr::new(198, 18, 0, 0), 15),
    // TEST-NET-2
    V4Net::new(Ipv4Addr::new(198, 51, 100, 0), 24),
    // TEST-NET-3
    V4Net::new(Ipv4Addr::new(203, 0, 113, 0), 24),
    // Reserved for future use
    V4Net::new(Ipv4Addr::new(240, 0, 0, 0), 4),
    // Limited broadcast
    V4Net::new(Ipv4Addr::new(255, 255, 255, 255), 32),
];

const V6_GLOBAL_UNICAST: V6Net = V6Net::new(Ipv6Addr::new(0x2000, 0, 0, 0, 0, 0, 0, 0), 3);
const V6_LINK_LOCAL: V6Net = V6Net::new(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10);
const V6_UNIQUE_LOCAL: V6Net = V6Net::new(Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7);

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(raw: &str, family: AddressFamily) -> Option<RejectReason> {
        classify(raw, family).reason()
    }

    #[test]
    fn test_empty_is_missing() {
        assert_eq!(rejected("", AddressFamily::V4), Some(RejectReason::Missing));
        assert_eq!(rejected("", AddressFamily::V6), Some(RejectReason::Missing));
        assert_eq!(
            classify_optional(None, AddressFamily::V6),
            Verdict::Rejected(RejectReason::Missing)
        );
    }

    #[test]
    fn test_unparseable_is_invalid() {
        for raw in ["not-an-ip", "256.1.1.1", "1.2.3", " 8.8.8.8", "8.8.8.8 ", "2001:db8::g", "fe80::1%eth0", "08.8.8.8"] {
            assert_eq!(
                rejected(raw, AddressFamily::V4),
                Some(RejectReason::Invalid),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_v4_special_ranges() {
        let cases = [
            ("127.0.0.1", RejectReason::Loopback),
            ("127.255.255.254", RejectReason::Loopback),
            ("0.0.0.0", RejectReason::Unspecified),
            ("224.0.0.1", RejectReason::Multicast),
            ("239.255.255.250", RejectReason::Multicast),
            ("169.254.10.20", RejectReason::LinkLocal),
            ("10.0.0.1", RejectReason::Private),
            ("172.16.5.4", RejectReason::Private),
            ("172.31.255.255", RejectReason::Private),
            ("192.168.1.1", RejectReason::Private),
            ("0.1.2.3", RejectReason::Reserved),
            ("100.64.0.1", RejectReason::Reserved),
            ("100.127.255.255", RejectReason::Reserved),
            ("192.0.0.8", RejectReason::Reserved),
            ("192.0.2.1", RejectReason::Reserved),
            ("198.18.0.1", RejectReason::Reserved),
            ("198.19.255.255", RejectReason::Reserved),
            ("198.51.100.7", RejectReason::Reserved),
            ("203.0.113.9", RejectReason::Reserved),
            ("240.0.0.1", RejectReason::Reserved),
            ("255.255.255.255", RejectReason::Reserved),
        ];

        for (raw, reason) in cases {
            assert_eq!(rejected(raw, AddressFamily::V4), Some(reason), "{raw}");
        }
    }

    #[test]
    fn test_v6_special_ranges() {
        let cases = [
            ("::1", RejectReason::Loopback),
            ("::", RejectReason::Unspecified),
            ("ff02::1", RejectReason::Multicast),
            ("ff01::1", RejectReason::Multicast),
            ("ff0e::1", RejectReason::Multicast),
            ("fe80::1", RejectReason::LinkLocal),
            ("febf::1", RejectReason::LinkLocal),
            ("fc00::1", RejectReason::Private),
            ("fd12:3456:789a::1", RejectReason::Private),
            ("4000::1", RejectReason::Reserved),
            ("100::1", RejectReason::Reserved),
            ("64:ff9b::1", RejectReason::Reserved),
        ];

        for (raw, reason) in cases {
            assert_eq!(rejected(raw, AddressFamily::V6), Some(reason), "{raw}");
        }
    }

    #[test]
    fn test_wrong_family() {
        assert_eq!(
            rejected("2606:4700:4700::1111", AddressFamily::V4),
            Some(RejectReason::WrongFamily)
        );
        assert_eq!(
            rejected("8.8.8.8", AddressFamily::V6),
            Some(RejectReason::WrongFamily)
        );
    }

    #[test]
    fn test_first_failing_check_wins() {
        // Loopback is checked before family
        assert_eq!(rejected("::1", AddressFamily::V4), Some(RejectReason::Loopback));
        // Private is checked before family
        assert_eq!(
            rejected("10.1.2.3", AddressFamily::V6),
            Some(RejectReason::Private)
        );
        // Family is checked before the reserved table
        assert_eq!(
            rejected("192.0.2.1", AddressFamily::V6),
            Some(RejectReason::WrongFamily)
        );
    }

    #[test]
    fn test_ipv4_mapped_is_treated_as_v4() {
        assert_eq!(
            classify("::ffff:8.8.8.8", AddressFamily::V4),
            Verdict::Accepted("8.8.8.8".parse().unwrap())
        );
        assert_eq!(
            rejected("::ffff:127.0.0.1", AddressFamily::V4),
            Some(RejectReason::Loopback)
        );
        assert_eq!(
            rejected("::ffff:8.8.8.8", AddressFamily::V6),
            Some(RejectReason::WrongFamily)
        );
    }

    #[test]
    fn test_global_unicast_accepted_unchanged() {
        for raw in ["8.8.8.8", "1.1.1.1", "93.184.216.34", "100.63.255.255", "100.128.0.1", "172.32.0.1", "223.255.255.254"] {
            let verdict = classify(raw, AddressFamily::V4);
            assert!(!verdict.is_rejected(), "{raw}");
            assert_eq!(verdict.address().unwrap().to_string(), raw);
            assert_eq!(verdict.reason(), None);
        }

        for raw in ["2606:4700:4700::1111", "2a00:1450:4001:82a::200e", "3fff:ffff::1"] {
            let verdict = classify(raw, AddressFamily::V6);
            assert_eq!(verdict.address().unwrap().to_string(), raw, "{raw}");
        }
    }

    #[test]
    fn test_v6_canonicalized() {
        let verdict = classify("2606:4700:4700:0000:0000:0000:0000:1111", AddressFamily::V6);
        assert_eq!(
            verdict.address().unwrap().to_string(),
            "2606:4700:4700::1111"
        );
    }

    #[test]
    fn test_reason_strings() {
        assert_eq!(RejectReason::LinkLocal.as_str(), "link-local");
        assert_eq!(RejectReason::WrongFamily.to_string(), "wrong-family");
        assert_eq!(
            serde_json::to_string(&RejectReason::WrongFamily).unwrap(),
            "\"wrong-family\""
        );
    }

    #[test]
    fn test_family_record_types() {
        assert_eq!(AddressFamily::V4.record_type(), RecordType::A);
        assert_eq!(AddressFamily::V6.record_type(), RecordType::Aaaa);
        assert_eq!(AddressFamily::from(RecordType::Aaaa), AddressFamily::V6);
    }
}
