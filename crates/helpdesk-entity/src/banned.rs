//! Permanent address deny-list support.
//!
//! Deny-list ranges are stored as the numeric form of IPv4 addresses and
//! only ever consulted with an existence check. IPv6 sources never match
//! a range; the deny-list is an IPv4-only feature.

use std::net::IpAddr;

/// Convert an address to its numeric form for range comparison.
///
/// Returns `None` for IPv6 addresses.
pub fn ip_to_long(ip: IpAddr) -> Option<i64> {
    match ip {
        IpAddr::V4(v4) => Some(u32::from(v4) as i64),
        IpAddr::V6(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_converts_to_expected_long() {
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(ip_to_long(ip), Some(0x0A00_0001));
    }

    #[test]
    fn ipv6_never_matches() {
        let ip: IpAddr = "::1".parse().unwrap();
        assert_eq!(ip_to_long(ip), None);
    }
}
