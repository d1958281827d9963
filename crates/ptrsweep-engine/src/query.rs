//! Reverse-DNS query formatting.

use std::net::IpAddr;

use ptrsweep_core::{Result, ScanError, Subnet};

/// Zone suffix of the IPv4 reverse namespace.
const V4_SUFFIX: &str = "in-addr.arpa.";

/// Zone suffix of the IPv6 reverse namespace.
const V6_SUFFIX: &str = "ip6.arpa.";

/// Build the initial reverse-DNS query name for a subnet.
///
/// Keeps only the labels the prefix covers, most specific first:
/// `203.0.113.0/24` becomes `113.0.203.in-addr.arpa.` and `2001:db8::/32`
/// becomes `8.b.d.0.1.0.0.2.ip6.arpa.`.
///
/// The prefix must fall on a label boundary — a multiple of 8 bits for
/// IPv4 octets, 4 bits for IPv6 nibbles. Anything else is a
/// configuration error surfaced before any query is sent.
pub fn reverse_query(subnet: &Subnet) -> Result<String> {
    let prefix = subnet.prefix();
    match subnet.addr() {
        IpAddr::V4(addr) => {
            if prefix % 8 != 0 {
                return Err(ScanError::Config(format!(
                    "IPv4 prefix /{prefix} is not on an octet boundary"
                )));
            }
            let labels: Vec<String> = addr.octets()[..usize::from(prefix / 8)]
                .iter()
                .rev()
                .map(ToString::to_string)
                .collect();
            Ok(join_labels(&labels, V4_SUFFIX))
        }
        IpAddr::V6(addr) => {
            if prefix % 4 != 0 {
                return Err(ScanError::Config(format!(
                    "IPv6 prefix /{prefix} is not on a nibble boundary"
                )));
            }
            let nibbles: Vec<u8> = addr
                .octets()
                .iter()
                .flat_map(|byte| [byte >> 4, byte & 0x0f])
                .collect();
            let labels: Vec<String> = nibbles[..usize::from(prefix / 4)]
                .iter()
                .rev()
                .map(|nibble| format!("{nibble:x}"))
                .collect();
            Ok(join_labels(&labels, V6_SUFFIX))
        }
    }
}

fn join_labels(labels: &[String], suffix: &str) -> String {
    if labels.is_empty() {
        suffix.to_string()
    } else {
        format!("{}.{suffix}", labels.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(cidr: &str) -> Result<String> {
        reverse_query(&cidr.parse().unwrap())
    }

    #[test]
    fn test_v4_octets_reversed() {
        assert_eq!(query("203.0.113.0/24").unwrap(), "113.0.203.in-addr.arpa.");
        assert_eq!(query("10.0.0.0/8").unwrap(), "10.in-addr.arpa.");
        assert_eq!(query("192.168.0.0/16").unwrap(), "168.192.in-addr.arpa.");
        assert_eq!(
            query("198.51.100.7/32").unwrap(),
            "7.100.51.198.in-addr.arpa."
        );
    }

    #[test]
    fn test_v4_label_count_matches_prefix() {
        for prefix in [8u8, 16, 24, 32] {
            let q = query(&format!("203.0.113.9/{prefix}")).unwrap();
            let labels = q.strip_suffix(".in-addr.arpa.").unwrap();
            assert_eq!(labels.split('.').count(), usize::from(prefix / 8));
        }
    }

    #[test]
    fn test_v4_zero_prefix_is_bare_zone() {
        assert_eq!(query("0.0.0.0/0").unwrap(), "in-addr.arpa.");
    }

    #[test]
    fn test_v4_misaligned_prefix_rejected() {
        for prefix in [1u8, 7, 9, 23, 25, 31] {
            assert!(query(&format!("203.0.113.0/{prefix}")).is_err());
        }
    }

    #[test]
    fn test_v6_nibbles_reversed() {
        assert_eq!(query("2001::/16").unwrap(), "1.0.0.2.ip6.arpa.");
        assert_eq!(query("2001:db8::/32").unwrap(), "8.b.d.0.1.0.0.2.ip6.arpa.");
    }

    #[test]
    fn test_v6_label_count_matches_prefix() {
        let q = query("2001:db8:dead:beef::/64").unwrap();
        let labels = q.strip_suffix(".ip6.arpa.").unwrap();
        assert_eq!(labels.split('.').count(), 16);
        assert_eq!(labels, "f.e.e.b.d.a.e.d.8.b.d.0.1.0.0.2");
        // Every label is a single hex digit.
        assert!(labels.split('.').all(|l| {
            l.len() == 1 && l.chars().all(|c| c.is_ascii_hexdigit())
        }));
    }

    #[test]
    fn test_v6_misaligned_prefix_rejected() {
        for prefix in [1u8, 3, 33, 63, 127] {
            assert!(query(&format!("2001:db8::/{prefix}")).is_err());
        }
    }
}
