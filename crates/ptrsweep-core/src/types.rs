//! Data model shared by the engine and its callers.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::{Result, ScanError};

/// An IP subnet: base address plus prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    addr: IpAddr,
    prefix: u8,
}

impl Subnet {
    /// Create a subnet, validating the prefix length against the
    /// address family.
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self> {
        let max = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix > max {
            return Err(ScanError::Config(format!(
                "prefix /{prefix} out of range for {addr} (max /{max})"
            )));
        }
        Ok(Self { addr, prefix })
    }

    /// Base address of the subnet.
    #[must_use]
    pub const fn addr(&self) -> IpAddr {
        self.addr
    }

    /// Prefix length in bits.
    #[must_use]
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Returns true if this is an IPv4 subnet.
    #[must_use]
    pub const fn is_ipv4(&self) -> bool {
        matches!(self.addr, IpAddr::V4(_))
    }
}

impl FromStr for Subnet {
    type Err = ScanError;

    /// Parses CIDR notation like `203.0.113.0/24` or `2001:db8::/32`.
    fn from_str(s: &str) -> Result<Self> {
        let (addr_str, prefix_str) = s
            .split_once('/')
            .ok_or_else(|| ScanError::Config(format!("not CIDR notation: {s}")))?;

        let addr: IpAddr = addr_str
            .parse()
            .map_err(|e| ScanError::Config(format!("invalid address in '{s}': {e}")))?;

        let prefix: u8 = prefix_str
            .parse()
            .map_err(|e| ScanError::Config(format!("invalid prefix in '{s}': {e}")))?;

        Self::new(addr, prefix)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// One discovered PTR record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrRecord {
    /// The reverse-DNS name the record lives at
    /// (e.g. `113.0.203.in-addr.arpa.`)
    pub name: String,
    /// The hostname the record points to
    pub hostname: String,
    /// Record TTL in seconds
    pub ttl: u32,
}

impl fmt::Display for PtrRecord {
    /// Renders a dig-style presentation line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\tIN\tPTR\t{}", self.name, self.ttl, self.hostname)
    }
}

/// Response status as the engine classifies it.
///
/// The engine only distinguishes three outcomes; everything outside
/// success and an authoritative name error is an anomaly it refuses to
/// recurse on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Query succeeded; the zone level exists (records may be empty)
    Success,
    /// Authoritative negative: nothing exists under this name
    NameError,
    /// Any other response code, carried verbatim
    Other(u16),
}

/// A parsed response from one query/response exchange.
///
/// Produced by a `ResolverClient` implementation; the engine never sees
/// wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrResponse {
    /// Classified response status
    pub status: ResponseStatus,
    /// PTR records carried in the answer section, in answer order
    pub records: Vec<PtrRecord>,
}

impl PtrResponse {
    /// A successful response carrying the given records.
    #[must_use]
    pub fn success(records: Vec<PtrRecord>) -> Self {
        Self {
            status: ResponseStatus::Success,
            records,
        }
    }

    /// An authoritative name error.
    #[must_use]
    pub const fn name_error() -> Self {
        Self {
            status: ResponseStatus::NameError,
            records: Vec::new(),
        }
    }
}
