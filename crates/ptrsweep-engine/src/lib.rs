//! Recursive reverse-DNS subdivision engine.
//!
//! Given a subnet, the engine issues the single query implied by the
//! prefix length and only descends into more specific labels when a
//! level of the reverse namespace exists but holds no records:
//!
//! - a populated answer is a leaf (the namespace terminates at the
//!   first resource record),
//! - an empty success fans out into one child task per label value
//!   (0-255 for `in-addr.arpa`, 0-f for `ip6.arpa`),
//! - an authoritative name error prunes the whole branch.
//!
//! Tasks run as independent tokio tasks; the only global throttle is a
//! shared rate limiter every task passes through before querying.

pub mod engine;
pub mod query;
pub mod resolver;

pub use engine::{run_scan, ScanConfig, ScanEngine, ScanStats};
pub use query::reverse_query;
pub use resolver::{ResolverClient, TransportError, UdpResolver};
