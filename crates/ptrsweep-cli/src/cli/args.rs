//! Command-line argument definitions using clap.

use clap::Parser;

/// Adaptive reverse-DNS subnet scanner
///
/// Discovers PTR records across whole CIDR blocks by descending the
/// in-addr.arpa / ip6.arpa hierarchy instead of querying every address.
/// IPv4 prefixes must fall on octet boundaries (/8, /16, /24, /32),
/// IPv6 prefixes on nibble boundaries (multiples of 4).
#[derive(Parser, Debug)]
#[command(name = "ptrsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CIDR prefixes to sweep (e.g. 203.0.113.0/24, 2001:db8::/32)
    #[arg(required = true, value_name = "PREFIX")]
    pub prefixes: Vec<String>,

    /// Nameserver to query; bare addresses default to port 53
    #[arg(short, long = "server", required = true, value_name = "ADDR")]
    pub servers: Vec<String>,

    /// Queries per second per subnet sweep
    #[arg(short, long, default_value_t = 600)]
    pub rate: u32,

    /// Attempts per query before abandoning its subtree
    #[arg(short, long, default_value_t = 5)]
    pub attempts: u32,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
