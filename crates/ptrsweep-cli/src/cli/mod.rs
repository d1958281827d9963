//! CLI argument parsing and sweep orchestration.

pub mod args;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ptrsweep::{run_scan, PtrRecord, ScanConfig, Subnet, UdpResolver};

/// Default DNS port for bare nameserver addresses.
const DNS_PORT: u16 = 53;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let nameservers = cli
        .servers
        .iter()
        .map(|s| normalize_nameserver(s))
        .collect::<Result<Vec<_>>>()?;
    let config = ScanConfig::new(cli.rate, cli.attempts, nameservers)
        .context("invalid scan configuration")?;

    let resolver = Arc::new(UdpResolver::new());

    // One engine per prefix; engines share no state and run in parallel.
    // A printer task per engine drains its result channel to stdout.
    let mut sweeps = Vec::new();
    for prefix in &cli.prefixes {
        let subnet: Subnet = match prefix.parse() {
            Ok(subnet) => subnet,
            Err(e) => {
                error!(prefix = %prefix, error = %e, "skipping prefix");
                continue;
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<PtrRecord>();
        let printer = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                println!("{record}");
            }
        });

        let config = config.clone();
        let resolver = Arc::clone(&resolver);
        let sweep =
            tokio::spawn(async move { run_scan(subnet, &config, resolver, tx).await });
        sweeps.push((subnet, sweep, printer));
    }

    if sweeps.is_empty() {
        anyhow::bail!("no scannable prefixes");
    }

    let mut completed = 0u32;
    for (subnet, sweep, printer) in sweeps {
        match sweep.await? {
            Ok(stats) => {
                completed += 1;
                info!(
                    subnet = %subnet,
                    tasks = stats.tasks,
                    records = stats.records,
                    transport_failures = stats.transport_failures,
                    anomalies = stats.anomalies,
                    "sweep complete"
                );
            }
            Err(e) => error!(subnet = %subnet, error = %e, "sweep failed"),
        }
        printer.await?;
    }

    if completed == 0 {
        anyhow::bail!("all sweeps failed");
    }
    Ok(())
}

/// Initialize tracing on stderr, leaving stdout to discovered records.
fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Normalize a nameserver argument to a socket address.
///
/// Accepts `1.1.1.1`, `1.1.1.1:5353`, `2001:db8::1` and
/// `[2001:db8::1]:53`; bare addresses get the default DNS port.
fn normalize_nameserver(s: &str) -> Result<SocketAddr> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }
    anyhow::bail!("invalid nameserver address: {s}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_v4() {
        assert_eq!(
            normalize_nameserver("1.1.1.1").unwrap(),
            "1.1.1.1:53".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_normalize_explicit_port_kept() {
        assert_eq!(
            normalize_nameserver("9.9.9.9:5353").unwrap(),
            "9.9.9.9:5353".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_normalize_bare_v6_gets_bracketed_port() {
        assert_eq!(
            normalize_nameserver("2001:db8::1").unwrap(),
            "[2001:db8::1]:53".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_normalize_bracketed_v6() {
        assert_eq!(
            normalize_nameserver("[2001:db8::1]:853").unwrap(),
            "[2001:db8::1]:853".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_normalize_rejects_hostnames() {
        assert!(normalize_nameserver("dns.example.com").is_err());
        assert!(normalize_nameserver("").is_err());
    }
}
