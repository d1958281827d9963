//! Adaptive reverse-DNS reconnaissance over IP subnets.
//!
//! Instead of issuing one PTR query per address, ptrsweep starts at the
//! query implied by the subnet mask and descends into more specific
//! labels only where a level of the reverse namespace exists but holds
//! no records.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ptrsweep::tokio::sync::mpsc;
//! use ptrsweep::{run_scan, ScanConfig, Subnet, UdpResolver};
//!
//! #[tokio::main]
//! async fn main() -> ptrsweep::Result<()> {
//!     let subnet: Subnet = "203.0.113.0/24".parse()?;
//!     let config = ScanConfig::new(600, 5, vec!["1.1.1.1:53".parse().unwrap()])?;
//!
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!     tokio::spawn(async move {
//!         while let Some(record) = rx.recv().await {
//!             println!("{record}");
//!         }
//!     });
//!
//!     let stats = run_scan(subnet, &config, Arc::new(UdpResolver::new()), tx).await?;
//!     println!("{} records discovered", stats.records);
//!     Ok(())
//! }
//! ```

// Re-export core types
pub use ptrsweep_core::*;

// Re-export the engine
pub use ptrsweep_engine::{
    reverse_query, run_scan, ResolverClient, ScanConfig, ScanEngine, ScanStats,
    TransportError, UdpResolver,
};

// Re-export runtime for convenience
pub use tokio;
