//! ptrsweep - adaptive reverse-DNS subnet scanner.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    ptrsweep_cli::run().await
}
