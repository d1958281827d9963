//! Core types and errors for the ptrsweep reverse-DNS scanner.
//!
//! This crate provides the foundational types used across the ptrsweep
//! workspace:
//!
//! - **Types**: [`Subnet`], discovered [`PtrRecord`]s, and the abstract
//!   [`PtrResponse`] contract the engine classifies
//! - **Errors**: the [`ScanError`] taxonomy with a [`Result`] alias

mod error;
pub mod types;

pub use error::{Result, ScanError, TransportError};
pub use types::*;
