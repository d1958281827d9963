//! # ptrsweep-cli
//!
//! Command-line front end for the ptrsweep reverse-DNS scanner.
//!
//! Thin glue only: argument parsing, nameserver list normalization and
//! result printing. The discovery logic lives in `ptrsweep-engine`.

pub mod cli;

pub use cli::run;
