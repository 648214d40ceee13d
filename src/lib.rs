//! aarlo library crate.
//!
//! The binary is a thin wrapper; everything is exposed here for integration
//! testing.

pub mod arlo;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod stream;
