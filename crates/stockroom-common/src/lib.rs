//! Stockroom Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared building blocks for the Stockroom workspace members.
//!
//! # Overview
//!
//! - **Logging**: environment-driven `tracing` subscriber setup shared by every
//!   binary in the workspace
//!
//! # Example
//!
//! ```no_run
//! use stockroom_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod logging;

pub use logging::{init_logging, LogConfig, LoggingGuard};
