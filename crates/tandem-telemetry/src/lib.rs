//! Tandem Telemetry - logging setup on top of `tracing`.
//!
//! # Example
//!
//! ```rust,no_run
//! use tandem_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), tandem_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("tandem_storage=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("storage ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging,
};
