//! Tandem Test - shared test utilities for Tandem storage.
//!
//! Provides a fault-injecting storage area and ready-made facades for
//! integration tests.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! tandem-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use tandem_storage::{MemoryArea, ReactiveStorage, StorageMode};
//! use tandem_test::{AreaOp, FaultyArea};
//!
//! #[tokio::test]
//! async fn write_failure_reports_false() {
//!     let durable = Arc::new(FaultyArea::new().with_failure(AreaOp::Write));
//!     let storage = ReactiveStorage::new(durable, Arc::new(MemoryArea::new()));
//!
//!     assert_eq!(storage.set("k", &1, StorageMode::Local).next().await, Some(false));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
