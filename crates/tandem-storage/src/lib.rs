//! Tandem Storage - a reactive facade over two key-value storage areas.
//!
//! The facade pairs a **durable** area (survives restarts) with a
//! **session** area (lives as long as the process). Every operation
//! returns an [`AsyncSingle`]: a stream that yields exactly one item and
//! then ends.
//!
//! # Modes
//!
//! | Mode | Area | Default backend |
//! |------|------|-----------------|
//! | [`StorageMode::Local`] | durable | [`FileArea`] |
//! | [`StorageMode::Session`] | session | [`MemoryArea`] |
//!
//! Operations that take `impl Into<Option<StorageMode>>` fall back to the
//! facade's default mode (session unless configured) when given `None`.
//!
//! # Stored format
//!
//! Values are stored as JSON object text. Records are stored bare; every
//! other value is wrapped as `{"data": value}` and unwrapped again on read.
//! See [`codec`].
//!
//! # Features
//!
//! - **`config`**: `ReactiveStorage::from_config` builds a facade from a
//!   loaded `tandem_config::Config`.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod area;
pub mod codec;
pub mod error;
pub mod facade;
pub mod file;
pub mod mode;
pub mod single;

#[cfg(feature = "config")]
mod config_bridge;

pub use area::{MemoryArea, StorageArea};
pub use codec::{StoredValue, decode, encode};
pub use error::{StorageError, StorageResult};
pub use facade::ReactiveStorage;
pub use file::FileArea;
pub use mode::{ClearTarget, StorageMode};
pub use single::{AsyncSingle, resolved};
