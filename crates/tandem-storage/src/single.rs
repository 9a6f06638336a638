//! Single-element asynchronous result sequence.
//!
//! Every facade operation completes synchronously; [`AsyncSingle`] wraps
//! the outcome so callers can plug it into `futures` stream pipelines.
//! It yields its value on the first poll and then terminates.
//!
//! ```rust
//! use futures::StreamExt;
//! use tandem_storage::resolved;
//!
//! # futures::executor::block_on(async {
//! let doubled: Vec<u32> = resolved(21).map(|v| v * 2).collect().await;
//! assert_eq!(doubled, vec![42]);
//! # });
//! ```

use futures::future::{self, Ready};
use futures::stream::{self, Once};

/// A stream that yields exactly one, already computed, item.
pub type AsyncSingle<T> = Once<Ready<T>>;

/// Wrap an already computed value as an [`AsyncSingle`].
pub fn resolved<T>(value: T) -> AsyncSingle<T> {
    stream::once(future::ready(value))
}
