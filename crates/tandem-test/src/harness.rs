//! Test harness helpers.

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Create a temporary directory for testing.
///
/// The directory is removed when the returned `TempDir` is dropped.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
pub fn test_dir() -> TempDir {
    TempDir::with_prefix("tandem-").expect("Failed to create temp directory")
}

/// Set up logging for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Output goes through the test writer so it is captured per test.
///
/// # Example
///
/// ```rust,ignore
/// use tandem_test::setup_test_logging;
///
/// #[test]
/// fn my_test() {
///     setup_test_logging("tandem_storage=debug");
/// }
/// ```
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// Set up test logging at `warn`, which shows every swallowed backend error.
pub fn setup_test_logging_default() {
    setup_test_logging("warn");
}
