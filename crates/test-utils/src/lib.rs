//! Shared fixtures for the devwatch integration tests.

pub mod builders;
pub mod fake_source;
pub mod scripts;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use devwatch::logging::{LOG_ENV, filter_directives};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Install a test-captured subscriber once per test binary.
///
/// Honors the same `DEVWATCH_LOG` directives as the binary, e.g.
/// `DEVWATCH_LOG=devwatch=debug cargo test -- --nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let filter = EnvFilter::try_new(filter_directives(None, env.as_deref()))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `f`, failing the test after [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test step timed out after {TEST_TIMEOUT:?}"))
}
