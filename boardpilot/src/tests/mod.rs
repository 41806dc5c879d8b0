mod driver_tests;
pub mod fake_dom;
mod project_tests;
mod wait_tests;
mod workspace_tests;

use std::sync::Arc;
use std::time::Duration;

use crate::config::DriverConfig;
use crate::tests::fake_dom::{FakeDirectory, FakeDom};
use crate::Driver;

// Initialize tracing for tests
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Short timeouts so not-found paths fail in milliseconds, not seconds.
pub fn test_config() -> DriverConfig {
    DriverConfig {
        default_timeout: Duration::from_millis(400),
        settle_ms: 10,
        ..DriverConfig::default()
    }
}

pub fn test_driver(dom: Arc<FakeDom>) -> Driver {
    Driver::with_directory(dom, test_config(), Arc::new(FakeDirectory::default()))
}
