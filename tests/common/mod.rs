//! Shared test-only setup. Lives under `tests/common/mod.rs` (not
//! `tests/common.rs`) so cargo doesn't treat it as its own test binary.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a `tracing` subscriber once per test binary so stage/handler
/// logs surface when a test is run with `--nocapture`. Safe to call from
/// every test — later calls are no-ops.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
            .with_test_writer()
            .init();
    });
}
