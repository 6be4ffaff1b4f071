pub mod builders;

use std::sync::Once;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Fixed origin every test timeline is expressed against: 2024-01-01 00:00 UTC.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixed date")
}

/// `epoch() + days`.
pub fn day(days: i64) -> DateTime<Utc> {
    epoch() + Duration::days(days)
}

/// `epoch() + hours`.
pub fn hour(hours: i64) -> DateTime<Utc> {
    epoch() + Duration::hours(hours)
}
