//! Structured logging with `tracing`.
//!
//! - [`init_subscriber`] installs the global stderr subscriber for binaries
//! - [`capture_logs`] installs a thread-local capturing subscriber for tests
//!
//! Library code only emits events through the `tracing` macros; choosing a
//! subscriber is left to the binary.

pub mod test_utils;

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Arguments
///
/// * `level` - Minimum log level to display, e.g. `"warn"` or `"debug"`.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // set_global_default fails if already set; that is fine
    let _ = subscriber.try_init();
}

/// Map a `-v` repetition count onto a level name, starting from `base`.
///
/// `0` keeps `base`; each additional `-v` lowers the threshold one step down
/// to `trace`.
pub fn verbosity_level(base: &str, verbose: u8) -> &'static str {
    const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    let start = LEVELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(base))
        .unwrap_or(1);
    let idx = (start + usize::from(verbose)).min(LEVELS.len() - 1);
    LEVELS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_is_idempotent() {
        init_subscriber("warn");
        init_subscriber("debug");
    }

    #[test]
    fn verbosity_steps_down() {
        assert_eq!(verbosity_level("warn", 0), "warn");
        assert_eq!(verbosity_level("warn", 1), "info");
        assert_eq!(verbosity_level("warn", 2), "debug");
        assert_eq!(verbosity_level("warn", 9), "trace");
    }

    #[test]
    fn verbosity_unknown_base_defaults_to_warn() {
        assert_eq!(verbosity_level("loud", 0), "warn");
        assert_eq!(verbosity_level("INFO", 1), "debug");
    }
}
