//! Diagnostic logging set-up.
//!
//! Logs always go to stderr; stdout belongs to help output and the tasks.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "RYM_LOG";

/// Filter used when `RYM_LOG` is unset or invalid.
pub fn default_directive(debug: bool, trace: bool) -> &'static str {
    if trace {
        "trace"
    } else if debug {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(debug: bool, trace: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug, trace)));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "warn");
        assert_eq!(default_directive(true, false), "debug");
        assert_eq!(default_directive(true, true), "trace");
        assert_eq!(default_directive(false, true), "trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false, false);
        init(true, false);
    }
}
