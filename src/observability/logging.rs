//! # Structured Logging
//!
//! Span macros for remote operations and subscriber setup.
//!
//! Every exchange with the policy server runs inside a `remote_operation`
//! span carrying the verb, the resource kind, the declared name and a fresh
//! `operation_id`, so request/response debug lines from the protocol layer
//! can be correlated in JSON output.

use tracing_subscriber::EnvFilter;

/// Create a tracing span for one remote operation.
///
/// ```rust,ignore
/// let span = remote_span!("create", "Mirror Session", "span-test");
/// let span = remote_span!("update", "Security Policy", "web", uuid = "abc-123");
/// ```
#[macro_export]
macro_rules! remote_span {
    ($verb:expr, $kind:expr, $name:expr) => {
        tracing::info_span!(
            "remote_operation",
            verb = %$verb,
            kind = %$kind,
            name = %$name,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($verb:expr, $kind:expr, $name:expr, $($field:tt)*) => {
        tracing::info_span!(
            "remote_operation",
            verb = %$verb,
            kind = %$kind,
            name = %$name,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose`. A subscriber that is already installed (integration tests) is
/// left in place.
pub fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    // Already initialized elsewhere; ignore.
    let _ = if json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.with_target(false).try_init()
    };
}
