pub use tracing::{debug, error, info, instrument, trace, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
};

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Log filter for the rig: `RUST_LOG` when it parses, `default` otherwise.
pub fn session_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Per-cycle spans (`complete_cycle`, `white_light`, `near_infrared`) are
/// only worth printing on close when debug output is wanted.
pub fn cycle_span_events(filter: &EnvFilter) -> FmtSpan {
    let directives = filter.to_string();
    if directives.contains("debug") || directives.contains("trace") {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

/// Installs the global subscriber. Lines carry the uptime and the thread
/// name, so capture threads (`capture-wl`, `capture-nir`) can be told
/// apart from the session loop.
///
/// Returns false when a subscriber was already installed.
pub fn init() -> bool {
    let filter = session_filter(DEFAULT_DIRECTIVE);
    let span_events = cycle_span_events(&filter);

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime())
        .with_span_events(span_events);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
