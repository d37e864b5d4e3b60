use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Initialize structured logging with tracing.
/// Call once from the binary; a second call is a no-op apart from a warning.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json()
        );

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        tracing::warn!(error = %e, "Global tracing subscriber already set");
        return;
    }

    tracing::info!("Structured logging initialized");
}
