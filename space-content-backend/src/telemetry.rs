use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_LEVEL: &str =
    "info,hyper=info,space_content_backend=debug,space_content_target=debug";

/// Logs to stdout, filtered by `RUST_LOG` if it is set.
pub fn setup_telemetry() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
