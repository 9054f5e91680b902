use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

pub const LOG_ENV: &str = "DOCKYARD_LOG";

/// Installs the global subscriber. `DOCKYARD_LOG` takes precedence over
/// `default_filter`. Calling this twice is harmless.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    let tree = HierarchicalLayer::new(2)
        .with_writer(std::io::stderr)
        .with_indent_lines(true)
        .with_targets(true)
        .with_bracketed_fields(true);

    if tracing_subscriber::registry().with(filter).with(tree).try_init().is_err() {
        tracing::debug!("logging was already initialized");
    }
}
