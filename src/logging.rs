use std::sync::Once;

use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::formatter::CustomFormatter;

static INIT: Once = Once::new();

/// Installs the global subscriber. `RUST_LOG` wins over `fallback_filter`.
///
/// Safe to call more than once; only the first call has any effect.
pub fn setup_logging(fallback_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).event_format(CustomFormatter))
            .with(filter)
            .with(ErrorLayer::default());

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to install tracing subscriber: {e}");
        }
    });
}
