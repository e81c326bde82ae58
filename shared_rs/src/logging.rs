use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::HasLoggingConfig;

/// Installs the global subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn setup_logging<C: HasLoggingConfig>(config: &C) {
    let logging = config.logging_config();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    if let Err(err) = result {
        eprintln!("logging already initialized: {err}");
    }
}
