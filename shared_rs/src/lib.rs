pub mod settings;
pub mod extract;
pub mod logging;
pub mod model;
pub mod server;

pub use settings::{
    load_config_fresh, load_config_from, ConfigError, ConfigLoader, HasLoggingConfig, HasServerConfig,
    LoggingConfig, ServerConfig,
};
pub use extract::{describe_validation_errors, ValidatedJson, ValidationRejection};
pub use logging::setup_logging;
pub use model::{ModelHandle, ModelSlot, Uptime};
pub use server::{resolve_bind_addr, serve_listener, shutdown_signal};
