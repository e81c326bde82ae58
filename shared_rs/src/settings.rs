use std::collections::HashMap;

use config::{Config, Environment, File};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

pub trait ConfigLoader<T>: Sized {
    fn create_default() -> T;

    fn config_prefix() -> &'static str;

    /// Plain environment variables kept for compatibility with older deployments,
    /// as `(config key, variable name)` pairs. They win over every other source.
    fn legacy_env_overrides() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

pub trait HasServerConfig {
    fn server_config(&self) -> &ServerConfig;
    fn set_server_config(&mut self, config: ServerConfig);
}

pub trait HasLoggingConfig {
    fn logging_config(&self) -> &LoggingConfig;
    fn set_logging_config(&mut self, config: LoggingConfig);
}

/// Layers defaults, `config/default.toml`, `config/{RUN_ENV}.toml`, prefixed
/// environment variables and finally the legacy variables.
pub fn load_config_fresh<T>() -> Result<T, ConfigError>
where
    T: ConfigLoader<T> + Serialize + DeserializeOwned,
{
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());
    load_config_from::<T>(&run_env, None)
}

/// Same as [`load_config_fresh`], reading variables from `env` instead of the
/// process environment when it is provided.
pub fn load_config_from<T>(
    run_env: &str,
    env: Option<HashMap<String, String>>,
) -> Result<T, ConfigError>
where
    T: ConfigLoader<T> + Serialize + DeserializeOwned,
{
    let lookup = |name: &str| match &env {
        Some(vars) => vars.get(name).cloned(),
        None => std::env::var(name).ok(),
    };

    let mut builder = Config::builder()
        .add_source(Config::try_from(&T::create_default())?)
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_env}")).required(false))
        .add_source(
            Environment::with_prefix(T::config_prefix())
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env.clone()),
        );

    for (key, variable) in T::legacy_env_overrides() {
        builder = builder.set_override_option(*key, lookup(variable))?;
    }

    let config = builder.build()?.try_deserialize::<T>()?;
    tracing::debug!(prefix = T::config_prefix(), run_env, "configuration loaded");
    Ok(config)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_level() -> String {
    "info".to_string()
}
