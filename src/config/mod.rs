// Configuration module entry point
// Layers defaults, config file, environment and CLI overrides, and holds runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{
    ConcurrencyMode, Config, ConfigOverrides, DelayConfig, DelayMode, HttpConfig, LoggingConfig,
    PerformanceConfig, ServerConfig, ServerVariant,
};

/// Environment variable prefix, nested keys joined with `__`
/// (e.g. `DELAY_SERVER__SERVER__PORT=9100`)
pub const ENV_PREFIX: &str = "DELAY_SERVER";

impl Config {
    /// Load configuration for the given variant.
    ///
    /// Precedence, lowest first: built-in defaults, the optional config file
    /// (path without extension, e.g. "config" for config.toml), environment,
    /// command-line overrides.
    pub fn load_from(
        config_path: Option<&str>,
        variant: ServerVariant,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ServerError> {
        Self::load_with_env(config_path, variant, overrides, None)
    }

    /// Same as [`Config::load_from`], reading `env` instead of the process
    /// environment when it is given
    fn load_with_env(
        config_path: Option<&str>,
        variant: ServerVariant,
        overrides: &ConfigOverrides,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ServerError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9000)?
            .set_default("server.backlog", 128)?
            .set_default("delay.mode", variant.default_delay_mode().as_str())?
            .set_default("delay.fixed_ms", 200)?
            .set_default("delay.min_ms", 0)?
            .set_default("delay.max_ms", 1000)?
            .set_default("http.content_type", "application/json")?
            .set_default("http.server_name", "delay-server")?
            .set_default("http.strict_methods", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.concurrency", ConcurrencyMode::Sequential.as_str())?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?;

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(env),
            )
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(u64::from))?
            .set_override_option("server.workers", overrides.workers.and_then(|w| u64::try_from(w).ok()))?
            .set_override_option("delay.mode", overrides.delay_mode.map(DelayMode::as_str))?
            .set_override_option("delay.fixed_ms", overrides.fixed_ms)?
            .set_override_option("delay.min_ms", overrides.min_ms)?
            .set_override_option("delay.max_ms", overrides.max_ms)?
            .set_override_option(
                "performance.concurrency",
                overrides.concurrency.map(ConcurrencyMode::as_str),
            )?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| ServerError::InvalidAddress { addr, source })
    }
}
