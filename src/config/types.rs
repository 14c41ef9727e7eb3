// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub delay: DelayConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Which executable is starting; selects the built-in delay defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerVariant {
    /// Constant 200ms delay
    Fixed,
    /// Uniform delay over [0ms, 1000ms)
    Random,
}

impl ServerVariant {
    pub const fn default_delay_mode(self) -> DelayMode {
        match self {
            Self::Fixed => DelayMode::Fixed,
            Self::Random => DelayMode::Uniform,
        }
    }
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub backlog: i32,
}

/// Delay configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DelayConfig {
    pub mode: DelayMode,
    /// Used when `mode = "fixed"`
    pub fixed_ms: u64,
    /// Inclusive lower bound when `mode = "uniform"`
    pub min_ms: u64,
    /// Exclusive upper bound when `mode = "uniform"`
    pub max_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DelayMode {
    Fixed,
    Uniform,
}

impl DelayMode {
    /// Name as written in configuration files
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Uniform => "uniform",
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub content_type: String,
    pub server_name: String,
    /// Answer methods other than GET/HEAD with 501 instead of the delayed `{}`
    pub strict_methods: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub concurrency: ConcurrencyMode,
    pub read_timeout: u64,
    pub write_timeout: u64,
    /// Only enforced in `per_connection` mode
    pub max_connections: Option<u64>,
}

/// How accepted connections are scheduled
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    /// Serve each connection, delay included, before accepting the next
    Sequential,
    /// One task per connection
    PerConnection,
}

impl ConcurrencyMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::PerConnection => "per_connection",
        }
    }
}

/// Values given on the command line; `None` leaves the layered value alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub workers: Option<usize>,
    pub delay_mode: Option<DelayMode>,
    pub fixed_ms: Option<u64>,
    pub min_ms: Option<u64>,
    pub max_ms: Option<u64>,
    pub concurrency: Option<ConcurrencyMode>,
}
