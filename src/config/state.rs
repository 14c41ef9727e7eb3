// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::delay::DelayPolicy;
use crate::error::ServerError;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Built once from `config.delay`
    pub policy: DelayPolicy,
}

impl AppState {
    /// Build state from config, validating the delay policy
    pub fn new(config: Config) -> Result<Self, ServerError> {
        let policy = DelayPolicy::from_config(&config.delay)?;
        Ok(Self { config, policy })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
