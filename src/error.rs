//! Startup error taxonomy
//!
//! Everything here is fatal: the binaries print the message and exit non-zero.
//! Per-connection failures never surface as `ServerError`, they are logged and
//! the connection is abandoned.

use std::io;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid delay policy: {0}")]
    InvalidDelay(String),

    #[error("failed to initialise logging: {0}")]
    Logging(#[source] io::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ServerError {
    /// Whether the error came from binding the listening socket
    pub const fn is_bind_error(&self) -> bool {
        matches!(self, Self::Bind { .. })
    }
}
