//! A tiny HTTP server for simulating network latency.
//!
//! Every request, whatever its path, is answered `200 OK` with the body `{}`
//! after a delay drawn from a [`delay::DelayPolicy`]: constant, or uniform
//! over a half-open interval and sampled per request.

pub mod cli;
pub mod config;
pub mod delay;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use crate::config::{Config, ServerVariant};
pub use crate::delay::DelayPolicy;
pub use crate::error::ServerError;
pub use crate::server::{start, Server};
