//! Logger module
//!
//! Provides logging utilities for the delay server including:
//! - Server lifecycle logging
//! - Access logging in common, combined or custom formats
//! - Error and warning logging
//! - File-based logging support

mod format;
mod level;
pub mod writer;

pub use format::AccessLogEntry;
pub use level::Level;

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::Config;
use crate::delay::DelayPolicy;
use crate::error::ServerError;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> Result<(), ServerError> {
    let level = config
        .logging
        .level
        .parse::<Level>()
        .map_err(|e| ServerError::Logging(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        level,
    )
    .map_err(ServerError::Logging)
}

/// Whether a message at `level` would be written
fn enabled(level: Level) -> bool {
    writer::get().map_or(level.allows(Level::Info), |w| level.allows(w.level()))
}

/// Write to info/access log
fn write_info(message: &str) {
    if !enabled(Level::Info) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// The line announcing the bound port, always on stdout
pub fn log_serving_port(port: u16) {
    println!("serving at port {port}");
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, policy: &DelayPolicy) {
    write_info("======================================");
    write_info("Delay server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Delay policy: {policy}"));
    write_info(&format!(
        "Concurrency: {}",
        config.performance.concurrency.as_str()
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    if enabled(Level::Debug) {
        write_info(&format!("[Connection] Accepted from: {peer_addr}"));
    }
}

pub fn log_delay(peer_addr: &SocketAddr, delay: Duration) {
    if enabled(Level::Debug) {
        write_info(&format!(
            "[Delay] {peer_addr} held for {:.3}ms",
            delay.as_secs_f64() * 1_000.0
        ));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    if enabled(Level::Error) {
        write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
    }
}

pub fn log_error(message: &str) {
    if enabled(Level::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

fn fatal_line(err: &ServerError) -> String {
    format!("[FATAL] {err}")
}

/// Unrecoverable startup failure; bypasses the level filter.
///
/// Always reaches stderr, and the error log file too when one is configured.
pub fn log_fatal(err: &ServerError) {
    let line = fatal_line(err);
    if let Some(w) = writer::get().filter(|w| !w.error_goes_to_stderr()) {
        w.write_error(&line);
    }
    eprintln!("{line}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
