//! Command-line surface shared by both binaries

use clap::Parser;

use crate::config::{ConcurrencyMode, Config, ConfigOverrides, DelayMode, ServerVariant};
use crate::error::ServerError;
use crate::logger;
use crate::server;

/// HTTP server that answers every request with `{}` after an artificial delay
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Config file path without extension (e.g. "config" for config.toml); missing file is ignored
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Delay policy
    #[arg(long, value_enum)]
    pub delay: Option<DelayMode>,

    /// Fixed delay in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Uniform delay lower bound in milliseconds (inclusive)
    #[arg(long)]
    pub min_ms: Option<u64>,

    /// Uniform delay upper bound in milliseconds (exclusive)
    #[arg(long)]
    pub max_ms: Option<u64>,

    /// How accepted connections are scheduled
    #[arg(long, value_enum)]
    pub concurrency: Option<ConcurrencyMode>,

    /// Tokio worker threads (defaults to CPU cores)
    #[arg(long)]
    pub workers: Option<usize>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            workers: self.workers,
            delay_mode: self.delay,
            fixed_ms: self.delay_ms,
            min_ms: self.min_ms,
            max_ms: self.max_ms,
            concurrency: self.concurrency,
        }
    }
}

/// Parse arguments, load configuration, and serve until killed.
///
/// Errors are fatal startup errors; the caller turns them into a non-zero exit.
pub fn run(variant: ServerVariant) -> Result<(), ServerError> {
    run_with(Args::parse(), variant)
}

pub fn run_with(args: Args, variant: ServerVariant) -> Result<(), ServerError> {
    let cfg = Config::load_from(Some(&args.config), variant, &args.overrides())?;
    logger::init(&cfg)?;

    // Create Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(server::start(cfg))
}

/// Binary entry point: run and map failure to a non-zero exit code
pub fn main_with(variant: ServerVariant) -> std::process::ExitCode {
    match run(variant) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            logger::log_fatal(&err);
            std::process::ExitCode::FAILURE
        }
    }
}
