// Server loop module
// Accepts connections and dispatches them according to the concurrency mode

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::{accept_connection, serve_connection};
use crate::config::{AppState, ConcurrencyMode};
use crate::logger;

/// Run the listening loop forever.
///
/// `[Listening] -> accept -> [Handling] -> respond -> [Listening]`.
/// In sequential mode the next connection is not accepted until the current
/// one, delay included, has been answered. Accept errors are logged and the
/// loop keeps going.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
) {
    let mode = state.config.performance.concurrency;
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => match mode {
                ConcurrencyMode::Sequential => {
                    serve_connection(stream, peer_addr, Arc::clone(&state)).await;
                }
                ConcurrencyMode::PerConnection => {
                    accept_connection(stream, peer_addr, &state, &active_connections);
                }
            },
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
