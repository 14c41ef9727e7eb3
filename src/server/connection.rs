// Connection module
// Serves a single accepted TCP connection

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection in per-connection mode: check the in-flight limit,
/// then serve it on its own task.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - In-flight connection counter
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    let state = Arc::clone(state);
    let conn_counter = Arc::clone(conn_counter);
    tokio::spawn(async move {
        serve_connection(stream, peer_addr, state).await;
        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Serve one connection to completion.
///
/// One request per connection: keep-alive is disabled, so hyper closes the
/// socket once the response is flushed. The whole exchange is bounded by
/// `max(read_timeout, write_timeout)` on top of the longest possible delay,
/// so a configured delay never cuts off its own response.
pub async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    logger::log_connection_accepted(&peer_addr);

    let io = TokioIo::new(stream);
    let timeout_duration = Duration::from_secs(std::cmp::max(
        state.config.performance.read_timeout,
        state.config.performance.write_timeout,
    )) + state.policy.max_delay();

    let mut builder = http1::Builder::new();
    builder.keep_alive(false);

    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
    );

    match tokio::time::timeout(timeout_duration, conn).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => logger::log_connection_error(&err),
        Err(_) => {
            logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {}ms",
                timeout_duration.as_millis()
            ));
        }
    }
}
