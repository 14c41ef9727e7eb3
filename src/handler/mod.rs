//! Request handler module
//!
//! Every request lands here regardless of path: sample a delay from the
//! policy, hold this request for that long, then answer `{}`.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::{Method, Request, Response};
use tokio::time::{sleep, Instant};

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Methods answered with the delayed `{}` while `http.strict_methods` is on
fn is_supported_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// Main entry point for HTTP request handling
///
/// The request body is never read; the connection is closed after the
/// response so nothing is left to drain.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();

    if state.config.http.strict_methods && !is_supported_method(&method) {
        logger::log_warning(&format!("Unsupported method: {method}"));
        let response = http::build_501_response(&method);
        log_access(&req, &state, peer_addr, &response, started, None);
        return Ok(response);
    }

    // Only this request's task is suspended; the listener is unaffected
    // unless the server runs sequentially.
    let delay = state.policy.sample();
    logger::log_delay(&peer_addr, delay);
    sleep(delay).await;

    let response = http::build_empty_json_response(&state.config.http, method == Method::HEAD);
    log_access(&req, &state, peer_addr, &response, started, Some(delay));
    Ok(response)
}

fn log_access<B>(
    req: &Request<B>,
    state: &AppState,
    peer_addr: SocketAddr,
    response: &Response<Full<Bytes>>,
    started: Instant,
    delay: Option<std::time::Duration>,
) {
    if !state.access_log_enabled() {
        return;
    }

    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0".to_string(),
        _ => "1.1".to_string(),
    };
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry.delay_us = delay.map_or(0, |d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX));

    logger::log_access(&entry, &state.config.logging.access_log_format);
}
