//! HTTP response building module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};

use crate::config::HttpConfig;
use crate::logger;

/// Body of every successful response: a syntactically valid, empty JSON object
pub const EMPTY_JSON_BODY: &[u8] = b"{}";

/// Build the delayed `200 OK` response carrying `{}`
///
/// `Content-Length` is always set so clients can frame the body; for HEAD the
/// header is kept and the body left empty.
pub fn build_empty_json_response(http_config: &HttpConfig, is_head: bool) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(EMPTY_JSON_BODY)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", &http_config.content_type)
        .header("Content-Length", EMPTY_JSON_BODY.len())
        .header("Server", &http_config.server_name)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::from_static(EMPTY_JSON_BODY)))
        })
}

/// Build 501 Not Implemented response for a method with no handler
pub fn build_501_response(method: &Method) -> Response<Full<Bytes>> {
    let message = format!("501 Unsupported method ('{method}')");
    Response::builder()
        .status(StatusCode::NOT_IMPLEMENTED)
        .header("Content-Type", "text/plain")
        .header("Content-Length", message.len())
        .body(Full::new(Bytes::from(message.clone())))
        .unwrap_or_else(|e| {
            log_build_error("501", &e);
            let mut resp = Response::new(Full::new(Bytes::from(message)));
            *resp.status_mut() = StatusCode::NOT_IMPLEMENTED;
            resp
        })
}

fn log_build_error(kind: &str, err: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {kind} response: {err}"));
}
