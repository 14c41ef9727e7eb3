// Server module entry point
// Binds the listener and runs the accept loop

pub mod connection;
pub mod listener;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::error::ServerError;
use crate::logger;

// Re-export commonly used items
pub use listener::create_listener;
pub use server_loop::start_server_loop;

/// A bound, not yet running, delay server
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Validate the configuration and bind the listening socket.
    ///
    /// Must be called from within a tokio runtime. A bind failure is returned
    /// as [`ServerError::Bind`] and never retried.
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        let addr = config.get_socket_addr()?;
        let state = Arc::new(AppState::new(config)?);
        let listener = create_listener(addr, state.config.server.backlog)
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            state,
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve connections until the process is terminated
    pub async fn run(self) {
        start_server_loop(self.listener, self.state, self.active_connections).await;
    }
}

/// Bind, announce the port, and serve forever.
///
/// Only returns if startup fails.
pub async fn start(config: Config) -> Result<(), ServerError> {
    let server = Server::bind(config)?;
    let addr = server.local_addr()?;

    logger::log_serving_port(addr.port());
    logger::log_server_start(&addr, &server.state.config, &server.state.policy);

    server.run().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConcurrencyMode, ConfigOverrides, DelayMode, ServerVariant};
    use std::collections::HashSet;
    use std::time::{Duration, Instant};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    struct Reply {
        head: String,
        body: String,
        elapsed: Duration,
    }

    impl Reply {
        fn status_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.eq_ignore_ascii_case(name).then(|| value.trim())
            })
        }
    }

    fn test_config(variant: ServerVariant, configure: impl FnOnce(&mut Config)) -> Config {
        let mut config = Config::load_from(None, variant, &ConfigOverrides::default()).unwrap();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.logging.access_log = false;
        configure(&mut config);
        config
    }

    fn spawn_server(config: Config) -> SocketAddr {
        let server = Server::bind(config).unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        addr
    }

    async fn send(addr: SocketAddr, method: &str, path: &str) -> Reply {
        let started = Instant::now();
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let elapsed = started.elapsed();

        let text = String::from_utf8(raw).unwrap();
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        Reply {
            head: head.to_string(),
            body: body.to_string(),
            elapsed,
        }
    }

    #[tokio::test]
    async fn test_fixed_delay_server() {
        let addr = spawn_server(test_config(ServerVariant::Fixed, |_| {}));

        for path in ["/anything", "/", "/deep/path?x=1"] {
            let reply = send(addr, "GET", path).await;
            assert!(reply.elapsed >= Duration::from_millis(200), "{:?}", reply.elapsed);
            assert_eq!(reply.status_line(), "HTTP/1.1 200 OK");
            assert_eq!(reply.header("content-length"), Some("2"));
            assert_eq!(reply.header("content-type"), Some("application/json"));
            assert_eq!(reply.body, "{}");

            let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
            assert_eq!(json, serde_json::json!({}));
        }
    }

    #[tokio::test]
    async fn test_random_delay_server() {
        let addr = spawn_server(test_config(ServerVariant::Random, |c| {
            c.performance.concurrency = ConcurrencyMode::PerConnection;
        }));

        let replies = send_concurrently(addr, 5).await;
        for reply in &replies {
            assert_eq!(reply.status_line(), "HTTP/1.1 200 OK");
            assert_eq!(reply.body, "{}");
            // sampled delay is below 1000ms; allow for local overhead
            assert!(reply.elapsed < Duration::from_millis(1_500), "{:?}", reply.elapsed);
        }
        let distinct: HashSet<u128> = replies.iter().map(|r| r.elapsed.as_micros()).collect();
        assert!(distinct.len() > 1);
    }

    async fn send_concurrently(addr: SocketAddr, n: usize) -> Vec<Reply> {
        let handles: Vec<_> = (0..n)
            .map(|_| tokio::spawn(async move { send(addr, "GET", "/").await }))
            .collect();
        let mut replies = Vec::with_capacity(n);
        for handle in handles {
            replies.push(handle.await.unwrap());
        }
        replies
    }

    #[tokio::test]
    async fn test_sequential_mode_serialises_delays() {
        let addr = spawn_server(test_config(ServerVariant::Fixed, |c| {
            c.delay.fixed_ms = 100;
        }));

        let started = Instant::now();
        let replies = send_concurrently(addr, 3).await;
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(replies.iter().all(|r| r.body == "{}"));
    }

    #[tokio::test]
    async fn test_per_connection_mode_overlaps_delays() {
        let addr = spawn_server(test_config(ServerVariant::Fixed, |c| {
            c.delay.fixed_ms = 300;
            c.performance.concurrency = ConcurrencyMode::PerConnection;
        }));

        let started = Instant::now();
        let replies = send_concurrently(addr, 4).await;
        // sequential handling would take at least 1200ms
        assert!(started.elapsed() < Duration::from_millis(1_100));
        assert!(replies.iter().all(|r| r.elapsed >= Duration::from_millis(300)));
    }

    #[tokio::test]
    async fn test_head_answered_and_post_unsupported() {
        let addr = spawn_server(test_config(ServerVariant::Fixed, |c| {
            c.delay.fixed_ms = 0;
        }));

        let head = send(addr, "HEAD", "/").await;
        assert_eq!(head.status_line(), "HTTP/1.1 200 OK");
        assert_eq!(head.header("content-length"), Some("2"));
        assert!(head.body.is_empty());

        let post = send(addr, "POST", "/").await;
        assert_eq!(post.status_line(), "HTTP/1.1 501 Not Implemented");
        assert_eq!(post.body, "501 Unsupported method ('POST')");
    }

    #[tokio::test]
    async fn test_other_methods_answered_like_get_when_not_strict() {
        let addr = spawn_server(test_config(ServerVariant::Fixed, |c| {
            c.delay.fixed_ms = 0;
            c.http.strict_methods = false;
        }));

        let reply = send(addr, "PUT", "/whatever").await;
        assert_eq!(reply.status_line(), "HTTP/1.1 200 OK");
        assert_eq!(reply.body, "{}");
    }

    #[tokio::test]
    async fn test_delay_longer_than_io_timeout_still_answered() {
        let addr = spawn_server(test_config(ServerVariant::Fixed, |c| {
            c.delay.fixed_ms = 1_500;
            c.performance.read_timeout = 1;
            c.performance.write_timeout = 1;
        }));

        let reply = send(addr, "GET", "/slow").await;
        assert_eq!(reply.status_line(), "HTTP/1.1 200 OK");
        assert_eq!(reply.body, "{}");
        assert!(reply.elapsed >= Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn test_second_bind_on_same_port_fails() {
        let first = Server::bind(test_config(ServerVariant::Fixed, |_| {})).unwrap();
        let port = first.local_addr().unwrap().port();

        let second = Server::bind(test_config(ServerVariant::Fixed, |c| c.server.port = port));
        match second {
            Err(err) => assert!(err.is_bind_error(), "unexpected error: {err}"),
            Ok(_) => panic!("second server bound an occupied port"),
        }
    }

    #[tokio::test]
    async fn test_max_connections_rejects_excess() {
        let addr = spawn_server(test_config(ServerVariant::Fixed, |c| {
            c.delay.fixed_ms = 300;
            c.performance.concurrency = ConcurrencyMode::PerConnection;
            c.performance.max_connections = Some(1);
        }));

        let busy = tokio::spawn(async move { send(addr, "GET", "/").await });
        tokio::time::sleep(Duration::from_millis(100)).await;

        // rejected connections are closed without a response
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let _ = stream
            .write_all(b"GET / HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n")
            .await;
        let mut raw = Vec::new();
        let _ = stream.read_to_end(&mut raw).await;
        assert!(raw.is_empty());

        assert_eq!(busy.await.unwrap().body, "{}");
    }

    #[tokio::test]
    async fn test_invalid_delay_rejected_at_bind() {
        let config = test_config(ServerVariant::Random, |c| {
            c.delay.mode = DelayMode::Uniform;
            c.delay.min_ms = 900;
            c.delay.max_ms = 100;
        });
        assert!(matches!(
            Server::bind(config),
            Err(ServerError::InvalidDelay(_))
        ));
    }
}
