// Listener module
// Creates the TCP listening socket

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Create a `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` is set so a restart can bind over sockets left in
/// `TIME_WAIT`. `SO_REUSEPORT` stays off: binding a port that another
/// listener holds must fail.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
/// * `backlog` - Size of the pending connection queue
///
/// # Returns
///
/// * `Ok(TcpListener)` - Successfully created and bound listener
/// * `Err(std::io::Error)` - Failed to create or bind socket
pub fn create_listener(addr: SocketAddr, backlog: i32) -> std::io::Result<TcpListener> {
    // Create socket with appropriate domain (IPv4 or IPv6)
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // On Windows SO_REUSEADDR allows stealing a port that is already listening
    #[cfg(not(windows))]
    socket.set_reuse_address(true)?;

    // Set non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
