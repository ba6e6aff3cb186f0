//! Test utilities and mocks for Gator
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use gator::config::ServerConfig;
use gator::server::Server;
use gator::transport::TcpDialer;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// How long a test waits on any single socket operation
pub const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// A port on 127.0.0.1 that nothing listens on
pub async fn closed_port() -> u16 {
    let (listener, addr) = create_test_listener().await;
    drop(listener);
    addr.port()
}

/// Start an echo server on 127.0.0.1 and return its address
pub async fn spawn_echo_server() -> SocketAddr {
    spawn_echo_server_on(IpAddr::from([127, 0, 0, 1])).await
}

/// Start an echo server on the first address `localhost` resolves to
pub async fn spawn_localhost_echo_server() -> SocketAddr {
    let first = tokio::net::lookup_host(("localhost", 0))
        .await
        .unwrap()
        .next()
        .unwrap();
    spawn_echo_server_on(first.ip()).await
}

/// Start an echo server on `ip` and return its address
pub async fn spawn_echo_server_on(ip: IpAddr) -> SocketAddr {
    let listener = TcpListener::bind(SocketAddr::new(ip, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(_) => return,
            };
            tokio::spawn(async move {
                let (mut reader, mut writer) = stream.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
            });
        }
    });

    addr
}

/// A relay running on an ephemeral port
pub struct TestRelay {
    /// Address clients connect to
    pub addr: SocketAddr,
    /// Dropping or sending on this stops the accept loop
    pub shutdown_tx: broadcast::Sender<bool>,
}

impl TestRelay {
    /// Start a relay with default settings
    pub async fn start() -> Self {
        let (listener, addr) = create_test_listener().await;
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let dialer = TcpDialer::with_defaults().with_connect_timeout(IO_TIMEOUT);
        let server = Server::new(ServerConfig::default(), dialer);
        tokio::spawn(server.serve(listener, shutdown_rx));

        TestRelay { addr, shutdown_tx }
    }

    /// Open a client connection to the relay
    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }
}

/// Write `request` and read exactly `reply_len` bytes back
pub async fn exchange(stream: &mut TcpStream, request: &[u8], reply_len: usize) -> Vec<u8> {
    stream.write_all(request).await.unwrap();
    let mut reply = vec![0u8; reply_len];
    tokio::time::timeout(IO_TIMEOUT, stream.read_exact(&mut reply))
        .await
        .unwrap()
        .unwrap();
    reply
}

/// Read until the relay closes the connection and return whatever arrived
///
/// A reset counts as closed: the relay may drop a socket with unread
/// request bytes still queued.
pub async fn read_until_closed(stream: &mut TcpStream) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        match tokio::time::timeout(IO_TIMEOUT, stream.read(&mut buf))
            .await
            .unwrap()
        {
            Ok(0) | Err(_) => return received,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
    }
}

/// Mock SOCKS5 client messages
pub mod socks5_mock {
    use gator::socks::*;

    /// Create a no-auth method selection request
    pub fn create_auth_request_no_auth() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]
    }

    /// Create a method selection request with the given methods
    pub fn create_auth_request(methods: &[u8]) -> Vec<u8> {
        let mut request = vec![SOCKS5_VERSION, methods.len() as u8];
        request.extend_from_slice(methods);
        request
    }

    /// Create a request to an IPv4 address
    pub fn create_request_ipv4(command: u8, ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut cmd = vec![SOCKS5_VERSION, command, SOCKS5_RESERVED, SOCKS5_ADDR_TYPE_IPV4];
        cmd.extend_from_slice(&ip);
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }

    /// Create a connect command to IPv4 address
    pub fn create_connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        create_request_ipv4(SOCKS_CMD_TCP_CONNECT, ip, port)
    }

    /// Create a connect command to domain
    pub fn create_connect_domain(domain: &[u8], port: u16) -> Vec<u8> {
        create_request_domain(SOCKS_CMD_TCP_CONNECT, domain, port)
    }

    /// Create a request to a domain, given as raw bytes
    pub fn create_request_domain(command: u8, domain: &[u8], port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            command,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        cmd.extend_from_slice(domain);
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }

    /// The reply a request to `domain:port` is expected to get
    pub fn expected_reply_domain(status: u8, domain: &[u8], port: u16) -> Vec<u8> {
        let mut reply = vec![
            SOCKS5_VERSION,
            status,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        reply.extend_from_slice(domain);
        reply.extend_from_slice(&port.to_be_bytes());
        reply
    }

    /// The reply a request to `ip:port` is expected to get
    pub fn expected_reply_ipv4(status: u8, ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut reply = vec![SOCKS5_VERSION, status, SOCKS5_RESERVED, SOCKS5_ADDR_TYPE_IPV4];
        reply.extend_from_slice(&ip);
        reply.extend_from_slice(&port.to_be_bytes());
        reply
    }
}

/// Mock SOCKS4 client messages
pub mod socks4_mock {
    use gator::socks::*;

    /// Create a SOCKS4 request
    pub fn create_request(command: u8, ip: [u8; 4], port: u16, user_id: &[u8]) -> Vec<u8> {
        let mut request = vec![SOCKS4_VERSION, command];
        request.extend_from_slice(&port.to_be_bytes());
        request.extend_from_slice(&ip);
        request.extend_from_slice(user_id);
        request.push(0);
        request
    }

    /// The reply a request to `ip:port` is expected to get
    pub fn expected_reply(status: u8, ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut reply = vec![SOCKS4_REPLY_VERSION, status];
        reply.extend_from_slice(&port.to_be_bytes());
        reply.extend_from_slice(&ip);
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_test_listener() {
        let (listener, addr) = create_test_listener().await;
        assert!(addr.port() > 0);
        drop(listener);
    }

    #[tokio::test]
    async fn test_echo_server() {
        let addr = spawn_echo_server().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let reply = exchange(&mut stream, b"hello", 5).await;
        assert_eq!(reply, b"hello");
    }

    #[test]
    fn test_socks5_mock_connect_ipv4() {
        let cmd = socks5_mock::create_connect_ipv4([192, 168, 1, 1], 8080);
        assert_eq!(cmd[0], 5); // SOCKS5 version
        assert_eq!(cmd[1], 1); // CONNECT
        assert_eq!(cmd[3], 1); // IPv4
        assert_eq!(&cmd[4..8], &[192, 168, 1, 1]);
    }

    #[test]
    fn test_socks4_mock_request() {
        let request = socks4_mock::create_request(1, [0, 0, 0, 0], 80, b"");
        assert_eq!(request, vec![0x04, 0x01, 0x00, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }
}
