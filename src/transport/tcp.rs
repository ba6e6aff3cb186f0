//! TCP dialer implementation
//!
//! Opens plain TCP connections to SOCKS destinations.

use super::{Dialer, SocketOpts};
use crate::config::ServerConfig;
use crate::socks::TargetAddr;
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};

/// TCP dialer for destination connections
#[derive(Debug, Clone)]
pub struct TcpDialer {
    /// Socket options to apply to connections
    socket_opts: SocketOpts,
    /// Connection timeout; `None` waits as long as the OS does
    connect_timeout: Option<Duration>,
}

impl TcpDialer {
    /// Create a dialer from server configuration
    pub fn new(config: &ServerConfig) -> Self {
        TcpDialer {
            socket_opts: SocketOpts::from_tcp_config(&config.tcp),
            connect_timeout: config.connect_timeout(),
        }
    }

    /// Create a TCP dialer with default options
    pub fn with_defaults() -> Self {
        TcpDialer {
            socket_opts: SocketOpts::default(),
            connect_timeout: None,
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    async fn connect(target: &TargetAddr) -> io::Result<TcpStream> {
        let addr = match target {
            TargetAddr::Ip(addr) => *addr,
            TargetAddr::Domain(host, port) => Self::resolve(host, *port).await?,
        };
        TcpStream::connect(addr).await
    }

    /// Resolve a domain to the first address the system resolver returns
    ///
    /// Other addresses are not tried when connecting to the first fails.
    async fn resolve(host: &[u8], port: u16) -> io::Result<SocketAddr> {
        let host = std::str::from_utf8(host).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "domain name is not valid UTF-8")
        })?;

        lookup_host((host, port)).await?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses found for {}", host),
            )
        })
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    type Stream = TcpStream;

    async fn dial(&self, target: &TargetAddr) -> io::Result<Self::Stream> {
        let stream = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, Self::connect(target))
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connection to {} timed out", target),
                    )
                })??,
            None => Self::connect(target).await?,
        };

        if let Err(e) = self.socket_opts.apply(&stream) {
            tracing::warn!("Failed to apply socket options: {}", e);
        }

        tracing::debug!("TCP connection established to {}", target);

        Ok(stream)
    }
}
