//! Transport module for Gator
//!
//! This module provides the outbound dialing abstraction used once a
//! client's request has been accepted, plus the socket options applied
//! to every TCP connection the relay handles.

mod tcp;

pub use tcp::TcpDialer;

use crate::config::TcpConfig;
use crate::socks::TargetAddr;
use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Socket options for configuring connections
#[derive(Debug, Clone)]
pub struct SocketOpts {
    /// Enable TCP_NODELAY
    pub nodelay: bool,
    /// TCP keepalive timeout
    pub keepalive_secs: Option<u64>,
    /// TCP keepalive interval
    pub keepalive_interval: Option<u64>,
}

impl Default for SocketOpts {
    fn default() -> Self {
        SocketOpts {
            nodelay: true,
            keepalive_secs: Some(20),
            keepalive_interval: Some(8),
        }
    }
}

impl SocketOpts {
    /// Create socket options from TCP config
    pub fn from_tcp_config(config: &TcpConfig) -> Self {
        SocketOpts {
            nodelay: config.nodelay,
            keepalive_secs: Some(config.keepalive_secs),
            keepalive_interval: Some(config.keepalive_interval),
        }
    }

    /// Apply socket options to a TCP stream
    pub fn apply(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_nodelay(self.nodelay)?;

        if let (Some(timeout), Some(interval)) = (self.keepalive_secs, self.keepalive_interval) {
            let socket = socket2::SockRef::from(stream);
            let keepalive = socket2::TcpKeepalive::new()
                .with_time(Duration::from_secs(timeout))
                .with_interval(Duration::from_secs(interval));
            socket.set_tcp_keepalive(&keepalive)?;
        }

        Ok(())
    }
}

/// Opens the destination leg of a circuit
///
/// The SOCKS state machines only ever see this trait, so sessions can be
/// driven against in-memory streams as well as real sockets.
#[async_trait]
pub trait Dialer: Debug + Send + Sync + 'static {
    /// The stream type produced by this dialer
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Connect to `target`; a failure here is reported to the client
    async fn dial(&self, target: &TargetAddr) -> io::Result<Self::Stream>;
}
