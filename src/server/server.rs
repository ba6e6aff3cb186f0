//! Listener and accept loop
//!
//! Accepts clients and spawns one task per connection. Tasks share
//! nothing except the dialer.

use crate::config::ServerConfig;
use crate::socks::handle_client;
use crate::transport::{Dialer, SocketOpts};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Main Gator server
pub struct Server<D: Dialer> {
    /// Server configuration
    config: ServerConfig,
    /// Dialer shared by every session
    dialer: Arc<D>,
    /// Options applied to accepted client sockets
    socket_opts: SocketOpts,
}

impl<D: Dialer> Server<D> {
    /// Create a new server with the given configuration and dialer
    pub fn new(config: ServerConfig, dialer: D) -> Self {
        let socket_opts = SocketOpts::from_tcp_config(&config.tcp);
        Server {
            config,
            dialer: Arc::new(dialer),
            socket_opts,
        }
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(self, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        let listen_addr = self.config.listen_addr();
        let listener = TcpListener::bind(&listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", listen_addr))?;

        info!("Listening on {}", listener.local_addr()?);

        self.serve(listener, shutdown_rx).await
    }

    /// Accept clients on an already bound listener until shutdown
    ///
    /// Accept errors are logged and the loop keeps going. Sessions still
    /// running when shutdown arrives are left to finish on their own.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<bool>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => self.spawn_session(stream, peer),
                        Err(e) => warn!("Failed to accept connection: {}", e),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr) {
        debug!("Accepted connection from {}", peer);

        if let Err(e) = self.socket_opts.apply(&stream) {
            warn!("Failed to apply socket options for {}: {}", peer, e);
        }

        let dialer = self.dialer.clone();
        tokio::spawn(async move {
            match handle_client(stream, dialer.as_ref()).await {
                Ok(outcome) => debug!(
                    "Session from {} closed, {} finished first",
                    peer, outcome.direction
                ),
                Err(e) if e.is_disconnect() => debug!("Client {} went away: {}", peer, e),
                Err(e) if e.replied() => {
                    info!("Session from {} ended after a failure reply: {}", peer, e)
                }
                Err(e) => warn!("Session from {} dropped without a reply: {}", peer, e),
            }
        });
    }
}
