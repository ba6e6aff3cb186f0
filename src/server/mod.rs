//! Server module for Gator
//!
//! This module contains the listening side of the relay: binding the
//! configured address and handing every accepted client to the SOCKS
//! dispatcher.

#[allow(clippy::module_inception)]
mod server;

pub use server::Server;

use crate::config::Config;
use crate::error::GatorError;
use crate::transport::TcpDialer;
use anyhow::Result;
use tokio::sync::broadcast;

/// Run the server with the given configuration
pub async fn run_server(config: Config, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    let server_config = config.server;
    server_config.validate().map_err(GatorError::Config)?;

    let dialer = TcpDialer::new(&server_config);
    let server = Server::new(server_config, dialer);
    server.run(shutdown_rx).await
}
