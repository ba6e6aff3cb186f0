//! # Gator - SOCKS4/SOCKS5 CONNECT Relay
//!
//! Gator is a small TCP circuit relay. A client connects, speaks SOCKS4 or
//! SOCKS5, names a destination, and if the destination answers gets a
//! full-duplex byte pipe to it through the relay.
//!
//! ## Features
//!
//! - **Version Detection**: SOCKS4 and SOCKS5 clients share one port
//! - **CONNECT Only**: BIND and UDP ASSOCIATE are refused
//! - **No Authentication**: SOCKS5 clients must offer method 0x00
//! - **IPv4, IPv6 and Domain Targets**: domains are resolved by the relay
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gator::config::load_config;
//! use gator::server::run_server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("gator.toml")?;
//!     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     run_server(config, shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Client -> Listener -> Dispatcher -> (SOCKS4 | SOCKS5) -> Relay <- Destination
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod server;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{GatorError, SocksError};
pub use server::run_server;

/// Version of the Gator library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
