//! SOCKS module for Gator
//!
//! This module implements the SOCKS4 and SOCKS5 CONNECT protocols: the
//! wire codec, the version dispatcher, one state machine per protocol
//! generation, and the relay that joins client and destination once a
//! request is granted.

pub mod codec;
mod consts;
mod handler;
mod tcp_relay;
mod types;
mod v4;
mod v5;

#[cfg(test)]
mod mock;

pub use consts::*;
pub use handler::{handle_client, read_version, SocksVersion};
pub use tcp_relay::{relay_tcp, RelayDirection, RelayOutcome};
pub use types::{ConnectReply, ConnectRequest, SocksCommand, TargetAddr};
