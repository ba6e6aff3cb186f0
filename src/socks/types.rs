//! SOCKS type definitions
//!
//! Defines the message types shared by the SOCKS4 and SOCKS5 state machines.
//! Every message is built fresh by the codec, consumed once and dropped.

use super::consts::*;
use crate::error::{Socks4ReplyCode, Socks5ReplyCode};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// SOCKS command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// TCP CONNECT - establish a TCP connection to target
    Connect,
    /// TCP BIND - wait for incoming connection (not implemented)
    Bind,
    /// UDP ASSOCIATE - establish UDP relay (not implemented)
    UdpAssociate,
    /// Any other command byte, kept so it can be rejected with a reply
    Other(u8),
}

impl SocksCommand {
    /// Parse a command byte into SocksCommand
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            SOCKS_CMD_TCP_CONNECT => SocksCommand::Connect,
            SOCKS_CMD_TCP_BIND => SocksCommand::Bind,
            SOCKS5_CMD_UDP_ASSOCIATE => SocksCommand::UdpAssociate,
            other => SocksCommand::Other(other),
        }
    }

    /// Convert SocksCommand to byte
    pub fn to_byte(self) -> u8 {
        match self {
            SocksCommand::Connect => SOCKS_CMD_TCP_CONNECT,
            SocksCommand::Bind => SOCKS_CMD_TCP_BIND,
            SocksCommand::UdpAssociate => SOCKS5_CMD_UDP_ASSOCIATE,
            SocksCommand::Other(byte) => byte,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Bind => write!(f, "BIND"),
            SocksCommand::UdpAssociate => write!(f, "UDP ASSOCIATE"),
            SocksCommand::Other(byte) => write!(f, "UNKNOWN({})", byte),
        }
    }
}

/// Target address for SOCKS requests
///
/// Holds either an IP address or a domain name, never both, so the
/// address type of a request is always derived from the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddr {
    /// IP address with port
    Ip(SocketAddr),
    /// Domain name, as the raw bytes the client sent, with port
    Domain(Vec<u8>, u16),
}

impl TargetAddr {
    /// Create a new TargetAddr from an IPv4 address and port
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        TargetAddr::Ip(SocketAddr::new(IpAddr::V4(ip), port))
    }

    /// Create a new TargetAddr from an IPv6 address and port
    pub fn ipv6(ip: Ipv6Addr, port: u16) -> Self {
        TargetAddr::Ip(SocketAddr::new(IpAddr::V6(ip), port))
    }

    /// Create a new TargetAddr from a domain name and port
    pub fn domain(domain: impl Into<Vec<u8>>, port: u16) -> Self {
        TargetAddr::Domain(domain.into(), port)
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        match self {
            TargetAddr::Ip(addr) => addr.port(),
            TargetAddr::Domain(_, port) => *port,
        }
    }

    /// Get the SOCKS5 address type byte
    pub fn addr_type(&self) -> u8 {
        match self {
            TargetAddr::Ip(SocketAddr::V4(_)) => SOCKS5_ADDR_TYPE_IPV4,
            TargetAddr::Ip(SocketAddr::V6(_)) => SOCKS5_ADDR_TYPE_IPV6,
            TargetAddr::Domain(_, _) => SOCKS5_ADDR_TYPE_DOMAIN,
        }
    }
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // SocketAddr already brackets IPv6 hosts
            TargetAddr::Ip(addr) => write!(f, "{}", addr),
            TargetAddr::Domain(domain, port) => {
                write!(f, "{}:{}", String::from_utf8_lossy(domain), port)
            }
        }
    }
}

impl From<SocketAddr> for TargetAddr {
    fn from(addr: SocketAddr) -> Self {
        TargetAddr::Ip(addr)
    }
}

/// A destination request, shared by both protocol generations
///
/// SOCKS4 requests always carry an IPv4 target; the user-id is consumed
/// by the codec and not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Protocol version the request arrived with
    pub version: u8,
    /// Requested command
    pub command: SocksCommand,
    /// Destination address
    pub destination: TargetAddr,
}

/// A reply to a [`ConnectRequest`]
///
/// Replies echo the request's destination back to the client on success
/// and failure alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectReply {
    /// Version byte written first on the wire
    pub version: u8,
    /// Reply / result code
    pub status: u8,
    /// SOCKS5 address type tag; SOCKS4 ignores it
    pub addr_type: u8,
    /// Address and port to echo
    pub address: TargetAddr,
}

impl ConnectReply {
    /// Build a SOCKS5 reply echoing `request`'s destination
    pub fn socks5(request: &ConnectRequest, code: Socks5ReplyCode) -> Self {
        ConnectReply {
            version: SOCKS5_VERSION,
            status: code.into(),
            addr_type: request.destination.addr_type(),
            address: request.destination.clone(),
        }
    }

    /// Build a SOCKS4 reply echoing `request`'s destination
    pub fn socks4(request: &ConnectRequest, code: Socks4ReplyCode) -> Self {
        ConnectReply {
            version: SOCKS4_REPLY_VERSION,
            status: code.into(),
            addr_type: request.destination.addr_type(),
            address: request.destination.clone(),
        }
    }
}
