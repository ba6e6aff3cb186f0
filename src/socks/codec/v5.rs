//! SOCKS5 message codec
//!
//! Method negotiation, CONNECT request parsing and reply encoding.

use super::{read_field, read_port, read_u8_field};
use crate::error::SocksError;
use crate::socks::consts::*;
use crate::socks::types::{ConnectReply, ConnectRequest, SocksCommand, TargetAddr};
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::io::AsyncRead;

/// Authentication methods offered by a client, in the order offered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodOffer {
    methods: Vec<u8>,
}

impl MethodOffer {
    /// Build an offer; an offer must name at least one method
    pub fn new(methods: Vec<u8>) -> Result<Self, SocksError> {
        if methods.is_empty() {
            return Err(SocksError::ProtocolViolation(
                "client offered zero authentication methods".to_string(),
            ));
        }
        if methods.len() > u8::MAX as usize {
            return Err(SocksError::ProtocolViolation(format!(
                "too many authentication methods: {}",
                methods.len()
            )));
        }
        Ok(Self { methods })
    }

    /// Offered method codes
    pub fn methods(&self) -> &[u8] {
        &self.methods
    }

    /// Whether `method` was offered
    pub fn contains(&self, method: u8) -> bool {
        self.methods.contains(&method)
    }
}

/// Parse a method offer
///
/// The leading version byte has already been consumed by the dispatcher.
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
pub async fn read_method_offer<R>(reader: &mut R) -> Result<MethodOffer, SocksError>
where
    R: AsyncRead + Unpin,
{
    let count = read_u8_field(reader, "method count").await?;
    if count == 0 {
        return Err(SocksError::ProtocolViolation(
            "client offered zero authentication methods".to_string(),
        ));
    }

    let mut methods = vec![0u8; count as usize];
    read_field(reader, &mut methods, "method list").await?;

    MethodOffer::new(methods)
}

/// The server's answer to a [`MethodOffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodChoice {
    /// Protocol version, always 5
    pub version: u8,
    /// Selected method, or 0xFF when nothing is acceptable
    pub method: u8,
}

impl MethodChoice {
    /// Pick no-authentication if offered, otherwise refuse
    pub fn select(offer: &MethodOffer) -> Self {
        let method = if offer.contains(SOCKS5_AUTH_METHOD_NONE) {
            SOCKS5_AUTH_METHOD_NONE
        } else {
            SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE
        };

        MethodChoice {
            version: SOCKS5_VERSION,
            method,
        }
    }

    /// Whether a method was actually selected
    pub fn is_acceptable(&self) -> bool {
        self.method != SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE
    }

    /// Wire form of the choice
    pub fn to_bytes(self) -> [u8; 2] {
        [self.version, self.method]
    }
}

/// Parse a SOCKS5 request
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Any command byte is accepted here; deciding what to do with commands
/// other than CONNECT is up to the state machine.
pub async fn read_connect_request<R>(reader: &mut R) -> Result<ConnectRequest, SocksError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    read_field(reader, &mut header, "request header").await?;

    let version = header[0];
    let command = SocksCommand::from_byte(header[1]);
    let addr_type = header[3];

    if version != SOCKS5_VERSION {
        return Err(SocksError::ProtocolViolation(format!(
            "unexpected version in SOCKS5 request: {}",
            version
        )));
    }

    let destination = match addr_type {
        SOCKS5_ADDR_TYPE_IPV4 => {
            let mut addr = [0u8; 4];
            read_field(reader, &mut addr, "IPv4 address").await?;
            let port = read_port(reader).await?;
            TargetAddr::ipv4(Ipv4Addr::from(addr), port)
        }
        SOCKS5_ADDR_TYPE_DOMAIN => {
            let len = read_u8_field(reader, "domain length").await?;
            let mut domain = vec![0u8; len as usize];
            read_field(reader, &mut domain, "domain name").await?;
            let port = read_port(reader).await?;
            TargetAddr::domain(domain, port)
        }
        SOCKS5_ADDR_TYPE_IPV6 => {
            let mut addr = [0u8; 16];
            read_field(reader, &mut addr, "IPv6 address").await?;
            let port = read_port(reader).await?;
            TargetAddr::ipv6(Ipv6Addr::from(addr), port)
        }
        other => {
            return Err(SocksError::ProtocolViolation(format!(
                "unsupported address type: {}",
                other
            )))
        }
    };

    Ok(ConnectRequest {
        version,
        command,
        destination,
    })
}

/// Encode a SOCKS5 reply
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Address types 0 and 1 both carry a four byte address.
pub fn encode_reply(reply: &ConnectReply) -> Result<Bytes, SocksError> {
    let mut buf = BytesMut::with_capacity(6 + 16);
    buf.put_u8(reply.version);
    buf.put_u8(reply.status);
    buf.put_u8(SOCKS5_RESERVED);
    buf.put_u8(reply.addr_type);

    match (reply.addr_type, &reply.address) {
        (
            SOCKS5_ADDR_TYPE_UNSPECIFIED | SOCKS5_ADDR_TYPE_IPV4,
            TargetAddr::Ip(SocketAddr::V4(addr)),
        ) => {
            buf.put_slice(&addr.ip().octets());
        }
        (SOCKS5_ADDR_TYPE_IPV6, TargetAddr::Ip(SocketAddr::V6(addr))) => {
            buf.put_slice(&addr.ip().octets());
        }
        (SOCKS5_ADDR_TYPE_DOMAIN, TargetAddr::Domain(domain, _)) => {
            if domain.len() > MAX_DOMAIN_LEN {
                return Err(SocksError::ProtocolViolation(format!(
                    "domain name too long for reply: {} bytes",
                    domain.len()
                )));
            }
            buf.put_u8(domain.len() as u8);
            buf.put_slice(domain);
        }
        (
            SOCKS5_ADDR_TYPE_UNSPECIFIED
            | SOCKS5_ADDR_TYPE_IPV4
            | SOCKS5_ADDR_TYPE_DOMAIN
            | SOCKS5_ADDR_TYPE_IPV6,
            address,
        ) => {
            return Err(SocksError::ProtocolViolation(format!(
                "address type {} cannot carry {}",
                reply.addr_type, address
            )))
        }
        (other, _) => {
            return Err(SocksError::ProtocolViolation(format!(
                "cannot encode reply with address type {}",
                other
            )))
        }
    }

    buf.put_u16(reply.address.port());
    Ok(buf.freeze())
}
