//! SOCKS4 message codec

use super::{read_field, read_port, read_u8_field};
use crate::error::SocksError;
use crate::socks::consts::*;
use crate::socks::types::{ConnectReply, ConnectRequest, SocksCommand, TargetAddr};
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::io::AsyncRead;

/// Parse a SOCKS4 request
///
/// The leading version byte has already been consumed by the dispatcher.
///
/// ```text
/// +----+----+----+----+----+----+----+----+----+----+....+----+
/// | VN | CD | DSTPORT |      DSTIP        | USERID       |NULL|
/// +----+----+----+----+----+----+----+----+----+----+....+----+
///    1    1      2              4           variable       1
/// ```
///
/// Only CONNECT is accepted. The user-id is read up to its terminator
/// and thrown away.
pub async fn read_connect_request<R>(reader: &mut R) -> Result<ConnectRequest, SocksError>
where
    R: AsyncRead + Unpin,
{
    let command = read_u8_field(reader, "command").await?;
    match SocksCommand::from_byte(command) {
        SocksCommand::Connect => {}
        SocksCommand::Bind => {
            return Err(SocksError::UnsupportedCommand {
                version: SOCKS4_VERSION,
                command,
            })
        }
        _ => {
            return Err(SocksError::ProtocolViolation(format!(
                "invalid SOCKS4 command: {}",
                command
            )))
        }
    }

    let port = read_port(reader).await?;

    let mut addr = [0u8; 4];
    read_field(reader, &mut addr, "IPv4 address").await?;
    let ip = Ipv4Addr::from(addr);
    if is_socks4a_marker(ip) {
        return Err(SocksError::ProtocolViolation(
            "SOCKS4A domain-name extension is not implemented".to_string(),
        ));
    }

    skip_user_id(reader).await?;

    Ok(ConnectRequest {
        version: SOCKS4_VERSION,
        command: SocksCommand::Connect,
        destination: TargetAddr::ipv4(ip, port),
    })
}

/// SOCKS4A signals a trailing domain name with a destination of 0.0.0.x, x != 0
fn is_socks4a_marker(ip: Ipv4Addr) -> bool {
    let [a, b, c, d] = ip.octets();
    a == 0 && b == 0 && c == 0 && d != 0
}

/// Consume the NUL-terminated user-id, one byte at a time
async fn skip_user_id<R>(reader: &mut R) -> Result<usize, SocksError>
where
    R: AsyncRead + Unpin,
{
    let mut len = 0;
    while read_u8_field(reader, "user id").await? != 0 {
        len += 1;
    }
    Ok(len)
}

/// Encode a SOCKS4 reply
///
/// ```text
/// +----+----+----+----+----+----+----+----+
/// | VN | CD | DSTPORT |      DSTIP        |
/// +----+----+----+----+----+----+----+----+
///    1    1      2              4
/// ```
pub fn encode_reply(reply: &ConnectReply) -> Result<Bytes, SocksError> {
    let addr = match &reply.address {
        TargetAddr::Ip(SocketAddr::V4(addr)) => addr,
        other => {
            return Err(SocksError::ProtocolViolation(format!(
                "SOCKS4 reply cannot carry {}",
                other
            )))
        }
    };

    let mut buf = BytesMut::with_capacity(SOCKS4_REPLY_LEN);
    buf.put_u8(reply.version);
    buf.put_u8(reply.status);
    buf.put_u16(addr.port());
    buf.put_slice(&addr.ip().octets());
    Ok(buf.freeze())
}
