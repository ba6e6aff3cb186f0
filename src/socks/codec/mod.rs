//! Wire codec for SOCKS4 and SOCKS5 messages
//!
//! Parsers read exactly the bytes each field needs, left to right, and
//! return a freshly built message or an error; nothing is filled in
//! partially. Encoders turn a message into the bytes to send and leave
//! the writing to the caller.

pub mod v4;
pub mod v5;

use crate::error::SocksError;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Fill `buf` completely or fail with a classified read error
pub(crate) async fn read_field<R>(
    reader: &mut R,
    buf: &mut [u8],
    field: &'static str,
) -> Result<(), SocksError>
where
    R: AsyncRead + Unpin,
{
    reader
        .read_exact(buf)
        .await
        .map(|_| ())
        .map_err(|e| SocksError::from_read(field, e))
}

/// Read a single byte field
pub(crate) async fn read_u8_field<R>(reader: &mut R, field: &'static str) -> Result<u8, SocksError>
where
    R: AsyncRead + Unpin,
{
    reader
        .read_u8()
        .await
        .map_err(|e| SocksError::from_read(field, e))
}

/// Read a big-endian port
pub(crate) async fn read_port<R>(reader: &mut R) -> Result<u16, SocksError>
where
    R: AsyncRead + Unpin,
{
    let mut port = [0u8; 2];
    read_field(reader, &mut port, "destination port").await?;
    Ok(u16::from_be_bytes(port))
}
