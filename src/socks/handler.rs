//! Version dispatcher
//!
//! This module provides the entry point for a freshly accepted client. It
//! reads the leading version byte and hands the stream to the SOCKS4 or
//! SOCKS5 state machine.

use super::consts::{SOCKS4_VERSION, SOCKS5_VERSION};
use super::tcp_relay::RelayOutcome;
use super::{v4, v5};
use crate::error::SocksError;
use crate::transport::Dialer;
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Protocol generation announced by the first byte of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksVersion {
    /// SOCKS4
    V4,
    /// SOCKS5
    V5,
}

impl SocksVersion {
    /// Map a version byte, or `None` for anything but 4 and 5
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS4_VERSION => Some(SocksVersion::V4),
            SOCKS5_VERSION => Some(SocksVersion::V5),
            _ => None,
        }
    }
}

impl fmt::Display for SocksVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksVersion::V4 => write!(f, "SOCKS4"),
            SocksVersion::V5 => write!(f, "SOCKS5"),
        }
    }
}

/// Read exactly one byte and classify it
///
/// An unknown version is an error and nothing is written back.
pub async fn read_version<R>(reader: &mut R) -> Result<SocksVersion, SocksError>
where
    R: AsyncRead + Unpin,
{
    let byte = reader
        .read_u8()
        .await
        .map_err(|e| SocksError::from_read("version", e))?;

    SocksVersion::from_byte(byte).ok_or(SocksError::UnsupportedVersion(byte))
}

/// Handle one client session from its first byte to the end of the relay
///
/// The stream is consumed and dropped on every path, which closes the
/// client connection.
pub async fn handle_client<S, D>(mut stream: S, dialer: &D) -> Result<RelayOutcome, SocksError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    D: Dialer,
{
    let version = read_version(&mut stream).await?;
    debug!("Client speaks {}", version);

    match version {
        SocksVersion::V4 => v4::serve(stream, dialer).await,
        SocksVersion::V5 => v5::serve(stream, dialer).await,
    }
}

/// Write a complete reply and flush it
pub(crate) async fn write_reply<W>(writer: &mut W, reply: &[u8]) -> Result<(), SocksError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(reply)
        .await
        .map_err(SocksError::WriteFailure)?;
    writer.flush().await.map_err(SocksError::WriteFailure)
}
