//! Error types for Gator
//!
//! This module defines all custom error types used throughout the relay,
//! along with the reply codes each protocol generation puts on the wire.

use crate::socks::SOCKS5_VERSION;
use std::io;
use thiserror::Error;

/// Main error type for Gator operations
#[derive(Error, Debug)]
pub enum GatorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while negotiating or serving one SOCKS session
///
/// Every variant terminates the session. Only some of them are preceded
/// by a reply on the wire, see [`SocksError::replied`].
#[derive(Error, Debug)]
pub enum SocksError {
    /// The peer closed the stream before a field was complete
    #[error("Short read while reading {0}")]
    ShortRead(&'static str),

    /// Reading a field failed for a reason other than end-of-stream
    #[error("Failed to read {field}: {source}")]
    Read {
        /// Field being read
        field: &'static str,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Leading version byte is neither 4 nor 5
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// A field carried a value outside the accepted set
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// The client offered no method we accept (0xFF was sent)
    #[error("No acceptable authentication method")]
    NoAcceptableMethod,

    /// Command is recognised but not implemented
    #[error("SOCKS{version} command not supported: {command}")]
    UnsupportedCommand {
        /// Protocol version of the session
        version: u8,
        /// Command byte as received
        command: u8,
    },

    /// Outbound connection to the destination failed
    #[error("Failed to connect to {target}: {source}")]
    DialFailure {
        /// Destination as rendered for dialing
        target: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// A reply could not be written to the client
    #[error("Failed to write reply: {0}")]
    WriteFailure(#[source] io::Error),
}

impl SocksError {
    /// Classify an IO error hit while reading `field`
    pub fn from_read(field: &'static str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            SocksError::ShortRead(field)
        } else {
            SocksError::Read { field, source: err }
        }
    }

    /// Whether a failure reply reached the wire before this error surfaced
    ///
    /// SOCKS4 drops unsupported commands without answering.
    pub fn replied(&self) -> bool {
        match self {
            SocksError::NoAcceptableMethod | SocksError::DialFailure { .. } => true,
            SocksError::UnsupportedCommand { version, .. } => *version == SOCKS5_VERSION,
            _ => false,
        }
    }

    /// Whether the error just means the client went away mid-negotiation
    pub fn is_disconnect(&self) -> bool {
        match self {
            SocksError::ShortRead(_) => true,
            SocksError::Read { source, .. } | SocksError::WriteFailure(source) => matches!(
                source.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

/// Reply codes for SOCKS5 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Socks5ReplyCode {
    /// Command succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed = 0x02,
    /// Network unreachable
    NetworkUnreachable = 0x03,
    /// Host unreachable
    HostUnreachable = 0x04,
    /// Connection refused
    ConnectionRefused = 0x05,
    /// TTL expired
    TtlExpired = 0x06,
    /// Command not supported
    CommandNotSupported = 0x07,
    /// Address type not supported
    AddressTypeNotSupported = 0x08,
}

impl From<Socks5ReplyCode> for u8 {
    fn from(code: Socks5ReplyCode) -> Self {
        code as u8
    }
}

impl TryFrom<u8> for Socks5ReplyCode {
    type Error = SocksError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Socks5ReplyCode::Succeeded),
            0x01 => Ok(Socks5ReplyCode::GeneralFailure),
            0x02 => Ok(Socks5ReplyCode::ConnectionNotAllowed),
            0x03 => Ok(Socks5ReplyCode::NetworkUnreachable),
            0x04 => Ok(Socks5ReplyCode::HostUnreachable),
            0x05 => Ok(Socks5ReplyCode::ConnectionRefused),
            0x06 => Ok(Socks5ReplyCode::TtlExpired),
            0x07 => Ok(Socks5ReplyCode::CommandNotSupported),
            0x08 => Ok(Socks5ReplyCode::AddressTypeNotSupported),
            _ => Err(SocksError::ProtocolViolation(format!(
                "unknown SOCKS5 reply code: {}",
                value
            ))),
        }
    }
}

/// Result codes for SOCKS4 replies (the `CD` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Socks4ReplyCode {
    /// Request granted
    Granted = 90,
    /// Request rejected or failed
    Rejected = 91,
    /// Rejected, server cannot reach identd on the client
    NoIdentd = 92,
    /// Rejected, identd reported a different user-id
    IdentdMismatch = 93,
}

impl From<Socks4ReplyCode> for u8 {
    fn from(code: Socks4ReplyCode) -> Self {
        code as u8
    }
}

impl TryFrom<u8> for Socks4ReplyCode {
    type Error = SocksError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            90 => Ok(Socks4ReplyCode::Granted),
            91 => Ok(Socks4ReplyCode::Rejected),
            92 => Ok(Socks4ReplyCode::NoIdentd),
            93 => Ok(Socks4ReplyCode::IdentdMismatch),
            _ => Err(SocksError::ProtocolViolation(format!(
                "unknown SOCKS4 reply code: {}",
                value
            ))),
        }
    }
}
