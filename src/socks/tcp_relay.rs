//! TCP relay for established circuits
//!
//! Once a request has been granted, the client and destination streams
//! are joined by two concurrent copies. The circuit is over as soon as
//! either direction finishes; the other copy is dropped with it.

use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Which copy finished first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayDirection {
    /// Client to destination
    Upstream,
    /// Destination to client
    Downstream,
}

impl fmt::Display for RelayDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayDirection::Upstream => write!(f, "client->destination"),
            RelayDirection::Downstream => write!(f, "destination->client"),
        }
    }
}

/// How a relay ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOutcome {
    /// The direction that completed
    pub direction: RelayDirection,
    /// Bytes it copied, if it ended cleanly
    pub bytes: Option<u64>,
}

/// Relay data bidirectionally between a client and its destination
///
/// Returns when either direction reaches EOF or fails. Errors inside the
/// copies are logged, not propagated: a dead peer is how circuits end.
pub async fn relay_tcp<C, D>(client: C, destination: D) -> RelayOutcome
where
    C: AsyncRead + AsyncWrite + Unpin,
    D: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut dest_read, mut dest_write) = tokio::io::split(destination);

    let upstream = tokio::io::copy(&mut client_read, &mut dest_write);
    let downstream = tokio::io::copy(&mut dest_read, &mut client_write);

    let (direction, result) = tokio::select! {
        result = upstream => (RelayDirection::Upstream, result),
        result = downstream => (RelayDirection::Downstream, result),
    };

    let bytes = match result {
        Ok(bytes) => {
            debug!("Relay {} finished: {} bytes", direction, bytes);
            Some(bytes)
        }
        Err(e) => {
            debug!("Relay {} error: {}", direction, e);
            None
        }
    };

    RelayOutcome { direction, bytes }
}
