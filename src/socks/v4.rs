//! SOCKS4 session state machine
//!
//! There is no negotiation phase: one CONNECT request, one reply, then
//! the relay. Malformed or unsupported requests are dropped without a
//! reply.

use super::codec::v4::{encode_reply, read_connect_request};
use super::handler::write_reply;
use super::tcp_relay::{relay_tcp, RelayOutcome};
use super::types::ConnectReply;
use crate::error::{Socks4ReplyCode, SocksError};
use crate::transport::Dialer;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

/// Serve a SOCKS4 session whose version byte has already been read
///
/// A failed dial is answered with CD 92, a successful one with CD 90.
pub async fn serve<S, D>(mut stream: S, dialer: &D) -> Result<RelayOutcome, SocksError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    D: Dialer,
{
    let request = read_connect_request(&mut stream).await?;
    info!("SOCKS4 {} request to {}", request.command, request.destination);

    let destination = match dialer.dial(&request.destination).await {
        Ok(destination) => destination,
        Err(e) => {
            warn!("Failed to connect to {}: {}", request.destination, e);
            let reply = ConnectReply::socks4(&request, Socks4ReplyCode::NoIdentd);
            write_reply(&mut stream, &encode_reply(&reply)?).await?;
            return Err(SocksError::DialFailure {
                target: request.destination.to_string(),
                source: e,
            });
        }
    };

    let reply = ConnectReply::socks4(&request, Socks4ReplyCode::Granted);
    write_reply(&mut stream, &encode_reply(&reply)?).await?;

    info!("SOCKS4 tunnel established to {}", request.destination);

    Ok(relay_tcp(stream, destination).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socks::mock::MockDialer;
    use crate::socks::tcp_relay::RelayDirection;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_serve_connect_and_relay() {
        let stream = Builder::new()
            .read(&[0x01, 0x1F, 0x90, 127, 0, 0, 1])
            .read(b"user\0")
            .write(&[0x00, 0x5A, 0x1F, 0x90, 127, 0, 0, 1])
            .read(b"hello")
            .write(b"hello")
            .build();
        let dialer = MockDialer::echo();

        let outcome = serve(stream, &dialer).await.unwrap();
        assert_eq!(outcome.direction, RelayDirection::Upstream);
        assert_eq!(outcome.bytes, Some(5));
        assert_eq!(dialer.dialed(), vec!["127.0.0.1:8080".to_string()]);
    }

    #[tokio::test]
    async fn test_serve_payload_after_user_id_is_relayed() {
        // Request and first payload bytes arrive in one segment
        let stream = Builder::new()
            .read(b"\x01\x00\x50\x7f\x00\x00\x01\x00data")
            .write(&[0x00, 0x5A, 0x00, 0x50, 127, 0, 0, 1])
            .write(b"data")
            .build();

        let outcome = serve(stream, &MockDialer::echo()).await.unwrap();
        assert_eq!(outcome.bytes, Some(4));
    }

    #[tokio::test]
    async fn test_serve_dial_failure() {
        let stream = Builder::new()
            .read(&[0x01, 0x00, 0x50, 0, 0, 0, 0, 0x00])
            .write(&[0x00, 0x5C, 0x00, 0x50, 0x00, 0x00, 0x00, 0x00])
            .build();
        let dialer = MockDialer::refuse();

        let err = serve(stream, &dialer).await.unwrap_err();
        assert!(matches!(err, SocksError::DialFailure { .. }));
        assert_eq!(dialer.dialed(), vec!["0.0.0.0:80".to_string()]);
    }

    #[tokio::test]
    async fn test_serve_bind_is_silent() {
        let stream = Builder::new().read(&[0x02]).build();
        let dialer = MockDialer::echo();

        let err = serve(stream, &dialer).await.unwrap_err();
        assert!(matches!(
            err,
            SocksError::UnsupportedCommand { command: 0x02, .. }
        ));
        assert!(!err.replied());
        assert!(dialer.dialed().is_empty());
    }

    #[tokio::test]
    async fn test_serve_socks4a_is_silent() {
        let stream = Builder::new()
            .read(&[0x01, 0x00, 0x50, 0, 0, 0, 7])
            .build();
        let dialer = MockDialer::echo();

        let err = serve(stream, &dialer).await.unwrap_err();
        assert!(matches!(err, SocksError::ProtocolViolation(_)));
        assert!(dialer.dialed().is_empty());
    }

    #[tokio::test]
    async fn test_serve_truncated_request_is_silent() {
        let stream = Builder::new().read(&[0x01, 0x00]).build();

        let err = serve(stream, &MockDialer::echo()).await.unwrap_err();
        assert!(matches!(err, SocksError::ShortRead("destination port")));
    }
}
