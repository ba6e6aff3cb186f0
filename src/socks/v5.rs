//! SOCKS5 session state machine
//!
//! Method negotiation, one CONNECT request, then the relay. Only the
//! no-authentication method is offered.

use super::codec::v5::{encode_reply, read_connect_request, read_method_offer, MethodChoice};
use super::handler::write_reply;
use super::tcp_relay::{relay_tcp, RelayOutcome};
use super::types::{ConnectReply, SocksCommand};
use crate::error::{Socks5ReplyCode, SocksError};
use crate::transport::Dialer;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Serve a SOCKS5 session whose version byte has already been read
///
/// # Protocol Flow
///
/// 1. Method negotiation (`05 00`, or `05 FF` and close)
/// 2. Request parsing
/// 3. Dial the destination, reply with the outcome
/// 4. Relay until either side closes
///
/// Commands other than CONNECT get REP 0x07. A failed dial gets REP 0x01.
/// Both replies echo the requested address.
pub async fn serve<S, D>(mut stream: S, dialer: &D) -> Result<RelayOutcome, SocksError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    D: Dialer,
{
    let offer = read_method_offer(&mut stream).await?;
    let choice = MethodChoice::select(&offer);
    write_reply(&mut stream, &choice.to_bytes()).await?;

    if !choice.is_acceptable() {
        debug!("No acceptable method in offer {:?}", offer.methods());
        return Err(SocksError::NoAcceptableMethod);
    }

    let request = read_connect_request(&mut stream).await?;
    info!("SOCKS5 {} request to {}", request.command, request.destination);

    if request.command != SocksCommand::Connect {
        warn!("SOCKS5 {} command not supported", request.command);
        let reply = ConnectReply::socks5(&request, Socks5ReplyCode::CommandNotSupported);
        write_reply(&mut stream, &encode_reply(&reply)?).await?;
        return Err(SocksError::UnsupportedCommand {
            version: request.version,
            command: request.command.to_byte(),
        });
    }

    let destination = match dialer.dial(&request.destination).await {
        Ok(destination) => destination,
        Err(e) => {
            warn!("Failed to connect to {}: {}", request.destination, e);
            let reply = ConnectReply::socks5(&request, Socks5ReplyCode::GeneralFailure);
            write_reply(&mut stream, &encode_reply(&reply)?).await?;
            return Err(SocksError::DialFailure {
                target: request.destination.to_string(),
                source: e,
            });
        }
    };

    let reply = ConnectReply::socks5(&request, Socks5ReplyCode::Succeeded);
    write_reply(&mut stream, &encode_reply(&reply)?).await?;

    info!("SOCKS5 tunnel established to {}", request.destination);

    Ok(relay_tcp(stream, destination).await)
}
