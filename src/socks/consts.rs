//! SOCKS protocol constants
//!
//! Defines all constants used by the SOCKS4 and SOCKS5 implementations.

/// SOCKS4 protocol version
pub const SOCKS4_VERSION: u8 = 0x04;

/// Version byte carried by SOCKS4 replies
pub const SOCKS4_REPLY_VERSION: u8 = 0x00;

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

// Authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
/// No acceptable methods
pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

// Commands, shared by both versions
/// TCP CONNECT command
pub const SOCKS_CMD_TCP_CONNECT: u8 = 0x01;
/// TCP BIND command (not implemented)
pub const SOCKS_CMD_TCP_BIND: u8 = 0x02;
/// UDP ASSOCIATE command (SOCKS5 only, not implemented)
pub const SOCKS5_CMD_UDP_ASSOCIATE: u8 = 0x03;

// Address types
/// Reserved address type, encoded like IPv4 in replies
pub const SOCKS5_ADDR_TYPE_UNSPECIFIED: u8 = 0x00;
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

// Reserved byte
/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// Sizes
/// Maximum domain name length expressible in one length byte
pub const MAX_DOMAIN_LEN: usize = 255;
/// Length of a SOCKS4 reply
pub const SOCKS4_REPLY_LEN: usize = 8;
