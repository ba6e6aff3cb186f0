//! Server configuration types
//!
//! Defines the listener and outbound connection settings for the relay.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Default bind address
fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

/// Default listening port
fn default_port() -> u16 {
    1080
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Listener and dialing configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port to listen for connections on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout in seconds for dialing a destination; unbounded when absent
    #[serde(default)]
    pub connect_timeout: Option<u64>,

    /// Socket options applied to client and destination connections
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            connect_timeout: None,
            tcp: TcpConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Address string suitable for `TcpListener::bind`
    pub fn listen_addr(&self) -> String {
        match self.bind_addr.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            _ => format!("{}:{}", self.bind_addr, self.port),
        }
    }

    /// Dial timeout as a [`Duration`], if one is configured
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_addr.trim().is_empty() {
            return Err("bind_addr must not be empty".to_string());
        }
        if self.connect_timeout == Some(0) {
            return Err("connect_timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Default TCP_NODELAY setting
fn default_nodelay() -> bool {
    true
}

/// Default keepalive seconds
fn default_keepalive_secs() -> u64 {
    20
}

/// Default keepalive interval
fn default_keepalive_interval() -> u64 {
    8
}

/// TCP socket configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TcpConfig {
    /// Enable TCP_NODELAY
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,

    /// TCP keepalive timeout in seconds
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,

    /// TCP keepalive interval in seconds
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval: u64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            nodelay: default_nodelay(),
            keepalive_secs: default_keepalive_secs(),
            keepalive_interval: default_keepalive_interval(),
        }
    }
}
