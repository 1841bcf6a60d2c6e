//! Server configuration loaded from the environment

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Port used when `PORT` is unset
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        }
    }
}

/// Invalid configuration value
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}")]
    Port(String),

    #[error("invalid HOST value {0:?}")]
    Host(String),
}

impl ServerConfig {
    /// Load from `HOST` and `PORT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::var("HOST").ok(), std::env::var("PORT").ok())
    }

    fn from_vars(host: Option<String>, port: Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let ip = match host.filter(|host| !host.is_empty()) {
            Some(host) => host.parse::<IpAddr>().map_err(|_| ConfigError::Host(host))?,
            None => defaults.bind_addr.ip(),
        };

        let port = match port.filter(|port| !port.is_empty()) {
            Some(port) => port.parse::<u16>().map_err(|_| ConfigError::Port(port))?,
            None => defaults.bind_addr.port(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_port_3000_on_all_interfaces() {
        let config = ServerConfig::from_vars(None, None).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.bind_addr.ip().is_unspecified());
    }

    #[test]
    fn reads_host_and_port() {
        let config =
            ServerConfig::from_vars(Some("127.0.0.1".into()), Some("8080".into())).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            ServerConfig::from_vars(None, Some("http".into())),
            Err(ConfigError::Port(_))
        ));
        assert!(matches!(
            ServerConfig::from_vars(Some("localhost:1".into()), None),
            Err(ConfigError::Host(_))
        ));
    }
}
