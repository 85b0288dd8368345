use thiserror::Error;

/// Errors returned by configuration setters.
///
/// # Examples
/// ```
/// use artnode_core::{ConfigError, NodeConfig};
///
/// let mut config = NodeConfig::default();
/// config.set_port_count(1);
/// let err = config.set_port_address(2, 0).unwrap_err();
/// assert_eq!(err, ConfigError::PortOutOfRange { port: 2, count: 1 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("port {port} out of range: node has {count} port(s)")]
    PortOutOfRange { port: u8, count: u8 },
}
