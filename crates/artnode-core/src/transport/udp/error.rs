use thiserror::Error;

/// A captured frame that claims to carry a datagram but cannot be sliced.
///
/// # Examples
/// ```
/// use artnode_core::transport::udp::UdpError;
///
/// let err = UdpError::TruncatedHeader { needed: 8, actual: 3 };
/// assert_eq!(err.to_string(), "UDP header truncated: need 8 bytes, got 3");
/// ```
#[derive(Debug, Error)]
pub enum UdpError {
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("frame has no IP layer")]
    NoNetworkLayer,
    #[error("IP packet has no payload")]
    NoIpPayload,
    #[error("UDP header truncated: need {needed} bytes, got {actual}")]
    TruncatedHeader { needed: usize, actual: usize },
}
