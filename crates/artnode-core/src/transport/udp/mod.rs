//! UDP extraction from captured link-layer frames.

pub mod error;
pub mod parser;

pub use error::UdpError;
pub use parser::{UdpDatagram, parse_udp_datagram};

/// Length of the UDP header stripped before the payload.
pub const UDP_HEADER_LEN: usize = 8;
