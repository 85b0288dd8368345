//! Transport boundary.
//!
//! The engine never opens sockets. It receives one datagram at a time from
//! its host and hands replies to a `DatagramSink`. Captures are the second
//! source of traffic: `PacketSource` yields link-layer frames from a pcap or
//! pcapng file, and `udp` extracts the datagrams inside them.

use std::io;
use std::net::{SocketAddrV4, UdpSocket};

use pcap_parser::Linktype;
use thiserror::Error;

mod pcap;
pub mod udp;

pub use pcap::error::CaptureError;
pub use pcap::{PcapFileSource, PcapNgWriter};

/// Destination for encoded reply packets. Delivery is best-effort.
pub trait DatagramSink {
    fn send_datagram(&mut self, payload: &[u8], target: SocketAddrV4) -> io::Result<()>;
}

impl DatagramSink for UdpSocket {
    fn send_datagram(&mut self, payload: &[u8], target: SocketAddrV4) -> io::Result<()> {
        UdpSocket::send_to(self, payload, target).map(|_| ())
    }
}

impl<S: DatagramSink + ?Sized> DatagramSink for &mut S {
    fn send_datagram(&mut self, payload: &[u8], target: SocketAddrV4) -> io::Result<()> {
        (**self).send_datagram(payload, target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDatagram {
    pub target: SocketAddrV4,
    pub payload: Vec<u8>,
}

/// Sink that keeps every datagram instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Vec<SentDatagram>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> &[SentDatagram] {
        &self.sent
    }

    pub fn take(&mut self) -> Vec<SentDatagram> {
        std::mem::take(&mut self.sent)
    }
}

impl DatagramSink for RecordingSink {
    fn send_datagram(&mut self, payload: &[u8], target: SocketAddrV4) -> io::Result<()> {
        self.sent.push(SentDatagram {
            target,
            payload: payload.to_vec(),
        });
        Ok(())
    }
}

/// One captured link-layer frame.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::CaptureError> for SourceError {
    fn from(value: pcap::error::CaptureError) -> Self {
        match value {
            pcap::error::CaptureError::Io(err) => SourceError::Io(err),
            pcap::error::CaptureError::Format { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
            pcap::error::CaptureError::Frame(message) => SourceError::Pcap(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use super::{DatagramSink, RecordingSink};

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        let target = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 6454);
        sink.send_datagram(&[1], target).unwrap();
        sink.send_datagram(&[2], target).unwrap();
        let sent = sink.take();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].payload, vec![2]);
        assert!(sink.sent().is_empty());
    }
}
