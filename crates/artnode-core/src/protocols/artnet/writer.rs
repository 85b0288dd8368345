use std::net::Ipv4Addr;
use std::ops::Range;

use super::layout;

/// Fixed-size output buffer for one Art-Net packet.
///
/// The buffer is zero-filled and sized up front from `layout`, so every
/// write lands inside it. Writers mirror `ArtNetReader`: same ranges, same
/// byte order per field.
pub struct ArtNetWriter {
    buf: Vec<u8>,
}

impl ArtNetWriter {
    /// Start a packet of `len` bytes carrying the signature and `op_code`.
    pub fn new(op_code: u16, len: usize) -> Self {
        let mut buf = vec![0u8; len.max(layout::HEADER_LEN)];
        buf[..layout::ARTNET_ID.len()].copy_from_slice(layout::ARTNET_ID);
        buf[layout::OP_CODE_RANGE].copy_from_slice(&op_code.to_le_bytes());
        Self { buf }
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> &mut Self {
        self.buf[offset] = value;
        self
    }

    pub fn write_u16_be(&mut self, range: Range<usize>, value: u16) -> &mut Self {
        self.buf[range].copy_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_ipv4(&mut self, range: Range<usize>, value: Ipv4Addr) -> &mut Self {
        self.buf[range].copy_from_slice(&value.octets());
        self
    }

    pub fn write_slice(&mut self, range: Range<usize>, bytes: &[u8]) -> &mut Self {
        self.buf[range].copy_from_slice(bytes);
        self
    }

    pub fn write_protocol_version(&mut self) -> &mut Self {
        self.write_u16_be(layout::PROT_VER_RANGE, layout::PROTOCOL_VERSION)
    }

    /// Append a variable-length tail after the fixed header.
    pub fn extend(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::ArtNetWriter;
    use crate::protocols::artnet::layout;

    #[test]
    fn header_is_signature_then_little_endian_opcode() {
        let bytes = ArtNetWriter::new(layout::OP_POLL_REPLY, layout::poll_reply::LEN).finish();
        assert_eq!(bytes.len(), layout::poll_reply::LEN);
        assert_eq!(&bytes[..8], b"Art-Net\0");
        assert_eq!(&bytes[8..10], &[0x00, 0x21]);
    }

    #[test]
    fn protocol_version_is_big_endian() {
        let mut writer = ArtNetWriter::new(layout::OP_POLL, layout::poll::LEN);
        writer.write_protocol_version();
        let bytes = writer.finish();
        assert_eq!(&bytes[10..12], &[0x00, 14]);
    }
}
