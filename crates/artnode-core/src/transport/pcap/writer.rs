use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::SocketAddrV4;
use std::path::Path;

use etherparse::PacketBuilder;

use super::error::CaptureError;
use super::layout;

const SOURCE_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
const TARGET_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x02];
const IP_TTL: u8 = 64;

/// Writes UDP datagrams as Ethernet frames into a pcapng capture.
///
/// The section header and single Ethernet interface are written on creation,
/// so a writer that never records a datagram still leaves a readable file.
pub struct PcapNgWriter<W: Write> {
    out: W,
    written: usize,
}

impl PcapNgWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, CaptureError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> PcapNgWriter<W> {
    pub fn new(mut out: W) -> Result<Self, CaptureError> {
        out.write_all(&block(layout::BLOCK_SECTION_HEADER, &section_header_body()))?;
        out.write_all(&block(
            layout::BLOCK_INTERFACE_DESCRIPTION,
            &interface_description_body(),
        ))?;
        Ok(Self { out, written: 0 })
    }

    /// Append one datagram captured at `ts_us` microseconds.
    pub fn write_datagram(
        &mut self,
        ts_us: u64,
        source: SocketAddrV4,
        target: SocketAddrV4,
        payload: &[u8],
    ) -> Result<(), CaptureError> {
        let frame = udp_frame(source, target, payload)?;
        self.out.write_all(&block(
            layout::BLOCK_ENHANCED_PACKET,
            &enhanced_packet_body(ts_us, &frame),
        ))?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered blocks and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, CaptureError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn udp_frame(
    source: SocketAddrV4,
    target: SocketAddrV4,
    payload: &[u8],
) -> Result<Vec<u8>, CaptureError> {
    let builder = PacketBuilder::ethernet2(SOURCE_MAC, TARGET_MAC)
        .ipv4(source.ip().octets(), target.ip().octets(), IP_TTL)
        .udp(source.port(), target.port());
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut frame, payload)
        .map_err(|e| CaptureError::Frame(e.to_string()))?;
    Ok(frame)
}

fn block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (layout::BLOCK_OVERHEAD + body.len()) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&layout::BYTE_ORDER_MAGIC.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    // Section length unknown.
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_description_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&layout::LINKTYPE_ETHERNET.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&layout::SNAPLEN.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, data: &[u8]) -> Vec<u8> {
    let ts_high = (ts_us >> 32) as u32;
    let ts_low = (ts_us & 0xFFFF_FFFF) as u32;
    let cap_len = data.len() as u32;
    let mut body = Vec::with_capacity(20 + data.len() + 3);
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&ts_high.to_be_bytes());
    body.extend_from_slice(&ts_low.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(data);
    let pad_len = (4 - (data.len() % 4)) % 4;
    body.resize(body.len() + pad_len, 0);
    body
}
