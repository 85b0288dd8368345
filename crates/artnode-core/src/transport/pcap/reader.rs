use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::error::CaptureError;
use super::layout;

/// Peek at the 4-byte file magic, leaving the reader at offset 0.
///
/// # Errors
/// Returns `CaptureError::Io` when the file is shorter than the magic or
/// cannot be rewound.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], CaptureError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Linktype of a pcapng interface; unknown interfaces are treated as Ethernet.
pub fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    linktypes
        .get(if_id as usize)
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

/// Enhanced-packet timestamp (microsecond resolution) in seconds.
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let ts = ((ts_high as u64) << 32) | (ts_low as u64);
    ts as f64 * 1e-6
}

pub fn legacy_ts_to_seconds(ts_sec: u32, ts_usec: u32) -> f64 {
    ts_sec as f64 + ts_usec as f64 * 1e-6
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use pcap_parser::Linktype;

    use super::{
        is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
        read_magic_and_rewind,
    };
    use crate::transport::pcap::error::CaptureError;
    use crate::transport::pcap::layout;

    #[test]
    fn magic_is_peeked_not_consumed() {
        let mut cursor = Cursor::new([0x0a, 0x0d, 0x0d, 0x0a, 0x01]);
        let magic = read_magic_and_rewind(&mut cursor).unwrap();
        assert!(is_pcapng_magic(&magic));
        let mut first = [0u8; 1];
        cursor.read_exact(&mut first).unwrap();
        assert_eq!(first[0], layout::PCAPNG_MAGIC[0]);
    }

    #[test]
    fn short_file_is_io_error() {
        let mut cursor = Cursor::new([0x0a, 0x0d]);
        let err = read_magic_and_rewind(&mut cursor).unwrap_err();
        assert!(matches!(err, CaptureError::Io(_)));
    }

    #[test]
    fn unknown_interface_defaults_to_ethernet() {
        let linktypes = [Linktype::RAW];
        assert_eq!(linktype_for_interface(&linktypes, 0), Linktype::RAW);
        assert_eq!(linktype_for_interface(&linktypes, 3), Linktype::ETHERNET);
    }

    #[test]
    fn timestamps_in_seconds() {
        assert!((pcapng_ts_to_seconds(0, 2_500_000) - 2.5).abs() < f64::EPSILON);
        assert!((legacy_ts_to_seconds(3, 250_000) - 3.25).abs() < f64::EPSILON);
    }
}
