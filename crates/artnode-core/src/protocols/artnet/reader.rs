use std::net::Ipv4Addr;
use std::ops::Range;

use super::error::ArtNetError;
use super::layout;

/// Bounds-checked reads over one received datagram.
///
/// Art-Net mixes byte orders: the opcode is little-endian, every other
/// multi-byte field is big-endian. Each accessor names the order it uses.
pub struct ArtNetReader<'a> {
    payload: &'a [u8],
}

impl<'a> ArtNetReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), ArtNetError> {
        if self.payload.len() < needed {
            return Err(ArtNetError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, ArtNetError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(ArtNetError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_u16_le(&self, range: Range<usize>) -> Result<u16, ArtNetError> {
        let [lo, hi] = self.read_array::<2>(range)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub fn read_u16_be(&self, range: Range<usize>) -> Result<u16, ArtNetError> {
        let [hi, lo] = self.read_array::<2>(range)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    pub fn read_ipv4(&self, range: Range<usize>) -> Result<Ipv4Addr, ArtNetError> {
        Ok(Ipv4Addr::from(self.read_array::<4>(range)?))
    }

    pub fn read_array<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], ArtNetError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| ArtNetError::TooShort {
            needed: N,
            actual: bytes.len(),
        })
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], ArtNetError> {
        self.payload
            .get(range.clone())
            .ok_or(ArtNetError::TooShort {
                needed: range.end,
                actual: self.payload.len(),
            })
    }

    pub fn read_signature(&self) -> Result<&'a [u8], ArtNetError> {
        self.read_slice(0..layout::ARTNET_ID.len())
    }

    pub fn read_protocol_version(&self) -> Result<u16, ArtNetError> {
        self.read_u16_be(layout::PROT_VER_RANGE)
    }
}
