use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RDM unique device identifier: 16-bit ESTA manufacturer id + 32-bit device id.
///
/// Text form is `mmmm:dddddddd` in hexadecimal.
///
/// # Examples
/// ```
/// use artnode_core::Uid;
///
/// let uid: Uid = "7a70:00000001".parse()?;
/// assert_eq!(uid.manufacturer(), 0x7a70);
/// assert_eq!(uid.to_bytes(), [0x7a, 0x70, 0, 0, 0, 1]);
/// # Ok::<(), artnode_core::UidParseError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid([u8; 6]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid UID '{0}': expected mmmm:dddddddd (hex)")]
pub struct UidParseError(pub String);

impl Uid {
    pub fn new(manufacturer: u16, device: u32) -> Self {
        let mut bytes = [0u8; 6];
        bytes[..2].copy_from_slice(&manufacturer.to_be_bytes());
        bytes[2..].copy_from_slice(&device.to_be_bytes());
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; 6] {
        self.0
    }

    pub fn manufacturer(self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    pub fn device(self) -> u32 {
        u32::from_be_bytes([self.0[2], self.0[3], self.0[4], self.0[5]])
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:08x}", self.manufacturer(), self.device())
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({self})")
    }
}

impl FromStr for Uid {
    type Err = UidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || UidParseError(s.to_string());
        let (man, dev) = s.split_once(':').ok_or_else(err)?;
        if man.len() != 4 || dev.len() != 8 {
            return Err(err());
        }
        let manufacturer = u16::from_str_radix(man, 16).map_err(|_| err())?;
        let device = u32::from_str_radix(dev, 16).map_err(|_| err())?;
        Ok(Self::new(manufacturer, device))
    }
}

impl TryFrom<String> for Uid {
    type Error = UidParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Uid> for String {
    fn from(value: Uid) -> Self {
        value.to_string()
    }
}
