use serde::{Deserialize, Serialize};

/// ArtAddress command byte (Art-Net 4 `AcCommand` table).
///
/// Port-scoped commands carry the port index in their low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "command", content = "port")]
pub enum AddressCommand {
    None,
    CancelMerge,
    LedNormal,
    LedMute,
    LedLocate,
    ResetRxFlags,
    MergeLtp(u8),
    MergeHtp(u8),
    ArtNetSelect(u8),
    AcnSelect(u8),
    ClearOutput(u8),
    Unknown(u8),
}

const AC_NONE: u8 = 0x00;
const AC_CANCEL_MERGE: u8 = 0x01;
const AC_LED_NORMAL: u8 = 0x02;
const AC_LED_MUTE: u8 = 0x03;
const AC_LED_LOCATE: u8 = 0x04;
const AC_RESET_RX_FLAGS: u8 = 0x05;
const AC_MERGE_LTP: u8 = 0x10;
const AC_MERGE_HTP: u8 = 0x50;
const AC_ART_NET_SEL: u8 = 0x60;
const AC_ACN_SEL: u8 = 0x70;
const AC_CLEAR_OP: u8 = 0x90;
const PORT_MASK: u8 = 0x03;

impl AddressCommand {
    pub fn from_byte(value: u8) -> Self {
        let port = value & PORT_MASK;
        match value {
            AC_NONE => Self::None,
            AC_CANCEL_MERGE => Self::CancelMerge,
            AC_LED_NORMAL => Self::LedNormal,
            AC_LED_MUTE => Self::LedMute,
            AC_LED_LOCATE => Self::LedLocate,
            AC_RESET_RX_FLAGS => Self::ResetRxFlags,
            0x10..=0x13 => Self::MergeLtp(port),
            0x50..=0x53 => Self::MergeHtp(port),
            0x60..=0x63 => Self::ArtNetSelect(port),
            0x70..=0x73 => Self::AcnSelect(port),
            0x90..=0x93 => Self::ClearOutput(port),
            other => Self::Unknown(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::None => AC_NONE,
            Self::CancelMerge => AC_CANCEL_MERGE,
            Self::LedNormal => AC_LED_NORMAL,
            Self::LedMute => AC_LED_MUTE,
            Self::LedLocate => AC_LED_LOCATE,
            Self::ResetRxFlags => AC_RESET_RX_FLAGS,
            Self::MergeLtp(port) => AC_MERGE_LTP | (port & PORT_MASK),
            Self::MergeHtp(port) => AC_MERGE_HTP | (port & PORT_MASK),
            Self::ArtNetSelect(port) => AC_ART_NET_SEL | (port & PORT_MASK),
            Self::AcnSelect(port) => AC_ACN_SEL | (port & PORT_MASK),
            Self::ClearOutput(port) => AC_CLEAR_OP | (port & PORT_MASK),
            Self::Unknown(value) => value,
        }
    }

    /// Port index addressed by a port-scoped command.
    pub fn port(self) -> Option<u8> {
        match self {
            Self::MergeLtp(port)
            | Self::MergeHtp(port)
            | Self::ArtNetSelect(port)
            | Self::AcnSelect(port)
            | Self::ClearOutput(port) => Some(port),
            _ => None,
        }
    }
}

/// Scope of an ArtTodRequest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodScope {
    /// Entire table of devices.
    Full,
    /// Only devices added or removed since the last full table.
    Changed,
}

const TOD_FULL: u8 = 0x00;
const TOD_CHANGED: u8 = 0x01;

impl TodScope {
    /// Unrecognised command bytes fall back to a full table.
    pub fn from_byte(value: u8) -> Self {
        match value {
            TOD_CHANGED => Self::Changed,
            _ => Self::Full,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Full => TOD_FULL,
            Self::Changed => TOD_CHANGED,
        }
    }
}
