use serde::{Deserialize, Serialize};

const PROTOCOL_MASK: u8 = 0x3F;
const INPUT_BIT: u8 = 0x40;
const OUTPUT_BIT: u8 = 0x80;

/// Protocol carried by a port (low six bits of the port-type byte).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortProtocol {
    #[default]
    Dmx,
    Midi,
    Avab,
    Cmx,
    Adb,
    ArtNet,
    Other(u8),
}

impl PortProtocol {
    pub fn from_bits(value: u8) -> Self {
        match value & PROTOCOL_MASK {
            0 => Self::Dmx,
            1 => Self::Midi,
            2 => Self::Avab,
            3 => Self::Cmx,
            4 => Self::Adb,
            5 => Self::ArtNet,
            other => Self::Other(other),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Dmx => 0,
            Self::Midi => 1,
            Self::Avab => 2,
            Self::Cmx => 3,
            Self::Adb => 4,
            Self::ArtNet => 5,
            Self::Other(value) => value & PROTOCOL_MASK,
        }
    }
}

/// Port-type byte: protocol kind plus input/output direction bits.
///
/// # Examples
/// ```
/// use artnode_core::{PortProtocol, PortType};
///
/// let kind = PortType::output(PortProtocol::Dmx);
/// assert_eq!(kind.to_byte(), 0x80);
/// assert_eq!(PortType::from_byte(0xc5).protocol, PortProtocol::ArtNet);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortType {
    pub protocol: PortProtocol,
    pub input: bool,
    pub output: bool,
}

impl PortType {
    pub fn output(protocol: PortProtocol) -> Self {
        Self {
            protocol,
            input: false,
            output: true,
        }
    }

    pub fn input(protocol: PortProtocol) -> Self {
        Self {
            protocol,
            input: true,
            output: false,
        }
    }

    pub fn from_byte(value: u8) -> Self {
        Self {
            protocol: PortProtocol::from_bits(value),
            input: value & INPUT_BIT != 0,
            output: value & OUTPUT_BIT != 0,
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut value = self.protocol.bits();
        if self.input {
            value |= INPUT_BIT;
        }
        if self.output {
            value |= OUTPUT_BIT;
        }
        value
    }
}

/// How an output port combines two controllers sending the same universe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    #[default]
    Htp,
    Ltp,
}

/// Protocol an output port takes its data from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputProtocol {
    #[default]
    ArtNet,
    Sacn,
}

/// Front-panel indicator state, reported in Status1 bits 7-6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Unknown,
    Locate,
    Mute,
    #[default]
    Normal,
}

impl Indicator {
    pub fn status1_bits(self) -> u8 {
        match self {
            Self::Unknown => 0x00,
            Self::Locate => 0x40,
            Self::Mute => 0x80,
            Self::Normal => 0xC0,
        }
    }
}

/// Per-port slot of the node configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PortConfig {
    pub kind: PortType,
    /// Universe nibble (0-15) for the input direction.
    pub input_address: u8,
    /// Universe nibble (0-15) for the output direction.
    pub output_address: u8,
    pub merge: MergeMode,
    pub output_protocol: OutputProtocol,
}

#[cfg(test)]
mod tests {
    use super::{Indicator, PortProtocol, PortType};

    #[test]
    fn port_type_byte_layout() {
        let kind = PortType {
            protocol: PortProtocol::Midi,
            input: true,
            output: true,
        };
        assert_eq!(kind.to_byte(), 0xc1);
        assert_eq!(PortType::from_byte(0xc1), kind);
    }

    #[test]
    fn unknown_protocol_is_kept() {
        let kind = PortType::from_byte(0x89);
        assert_eq!(kind.protocol, PortProtocol::Other(9));
        assert_eq!(kind.to_byte(), 0x89);
    }

    #[test]
    fn indicator_bits() {
        assert_eq!(Indicator::Locate.status1_bits(), 0x40);
        assert_eq!(Indicator::default().status1_bits(), 0xc0);
    }
}
