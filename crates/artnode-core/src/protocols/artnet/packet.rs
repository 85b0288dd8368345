use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;

use super::command::{AddressCommand, TodScope};
use super::flags::{IpCommand, PollFlags};
use super::layout;
use super::name::{LongName, NodeReport, ShortName};
use super::uid::Uid;

/// Operation codes handled by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpCode {
    Poll,
    PollReply,
    Dmx,
    Address,
    TodRequest,
    TodData,
    IpProg,
    IpProgReply,
}

impl OpCode {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            layout::OP_POLL => Some(Self::Poll),
            layout::OP_POLL_REPLY => Some(Self::PollReply),
            layout::OP_DMX => Some(Self::Dmx),
            layout::OP_ADDRESS => Some(Self::Address),
            layout::OP_TOD_REQUEST => Some(Self::TodRequest),
            layout::OP_TOD_DATA => Some(Self::TodData),
            layout::OP_IP_PROG => Some(Self::IpProg),
            layout::OP_IP_PROG_REPLY => Some(Self::IpProgReply),
            _ => None,
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Self::Poll => layout::OP_POLL,
            Self::PollReply => layout::OP_POLL_REPLY,
            Self::Dmx => layout::OP_DMX,
            Self::Address => layout::OP_ADDRESS,
            Self::TodRequest => layout::OP_TOD_REQUEST,
            Self::TodData => layout::OP_TOD_DATA,
            Self::IpProg => layout::OP_IP_PROG,
            Self::IpProgReply => layout::OP_IP_PROG_REPLY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Poll => "OpPoll",
            Self::PollReply => "OpPollReply",
            Self::Dmx => "OpDmx",
            Self::Address => "OpAddress",
            Self::TodRequest => "OpTodRequest",
            Self::TodData => "OpTodData",
            Self::IpProg => "OpIpProg",
            Self::IpProgReply => "OpIpProgReply",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04x})", self.name(), self.as_u16())
    }
}

/// 15-bit universe address: net (7 bits), sub-net (4 bits), universe (4 bits).
///
/// # Examples
/// ```
/// use artnode_core::PortAddress;
///
/// let addr = PortAddress::from_parts(1, 2, 3);
/// assert_eq!(addr.as_u16(), 0x0123);
/// assert_eq!(addr.sub_uni(), 0x23);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PortAddress(u16);

impl PortAddress {
    pub const MAX: u16 = 0x7FFF;

    pub fn new(value: u16) -> Self {
        Self(value & Self::MAX)
    }

    pub fn from_parts(net: u8, sub_net: u8, universe: u8) -> Self {
        Self::new(
            (u16::from(net & 0x7F) << 8) | (u16::from(sub_net & 0x0F) << 4) | u16::from(universe & 0x0F),
        )
    }

    /// ArtDmx carries the address as SubUni (low byte) + Net (high 7 bits).
    pub fn from_wire(sub_uni: u8, net: u8) -> Self {
        Self::new((u16::from(net & 0x7F) << 8) | u16::from(sub_uni))
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    pub fn net(self) -> u8 {
        (self.0 >> 8) as u8 & 0x7F
    }

    pub fn sub_net(self) -> u8 {
        (self.0 >> 4) as u8 & 0x0F
    }

    pub fn universe(self) -> u8 {
        self.0 as u8 & 0x0F
    }

    pub fn sub_uni(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.net(), self.sub_net(), self.universe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtPoll {
    pub protocol_version: u16,
    pub flags: PollFlags,
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtPollReply {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub version_hi: u8,
    pub version_lo: u8,
    pub net_switch: u8,
    pub sub_switch: u8,
    pub oem: u16,
    pub ubea_version: u8,
    pub status1: u8,
    pub esta_manufacturer: u16,
    pub short_name: ShortName,
    pub long_name: LongName,
    pub node_report: NodeReport,
    pub num_ports: u16,
    pub port_types: [u8; layout::MAX_PORTS],
    pub good_input: [u8; layout::MAX_PORTS],
    pub good_output: [u8; layout::MAX_PORTS],
    pub sw_in: [u8; layout::MAX_PORTS],
    pub sw_out: [u8; layout::MAX_PORTS],
    pub sw_video: u8,
    pub sw_macro: u8,
    pub sw_remote: u8,
    pub style: u8,
    pub mac: [u8; 6],
    pub bind_ip: Ipv4Addr,
    pub bind_index: u8,
    pub status2: u8,
}

/// ArtDmx frame; `data` borrows from the received datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtDmx<'a> {
    pub protocol_version: u16,
    /// 0 disables sequencing.
    pub sequence: u8,
    pub physical: u8,
    pub sub_uni: u8,
    pub net: u8,
    pub data: &'a [u8],
}

impl ArtDmx<'_> {
    pub fn port_address(&self) -> PortAddress {
        PortAddress::from_wire(self.sub_uni, self.net)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtIpProg {
    pub protocol_version: u16,
    pub command: IpCommand,
    pub ip: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtIpProgReply {
    pub protocol_version: u16,
    pub ip: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub port: u16,
    pub dhcp: bool,
}

/// ArtAddress request. Empty names decode as `None` ("no change").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtAddress {
    pub protocol_version: u16,
    pub net_switch: u8,
    pub bind_index: u8,
    pub short_name: Option<ShortName>,
    pub long_name: Option<LongName>,
    pub sw_in: [u8; layout::MAX_PORTS],
    pub sw_out: [u8; layout::MAX_PORTS],
    pub sub_switch: u8,
    pub sw_video: u8,
    pub command: AddressCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtTodRequest {
    pub protocol_version: u16,
    pub net: u8,
    pub scope: TodScope,
    /// Low bytes of the requested Port-Addresses; `AdCount` on the wire.
    pub addresses: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtTodData {
    pub protocol_version: u16,
    pub rdm_version: u8,
    pub port: u8,
    pub bind_index: u8,
    pub net: u8,
    pub command_response: u8,
    pub address: u8,
    /// Devices in the whole logical response, identical across its blocks.
    pub uid_total: u16,
    pub block_count: u8,
    pub uids: Vec<Uid>,
}

/// One decoded datagram, discriminated by opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtPacket<'a> {
    Poll(ArtPoll),
    PollReply(Box<ArtPollReply>),
    Dmx(ArtDmx<'a>),
    IpProg(ArtIpProg),
    IpProgReply(ArtIpProgReply),
    Address(Box<ArtAddress>),
    TodRequest(ArtTodRequest),
    TodData(ArtTodData),
    /// Valid signature, opcode this node does not handle.
    Unrecognized(u16),
}

impl ArtPacket<'_> {
    pub fn op_code(&self) -> u16 {
        match self {
            Self::Poll(_) => layout::OP_POLL,
            Self::PollReply(_) => layout::OP_POLL_REPLY,
            Self::Dmx(_) => layout::OP_DMX,
            Self::IpProg(_) => layout::OP_IP_PROG,
            Self::IpProgReply(_) => layout::OP_IP_PROG_REPLY,
            Self::Address(_) => layout::OP_ADDRESS,
            Self::TodRequest(_) => layout::OP_TOD_REQUEST,
            Self::TodData(_) => layout::OP_TOD_DATA,
            Self::Unrecognized(op) => *op,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OpCode, PortAddress};

    #[test]
    fn opcode_table_is_bijective() {
        for op in [
            OpCode::Poll,
            OpCode::PollReply,
            OpCode::Dmx,
            OpCode::Address,
            OpCode::TodRequest,
            OpCode::TodData,
            OpCode::IpProg,
            OpCode::IpProgReply,
        ] {
            assert_eq!(OpCode::from_u16(op.as_u16()), Some(op));
        }
        assert_eq!(OpCode::from_u16(0x9700), None);
    }

    #[test]
    fn port_address_parts() {
        let addr = PortAddress::from_wire(0x4f, 0x85);
        assert_eq!(addr.net(), 0x05);
        assert_eq!(addr.sub_net(), 0x4);
        assert_eq!(addr.universe(), 0xf);
        assert_eq!(addr.to_string(), "5:4:15");
    }
}
