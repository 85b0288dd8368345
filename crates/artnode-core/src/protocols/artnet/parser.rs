use super::command::{AddressCommand, TodScope};
use super::error::ArtNetError;
use super::flags::{IpCommand, IpStatus, PollFlags};
use super::layout;
use super::name::{FixedName, LongName, NodeReport, ShortName};
use super::packet::{
    ArtAddress, ArtDmx, ArtIpProg, ArtIpProgReply, ArtPacket, ArtPoll, ArtPollReply, ArtTodData,
    ArtTodRequest,
};
use super::reader::ArtNetReader;
use super::uid::Uid;

/// Validate the signature and return the opcode (little-endian on the wire).
///
/// Anything shorter than the 10-byte header, or not starting with
/// `Art-Net\0`, is `NotArtNet`.
pub fn parse_header(payload: &[u8]) -> Result<u16, ArtNetError> {
    let reader = ArtNetReader::new(payload);
    if reader.require_len(layout::HEADER_LEN).is_err() {
        return Err(ArtNetError::NotArtNet);
    }
    if reader.read_signature()? != layout::ARTNET_ID {
        return Err(ArtNetError::NotArtNet);
    }
    reader.read_u16_le(layout::OP_CODE_RANGE)
}

/// Frame and decode one datagram into exactly one packet variant.
pub fn parse_packet(payload: &[u8]) -> Result<ArtPacket<'_>, ArtNetError> {
    let op_code = parse_header(payload)?;
    let packet = match op_code {
        layout::OP_POLL => ArtPacket::Poll(parse_poll(payload)?),
        layout::OP_POLL_REPLY => ArtPacket::PollReply(Box::new(parse_poll_reply(payload)?)),
        layout::OP_DMX => ArtPacket::Dmx(parse_dmx(payload)?),
        layout::OP_IP_PROG => ArtPacket::IpProg(parse_ip_prog(payload)?),
        layout::OP_IP_PROG_REPLY => ArtPacket::IpProgReply(parse_ip_prog_reply(payload)?),
        layout::OP_ADDRESS => ArtPacket::Address(Box::new(parse_address(payload)?)),
        layout::OP_TOD_REQUEST => ArtPacket::TodRequest(parse_tod_request(payload)?),
        layout::OP_TOD_DATA => ArtPacket::TodData(parse_tod_data(payload)?),
        other => ArtPacket::Unrecognized(other),
    };
    Ok(packet)
}

pub fn parse_poll(payload: &[u8]) -> Result<ArtPoll, ArtNetError> {
    use layout::poll;

    let reader = ArtNetReader::new(payload);
    reader.require_len(poll::LEN)?;
    Ok(ArtPoll {
        protocol_version: reader.read_protocol_version()?,
        flags: PollFlags::from_bits_retain(reader.read_u8(poll::FLAGS_OFFSET)?),
        priority: reader.read_u8(poll::PRIORITY_OFFSET)?,
    })
}

pub fn parse_poll_reply(payload: &[u8]) -> Result<ArtPollReply, ArtNetError> {
    use layout::poll_reply as pr;

    let reader = ArtNetReader::new(payload);
    reader.require_len(pr::LEN)?;
    let esta_lo = reader.read_u8(pr::ESTA_MAN_LO_OFFSET)?;
    let esta_hi = reader.read_u8(pr::ESTA_MAN_HI_OFFSET)?;
    Ok(ArtPollReply {
        ip: reader.read_ipv4(pr::IP_RANGE)?,
        port: reader.read_u16_be(pr::PORT_RANGE)?,
        version_hi: reader.read_u8(pr::VERSION_HI_OFFSET)?,
        version_lo: reader.read_u8(pr::VERSION_LO_OFFSET)?,
        net_switch: reader.read_u8(pr::NET_SWITCH_OFFSET)?,
        sub_switch: reader.read_u8(pr::SUB_SWITCH_OFFSET)?,
        oem: reader.read_u16_be(pr::OEM_RANGE)?,
        ubea_version: reader.read_u8(pr::UBEA_VERSION_OFFSET)?,
        status1: reader.read_u8(pr::STATUS1_OFFSET)?,
        esta_manufacturer: u16::from_le_bytes([esta_lo, esta_hi]),
        short_name: ShortName::from_field(reader.read_slice(pr::SHORT_NAME_RANGE)?),
        long_name: LongName::from_field(reader.read_slice(pr::LONG_NAME_RANGE)?),
        node_report: NodeReport::from_field(reader.read_slice(pr::NODE_REPORT_RANGE)?),
        num_ports: reader.read_u16_be(pr::NUM_PORTS_RANGE)?,
        port_types: reader.read_array(pr::PORT_TYPES_RANGE)?,
        good_input: reader.read_array(pr::GOOD_INPUT_RANGE)?,
        good_output: reader.read_array(pr::GOOD_OUTPUT_RANGE)?,
        sw_in: reader.read_array(pr::SW_IN_RANGE)?,
        sw_out: reader.read_array(pr::SW_OUT_RANGE)?,
        sw_video: reader.read_u8(pr::SW_VIDEO_OFFSET)?,
        sw_macro: reader.read_u8(pr::SW_MACRO_OFFSET)?,
        sw_remote: reader.read_u8(pr::SW_REMOTE_OFFSET)?,
        style: reader.read_u8(pr::STYLE_OFFSET)?,
        mac: reader.read_array(pr::MAC_RANGE)?,
        bind_ip: reader.read_ipv4(pr::BIND_IP_RANGE)?,
        bind_index: reader.read_u8(pr::BIND_INDEX_OFFSET)?,
        status2: reader.read_u8(pr::STATUS2_OFFSET)?,
    })
}

/// Decode an ArtDmx frame.
///
/// The big-endian length field must fit both the 512-slot limit and the
/// bytes actually received; trailing bytes beyond it are ignored.
pub fn parse_dmx(payload: &[u8]) -> Result<ArtDmx<'_>, ArtNetError> {
    use layout::dmx;

    let reader = ArtNetReader::new(payload);
    reader.require_len(dmx::DATA_OFFSET)?;
    let length = reader.read_u16_be(dmx::LENGTH_RANGE)?;
    if length as usize > dmx::MAX_SLOTS {
        return Err(ArtNetError::InvalidLength { length });
    }
    let available = payload.len() - dmx::DATA_OFFSET;
    if length as usize > available {
        return Err(ArtNetError::PayloadOverrun {
            declared: length as usize,
            available,
        });
    }

    Ok(ArtDmx {
        protocol_version: reader.read_protocol_version()?,
        sequence: reader.read_u8(dmx::SEQUENCE_OFFSET)?,
        physical: reader.read_u8(dmx::PHYSICAL_OFFSET)?,
        sub_uni: reader.read_u8(dmx::SUB_UNI_OFFSET)?,
        net: reader.read_u8(dmx::NET_OFFSET)?,
        data: reader.read_slice(dmx::DATA_OFFSET..dmx::DATA_OFFSET + length as usize)?,
    })
}

pub fn parse_ip_prog(payload: &[u8]) -> Result<ArtIpProg, ArtNetError> {
    use layout::ip_prog;

    let reader = ArtNetReader::new(payload);
    reader.require_len(ip_prog::LEN)?;
    Ok(ArtIpProg {
        protocol_version: reader.read_protocol_version()?,
        command: IpCommand::from_bits_retain(reader.read_u8(ip_prog::COMMAND_OFFSET)?),
        ip: reader.read_ipv4(ip_prog::IP_RANGE)?,
        mask: reader.read_ipv4(ip_prog::MASK_RANGE)?,
        port: reader.read_u16_be(ip_prog::PORT_RANGE)?,
    })
}

pub fn parse_ip_prog_reply(payload: &[u8]) -> Result<ArtIpProgReply, ArtNetError> {
    use layout::ip_prog;

    let reader = ArtNetReader::new(payload);
    reader.require_len(ip_prog::LEN)?;
    let status = IpStatus::from_bits_retain(reader.read_u8(ip_prog::STATUS_OFFSET)?);
    Ok(ArtIpProgReply {
        protocol_version: reader.read_protocol_version()?,
        ip: reader.read_ipv4(ip_prog::IP_RANGE)?,
        mask: reader.read_ipv4(ip_prog::MASK_RANGE)?,
        port: reader.read_u16_be(ip_prog::PORT_RANGE)?,
        dhcp: status.contains(IpStatus::DHCP_ENABLED),
    })
}

pub fn parse_address(payload: &[u8]) -> Result<ArtAddress, ArtNetError> {
    use layout::address;

    let reader = ArtNetReader::new(payload);
    reader.require_len(address::LEN)?;
    Ok(ArtAddress {
        protocol_version: reader.read_protocol_version()?,
        net_switch: reader.read_u8(address::NET_SWITCH_OFFSET)?,
        bind_index: reader.read_u8(address::BIND_INDEX_OFFSET)?,
        short_name: optional_name(reader.read_slice(address::SHORT_NAME_RANGE)?),
        long_name: optional_name(reader.read_slice(address::LONG_NAME_RANGE)?),
        sw_in: reader.read_array(address::SW_IN_RANGE)?,
        sw_out: reader.read_array(address::SW_OUT_RANGE)?,
        sub_switch: reader.read_u8(address::SUB_SWITCH_OFFSET)?,
        sw_video: reader.read_u8(address::SW_VIDEO_OFFSET)?,
        command: AddressCommand::from_byte(reader.read_u8(address::COMMAND_OFFSET)?),
    })
}

fn optional_name<const CAP: usize>(field: &[u8]) -> Option<FixedName<CAP>> {
    let name = FixedName::from_field(field);
    if name.is_empty() { None } else { Some(name) }
}

pub fn parse_tod_request(payload: &[u8]) -> Result<ArtTodRequest, ArtNetError> {
    use layout::tod_request;

    let reader = ArtNetReader::new(payload);
    reader.require_len(tod_request::HEADER_LEN)?;
    let count = reader.read_u8(tod_request::AD_COUNT_OFFSET)? as usize;
    if count > tod_request::MAX_ADDRESSES {
        return Err(ArtNetError::TooManyEntries {
            count,
            max: tod_request::MAX_ADDRESSES,
        });
    }
    let end = tod_request::ADDRESS_OFFSET + count;
    require_tail(payload, tod_request::ADDRESS_OFFSET, end)?;

    Ok(ArtTodRequest {
        protocol_version: reader.read_protocol_version()?,
        net: reader.read_u8(tod_request::NET_OFFSET)?,
        scope: TodScope::from_byte(reader.read_u8(tod_request::COMMAND_OFFSET)?),
        addresses: reader.read_slice(tod_request::ADDRESS_OFFSET..end)?.to_vec(),
    })
}

pub fn parse_tod_data(payload: &[u8]) -> Result<ArtTodData, ArtNetError> {
    use layout::tod_data;

    let reader = ArtNetReader::new(payload);
    reader.require_len(tod_data::HEADER_LEN)?;
    let count = reader.read_u8(tod_data::UID_COUNT_OFFSET)? as usize;
    if count > tod_data::MAX_UIDS {
        return Err(ArtNetError::TooManyEntries {
            count,
            max: tod_data::MAX_UIDS,
        });
    }
    let end = tod_data::UID_OFFSET + count * tod_data::UID_LEN;
    require_tail(payload, tod_data::UID_OFFSET, end)?;
    let uids = reader
        .read_slice(tod_data::UID_OFFSET..end)?
        .chunks_exact(tod_data::UID_LEN)
        .map(|chunk| {
            let mut bytes = [0u8; tod_data::UID_LEN];
            bytes.copy_from_slice(chunk);
            Uid::from_bytes(bytes)
        })
        .collect();

    Ok(ArtTodData {
        protocol_version: reader.read_protocol_version()?,
        rdm_version: reader.read_u8(tod_data::RDM_VERSION_OFFSET)?,
        port: reader.read_u8(tod_data::PORT_OFFSET)?,
        bind_index: reader.read_u8(tod_data::BIND_INDEX_OFFSET)?,
        net: reader.read_u8(tod_data::NET_OFFSET)?,
        command_response: reader.read_u8(tod_data::COMMAND_RESPONSE_OFFSET)?,
        address: reader.read_u8(tod_data::ADDRESS_OFFSET)?,
        uid_total: reader.read_u16_be(tod_data::UID_TOTAL_RANGE)?,
        block_count: reader.read_u8(tod_data::BLOCK_COUNT_OFFSET)?,
        uids,
    })
}

/// A count field promising more tail bytes than were received is an overrun.
fn require_tail(payload: &[u8], start: usize, end: usize) -> Result<(), ArtNetError> {
    if payload.len() < end {
        return Err(ArtNetError::PayloadOverrun {
            declared: end - start,
            available: payload.len().saturating_sub(start),
        });
    }
    Ok(())
}
