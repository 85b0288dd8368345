use super::error::ArtNetError;
use super::flags::IpStatus;
use super::layout;
use super::packet::{
    ArtAddress, ArtDmx, ArtIpProg, ArtIpProgReply, ArtPoll, ArtPollReply, ArtTodData,
    ArtTodRequest,
};
use super::writer::ArtNetWriter;

pub fn encode_poll(poll: &ArtPoll) -> Vec<u8> {
    use layout::poll as p;

    let mut writer = ArtNetWriter::new(layout::OP_POLL, p::LEN);
    writer
        .write_u16_be(layout::PROT_VER_RANGE, poll.protocol_version)
        .write_u8(p::FLAGS_OFFSET, poll.flags.bits())
        .write_u8(p::PRIORITY_OFFSET, poll.priority);
    writer.finish()
}

pub fn encode_poll_reply(reply: &ArtPollReply) -> Vec<u8> {
    use layout::poll_reply as pr;

    let [esta_lo, esta_hi] = reply.esta_manufacturer.to_le_bytes();
    let mut writer = ArtNetWriter::new(layout::OP_POLL_REPLY, pr::LEN);
    writer
        .write_ipv4(pr::IP_RANGE, reply.ip)
        .write_u16_be(pr::PORT_RANGE, reply.port)
        .write_u8(pr::VERSION_HI_OFFSET, reply.version_hi)
        .write_u8(pr::VERSION_LO_OFFSET, reply.version_lo)
        .write_u8(pr::NET_SWITCH_OFFSET, reply.net_switch)
        .write_u8(pr::SUB_SWITCH_OFFSET, reply.sub_switch)
        .write_u16_be(pr::OEM_RANGE, reply.oem)
        .write_u8(pr::UBEA_VERSION_OFFSET, reply.ubea_version)
        .write_u8(pr::STATUS1_OFFSET, reply.status1)
        .write_u8(pr::ESTA_MAN_LO_OFFSET, esta_lo)
        .write_u8(pr::ESTA_MAN_HI_OFFSET, esta_hi)
        .write_slice(pr::SHORT_NAME_RANGE, &reply.short_name.to_field())
        .write_slice(pr::LONG_NAME_RANGE, &reply.long_name.to_field())
        .write_slice(pr::NODE_REPORT_RANGE, &reply.node_report.to_field())
        .write_u16_be(pr::NUM_PORTS_RANGE, reply.num_ports)
        .write_slice(pr::PORT_TYPES_RANGE, &reply.port_types)
        .write_slice(pr::GOOD_INPUT_RANGE, &reply.good_input)
        .write_slice(pr::GOOD_OUTPUT_RANGE, &reply.good_output)
        .write_slice(pr::SW_IN_RANGE, &reply.sw_in)
        .write_slice(pr::SW_OUT_RANGE, &reply.sw_out)
        .write_u8(pr::SW_VIDEO_OFFSET, reply.sw_video)
        .write_u8(pr::SW_MACRO_OFFSET, reply.sw_macro)
        .write_u8(pr::SW_REMOTE_OFFSET, reply.sw_remote)
        .write_u8(pr::STYLE_OFFSET, reply.style)
        .write_slice(pr::MAC_RANGE, &reply.mac)
        .write_ipv4(pr::BIND_IP_RANGE, reply.bind_ip)
        .write_u8(pr::BIND_INDEX_OFFSET, reply.bind_index)
        .write_u8(pr::STATUS2_OFFSET, reply.status2);
    writer.finish()
}

pub fn encode_dmx(dmx: &ArtDmx<'_>) -> Result<Vec<u8>, ArtNetError> {
    use layout::dmx as d;

    if dmx.data.len() > d::MAX_SLOTS {
        return Err(ArtNetError::InvalidLength {
            length: u16::try_from(dmx.data.len()).unwrap_or(u16::MAX),
        });
    }
    let mut writer = ArtNetWriter::new(layout::OP_DMX, d::DATA_OFFSET);
    writer
        .write_u16_be(layout::PROT_VER_RANGE, dmx.protocol_version)
        .write_u8(d::SEQUENCE_OFFSET, dmx.sequence)
        .write_u8(d::PHYSICAL_OFFSET, dmx.physical)
        .write_u8(d::SUB_UNI_OFFSET, dmx.sub_uni)
        .write_u8(d::NET_OFFSET, dmx.net)
        .write_u16_be(d::LENGTH_RANGE, dmx.data.len() as u16)
        .extend(dmx.data);
    Ok(writer.finish())
}

pub fn encode_ip_prog(request: &ArtIpProg) -> Vec<u8> {
    use layout::ip_prog as ip;

    let mut writer = ArtNetWriter::new(layout::OP_IP_PROG, ip::LEN);
    writer
        .write_u16_be(layout::PROT_VER_RANGE, request.protocol_version)
        .write_u8(ip::COMMAND_OFFSET, request.command.bits())
        .write_ipv4(ip::IP_RANGE, request.ip)
        .write_ipv4(ip::MASK_RANGE, request.mask)
        .write_u16_be(ip::PORT_RANGE, request.port);
    writer.finish()
}

pub fn encode_ip_prog_reply(reply: &ArtIpProgReply) -> Vec<u8> {
    use layout::ip_prog as ip;

    let status = if reply.dhcp {
        IpStatus::DHCP_ENABLED
    } else {
        IpStatus::empty()
    };
    let mut writer = ArtNetWriter::new(layout::OP_IP_PROG_REPLY, ip::LEN);
    writer
        .write_u16_be(layout::PROT_VER_RANGE, reply.protocol_version)
        .write_ipv4(ip::IP_RANGE, reply.ip)
        .write_ipv4(ip::MASK_RANGE, reply.mask)
        .write_u16_be(ip::PORT_RANGE, reply.port)
        .write_u8(ip::STATUS_OFFSET, status.bits());
    writer.finish()
}

pub fn encode_address(request: &ArtAddress) -> Vec<u8> {
    use layout::address as a;

    let short_name = request.short_name.unwrap_or_default();
    let long_name = request.long_name.unwrap_or_default();
    let mut writer = ArtNetWriter::new(layout::OP_ADDRESS, a::LEN);
    writer
        .write_u16_be(layout::PROT_VER_RANGE, request.protocol_version)
        .write_u8(a::NET_SWITCH_OFFSET, request.net_switch)
        .write_u8(a::BIND_INDEX_OFFSET, request.bind_index)
        .write_slice(a::SHORT_NAME_RANGE, &short_name.to_field())
        .write_slice(a::LONG_NAME_RANGE, &long_name.to_field())
        .write_slice(a::SW_IN_RANGE, &request.sw_in)
        .write_slice(a::SW_OUT_RANGE, &request.sw_out)
        .write_u8(a::SUB_SWITCH_OFFSET, request.sub_switch)
        .write_u8(a::SW_VIDEO_OFFSET, request.sw_video)
        .write_u8(a::COMMAND_OFFSET, request.command.to_byte());
    writer.finish()
}

pub fn encode_tod_request(request: &ArtTodRequest) -> Result<Vec<u8>, ArtNetError> {
    use layout::tod_request as t;

    if request.addresses.len() > t::MAX_ADDRESSES {
        return Err(ArtNetError::TooManyEntries {
            count: request.addresses.len(),
            max: t::MAX_ADDRESSES,
        });
    }
    let mut writer = ArtNetWriter::new(layout::OP_TOD_REQUEST, t::HEADER_LEN);
    writer
        .write_u16_be(layout::PROT_VER_RANGE, request.protocol_version)
        .write_u8(t::NET_OFFSET, request.net)
        .write_u8(t::COMMAND_OFFSET, request.scope.to_byte())
        .write_u8(t::AD_COUNT_OFFSET, request.addresses.len() as u8)
        .extend(&request.addresses);
    Ok(writer.finish())
}

pub fn encode_tod_data(data: &ArtTodData) -> Result<Vec<u8>, ArtNetError> {
    use layout::tod_data as t;

    if data.uids.len() > t::MAX_UIDS {
        return Err(ArtNetError::TooManyEntries {
            count: data.uids.len(),
            max: t::MAX_UIDS,
        });
    }
    let mut writer = ArtNetWriter::new(layout::OP_TOD_DATA, t::HEADER_LEN);
    writer
        .write_u16_be(layout::PROT_VER_RANGE, data.protocol_version)
        .write_u8(t::RDM_VERSION_OFFSET, data.rdm_version)
        .write_u8(t::PORT_OFFSET, data.port)
        .write_u8(t::BIND_INDEX_OFFSET, data.bind_index)
        .write_u8(t::NET_OFFSET, data.net)
        .write_u8(t::COMMAND_RESPONSE_OFFSET, data.command_response)
        .write_u8(t::ADDRESS_OFFSET, data.address)
        .write_u16_be(t::UID_TOTAL_RANGE, data.uid_total)
        .write_u8(t::BLOCK_COUNT_OFFSET, data.block_count)
        .write_u8(t::UID_COUNT_OFFSET, data.uids.len() as u8);
    for uid in &data.uids {
        writer.extend(&uid.to_bytes());
    }
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::protocols::artnet::command::{AddressCommand, TodScope};
    use crate::protocols::artnet::flags::{IpCommand, PollFlags};
    use crate::protocols::artnet::name::{LongName, NodeReport, ShortName};
    use crate::protocols::artnet::parser::{
        parse_address, parse_dmx, parse_ip_prog, parse_ip_prog_reply, parse_poll,
        parse_poll_reply, parse_tod_data, parse_tod_request,
    };
    use crate::protocols::artnet::uid::Uid;

    fn sample_poll_reply() -> ArtPollReply {
        ArtPollReply {
            ip: Ipv4Addr::new(192, 168, 1, 50),
            port: layout::ARTNET_PORT,
            version_hi: 1,
            version_lo: 4,
            net_switch: 3,
            sub_switch: 2,
            oem: 0x00ff,
            ubea_version: 0,
            status1: 0xc0,
            esta_manufacturer: 0x7a70,
            short_name: ShortName::new("node"),
            long_name: LongName::new("stage left node"),
            node_report: NodeReport::new("#0001 [0001] ok"),
            num_ports: 2,
            port_types: [0x80, 0x40, 0, 0],
            good_input: [0; 4],
            good_output: [0x02, 0, 0, 0],
            sw_in: [0, 1, 0, 0],
            sw_out: [4, 0, 0, 0],
            sw_video: 0,
            sw_macro: 0,
            sw_remote: 0,
            style: 0,
            mac: [0x02, 0, 0, 0x12, 0x34, 0x56],
            bind_ip: Ipv4Addr::new(192, 168, 1, 50),
            bind_index: 1,
            status2: 0x0c,
        }
    }

    #[test]
    fn poll_reply_matches_wire_layout() {
        let bytes = encode_poll_reply(&sample_poll_reply());
        assert_eq!(bytes.len(), 239);
        assert_eq!(&bytes[10..14], &[192, 168, 1, 50]);
        assert_eq!(&bytes[14..16], &6454u16.to_be_bytes());
        assert_eq!(&bytes[24..26], &[0x70, 0x7a]);
        assert_eq!(&bytes[26..30], b"node");
        assert!(bytes[30..44].iter().all(|b| *b == 0));
        assert_eq!(bytes[173], 2);
        assert_eq!(parse_poll_reply(&bytes).unwrap(), sample_poll_reply());
    }

    #[test]
    fn poll_decodes_back() {
        let poll = ArtPoll {
            protocol_version: 14,
            flags: PollFlags::REPLY_ON_CHANGE | PollFlags::SEND_DIAGNOSTICS,
            priority: 0x40,
        };
        assert_eq!(parse_poll(&encode_poll(&poll)).unwrap(), poll);
    }

    #[test]
    fn dmx_decodes_back_with_payload() {
        let data = [0xffu8; 24];
        let dmx = ArtDmx {
            protocol_version: 14,
            sequence: 200,
            physical: 1,
            sub_uni: 0x12,
            net: 0x01,
            data: &data,
        };
        let bytes = encode_dmx(&dmx).unwrap();
        assert_eq!(&bytes[16..18], &[0x00, 24]);
        assert_eq!(parse_dmx(&bytes).unwrap(), dmx);
    }

    #[test]
    fn dmx_rejects_oversized_payload() {
        let data = [0u8; 513];
        let dmx = ArtDmx {
            protocol_version: 14,
            sequence: 0,
            physical: 0,
            sub_uni: 0,
            net: 0,
            data: &data,
        };
        assert_eq!(
            encode_dmx(&dmx),
            Err(ArtNetError::InvalidLength { length: 513 })
        );
    }

    #[test]
    fn ip_prog_and_reply_decode_back() {
        let request = ArtIpProg {
            protocol_version: 14,
            command: IpCommand::PROGRAM | IpCommand::SET_IP | IpCommand::SET_PORT,
            ip: Ipv4Addr::new(10, 0, 0, 5),
            mask: Ipv4Addr::new(255, 0, 0, 0),
            port: 0x1936,
        };
        let bytes = encode_ip_prog(&request);
        assert_eq!(bytes[14], 0x85);
        assert_eq!(&bytes[24..26], &[0x19, 0x36]);
        assert_eq!(parse_ip_prog(&bytes).unwrap(), request);

        let reply = ArtIpProgReply {
            protocol_version: 14,
            ip: Ipv4Addr::new(10, 0, 0, 5),
            mask: Ipv4Addr::new(255, 0, 0, 0),
            port: 0x1936,
            dhcp: true,
        };
        let bytes = encode_ip_prog_reply(&reply);
        assert_eq!(&bytes[8..10], &[0x00, 0xf9]);
        assert_eq!(bytes[26], 0x40);
        assert_eq!(parse_ip_prog_reply(&bytes).unwrap(), reply);
    }

    #[test]
    fn address_decodes_back_and_empty_names_stay_absent() {
        let request = ArtAddress {
            protocol_version: 14,
            net_switch: 0x7f,
            bind_index: 1,
            short_name: None,
            long_name: Some(LongName::new("renamed")),
            sw_in: [0x7f; 4],
            sw_out: [0x81, 0x7f, 0x7f, 0x7f],
            sub_switch: 0x82,
            sw_video: 0,
            command: AddressCommand::MergeLtp(0),
        };
        let bytes = encode_address(&request);
        assert_eq!(bytes.len(), 107);
        assert_eq!(bytes[106], 0x10);
        assert_eq!(parse_address(&bytes).unwrap(), request);
    }

    #[test]
    fn tod_request_and_data_decode_back() {
        let request = ArtTodRequest {
            protocol_version: 14,
            net: 0,
            scope: TodScope::Full,
            addresses: vec![0x00, 0x01],
        };
        let bytes = encode_tod_request(&request).unwrap();
        assert_eq!(bytes.len(), 26);
        assert_eq!(parse_tod_request(&bytes).unwrap(), request);

        let data = ArtTodData {
            protocol_version: 14,
            rdm_version: 1,
            port: 1,
            bind_index: 1,
            net: 0,
            command_response: 0,
            address: 0x01,
            uid_total: 300,
            block_count: 1,
            uids: vec![Uid::new(0x7a70, 1), Uid::new(0x7a70, 2)],
        };
        let bytes = encode_tod_data(&data).unwrap();
        assert_eq!(&bytes[24..26], &300u16.to_be_bytes());
        assert_eq!(bytes[27], 2);
        assert_eq!(bytes.len(), 28 + 12);
        assert_eq!(parse_tod_data(&bytes).unwrap(), data);
    }
}
