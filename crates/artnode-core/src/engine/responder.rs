//! Reply builders: project the node configuration into outbound records.

use crate::node::{MAX_PORTS, MergeMode, NodeConfig, OutputProtocol};
use crate::protocols::artnet::layout::{self, tod_data};
use crate::protocols::artnet::{
    ArtIpProgReply, ArtPollReply, ArtTodData, GoodOutput, NodeReport, Status2, Uid,
};

/// OEM code for nodes without a registered OEM value.
pub const OEM_UNKNOWN: u16 = 0x00FF;
/// ArtPollReply Style: a DMX to/from Art-Net node.
pub const STYLE_NODE: u8 = 0x00;
/// Status1 bits 5-4: port addresses were programmed over the network.
const STATUS1_NETWORK_PROGRAMMED: u8 = 0x20;
/// NodeReport status code RcPowerOk.
const REPORT_POWER_OK: u16 = 0x0001;
const BIND_INDEX_ROOT: u8 = 1;
/// Most ArtTodData blocks one response can index (BlockCount is one byte).
pub const MAX_TOD_BLOCKS: usize = 256;

/// `#0001 [nnnn] ...` with the reply counter modulo 10000.
pub fn node_report(counter: u32) -> NodeReport {
    NodeReport::new(&format!(
        "#{REPORT_POWER_OK:04x} [{:04}] Power On Tests successful",
        counter % 10_000
    ))
}

/// Build the discovery reply describing `config`.
///
/// `active_outputs` marks ports that have output data since start-up; it
/// drives the GoodOutput data-transmitted bit.
pub fn build_poll_reply(
    config: &NodeConfig,
    counter: u32,
    active_outputs: &[bool; MAX_PORTS as usize],
) -> ArtPollReply {
    let mut port_types = [0u8; layout::MAX_PORTS];
    let mut good_output = [0u8; layout::MAX_PORTS];
    let mut sw_in = [0u8; layout::MAX_PORTS];
    let mut sw_out = [0u8; layout::MAX_PORTS];
    for (index, port) in config.ports().iter().enumerate() {
        port_types[index] = port.kind.to_byte();
        sw_in[index] = port.input_address;
        sw_out[index] = port.output_address;

        let mut flags = GoodOutput::empty();
        if active_outputs[index] {
            flags |= GoodOutput::DATA_TRANSMITTED;
        }
        if port.merge == MergeMode::Ltp {
            flags |= GoodOutput::MERGE_LTP;
        }
        if port.output_protocol == OutputProtocol::Sacn {
            flags |= GoodOutput::OUTPUT_SACN;
        }
        good_output[index] = flags.bits();
    }

    let mut status2 = Status2::PORT_ADDRESS_15BIT | Status2::DHCP_CAPABLE;
    if config.dhcp() {
        status2 |= Status2::DHCP_CONFIGURED;
    }
    let version = config.version();

    ArtPollReply {
        ip: config.ip(),
        port: layout::ARTNET_PORT,
        version_hi: version.major,
        version_lo: version.minor,
        net_switch: config.net(),
        sub_switch: config.subnet(),
        oem: OEM_UNKNOWN,
        ubea_version: 0,
        status1: config.indicator().status1_bits() | STATUS1_NETWORK_PROGRAMMED,
        esta_manufacturer: 0,
        short_name: *config.short_name(),
        long_name: *config.long_name(),
        node_report: node_report(counter),
        num_ports: u16::from(config.port_count()),
        port_types,
        good_input: [0; layout::MAX_PORTS],
        good_output,
        sw_in,
        sw_out,
        sw_video: 0,
        sw_macro: 0,
        sw_remote: 0,
        style: STYLE_NODE,
        mac: config.mac(),
        bind_ip: config.ip(),
        bind_index: BIND_INDEX_ROOT,
        status2: status2.bits(),
    }
}

/// Echo of the node's network settings after an IP program request.
pub fn build_ip_prog_reply(config: &NodeConfig) -> ArtIpProgReply {
    ArtIpProgReply {
        protocol_version: layout::PROTOCOL_VERSION,
        ip: config.ip(),
        mask: config.mask(),
        port: config.udp_port(),
        dhcp: config.dhcp(),
    }
}

/// Split a device table into ArtTodData blocks of at most 200 UIDs.
///
/// Every block carries the same `uid_total`; `block_count` counts up from 0.
/// An empty table still yields one block announcing zero devices. Tables
/// larger than 256 blocks are truncated.
pub fn build_tod_data(config: &NodeConfig, address: u8, uids: &[Uid]) -> Vec<ArtTodData> {
    let uids = &uids[..uids.len().min(MAX_TOD_BLOCKS * tod_data::MAX_UIDS)];
    let total = uids.len() as u16;
    let block = |block_count: usize, chunk: &[Uid]| ArtTodData {
        protocol_version: layout::PROTOCOL_VERSION,
        rdm_version: tod_data::RDM_VERSION_STANDARD,
        port: 1,
        bind_index: BIND_INDEX_ROOT,
        net: config.net(),
        command_response: 0,
        address,
        uid_total: total,
        block_count: block_count as u8,
        uids: chunk.to_vec(),
    };

    if uids.is_empty() {
        return vec![block(0, &[])];
    }
    uids.chunks(tod_data::MAX_UIDS)
        .enumerate()
        .map(|(index, chunk)| block(index, chunk))
        .collect()
}
