use std::net::Ipv4Addr;

use tracing::{debug, trace, warn};

use super::responder::{build_ip_prog_reply, build_poll_reply, build_tod_data};
use super::{ArtNode, DeviceRegistry, Dispatch, DmxFrame, OutputAction};
use crate::node::{Indicator, MAX_UNIVERSE, MergeMode, NodeConfig, OutputProtocol};
use crate::protocols::artnet::layout::address;
use crate::protocols::artnet::{
    AddressCommand, ArtAddress, ArtDmx, ArtIpProg, ArtPoll, ArtTodRequest, IpCommand, OpCode,
    encode_ip_prog_reply, encode_poll_reply, encode_tod_data,
};
use crate::transport::DatagramSink;

impl<R: DeviceRegistry> ArtNode<R> {
    /// Every ArtPoll is answered, whatever its TalkToMe flags.
    pub(super) fn handle_poll<'a, S: DatagramSink + ?Sized>(
        &mut self,
        request: ArtPoll,
        source: Ipv4Addr,
        sink: &mut S,
    ) -> Dispatch<'a> {
        trace!(flags = ?request.flags, priority = request.priority, "poll");
        self.send_poll_reply(source, sink);
        Dispatch::Poll(request)
    }

    pub(super) fn handle_dmx<'a>(&mut self, frame: ArtDmx<'a>, source: Ipv4Addr) -> Dispatch<'a> {
        let port_address = frame.port_address();
        let (status, accepted) = self
            .sequences
            .observe(source, port_address, frame.sequence);
        let port = self.config.output_port_for(port_address);
        if let (true, Some(port)) = (accepted, port) {
            self.active_outputs[port as usize] = true;
        }
        trace!(
            %source,
            universe = %port_address,
            sequence = frame.sequence,
            len = frame.data.len(),
            ?status,
            accepted,
            "dmx"
        );
        Dispatch::Dmx(DmxFrame {
            source,
            port_address,
            port,
            sequence: frame.sequence,
            physical: frame.physical,
            status,
            accepted,
            data: frame.data,
        })
    }

    /// Apply the request to a copy and swap it in, so the configuration is
    /// either fully programmed or untouched.
    pub(super) fn handle_ip_prog<'a, S: DatagramSink + ?Sized>(
        &mut self,
        request: ArtIpProg,
        source: Ipv4Addr,
        sink: &mut S,
    ) -> Dispatch<'a> {
        let applied = request.command.contains(IpCommand::PROGRAM);
        if applied {
            let mut next = self.config.clone();
            program_network(&mut next, &request);
            self.config = next;
            debug!(
                ip = %self.config.ip(),
                mask = %self.config.mask(),
                port = self.config.udp_port(),
                dhcp = self.config.dhcp(),
                "network programmed"
            );
        }
        let reply = build_ip_prog_reply(&self.config);
        self.reply(sink, &encode_ip_prog_reply(&reply), source, OpCode::IpProgReply);
        Dispatch::IpProg {
            request,
            reply,
            applied,
        }
    }

    /// Apply switches, names and the command byte, then announce the result
    /// with an ArtPollReply.
    pub(super) fn handle_address<'a, S: DatagramSink + ?Sized>(
        &mut self,
        request: Box<ArtAddress>,
        source: Ipv4Addr,
        sink: &mut S,
    ) -> Dispatch<'a> {
        if let Some(net) = switch_value(request.net_switch) {
            self.config.set_net(net);
        }
        if let Some(subnet) = switch_value(request.sub_switch) {
            self.config.set_subnet(subnet);
        }
        if let Some(name) = request.short_name {
            self.config.set_short_name_field(name);
        }
        if let Some(name) = request.long_name {
            self.config.set_long_name_field(name);
        }
        for port in 0..self.config.port_count() {
            let index = port as usize;
            if let Some(value) = switch_value(request.sw_in[index]) {
                if let Err(err) = self
                    .config
                    .set_port_input_address(port, value & MAX_UNIVERSE)
                {
                    debug!(%err, "input switch ignored");
                }
            }
            if let Some(value) = switch_value(request.sw_out[index]) {
                if let Err(err) = self
                    .config
                    .set_port_output_address(port, value & MAX_UNIVERSE)
                {
                    debug!(%err, "output switch ignored");
                }
            }
        }
        let action = apply_command(&mut self.config, request.command);

        self.send_poll_reply(source, sink);
        Dispatch::Address { request, action }
    }

    pub(super) fn handle_tod_request<'a, S: DatagramSink + ?Sized>(
        &mut self,
        request: ArtTodRequest,
        source: Ipv4Addr,
        sink: &mut S,
    ) -> Dispatch<'a> {
        let uids = self.registry.devices(request.net, request.scope);
        let address = request.addresses.first().copied().unwrap_or(0);
        let blocks = build_tod_data(&self.config, address, &uids);
        for block in &blocks {
            match encode_tod_data(block) {
                Ok(payload) => self.reply(sink, &payload, source, OpCode::TodData),
                Err(err) => warn!(%err, block = block.block_count, "tod block not encoded"),
            }
        }
        debug!(devices = uids.len(), blocks = blocks.len(), "tod reply");
        Dispatch::TodRequest {
            request,
            blocks: blocks.len(),
        }
    }

    fn send_poll_reply<S: DatagramSink + ?Sized>(&mut self, source: Ipv4Addr, sink: &mut S) {
        let reply = build_poll_reply(&self.config, self.poll_replies, &self.active_outputs);
        self.poll_replies = self.poll_replies.wrapping_add(1);
        self.reply(sink, &encode_poll_reply(&reply), source, OpCode::PollReply);
    }
}

/// 0x7F leaves the field alone; otherwise the program bit is stripped.
fn switch_value(raw: u8) -> Option<u8> {
    if raw == address::NO_CHANGE {
        None
    } else {
        Some(raw & !address::PROGRAM_BIT)
    }
}

/// DHCP wins over the static bits; reset runs before IP, mask and port.
fn program_network(config: &mut NodeConfig, request: &ArtIpProg) {
    let command = request.command;
    if command.contains(IpCommand::ENABLE_DHCP) {
        config.set_dhcp(true);
        return;
    }
    if command.contains(IpCommand::RESET_DEFAULT) {
        config.reset_network();
    }
    if command.contains(IpCommand::SET_IP) {
        config.set_ip(request.ip);
        config.set_dhcp(false);
    }
    if command.contains(IpCommand::SET_MASK) {
        config.set_mask(request.mask);
    }
    if command.contains(IpCommand::SET_PORT) {
        config.set_udp_port(request.port);
    }
}

/// Store what the configuration owns and hand the rest to the caller.
///
/// Port-scoped commands for ports beyond the port count are ignored.
fn apply_command(config: &mut NodeConfig, command: AddressCommand) -> Option<OutputAction> {
    let port_result = match command {
        AddressCommand::None => Ok(()),
        AddressCommand::CancelMerge => return Some(OutputAction::CancelMerge),
        AddressCommand::ResetRxFlags => return Some(OutputAction::ResetRxFlags),
        AddressCommand::LedNormal => {
            config.set_indicator(Indicator::Normal);
            Ok(())
        }
        AddressCommand::LedMute => {
            config.set_indicator(Indicator::Mute);
            Ok(())
        }
        AddressCommand::LedLocate => {
            config.set_indicator(Indicator::Locate);
            Ok(())
        }
        AddressCommand::MergeLtp(port) => config.set_merge_mode(port, MergeMode::Ltp),
        AddressCommand::MergeHtp(port) => config.set_merge_mode(port, MergeMode::Htp),
        AddressCommand::ArtNetSelect(port) => {
            config.set_output_protocol(port, OutputProtocol::ArtNet)
        }
        AddressCommand::AcnSelect(port) => config.set_output_protocol(port, OutputProtocol::Sacn),
        AddressCommand::ClearOutput(port) => {
            if port < config.port_count() {
                return Some(OutputAction::ClearOutput(port));
            }
            debug!(port, "clear output for missing port ignored");
            Ok(())
        }
        AddressCommand::Unknown(value) => {
            warn!(command = %format!("{value:#04x}"), "unknown address command");
            Ok(())
        }
    };
    if let Err(err) = port_result {
        debug!(%err, ?command, "address command ignored");
    }
    None
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{apply_command, program_network, switch_value};
    use crate::engine::OutputAction;
    use crate::node::{Indicator, MergeMode, NodeConfig};
    use crate::protocols::artnet::{AddressCommand, ArtIpProg, IpCommand};

    fn ip_prog(command: IpCommand) -> ArtIpProg {
        ArtIpProg {
            protocol_version: 14,
            command,
            ip: Ipv4Addr::new(10, 0, 0, 5),
            mask: Ipv4Addr::new(255, 255, 0, 0),
            port: 6000,
        }
    }

    #[test]
    fn switch_sentinel_and_program_bit() {
        assert_eq!(switch_value(0x7f), None);
        assert_eq!(switch_value(0x85), Some(0x05));
        assert_eq!(switch_value(0x05), Some(0x05));
    }

    #[test]
    fn reset_runs_before_static_bits() {
        let mut config = NodeConfig::default();
        config.set_mac([0, 1, 2, 3, 4, 5]);
        config.set_mask(Ipv4Addr::new(255, 255, 255, 0));
        program_network(
            &mut config,
            &ip_prog(IpCommand::PROGRAM | IpCommand::RESET_DEFAULT | IpCommand::SET_IP),
        );
        assert_eq!(config.ip(), Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(config.mask(), Ipv4Addr::new(255, 0, 0, 0));
    }

    #[test]
    fn dhcp_ignores_static_bits() {
        let mut config = NodeConfig::default();
        let before = config.ip();
        program_network(
            &mut config,
            &ip_prog(IpCommand::PROGRAM | IpCommand::ENABLE_DHCP | IpCommand::SET_IP),
        );
        assert!(config.dhcp());
        assert_eq!(config.ip(), before);
    }

    #[test]
    fn commands_update_config_or_surface_actions() {
        let mut config = NodeConfig::default();
        config.set_port_count(2);

        assert_eq!(apply_command(&mut config, AddressCommand::MergeLtp(1)), None);
        assert_eq!(config.port(1).map(|p| p.merge), Some(MergeMode::Ltp));

        assert_eq!(apply_command(&mut config, AddressCommand::LedLocate), None);
        assert_eq!(config.indicator(), Indicator::Locate);

        assert_eq!(
            apply_command(&mut config, AddressCommand::ClearOutput(1)),
            Some(OutputAction::ClearOutput(1))
        );
        assert_eq!(apply_command(&mut config, AddressCommand::ClearOutput(3)), None);
        assert_eq!(
            apply_command(&mut config, AddressCommand::CancelMerge),
            Some(OutputAction::CancelMerge)
        );
    }

    #[test]
    fn port_command_beyond_count_is_ignored() {
        let mut config = NodeConfig::default();
        config.set_port_count(1);
        let before = config.clone();
        assert_eq!(apply_command(&mut config, AddressCommand::MergeLtp(2)), None);
        assert_eq!(config, before);
    }
}
