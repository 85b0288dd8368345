//! Node identity and addressing state.
//!
//! `NodeConfig` is the single mutable record an engine owns for its whole
//! lifetime. Every setter validates its input: numeric fields are clamped
//! into range, names are truncated to their wire capacity, and port-scoped
//! setters refuse indices at or beyond the current port count. Nothing can
//! write outside the fixed four-slot port table.
//!
//! Version française (résumé):
//! `NodeConfig` contient l'identité et l'adressage du nœud. Les mutateurs
//! bornent les valeurs (net/subnet <= 127, 4 ports max, noms tronqués).

use std::net::Ipv4Addr;

use serde::Serialize;

mod error;
mod port;

pub use error::ConfigError;
pub use port::{Indicator, MergeMode, OutputProtocol, PortConfig, PortProtocol, PortType};

use crate::protocols::artnet::layout;
use crate::protocols::artnet::{LongName, PortAddress, ShortName};

/// Highest value of the 7-bit net and subnet fields.
pub const MAX_SWITCH: u8 = 0x7F;
/// Highest universe nibble of a port address.
pub const MAX_UNIVERSE: u8 = 0x0F;
pub const MAX_PORTS: u8 = layout::MAX_PORTS as u8;

pub const DEFAULT_MASK: Ipv4Addr = Ipv4Addr::new(255, 0, 0, 0);
pub const DEFAULT_SHORT_NAME: &str = "artnode";
pub const DEFAULT_LONG_NAME: &str = "artnode Art-Net node";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

/// Node identity and addressing record.
///
/// # Examples
/// ```
/// use artnode_core::{NodeConfig, PortAddress, PortProtocol, PortType};
///
/// let mut config = NodeConfig::default();
/// config.set_net(1);
/// config.set_subnet(2);
/// config.set_port_count(2);
/// config.set_port_type(1, PortType::output(PortProtocol::Dmx))?;
/// config.set_port_address(1, 5)?;
/// assert_eq!(config.output_port_for(PortAddress::from_parts(1, 2, 5)), Some(1));
/// # Ok::<(), artnode_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeConfig {
    mac: [u8; 6],
    ip: Ipv4Addr,
    mask: Ipv4Addr,
    udp_port: u16,
    dhcp: bool,
    net: u8,
    subnet: u8,
    short_name: ShortName,
    long_name: LongName,
    port_count: u8,
    ports: [PortConfig; layout::MAX_PORTS],
    version: FirmwareVersion,
    indicator: Indicator,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let mac = [0u8; 6];
        Self {
            mac,
            ip: default_ip(&mac),
            mask: DEFAULT_MASK,
            udp_port: layout::ARTNET_PORT,
            dhcp: false,
            net: 0,
            subnet: 0,
            short_name: ShortName::new(DEFAULT_SHORT_NAME),
            long_name: LongName::new(DEFAULT_LONG_NAME),
            port_count: 0,
            ports: [PortConfig::default(); layout::MAX_PORTS],
            version: FirmwareVersion { major: 1, minor: 0 },
            indicator: Indicator::default(),
        }
    }
}

/// Art-Net factory address: `2.x.y.z` from the last three MAC bytes.
pub fn default_ip(mac: &[u8; 6]) -> Ipv4Addr {
    Ipv4Addr::new(2, mac[3], mac[4], mac[5])
}

impl NodeConfig {
    pub fn mac(&self) -> [u8; 6] {
        self.mac
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn mask(&self) -> Ipv4Addr {
        self.mask
    }

    pub fn udp_port(&self) -> u16 {
        self.udp_port
    }

    pub fn dhcp(&self) -> bool {
        self.dhcp
    }

    pub fn net(&self) -> u8 {
        self.net
    }

    pub fn subnet(&self) -> u8 {
        self.subnet
    }

    pub fn short_name(&self) -> &ShortName {
        &self.short_name
    }

    pub fn long_name(&self) -> &LongName {
        &self.long_name
    }

    pub fn port_count(&self) -> u8 {
        self.port_count
    }

    pub fn version(&self) -> FirmwareVersion {
        self.version
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    /// Configured ports, `port_count` entries long.
    pub fn ports(&self) -> &[PortConfig] {
        &self.ports[..self.port_count as usize]
    }

    pub fn port(&self, port: u8) -> Option<&PortConfig> {
        self.ports().get(port as usize)
    }

    pub fn port_type(&self, port: u8) -> Option<PortType> {
        self.port(port).map(|p| p.kind)
    }

    pub fn port_input_address(&self, port: u8) -> Option<u8> {
        self.port(port).map(|p| p.input_address)
    }

    pub fn port_output_address(&self, port: u8) -> Option<u8> {
        self.port(port).map(|p| p.output_address)
    }

    pub fn set_version(&mut self, major: u8, minor: u8) {
        self.version = FirmwareVersion { major, minor };
    }

    pub fn set_net(&mut self, net: u8) {
        self.net = net.min(MAX_SWITCH);
    }

    /// Kept as a 7-bit switch; only the low nibble takes part in the
    /// Port-Address, so subnets 16..=127 alias 0..=15 in `output_port_for`.
    pub fn set_subnet(&mut self, subnet: u8) {
        self.subnet = subnet.min(MAX_SWITCH);
    }

    pub fn set_short_name(&mut self, name: &str) {
        self.short_name = ShortName::new(name);
    }

    pub fn set_long_name(&mut self, name: &str) {
        self.long_name = LongName::new(name);
    }

    /// Store a name decoded from the wire byte for byte.
    pub fn set_short_name_field(&mut self, name: ShortName) {
        self.short_name = name;
    }

    pub fn set_long_name_field(&mut self, name: LongName) {
        self.long_name = name;
    }

    /// Clamp to 0..=4; slots beyond the new count are reset.
    pub fn set_port_count(&mut self, count: u8) {
        self.port_count = count.min(MAX_PORTS);
        for slot in &mut self.ports[self.port_count as usize..] {
            *slot = PortConfig::default();
        }
    }

    pub fn set_port_type(&mut self, port: u8, kind: PortType) -> Result<(), ConfigError> {
        self.port_mut(port)?.kind = kind;
        Ok(())
    }

    /// Set both routing directions of a port to the same universe nibble.
    pub fn set_port_address(&mut self, port: u8, address: u8) -> Result<(), ConfigError> {
        let slot = self.port_mut(port)?;
        slot.input_address = address.min(MAX_UNIVERSE);
        slot.output_address = address.min(MAX_UNIVERSE);
        Ok(())
    }

    pub fn set_port_input_address(&mut self, port: u8, address: u8) -> Result<(), ConfigError> {
        self.port_mut(port)?.input_address = address.min(MAX_UNIVERSE);
        Ok(())
    }

    pub fn set_port_output_address(&mut self, port: u8, address: u8) -> Result<(), ConfigError> {
        self.port_mut(port)?.output_address = address.min(MAX_UNIVERSE);
        Ok(())
    }

    pub fn set_merge_mode(&mut self, port: u8, merge: MergeMode) -> Result<(), ConfigError> {
        self.port_mut(port)?.merge = merge;
        Ok(())
    }

    pub fn set_output_protocol(
        &mut self,
        port: u8,
        protocol: OutputProtocol,
    ) -> Result<(), ConfigError> {
        self.port_mut(port)?.output_protocol = protocol;
        Ok(())
    }

    pub fn set_indicator(&mut self, indicator: Indicator) {
        self.indicator = indicator;
    }

    pub fn set_mac(&mut self, mac: [u8; 6]) {
        self.mac = mac;
    }

    pub fn set_ip(&mut self, ip: Ipv4Addr) {
        self.ip = ip;
    }

    pub fn set_mask(&mut self, mask: Ipv4Addr) {
        self.mask = mask;
    }

    /// Port 0 is not a usable UDP port and falls back to 6454.
    pub fn set_udp_port(&mut self, port: u16) {
        self.udp_port = if port == 0 { layout::ARTNET_PORT } else { port };
    }

    pub fn set_dhcp(&mut self, enabled: bool) {
        self.dhcp = enabled;
    }

    /// Restore factory network settings: `2.x.y.z`, 255.0.0.0, 6454, no DHCP.
    pub fn reset_network(&mut self) {
        self.ip = default_ip(&self.mac);
        self.mask = DEFAULT_MASK;
        self.udp_port = layout::ARTNET_PORT;
        self.dhcp = false;
    }

    /// Port-Address an output port listens to (net, low subnet nibble, port
    /// nibble).
    pub fn output_port_address(&self, port: u8) -> Option<PortAddress> {
        let slot = self.port(port)?;
        Some(PortAddress::from_parts(self.net, self.subnet, slot.output_address))
    }

    pub fn input_port_address(&self, port: u8) -> Option<PortAddress> {
        let slot = self.port(port)?;
        Some(PortAddress::from_parts(self.net, self.subnet, slot.input_address))
    }

    /// First output-capable port serving `address`, if any.
    pub fn output_port_for(&self, address: PortAddress) -> Option<u8> {
        (0..self.port_count).find(|&port| {
            self.ports[port as usize].kind.output
                && self.output_port_address(port) == Some(address)
        })
    }

    fn port_mut(&mut self, port: u8) -> Result<&mut PortConfig, ConfigError> {
        if port >= self.port_count {
            return Err(ConfigError::PortOutOfRange {
                port,
                count: self.port_count,
            });
        }
        Ok(&mut self.ports[port as usize])
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{ConfigError, MergeMode, NodeConfig, PortProtocol, PortType};
    use crate::protocols::artnet::PortAddress;

    #[test]
    fn net_and_subnet_are_clamped() {
        let mut config = NodeConfig::default();
        config.set_net(200);
        config.set_subnet(128);
        assert_eq!(config.net(), 127);
        assert_eq!(config.subnet(), 127);
    }

    #[test]
    fn port_count_is_clamped_and_discards_removed_ports() {
        let mut config = NodeConfig::default();
        config.set_port_count(9);
        assert_eq!(config.port_count(), 4);
        config.set_port_type(3, PortType::output(PortProtocol::Dmx)).unwrap();
        config.set_port_address(3, 9).unwrap();

        config.set_port_count(2);
        config.set_port_count(4);
        assert_eq!(config.port_type(3), Some(PortType::default()));
        assert_eq!(config.port_output_address(3), Some(0));
    }

    #[test]
    fn port_setters_reject_out_of_range_index() {
        let mut config = NodeConfig::default();
        config.set_port_count(1);
        assert_eq!(
            config.set_merge_mode(1, MergeMode::Ltp),
            Err(ConfigError::PortOutOfRange { port: 1, count: 1 })
        );
        assert_eq!(config.port_type(1), None);
    }

    #[test]
    fn port_address_is_clamped_to_universe_nibble() {
        let mut config = NodeConfig::default();
        config.set_port_count(1);
        config.set_port_address(0, 0x42).unwrap();
        assert_eq!(config.port_output_address(0), Some(0x0f));
    }

    #[test]
    fn names_are_truncated() {
        let mut config = NodeConfig::default();
        config.set_short_name("this short name is far too long");
        assert_eq!(config.short_name().as_bytes().len(), 17);
        config.set_long_name(&"x".repeat(100));
        assert_eq!(config.long_name().as_bytes().len(), 63);
    }

    #[test]
    fn output_lookup_requires_output_direction() {
        let mut config = NodeConfig::default();
        config.set_port_count(2);
        config.set_port_type(0, PortType::input(PortProtocol::Dmx)).unwrap();
        config.set_port_type(1, PortType::output(PortProtocol::Dmx)).unwrap();
        config.set_port_address(0, 3).unwrap();
        config.set_port_address(1, 3).unwrap();

        assert_eq!(config.output_port_for(PortAddress::from_parts(0, 0, 3)), Some(1));
        assert_eq!(config.output_port_for(PortAddress::from_parts(0, 1, 3)), None);
    }

    #[test]
    fn subnet_high_bits_do_not_reach_port_address() {
        let mut config = NodeConfig::default();
        config.set_port_count(1);
        config.set_port_type(0, PortType::output(PortProtocol::Dmx)).unwrap();
        config.set_port_address(0, 4).unwrap();
        config.set_subnet(0x12);

        assert_eq!(config.subnet(), 0x12);
        assert_eq!(
            config.output_port_address(0),
            Some(PortAddress::from_parts(0, 2, 4))
        );
        assert_eq!(config.output_port_for(PortAddress::from_parts(0, 2, 4)), Some(0));
        assert_eq!(config.input_port_address(0), config.output_port_address(0));
    }

    #[test]
    fn reset_network_uses_mac_derived_address() {
        let mut config = NodeConfig::default();
        config.set_mac([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        config.set_ip(Ipv4Addr::new(10, 0, 0, 9));
        config.set_udp_port(7000);
        config.set_dhcp(true);

        config.reset_network();
        assert_eq!(config.ip(), Ipv4Addr::new(2, 0x33, 0x44, 0x55));
        assert_eq!(config.mask(), Ipv4Addr::new(255, 0, 0, 0));
        assert_eq!(config.udp_port(), 6454);
        assert!(!config.dhcp());
    }
}
