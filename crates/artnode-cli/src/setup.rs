//! JSON node setup file.
//!
//! The file is the host-side setup routine: every value reaches the node
//! through `NodeConfig` setters, so the same clamping applies as for any
//! other caller. Missing fields keep their defaults.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::{Context, Result, bail};
use artnode_core::node::MAX_PORTS;
use artnode_core::{
    MergeMode, NodeConfig, OutputProtocol, PortProtocol, PortType, SequencePolicy, Uid,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeSetup {
    /// `aa:bb:cc:dd:ee:ff`
    pub mac: String,
    /// Defaults to the Art-Net factory address derived from `mac`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<Ipv4Addr>,
    pub mask: Ipv4Addr,
    pub udp_port: u16,
    pub dhcp: bool,
    pub net: u8,
    pub subnet: u8,
    pub short_name: String,
    pub long_name: String,
    pub version: VersionSetup,
    pub ports: Vec<PortSetup>,
    /// RDM devices reported in ArtTodData, as `mmmm:dddddddd`.
    pub devices: Vec<Uid>,
    pub sequence_policy: SequencePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionSetup {
    pub major: u8,
    pub minor: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortSetup {
    pub protocol: PortProtocol,
    pub input: bool,
    pub output: bool,
    /// Universe nibble (0-15), used for both directions.
    pub address: u8,
    pub merge: MergeMode,
    pub output_protocol: OutputProtocol,
}

impl Default for NodeSetup {
    fn default() -> Self {
        let config = NodeConfig::default();
        let version = config.version();
        Self {
            mac: format_mac(&config.mac()),
            ip: None,
            mask: config.mask(),
            udp_port: config.udp_port(),
            dhcp: config.dhcp(),
            net: config.net(),
            subnet: config.subnet(),
            short_name: config.short_name().to_string(),
            long_name: config.long_name().to_string(),
            version: VersionSetup {
                major: version.major,
                minor: version.minor,
            },
            ports: Vec::new(),
            devices: Vec::new(),
            sequence_policy: SequencePolicy::default(),
        }
    }
}

impl Default for VersionSetup {
    fn default() -> Self {
        let version = NodeConfig::default().version();
        Self {
            major: version.major,
            minor: version.minor,
        }
    }
}

impl Default for PortSetup {
    fn default() -> Self {
        Self {
            protocol: PortProtocol::Dmx,
            input: false,
            output: true,
            address: 0,
            merge: MergeMode::default(),
            output_protocol: OutputProtocol::default(),
        }
    }
}

impl NodeSetup {
    /// Sample file written by `artnode config init`.
    pub fn example() -> Self {
        Self {
            mac: "02:00:00:12:34:56".to_string(),
            ports: vec![
                PortSetup {
                    address: 0,
                    ..PortSetup::default()
                },
                PortSetup {
                    address: 1,
                    ..PortSetup::default()
                },
            ],
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read node setup: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid node setup: {}", path.display()))
    }

    /// Build the node configuration through its setters.
    pub fn to_config(&self) -> Result<NodeConfig> {
        if self.ports.len() > MAX_PORTS as usize {
            bail!(
                "{} ports configured, a node has at most {}",
                self.ports.len(),
                MAX_PORTS
            );
        }
        let mac = parse_mac(&self.mac)?;

        let mut config = NodeConfig::default();
        config.set_mac(mac);
        config.reset_network();
        if let Some(ip) = self.ip {
            config.set_ip(ip);
        }
        config.set_mask(self.mask);
        config.set_udp_port(self.udp_port);
        config.set_dhcp(self.dhcp);
        config.set_net(self.net);
        config.set_subnet(self.subnet);
        config.set_short_name(&self.short_name);
        config.set_long_name(&self.long_name);
        config.set_version(self.version.major, self.version.minor);
        config.set_port_count(self.ports.len() as u8);
        for (index, port) in self.ports.iter().enumerate() {
            let index = index as u8;
            config.set_port_type(
                index,
                PortType {
                    protocol: port.protocol,
                    input: port.input,
                    output: port.output,
                },
            )?;
            config.set_port_address(index, port.address)?;
            config.set_merge_mode(index, port.merge)?;
            config.set_output_protocol(index, port.output_protocol)?;
        }
        Ok(config)
    }
}

pub fn parse_mac(text: &str) -> Result<[u8; 6]> {
    let mut mac = [0u8; 6];
    let mut parts = text.split([':', '-']);
    for byte in &mut mac {
        let part = parts
            .next()
            .with_context(|| format!("MAC address needs six bytes: '{text}'"))?;
        *byte = u8::from_str_radix(part, 16)
            .with_context(|| format!("invalid MAC address byte '{part}' in '{text}'"))?;
    }
    if parts.next().is_some() {
        bail!("MAC address needs six bytes: '{text}'");
    }
    Ok(mac)
}

pub fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
