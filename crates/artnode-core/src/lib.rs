//! artnode core library: an Art-Net 4 node protocol engine.
//!
//! The engine turns one received UDP payload at a time into a typed packet,
//! dispatches it by opcode against the node configuration, and hands any
//! reply back to the host through a `DatagramSink`. Decoding is byte-oriented
//! and side-effect free (`protocols`, organised as layout/reader/parser and
//! writer/encoder); state lives in `node` and `engine`; all I/O is isolated in
//! `transport`. Captures can be replayed through an engine to produce a
//! deterministic report (`replay`).
//!
//! Invariants:
//! - A datagram that fails to decode never mutates the node.
//! - The port table holds at most four ports and is only indexed below the
//!   port count; names are always NUL-terminated within their field.
//! - Reports are deterministic and stable across runs.
//!
//! Version française (résumé):
//! Cette crate fournit le moteur d'un nœud Art-Net : décodage d'un datagramme
//! (layout/reader/parser), mise à jour de la configuration du nœud, puis
//! réponse encodée (writer/encoder) envoyée via `DatagramSink`. Les E/S restent
//! dans `transport`. Le rejeu d'une capture produit un rapport déterministe.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use artnode_core::{ArtNode, NodeConfig, replay_pcap_file};
//!
//! let mut node = ArtNode::new(NodeConfig::default());
//! let report = replay_pcap_file(Path::new("capture.pcapng"), &mut node)?;
//! println!("datagrams: {:?}", report.capture_summary.map(|s| s.datagrams_total));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::Serialize;

pub mod engine;
pub mod node;
pub mod protocols;
mod replay;
pub mod transport;

pub use engine::{
    ArtNode, DeviceRegistry, Dispatch, DmxFrame, NoDevices, OutputAction, SequencePolicy,
    SequenceStatus, StaticDeviceRegistry,
};
pub use node::{
    ConfigError, FirmwareVersion, Indicator, MergeMode, NodeConfig, OutputProtocol, PortConfig,
    PortProtocol, PortType,
};
pub use protocols::artnet::{ArtNetError, PortAddress, Uid, UidParseError};
pub use replay::{ReplayError, replay_pcap_file, replay_source};
pub use transport::{
    DatagramSink, PacketEvent, PacketSource, PcapFileSource, PcapNgWriter, RecordingSink,
    SentDatagram, SourceError,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";
/// Most examples kept per failure kind.
pub const MAX_FAILURE_EXAMPLES: usize = 3;

/// Result of replaying a capture through a node, in stable order.
///
/// # Examples
/// ```
/// use artnode_core::{NodeConfig, make_stub_report};
///
/// let report = make_stub_report("capture.pcapng", 123, &NodeConfig::default());
/// assert_eq!(report.report_version, artnode_core::REPORT_VERSION);
/// assert!(report.opcodes.is_empty());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the last captured frame, or the epoch.
    pub generated_at: String,
    pub input: InputInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Handled datagrams per opcode, sorted by opcode.
    pub opcodes: Vec<OpcodeCount>,
    /// Rejected datagrams per failure kind, sorted by id.
    pub failures: Vec<FailureSummary>,
    /// Replies the node sent, per opcode.
    pub replies: Vec<OpcodeCount>,
    /// ArtDmx traffic per Port-Address, sorted by address.
    pub universes: Vec<UniverseSummary>,
    /// Node configuration after the last datagram.
    pub node: NodeConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    /// Input path as provided to the replay.
    pub path: String,
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
#[derive(Debug, Clone, Serialize)]
pub struct CaptureSummary {
    /// Link-layer frames read from the capture.
    pub packets_total: u64,
    /// UDP datagrams addressed to the node port.
    pub datagrams_total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpcodeCount {
    /// Hex opcode, e.g. `0x2000`.
    pub op_code: String,
    /// Art-Net name (`OpPoll`), or `unknown`.
    pub name: String,
    pub count: u64,
}

/// Aggregated decode failures of one kind.
///
/// # Examples
/// ```
/// use artnode_core::FailureSummary;
///
/// let failure = FailureSummary {
///     id: "ARTNODE-TOO-SHORT".to_string(),
///     message: "Datagram shorter than its opcode layout".to_string(),
///     count: 1,
///     examples: vec!["source 10.0.0.1:6454 @ 1970-01-01T00:00:00Z".to_string()],
/// };
/// assert_eq!(failure.count, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureSummary {
    /// Stable failure identifier (e.g., `ARTNODE-NOT-ARTNET`).
    pub id: String,
    pub message: String,
    pub count: u64,
    /// At most three example contexts, formatted as `source ip:port @ ts`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// ArtDmx statistics for one Port-Address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniverseSummary {
    /// 15-bit Port-Address.
    pub port_address: u16,
    /// `net:subnet:universe`.
    pub label: String,
    /// Output port of the node serving this address, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_port: Option<u8>,
    pub frames: u64,
    pub accepted: u64,
    pub duplicates: u64,
    pub out_of_order: u64,
    /// Senders in address order.
    pub sources: Vec<String>,
    /// Slot count of the last frame.
    pub last_length: usize,
}

/// Build a report with base fields filled and empty aggregates.
pub fn make_stub_report(input_path: &str, input_bytes: u64, node: &NodeConfig) -> ReplayReport {
    ReplayReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "artnode".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        opcodes: vec![],
        failures: vec![],
        replies: vec![],
        universes: vec![],
        node: node.clone(),
    }
}
