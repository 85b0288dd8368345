//! Node engine: framer -> codec -> dispatcher -> handlers -> responder.
//!
//! `ArtNode` owns the node configuration, the DMX sequence tracker and the
//! device registry. `handle_datagram` processes exactly one received
//! datagram: it decodes the variant, runs the handler for its opcode and
//! sends any reply through the caller's `DatagramSink`. A datagram that fails
//! to decode leaves every piece of state untouched, and the engine is always
//! ready for the next one.
//!
//! Replies go to the sender's IP on port 6454. Send failures are logged and
//! never fail the call: delivery is best-effort.

use std::net::{Ipv4Addr, SocketAddrV4};

use serde::Serialize;
use tracing::{debug, warn};

use crate::node::{MAX_PORTS, NodeConfig};
use crate::protocols::artnet::{
    ArtAddress, ArtIpProg, ArtIpProgReply, ArtNetError, ArtPacket, ArtPoll, ArtPollReply,
    ArtTodData, ArtTodRequest, OpCode, PortAddress, layout, parse_packet,
};
use crate::transport::DatagramSink;

mod handlers;
pub mod registry;
pub mod responder;
pub mod sequence;

pub use registry::{DeviceRegistry, NoDevices, StaticDeviceRegistry};
pub use sequence::{SequencePolicy, SequenceStatus, SequenceTracker};

/// Side effect of an ArtAddress command that the output collaborator owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "port")]
pub enum OutputAction {
    CancelMerge,
    ResetRxFlags,
    ClearOutput(u8),
}

/// One ArtDmx frame, resolved against the node's output ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmxFrame<'a> {
    pub source: Ipv4Addr,
    pub port_address: PortAddress,
    /// Output port serving `port_address`, if this node has one.
    pub port: Option<u8>,
    pub sequence: u8,
    pub physical: u8,
    pub status: SequenceStatus,
    /// False when the sequence policy dropped the frame.
    pub accepted: bool,
    pub data: &'a [u8],
}

/// Outcome of one handled datagram, keyed by opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<'a> {
    Poll(ArtPoll),
    /// Another node's discovery reply.
    PollReply(Box<ArtPollReply>),
    Dmx(DmxFrame<'a>),
    IpProg {
        request: ArtIpProg,
        reply: ArtIpProgReply,
        applied: bool,
    },
    IpProgReply(ArtIpProgReply),
    Address {
        request: Box<ArtAddress>,
        action: Option<OutputAction>,
    },
    TodRequest {
        request: ArtTodRequest,
        blocks: usize,
    },
    TodData(ArtTodData),
    /// Valid Art-Net, opcode not handled by this node. Not an error.
    Unrecognized(u16),
}

impl Dispatch<'_> {
    pub fn op_code(&self) -> u16 {
        match self {
            Self::Poll(_) => layout::OP_POLL,
            Self::PollReply(_) => layout::OP_POLL_REPLY,
            Self::Dmx(_) => layout::OP_DMX,
            Self::IpProg { .. } => layout::OP_IP_PROG,
            Self::IpProgReply(_) => layout::OP_IP_PROG_REPLY,
            Self::Address { .. } => layout::OP_ADDRESS,
            Self::TodRequest { .. } => layout::OP_TOD_REQUEST,
            Self::TodData(_) => layout::OP_TOD_DATA,
            Self::Unrecognized(op) => *op,
        }
    }
}

/// Art-Net node protocol engine.
///
/// # Examples
/// ```
/// use std::net::Ipv4Addr;
///
/// use artnode_core::{ArtNode, Dispatch, NodeConfig, RecordingSink};
/// use artnode_core::protocols::artnet::{ArtPoll, PollFlags, encode_poll};
///
/// let mut config = NodeConfig::default();
/// config.set_ip(Ipv4Addr::new(192, 168, 1, 50));
/// let mut node = ArtNode::new(config);
/// let mut sink = RecordingSink::new();
///
/// let poll = encode_poll(&ArtPoll {
///     protocol_version: 14,
///     flags: PollFlags::empty(),
///     priority: 0,
/// });
/// let dispatch = node.handle_datagram(&poll, Ipv4Addr::new(192, 168, 1, 10), &mut sink)?;
/// assert!(matches!(dispatch, Dispatch::Poll(_)));
/// assert_eq!(&sink.sent()[0].payload[10..14], &[192, 168, 1, 50]);
/// # Ok::<(), artnode_core::ArtNetError>(())
/// ```
#[derive(Debug)]
pub struct ArtNode<R = NoDevices> {
    config: NodeConfig,
    registry: R,
    sequences: SequenceTracker,
    poll_replies: u32,
    active_outputs: [bool; MAX_PORTS as usize],
}

impl ArtNode<NoDevices> {
    pub fn new(config: NodeConfig) -> Self {
        Self::with_registry(config, NoDevices)
    }
}

impl<R: DeviceRegistry> ArtNode<R> {
    pub fn with_registry(config: NodeConfig, registry: R) -> Self {
        Self {
            config,
            registry,
            sequences: SequenceTracker::default(),
            poll_replies: 0,
            active_outputs: [false; MAX_PORTS as usize],
        }
    }

    pub fn with_sequence_policy(mut self, policy: SequencePolicy) -> Self {
        self.sequences = SequenceTracker::new(policy);
        self
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn sequence_policy(&self) -> SequencePolicy {
        self.sequences.policy()
    }

    /// Number of ArtPollReply packets built so far.
    pub fn poll_replies(&self) -> u32 {
        self.poll_replies
    }

    /// Decode and dispatch one datagram received from `source`.
    ///
    /// # Errors
    /// Returns the decode failure (`NotArtNet`, `TooShort`,
    /// `PayloadOverrun`, ...) without touching any state.
    pub fn handle_datagram<'a, S: DatagramSink + ?Sized>(
        &mut self,
        payload: &'a [u8],
        source: Ipv4Addr,
        sink: &mut S,
    ) -> Result<Dispatch<'a>, ArtNetError> {
        let packet = match parse_packet(payload) {
            Ok(packet) => packet,
            Err(err) => {
                debug!(%source, len = payload.len(), %err, "datagram rejected");
                return Err(err);
            }
        };
        if let Some(op) = OpCode::from_u16(packet.op_code()) {
            debug!(%source, %op, "dispatch");
        }

        let dispatch = match packet {
            ArtPacket::Poll(request) => self.handle_poll(request, source, sink),
            ArtPacket::Dmx(frame) => self.handle_dmx(frame, source),
            ArtPacket::IpProg(request) => self.handle_ip_prog(request, source, sink),
            ArtPacket::Address(request) => self.handle_address(request, source, sink),
            ArtPacket::TodRequest(request) => self.handle_tod_request(request, source, sink),
            ArtPacket::PollReply(reply) => Dispatch::PollReply(reply),
            ArtPacket::IpProgReply(reply) => Dispatch::IpProgReply(reply),
            ArtPacket::TodData(data) => Dispatch::TodData(data),
            ArtPacket::Unrecognized(op) => {
                debug!(%source, op = %format!("{op:#06x}"), "opcode ignored");
                Dispatch::Unrecognized(op)
            }
        };
        Ok(dispatch)
    }

    /// Send `payload` to the Art-Net port of `source`; failures are logged.
    fn reply<S: DatagramSink + ?Sized>(
        &self,
        sink: &mut S,
        payload: &[u8],
        source: Ipv4Addr,
        op: OpCode,
    ) {
        let target = SocketAddrV4::new(source, layout::ARTNET_PORT);
        if let Err(err) = sink.send_datagram(payload, target) {
            warn!(%target, %op, %err, "reply not sent");
        }
    }
}
