use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use crate::engine::{DmxFrame, SequenceStatus};
use crate::node::NodeConfig;
use crate::protocols::artnet::{ArtNetError, OpCode, PortAddress};
use crate::{FailureSummary, MAX_FAILURE_EXAMPLES, OpcodeCount, UniverseSummary};

#[derive(Debug, Default)]
pub(super) struct OpcodeStats {
    counts: BTreeMap<u16, u64>,
}

impl OpcodeStats {
    pub(super) fn add(&mut self, op_code: u16) {
        *self.counts.entry(op_code).or_default() += 1;
    }

    pub(super) fn build(self) -> Vec<OpcodeCount> {
        self.counts
            .into_iter()
            .map(|(op_code, count)| OpcodeCount {
                op_code: format!("{op_code:#06x}"),
                name: OpCode::from_u16(op_code)
                    .map(|op| op.name().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                count,
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct FailureEntry {
    count: u64,
    examples: Vec<String>,
}

#[derive(Debug, Default)]
pub(super) struct FailureStats {
    entries: BTreeMap<&'static str, FailureEntry>,
}

impl FailureStats {
    pub(super) fn add(&mut self, err: &ArtNetError, example: String) {
        let entry = self.entries.entry(failure_id(err)).or_default();
        entry.count += 1;
        if entry.examples.len() < MAX_FAILURE_EXAMPLES {
            entry.examples.push(example);
        }
    }

    pub(super) fn build(self) -> Vec<FailureSummary> {
        self.entries
            .into_iter()
            .map(|(id, entry)| FailureSummary {
                id: id.to_string(),
                message: failure_message(id).to_string(),
                count: entry.count,
                examples: entry.examples,
            })
            .collect()
    }
}

fn failure_id(err: &ArtNetError) -> &'static str {
    match err {
        ArtNetError::NotArtNet => "ARTNODE-NOT-ARTNET",
        ArtNetError::TooShort { .. } => "ARTNODE-TOO-SHORT",
        ArtNetError::PayloadOverrun { .. } => "ARTNODE-PAYLOAD-OVERRUN",
        ArtNetError::InvalidLength { .. } => "ARTNODE-INVALID-LENGTH",
        ArtNetError::TooManyEntries { .. } => "ARTNODE-TOO-MANY-ENTRIES",
    }
}

fn failure_message(id: &str) -> &'static str {
    match id {
        "ARTNODE-NOT-ARTNET" => "Datagram on the Art-Net port without the Art-Net signature",
        "ARTNODE-TOO-SHORT" => "Datagram shorter than its opcode layout",
        "ARTNODE-PAYLOAD-OVERRUN" => "Declared length or count exceeds the received bytes",
        "ARTNODE-INVALID-LENGTH" => "ArtDmx length above 512 slots",
        _ => "List count above the protocol maximum",
    }
}

#[derive(Debug, Default)]
struct UniverseEntry {
    frames: u64,
    accepted: u64,
    duplicates: u64,
    out_of_order: u64,
    sources: BTreeSet<Ipv4Addr>,
    last_length: usize,
}

#[derive(Debug, Default)]
pub(super) struct UniverseStats {
    entries: BTreeMap<PortAddress, UniverseEntry>,
}

impl UniverseStats {
    pub(super) fn add(&mut self, frame: &DmxFrame<'_>) {
        let entry = self.entries.entry(frame.port_address).or_default();
        entry.frames += 1;
        if frame.accepted {
            entry.accepted += 1;
        }
        match frame.status {
            SequenceStatus::Duplicate => entry.duplicates += 1,
            SequenceStatus::OutOfOrder => entry.out_of_order += 1,
            SequenceStatus::Untracked | SequenceStatus::InOrder => {}
        }
        entry.sources.insert(frame.source);
        entry.last_length = frame.data.len();
    }

    /// Output ports are resolved against the final configuration.
    pub(super) fn build(self, config: &NodeConfig) -> Vec<UniverseSummary> {
        self.entries
            .into_iter()
            .map(|(address, entry)| UniverseSummary {
                port_address: address.as_u16(),
                label: address.to_string(),
                output_port: config.output_port_for(address),
                frames: entry.frames,
                accepted: entry.accepted,
                duplicates: entry.duplicates,
                out_of_order: entry.out_of_order,
                sources: entry.sources.iter().map(ToString::to_string).collect(),
                last_length: entry.last_length,
            })
            .collect()
    }
}
