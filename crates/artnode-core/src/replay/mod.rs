use std::net::SocketAddrV4;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::debug;

use crate::engine::{ArtNode, DeviceRegistry, Dispatch};
use crate::protocols::artnet::parse_header;
use crate::transport::udp::parse_udp_datagram;
use crate::transport::{PacketEvent, PacketSource, PcapFileSource, RecordingSink, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, ReplayReport, make_stub_report};

mod stats;

use stats::{FailureStats, OpcodeStats, UniverseStats};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Replay a pcap/pcapng file through `node`.
///
/// # Errors
/// Returns `ReplayError` when the capture cannot be opened or read.
pub fn replay_pcap_file<R: DeviceRegistry>(
    path: &Path,
    node: &mut ArtNode<R>,
) -> Result<ReplayReport, ReplayError> {
    let source = PcapFileSource::open(path)?;
    replay_source(path, source, node)
}

/// Feed every UDP datagram addressed to the node port into `node`.
///
/// Replies are collected instead of sent. Decode failures are counted in the
/// report, never returned.
pub fn replay_source<S: PacketSource, R: DeviceRegistry>(
    path: &Path,
    mut source: S,
    node: &mut ArtNode<R>,
) -> Result<ReplayReport, ReplayError> {
    let mut packets_total = 0u64;
    let mut datagrams_total = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut opcodes = OpcodeStats::default();
    let mut replies = OpcodeStats::default();
    let mut failures = FailureStats::default();
    let mut universes = UniverseStats::default();
    let mut sink = RecordingSink::new();

    while let Some(PacketEvent { ts, linktype, data }) = source.next_packet()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);
        let datagram = match parse_udp_datagram(linktype, &data) {
            Ok(Some(datagram)) => datagram,
            Ok(None) => continue,
            Err(err) => {
                debug!(%err, "frame skipped");
                continue;
            }
        };
        if datagram.target.port() != node.config().udp_port() {
            continue;
        }
        datagrams_total += 1;

        let source_ip = *datagram.source.ip();
        match node.handle_datagram(datagram.payload, source_ip, &mut sink) {
            Ok(dispatch) => {
                opcodes.add(dispatch.op_code());
                if let Dispatch::Dmx(frame) = &dispatch {
                    universes.add(frame);
                }
            }
            Err(err) => failures.add(&err, example(datagram.source, ts)),
        }
        for sent in sink.take() {
            if let Ok(op_code) = parse_header(&sent.payload) {
                replies.add(op_code);
            }
        }
    }

    let input_bytes = path.metadata()?.len();
    let mut report = make_stub_report(&path.display().to_string(), input_bytes, node.config());
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        datagrams_total,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.opcodes = opcodes.build();
    report.replies = replies.build();
    report.failures = failures.build();
    report.universes = universes.build(node.config());
    Ok(report)
}

fn example(source: SocketAddrV4, ts: Option<f64>) -> String {
    let ts = ts_to_rfc3339(ts).unwrap_or_else(|| "unknown".to_string());
    format!("source {source} @ {ts}")
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
