use std::fs;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;

use artnode_core::protocols::artnet::{ArtDmx, ArtPoll, PollFlags, encode_dmx, encode_poll};
use artnode_core::{
    ArtNode, NodeConfig, PacketSource, PcapFileSource, PcapNgWriter, PortAddress, PortProtocol,
    PortType, SequencePolicy, SourceError, replay_pcap_file,
};

const CONSOLE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const NODE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

fn dmx(sequence: u8, address: PortAddress) -> Vec<u8> {
    encode_dmx(&ArtDmx {
        protocol_version: 14,
        sequence,
        physical: 0,
        sub_uni: address.sub_uni(),
        net: address.net(),
        data: &[sequence, 0, 255],
    })
    .unwrap()
}

fn write_capture(path: &Path, datagrams: &[(u16, Vec<u8>)]) {
    let mut writer = PcapNgWriter::create(path).unwrap();
    for (idx, (port, payload)) in datagrams.iter().enumerate() {
        writer
            .write_datagram(
                (idx as u64) * 1_000_000,
                SocketAddrV4::new(CONSOLE, 6454),
                SocketAddrV4::new(NODE, *port),
                payload,
            )
            .unwrap();
    }
    writer.finish().unwrap();
}

fn node() -> ArtNode {
    let mut config = NodeConfig::default();
    config.set_ip(NODE);
    config.set_port_count(1);
    config
        .set_port_type(0, PortType::output(PortProtocol::Dmx))
        .unwrap();
    config.set_port_address(0, 1).unwrap();
    ArtNode::new(config).with_sequence_policy(SequencePolicy::DropDuplicates)
}

#[test]
fn recorded_capture_reads_back_every_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.pcapng");
    write_capture(
        &path,
        &[(6454, vec![1, 2, 3]), (6454, vec![4]), (5568, vec![5, 6])],
    );

    let mut source = PcapFileSource::open(&path).unwrap();
    let mut frames = 0;
    while let Some(event) = source.next_packet().unwrap() {
        let ts = event.ts.unwrap();
        assert!((ts - frames as f64).abs() < 1e-9);
        frames += 1;
    }
    assert_eq!(frames, 3);
}

#[test]
fn truncated_capture_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.pcapng");
    fs::write(&path, [0x0a, 0x0d, 0x0d]).unwrap();

    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn replay_reports_dispatch_failures_and_universes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.pcapng");
    let universe = PortAddress::from_parts(0, 0, 1);
    let poll = encode_poll(&ArtPoll {
        protocol_version: 14,
        flags: PollFlags::empty(),
        priority: 0,
    });
    write_capture(
        &path,
        &[
            (6454, poll),
            (6454, dmx(1, universe)),
            (6454, dmx(1, universe)),
            (6454, dmx(2, universe)),
            (6454, b"not art-net at all".to_vec()),
            (5568, dmx(3, universe)),
        ],
    );

    let mut node = node();
    let report = replay_pcap_file(&path, &mut node).unwrap();

    let summary = report.capture_summary.as_ref().unwrap();
    assert_eq!(summary.packets_total, 6);
    assert_eq!(summary.datagrams_total, 5);
    assert_eq!(summary.time_start.as_deref(), Some("1970-01-01T00:00:00Z"));
    assert_eq!(report.generated_at, "1970-01-01T00:00:05Z");

    let opcodes: Vec<_> = report
        .opcodes
        .iter()
        .map(|op| (op.name.as_str(), op.count))
        .collect();
    assert_eq!(opcodes, vec![("OpPoll", 1), ("OpDmx", 3)]);

    assert_eq!(report.replies.len(), 1);
    assert_eq!(report.replies[0].name, "OpPollReply");
    assert_eq!(report.replies[0].count, 1);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, "ARTNODE-NOT-ARTNET");
    assert_eq!(
        report.failures[0].examples,
        vec!["source 10.0.0.1:6454 @ 1970-01-01T00:00:04Z".to_string()]
    );

    assert_eq!(report.universes.len(), 1);
    let universe = &report.universes[0];
    assert_eq!(universe.label, "0:0:1");
    assert_eq!(universe.output_port, Some(0));
    assert_eq!(universe.frames, 3);
    assert_eq!(universe.accepted, 2);
    assert_eq!(universe.duplicates, 1);
    assert_eq!(universe.last_length, 3);
}

#[test]
fn replay_report_is_deterministic_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dmx.pcapng");
    write_capture(&path, &[(6454, dmx(1, PortAddress::from_parts(0, 0, 1)))]);

    let first = serde_json::to_string(&replay_pcap_file(&path, &mut node()).unwrap()).unwrap();
    let second = serde_json::to_string(&replay_pcap_file(&path, &mut node()).unwrap()).unwrap();
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["report_version"], 1);
    assert_eq!(value["node"]["ip"], "10.0.0.2");
}
