use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::path::{Path, PathBuf};
use std::time::Duration;

use artnode_core::PcapNgWriter;
use artnode_core::protocols::artnet::{ArtDmx, ArtPoll, PollFlags, encode_dmx, encode_poll};
use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const CONSOLE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("artnode"))
}

fn poll() -> Vec<u8> {
    encode_poll(&ArtPoll {
        protocol_version: 14,
        flags: PollFlags::empty(),
        priority: 0,
    })
}

fn dmx(sequence: u8) -> Vec<u8> {
    encode_dmx(&ArtDmx {
        protocol_version: 14,
        sequence,
        physical: 0,
        sub_uni: 0,
        net: 0,
        data: &[255, 128, 0, 0],
    })
    .expect("dmx")
}

/// Poll, two DMX frames for universe 0:0:0 and one datagram that is not Art-Net.
fn sample_capture(dir: &Path) -> PathBuf {
    let path = dir.join("session.pcapng");
    let mut writer = PcapNgWriter::create(&path).expect("capture");
    let target = SocketAddrV4::new(Ipv4Addr::new(2, 18, 52, 86), 6454);
    let payloads = [poll(), dmx(1), dmx(2), b"hello".to_vec()];
    for (idx, payload) in payloads.iter().enumerate() {
        writer
            .write_datagram(
                idx as u64 * 1_000_000,
                SocketAddrV4::new(CONSOLE, 6454),
                target,
                payload,
            )
            .expect("write");
    }
    writer.finish().expect("finish");
    path
}

fn write_example_setup(dir: &Path) -> PathBuf {
    let path = dir.join("node.json");
    cmd()
        .args(["config", "init", "-o"])
        .arg(&path)
        .assert()
        .success();
    path
}

#[test]
fn help_supports_replay_and_analyse() {
    cmd().args(["replay", "--help"]).assert().success();
    cmd().args(["analyse", "--help"]).assert().success();
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("serve").and(contains("config")));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.pcapng");
    let report = temp.path().join("report.json");

    cmd()
        .arg("replay")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.txt");
    std::fs::write(&input, b"not a capture").expect("write");

    cmd()
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format"));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());

    cmd()
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .arg("-o")
        .arg(temp.path().join("report.json"))
        .assert()
        .failure();
}

#[test]
fn report_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());

    cmd()
        .arg("replay")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(contains("must differ from input"));
}

#[test]
fn replay_stdout_emits_report() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());
    let setup = write_example_setup(temp.path());

    let output = cmd()
        .arg("replay")
        .arg(&input)
        .arg("--config")
        .arg(&setup)
        .arg("--stdout")
        .output()
        .expect("run");
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["report_version"], 1);
    assert_eq!(report["tool"]["name"], "artnode");
    assert_eq!(report["capture_summary"]["datagrams_total"], 4);
    assert_eq!(report["generated_at"], "1970-01-01T00:00:03Z");
    assert_eq!(report["replies"][0]["name"], "OpPollReply");
    assert_eq!(report["failures"][0]["id"], "ARTNODE-NOT-ARTNET");
    assert_eq!(report["universes"][0]["label"], "0:0:0");
    assert_eq!(report["universes"][0]["output_port"], 0);
    assert_eq!(report["universes"][0]["frames"], 2);
    assert_eq!(report["node"]["short_name"], "artnode");
}

#[test]
fn replay_writes_report_file_and_strict_fails_on_failures() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());
    let report = temp.path().join("out").join("report.json");

    cmd()
        .arg("replay")
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--pretty")
        .assert()
        .success()
        .stderr(contains("OK: report written"));
    let text = std::fs::read_to_string(&report).expect("report");
    assert!(text.contains("\n  \"report_version\": 1"));

    cmd()
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .arg("--strict")
        .arg("--list-failures")
        .assert()
        .code(2)
        .stderr(contains("ARTNODE-NOT-ARTNET").and(contains("decode failures detected")));
}

#[test]
fn glob_with_multiple_matches_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    sample_capture(temp.path());
    std::fs::copy(
        temp.path().join("session.pcapng"),
        temp.path().join("session-2.pcapng"),
    )
    .expect("copy");
    let pattern = temp.path().join("session*.pcapng");

    cmd()
        .arg("replay")
        .arg(pattern)
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("multiple files match pattern"));
}

#[test]
fn config_init_and_check() {
    let temp = TempDir::new().expect("tempdir");
    let setup = write_example_setup(temp.path());

    cmd()
        .args(["config", "init", "-o"])
        .arg(&setup)
        .assert()
        .code(2)
        .stderr(contains("refusing to overwrite"));

    cmd()
        .args(["config", "check"])
        .arg(&setup)
        .assert()
        .success()
        .stdout(
            contains("02:00:00:12:34:56")
                .and(contains("2 port(s)"))
                .and(contains("port 1: type 0x80, input 0:0:1, output 0:0:1")),
        );
}

#[test]
fn config_check_rejects_unknown_fields() {
    let temp = TempDir::new().expect("tempdir");
    let setup = temp.path().join("node.json");
    std::fs::write(&setup, r#"{ "short_name": "x", "colour": "red" }"#).expect("write");

    cmd()
        .args(["config", "check"])
        .arg(&setup)
        .assert()
        .code(2)
        .stderr(contains("Invalid node setup").and(contains("hint:")));
}

#[test]
fn serve_records_received_datagrams() {
    let temp = TempDir::new().expect("tempdir");
    let capture = temp.path().join("live.pcapng");
    let port = {
        let probe = UdpSocket::bind("127.0.0.1:0").expect("probe");
        probe.local_addr().expect("addr").port()
    };

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin!("artnode"))
        .args(["serve", "--max-datagrams", "1", "--bind"])
        .arg(format!("127.0.0.1:{port}"))
        .arg("--record")
        .arg(&capture)
        .spawn()
        .expect("spawn");

    let client = UdpSocket::bind("127.0.0.1:0").expect("client");
    let payload = poll();
    let mut status = None;
    for _ in 0..100 {
        let _ = client.send_to(&payload, ("127.0.0.1", port));
        std::thread::sleep(Duration::from_millis(50));
        if let Some(exit) = child.try_wait().expect("wait") {
            status = Some(exit);
            break;
        }
    }
    let status = match status {
        Some(status) => status,
        None => {
            let _ = child.kill();
            panic!("serve did not stop after one datagram");
        }
    };
    assert!(status.success());

    let report: Value = serde_json::from_slice(
        &cmd()
            .arg("replay")
            .arg(&capture)
            .arg("--stdout")
            .output()
            .expect("run")
            .stdout,
    )
    .expect("json");
    assert_eq!(report["capture_summary"]["datagrams_total"], 0);
    assert_eq!(report["capture_summary"]["packets_total"], 1);
}
