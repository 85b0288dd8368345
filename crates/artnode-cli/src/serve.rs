use std::fs::File;
use std::io::BufWriter;
use std::net::{IpAddr, SocketAddr, SocketAddrV4, UdpSocket};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use artnode_core::{ArtNode, Dispatch, PcapNgWriter, StaticDeviceRegistry};
use tracing::{debug, info, trace, warn};

use crate::setup::NodeSetup;

/// Largest Art-Net datagram handled (ArtTodData with 200 UIDs is 1228 bytes).
const RECEIVE_BUFFER_LEN: usize = 2048;

pub struct ServeOptions {
    pub bind: Option<SocketAddr>,
    pub record: Option<PathBuf>,
    pub max_datagrams: Option<u64>,
}

/// Receive loop: one datagram at a time, replies sent on the same socket.
pub fn run(setup: &NodeSetup, options: ServeOptions) -> Result<()> {
    let config = setup.to_config()?;
    let bind = options.bind.unwrap_or_else(|| {
        SocketAddr::from(([0, 0, 0, 0], config.udp_port()))
    });
    let registry = StaticDeviceRegistry::new(setup.devices.clone());
    let mut node =
        ArtNode::with_registry(config, registry).with_sequence_policy(setup.sequence_policy);

    let mut socket =
        UdpSocket::bind(bind).with_context(|| format!("Failed to bind UDP socket: {bind}"))?;
    socket
        .set_broadcast(true)
        .context("Failed to enable broadcast")?;
    let local = match socket.local_addr().context("Failed to read local address")? {
        SocketAddr::V4(local) => local,
        SocketAddr::V6(local) => bail!("Art-Net is IPv4 only, bound to {local}"),
    };

    let mut recorder = options
        .record
        .as_ref()
        .map(|path| {
            PcapNgWriter::create(path)
                .with_context(|| format!("Failed to create capture: {}", path.display()))
        })
        .transpose()?;

    info!(
        %local,
        ip = %node.config().ip(),
        name = %node.config().short_name(),
        ports = node.config().port_count(),
        devices = node.registry().uids().len(),
        policy = ?node.sequence_policy(),
        "node listening"
    );

    let mut buf = [0u8; RECEIVE_BUFFER_LEN];
    let mut handled = 0u64;
    while options.max_datagrams.is_none_or(|max| handled < max) {
        let (len, peer) = socket
            .recv_from(&mut buf)
            .context("Failed to receive datagram")?;
        handled += 1;
        let source = match peer.ip() {
            IpAddr::V4(ip) => ip,
            IpAddr::V6(ip) => {
                debug!(%ip, "IPv6 datagram ignored");
                continue;
            }
        };
        let payload = &buf[..len];

        if let Some(writer) = recorder.as_mut() {
            record(writer, SocketAddrV4::new(source, peer.port()), local, payload)?;
        }

        match node.handle_datagram(payload, source, &mut socket) {
            Ok(dispatch) => log_dispatch(&dispatch),
            Err(err) => debug!(%source, %err, "datagram rejected"),
        }
    }

    if let Some(writer) = recorder {
        let written = writer.written();
        writer.finish().context("Failed to flush capture")?;
        info!(datagrams = written, "capture written");
    }
    Ok(())
}

fn record(
    writer: &mut PcapNgWriter<BufWriter<File>>,
    source: SocketAddrV4,
    local: SocketAddrV4,
    payload: &[u8],
) -> Result<()> {
    let ts_us = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_micros() as u64)
        .unwrap_or(0);
    writer
        .write_datagram(ts_us, source, local, payload)
        .context("Failed to record datagram")
}

/// Surface what the output collaborator would act on.
fn log_dispatch(dispatch: &Dispatch<'_>) {
    match dispatch {
        Dispatch::Dmx(frame) => trace!(
            universe = %frame.port_address,
            port = ?frame.port,
            len = frame.data.len(),
            accepted = frame.accepted,
            "dmx frame"
        ),
        Dispatch::IpProg {
            reply,
            applied: true,
            ..
        } => info!(
            ip = %reply.ip,
            mask = %reply.mask,
            port = reply.port,
            dhcp = reply.dhcp,
            "network reprogrammed"
        ),
        Dispatch::Address { action, .. } => match action {
            Some(action) => warn!(?action, "output action requested without an output driver"),
            None => info!("node addressed"),
        },
        Dispatch::PollReply(reply) => {
            debug!(ip = %reply.ip, name = %reply.short_name, "peer node announced");
        }
        Dispatch::TodRequest { blocks, .. } => debug!(blocks, "device table sent"),
        Dispatch::Unrecognized(op) => trace!(op = %format!("{op:#06x}"), "ignored"),
        Dispatch::Poll(_)
        | Dispatch::IpProg { .. }
        | Dispatch::IpProgReply(_)
        | Dispatch::TodData(_) => {}
    }
}
