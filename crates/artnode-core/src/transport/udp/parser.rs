use std::net::SocketAddrV4;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;

use super::UDP_HEADER_LEN;
use super::error::UdpError;

/// IPv4 UDP datagram found inside a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpDatagram<'a> {
    pub source: SocketAddrV4,
    pub target: SocketAddrV4,
    pub payload: &'a [u8],
}

/// Slice a link-layer frame down to its UDP payload.
///
/// Returns `Ok(None)` for unsupported link types, non-UDP transports and
/// IPv6 traffic, none of which an Art-Net node receives.
pub fn parse_udp_datagram(
    linktype: Linktype,
    data: &[u8],
) -> Result<Option<UdpDatagram<'_>>, UdpError> {
    let sliced = match linktype {
        Linktype::ETHERNET => {
            SlicedPacket::from_ethernet(data).map_err(|e| UdpError::Malformed(e.to_string()))?
        }
        Linktype::RAW => SlicedPacket::from_ip(data).map_err(|e| UdpError::Malformed(e.to_string()))?,
        _ => return Ok(None),
    };

    let net = sliced.net.ok_or(UdpError::NoNetworkLayer)?;
    let udp = match sliced.transport {
        Some(TransportSlice::Udp(udp)) => udp,
        _ => return Ok(None),
    };
    let (source_ip, target_ip) = match net {
        NetSlice::Ipv4(ref ipv4) => (
            ipv4.header().source_addr(),
            ipv4.header().destination_addr(),
        ),
        NetSlice::Ipv6(_) => return Ok(None),
    };

    let ip_payload = net.ip_payload_ref().ok_or(UdpError::NoIpPayload)?;
    let payload = strip_udp_header(ip_payload.payload)?;

    Ok(Some(UdpDatagram {
        source: SocketAddrV4::new(source_ip, udp.source_port()),
        target: SocketAddrV4::new(target_ip, udp.destination_port()),
        payload,
    }))
}

fn strip_udp_header(segment: &[u8]) -> Result<&[u8], UdpError> {
    segment.get(UDP_HEADER_LEN..).ok_or(UdpError::TruncatedHeader {
        needed: UDP_HEADER_LEN,
        actual: segment.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use etherparse::PacketBuilder;
    use pcap_parser::Linktype;

    use super::{parse_udp_datagram, strip_udp_header};
    use crate::transport::udp::UdpError;

    #[test]
    fn parse_udp_ok() {
        let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
            .ipv4([192, 168, 0, 1], [192, 168, 0, 2], 64)
            .udp(6454, 6454);
        let payload = [1, 2, 3, 4];
        let mut packet = Vec::<u8>::with_capacity(builder.size(payload.len()));
        builder.write(&mut packet, &payload).unwrap();

        let parsed = parse_udp_datagram(Linktype::ETHERNET, &packet)
            .unwrap()
            .unwrap();
        assert_eq!(
            parsed.source,
            SocketAddrV4::new(Ipv4Addr::new(192, 168, 0, 1), 6454)
        );
        assert_eq!(parsed.target.port(), 6454);
        assert_eq!(parsed.payload, payload);
    }

    #[test]
    fn parse_non_udp() {
        let builder = PacketBuilder::ethernet2([1, 1, 1, 1, 1, 1], [2, 2, 2, 2, 2, 2])
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .tcp(1000, 1001, 0, 0);
        let payload = [0u8; 4];
        let mut packet = Vec::<u8>::with_capacity(builder.size(payload.len()));
        builder.write(&mut packet, &payload).unwrap();

        assert!(parse_udp_datagram(Linktype::ETHERNET, &packet)
            .unwrap()
            .is_none());
    }

    #[test]
    fn parse_slice_error() {
        let result = parse_udp_datagram(Linktype::ETHERNET, &[]);
        assert!(matches!(result, Err(UdpError::Malformed(_))));
    }

    #[test]
    fn short_segment() {
        let err = strip_udp_header(&[0u8; 7]).unwrap_err();
        assert!(matches!(err, UdpError::TruncatedHeader { needed: 8, actual: 7 }));
    }
}
