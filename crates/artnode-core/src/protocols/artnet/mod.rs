//! Art-Net protocol codec.
//!
//! The parser validates the `Art-Net\0` signature, reads the little-endian
//! opcode, then decodes exactly one fixed-layout variant per datagram. The
//! encoder is the mirror image: one function per variant, byte-exact output
//! regardless of host endianness. Every multi-byte field other than the
//! opcode is big-endian, except the ESTA manufacturer code which keeps its
//! historical lo/hi order.
//!
//! A buffer shorter than its variant's fixed layout is `TooShort`; a count
//! or length field promising more tail bytes than were received is
//! `PayloadOverrun`. Nothing is read past the end of the input.
//!
//! Version française (résumé):
//! Le module encode et décode les paquets Art-Net (signature, opcode en
//! petit-boutiste, puis une variante à disposition fixe). Les positions sont
//! dans `layout`, les lectures sûres dans `reader`, les écritures dans
//! `writer`.

pub mod command;
pub mod encoder;
pub mod error;
pub mod flags;
pub mod layout;
pub mod name;
pub mod packet;
pub mod parser;
pub mod reader;
pub mod uid;
pub mod writer;

pub use command::{AddressCommand, TodScope};
pub use encoder::{
    encode_address, encode_dmx, encode_ip_prog, encode_ip_prog_reply, encode_poll,
    encode_poll_reply, encode_tod_data, encode_tod_request,
};
pub use error::ArtNetError;
pub use flags::{GoodOutput, IpCommand, IpStatus, PollFlags, Status2};
pub use name::{FixedName, LongName, NodeReport, ShortName};
pub use packet::{
    ArtAddress, ArtDmx, ArtIpProg, ArtIpProgReply, ArtPacket, ArtPoll, ArtPollReply, ArtTodData,
    ArtTodRequest, OpCode, PortAddress,
};
pub use parser::{
    parse_address, parse_dmx, parse_header, parse_ip_prog, parse_ip_prog_reply, parse_packet,
    parse_poll, parse_poll_reply, parse_tod_data, parse_tod_request,
};
pub use uid::{Uid, UidParseError};
