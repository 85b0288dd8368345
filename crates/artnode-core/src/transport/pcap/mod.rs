//! PCAP/PCAPNG capture support.
//!
//! `PcapFileSource` replays frames from pcap or pcapng files; `PcapNgWriter`
//! records datagrams received by a live node so they can be replayed later.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

pub use parser::PcapFileSource;
pub use writer::PcapNgWriter;
