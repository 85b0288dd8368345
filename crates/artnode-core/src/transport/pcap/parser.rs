use std::fs::File;
use std::path::Path;

use pcap_parser::{
    Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader,
    traits::PcapReaderIterator,
};

use crate::transport::{PacketEvent, PacketSource, SourceError};

use super::error::CaptureError;
use super::layout;
use super::reader::{
    is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
    read_magic_and_rewind,
};

/// Frames from a pcap or pcapng file, in capture order.
pub struct PcapFileSource {
    inner: CaptureReader,
}

enum CaptureReader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Option<Linktype>,
    },
    Ng {
        reader: PcapNGReader<File>,
        linktypes: Vec<Linktype>,
    },
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self {
            inner: create_reader(file)?,
        })
    }
}

impl PacketSource for PcapFileSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        Ok(self.inner.next_event()?)
    }
}

fn create_reader(mut file: File) -> Result<CaptureReader, CaptureError> {
    let magic = read_magic_and_rewind(&mut file)?;
    if is_pcapng_magic(&magic) {
        let reader = PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
            .map_err(|e| pcap_error("pcapng reader init", e))?;
        Ok(CaptureReader::Ng {
            reader,
            linktypes: Vec::new(),
        })
    } else {
        let reader = LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
            .map_err(|e| pcap_error("pcap reader init", e))?;
        Ok(CaptureReader::Legacy {
            reader,
            linktype: None,
        })
    }
}

fn pcap_error<E: std::fmt::Display>(context: &'static str, err: E) -> CaptureError {
    CaptureError::Format {
        context,
        message: err.to_string(),
    }
}

/// What one reader step produced.
enum Step {
    Event(PacketEvent),
    Skip,
    Refill,
    Eof,
}

impl CaptureReader {
    fn next_event(&mut self) -> Result<Option<PacketEvent>, CaptureError> {
        loop {
            match self.step()? {
                Step::Event(event) => return Ok(Some(event)),
                Step::Skip => {}
                Step::Refill => self.refill()?,
                Step::Eof => return Ok(None),
            }
        }
    }

    fn step(&mut self) -> Result<Step, CaptureError> {
        match self {
            CaptureReader::Legacy { reader, linktype } => {
                let (offset, step) = match reader.next() {
                    Ok((offset, block)) => {
                        let step = match block {
                            PcapBlockOwned::LegacyHeader(header) => {
                                *linktype = Some(header.network);
                                Step::Skip
                            }
                            PcapBlockOwned::Legacy(packet) => Step::Event(PacketEvent {
                                ts: Some(legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec)),
                                linktype: linktype.unwrap_or(Linktype::ETHERNET),
                                data: packet.data.to_vec(),
                            }),
                            _ => Step::Skip,
                        };
                        (offset, step)
                    }
                    Err(err) => return classify(err, "pcap reader next"),
                };
                reader.consume(offset);
                Ok(step)
            }
            CaptureReader::Ng { reader, linktypes } => {
                let (offset, step) = match reader.next() {
                    Ok((offset, block)) => {
                        let step = match block {
                            PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                                linktypes.push(intf.linktype);
                                Step::Skip
                            }
                            PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => {
                                Step::Event(PacketEvent {
                                    ts: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                                    linktype: linktype_for_interface(linktypes, packet.if_id),
                                    data: packet.data.to_vec(),
                                })
                            }
                            _ => Step::Skip,
                        };
                        (offset, step)
                    }
                    Err(err) => return classify(err, "pcapng reader next"),
                };
                reader.consume(offset);
                Ok(step)
            }
        }
    }

    fn refill(&mut self) -> Result<(), CaptureError> {
        match self {
            CaptureReader::Legacy { reader, .. } => reader
                .refill()
                .map_err(|e| pcap_error("pcap reader refill", e)),
            CaptureReader::Ng { reader, .. } => reader
                .refill()
                .map_err(|e| pcap_error("pcapng reader refill", e)),
        }
    }
}

fn classify<I: std::fmt::Debug>(
    err: PcapError<I>,
    context: &'static str,
) -> Result<Step, CaptureError> {
    match err {
        PcapError::Eof => Ok(Step::Eof),
        PcapError::Incomplete(_) => Ok(Step::Refill),
        other => Err(pcap_error(context, format!("{other:?}"))),
    }
}
