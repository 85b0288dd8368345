use std::ops::Range;

pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";
pub const ARTNET_PORT: u16 = 0x1936;
pub const PROTOCOL_VERSION: u16 = 14;

pub const OP_CODE_RANGE: Range<usize> = 8..10;
pub const HEADER_LEN: usize = 10;

pub const OP_POLL: u16 = 0x2000;
pub const OP_POLL_REPLY: u16 = 0x2100;
pub const OP_DMX: u16 = 0x5000;
pub const OP_ADDRESS: u16 = 0x6000;
pub const OP_TOD_REQUEST: u16 = 0x8000;
pub const OP_TOD_DATA: u16 = 0x8100;
pub const OP_IP_PROG: u16 = 0xF800;
pub const OP_IP_PROG_REPLY: u16 = 0xF900;

// Shared by every request variant.
pub const PROT_VER_RANGE: Range<usize> = 10..12;

pub const SHORT_NAME_LEN: usize = 18;
pub const LONG_NAME_LEN: usize = 64;
pub const NODE_REPORT_LEN: usize = 64;
pub const MAX_PORTS: usize = 4;

pub mod poll {
    pub const FLAGS_OFFSET: usize = 12;
    pub const PRIORITY_OFFSET: usize = 13;
    pub const LEN: usize = 14;
}

pub mod poll_reply {
    use std::ops::Range;

    pub const IP_RANGE: Range<usize> = 10..14;
    pub const PORT_RANGE: Range<usize> = 14..16;
    pub const VERSION_HI_OFFSET: usize = 16;
    pub const VERSION_LO_OFFSET: usize = 17;
    pub const NET_SWITCH_OFFSET: usize = 18;
    pub const SUB_SWITCH_OFFSET: usize = 19;
    pub const OEM_RANGE: Range<usize> = 20..22;
    pub const UBEA_VERSION_OFFSET: usize = 22;
    pub const STATUS1_OFFSET: usize = 23;
    pub const ESTA_MAN_LO_OFFSET: usize = 24;
    pub const ESTA_MAN_HI_OFFSET: usize = 25;
    pub const SHORT_NAME_RANGE: Range<usize> = 26..44;
    pub const LONG_NAME_RANGE: Range<usize> = 44..108;
    pub const NODE_REPORT_RANGE: Range<usize> = 108..172;
    pub const NUM_PORTS_RANGE: Range<usize> = 172..174;
    pub const PORT_TYPES_RANGE: Range<usize> = 174..178;
    pub const GOOD_INPUT_RANGE: Range<usize> = 178..182;
    pub const GOOD_OUTPUT_RANGE: Range<usize> = 182..186;
    pub const SW_IN_RANGE: Range<usize> = 186..190;
    pub const SW_OUT_RANGE: Range<usize> = 190..194;
    pub const SW_VIDEO_OFFSET: usize = 194;
    pub const SW_MACRO_OFFSET: usize = 195;
    pub const SW_REMOTE_OFFSET: usize = 196;
    pub const STYLE_OFFSET: usize = 200;
    pub const MAC_RANGE: Range<usize> = 201..207;
    pub const BIND_IP_RANGE: Range<usize> = 207..211;
    pub const BIND_INDEX_OFFSET: usize = 211;
    pub const STATUS2_OFFSET: usize = 212;
    pub const LEN: usize = 239;
}

pub mod dmx {
    use std::ops::Range;

    pub const SEQUENCE_OFFSET: usize = 12;
    pub const PHYSICAL_OFFSET: usize = 13;
    pub const SUB_UNI_OFFSET: usize = 14;
    pub const NET_OFFSET: usize = 15;
    pub const LENGTH_RANGE: Range<usize> = 16..18;
    pub const DATA_OFFSET: usize = 18;
    pub const MAX_SLOTS: usize = 512;
}

pub mod ip_prog {
    use std::ops::Range;

    pub const COMMAND_OFFSET: usize = 14;
    pub const IP_RANGE: Range<usize> = 16..20;
    pub const MASK_RANGE: Range<usize> = 20..24;
    pub const PORT_RANGE: Range<usize> = 24..26;
    pub const STATUS_OFFSET: usize = 26;
    pub const LEN: usize = 34;
}

pub mod address {
    use std::ops::Range;

    pub const NET_SWITCH_OFFSET: usize = 12;
    pub const BIND_INDEX_OFFSET: usize = 13;
    pub const SHORT_NAME_RANGE: Range<usize> = 14..32;
    pub const LONG_NAME_RANGE: Range<usize> = 32..96;
    pub const SW_IN_RANGE: Range<usize> = 96..100;
    pub const SW_OUT_RANGE: Range<usize> = 100..104;
    pub const SUB_SWITCH_OFFSET: usize = 104;
    pub const SW_VIDEO_OFFSET: usize = 105;
    pub const COMMAND_OFFSET: usize = 106;
    pub const LEN: usize = 107;

    /// Switch value meaning "leave unchanged".
    pub const NO_CHANGE: u8 = 0x7F;
    pub const PROGRAM_BIT: u8 = 0x80;
}

pub mod tod_request {
    pub const NET_OFFSET: usize = 21;
    pub const COMMAND_OFFSET: usize = 22;
    pub const AD_COUNT_OFFSET: usize = 23;
    pub const ADDRESS_OFFSET: usize = 24;
    pub const MAX_ADDRESSES: usize = 32;
    pub const HEADER_LEN: usize = 24;
}

pub mod tod_data {
    use std::ops::Range;

    pub const RDM_VERSION_OFFSET: usize = 12;
    pub const PORT_OFFSET: usize = 13;
    pub const BIND_INDEX_OFFSET: usize = 20;
    pub const NET_OFFSET: usize = 21;
    pub const COMMAND_RESPONSE_OFFSET: usize = 22;
    pub const ADDRESS_OFFSET: usize = 23;
    pub const UID_TOTAL_RANGE: Range<usize> = 24..26;
    pub const BLOCK_COUNT_OFFSET: usize = 26;
    pub const UID_COUNT_OFFSET: usize = 27;
    pub const UID_OFFSET: usize = 28;
    pub const UID_LEN: usize = 6;
    /// Maximum UIDs carried by one ArtTodData block.
    pub const MAX_UIDS: usize = 200;
    pub const HEADER_LEN: usize = 28;
    pub const RDM_VERSION_STANDARD: u8 = 0x01;
}
