use bitflags::bitflags;

bitflags! {
    /// ArtIpProg command byte.
    ///
    /// Nothing is written to the node unless `PROGRAM` is set; without it the
    /// request is a read-only query.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IpCommand: u8 {
        const PROGRAM = 0x80;
        const ENABLE_DHCP = 0x40;
        const RESET_DEFAULT = 0x08;
        const SET_IP = 0x04;
        const SET_MASK = 0x02;
        const SET_PORT = 0x01;
    }
}

bitflags! {
    /// ArtIpProgReply status byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IpStatus: u8 {
        const DHCP_ENABLED = 0x40;
    }
}

bitflags! {
    /// ArtPoll "TalkToMe" flags. Informational for this node.
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// - - - T U D C -
    /// ```
    /// - `C`: send ArtPollReply whenever node conditions change
    /// - `D`: send diagnostics messages
    /// - `U`: diagnostics are unicast (broadcast otherwise)
    /// - `T`: disable VLC transmission
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PollFlags: u8 {
        const REPLY_ON_CHANGE = 0x02;
        const SEND_DIAGNOSTICS = 0x04;
        const DIAGNOSTICS_UNICAST = 0x08;
        const DISABLE_VLC = 0x10;
    }
}

bitflags! {
    /// Per-port GoodOutput byte of ArtPollReply.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GoodOutput: u8 {
        const DATA_TRANSMITTED = 0x80;
        const MERGE_LTP = 0x02;
        const OUTPUT_SACN = 0x01;
    }
}

bitflags! {
    /// ArtPollReply Status2 byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status2: u8 {
        const PORT_ADDRESS_15BIT = 0x08;
        const DHCP_CAPABLE = 0x04;
        const DHCP_CONFIGURED = 0x02;
    }
}
