//! Channel table as seen by the framing core.
//!
//! The table is built by whatever negotiated the channels; the framer only
//! reads it. Tables are small (one entry per joined static channel), so
//! lookups are a linear scan.

use std::fmt;

/// Maximum length of a static channel name, excluding the terminator.
pub const CHANNEL_NAME_LEN: usize = 7;

/// Clipboard redirection.
pub const CLIPRDR: &str = "cliprdr";
/// Device redirection.
pub const RDPDR: &str = "rdpdr";
/// Audio output.
pub const RDPSND: &str = "rdpsnd";
/// Dynamic virtual channel transport.
pub const DRDYNVC: &str = "drdynvc";
/// Remote applications.
pub const RAIL: &str = "rail";

/// Option bits negotiated for a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelOptions(u32);

impl ChannelOptions {
    pub const NONE: ChannelOptions = ChannelOptions(0);
    pub const INITIALIZED: ChannelOptions = ChannelOptions(0x8000_0000);
    pub const ENCRYPT_RDP: ChannelOptions = ChannelOptions(0x4000_0000);
    pub const ENCRYPT_SC: ChannelOptions = ChannelOptions(0x2000_0000);
    pub const ENCRYPT_CS: ChannelOptions = ChannelOptions(0x1000_0000);
    pub const PRI_HIGH: ChannelOptions = ChannelOptions(0x0800_0000);
    pub const PRI_MED: ChannelOptions = ChannelOptions(0x0400_0000);
    pub const PRI_LOW: ChannelOptions = ChannelOptions(0x0200_0000);
    pub const COMPRESS_RDP: ChannelOptions = ChannelOptions(0x0080_0000);
    pub const COMPRESS: ChannelOptions = ChannelOptions(0x0040_0000);
    /// Ask the client to mark outbound chunks with SHOW_PROTOCOL.
    pub const SHOW_PROTOCOL: ChannelOptions = ChannelOptions(0x0020_0000);
    pub const REMOTE_CONTROL_PERSISTENT: ChannelOptions = ChannelOptions(0x0010_0000);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: ChannelOptions) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ChannelOptions {
    type Output = ChannelOptions;

    fn bitor(self, rhs: ChannelOptions) -> ChannelOptions {
        ChannelOptions(self.0 | rhs.0)
    }
}

/// Opaque handle the application attached to an open channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle(pub u64);

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One joined channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub channel_id: u16,
    pub name: String,
    pub options: ChannelOptions,
    /// Present once the application opened the channel on the listener side.
    pub handle: Option<ChannelHandle>,
}

impl ChannelDescriptor {
    pub fn new(channel_id: u16, name: impl Into<String>, options: ChannelOptions) -> Self {
        Self {
            channel_id,
            name: name.into(),
            options,
            handle: None,
        }
    }

    pub fn with_handle(mut self, handle: ChannelHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// True if outbound chunks should carry SHOW_PROTOCOL.
    pub fn shows_protocol(&self) -> bool {
        self.options.contains(ChannelOptions::SHOW_PROTOCOL)
    }
}

/// The active channels of one connection.
#[derive(Debug, Clone, Default)]
pub struct ChannelTable {
    channels: Vec<ChannelDescriptor>,
}

impl ChannelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel while building the table.
    pub fn with_channel(mut self, channel: ChannelDescriptor) -> Self {
        self.channels.push(channel);
        self
    }

    /// Resolve a channel id.
    pub fn find(&self, channel_id: u16) -> Option<&ChannelDescriptor> {
        self.channels.iter().find(|c| c.channel_id == channel_id)
    }
}

/// Returns true if `name` fits the static channel name field.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= CHANNEL_NAME_LEN && name.is_ascii()
}
