use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use bytes::{BufMut, BytesMut};
use rdpvc_transport::StreamCursor;

use crate::error::{RecvError, SendError};

/// Chunk envelope: total_length (4) + flags (4) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Default negotiated chunk size (`CHANNEL_CHUNK_LENGTH`).
pub const CHANNEL_CHUNK_LENGTH: usize = 1600;

/// Largest chunk size a peer may advertise (`CHANNEL_CHUNK_MAX_LENGTH`).
pub const CHANNEL_CHUNK_MAX_LENGTH: usize = 16256;

/// Ceiling for `total_length`, bounded by the 32-bit wire field.
pub const MAX_TOTAL_LENGTH: usize = u32::MAX as usize;

/// Per-chunk flag bits carried in the envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChunkFlags(u32);

impl ChunkFlags {
    pub const NONE: ChunkFlags = ChunkFlags(0);
    /// First chunk of a message.
    pub const FIRST: ChunkFlags = ChunkFlags(0x0000_0001);
    /// Final chunk of a message.
    pub const LAST: ChunkFlags = ChunkFlags(0x0000_0002);
    /// Client-originated chunk on a channel that asked for protocol visibility.
    pub const SHOW_PROTOCOL: ChunkFlags = ChunkFlags(0x0000_0010);
    pub const SUSPEND: ChunkFlags = ChunkFlags(0x0000_0020);
    pub const RESUME: ChunkFlags = ChunkFlags(0x0000_0040);
    pub const SHADOW_PERSISTENT: ChunkFlags = ChunkFlags(0x0000_0080);
    pub const COMPRESSION_TYPE_MASK: ChunkFlags = ChunkFlags(0x000F_0000);
    pub const PACKET_COMPRESSED: ChunkFlags = ChunkFlags(0x0020_0000);
    pub const PACKET_AT_FRONT: ChunkFlags = ChunkFlags(0x0040_0000);
    pub const PACKET_FLUSHED: ChunkFlags = ChunkFlags(0x0080_0000);

    const NAMED: [(ChunkFlags, &'static str); 9] = [
        (Self::FIRST, "FIRST"),
        (Self::LAST, "LAST"),
        (Self::SHOW_PROTOCOL, "SHOW_PROTOCOL"),
        (Self::SUSPEND, "SUSPEND"),
        (Self::RESUME, "RESUME"),
        (Self::SHADOW_PERSISTENT, "SHADOW_PERSISTENT"),
        (Self::PACKET_COMPRESSED, "PACKET_COMPRESSED"),
        (Self::PACKET_AT_FRONT, "PACKET_AT_FRONT"),
        (Self::PACKET_FLUSHED, "PACKET_FLUSHED"),
    ];

    /// Wrap raw wire bits. Unknown bits are preserved.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw wire bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if every bit of `other` is set.
    pub const fn contains(self, other: ChunkFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: ChunkFlags) {
        self.0 |= other.0;
    }

    /// Names of the known bits that are set, lowest bit first.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for ChunkFlags {
    type Output = ChunkFlags;

    fn bitor(self, rhs: ChunkFlags) -> ChunkFlags {
        ChunkFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChunkFlags {
    fn bitor_assign(&mut self, rhs: ChunkFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ChunkFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        let known = Self::NAMED
            .iter()
            .fold(0u32, |acc, (flag, _)| acc | flag.0);
        let unknown = self.0 & !known;

        if names.is_empty() && unknown == 0 {
            return f.write_str("NONE");
        }
        f.write_str(&names.join("|"))?;
        if unknown != 0 {
            if !names.is_empty() {
                f.write_str("|")?;
            }
            write!(f, "{unknown:#010x}")?;
        }
        Ok(())
    }
}

/// The 8-byte envelope at the front of every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Length of the complete message, identical on every chunk of it.
    pub total_length: u32,
    /// Per-chunk flags.
    pub flags: ChunkFlags,
}

impl ChunkHeader {
    pub fn new(total_length: u32, flags: ChunkFlags) -> Self {
        Self {
            total_length,
            flags,
        }
    }
}

/// Encode an envelope into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────────┬────────────────────┬─────────────────────────┐
/// │ total_length (4B)  │ flags (4B)         │ chunk body              │
/// │ u32 LE             │ u32 LE             │ (unit length - 8 bytes) │
/// └────────────────────┴────────────────────┴─────────────────────────┘
/// ```
pub fn encode_header(header: &ChunkHeader, dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE);
    dst.put_u32_le(header.total_length);
    dst.put_u32_le(header.flags.bits());
}

/// Decode an envelope from the cursor and advance past it.
///
/// Fails with [`RecvError::TruncatedHeader`] without moving the cursor when
/// fewer than [`HEADER_SIZE`] bytes remain.
pub fn decode_header(cursor: &mut StreamCursor<'_>) -> Result<ChunkHeader, RecvError> {
    let available = cursor.remaining_len();
    if available < HEADER_SIZE {
        return Err(RecvError::TruncatedHeader {
            available,
            needed: HEADER_SIZE,
        });
    }

    let truncated = |_| RecvError::TruncatedHeader {
        available,
        needed: HEADER_SIZE,
    };
    let total_length = cursor.read_u32_le().map_err(truncated)?;
    let flags = cursor.read_u32_le().map_err(truncated)?;
    Ok(ChunkHeader::new(total_length, ChunkFlags::from_bits(flags)))
}

/// Which side of the connection this framer serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    /// Outbound-initiated (client) side.
    #[default]
    Initiator,
    /// Accepting (server) side.
    Listener,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Initiator => "initiator",
            Role::Listener => "listener",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the chunk writer.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Negotiated maximum chunk body size. Default: 1600.
    pub max_chunk_size: usize,
    /// Operating role; decides whether SHOW_PROTOCOL may be emitted.
    pub role: Role,
}

impl ChunkConfig {
    /// Reject chunk sizes that are zero or above the protocol maximum.
    pub fn validate(&self) -> Result<(), SendError> {
        if self.max_chunk_size == 0 || self.max_chunk_size > CHANNEL_CHUNK_MAX_LENGTH {
            return Err(SendError::InvalidChunkSize(self.max_chunk_size));
        }
        Ok(())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: CHANNEL_CHUNK_LENGTH,
            role: Role::Initiator,
        }
    }
}

/// Number of chunks a payload of `payload_len` bytes is split into.
///
/// An empty payload still takes one chunk.
pub fn chunk_count(payload_len: usize, max_chunk_size: usize) -> usize {
    if payload_len == 0 || max_chunk_size == 0 {
        return 1;
    }
    payload_len.div_ceil(max_chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<ChunkHeader, RecvError> {
        let mut cursor = StreamCursor::new(bytes);
        decode_header(&mut cursor)
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let cases = [
            (0u32, ChunkFlags::NONE),
            (5000, ChunkFlags::FIRST),
            (1, ChunkFlags::FIRST | ChunkFlags::LAST | ChunkFlags::SHOW_PROTOCOL),
            (u32::MAX, ChunkFlags::from_bits(u32::MAX)),
        ];

        for (total_length, flags) in cases {
            let mut buf = BytesMut::new();
            encode_header(&ChunkHeader::new(total_length, flags), &mut buf);
            assert_eq!(buf.len(), HEADER_SIZE);

            let header = decode(&buf).unwrap();
            assert_eq!(header.total_length, total_length);
            assert_eq!(header.flags, flags);
        }
    }

    #[test]
    fn test_wire_layout_is_little_endian() {
        let mut buf = BytesMut::new();
        encode_header(
            &ChunkHeader::new(0x0102_0304, ChunkFlags::FIRST | ChunkFlags::LAST),
            &mut buf,
        );
        assert_eq!(&buf[..], &[0x04, 0x03, 0x02, 0x01, 0x03, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_decode_advances_cursor_by_header() {
        let bytes = [0x10, 0, 0, 0, 0x01, 0, 0, 0, 0xAA, 0xBB];
        let mut cursor = StreamCursor::new(&bytes);

        let header = decode_header(&mut cursor).unwrap();
        assert_eq!(header.total_length, 16);
        assert_eq!(header.flags, ChunkFlags::FIRST);
        assert_eq!(cursor.position(), HEADER_SIZE);
        assert_eq!(cursor.peek_bytes(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_decode_truncated_header() {
        let bytes = [0u8; 7];
        let mut cursor = StreamCursor::new(&bytes);

        let err = decode_header(&mut cursor).unwrap_err();
        assert!(matches!(
            err,
            RecvError::TruncatedHeader {
                available: 7,
                needed: HEADER_SIZE
            }
        ));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_flag_display() {
        assert_eq!(ChunkFlags::NONE.to_string(), "NONE");
        assert_eq!((ChunkFlags::FIRST | ChunkFlags::LAST).to_string(), "FIRST|LAST");
        assert_eq!(
            (ChunkFlags::LAST | ChunkFlags::from_bits(0x0100)).to_string(),
            "LAST|0x00000100"
        );
    }

    #[test]
    fn test_flag_contains_and_insert() {
        let mut flags = ChunkFlags::FIRST;
        assert!(!flags.contains(ChunkFlags::LAST));
        flags.insert(ChunkFlags::LAST);
        assert!(flags.contains(ChunkFlags::FIRST | ChunkFlags::LAST));
        assert!(ChunkFlags::NONE.is_empty());
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 1600), 1);
        assert_eq!(chunk_count(1600, 1600), 1);
        assert_eq!(chunk_count(1601, 1600), 2);
        assert_eq!(chunk_count(5000, 1600), 4);
    }

    #[test]
    fn test_config_validation() {
        assert!(ChunkConfig::default().validate().is_ok());

        let cfg = ChunkConfig {
            max_chunk_size: 0,
            ..ChunkConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SendError::InvalidChunkSize(0))
        ));

        let at_limit = ChunkConfig {
            max_chunk_size: CHANNEL_CHUNK_MAX_LENGTH,
            ..ChunkConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let oversized = ChunkConfig {
            max_chunk_size: CHANNEL_CHUNK_MAX_LENGTH + 1,
            ..ChunkConfig::default()
        };
        assert!(matches!(
            oversized.validate(),
            Err(SendError::InvalidChunkSize(16257))
        ));
    }
}
