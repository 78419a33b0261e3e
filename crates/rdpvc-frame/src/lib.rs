//! Virtual-channel chunk framing.
//!
//! This is the core of rdpvc. Payloads for a static virtual channel are split
//! into chunks no larger than the negotiated chunk size, and every chunk is
//! prefixed with an 8-byte envelope:
//! - A 4-byte little-endian total message length
//! - A 4-byte little-endian flag set (FIRST, LAST, SHOW_PROTOCOL, ...)
//!
//! Received chunks are checked against the unit that carried them before a
//! consumer ever sees a byte. Reassembly is left to the consumer.

pub mod channel;
pub mod codec;
pub mod consumer;
pub mod error;
pub mod reader;
pub mod writer;

pub use channel::{ChannelDescriptor, ChannelHandle, ChannelOptions, ChannelTable};
pub use codec::{
    chunk_count, decode_header, encode_header, ChunkConfig, ChunkFlags, ChunkHeader, Role,
    CHANNEL_CHUNK_LENGTH, CHANNEL_CHUNK_MAX_LENGTH, HEADER_SIZE, MAX_TOTAL_LENGTH,
};
pub use consumer::{ChannelData, ChannelDataHandler, PeerDispatch, RawChannelReader};
pub use error::{ConsumerError, RecvError, Result, SendError};
pub use reader::{ChunkReader, PeerChunkReader};
pub use writer::ChunkWriter;
