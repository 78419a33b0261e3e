use rdpvc_transport::TransportError;

use crate::codec::CHANNEL_CHUNK_MAX_LENGTH;

/// Errors raised while a consumer handles a forwarded chunk.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ConsumerError(pub String);

impl ConsumerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Errors that can occur while chunking and sending a payload.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The channel is not present in the channel table.
    #[error("unknown channel {0}")]
    UnknownChannel(u16),

    /// The message is longer than the 32-bit length field can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The configured chunk size is zero or above the protocol maximum.
    #[error("invalid max chunk size {0}, expected 1..={max}", max = CHANNEL_CHUNK_MAX_LENGTH)]
    InvalidChunkSize(usize),

    /// The transport failed to hand out a buffer or to send a unit.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors that can occur while validating a received unit.
#[derive(Debug, thiserror::Error)]
pub enum RecvError {
    /// The channel is not present in the channel table.
    #[error("unknown channel {0}")]
    UnknownChannel(u16),

    /// Not enough bytes for the 8-byte envelope.
    #[error("truncated chunk header ({available} bytes available, {needed} needed)")]
    TruncatedHeader { available: usize, needed: usize },

    /// The unit's declared body length disagrees with the bytes present.
    #[error("header length {declared} != actual length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// The chunk body cannot be described by a 32-bit length.
    #[error("chunk length {0} exceeds the 32-bit length field")]
    LengthOverflow(usize),

    /// Fewer bytes are present than the chunk claims.
    #[error("short PDU, need {needed} bytes, got {available}")]
    ShortRead { needed: usize, available: usize },

    /// The consumer refused the chunk.
    #[error("consumer rejected chunk on channel {channel_id}: {source}")]
    ConsumerRejected {
        channel_id: u16,
        source: ConsumerError,
    },
}

pub type Result<T, E = SendError> = std::result::Result<T, E>;
