//! Upper-layer consumers that receive validated chunks.
//!
//! Reassembly of multi-chunk messages belongs to the consumer. Chunks are
//! lent out as borrowed slices for the duration of one call.

use crate::channel::ChannelHandle;
use crate::codec::ChunkFlags;
use crate::error::ConsumerError;

/// One validated chunk forwarded to a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelData<'a> {
    pub channel_id: u16,
    /// Chunk body, borrowed from the transport unit.
    pub data: &'a [u8],
    pub flags: ChunkFlags,
    /// Length of the whole message this chunk belongs to.
    pub total_length: u32,
}

impl ChannelData<'_> {
    pub fn chunk_length(&self) -> usize {
        self.data.len()
    }

    pub fn is_first(&self) -> bool {
        self.flags.contains(ChunkFlags::FIRST)
    }

    pub fn is_last(&self) -> bool {
        self.flags.contains(ChunkFlags::LAST)
    }
}

/// Receives forwarded chunks with their envelope.
pub trait ChannelDataHandler {
    fn on_channel_data(&mut self, chunk: ChannelData<'_>) -> Result<(), ConsumerError>;
}

impl<F> ChannelDataHandler for F
where
    F: FnMut(ChannelData<'_>) -> Result<(), ConsumerError>,
{
    fn on_channel_data(&mut self, chunk: ChannelData<'_>) -> Result<(), ConsumerError> {
        self(chunk)
    }
}

/// Low-level read path addressed by channel handle rather than id.
///
/// `handle` is `None` when the channel was joined but never opened by the
/// application. Returns the number of bytes accepted.
pub trait RawChannelReader {
    fn virtual_channel_read(
        &mut self,
        handle: Option<ChannelHandle>,
        data: &[u8],
    ) -> Result<usize, ConsumerError>;
}

/// How the listener side hands chunks upward.
///
/// Chosen once when the connection is set up.
#[derive(Default)]
pub enum PeerDispatch {
    /// Resolve the channel handle and push raw bytes.
    RawRead(Box<dyn RawChannelReader + Send>),
    /// Forward chunk and envelope, same shape as the initiator side.
    Forwarding(Box<dyn ChannelDataHandler + Send>),
    /// Nobody is listening; traffic is consumed and dropped.
    #[default]
    None,
}

impl PeerDispatch {
    pub fn raw_read(reader: impl RawChannelReader + Send + 'static) -> Self {
        PeerDispatch::RawRead(Box::new(reader))
    }

    pub fn forwarding(handler: impl ChannelDataHandler + Send + 'static) -> Self {
        PeerDispatch::Forwarding(Box::new(handler))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PeerDispatch::RawRead(_) => "raw-read",
            PeerDispatch::Forwarding(_) => "forwarding",
            PeerDispatch::None => "none",
        }
    }
}

impl std::fmt::Debug for PeerDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PeerDispatch").field(&self.kind()).finish()
    }
}
