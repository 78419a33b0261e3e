use rdpvc_transport::Transport;
use tracing::{error, trace};

use crate::channel::ChannelTable;
use crate::codec::{
    encode_header, ChunkConfig, ChunkFlags, ChunkHeader, Role, HEADER_SIZE, MAX_TOTAL_LENGTH,
};
use crate::error::{Result, SendError};

/// Splits payloads into chunks and sends them through a [`Transport`].
///
/// Holds no per-message state: every [`send`](Self::send) call is
/// self-contained, and a failed call leaves nothing behind to clean up.
pub struct ChunkWriter<T> {
    inner: T,
    config: ChunkConfig,
}

impl<T: Transport> ChunkWriter<T> {
    /// Create a chunk writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            config: ChunkConfig::default(),
        }
    }

    /// Create a chunk writer with explicit configuration.
    pub fn with_config(inner: T, config: ChunkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { inner, config })
    }

    /// Send a complete payload on `channel_id`, chunked to the negotiated size.
    ///
    /// Chunks already handed to the transport stay sent if a later chunk
    /// fails; the peer sees a message without LAST and drops it.
    pub fn send(&mut self, channels: &ChannelTable, channel_id: u16, payload: &[u8]) -> Result<()> {
        let Some(channel) = channels.find(channel_id) else {
            error!(channel_id, "send on unknown channel");
            return Err(SendError::UnknownChannel(channel_id));
        };

        if payload.len() > MAX_TOTAL_LENGTH {
            return Err(SendError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_TOTAL_LENGTH,
            });
        }

        let max_chunk = self.config.max_chunk_size;
        let show_protocol = self.config.role == Role::Initiator && channel.shows_protocol();
        let total_length = payload.len();

        let mut flags = ChunkFlags::FIRST;
        let mut remaining = payload;
        loop {
            let chunk_size = remaining.len().min(max_chunk);
            if remaining.len() <= max_chunk {
                flags |= ChunkFlags::LAST;
            }
            if show_protocol {
                flags |= ChunkFlags::SHOW_PROTOCOL;
            }

            let (chunk, rest) = remaining.split_at(chunk_size);
            self.send_packet(channel_id, total_length, flags, chunk)?;

            remaining = rest;
            flags = ChunkFlags::NONE;
            if remaining.is_empty() {
                break;
            }
        }

        Ok(())
    }

    /// Frame one chunk and hand it to the transport.
    ///
    /// `total_length` is the length of the whole message the chunk belongs
    /// to. The transport buffer is released on every return path.
    pub fn send_packet(
        &mut self,
        channel_id: u16,
        total_length: usize,
        flags: ChunkFlags,
        chunk: &[u8],
    ) -> Result<()> {
        let Ok(wire_length) = u32::try_from(total_length) else {
            return Err(SendError::PayloadTooLarge {
                size: total_length,
                max: MAX_TOTAL_LENGTH,
            });
        };

        let mut buf = self.inner.acquire_send_buffer()?;
        buf.ensure_remaining_capacity(chunk.len() + HEADER_SIZE);
        encode_header(&ChunkHeader::new(wire_length, flags), &mut buf);
        buf.extend_from_slice(chunk);

        trace!(
            channel_id,
            total_length,
            chunk_len = chunk.len(),
            %flags,
            "sending channel chunk"
        );
        self.inner.send(channel_id, buf)?;
        Ok(())
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the transport.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current chunk writer configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }
}
