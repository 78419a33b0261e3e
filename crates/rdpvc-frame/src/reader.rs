use rdpvc_transport::StreamCursor;
use tracing::{debug, error, warn};

use crate::channel::ChannelTable;
use crate::codec::{decode_header, ChunkHeader, HEADER_SIZE, MAX_TOTAL_LENGTH};
use crate::consumer::{ChannelData, ChannelDataHandler, PeerDispatch};
use crate::error::RecvError;

pub type Result<T> = std::result::Result<T, RecvError>;

/// Validates units received on the initiator side and forwards them.
///
/// The outer transport framing declares a unit length; the chunk body must
/// fill exactly the rest of it.
pub struct ChunkReader<H> {
    handler: H,
}

impl<H: ChannelDataHandler> ChunkReader<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Process one virtual-channel unit.
    ///
    /// `declared_unit_length` is the unit length promised by the outer framing,
    /// envelope included. On success the cursor has moved past the envelope
    /// and the whole chunk body.
    pub fn process(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        channel_id: u16,
        declared_unit_length: usize,
    ) -> Result<()> {
        if declared_unit_length < HEADER_SIZE {
            error!(
                channel_id,
                declared_unit_length, "header length promised, none available"
            );
            return Err(RecvError::TruncatedHeader {
                available: declared_unit_length,
                needed: HEADER_SIZE,
            });
        }
        let declared_body = declared_unit_length - HEADER_SIZE;

        let header = decode_header(cursor)?;
        let chunk_length = cursor.remaining_len();
        if declared_body != chunk_length {
            error!(
                channel_id,
                declared = declared_body,
                actual = chunk_length,
                "header length != actual length"
            );
            return Err(RecvError::LengthMismatch {
                declared: declared_body,
                actual: chunk_length,
            });
        }

        forward(&mut self.handler, channel_id, cursor, header)?;
        consume(cursor, chunk_length)
    }

    /// Borrow the consumer.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutably borrow the consumer.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the reader and return the consumer.
    pub fn into_inner(self) -> H {
        self.handler
    }
}

/// Validates units received on the listener side and dispatches them.
pub struct PeerChunkReader {
    dispatch: PeerDispatch,
}

impl PeerChunkReader {
    pub fn new(dispatch: PeerDispatch) -> Self {
        Self { dispatch }
    }

    /// Process one virtual-channel unit from a connected peer.
    ///
    /// The cursor is already bounded by the outer framing, so every byte
    /// after the envelope is chunk body. The envelope is consumed even when
    /// the channel lookup fails.
    pub fn process_peer(
        &mut self,
        channels: &ChannelTable,
        cursor: &mut StreamCursor<'_>,
        channel_id: u16,
    ) -> Result<()> {
        let header = decode_header(cursor)?;
        let chunk_length = cursor.remaining_len();
        if chunk_length > MAX_TOTAL_LENGTH {
            return Err(RecvError::LengthOverflow(chunk_length));
        }

        match &mut self.dispatch {
            PeerDispatch::RawRead(reader) => {
                let Some(channel) = channels.find(channel_id) else {
                    error!(channel_id, "chunk for unknown channel");
                    return Err(RecvError::UnknownChannel(channel_id));
                };
                let handle = channel.handle;
                if handle.is_none() {
                    debug!(channel_id, name = %channel.name, "raw read on channel without handle");
                }

                if let Err(source) = reader.virtual_channel_read(handle, cursor.peek_bytes()) {
                    warn!(channel_id, ?handle, %source, "virtual channel read failed");
                    return Err(RecvError::ConsumerRejected { channel_id, source });
                }
            }
            PeerDispatch::Forwarding(handler) => {
                forward(&mut **handler, channel_id, cursor, header)?;
            }
            PeerDispatch::None => {
                debug!(channel_id, chunk_length, "no channel consumer registered, discarding");
            }
        }

        consume(cursor, chunk_length)
    }

    /// The dispatch mode chosen for this connection.
    pub fn dispatch(&self) -> &PeerDispatch {
        &self.dispatch
    }
}

fn forward<H: ChannelDataHandler + ?Sized>(
    handler: &mut H,
    channel_id: u16,
    cursor: &StreamCursor<'_>,
    header: ChunkHeader,
) -> Result<()> {
    let chunk = ChannelData {
        channel_id,
        data: cursor.peek_bytes(),
        flags: header.flags,
        total_length: header.total_length,
    };

    handler.on_channel_data(chunk).map_err(|source| {
        warn!(channel_id, %source, "channel consumer rejected chunk");
        RecvError::ConsumerRejected { channel_id, source }
    })
}

fn consume(cursor: &mut StreamCursor<'_>, chunk_length: usize) -> Result<()> {
    let available = cursor.remaining_len();
    cursor.advance(chunk_length).map_err(|_| {
        warn!(
            needed = chunk_length,
            available, "short PDU, chunk extends past unit"
        );
        RecvError::ShortRead {
            needed: chunk_length,
            available,
        }
    })
}
