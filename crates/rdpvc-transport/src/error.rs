/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No send buffer could be acquired from the transport.
    #[error("send buffer unavailable: {0}")]
    BufferUnavailable(String),

    /// The transport refused a unit for the given channel.
    #[error("transport rejected unit on channel {channel_id}: {reason}")]
    SendRejected { channel_id: u16, reason: String },

    /// A cursor was asked to move past the end of its unit.
    #[error("cursor overrun (wanted {wanted} bytes, {remaining} remaining)")]
    CursorOverrun { wanted: usize, remaining: usize },

    /// An I/O error occurred on the underlying connection.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has been shut down.
    #[error("transport shut down")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, TransportError>;
