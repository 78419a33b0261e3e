use crate::buffer::SendBuffer;
use crate::error::Result;

/// The session-layer send path used by the framing core.
///
/// Implementations own the connection. The framer acquires one buffer per
/// unit, fills it, and gives it back through [`Transport::send`]. Units must
/// go out in the order `send` is called.
pub trait Transport {
    /// Acquire an empty output buffer for one unit.
    fn acquire_send_buffer(&mut self) -> Result<SendBuffer>;

    /// Send a finished unit on `channel_id`.
    ///
    /// The security flags travel inside `buffer`. The buffer is consumed
    /// whether or not the send succeeds.
    fn send(&mut self, channel_id: u16, buffer: SendBuffer) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn acquire_send_buffer(&mut self) -> Result<SendBuffer> {
        (**self).acquire_send_buffer()
    }

    fn send(&mut self, channel_id: u16, buffer: SendBuffer) -> Result<()> {
        (**self).send(channel_id, buffer)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn acquire_send_buffer(&mut self) -> Result<SendBuffer> {
        (**self).acquire_send_buffer()
    }

    fn send(&mut self, channel_id: u16, buffer: SendBuffer) -> Result<()> {
        (**self).send(channel_id, buffer)
    }
}
