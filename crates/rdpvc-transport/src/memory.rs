use bytes::Bytes;
use tracing::trace;

use crate::buffer::{BufferPool, SendBuffer};
use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// One unit captured by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentUnit {
    /// Channel the unit was sent on.
    pub channel_id: u16,
    /// Security flags echoed back by the framer.
    pub security_flags: u16,
    /// The unit bytes exactly as handed to the transport.
    pub bytes: Bytes,
}

/// An in-memory transport that records every unit it is asked to send.
///
/// Used for dry runs and tests. Failures can be injected on buffer
/// acquisition or after a number of successful sends.
#[derive(Debug)]
pub struct MemoryTransport {
    pool: BufferPool,
    security_flags: u16,
    sent: Vec<SentUnit>,
    fail_after: Option<usize>,
    fail_acquire: bool,
}

impl MemoryTransport {
    /// Create a transport backed by a default buffer pool.
    pub fn new() -> Self {
        Self::with_pool(BufferPool::new())
    }

    /// Create a transport drawing buffers from `pool`.
    pub fn with_pool(pool: BufferPool) -> Self {
        Self {
            pool,
            security_flags: 0,
            sent: Vec::new(),
            fail_after: None,
            fail_acquire: false,
        }
    }

    /// Attach `flags` to every buffer handed out.
    pub fn with_security_flags(mut self, flags: u16) -> Self {
        self.security_flags = flags;
        self
    }

    /// Reject every send after `count` successful ones.
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Refuse to hand out buffers.
    pub fn fail_acquire(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    /// Units sent so far, in order.
    pub fn sent(&self) -> &[SentUnit] {
        &self.sent
    }

    /// Drain the recorded units.
    pub fn take_sent(&mut self) -> Vec<SentUnit> {
        std::mem::take(&mut self.sent)
    }

    /// The buffer pool backing this transport.
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn acquire_send_buffer(&mut self) -> Result<SendBuffer> {
        if self.fail_acquire {
            return Err(TransportError::BufferUnavailable(
                "memory transport configured to refuse buffers".to_string(),
            ));
        }
        Ok(self.pool.get(self.security_flags))
    }

    fn send(&mut self, channel_id: u16, buffer: SendBuffer) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.sent.len() >= limit) {
            return Err(TransportError::SendRejected {
                channel_id,
                reason: format!("send limit of {} units reached", self.sent.len()),
            });
        }

        trace!(channel_id, len = buffer.len(), "memory transport captured unit");
        self.sent.push(SentUnit {
            channel_id,
            security_flags: buffer.security_flags(),
            bytes: Bytes::copy_from_slice(buffer.as_bytes()),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;

    #[test]
    fn test_records_units_in_order() {
        let mut transport = MemoryTransport::new().with_security_flags(0x0008);

        for (channel, body) in [(3u16, &b"one"[..]), (4, b"two")] {
            let mut buf = transport.acquire_send_buffer().unwrap();
            buf.put_slice(body);
            transport.send(channel, buf).unwrap();
        }

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].channel_id, 3);
        assert_eq!(sent[0].bytes.as_ref(), b"one");
        assert_eq!(sent[0].security_flags, 0x0008);
        assert_eq!(sent[1].channel_id, 4);
        assert_eq!(transport.pool().outstanding(), 0);
    }

    #[test]
    fn test_fail_after_rejects_and_releases_buffer() {
        let mut transport = MemoryTransport::new().fail_after(1);

        let buf = transport.acquire_send_buffer().unwrap();
        transport.send(1, buf).unwrap();

        let buf = transport.acquire_send_buffer().unwrap();
        let err = transport.send(1, buf).unwrap_err();
        assert!(matches!(err, TransportError::SendRejected { channel_id: 1, .. }));
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(transport.pool().outstanding(), 0);
    }

    #[test]
    fn test_fail_acquire_returns_error() {
        let mut transport = MemoryTransport::new().fail_acquire();
        let err = transport.acquire_send_buffer().unwrap_err();
        assert!(matches!(err, TransportError::BufferUnavailable(_)));
    }

    #[test]
    fn test_take_sent_drains() {
        let mut transport = MemoryTransport::new();
        let buf = transport.acquire_send_buffer().unwrap();
        transport.send(9, buf).unwrap();

        assert_eq!(transport.take_sent().len(), 1);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_works_through_mut_reference() {
        fn push(mut t: impl Transport) {
            let buf = t.acquire_send_buffer().unwrap();
            t.send(7, buf).unwrap();
        }

        let mut transport = MemoryTransport::new();
        push(&mut transport);
        assert_eq!(transport.sent()[0].channel_id, 7);
    }
}
