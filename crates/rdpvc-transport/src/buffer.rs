//! Scoped send buffers.
//!
//! A [`SendBuffer`] is handed out by a transport, filled by the framing
//! layer, and handed back through [`Transport::send`](crate::Transport::send).
//! Dropping it on any path returns the allocation to its [`BufferPool`], so an
//! early return in the framer can never leak a transport buffer.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use object_pool::{Pool, ReusableOwned};

/// Default buffer size for pooled allocations: one maximum-size chunk plus
/// headroom for lower-layer headers.
const DEFAULT_BUFFER_SIZE: usize = 16 * 1024 + 64;

/// Default number of buffers pre-allocated in the pool.
const DEFAULT_POOL_CAPACITY: usize = 16;

/// A pool of reusable send buffers.
///
/// Cloning is cheap; clones share the same buffers and accounting.
#[derive(Clone)]
pub struct BufferPool {
    pool: Arc<Pool<BytesMut>>,
    buffer_size: usize,
    outstanding: Arc<AtomicUsize>,
}

impl BufferPool {
    /// Create a pool with default capacity and buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY, DEFAULT_BUFFER_SIZE)
    }

    /// Create a pool pre-allocating `capacity` buffers of `buffer_size` bytes.
    pub fn with_capacity(capacity: usize, buffer_size: usize) -> Self {
        let pool = Pool::new(capacity, move || BytesMut::with_capacity(buffer_size));
        Self {
            pool: Arc::new(pool),
            buffer_size,
            outstanding: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Take an empty buffer from the pool, allocating if none is idle.
    pub fn get(&self, security_flags: u16) -> SendBuffer {
        let mut reusable = self
            .pool
            .pull_owned(|| BytesMut::with_capacity(self.buffer_size));
        // Buffers come back in whatever state they were dropped in.
        reusable.clear();
        self.outstanding.fetch_add(1, Ordering::SeqCst);

        SendBuffer {
            storage: Storage::Pooled {
                buf: reusable,
                outstanding: Arc::clone(&self.outstanding),
            },
            security_flags,
        }
    }

    /// Number of buffers currently handed out and not yet dropped.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Number of idle buffers waiting for reuse.
    pub fn idle(&self) -> usize {
        self.pool.len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("buffer_size", &self.buffer_size)
            .field("idle", &self.idle())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

enum Storage {
    Pooled {
        buf: ReusableOwned<BytesMut>,
        outstanding: Arc<AtomicUsize>,
    },
    Unpooled(BytesMut),
}

/// A transport-owned output buffer for exactly one unit.
///
/// Carries the security flags the transport wants echoed back on send.
pub struct SendBuffer {
    storage: Storage,
    security_flags: u16,
}

impl SendBuffer {
    /// Create a standalone buffer that is not backed by a pool.
    pub fn unpooled(capacity: usize, security_flags: u16) -> Self {
        Self {
            storage: Storage::Unpooled(BytesMut::with_capacity(capacity)),
            security_flags,
        }
    }

    /// Security flags attached by the transport when the buffer was acquired.
    pub fn security_flags(&self) -> u16 {
        self.security_flags
    }

    /// Make sure at least `additional` more bytes fit without reallocation.
    pub fn ensure_remaining_capacity(&mut self, additional: usize) {
        self.reserve(additional);
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        self
    }

    fn is_pooled(&self) -> bool {
        matches!(self.storage, Storage::Pooled { .. })
    }
}

impl Deref for SendBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &Self::Target {
        match &self.storage {
            Storage::Pooled { buf, .. } => buf,
            Storage::Unpooled(buf) => buf,
        }
    }
}

impl DerefMut for SendBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.storage {
            Storage::Pooled { buf, .. } => buf,
            Storage::Unpooled(buf) => buf,
        }
    }
}

impl Drop for SendBuffer {
    fn drop(&mut self) {
        // The pooled allocation itself goes back when the `ReusableOwned` drops.
        if let Storage::Pooled { outstanding, .. } = &self.storage {
            outstanding.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl std::fmt::Debug for SendBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("security_flags", &self.security_flags)
            .field("pooled", &self.is_pooled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;

    #[test]
    fn test_get_returns_empty_buffer() {
        let pool = BufferPool::new();
        let buf = pool.get(0);
        assert!(buf.is_empty());
        assert!(buf.capacity() >= DEFAULT_BUFFER_SIZE);
        assert_eq!(pool.outstanding(), 1);
    }

    #[test]
    fn test_drop_returns_buffer_to_pool() {
        let pool = BufferPool::with_capacity(4, 128);
        assert_eq!(pool.idle(), 4);
        {
            let mut buf = pool.get(0);
            buf.put_slice(b"secret");
            assert_eq!(pool.outstanding(), 1);
            assert_eq!(pool.idle(), 3);
        }
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle(), 4);
    }

    #[test]
    fn test_reused_buffer_is_wiped() {
        let pool = BufferPool::with_capacity(1, 64);
        {
            let mut buf = pool.get(0);
            buf.put_slice(b"stale channel bytes");
        }
        let buf = pool.get(0);
        assert!(buf.is_empty());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_exhausted_pool_falls_back_to_allocation() {
        let pool = BufferPool::with_capacity(1, 64);
        let a = pool.get(0);
        let b = pool.get(0);
        assert_eq!(pool.outstanding(), 2);
        assert!(b.capacity() >= 64);
        drop(a);
        drop(b);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_unpooled_buffer_is_not_counted() {
        let pool = BufferPool::with_capacity(1, 64);
        let standalone = SendBuffer::unpooled(16, 0);
        assert!(!standalone.is_pooled());
        drop(standalone);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_security_flags_are_carried() {
        let pool = BufferPool::new();
        let buf = pool.get(0x0008);
        assert_eq!(buf.security_flags(), 0x0008);

        let standalone = SendBuffer::unpooled(16, 0x0400);
        assert_eq!(standalone.security_flags(), 0x0400);
    }

    #[test]
    fn test_ensure_remaining_capacity_grows() {
        let mut buf = SendBuffer::unpooled(0, 0);
        buf.ensure_remaining_capacity(4096);
        assert!(buf.capacity() >= 4096);
    }
}
