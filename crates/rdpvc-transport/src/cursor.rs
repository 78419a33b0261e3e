use bytes::Buf;

use crate::error::{Result, TransportError};

/// Read position over one received transport unit.
///
/// The cursor borrows the unit; it never copies or owns the bytes. Readers
/// advance it as they consume headers and bodies.
#[derive(Debug, Clone)]
pub struct StreamCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StreamCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left between the current position and the end of the unit.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The unread bytes, without consuming them.
    pub fn peek_bytes(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Current offset from the start of the unit.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Skip `n` bytes.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        let remaining = self.remaining_len();
        if n > remaining {
            return Err(TransportError::CursorOverrun {
                wanted: n,
                remaining,
            });
        }
        self.pos += n;
        Ok(())
    }

    /// Read a little-endian `u32` and advance past it.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut src = self.peek_bytes();
        if src.remaining() < 4 {
            return Err(TransportError::CursorOverrun {
                wanted: 4,
                remaining: src.remaining(),
            });
        }
        let value = src.get_u32_le();
        self.pos += 4;
        Ok(value)
    }
}
