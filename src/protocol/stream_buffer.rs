//! Growable buffer of not-yet-consumed stream bytes.
//!
//! Backed by `bytes::BytesMut`: `discard` advances the start of the buffer
//! instead of shifting memory, and freed space is reclaimed on the next
//! `append` when possible.

use bytes::{Buf, BytesMut};

/// Initial capacity: a handful of typical UART reads.
const INITIAL_CAPACITY: usize = 16 * 1024;

/// Append-only byte buffer holding everything not yet consumed.
#[derive(Debug)]
pub struct ByteStreamBuffer {
    buffer: BytesMut,
}

impl ByteStreamBuffer {
    /// Create an empty buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create an empty buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Append bytes at the end.
    #[inline]
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Drop the first `n` bytes (clamped to the buffer length).
    #[inline]
    pub fn discard(&mut self, n: usize) {
        let n = n.min(self.buffer.len());
        self.buffer.advance(n);
    }

    /// Borrow `count` bytes starting at `offset`, if all of them are present.
    #[inline]
    pub fn peek(&self, offset: usize, count: usize) -> Option<&[u8]> {
        let end = offset.checked_add(count)?;
        self.buffer.get(offset..end)
    }

    /// All buffered bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of buffered bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for ByteStreamBuffer {
    fn default() -> Self {
        Self::new()
    }
}
