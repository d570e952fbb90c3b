//! Pre-recorded chunk source.

use std::collections::VecDeque;

use bytes::Bytes;

use super::{ReadOutcome, Transport};
use crate::error::Result;

/// Replays chunks in order, then reports `Closed`.
///
/// A chunk longer than the requested `max_bytes` is split across reads.
/// Empty chunks replay as read timeouts.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    chunks: VecDeque<Bytes>,
}

impl MemoryTransport {
    /// Create a transport from a list of chunks.
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    /// Queue another chunk.
    pub fn push_chunk(&mut self, chunk: impl Into<Bytes>) {
        self.chunks.push_back(chunk.into());
    }

    /// Check if all chunks were consumed.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl Transport for MemoryTransport {
    async fn read(&mut self, max_bytes: usize) -> Result<ReadOutcome> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(ReadOutcome::Closed);
        };

        if chunk.is_empty() {
            return Ok(ReadOutcome::Timeout);
        }

        let max_bytes = max_bytes.max(1);
        if chunk.len() > max_bytes {
            let rest = chunk.split_off(max_bytes);
            self.chunks.push_front(rest);
        }
        Ok(ReadOutcome::Data(chunk))
    }
}
