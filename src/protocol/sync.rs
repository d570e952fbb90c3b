//! Magic-word synchronization.
//!
//! The scan is resumable across appends: when no magic word is present,
//! the last `MAGIC_WORD_LEN - 1` bytes stay in the buffer because they may
//! be the first half of a magic word split across two reads.

use super::stream_buffer::ByteStreamBuffer;
use super::wire_format::{MAGIC_WORD, MAGIC_WORD_LEN};

/// Result of one synchronization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Buffer now starts with the magic word. `discarded` garbage bytes were
    /// dropped in front of it.
    Found { discarded: usize },
    /// No magic word yet. `discarded` bytes were dropped, the possible
    /// partial-magic tail was kept.
    NotFound { discarded: usize },
}

impl SyncOutcome {
    /// Bytes dropped by this attempt.
    pub fn discarded(&self) -> usize {
        match *self {
            SyncOutcome::Found { discarded } | SyncOutcome::NotFound { discarded } => discarded,
        }
    }
}

/// Offset of the first exact magic word occurrence in `data`.
#[inline]
pub fn find_magic_word(data: &[u8]) -> Option<usize> {
    data.windows(MAGIC_WORD_LEN)
        .position(|window| window == MAGIC_WORD)
}

/// Locates frame starts in a [`ByteStreamBuffer`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameSynchronizer;

impl FrameSynchronizer {
    /// Search from offset 0 and align the buffer on the first magic word.
    pub fn synchronize(&self, buffer: &mut ByteStreamBuffer) -> SyncOutcome {
        match find_magic_word(buffer.as_slice()) {
            Some(offset) => {
                buffer.discard(offset);
                SyncOutcome::Found { discarded: offset }
            }
            None => {
                let keep = MAGIC_WORD_LEN - 1;
                let discarded = buffer.len().saturating_sub(keep);
                buffer.discard(discarded);
                SyncOutcome::NotFound { discarded }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_at_start() {
        let mut data = MAGIC_WORD.to_vec();
        data.extend_from_slice(&[0xAA; 4]);
        assert_eq!(find_magic_word(&data), Some(0));
    }

    #[test]
    fn test_find_after_garbage() {
        let mut data = vec![0x11, 0x22, 0x02, 0x01, 0x04];
        data.extend_from_slice(&MAGIC_WORD);
        assert_eq!(find_magic_word(&data), Some(5));
    }

    #[test]
    fn test_find_none_when_short() {
        assert_eq!(find_magic_word(&MAGIC_WORD[..7]), None);
        assert_eq!(find_magic_word(&[]), None);
    }

    #[test]
    fn test_synchronize_discards_garbage() {
        let mut buf = ByteStreamBuffer::new();
        buf.append(&[0xFF; 10]);
        buf.append(&MAGIC_WORD);
        buf.append(&[0x42]);

        let outcome = FrameSynchronizer.synchronize(&mut buf);

        assert_eq!(outcome, SyncOutcome::Found { discarded: 10 });
        assert_eq!(buf.peek(0, MAGIC_WORD_LEN), Some(&MAGIC_WORD[..]));
        assert_eq!(buf.len(), MAGIC_WORD_LEN + 1);
    }

    #[test]
    fn test_synchronize_keeps_tail_without_match() {
        let mut buf = ByteStreamBuffer::new();
        buf.append(&[0xEE; 20]);
        buf.append(&MAGIC_WORD[..5]);

        let outcome = FrameSynchronizer.synchronize(&mut buf);

        assert_eq!(outcome, SyncOutcome::NotFound { discarded: 18 });
        assert_eq!(buf.len(), MAGIC_WORD_LEN - 1);

        // Rest of the magic word arrives in the next read
        buf.append(&MAGIC_WORD[5..]);
        let outcome = FrameSynchronizer.synchronize(&mut buf);
        assert_eq!(outcome, SyncOutcome::Found { discarded: 2 });
        assert_eq!(buf.as_slice(), &MAGIC_WORD[..]);
    }

    #[test]
    fn test_synchronize_short_buffer_discards_nothing() {
        let mut buf = ByteStreamBuffer::new();
        buf.append(&[0x02, 0x01, 0x04]);

        let outcome = FrameSynchronizer.synchronize(&mut buf);

        assert_eq!(outcome.discarded(), 0);
        assert_eq!(buf.len(), 3);
    }
}
