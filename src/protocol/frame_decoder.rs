//! Resumable frame decoder.
//!
//! Owns the [`ByteStreamBuffer`] and runs the frame state machine over it:
//! - `Seeking`: looking for the magic word
//! - `HeaderPending`: magic word at offset 0, waiting for 32 header bytes
//! - `BodyPending`: header accepted, waiting for `totalPacketLen` bytes
//!
//! A complete frame is decoded and dropped from the buffer; a rejected one
//! costs a single byte so the scan resumes right after its magic word.
//!
//! # Example
//!
//! ```
//! use mmwave_frames::protocol::{FrameBuilder, FrameDecoder};
//!
//! let bytes = FrameBuilder::new(1).build();
//! let mut decoder = FrameDecoder::new();
//!
//! // Data arrives in arbitrary chunks from the serial port
//! assert!(decoder.push(&bytes[..13]).is_empty());
//! let frames = decoder.push(&bytes[13..]);
//! assert_eq!(frames.len(), 1);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::frame::DecodedFrame;
use super::stream_buffer::ByteStreamBuffer;
use super::sync::{FrameSynchronizer, SyncOutcome};
use super::tlv::{decode_detected_objects, TlvIter};
use super::wire_format::{
    FrameHeader, DEFAULT_MAX_PACKET_LEN, DETECTED_OBJECTS_TLV_TYPE, HEADER_SIZE, MAGIC_WORD_LEN,
    MIN_PACKET_LEN,
};
use crate::error::{FrameError, RadarError, Result};

/// Default cap on buffered bytes (4 MiB).
pub const DEFAULT_MAX_BUFFERED_BYTES: usize = 4 * 1024 * 1024;

/// Decoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Sanity ceiling for `totalPacketLen`.
    pub max_packet_len: u32,
    /// Upper bound on buffered bytes. Must be at least `max_packet_len`.
    pub max_buffered_bytes: usize,
    /// TLV type carrying the detected-object list.
    pub detected_objects_tlv_type: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_packet_len: DEFAULT_MAX_PACKET_LEN,
            max_buffered_bytes: DEFAULT_MAX_BUFFERED_BYTES,
            detected_objects_tlv_type: DETECTED_OBJECTS_TLV_TYPE,
        }
    }
}

impl DecoderConfig {
    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.max_packet_len < MIN_PACKET_LEN {
            return Err(RadarError::Config(format!(
                "max_packet_len {} is below the minimum frame size {}",
                self.max_packet_len, MIN_PACKET_LEN
            )));
        }

        if self.max_buffered_bytes < self.max_packet_len as usize {
            return Err(RadarError::Config(format!(
                "max_buffered_bytes {} is smaller than max_packet_len {}",
                self.max_buffered_bytes, self.max_packet_len
            )));
        }

        Ok(())
    }
}

/// Running counters, readable at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderStats {
    pub frames_decoded: u64,
    pub frames_rejected: u64,
    pub frames_truncated: u64,
    pub bytes_discarded: u64,
    pub partial_frames_dropped: u64,
    pub tlvs_skipped: u64,
}

/// Public view of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Seeking,
    HeaderPending,
    BodyPending,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Seeking,
    HeaderPending,
    BodyPending { header: FrameHeader },
}

/// What the TLV walk produced for one frame.
struct FrameBody {
    frame: DecodedFrame,
    tlvs_skipped: u64,
    truncation: Option<FrameError>,
}

/// Turns an arbitrarily chunked byte stream into [`DecodedFrame`]s.
///
/// Single-threaded by design: feed it from one reader, in stream order.
pub struct FrameDecoder {
    buffer: ByteStreamBuffer,
    synchronizer: FrameSynchronizer,
    state: State,
    config: DecoderConfig,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Create a decoder with default settings.
    pub fn new() -> Self {
        Self::from_valid_config(DecoderConfig::default())
    }

    /// Create a decoder with custom settings.
    ///
    /// # Errors
    ///
    /// Returns `RadarError::Config` if the settings are inconsistent.
    pub fn with_config(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: DecoderConfig) -> Self {
        Self {
            buffer: ByteStreamBuffer::new(),
            synchronizer: FrameSynchronizer,
            state: State::Seeking,
            config,
            stats: DecoderStats::default(),
        }
    }

    /// Push data into the buffer and decode every frame it completes.
    ///
    /// Returns frames in stream order (may be empty while waiting for data).
    /// Malformed frames are logged, counted and skipped; they never stop
    /// the decoder.
    pub fn push(&mut self, data: &[u8]) -> Vec<DecodedFrame> {
        let mut frames = Vec::new();
        let mut rest = data;

        // Feed in slices that fit under the buffer cap, draining in between
        while !rest.is_empty() {
            let room = self
                .config
                .max_buffered_bytes
                .saturating_sub(self.buffer.len())
                .max(1);
            let (head, tail) = rest.split_at(room.min(rest.len()));
            self.buffer.append(head);
            rest = tail;
            self.drive(&mut frames);
        }

        frames
    }

    /// Run the state machine until it cannot progress with the bytes on hand.
    fn drive(&mut self, frames: &mut Vec<DecodedFrame>) {
        loop {
            match self.state {
                State::Seeking => {
                    let outcome = self.synchronizer.synchronize(&mut self.buffer);
                    let discarded = outcome.discarded();
                    if discarded > 0 {
                        self.stats.bytes_discarded += discarded as u64;
                        debug!(discarded, "Discarded bytes while seeking magic word");
                    }
                    match outcome {
                        SyncOutcome::Found { .. } => self.state = State::HeaderPending,
                        SyncOutcome::NotFound { .. } => return,
                    }
                }

                State::HeaderPending => {
                    let header = match self
                        .buffer
                        .peek(MAGIC_WORD_LEN, HEADER_SIZE)
                        .and_then(FrameHeader::decode)
                    {
                        Some(header) => header,
                        None => return,
                    };

                    if !header.has_sane_length(self.config.max_packet_len) {
                        self.reject(FrameError::InvalidHeader {
                            total_packet_len: header.total_packet_len,
                            min: MIN_PACKET_LEN,
                            max: self.config.max_packet_len,
                        });
                        continue;
                    }

                    self.state = State::BodyPending { header };
                }

                State::BodyPending { header } => {
                    let total = header.total_packet_len as usize;
                    let body_start = MIN_PACKET_LEN as usize;
                    let body = match self.buffer.peek(body_start, total - body_start) {
                        Some(body) => body,
                        None => return,
                    };

                    match decode_frame_body(header, body, self.config.detected_objects_tlv_type) {
                        Ok(decoded) => {
                            if let Some(truncation) = decoded.truncation {
                                warn!(
                                    frame_number = header.frame_number,
                                    error = %truncation,
                                    "Emitting frame with partial object list"
                                );
                                self.stats.frames_truncated += 1;
                            }
                            self.stats.tlvs_skipped += decoded.tlvs_skipped;
                            self.stats.frames_decoded += 1;

                            self.buffer.discard(total);
                            self.state = State::Seeking;
                            frames.push(decoded.frame);
                        }
                        Err(err) => self.reject(err),
                    }
                }
            }
        }
    }

    /// Drop the offending magic word's first byte and resume seeking.
    fn reject(&mut self, err: FrameError) {
        warn!(error = %err, "Rejecting frame, resynchronizing");
        self.stats.frames_rejected += 1;
        self.stats.bytes_discarded += 1;
        self.buffer.discard(1);
        self.state = State::Seeking;
    }

    /// Signal end of stream: drop any partial frame and reset.
    ///
    /// Returns `true` if a partially received frame was dropped.
    pub fn finish(&mut self) -> bool {
        let dropped = !matches!(self.state, State::Seeking);
        if dropped {
            self.stats.partial_frames_dropped += 1;
            debug!(
                buffered = self.buffer.len(),
                "Stream ended mid-frame, dropping partial frame"
            );
        }
        self.stats.bytes_discarded += self.buffer.len() as u64;
        self.buffer.clear();
        self.state = State::Seeking;
        dropped
    }

    /// Current state of the machine.
    pub fn state(&self) -> DecoderState {
        match self.state {
            State::Seeking => DecoderState::Seeking,
            State::HeaderPending => DecoderState::HeaderPending,
            State::BodyPending { .. } => DecoderState::BodyPending,
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Active settings.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk the TLVs of a complete frame.
///
/// `body` spans from the first TLV byte to `totalPacketLen`.
fn decode_frame_body(
    header: FrameHeader,
    body: &[u8],
    detected_objects_tlv_type: u32,
) -> std::result::Result<FrameBody, FrameError> {
    let mut objects = Vec::new();
    let mut objects_seen = false;
    let mut truncation = None;
    let mut tlv_types = BTreeSet::new();
    let mut tlvs_skipped = 0;

    for record in TlvIter::new(body, header.num_tlvs) {
        let record = record?;
        tlv_types.insert(record.tlv_type);

        if record.tlv_type == detected_objects_tlv_type && !objects_seen {
            let list = decode_detected_objects(record.payload, header.num_detected_obj);
            objects = list.objects;
            truncation = list.truncation;
            objects_seen = true;
        } else {
            tlvs_skipped += 1;
        }
    }

    Ok(FrameBody {
        frame: DecodedFrame {
            header,
            objects,
            tlv_types,
            truncated: truncation.is_some(),
        },
        tlvs_skipped,
        truncation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::FrameBuilder;
    use crate::protocol::wire_format::{DetectedObject, MAGIC_WORD, TlvHeader};

    fn sample_objects(n: usize) -> Vec<DetectedObject> {
        (0..n)
            .map(|i| DetectedObject::new(i as f32, 1.0 + i as f32, -0.5, 0.25 * i as f32))
            .collect()
    }

    #[test]
    fn test_single_complete_frame() {
        let mut decoder = FrameDecoder::new();
        let objects = sample_objects(1);
        let bytes = FrameBuilder::new(42).detected_objects(&objects).build();
        assert_eq!(bytes.len(), 64);

        let frames = decoder.push(&bytes);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_number(), 42);
        assert_eq!(frames[0].header.total_packet_len, 64);
        assert_eq!(frames[0].objects, objects);
        assert!(frames[0].has_tlv(DETECTED_OBJECTS_TLV_TYPE));
        assert!(!frames[0].truncated);
        assert_eq!(decoder.buffered_len(), 0);
        assert_eq!(decoder.state(), DecoderState::Seeking);
    }

    #[test]
    fn test_multiple_frames_in_one_push() {
        let mut decoder = FrameDecoder::new();
        let mut combined = Vec::new();
        for n in 1..=3 {
            combined.extend(
                FrameBuilder::new(n)
                    .detected_objects(&sample_objects(n as usize))
                    .build(),
            );
        }

        let frames = decoder.push(&combined);

        assert_eq!(frames.len(), 3);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.frame_number(), i as u32 + 1);
            assert_eq!(frame.objects.len(), i + 1);
        }
        assert_eq!(decoder.stats().frames_decoded, 3);
    }

    #[test]
    fn test_fragmented_header() {
        let mut decoder = FrameDecoder::new();
        let bytes = FrameBuilder::new(5).build();

        assert!(decoder.push(&bytes[..MAGIC_WORD_LEN + 5]).is_empty());
        assert_eq!(decoder.state(), DecoderState::HeaderPending);

        let frames = decoder.push(&bytes[MAGIC_WORD_LEN + 5..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_number(), 5);
    }

    #[test]
    fn test_fragmented_body() {
        let mut decoder = FrameDecoder::new();
        let bytes = FrameBuilder::new(5)
            .detected_objects(&sample_objects(4))
            .build();

        assert!(decoder.push(&bytes[..50]).is_empty());
        assert_eq!(decoder.state(), DecoderState::BodyPending);

        let frames = decoder.push(&bytes[50..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].objects, sample_objects(4));
    }

    #[test]
    fn test_split_magic_word() {
        let mut decoder = FrameDecoder::new();
        let bytes = FrameBuilder::new(8).build();

        let mut first = vec![0xAB; 30];
        first.extend_from_slice(&bytes[..3]);
        assert!(decoder.push(&first).is_empty());
        assert_eq!(decoder.state(), DecoderState::Seeking);

        let frames = decoder.push(&bytes[3..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_number(), 8);
        assert_eq!(decoder.stats().bytes_discarded, 30);
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut decoder = FrameDecoder::new();
        let bytes = FrameBuilder::new(3)
            .detected_objects(&sample_objects(2))
            .build();

        let mut all_frames = Vec::new();
        for byte in &bytes {
            all_frames.extend(decoder.push(&[*byte]));
        }

        assert_eq!(all_frames.len(), 1);
        assert_eq!(all_frames[0].objects, sample_objects(2));
    }

    #[test]
    fn test_garbage_without_magic_is_bounded() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(&[0x55; 10_000]).is_empty());
        assert_eq!(decoder.buffered_len(), MAGIC_WORD_LEN - 1);
        assert_eq!(decoder.stats().bytes_discarded, 10_000 - 7);
    }

    #[test]
    fn test_invalid_length_rejected_then_resync() {
        let mut decoder = FrameDecoder::new();
        let mut data = FrameBuilder::new(1).total_packet_len(12).build();
        data.extend(FrameBuilder::new(2).build());

        let frames = decoder.push(&data);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_number(), 2);
        assert_eq!(decoder.stats().frames_rejected, 1);
    }

    #[test]
    fn test_length_above_ceiling_rejected() {
        let config = DecoderConfig {
            max_packet_len: 128,
            max_buffered_bytes: 1024,
            ..DecoderConfig::default()
        };
        let mut decoder = FrameDecoder::with_config(config).unwrap();
        let data = FrameBuilder::new(1).total_packet_len(129).build();

        assert!(decoder.push(&data).is_empty());
        assert_eq!(decoder.stats().frames_rejected, 1);
        assert_eq!(decoder.state(), DecoderState::Seeking);
    }

    #[test]
    fn test_malformed_tlv_does_not_affect_next_frame() {
        let mut decoder = FrameDecoder::new();

        // TLV claims 200 bytes inside a 64-byte frame
        let mut bad = FrameBuilder::new(1)
            .detected_objects(&sample_objects(1))
            .build();
        let tlv_offset = MIN_PACKET_LEN as usize;
        bad[tlv_offset..tlv_offset + 8].copy_from_slice(&TlvHeader::new(6, 200).encode());

        let good = FrameBuilder::new(2)
            .detected_objects(&sample_objects(2))
            .build();

        let mut data = bad;
        data.extend_from_slice(&good);
        let frames = decoder.push(&data);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_number(), 2);
        assert_eq!(frames[0].objects.len(), 2);
        assert_eq!(decoder.stats().frames_rejected, 1);
    }

    #[test]
    fn test_truncated_object_list_still_emitted() {
        let mut decoder = FrameDecoder::new();
        let data = FrameBuilder::new(9)
            .detected_objects(&sample_objects(2))
            .num_detected_obj(5)
            .build();

        let frames = decoder.push(&data);

        assert_eq!(frames.len(), 1);
        assert!(frames[0].truncated);
        assert_eq!(frames[0].objects, sample_objects(2));
        assert_eq!(decoder.stats().frames_truncated, 1);
    }

    #[test]
    fn test_unknown_tlvs_skipped() {
        let mut decoder = FrameDecoder::new();
        let data = FrameBuilder::new(4)
            .tlv(2, &[0xCC; 32])
            .detected_objects(&sample_objects(3))
            .tlv(7, &[0xDD; 24])
            .padding(12)
            .build();

        let frames = decoder.push(&data);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].objects, sample_objects(3));
        assert_eq!(frames[0].tlv_types, [2, 6, 7].into_iter().collect());
        assert_eq!(decoder.stats().tlvs_skipped, 2);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn test_custom_detected_objects_type() {
        let config = DecoderConfig {
            detected_objects_tlv_type: 1,
            ..DecoderConfig::default()
        };
        let mut decoder = FrameDecoder::with_config(config).unwrap();
        let payload: Vec<u8> = sample_objects(2).iter().flat_map(|o| o.encode()).collect();
        let data = FrameBuilder::new(1)
            .tlv(1, &payload)
            .num_detected_obj(2)
            .build();

        let frames = decoder.push(&data);
        assert_eq!(frames[0].objects, sample_objects(2));
    }

    #[test]
    fn test_finish_drops_partial_frame() {
        let mut decoder = FrameDecoder::new();
        let bytes = FrameBuilder::new(1)
            .detected_objects(&sample_objects(3))
            .build();

        decoder.push(&bytes[..45]);
        assert!(decoder.finish());
        assert_eq!(decoder.stats().partial_frames_dropped, 1);
        assert_eq!(decoder.buffered_len(), 0);
        assert_eq!(decoder.state(), DecoderState::Seeking);

        // Nothing pending now
        assert!(!decoder.finish());
    }

    #[test]
    fn test_magic_prefix_in_garbage() {
        let mut decoder = FrameDecoder::new();
        let mut data = MAGIC_WORD[..6].to_vec();
        data.extend(FrameBuilder::new(77).build());

        let frames = decoder.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_number(), 77);
    }

    #[test]
    fn test_config_validation() {
        let too_small = DecoderConfig {
            max_packet_len: 10,
            ..DecoderConfig::default()
        };
        assert!(matches!(
            FrameDecoder::with_config(too_small),
            Err(RadarError::Config(_))
        ));

        let cap_below_packet = DecoderConfig {
            max_packet_len: 4096,
            max_buffered_bytes: 1024,
            ..DecoderConfig::default()
        };
        assert!(cap_below_packet.validate().is_err());
    }

    #[test]
    fn test_small_buffer_cap_with_large_push() {
        let config = DecoderConfig {
            max_packet_len: 256,
            max_buffered_bytes: 256,
            ..DecoderConfig::default()
        };
        let mut decoder = FrameDecoder::with_config(config).unwrap();

        let mut data = vec![0x00; 1000];
        for n in 0..10 {
            data.extend(
                FrameBuilder::new(n)
                    .detected_objects(&sample_objects(3))
                    .build(),
            );
        }

        let frames = decoder.push(&data);
        assert_eq!(frames.len(), 10);
        assert!(decoder.buffered_len() <= 256);
    }
}
