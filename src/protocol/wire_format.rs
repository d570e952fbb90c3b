//! Wire format encoding and decoding.
//!
//! A frame on the UART data port:
//! ```text
//! ┌────────────┬──────────────────────────┬───────┬───────┬─────┬─────────┐
//! │ Magic word │ Header                   │ TLV 0 │ TLV 1 │ ... │ padding │
//! │ 8 bytes    │ 8 x uint32 LE (32 bytes) │       │       │     │         │
//! └────────────┴──────────────────────────┴───────┴───────┴─────┴─────────┘
//! │◄──────────────────────── totalPacketLen ───────────────────────────────►│
//! ```
//!
//! Each TLV starts with `type` and `length` (uint32 LE each); `length`
//! covers the 8-byte TLV header itself.
//!
//! All multi-byte values are Little Endian. Fields are decoded one by one
//! from byte slices; nothing relies on in-memory struct layout.

use serde::{Deserialize, Serialize};

/// Frame synchronization pattern.
pub const MAGIC_WORD: [u8; 8] = [0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07];

/// Magic word size in bytes.
pub const MAGIC_WORD_LEN: usize = MAGIC_WORD.len();

/// Header size in bytes (eight uint32 fields).
pub const HEADER_SIZE: usize = 32;

/// Smallest legal `totalPacketLen`: magic word plus header.
pub const MIN_PACKET_LEN: u32 = (MAGIC_WORD_LEN + HEADER_SIZE) as u32;

/// Default sanity ceiling for `totalPacketLen` (1 MiB).
pub const DEFAULT_MAX_PACKET_LEN: u32 = 1024 * 1024;

/// TLV header size in bytes.
pub const TLV_HEADER_SIZE: usize = 8;

/// TLV type carrying the detected-object list.
pub const DETECTED_OBJECTS_TLV_TYPE: u32 = 6;

/// Size of one detected-object record (four f32).
pub const DETECTED_OBJECT_SIZE: usize = 16;

#[inline]
fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

#[inline]
fn read_f32_le(buf: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32_le(buf, offset))
}

/// Decoded frame header (the 32 bytes after the magic word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameHeader {
    /// Firmware/SDK version.
    pub version: u32,
    /// Frame length in bytes, counted from the first magic word byte.
    pub total_packet_len: u32,
    /// Device platform identifier.
    pub platform: u32,
    /// Frame counter.
    pub frame_number: u32,
    /// CPU timestamp at frame creation.
    pub time_cpu_cycles: u32,
    /// Number of detected objects in this frame.
    pub num_detected_obj: u32,
    /// Number of TLVs following the header.
    pub num_tlvs: u32,
    /// Subframe index (opaque pass-through).
    pub sub_frame_number: u32,
}

impl FrameHeader {
    /// Decode a header from bytes (Little Endian).
    ///
    /// `buf` starts right after the magic word. Returns `None` if it is
    /// shorter than `HEADER_SIZE`.
    ///
    /// # Example
    ///
    /// ```
    /// use mmwave_frames::protocol::{FrameHeader, HEADER_SIZE};
    ///
    /// let mut bytes = [0u8; HEADER_SIZE];
    /// bytes[4] = 64; // totalPacketLen
    /// bytes[12] = 7; // frameNumber
    /// let header = FrameHeader::decode(&bytes).unwrap();
    /// assert_eq!(header.total_packet_len, 64);
    /// assert_eq!(header.frame_number, 7);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            version: read_u32_le(buf, 0),
            total_packet_len: read_u32_le(buf, 4),
            platform: read_u32_le(buf, 8),
            frame_number: read_u32_le(buf, 12),
            time_cpu_cycles: read_u32_le(buf, 16),
            num_detected_obj: read_u32_le(buf, 20),
            num_tlvs: read_u32_le(buf, 24),
            sub_frame_number: read_u32_le(buf, 28),
        })
    }

    /// Encode the header to bytes (Little Endian), without the magic word.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        let fields = [
            self.version,
            self.total_packet_len,
            self.platform,
            self.frame_number,
            self.time_cpu_cycles,
            self.num_detected_obj,
            self.num_tlvs,
            self.sub_frame_number,
        ];
        for (chunk, value) in buf.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        buf
    }

    /// Check `totalPacketLen` against `[MIN_PACKET_LEN, max_packet_len]`.
    #[inline]
    pub fn has_sane_length(&self, max_packet_len: u32) -> bool {
        (MIN_PACKET_LEN..=max_packet_len).contains(&self.total_packet_len)
    }
}

/// TLV record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvHeader {
    /// Record type.
    pub tlv_type: u32,
    /// Record length including this 8-byte header.
    pub length: u32,
}

impl TlvHeader {
    /// Create a new TLV header.
    pub fn new(tlv_type: u32, length: u32) -> Self {
        Self { tlv_type, length }
    }

    /// Decode a TLV header. Returns `None` if `buf` is shorter than 8 bytes.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < TLV_HEADER_SIZE {
            return None;
        }
        Some(Self {
            tlv_type: read_u32_le(buf, 0),
            length: read_u32_le(buf, 4),
        })
    }

    /// Encode the TLV header (Little Endian).
    pub fn encode(&self) -> [u8; TLV_HEADER_SIZE] {
        let mut buf = [0u8; TLV_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.tlv_type.to_le_bytes());
        buf[4..8].copy_from_slice(&self.length.to_le_bytes());
        buf
    }

    /// Payload length (`length - 8`), or `None` if `length < 8`.
    #[inline]
    pub fn payload_len(&self) -> Option<usize> {
        (self.length as usize).checked_sub(TLV_HEADER_SIZE)
    }
}

/// One radar point: position in meters, radial velocity in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectedObject {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub velocity: f32,
}

impl DetectedObject {
    /// Create a new detected object.
    pub fn new(x: f32, y: f32, z: f32, velocity: f32) -> Self {
        Self { x, y, z, velocity }
    }

    /// Decode one 16-byte record. Returns `None` if `buf` is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < DETECTED_OBJECT_SIZE {
            return None;
        }
        Some(Self {
            x: read_f32_le(buf, 0),
            y: read_f32_le(buf, 4),
            z: read_f32_le(buf, 8),
            velocity: read_f32_le(buf, 12),
        })
    }

    /// Encode to a 16-byte record.
    pub fn encode(&self) -> [u8; DETECTED_OBJECT_SIZE] {
        let mut buf = [0u8; DETECTED_OBJECT_SIZE];
        buf[0..4].copy_from_slice(&self.x.to_le_bytes());
        buf[4..8].copy_from_slice(&self.y.to_le_bytes());
        buf[8..12].copy_from_slice(&self.z.to_le_bytes());
        buf[12..16].copy_from_slice(&self.velocity.to_le_bytes());
        buf
    }
}
