//! Decoded frame type and wire-frame builder.
//!
//! # Example
//!
//! ```
//! use mmwave_frames::protocol::{DetectedObject, FrameBuilder, FrameDecoder};
//!
//! let bytes = FrameBuilder::new(7)
//!     .detected_objects(&[DetectedObject::new(1.0, 2.0, 0.0, 0.5)])
//!     .build();
//!
//! let mut decoder = FrameDecoder::new();
//! let frames = decoder.push(&bytes);
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].frame_number(), 7);
//! assert_eq!(frames[0].objects.len(), 1);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::wire_format::{
    DetectedObject, FrameHeader, TlvHeader, DETECTED_OBJECTS_TLV_TYPE, MAGIC_WORD, MIN_PACKET_LEN,
    TLV_HEADER_SIZE,
};

/// One fully decoded frame, handed to a `FrameEmitter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedFrame {
    /// Header fields as received.
    pub header: FrameHeader,
    /// Detected objects, in record order.
    pub objects: Vec<DetectedObject>,
    /// Every TLV type seen in this frame, recognized or not.
    pub tlv_types: BTreeSet<u32>,
    /// The object list holds fewer entries than `numDetectedObj` announced.
    #[serde(default)]
    pub truncated: bool,
}

impl DecodedFrame {
    /// Get the frame number.
    #[inline]
    pub fn frame_number(&self) -> u32 {
        self.header.frame_number
    }

    /// Get the subframe number.
    #[inline]
    pub fn sub_frame_number(&self) -> u32 {
        self.header.sub_frame_number
    }

    /// Check whether a TLV of the given type was present.
    #[inline]
    pub fn has_tlv(&self, tlv_type: u32) -> bool {
        self.tlv_types.contains(&tlv_type)
    }
}

/// Builds bit-exact frames: magic word, header, TLVs, optional padding.
///
/// `totalPacketLen` and `numTLVs` are filled in by `build()` unless
/// overridden; overrides let tests produce deliberately broken frames.
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    header: FrameHeader,
    tlvs: Vec<(u32, Vec<u8>)>,
    padding: usize,
    total_len_override: Option<u32>,
    num_tlvs_override: Option<u32>,
}

impl FrameBuilder {
    /// Start a frame with the given frame number.
    pub fn new(frame_number: u32) -> Self {
        Self {
            header: FrameHeader {
                frame_number,
                ..FrameHeader::default()
            },
            ..Self::default()
        }
    }

    /// Set the header fields that the builder does not compute.
    pub fn header(mut self, header: FrameHeader) -> Self {
        self.header = header;
        self
    }

    /// Append a detected-object TLV (type 6) and set `numDetectedObj`.
    pub fn detected_objects(mut self, objects: &[DetectedObject]) -> Self {
        let payload = objects.iter().flat_map(|o| o.encode()).collect();
        self.header.num_detected_obj = objects.len() as u32;
        self.tlvs.push((DETECTED_OBJECTS_TLV_TYPE, payload));
        self
    }

    /// Append an arbitrary TLV.
    pub fn tlv(mut self, tlv_type: u32, payload: &[u8]) -> Self {
        self.tlvs.push((tlv_type, payload.to_vec()));
        self
    }

    /// Append zero bytes after the last TLV (inside `totalPacketLen`).
    pub fn padding(mut self, len: usize) -> Self {
        self.padding = len;
        self
    }

    /// Force `numDetectedObj`.
    pub fn num_detected_obj(mut self, n: u32) -> Self {
        self.header.num_detected_obj = n;
        self
    }

    /// Force `numTLVs` instead of counting the TLVs added.
    pub fn num_tlvs(mut self, n: u32) -> Self {
        self.num_tlvs_override = Some(n);
        self
    }

    /// Force `totalPacketLen` instead of computing it.
    pub fn total_packet_len(mut self, len: u32) -> Self {
        self.total_len_override = Some(len);
        self
    }

    /// Encode the frame.
    pub fn build(&self) -> Vec<u8> {
        let body_len: usize = self
            .tlvs
            .iter()
            .map(|(_, payload)| TLV_HEADER_SIZE + payload.len())
            .sum::<usize>()
            + self.padding;

        let mut header = self.header;
        header.total_packet_len = self
            .total_len_override
            .unwrap_or(MIN_PACKET_LEN + body_len as u32);
        header.num_tlvs = self.num_tlvs_override.unwrap_or(self.tlvs.len() as u32);

        let mut buf = Vec::with_capacity(MIN_PACKET_LEN as usize + body_len);
        buf.extend_from_slice(&MAGIC_WORD);
        buf.extend_from_slice(&header.encode());
        for (tlv_type, payload) in &self.tlvs {
            let length = (TLV_HEADER_SIZE + payload.len()) as u32;
            buf.extend_from_slice(&TlvHeader::new(*tlv_type, length).encode());
            buf.extend_from_slice(payload);
        }
        buf.resize(buf.len() + self.padding, 0);
        buf
    }
}
