//! TLV walking and the detected-object list decoder.
//!
//! The walk is bounded by the frame's declared span: a TLV whose length
//! would cross `totalPacketLen` aborts the frame instead of reading into
//! the next one.

use super::wire_format::{DetectedObject, TlvHeader, DETECTED_OBJECT_SIZE, TLV_HEADER_SIZE};
use crate::error::FrameError;

/// One TLV record borrowed from the frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvRecord<'a> {
    /// Record type.
    pub tlv_type: u32,
    /// Record length including the 8-byte header.
    pub length: u32,
    /// `length - 8` payload bytes.
    pub payload: &'a [u8],
}

/// Iterator over the TLVs of one frame.
///
/// Yields `Err` once for a malformed record and then stops. Stops quietly
/// when `num_tlvs` records were read or fewer than 8 bytes remain.
pub struct TlvIter<'a> {
    data: &'a [u8],
    offset: usize,
    index: u32,
    num_tlvs: u32,
    failed: bool,
}

impl<'a> TlvIter<'a> {
    /// Walk `num_tlvs` records in `data` (TLV start up to `totalPacketLen`).
    pub fn new(data: &'a [u8], num_tlvs: u32) -> Self {
        Self {
            data,
            offset: 0,
            index: 0,
            num_tlvs,
            failed: false,
        }
    }

    /// Bytes not walked yet.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Number of records read so far.
    pub fn consumed(&self) -> u32 {
        self.index
    }
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = Result<TlvRecord<'a>, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.num_tlvs {
            return None;
        }

        let rest = &self.data[self.offset..];
        let header = TlvHeader::decode(rest)?;
        let remaining = rest.len();

        let payload_len = match header.payload_len() {
            Some(len) if (header.length as usize) <= remaining => len,
            _ => {
                self.failed = true;
                return Some(Err(FrameError::MalformedTlv {
                    index: self.index,
                    tlv_type: header.tlv_type,
                    length: header.length,
                    remaining,
                }));
            }
        };

        let start = TLV_HEADER_SIZE;
        let record = TlvRecord {
            tlv_type: header.tlv_type,
            length: header.length,
            payload: &rest[start..start + payload_len],
        };

        self.offset += header.length as usize;
        self.index += 1;
        Some(Ok(record))
    }
}

/// Decoded object list, possibly cut short.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectList {
    pub objects: Vec<DetectedObject>,
    /// Set when the payload held fewer records than announced.
    pub truncation: Option<FrameError>,
}

/// Decode `num_detected_obj` 16-byte records from a detected-object payload.
///
/// A short payload yields every complete record that fits plus a
/// `TruncatedObjectList` marker. Extra trailing bytes are ignored.
pub fn decode_detected_objects(payload: &[u8], num_detected_obj: u32) -> ObjectList {
    let available = payload.len() / DETECTED_OBJECT_SIZE;
    let count = (num_detected_obj as usize).min(available);

    let objects: Vec<DetectedObject> = payload
        .chunks_exact(DETECTED_OBJECT_SIZE)
        .take(count)
        .filter_map(DetectedObject::decode)
        .collect();

    let truncation = if (objects.len() as u64) < u64::from(num_detected_obj) {
        Some(FrameError::TruncatedObjectList {
            expected: num_detected_obj,
            decoded: objects.len() as u32,
        })
    } else {
        None
    };

    ObjectList {
        objects,
        truncation,
    }
}
