//! JSON codec using `serde_json`.
//!
//! Output is compact (single line), suitable for JSON-lines streams.

use crate::error::Result;

/// JSON codec for frames and stats.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to a single-line JSON string.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// Decode a value from JSON text.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DecodedFrame, DetectedObject, FrameHeader};

    fn sample_frame() -> DecodedFrame {
        DecodedFrame {
            header: FrameHeader {
                frame_number: 12,
                total_packet_len: 64,
                num_detected_obj: 1,
                num_tlvs: 1,
                ..FrameHeader::default()
            },
            objects: vec![DetectedObject::new(0.5, 2.0, -0.25, 1.0)],
            tlv_types: [6].into_iter().collect(),
            truncated: false,
        }
    }

    #[test]
    fn test_encode_is_single_line() {
        let line = JsonCodec::encode(&sample_frame()).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"totalPacketLen\":64"));
        assert!(line.contains("\"velocity\":1.0"));
    }

    #[test]
    fn test_decode_back() {
        let frame = sample_frame();
        let line = JsonCodec::encode(&frame).unwrap();
        let decoded: DecodedFrame = JsonCodec::decode(&line).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_decode_error_on_invalid_text() {
        let result: Result<DecodedFrame> = JsonCodec::decode("{not json");
        assert!(result.is_err());
    }
}
