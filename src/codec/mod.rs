//! Codec module - serialization of decoded frames for output sinks.
//!
//! - [`JsonCodec`] - one JSON object per frame (`serde_json`)
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde`, struct-as-map
//!
//! # Example
//!
//! ```
//! use mmwave_frames::codec::{JsonCodec, MsgPackCodec};
//! use mmwave_frames::protocol::{DetectedObject, FrameBuilder, FrameDecoder};
//!
//! let bytes = FrameBuilder::new(3)
//!     .detected_objects(&[DetectedObject::new(1.0, 2.0, 0.0, 0.0)])
//!     .build();
//! let frame = FrameDecoder::new().push(&bytes).remove(0);
//!
//! let line = JsonCodec::encode(&frame).unwrap();
//! assert!(line.contains("\"frameNumber\":3"));
//!
//! let packed = MsgPackCodec::encode(&frame).unwrap();
//! let back: mmwave_frames::DecodedFrame = MsgPackCodec::decode(&packed).unwrap();
//! assert_eq!(back, frame);
//! ```

mod json;
mod msgpack;

pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;
