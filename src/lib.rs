//! # mmwave-frames
//!
//! Decoder for the binary output stream of mmWave radar sensors.
//!
//! The sensor writes frames over a UART data port: an 8-byte magic word,
//! a 32-byte header, then a sequence of TLV records. Reads from the port
//! return arbitrary slices of that stream, so the decoder buffers across
//! reads, resynchronizes on the magic word after garbage or corruption, and
//! only decodes a frame once its declared length has arrived.
//!
//! ## Architecture
//!
//! - **Protocol** ([`protocol`]): wire format, magic-word sync, TLV walk,
//!   and the resumable [`FrameDecoder`]
//! - **Transport** ([`transport`]): where bytes come from
//! - **Emitters** ([`emitter`]): where decoded frames go
//! - **Reader** ([`reader`]): the read loop tying them together
//!
//! ## Example
//!
//! ```
//! use mmwave_frames::{DetectedObject, FrameBuilder, FrameDecoder};
//!
//! let bytes = FrameBuilder::new(1)
//!     .detected_objects(&[DetectedObject::new(0.5, 2.0, 0.1, -0.3)])
//!     .build();
//!
//! let mut decoder = FrameDecoder::new();
//! let mut frames = decoder.push(&bytes[..20]);
//! frames.extend(decoder.push(&bytes[20..]));
//!
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].objects[0].y, 2.0);
//! ```

pub mod codec;
pub mod config;
pub mod emitter;
pub mod error;
pub mod protocol;
pub mod reader;
pub mod transport;

pub use config::RadarConfig;
pub use emitter::FrameEmitter;
pub use error::{FrameError, RadarError, Result};
pub use protocol::{
    DecodedFrame, DecoderConfig, DecoderStats, DetectedObject, FrameBuilder, FrameDecoder,
    FrameHeader,
};
pub use reader::{run_decode_loop, spawn_reader_task, ReaderConfig};
