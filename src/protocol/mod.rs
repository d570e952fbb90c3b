//! Protocol module - wire format, synchronization and frame decoding.
//!
//! This module implements the radar's UART output protocol:
//! - Magic word synchronization over an arbitrarily chunked stream
//! - 32-byte header and TLV decoding (Little Endian)
//! - Resumable frame decoder with bounded buffering

mod frame;
mod frame_decoder;
mod stream_buffer;
mod sync;
mod tlv;
mod wire_format;

pub use frame::{DecodedFrame, FrameBuilder};
pub use frame_decoder::{
    DecoderConfig, DecoderState, DecoderStats, FrameDecoder, DEFAULT_MAX_BUFFERED_BYTES,
};
pub use stream_buffer::ByteStreamBuffer;
pub use sync::{find_magic_word, FrameSynchronizer, SyncOutcome};
pub use tlv::{decode_detected_objects, ObjectList, TlvIter, TlvRecord};
pub use wire_format::{
    DetectedObject, FrameHeader, TlvHeader, DEFAULT_MAX_PACKET_LEN, DETECTED_OBJECTS_TLV_TYPE,
    DETECTED_OBJECT_SIZE, HEADER_SIZE, MAGIC_WORD, MAGIC_WORD_LEN, MIN_PACKET_LEN,
    TLV_HEADER_SIZE,
};
