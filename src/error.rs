//! Error types for mmwave-frames.
//!
//! Two layers:
//! - [`RadarError`]: fatal conditions for the read loop (I/O, closed
//!   channels, bad configuration, serialization).
//! - [`FrameError`]: per-frame conditions found while decoding. These never
//!   stop the decoder; the frame is rejected or emitted partially and the
//!   stream keeps going.

use thiserror::Error;

/// Main error type for all fatal operations.
#[derive(Debug, Error)]
pub enum RadarError {
    /// I/O error on the transport or an output sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config files, JSON lines).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Serial port could not be opened or enumerated.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// The transport reported an unexpected closure.
    #[error("Transport closed")]
    TransportClosed,

    /// The frame receiver went away.
    #[error("Frame channel closed")]
    ChannelClosed,
}

/// Result type alias using RadarError.
pub type Result<T> = std::result::Result<T, RadarError>;

/// Non-fatal problems found inside a single frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// `totalPacketLen` outside `[min, max]`.
    #[error("Invalid header: total packet length {total_packet_len} outside [{min}, {max}]")]
    InvalidHeader {
        total_packet_len: u32,
        min: u32,
        max: u32,
    },

    /// TLV length below 8 or past the declared end of the frame.
    #[error("Malformed TLV #{index} (type {tlv_type}): length {length}, {remaining} bytes left in frame")]
    MalformedTlv {
        index: u32,
        tlv_type: u32,
        length: u32,
        remaining: usize,
    },

    /// Detected-object payload shorter than `numDetectedObj * 16`.
    #[error("Truncated object list: expected {expected} objects, payload holds {decoded}")]
    TruncatedObjectList { expected: u32, decoded: u32 },
}
