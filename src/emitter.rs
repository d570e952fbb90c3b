//! Frame emitters - where decoded frames go.
//!
//! The decoder's only output contract: every successfully decoded frame is
//! emitted exactly once, in arrival order. Emitters must not block the
//! decoder indefinitely.
//!
//! - [`ChannelEmitter`] - bounded tokio channel, drops when full
//! - [`JsonLinesEmitter`] - one JSON object per line on any `Write`
//! - [`MsgPackEmitter`] - length-prefixed MessagePack on any `Write`
//! - [`LogEmitter`] - per-frame summary through `tracing`
//! - `Vec<DecodedFrame>` - collects everything (tests, batch tools)

use std::io::Write;

use tokio::sync::mpsc;

use crate::codec::{JsonCodec, MsgPackCodec};
use crate::error::{RadarError, Result};
use crate::protocol::DecodedFrame;

/// Receives each decoded frame, in stream order.
pub trait FrameEmitter {
    /// Take ownership of one frame.
    ///
    /// An `Err` is fatal for the read loop.
    fn emit(&mut self, frame: DecodedFrame) -> Result<()>;
}

impl FrameEmitter for Vec<DecodedFrame> {
    fn emit(&mut self, frame: DecodedFrame) -> Result<()> {
        self.push(frame);
        Ok(())
    }
}

impl<E: FrameEmitter + ?Sized> FrameEmitter for Box<E> {
    fn emit(&mut self, frame: DecodedFrame) -> Result<()> {
        (**self).emit(frame)
    }
}

/// Publishes frames on a bounded `mpsc` channel.
///
/// Uses `try_send`: when the consumer lags and the channel is full, the
/// frame is dropped and counted instead of stalling the decoder.
pub struct ChannelEmitter {
    tx: mpsc::Sender<DecodedFrame>,
    dropped: u64,
}

impl ChannelEmitter {
    /// Wrap an existing sender.
    pub fn new(tx: mpsc::Sender<DecodedFrame>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Create an emitter and its receiver with the given capacity.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DecodedFrame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Frames dropped because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl FrameEmitter for ChannelEmitter {
    fn emit(&mut self, frame: DecodedFrame) -> Result<()> {
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(frame)) => {
                self.dropped += 1;
                tracing::warn!(
                    frame_number = frame.frame_number(),
                    dropped = self.dropped,
                    "Frame channel full, dropping frame"
                );
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(RadarError::ChannelClosed),
        }
    }
}

/// Writes each frame as one JSON line and flushes.
pub struct JsonLinesEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesEmitter<W> {
    /// Create an emitter over any writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Get the underlying writer back.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesEmitter<std::io::Stdout> {
    /// Emit to stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> FrameEmitter for JsonLinesEmitter<W> {
    fn emit(&mut self, frame: DecodedFrame) -> Result<()> {
        let line = JsonCodec::encode(&frame)?;
        // Explicit '\n', never "\r\n"
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes each frame as `u32` big-endian length + MessagePack map.
pub struct MsgPackEmitter<W: Write> {
    writer: W,
}

impl<W: Write> MsgPackEmitter<W> {
    /// Create an emitter over any writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Get the underlying writer back.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameEmitter for MsgPackEmitter<W> {
    fn emit(&mut self, frame: DecodedFrame) -> Result<()> {
        let payload = MsgPackCodec::encode(&frame)?;
        let len = u32::try_from(payload.len()).map_err(|_| {
            RadarError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "encoded frame exceeds u32 length prefix",
            ))
        })?;
        self.writer.write_all(&len.to_be_bytes())?;
        self.writer.write_all(&payload)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Logs a one-line summary per frame at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEmitter;

impl FrameEmitter for LogEmitter {
    fn emit(&mut self, frame: DecodedFrame) -> Result<()> {
        tracing::info!(
            frame_number = frame.frame_number(),
            sub_frame = frame.sub_frame_number(),
            objects = frame.objects.len(),
            tlvs = frame.tlv_types.len(),
            truncated = frame.truncated,
            "Frame decoded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DetectedObject, FrameHeader};

    fn frame(n: u32) -> DecodedFrame {
        DecodedFrame {
            header: FrameHeader {
                frame_number: n,
                ..FrameHeader::default()
            },
            objects: vec![DetectedObject::new(n as f32, 0.0, 0.0, 0.0)],
            tlv_types: [6].into_iter().collect(),
            truncated: false,
        }
    }

    #[test]
    fn test_vec_collects_in_order() {
        let mut sink: Vec<DecodedFrame> = Vec::new();
        for n in 0..3 {
            sink.emit(frame(n)).unwrap();
        }
        let numbers: Vec<u32> = sink.iter().map(|f| f.frame_number()).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
    }

    #[test]
    fn test_channel_emitter_drops_when_full() {
        let (mut emitter, mut rx) = ChannelEmitter::channel(2);

        for n in 0..5 {
            emitter.emit(frame(n)).unwrap();
        }

        assert_eq!(emitter.dropped(), 3);
        assert_eq!(rx.try_recv().unwrap().frame_number(), 0);
        assert_eq!(rx.try_recv().unwrap().frame_number(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_emitter_closed_is_error() {
        let (mut emitter, rx) = ChannelEmitter::channel(4);
        drop(rx);

        let result = emitter.emit(frame(1));
        assert!(matches!(result, Err(RadarError::ChannelClosed)));
    }

    #[test]
    fn test_json_lines_emitter() {
        let mut emitter = JsonLinesEmitter::new(Vec::new());
        emitter.emit(frame(1)).unwrap();
        emitter.emit(frame(2)).unwrap();

        let out = String::from_utf8(emitter.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(out.ends_with('\n'));
        assert!(!out.contains("\r\n"));

        let second: DecodedFrame = JsonCodec::decode(lines[1]).unwrap();
        assert_eq!(second, frame(2));
    }

    #[test]
    fn test_msgpack_emitter_length_prefix() {
        let mut emitter = MsgPackEmitter::new(Vec::new());
        emitter.emit(frame(7)).unwrap();

        let out = emitter.into_inner();
        let len = u32::from_be_bytes([out[0], out[1], out[2], out[3]]) as usize;
        assert_eq!(out.len(), 4 + len);

        let decoded: DecodedFrame = MsgPackCodec::decode(&out[4..]).unwrap();
        assert_eq!(decoded, frame(7));
    }

    #[test]
    fn test_log_emitter_accepts_frames() {
        let mut emitter = LogEmitter;
        assert!(emitter.emit(frame(1)).is_ok());
    }

    #[test]
    fn test_boxed_emitter() {
        let mut boxed: Box<dyn FrameEmitter> = Box::new(LogEmitter);
        assert!(boxed.emit(frame(3)).is_ok());
    }
}
