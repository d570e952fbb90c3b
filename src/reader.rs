//! Read loop: transport → decoder → emitter.
//!
//! One task owns the transport, the [`FrameDecoder`] and the emitter, so
//! frames leave in exactly the order their bytes arrived.
//!
//! ```text
//! Transport ─► read(chunk) ─► FrameDecoder::push ─► FrameEmitter ─► mpsc ─► consumer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mmwave_frames::reader::{spawn_reader_task, ReaderConfig};
//! use mmwave_frames::transport::{StreamTransport, TransportConfig};
//! use mmwave_frames::DecoderConfig;
//!
//! let transport = StreamTransport::open(&TransportConfig::default()).await?;
//! let (mut frames, task) =
//!     spawn_reader_task(transport, DecoderConfig::default(), ReaderConfig::default())?;
//!
//! while let Some(frame) = frames.recv().await {
//!     println!("frame {} with {} objects", frame.frame_number(), frame.objects.len());
//! }
//! let stats = task.await??;
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::emitter::{ChannelEmitter, FrameEmitter};
use crate::error::{RadarError, Result};
use crate::protocol::{DecodedFrame, DecoderConfig, DecoderStats, FrameDecoder};
use crate::transport::{ReadOutcome, Transport};

/// Default read size, matching a typical UART driver buffer.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

/// Default frame channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for the read loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Maximum bytes requested per transport read.
    pub read_chunk_size: usize,
    /// Capacity of the decoded-frame channel.
    pub channel_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ReaderConfig {
    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.read_chunk_size == 0 {
            return Err(RadarError::Config("read_chunk_size must be > 0".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(RadarError::Config("channel_capacity must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Drive the decoder until the transport closes.
///
/// Timeouts just loop. On closure the decoder's partial state is dropped
/// and the final stats are returned.
///
/// # Errors
///
/// Transport read failures and emitter failures are returned as-is; the
/// decoder is reset first.
pub async fn run_decode_loop<T, E>(
    transport: &mut T,
    decoder: &mut FrameDecoder,
    emitter: &mut E,
    config: &ReaderConfig,
) -> Result<DecoderStats>
where
    T: Transport,
    E: FrameEmitter + ?Sized,
{
    loop {
        let chunk = match transport.read(config.read_chunk_size).await {
            Ok(ReadOutcome::Data(chunk)) => chunk,
            Ok(ReadOutcome::Timeout) => continue,
            Ok(ReadOutcome::Closed) => {
                decoder.finish();
                tracing::debug!("Transport closed");
                return Ok(decoder.stats());
            }
            Err(e) => {
                decoder.finish();
                return Err(e);
            }
        };

        for frame in decoder.push(&chunk) {
            if let Err(e) = emitter.emit(frame) {
                decoder.finish();
                return Err(e);
            }
        }
    }
}

/// Spawn the read loop on tokio and return the frame receiver.
///
/// Frames are published on a bounded channel; when the consumer falls
/// behind, new frames are dropped rather than stalling the reader.
///
/// # Returns
///
/// A tuple of `(Receiver, JoinHandle)`. The receiver yields frames in
/// arrival order and ends when the transport closes; the handle resolves
/// to the final stats.
///
/// # Errors
///
/// Returns `RadarError::Config` for invalid settings.
pub fn spawn_reader_task<T>(
    transport: T,
    decoder_config: DecoderConfig,
    config: ReaderConfig,
) -> Result<(mpsc::Receiver<DecodedFrame>, JoinHandle<Result<DecoderStats>>)>
where
    T: Transport + 'static,
{
    config.validate()?;
    let decoder = FrameDecoder::with_config(decoder_config)?;
    let (emitter, rx) = ChannelEmitter::channel(config.channel_capacity);

    let task = tokio::spawn(reader_loop(transport, decoder, emitter, config));

    Ok((rx, task))
}

async fn reader_loop<T: Transport>(
    mut transport: T,
    mut decoder: FrameDecoder,
    mut emitter: ChannelEmitter,
    config: ReaderConfig,
) -> Result<DecoderStats> {
    let result = run_decode_loop(&mut transport, &mut decoder, &mut emitter, &config).await;

    match &result {
        Ok(stats) => tracing::debug!(
            frames = stats.frames_decoded,
            rejected = stats.frames_rejected,
            dropped = emitter.dropped(),
            "Read loop finished"
        ),
        Err(e) => tracing::error!("Read loop error: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DetectedObject, FrameBuilder};
    use crate::transport::MemoryTransport;

    fn frame_bytes(n: u32) -> Vec<u8> {
        FrameBuilder::new(n)
            .detected_objects(&[DetectedObject::new(n as f32, 1.0, 0.0, 0.0)])
            .build()
    }

    #[test]
    fn test_config_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.read_chunk_size, 4096);
        assert_eq!(config.channel_capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero() {
        let config = ReaderConfig {
            read_chunk_size: 0,
            ..ReaderConfig::default()
        };
        assert!(matches!(config.validate(), Err(RadarError::Config(_))));
    }

    #[tokio::test]
    async fn test_run_loop_collects_frames_across_reads() {
        let mut stream = Vec::new();
        for n in 0..4 {
            stream.extend(frame_bytes(n));
        }

        // 7-byte reads split every frame and magic word at odd offsets
        let mut transport = MemoryTransport::new(vec![stream]);
        let mut decoder = FrameDecoder::new();
        let mut sink: Vec<DecodedFrame> = Vec::new();
        let config = ReaderConfig {
            read_chunk_size: 7,
            ..ReaderConfig::default()
        };

        let stats = run_decode_loop(&mut transport, &mut decoder, &mut sink, &config)
            .await
            .unwrap();

        assert_eq!(stats.frames_decoded, 4);
        let numbers: Vec<u32> = sink.iter().map(|f| f.frame_number()).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_run_loop_drops_partial_on_close() {
        let bytes = frame_bytes(1);
        let mut transport = MemoryTransport::new(vec![bytes[..50].to_vec()]);
        let mut decoder = FrameDecoder::new();
        let mut sink: Vec<DecodedFrame> = Vec::new();
        let config = ReaderConfig::default();

        let stats = run_decode_loop(&mut transport, &mut decoder, &mut sink, &config)
            .await
            .unwrap();

        assert!(sink.is_empty());
        assert_eq!(stats.partial_frames_dropped, 1);
    }

    #[tokio::test]
    async fn test_spawned_task_preserves_order() {
        let chunks: Vec<Vec<u8>> = (0..10).map(frame_bytes).collect();
        let transport = MemoryTransport::new(chunks);

        let (mut rx, task) =
            spawn_reader_task(transport, DecoderConfig::default(), ReaderConfig::default())
                .unwrap();

        let mut numbers = Vec::new();
        while let Some(frame) = rx.recv().await {
            numbers.push(frame.frame_number());
        }

        assert_eq!(numbers, (0..10).collect::<Vec<u32>>());
        let stats = task.await.unwrap().unwrap();
        assert_eq!(stats.frames_decoded, 10);
    }

    #[tokio::test]
    async fn test_spawn_rejects_bad_config() {
        let result = spawn_reader_task(
            MemoryTransport::default(),
            DecoderConfig {
                max_packet_len: 1,
                ..DecoderConfig::default()
            },
            ReaderConfig::default(),
        );
        assert!(matches!(result, Err(RadarError::Config(_))));
    }
}
