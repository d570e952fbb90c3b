//! Transport over any async reader.
//!
//! # Example
//!
//! ```ignore
//! use mmwave_frames::transport::{StreamTransport, TransportConfig};
//!
//! let config = TransportConfig { port: "/dev/ttyACM1".into(), ..Default::default() };
//! let transport = StreamTransport::open(&config).await?;
//! ```

use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{ReadOutcome, Transport, TransportConfig};
use crate::error::Result;

/// Wraps an `AsyncRead`, applying an optional per-read timeout.
pub struct StreamTransport<R> {
    reader: R,
    read_timeout: Option<Duration>,
    scratch: Vec<u8>,
}

impl<R> StreamTransport<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Wrap a reader with no read timeout.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            read_timeout: None,
            scratch: Vec::new(),
        }
    }

    /// Wrap a reader with the timeout from `config`.
    pub fn with_config(reader: R, config: &TransportConfig) -> Self {
        Self::new(reader).read_timeout(config.read_timeout())
    }

    /// Set the per-read timeout.
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Get the underlying reader back.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl StreamTransport<tokio::fs::File> {
    /// Open `config.port` as a file: an already configured device node or
    /// a captured byte dump.
    pub async fn open(config: &TransportConfig) -> Result<Self> {
        let file = tokio::fs::File::open(&config.port).await?;
        tracing::debug!(port = %config.port, baud = config.baud_rate, "Opened transport");
        Ok(Self::with_config(file, config))
    }
}

impl<R> Transport for StreamTransport<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn read(&mut self, max_bytes: usize) -> Result<ReadOutcome> {
        self.scratch.resize(max_bytes.max(1), 0);

        let read = self.reader.read(&mut self.scratch);
        let n = match self.read_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, read).await {
                Ok(result) => result?,
                Err(_) => return Ok(ReadOutcome::Timeout),
            },
            None => read.await?,
        };

        if n == 0 {
            return Ok(ReadOutcome::Closed);
        }
        Ok(ReadOutcome::Data(Bytes::copy_from_slice(&self.scratch[..n])))
    }
}
