//! Transport module - where raw bytes come from.
//!
//! The decoder never touches the transport. A [`Transport`] hands out
//! bounded chunks; opening and configuring the physical link (serial port
//! enumeration, baud rate, line settings) happens before it is built.
//!
//! - [`SerialTransport`] - UART data port opened with the configured line
//!   settings
//! - [`StreamTransport`] - any `tokio::io::AsyncRead` (device node, TCP,
//!   stdin, capture file) with a per-read timeout
//! - [`MemoryTransport`] - pre-recorded chunks, for replay and tests

mod memory;
mod serial;
mod stream;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use memory::MemoryTransport;
pub use serial::SerialTransport;
pub use stream::StreamTransport;

/// Default UART data port baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// Default read timeout in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 50;

/// Outcome of one transport read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// At least one byte arrived.
    Data(Bytes),
    /// Nothing arrived within the read timeout.
    Timeout,
    /// The stream ended.
    Closed,
}

/// Source of raw bytes.
pub trait Transport: Send {
    /// Read at most `max_bytes`.
    ///
    /// # Errors
    ///
    /// Read failures are fatal for the read loop.
    fn read(&mut self, max_bytes: usize) -> impl Future<Output = Result<ReadOutcome>> + Send;
}

/// Serial parity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

/// Link settings. Only the transport side reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Port identifier or path (e.g. `/dev/ttyACM1`, `COM7`).
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
    /// Per-read timeout; 0 disables it.
    pub read_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl TransportConfig {
    /// Read timeout, `None` when disabled.
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }
}
