//! Top-level configuration.
//!
//! Every section has defaults, so a config file only lists what differs:
//!
//! ```json
//! {
//!   "transport": { "port": "/dev/ttyACM1", "read_timeout_ms": 100 },
//!   "decoder": { "max_packet_len": 65536 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::DecoderConfig;
use crate::reader::ReaderConfig;
use crate::transport::TransportConfig;

/// Transport, decoder and read-loop settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub transport: TransportConfig,
    pub decoder: DecoderConfig,
    pub reader: ReaderConfig,
}

impl RadarConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.decoder.validate()?;
        self.reader.validate()
    }
}
