//! Transport over a UART port via `serialport`.
//!
//! `serialport` reads are blocking, so each read runs on tokio's blocking
//! pool with the port moved in and handed back afterwards.

use std::io::{ErrorKind, Read};
use std::time::Duration;

use bytes::Bytes;

use super::{Parity, ReadOutcome, Transport, TransportConfig};
use crate::error::{RadarError, Result};

/// Port-level read timeout when the config disables it.
const IDLE_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial data port opened from a [`TransportConfig`].
pub struct SerialTransport {
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialTransport {
    /// Open `config.port` with the configured line settings.
    ///
    /// # Errors
    ///
    /// `RadarError::Config` for unsupported line settings,
    /// `RadarError::Serial` if the port cannot be opened.
    pub fn open(config: &TransportConfig) -> Result<Self> {
        let builder = port_builder(config)?;
        let port = builder.open()?;
        tracing::debug!(port = %config.port, baud = config.baud_rate, "Opened serial port");
        Ok(Self { port: Some(port) })
    }

    /// Names of the serial ports present on this machine.
    pub fn available_ports() -> Result<Vec<String>> {
        Ok(serialport::available_ports()?
            .into_iter()
            .map(|p| p.port_name)
            .collect())
    }
}

fn port_builder(config: &TransportConfig) -> Result<serialport::SerialPortBuilder> {
    if config.port.is_empty() {
        return Err(RadarError::Config("transport.port is empty".to_string()));
    }

    let data_bits = match config.data_bits {
        5 => serialport::DataBits::Five,
        6 => serialport::DataBits::Six,
        7 => serialport::DataBits::Seven,
        8 => serialport::DataBits::Eight,
        n => return Err(RadarError::Config(format!("unsupported data_bits: {}", n))),
    };
    let stop_bits = match config.stop_bits {
        1 => serialport::StopBits::One,
        2 => serialport::StopBits::Two,
        n => return Err(RadarError::Config(format!("unsupported stop_bits: {}", n))),
    };
    let parity = match config.parity {
        Parity::None => serialport::Parity::None,
        Parity::Odd => serialport::Parity::Odd,
        Parity::Even => serialport::Parity::Even,
    };

    Ok(serialport::new(config.port.as_str(), config.baud_rate)
        .data_bits(data_bits)
        .stop_bits(stop_bits)
        .parity(parity)
        .timeout(config.read_timeout().unwrap_or(IDLE_READ_TIMEOUT)))
}

impl Transport for SerialTransport {
    async fn read(&mut self, max_bytes: usize) -> Result<ReadOutcome> {
        let mut port = self.port.take().ok_or(RadarError::TransportClosed)?;
        let max_bytes = max_bytes.max(1);

        let (port, buf, result) = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; max_bytes];
            let result = port.read(&mut buf);
            (port, buf, result)
        })
        .await
        .map_err(|e| RadarError::Io(std::io::Error::new(ErrorKind::Other, e)))?;
        self.port = Some(port);

        match result {
            // A quiet line is not an end of stream
            Ok(0) => Ok(ReadOutcome::Timeout),
            Ok(n) => Ok(ReadOutcome::Data(Bytes::copy_from_slice(&buf[..n]))),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(ReadOutcome::Timeout),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(ReadOutcome::Timeout),
            Err(e) => Err(e.into()),
        }
    }
}
