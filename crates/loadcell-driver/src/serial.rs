//! Serial Port Transport
//!
//! Opens the RS-485 adapter in raw 8N1 mode with no flow control.

use crate::transport::{Transport, TransportError};
use serde::{Deserialize, Serialize};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Baud rates accepted at open time
pub const SUPPORTED_BAUD_RATES: [u32; 3] = [9600, 19200, 115200];

/// Serial line configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub device: String,
    /// Line speed, one of [`SUPPORTED_BAUD_RATES`]
    pub baud_rate: u32,
    /// Minimum bytes per read. Accepted for config compatibility but not
    /// applied: a read returns as soon as any byte is available.
    pub vmin: u8,
    /// Inter-character timeout in deciseconds
    pub vtime_ds: u8,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 19200,
            vmin: 0,
            vtime_ds: 1,
        }
    }
}

impl SerialConfig {
    /// Create a config for `device` at `baud_rate` with default timeouts
    pub fn new(device: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            device: device.into(),
            baud_rate,
            ..Default::default()
        }
    }

    /// Check the baud rate against the supported set
    pub fn validate(&self) -> Result<(), TransportError> {
        if SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            Ok(())
        } else {
            Err(TransportError::UnsupportedBaudRate(self.baud_rate))
        }
    }

    /// Blocking read timeout derived from `vtime_ds`
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.vtime_ds) * 100)
    }
}

/// Serial transport owning at most one open port handle
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    config: Option<SerialConfig>,
    last_error: String,
}

impl SerialTransport {
    /// Create an unconfigured, closed transport
    pub fn new() -> Self {
        Self {
            port: None,
            config: None,
            last_error: String::new(),
        }
    }

    /// Create a closed transport with a stored configuration
    pub fn with_config(config: SerialConfig) -> Self {
        let mut transport = Self::new();
        transport.config = Some(config);
        transport
    }

    /// Store `config` and open with it
    pub fn open_with(&mut self, config: SerialConfig) -> Result<(), TransportError> {
        self.config = Some(config);
        self.open()
    }

    /// Get the stored configuration
    pub fn config(&self) -> Option<&SerialConfig> {
        self.config.as_ref()
    }

    fn open_port(&mut self) -> Result<(), TransportError> {
        let config = self.config.clone().ok_or(TransportError::NotConfigured)?;

        if self.is_open() {
            debug!("Reopening {}", config.device);
            self.close();
        }

        config.validate()?;
        if config.vmin > 0 {
            debug!("vmin={} is not applied, reads return as soon as any byte arrives", config.vmin);
        }

        let port = serialport::new(&config.device, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout())
            .open()
            .map_err(|source| TransportError::Open {
                device: config.device.clone(),
                source,
            })?;

        // Stale bytes from before the open would only cost a resync
        port.clear(ClearBuffer::Input)
            .map_err(|source| TransportError::Open {
                device: config.device.clone(),
                source,
            })?;

        info!(
            "Opened {} at {} baud (timeout {:?})",
            config.device,
            config.baud_rate,
            config.read_timeout()
        );
        self.port = Some(port);
        Ok(())
    }

    fn record<T>(&mut self, result: Result<T, TransportError>) -> Result<T, TransportError> {
        if let Err(err) = &result {
            self.last_error = err.to_string();
        }
        result
    }
}

impl Default for SerialTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        let result = self.open_port();
        if let Err(err) = &result {
            warn!("Serial open failed: {}", err);
        }
        self.record(result)
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!(
                "Closed {}",
                self.config.as_ref().map_or("serial port", |c| c.device.as_str())
            );
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let result = match self.port.as_mut() {
            None => Err(TransportError::NotOpen("Read")),
            Some(port) => match port.read(buf) {
                Ok(n) => Ok(n),
                Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(0),
                Err(source) => Err(TransportError::Io { op: "read", source }),
            },
        };
        self.record(result)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        let result = match self.port.as_mut() {
            None => Err(TransportError::NotOpen("Write")),
            Some(port) => port
                .write(buf)
                .map_err(|source| TransportError::Io { op: "write", source }),
        };
        self.record(result)
    }

    fn last_error(&self) -> &str {
        &self.last_error
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}
