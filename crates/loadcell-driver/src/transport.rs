//! Byte Transport Abstraction

use thiserror::Error;

/// Errors raised by a byte transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// `open()` called before any configuration was stored
    #[error("Open(): serial config is not set")]
    NotConfigured,

    /// Operation attempted on a closed transport
    #[error("{0}(): port is not open")]
    NotOpen(&'static str),

    /// Baud rate outside the supported set
    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// Device could not be opened or configured
    #[error("open {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: serialport::Error,
    },

    /// Read or write failed
    #[error("{op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Recorded input has been fully replayed
    #[error("end of stream")]
    EndOfStream,
}

/// Blocking byte transport consumed by the driver.
///
/// A read that times out without data returns `Ok(0)`.
pub trait Transport {
    /// Open using the stored configuration
    fn open(&mut self) -> Result<(), TransportError>;

    /// Release the underlying handle; no-op when already closed
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Read up to `buf.len()` bytes
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write `buf`, returning the number of bytes accepted
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError>;

    /// Message of the most recent failure, empty if none
    fn last_error(&self) -> &str;
}
