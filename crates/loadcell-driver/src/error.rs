//! Driver Error Types

use crate::transport::TransportError;
use loadcell_protocol::{ProtocolError, ResultCode};
use ring_buffer::RingBufferError;
use thiserror::Error;

/// Errors that can occur while driving the load cell
#[derive(Debug, Error)]
pub enum DriverError {
    /// Transport read failed
    #[error("Read failed: {0}")]
    Read(#[source] TransportError),

    /// Transport write failed
    #[error("Write failed: {0}")]
    Write(#[source] TransportError),

    /// Transport accepted fewer bytes than requested
    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Transport could not be opened
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Ring buffer could not be created
    #[error("Ring buffer error: {0}")]
    Buffer(#[from] RingBufferError),

    /// Frame policy rejected
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Driver settings are inconsistent
    #[error("Invalid driver config: {0}")]
    InvalidConfig(String),
}

impl DriverError {
    /// Result code for I/O and protocol failures
    pub fn code(&self) -> Option<ResultCode> {
        match self {
            DriverError::Read(_) => Some(ResultCode::IoReadFail),
            DriverError::Write(_) | DriverError::ShortWrite { .. } => Some(ResultCode::IoWriteFail),
            DriverError::Protocol(err) => Some(err.code()),
            _ => None,
        }
    }

    /// Check if the transport ran out of recorded input
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, DriverError::Read(TransportError::EndOfStream))
    }
}
