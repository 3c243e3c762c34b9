//! Ring Buffer Error Types

use thiserror::Error;

/// Errors raised by [`ByteRingBuffer`](crate::ByteRingBuffer)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingBufferError {
    /// Buffer constructed with zero capacity
    #[error("Ring buffer capacity must be greater than zero")]
    ZeroCapacity,

    /// Logical index past the buffered bytes
    #[error("Ring buffer index {index} out of range (size {size})")]
    OutOfRange { index: usize, size: usize },
}
