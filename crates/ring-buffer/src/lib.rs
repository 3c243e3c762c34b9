//! Byte Ring Buffer
//!
//! Provides a fixed-capacity circular byte store used to accumulate a serial
//! receive stream until complete frames can be extracted from it.

mod buffer;
mod error;

pub use buffer::{ByteRingBuffer, DEFAULT_CAPACITY};
pub use error::RingBufferError;
