//! Load Cell Protocol Implementation
//!
//! This crate describes the wire format spoken by the dual-channel RS-485
//! weighing sensor: the 3-byte magic header, the length byte, the fixed-offset
//! weight and status fields, and the closed set of result codes surfaced to
//! callers. It performs no I/O.

mod code;
mod error;
mod frame;
mod policy;

pub use code::ResultCode;
pub use error::ProtocolError;
pub use frame::{read_i32_be, FrameBuilder, LoadCellStatus, RawFrame};
pub use policy::FramePolicy;

/// Wire format constants
pub mod wire {
    /// Frame start marker
    pub const MAGIC: [u8; 3] = [0x55, 0xAB, 0x01];
    /// Magic followed by the length byte
    pub const HEADER_LEN: usize = 4;
    /// Offset of the length byte (total frame bytes = length + 4)
    pub const LENGTH_OFFSET: usize = 3;
    /// Smallest frame carrying every status field, also the fallback length
    pub const MIN_FRAME_LEN: usize = 25;
    /// Default upper bound for length-prefixed frames
    pub const DEFAULT_MAX_FRAME_LEN: usize = 64;
    /// Largest total a single length byte can describe
    pub const MAX_ENCODABLE_FRAME_LEN: usize = HEADER_LEN + u8::MAX as usize;
    /// Request/response poll command
    pub const POLL_COMMAND: [u8; 4] = [0x55, 0xAB, 0x01, 0x00];

    /// Gross weight, i32 big-endian
    pub const OFFSET_GROSS: usize = 4;
    /// Right channel weight, i32 big-endian
    pub const OFFSET_RIGHT: usize = 8;
    /// Left channel weight, i32 big-endian
    pub const OFFSET_LEFT: usize = 12;

    pub const OFFSET_RIGHT_BATTERY: usize = 16;
    pub const OFFSET_RIGHT_CHARGE: usize = 17;
    pub const OFFSET_RIGHT_ONLINE: usize = 18;
    pub const OFFSET_LEFT_BATTERY: usize = 19;
    pub const OFFSET_LEFT_CHARGE: usize = 20;
    pub const OFFSET_LEFT_ONLINE: usize = 21;
    pub const OFFSET_GROSS_NET: usize = 22;
    pub const OFFSET_OVERLOAD: usize = 23;
    pub const OFFSET_TOLERANCE: usize = 24;
}
