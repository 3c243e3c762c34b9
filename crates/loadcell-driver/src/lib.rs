//! Load Cell Driver
//!
//! Reassembles the serial byte stream coming from a dual-channel load cell
//! into frames, decodes and range-checks them, and exposes one blocking
//! receive call per transport read.
//!
//! ```text
//! transport -> ByteRingBuffer -> header sync -> frame extraction
//!           -> SanityValidator -> DiagnosticDumper -> Recv
//! ```

mod diagnostics;
mod driver;
mod error;
mod extractor;
mod replay;
mod serial;
mod sync;
mod transport;

pub use diagnostics::{
    Clock, DiagnosticDumper, DumpRecord, DumpTag, ManualClock, MonotonicClock,
    DEFAULT_DUMP_INTERVAL_MS,
};
pub use driver::{DriverConfig, DriverStats, LoadCellDriver};
pub use error::DriverError;
pub use extractor::{ExtractStats, FrameExtractor, FrameFault, Recv};
pub use replay::ReplayTransport;
pub use serial::{SerialConfig, SerialTransport, SUPPORTED_BAUD_RATES};
pub use sync::{find_magic, sync_to_header, SyncOutcome};
pub use transport::{Transport, TransportError};

pub use loadcell_protocol::{FramePolicy, LoadCellStatus, RawFrame, ResultCode};
