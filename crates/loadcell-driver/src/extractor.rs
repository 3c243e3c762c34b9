//! Frame Extraction
//!
//! One extraction pass over the ring buffer: sync to the header, work out
//! the frame length, wait for the whole frame, consume it, decode it and
//! range-check it.

use crate::diagnostics::{DiagnosticDumper, DumpTag};
use crate::sync::{sync_to_header, SyncOutcome};
use data_validator::SanityValidator;
use loadcell_protocol::wire::LENGTH_OFFSET;
use loadcell_protocol::{FramePolicy, LoadCellStatus, RawFrame, ResultCode};
use ring_buffer::ByteRingBuffer;
use std::fmt;
use tracing::{debug, warn};

/// A consumed frame that did not yield a usable status
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFault {
    /// `SanityFail` or `FrameInvalid`
    pub code: ResultCode,
    /// The frame as received
    pub frame: RawFrame,
    /// Decoded fields, when decoding got that far
    pub status: Option<LoadCellStatus>,
    pub message: String,
}

impl fmt::Display for FrameFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.code, self.message)
    }
}

impl std::error::Error for FrameFault {}

/// Outcome of one extraction pass
#[derive(Debug, Clone, PartialEq)]
pub enum Recv {
    /// A frame was decoded and passed the sanity check
    Status(LoadCellStatus),
    /// No complete frame is buffered yet
    NoFrame,
    /// A frame was consumed but rejected
    Fault(FrameFault),
}

impl Recv {
    pub fn code(&self) -> ResultCode {
        match self {
            Recv::Status(_) => ResultCode::Ok,
            Recv::NoFrame => ResultCode::NoFrame,
            Recv::Fault(fault) => fault.code,
        }
    }

    /// Decoded status on success
    pub fn status(&self) -> Option<&LoadCellStatus> {
        match self {
            Recv::Status(status) => Some(status),
            _ => None,
        }
    }

    /// Turn a fault into an error for callers treating it as fatal
    pub fn into_result(self) -> Result<Option<LoadCellStatus>, FrameFault> {
        match self {
            Recv::Status(status) => Ok(Some(status)),
            Recv::NoFrame => Ok(None),
            Recv::Fault(fault) => Err(fault),
        }
    }
}

/// Extraction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Frames decoded and accepted
    pub frames_decoded: u64,
    /// Frames consumed but rejected
    pub faults: u64,
    /// Bytes dropped while searching for a header
    pub bytes_discarded: u64,
}

/// Pulls frames out of a [`ByteRingBuffer`]
#[derive(Debug)]
pub struct FrameExtractor {
    policy: FramePolicy,
    validator: SanityValidator,
    dumper: DiagnosticDumper,
    dump_ok_frames: bool,
    stats: ExtractStats,
}

impl FrameExtractor {
    pub fn new(
        policy: FramePolicy,
        validator: SanityValidator,
        dumper: DiagnosticDumper,
        dump_ok_frames: bool,
    ) -> Self {
        Self {
            policy,
            validator,
            dumper,
            dump_ok_frames,
            stats: ExtractStats::default(),
        }
    }

    /// Extract at most one frame from `ring`.
    ///
    /// Incomplete frames stay buffered for the next pass. A complete frame is
    /// always consumed, even when it is then rejected.
    pub fn extract(&mut self, ring: &mut ByteRingBuffer) -> Recv {
        match sync_to_header(ring) {
            SyncOutcome::NeedMore => return Recv::NoFrame,
            SyncOutcome::Discarded { dropped } => {
                self.stats.bytes_discarded += dropped as u64;
                debug!("No header in buffer, discarded {} bytes", dropped);
                return Recv::NoFrame;
            }
            SyncOutcome::Synced { skipped } if skipped > 0 => {
                self.stats.bytes_discarded += skipped as u64;
                debug!("Skipped {} bytes before header", skipped);
            }
            SyncOutcome::Synced { .. } => {}
        }

        if ring.len() < self.policy.header_len() {
            return Recv::NoFrame;
        }

        let length_byte = ring.get(LENGTH_OFFSET).unwrap_or_default();
        let total = self.policy.frame_len(length_byte);
        if ring.len() < total {
            return Recv::NoFrame;
        }

        let mut bytes = Vec::with_capacity(total);
        ring.copy_front(total, &mut bytes);
        ring.drop_front(total);

        self.decode(RawFrame::new(bytes))
    }

    fn decode(&mut self, frame: RawFrame) -> Recv {
        let status = match frame.decode() {
            Ok(status) => status,
            Err(err) => {
                self.stats.faults += 1;
                self.dumper.dump(frame.as_bytes(), DumpTag::FrameInvalid);
                return Recv::Fault(FrameFault {
                    code: ResultCode::FrameInvalid,
                    frame,
                    status: None,
                    message: err.to_string(),
                });
            }
        };

        let result = self.validator.validate(&status);
        if result.valid {
            if self.dump_ok_frames {
                self.dumper.dump(frame.as_bytes(), DumpTag::Ok);
            }
            self.stats.frames_decoded += 1;
            return Recv::Status(status);
        }

        self.stats.faults += 1;
        self.dumper.dump(frame.as_bytes(), DumpTag::SanityFail);
        let message = result.message();
        warn!("Sanity check failed: {}", message);
        Recv::Fault(FrameFault {
            code: ResultCode::SanityFail,
            frame,
            status: Some(status),
            message,
        })
    }

    pub fn stats(&self) -> ExtractStats {
        self.stats
    }

    pub fn policy(&self) -> FramePolicy {
        self.policy
    }

    pub fn dumper(&self) -> &DiagnosticDumper {
        &self.dumper
    }
}
