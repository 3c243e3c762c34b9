//! Throttled Frame Diagnostics
//!
//! Hex dumps of received frames, rate limited so that a burst of bad frames
//! produces one line per interval plus a count of what was suppressed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Default minimum spacing between two dumps
pub const DEFAULT_DUMP_INTERVAL_MS: u64 = 1000;

/// Monotonic millisecond time source
pub trait Clock: Send {
    fn now_ms(&self) -> u64;
}

/// Clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Manually advanced clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Why a frame is being dumped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpTag {
    Ok,
    SanityFail,
    FrameInvalid,
}

impl DumpTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DumpTag::Ok => "ok",
            DumpTag::SanityFail => "sanity_fail",
            DumpTag::FrameInvalid => "frame_invalid",
        }
    }
}

impl fmt::Display for DumpTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an emitted dump contained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRecord {
    /// Frame length in bytes
    pub len: usize,
    /// Upper-case hex of the frame
    pub hex: String,
    pub tag: DumpTag,
    /// Dumps suppressed since the previous emission
    pub suppressed: u64,
}

/// Rate-limited hex dumper
pub struct DiagnosticDumper {
    clock: Box<dyn Clock>,
    interval_ms: u64,
    /// Time of the last emission, `None` until the first
    last_emit_ms: Option<u64>,
    suppressed: u64,
}

impl DiagnosticDumper {
    /// Create a dumper emitting at most once per `interval_ms`
    pub fn new(interval_ms: u64, clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            interval_ms,
            last_emit_ms: None,
            suppressed: 0,
        }
    }

    /// Dump `frame` unless another dump was emitted within the interval.
    ///
    /// Returns the emitted record, or `None` when the dump was suppressed.
    pub fn dump(&mut self, frame: &[u8], tag: DumpTag) -> Option<DumpRecord> {
        let now = self.clock.now_ms();
        if let Some(last) = self.last_emit_ms {
            if now.saturating_sub(last) < self.interval_ms {
                self.suppressed += 1;
                return None;
            }
        }

        let record = DumpRecord {
            len: frame.len(),
            hex: hex::encode_upper(frame),
            tag,
            suppressed: self.suppressed,
        };
        emit(&record);

        self.last_emit_ms = Some(now);
        self.suppressed = 0;
        Some(record)
    }

    /// Dumps suppressed since the last emission
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

impl fmt::Debug for DiagnosticDumper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticDumper")
            .field("interval_ms", &self.interval_ms)
            .field("last_emit_ms", &self.last_emit_ms)
            .field("suppressed", &self.suppressed)
            .finish()
    }
}

fn emit(record: &DumpRecord) {
    let suppressed = if record.suppressed > 0 {
        format!(" (suppressed {})", record.suppressed)
    } else {
        String::new()
    };

    match record.tag {
        DumpTag::Ok => info!(
            "Frame dump [{}] len={} hex={}{}",
            record.tag, record.len, record.hex, suppressed
        ),
        DumpTag::SanityFail | DumpTag::FrameInvalid => warn!(
            "Frame dump [{}] len={} hex={}{}",
            record.tag, record.len, record.hex, suppressed
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dumper(clock: &ManualClock) -> DiagnosticDumper {
        DiagnosticDumper::new(DEFAULT_DUMP_INTERVAL_MS, Box::new(clock.clone()))
    }

    #[test]
    fn test_first_dump_emits() {
        let clock = ManualClock::new(0);
        let mut dumper = dumper(&clock);

        let record = dumper.dump(&[0x55, 0xAB, 0x01], DumpTag::SanityFail).unwrap();
        assert_eq!(record.len, 3);
        assert_eq!(record.hex, "55AB01");
        assert_eq!(record.tag, DumpTag::SanityFail);
        assert_eq!(record.suppressed, 0);
    }

    #[test]
    fn test_suppressed_within_window() {
        let clock = ManualClock::new(5_000);
        let mut dumper = dumper(&clock);

        assert!(dumper.dump(&[1], DumpTag::Ok).is_some());
        clock.advance(10);
        assert!(dumper.dump(&[2], DumpTag::Ok).is_none());
        clock.advance(989);
        assert!(dumper.dump(&[3], DumpTag::SanityFail).is_none());
        assert_eq!(dumper.suppressed(), 2);

        clock.advance(1);
        let record = dumper.dump(&[4], DumpTag::SanityFail).unwrap();
        assert_eq!(record.suppressed, 2);
        assert_eq!(record.hex, "04");
        assert_eq!(dumper.suppressed(), 0);
    }

    #[test]
    fn test_window_restarts_after_emission() {
        let clock = ManualClock::new(0);
        let mut dumper = dumper(&clock);

        dumper.dump(&[1], DumpTag::Ok);
        clock.set(1_500);
        assert!(dumper.dump(&[2], DumpTag::Ok).is_some());
        clock.set(2_400);
        assert!(dumper.dump(&[3], DumpTag::Ok).is_none());
        clock.set(2_500);
        assert_eq!(dumper.dump(&[4], DumpTag::Ok).unwrap().suppressed, 1);
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(DumpTag::Ok.to_string(), "ok");
        assert_eq!(DumpTag::SanityFail.to_string(), "sanity_fail");
    }
}
