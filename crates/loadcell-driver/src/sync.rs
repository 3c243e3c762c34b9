//! Header Synchronization
//!
//! Locates the 3-byte magic in the buffered stream and discards whatever
//! precedes it.

use loadcell_protocol::wire::MAGIC;
use ring_buffer::ByteRingBuffer;

/// Result of one synchronization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Magic now sits at logical offset 0, after skipping `skipped` bytes
    Synced { skipped: usize },
    /// Fewer bytes buffered than the magic is long
    NeedMore,
    /// No magic anywhere; `dropped` garbage bytes were discarded
    Discarded { dropped: usize },
}

/// Logical offset of the first complete magic sequence, if any
pub fn find_magic(ring: &ByteRingBuffer) -> Option<usize> {
    let size = ring.len();
    if size < MAGIC.len() {
        return None;
    }

    (0..=size - MAGIC.len()).find(|&start| {
        MAGIC
            .iter()
            .enumerate()
            .all(|(i, &byte)| ring.get(start + i) == Some(byte))
    })
}

/// Length of the longest proper prefix of the magic that ends the buffer
fn partial_magic_suffix(ring: &ByteRingBuffer) -> usize {
    let size = ring.len();
    (1..MAGIC.len())
        .rev()
        .filter(|&n| n <= size)
        .find(|&n| (0..n).all(|i| ring.get(size - n + i) == Some(MAGIC[i])))
        .unwrap_or(0)
}

/// Bring the buffer into header alignment.
///
/// When no magic is found the whole content is garbage and is dropped,
/// except for a trailing partial magic that the next read may complete.
pub fn sync_to_header(ring: &mut ByteRingBuffer) -> SyncOutcome {
    if ring.len() < MAGIC.len() {
        return SyncOutcome::NeedMore;
    }

    match find_magic(ring) {
        Some(start) => {
            ring.drop_front(start);
            SyncOutcome::Synced { skipped: start }
        }
        None => {
            let dropped = ring.len() - partial_magic_suffix(ring);
            ring.drop_front(dropped);
            SyncOutcome::Discarded { dropped }
        }
    }
}
