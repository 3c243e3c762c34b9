//! Fixed-Capacity Byte Ring Buffer Implementation

use crate::error::RingBufferError;

/// Default buffer capacity (2 KiB, several hundred frames at 25-64 bytes)
pub const DEFAULT_CAPACITY: usize = 2048;

/// Fixed-capacity circular byte store with FIFO semantics.
///
/// Logical index `i` (0 = oldest byte) maps to the physical slot
/// `(head + i) % capacity`. When a push does not fit, the oldest bytes are
/// evicted so the buffer always holds the most recently pushed data.
#[derive(Debug)]
pub struct ByteRingBuffer {
    /// Pre-allocated storage
    storage: Box<[u8]>,
    /// Physical slot of the oldest byte
    head: usize,
    /// Number of buffered bytes
    size: usize,
    /// Total bytes accepted by `push` (for statistics)
    total_pushed: u64,
    /// Total bytes lost to overflow (for statistics)
    total_evicted: u64,
}

impl ByteRingBuffer {
    /// Create a new ring buffer with given capacity in bytes
    pub fn new(capacity: usize) -> Result<Self, RingBufferError> {
        if capacity == 0 {
            return Err(RingBufferError::ZeroCapacity);
        }
        Ok(Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            size: 0,
            total_pushed: 0,
            total_evicted: 0,
        })
    }

    /// Create a buffer with default capacity (2048 bytes)
    pub fn with_default_capacity() -> Self {
        Self {
            storage: vec![0u8; DEFAULT_CAPACITY].into_boxed_slice(),
            head: 0,
            size: 0,
            total_pushed: 0,
            total_evicted: 0,
        }
    }

    /// Append bytes, evicting the oldest data if there is not enough room.
    ///
    /// A slice at least as long as the capacity replaces the whole content
    /// with its trailing `capacity` bytes.
    pub fn push(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        let capacity = self.capacity();
        self.total_pushed += data.len() as u64;

        let mut data = data;
        if data.len() >= capacity {
            let skipped = data.len() - capacity;
            self.total_evicted += (skipped + self.size) as u64;
            data = &data[skipped..];
            self.head = 0;
            self.size = 0;
        }

        let free = capacity - self.size;
        if data.len() > free {
            let overflow = data.len() - free;
            self.total_evicted += overflow as u64;
            self.drop_front(overflow);
        }

        let tail = (self.head + self.size) % capacity;
        let first = data.len().min(capacity - tail);
        self.storage[tail..tail + first].copy_from_slice(&data[..first]);

        let remain = data.len() - first;
        if remain > 0 {
            self.storage[..remain].copy_from_slice(&data[first..]);
        }

        self.size += data.len();
    }

    /// Remove the oldest `count` bytes (clamped to the current size)
    pub fn drop_front(&mut self, count: usize) {
        if count >= self.size {
            self.head = 0;
            self.size = 0;
            return;
        }

        self.head = (self.head + count) % self.capacity();
        self.size -= count;
    }

    /// Byte at logical `index` (0 = oldest), or `None` past the end
    pub fn get(&self, index: usize) -> Option<u8> {
        if index >= self.size {
            return None;
        }
        Some(self.storage[(self.head + index) % self.capacity()])
    }

    /// Byte at logical `index` (0 = oldest)
    pub fn at(&self, index: usize) -> Result<u8, RingBufferError> {
        self.get(index).ok_or(RingBufferError::OutOfRange {
            index,
            size: self.size,
        })
    }

    /// Copy up to `count` oldest bytes into `out` without consuming them.
    ///
    /// `out` is resized to the number of bytes copied, which is returned.
    pub fn copy_front(&self, count: usize, out: &mut Vec<u8>) -> usize {
        let count = count.min(self.size);
        out.clear();
        if count == 0 {
            return 0;
        }

        let first = count.min(self.capacity() - self.head);
        out.extend_from_slice(&self.storage[self.head..self.head + first]);

        let remain = count - first;
        if remain > 0 {
            out.extend_from_slice(&self.storage[..remain]);
        }

        count
    }

    /// Get the number of bytes currently buffered
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Get fill ratio (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    /// Get total bytes accepted by `push`
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    /// Get total bytes evicted by overflowing pushes
    pub fn total_evicted(&self) -> u64 {
        self.total_evicted
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.head = 0;
        self.size = 0;
    }
}

impl Default for ByteRingBuffer {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
