//! Replay Transport
//!
//! Feeds a recorded byte capture to the driver in fixed-size chunks, as if
//! it were arriving over the serial line. Used for offline diagnosis of
//! captured sessions and in tests (no hardware required).

use crate::transport::{Transport, TransportError};
use std::path::Path;
use tracing::info;

/// Transport replaying recorded bytes
#[derive(Debug, Clone)]
pub struct ReplayTransport {
    data: Vec<u8>,
    position: usize,
    chunk_size: usize,
    open: bool,
    write_limit: Option<usize>,
    written: Vec<Vec<u8>>,
    last_error: String,
}

impl ReplayTransport {
    /// Replay `data`, returning at most `chunk_size` bytes per read
    pub fn new(data: Vec<u8>, chunk_size: usize) -> Self {
        Self {
            data,
            position: 0,
            chunk_size: chunk_size.max(1),
            open: false,
            write_limit: None,
            written: Vec::new(),
            last_error: String::new(),
        }
    }

    /// Replay a capture file
    pub fn from_file(path: impl AsRef<Path>, chunk_size: usize) -> std::io::Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        info!(
            "Loaded {} bytes of capture from {}",
            data.len(),
            path.as_ref().display()
        );
        Ok(Self::new(data, chunk_size))
    }

    /// Accept at most `limit` bytes per write, simulating a congested line
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Bytes not yet handed out
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Every buffer accepted by `write`, in order
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    fn record<T>(&mut self, result: Result<T, TransportError>) -> Result<T, TransportError> {
        if let Err(err) = &result {
            self.last_error = err.to_string();
        }
        result
    }
}

impl Transport for ReplayTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let result = if !self.open {
            Err(TransportError::NotOpen("Read"))
        } else if self.remaining() == 0 {
            Err(TransportError::EndOfStream)
        } else {
            let n = self.chunk_size.min(buf.len()).min(self.remaining());
            buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
            self.position += n;
            Ok(n)
        };
        self.record(result)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        if !self.open {
            return self.record(Err(TransportError::NotOpen("Write")));
        }
        let n = self.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        self.written.push(buf[..n].to_vec());
        Ok(n)
    }

    fn last_error(&self) -> &str {
        &self.last_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunked_reads_until_end() {
        let mut transport = ReplayTransport::new(vec![1, 2, 3, 4, 5], 2);
        transport.open().unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(transport.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[1, 2]);
        assert_eq!(transport.read(&mut buf).unwrap(), 2);
        assert_eq!(transport.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 5);
        assert!(matches!(
            transport.read(&mut buf),
            Err(TransportError::EndOfStream)
        ));
        assert_eq!(transport.last_error(), "end of stream");
    }

    #[test]
    fn test_read_respects_buffer_len() {
        let mut transport = ReplayTransport::new(vec![7; 10], 8);
        transport.open().unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(transport.read(&mut buf).unwrap(), 3);
        assert_eq!(transport.remaining(), 7);
    }

    #[test]
    fn test_closed_transport_rejects_io() {
        let mut transport = ReplayTransport::new(vec![1], 1);
        let mut buf = [0u8; 1];
        assert!(matches!(
            transport.read(&mut buf),
            Err(TransportError::NotOpen("Read"))
        ));
        assert!(transport.write(&[1]).is_err());
    }

    #[test]
    fn test_write_limit() {
        let mut transport = ReplayTransport::new(Vec::new(), 1).with_write_limit(2);
        transport.open().unwrap();
        assert_eq!(transport.write(&[1, 2, 3, 4]).unwrap(), 2);
        assert_eq!(transport.written(), [vec![1u8, 2]].as_slice());
    }
}
