//! Load Cell Frames and Field Decoding
//!
//! A frame is laid out as follows (multi-byte fields big-endian):
//!
//! ```text
//! 0-2   magic 55 AB 01
//! 3     length byte, total = length + 4
//! 4-7   gross weight (i32)
//! 8-11  right weight (i32)
//! 12-15 left weight (i32)
//! 16-18 right battery %, charge status, online status
//! 19-21 left battery %, charge status, online status
//! 22    gross/net mark
//! 23    overload mark
//! 24    out-of-tolerance mark
//! 25..  reserved
//! ```

use crate::error::ProtocolError;
use crate::wire::*;
use serde::{Deserialize, Serialize};

/// Decode a big-endian signed 32-bit integer
pub fn read_i32_be(bytes: [u8; 4]) -> i32 {
    i32::from_be_bytes(bytes)
}

fn i32_at(data: &[u8], offset: usize) -> i32 {
    read_i32_be([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// One complete frame copied out of the receive buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    /// Wrap an owned byte snapshot
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length byte as sent, if the frame reaches offset 3
    pub fn length_byte(&self) -> Option<u8> {
        self.bytes.get(LENGTH_OFFSET).copied()
    }

    /// Upper-case hex rendering for diagnostics
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.bytes)
    }

    /// Decode the status fields carried by this frame
    pub fn decode(&self) -> Result<LoadCellStatus, ProtocolError> {
        LoadCellStatus::decode(&self.bytes)
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Weight and status fields decoded from one frame.
///
/// Weights are raw integer counts from the sensor surfaced as `f64`; no
/// scale or offset is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadCellStatus {
    /// Gross weight (raw counts)
    pub gross_weight: f64,
    /// Right channel weight (raw counts)
    pub right_weight: f64,
    /// Left channel weight (raw counts)
    pub left_weight: f64,

    /// Right battery level (0-100 %)
    pub right_battery_percent: u8,
    /// Right charge status (0-1)
    pub right_charge_status: u8,
    /// Right online status (0-2)
    pub right_online_status: u8,

    /// Left battery level (0-100 %)
    pub left_battery_percent: u8,
    /// Left charge status (0-1)
    pub left_charge_status: u8,
    /// Left online status (0-2)
    pub left_online_status: u8,

    /// Gross/net mark (0-1)
    pub gross_net_mark: u8,
    /// Overload mark (0-1)
    pub overload_mark: u8,
    /// Out-of-tolerance mark (0-2)
    pub out_of_tolerance_mark: u8,
}

impl LoadCellStatus {
    /// Decode the fixed-offset fields of a frame starting at the magic
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        if frame.len() < MIN_FRAME_LEN {
            return Err(ProtocolError::FrameTooShort {
                len: frame.len(),
                min: MIN_FRAME_LEN,
            });
        }

        // Calibration is not known for this sensor, weights stay in counts
        Ok(Self {
            gross_weight: f64::from(i32_at(frame, OFFSET_GROSS)),
            right_weight: f64::from(i32_at(frame, OFFSET_RIGHT)),
            left_weight: f64::from(i32_at(frame, OFFSET_LEFT)),

            right_battery_percent: frame[OFFSET_RIGHT_BATTERY],
            right_charge_status: frame[OFFSET_RIGHT_CHARGE],
            right_online_status: frame[OFFSET_RIGHT_ONLINE],

            left_battery_percent: frame[OFFSET_LEFT_BATTERY],
            left_charge_status: frame[OFFSET_LEFT_CHARGE],
            left_online_status: frame[OFFSET_LEFT_ONLINE],

            gross_net_mark: frame[OFFSET_GROSS_NET],
            overload_mark: frame[OFFSET_OVERLOAD],
            out_of_tolerance_mark: frame[OFFSET_TOLERANCE],
        })
    }
}

/// Builds wire frames, for simulators and tests
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    gross: i32,
    right: i32,
    left: i32,
    status: [u8; 9],
    reserved: Vec<u8>,
    length_byte: Option<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self {
            gross: 0,
            right: 0,
            left: 0,
            status: [0; 9],
            reserved: Vec::new(),
            length_byte: None,
        }
    }

    /// Raw weight counts for gross, right and left channels
    pub fn weights(mut self, gross: i32, right: i32, left: i32) -> Self {
        self.gross = gross;
        self.right = right;
        self.left = left;
        self
    }

    /// Status bytes in wire order (offsets 16-24)
    pub fn status_bytes(mut self, status: [u8; 9]) -> Self {
        self.status = status;
        self
    }

    /// Right battery level
    pub fn right_battery(mut self, percent: u8) -> Self {
        self.status[0] = percent;
        self
    }

    /// Left battery level
    pub fn left_battery(mut self, percent: u8) -> Self {
        self.status[3] = percent;
        self
    }

    /// Trailing reserved bytes after the status block
    pub fn reserved(mut self, reserved: &[u8]) -> Self {
        self.reserved = reserved.to_vec();
        self
    }

    /// Override the length byte instead of deriving it from the frame size
    pub fn length_byte(mut self, length_byte: u8) -> Self {
        self.length_byte = Some(length_byte);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let total = MIN_FRAME_LEN + self.reserved.len();
        let length_byte = self
            .length_byte
            .unwrap_or_else(|| (total - HEADER_LEN).min(u8::MAX as usize) as u8);

        let mut frame = Vec::with_capacity(total);
        frame.extend_from_slice(&MAGIC);
        frame.push(length_byte);
        frame.extend_from_slice(&self.gross.to_be_bytes());
        frame.extend_from_slice(&self.right.to_be_bytes());
        frame.extend_from_slice(&self.left.to_be_bytes());
        frame.extend_from_slice(&self.status);
        frame.extend_from_slice(&self.reserved);
        frame
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}
