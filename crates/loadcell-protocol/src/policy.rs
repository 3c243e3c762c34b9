//! Frame Length Policies

use crate::error::ProtocolError;
use crate::wire::{
    DEFAULT_MAX_FRAME_LEN, HEADER_LEN, MAGIC, MAX_ENCODABLE_FRAME_LEN, MIN_FRAME_LEN,
};
use serde::{Deserialize, Serialize};

/// How the total length of a frame is determined once its header is synced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FramePolicy {
    /// Every frame is exactly `len` bytes; byte 3 is not interpreted
    Fixed { len: usize },
    /// Total is `4 + length byte`, falling back to 25 outside `[25, max_len]`
    LengthPrefixed { max_len: usize },
}

impl FramePolicy {
    /// Legacy fixed 25-byte frames
    pub fn fixed() -> Self {
        FramePolicy::Fixed { len: MIN_FRAME_LEN }
    }

    /// Length-prefixed frames up to 64 bytes
    pub fn length_prefixed() -> Self {
        FramePolicy::LengthPrefixed {
            max_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    /// Check the configured lengths against what the wire can carry
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match *self {
            FramePolicy::Fixed { len } if len < MIN_FRAME_LEN => Err(
                ProtocolError::InvalidPolicy(format!(
                    "fixed frame length {len} is below the minimum of {MIN_FRAME_LEN}"
                )),
            ),
            FramePolicy::LengthPrefixed { max_len }
                if !(MIN_FRAME_LEN..=MAX_ENCODABLE_FRAME_LEN).contains(&max_len) =>
            {
                Err(ProtocolError::InvalidPolicy(format!(
                    "max frame length {max_len} outside [{MIN_FRAME_LEN}, {MAX_ENCODABLE_FRAME_LEN}]"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Bytes that must be buffered from the magic onwards before
    /// [`frame_len`](Self::frame_len) can be evaluated
    pub fn header_len(&self) -> usize {
        match self {
            FramePolicy::Fixed { .. } => MAGIC.len(),
            FramePolicy::LengthPrefixed { .. } => HEADER_LEN,
        }
    }

    /// Total frame bytes for a frame whose length byte is `length_byte`
    pub fn frame_len(&self, length_byte: u8) -> usize {
        match *self {
            FramePolicy::Fixed { len } => len,
            FramePolicy::LengthPrefixed { max_len } => {
                let total = HEADER_LEN + length_byte as usize;
                if (MIN_FRAME_LEN..=max_len).contains(&total) {
                    total
                } else {
                    MIN_FRAME_LEN
                }
            }
        }
    }

    /// Longest frame this policy can produce
    pub fn max_frame_len(&self) -> usize {
        match *self {
            FramePolicy::Fixed { len } => len,
            FramePolicy::LengthPrefixed { max_len } => max_len,
        }
    }
}

impl Default for FramePolicy {
    fn default() -> Self {
        FramePolicy::length_prefixed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_prefixed_in_range() {
        let policy = FramePolicy::length_prefixed();
        assert_eq!(policy.frame_len(21), 25);
        assert_eq!(policy.frame_len(40), 44);
        assert_eq!(policy.frame_len(60), 64);
    }

    #[test]
    fn test_length_prefixed_falls_back_to_min() {
        let policy = FramePolicy::length_prefixed();
        assert_eq!(policy.frame_len(0), 25);
        assert_eq!(policy.frame_len(20), 25);
        assert_eq!(policy.frame_len(61), 25);
        assert_eq!(policy.frame_len(0xFF), 25);
    }

    #[test]
    fn test_fixed_ignores_length_byte() {
        let policy = FramePolicy::fixed();
        assert_eq!(policy.frame_len(0), 25);
        assert_eq!(policy.frame_len(60), 25);
        assert_eq!(policy.header_len(), 3);
        assert_eq!(FramePolicy::default().header_len(), 4);
    }

    #[test]
    fn test_validate() {
        assert!(FramePolicy::fixed().validate().is_ok());
        assert!(FramePolicy::length_prefixed().validate().is_ok());
        assert!(FramePolicy::Fixed { len: 24 }.validate().is_err());
        assert!(FramePolicy::LengthPrefixed { max_len: 24 }.validate().is_err());
        assert!(FramePolicy::LengthPrefixed { max_len: 259 }.validate().is_ok());
        assert!(FramePolicy::LengthPrefixed { max_len: 260 }.validate().is_err());
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&FramePolicy::length_prefixed()).unwrap();
        assert_eq!(json, r#"{"kind":"length_prefixed","max_len":64}"#);

        let policy: FramePolicy = serde_json::from_str(r#"{"kind":"fixed","len":25}"#).unwrap();
        assert_eq!(policy, FramePolicy::fixed());
    }
}
