//! Result Codes Surfaced to Callers

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of outcomes for a receive or send call
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    /// A frame was decoded and passed the sanity check
    Ok = 0,
    /// No complete frame buffered yet
    NoFrame = 1,
    /// A frame was consumed but could not be decoded
    FrameInvalid = 2,
    /// A frame ended before its last status field
    FrameTooShort = 3,
    /// Transport read failed
    IoReadFail = 4,
    /// Transport write failed or was short
    IoWriteFail = 5,
    /// A decoded frame failed the range check
    SanityFail = 6,
}

impl ResultCode {
    /// Numeric code
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            ResultCode::Ok => "Ok",
            ResultCode::NoFrame => "No Frame",
            ResultCode::FrameInvalid => "Frame Invalid",
            ResultCode::FrameTooShort => "Frame Too Short",
            ResultCode::IoReadFail => "IO Read Fail",
            ResultCode::IoWriteFail => "IO Write Fail",
            ResultCode::SanityFail => "Sanity Fail",
        }
    }

    /// Check if this code reports success
    pub fn is_ok(self) -> bool {
        self == ResultCode::Ok
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<i32> for ResultCode {
    type Error = ProtocolError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Ok),
            1 => Ok(Self::NoFrame),
            2 => Ok(Self::FrameInvalid),
            3 => Ok(Self::FrameTooShort),
            4 => Ok(Self::IoReadFail),
            5 => Ok(Self::IoWriteFail),
            6 => Ok(Self::SanityFail),
            other => Err(ProtocolError::UnknownResultCode(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_numbers_are_stable() {
        assert_eq!(ResultCode::Ok.as_i32(), 0);
        assert_eq!(ResultCode::SanityFail.as_i32(), 6);
        assert_eq!(ResultCode::try_from(4).unwrap(), ResultCode::IoReadFail);
        assert_eq!(
            ResultCode::try_from(42),
            Err(ProtocolError::UnknownResultCode(42))
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(ResultCode::FrameTooShort.to_string(), "Frame Too Short");
        assert_eq!(ResultCode::IoReadFail.to_string(), "IO Read Fail");
        assert!(ResultCode::Ok.is_ok());
        assert!(!ResultCode::NoFrame.is_ok());
    }
}
