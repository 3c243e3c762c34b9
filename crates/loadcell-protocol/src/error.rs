//! Protocol Error Types

use crate::code::ResultCode;
use thiserror::Error;

/// Errors raised while decoding frames or validating frame settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Frame shorter than the last status field
    #[error("Frame too short: {len} bytes, need at least {min}")]
    FrameTooShort { len: usize, min: usize },

    /// Frame length policy cannot be honoured
    #[error("Invalid frame policy: {0}")]
    InvalidPolicy(String),

    /// Integer does not name a result code
    #[error("Unknown result code: {0}")]
    UnknownResultCode(i32),
}

impl ProtocolError {
    /// Result code reported to callers for this error
    pub fn code(&self) -> ResultCode {
        match self {
            ProtocolError::FrameTooShort { .. } => ResultCode::FrameTooShort,
            ProtocolError::InvalidPolicy(_) | ProtocolError::UnknownResultCode(_) => {
                ResultCode::FrameInvalid
            }
        }
    }
}
