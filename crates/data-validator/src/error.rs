//! Validation Error Types

use thiserror::Error;

/// Errors during status validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value above the allowed maximum
    #[error("{field} value {value} is out of range [0, {max}]")]
    OutOfRange {
        field: &'static str,
        value: u8,
        max: u8,
    },
}
