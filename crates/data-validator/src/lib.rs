//! Load Cell Status Validation
//!
//! Range checks rejecting decoded frames whose status fields are
//! structurally valid but semantically impossible.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{SanityConfig, SanityValidator, ValidationResult};
