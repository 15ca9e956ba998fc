//! Result type alias used throughout the crate

use crate::error::JavafmtError;

/// Standard result type for javafmt operations
pub type Result<T> = std::result::Result<T, JavafmtError>;
