//! Error types and handling for formatting and auditing operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for javafmt operations
#[derive(Debug, Error)]
pub enum JavafmtError {
    /// Malformed naming-convention specifier (unbalanced class or quantifier syntax)
    #[error("invalid naming pattern '{pattern}': {message}")]
    PatternSyntax { pattern: String, message: String },

    /// An identifier cannot be conformed to a pattern by case folding alone
    #[error("cannot conform '{input}' by case folding: {reason}")]
    ImpossiblePattern { input: String, reason: String },

    /// Source the parser could not interpret
    #[error("parse error: {message} at line {line}, column {column}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    /// Configuration loading or validation errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// File system I/O errors
    #[error("io error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Formatting pass errors
    #[error("formatter error: {message}")]
    Format { message: String },

    /// Generic internal errors
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PatternSyntax,
    ImpossiblePattern,
    Parse,
    Config,
    Io,
    Format,
    Internal,
}

impl JavafmtError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            JavafmtError::PatternSyntax { .. } => ErrorKind::PatternSyntax,
            JavafmtError::ImpossiblePattern { .. } => ErrorKind::ImpossiblePattern,
            JavafmtError::Parse { .. } => ErrorKind::Parse,
            JavafmtError::Config { .. } => ErrorKind::Config,
            JavafmtError::Io { .. } => ErrorKind::Io,
            JavafmtError::Format { .. } => ErrorKind::Format,
            JavafmtError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (processing can continue with other
    /// declarations or files)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse | ErrorKind::ImpossiblePattern)
    }

    /// Create a pattern syntax error
    pub fn pattern_syntax(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PatternSyntax {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an impossible-pattern error
    pub fn impossible_pattern(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ImpossiblePattern {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a formatter error
    pub fn format_error(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for JavafmtError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}
