//! Core types for the DBC code generator library
//!
//! This module defines the error type shared by the parser, the runtime codec
//! and the generator. Parsing is fail-fast: the first malformed description
//! line aborts with an error instead of producing code for a half-read model.

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur while parsing a DBC file or driving the codec
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("Malformed description on line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("Signal '{name}' on line {line} appears before any message definition")]
    OrphanSignal { line: usize, name: String },

    #[error("Invalid signal definition: {0}")]
    InvalidSignalDefinition(String),

    #[error("Value count mismatch for message '{message}': expected {expected}, got {actual}")]
    ValueCountMismatch {
        message: String,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to read DBC file '{path}': {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodegenError::OrphanSignal {
            line: 7,
            name: "SPEED".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Signal 'SPEED' on line 7 appears before any message definition"
        );

        let err = CodegenError::MalformedLine {
            line: 3,
            reason: "expected 5 columns".to_string(),
        };
        assert!(format!("{}", err).contains("line 3"));
    }
}
