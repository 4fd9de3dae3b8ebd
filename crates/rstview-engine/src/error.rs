//! Engine error types.

use crate::reporter::Level;

/// Error returned when publishing a document fails.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An option value has the wrong type or is out of range.
    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting {
        /// Option name.
        key: String,
        /// What is wrong with the value.
        reason: String,
    },
    /// A diagnostic reached the configured `halt_level`.
    #[error("Parsing halted at {level} (line {}): {message}", line_label(*.line))]
    Halted {
        /// Level of the halting diagnostic.
        level: Level,
        /// Diagnostic message.
        message: String,
        /// Source line, when known.
        line: Option<usize>,
    },
    /// Parsing halted with `enable_exit` set; the host should exit.
    #[error("Parsing halted, exit requested with status {status}")]
    Exit {
        /// Requested process exit status.
        status: i32,
    },
    /// An extension (directive or role) failed for reasons unrelated to the
    /// markup itself.
    #[error("Internal extension error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Whether this error is an extension fault rather than a content or
    /// configuration failure.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

fn line_label(line: Option<usize>) -> String {
    line.map_or_else(|| "?".to_owned(), |n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halted_display() {
        let err = EngineError::Halted {
            level: Level::Severe,
            message: "Unexpected section title.".to_owned(),
            line: Some(4),
        };
        assert_eq!(
            err.to_string(),
            "Parsing halted at SEVERE/4 (line 4): Unexpected section title."
        );
    }

    #[test]
    fn test_is_internal() {
        assert!(EngineError::Internal("boom".to_owned()).is_internal());
        assert!(!EngineError::Exit { status: 1 }.is_internal());
    }
}
