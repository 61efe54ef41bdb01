//! Error handling types for tsclassify
//!
//! This module provides the error type shared by the backend transport,
//! the semantic token pipeline and the LSP surface.

use std::sync::PoisonError;
use thiserror::Error;

/// Comprehensive error type for classification operations
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The backend process could not be started
    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend answered with `success: false`
    #[error("Backend request {command} failed: {message}")]
    Backend { command: String, message: String },

    /// The backend answered successfully but without the expected body
    #[error("Backend response to {command} has no body")]
    MissingBody { command: String },

    /// The caller's cancellation signal fired
    #[error("Request cancelled")]
    Cancelled,

    /// No response arrived within the configured timeout
    #[error("Backend request {command} timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    /// The backend's output stream ended while requests were pending
    #[error("Backend connection closed")]
    ConnectionClosed,

    /// Malformed framing or an unexpected message shape
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// A token was pushed before a token that precedes it
    #[error(
        "Semantic token at {line}:{start_char} is out of order (previous token at {previous_line}:{previous_start_char})"
    )]
    OutOfOrderToken {
        line: u32,
        start_char: u32,
        previous_line: u32,
        previous_start_char: u32,
    },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for classification operations
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Helper trait to recover from poisoned std locks
pub trait LockResultExt<T> {
    /// Recover the guard from a poisoned lock, logging which operation hit it.
    fn recover_poison(self, context: &str) -> T;
}

impl<T> LockResultExt<T> for Result<T, PoisonError<T>> {
    fn recover_poison(self, context: &str) -> T {
        self.unwrap_or_else(|poisoned| {
            log::warn!(
                target: "tsclassify::lock_recovery",
                "Recovered from poisoned lock in {}",
                context
            );
            poisoned.into_inner()
        })
    }
}

/// Helper functions for common error patterns
impl ClassifyError {
    /// Create a backend failure error
    pub fn backend(command: impl Into<String>, message: impl Into<String>) -> Self {
        ClassifyError::Backend {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a missing body error
    pub fn missing_body(command: impl Into<String>) -> Self {
        ClassifyError::MissingBody {
            command: command.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        ClassifyError::Protocol {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ClassifyError::Config {
            message: message.into(),
        }
    }

    /// Whether this error represents the caller giving up rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClassifyError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn backend_error_mentions_command_and_message() {
        let error = ClassifyError::backend("encodedSemanticClassifications-full", "No Project.");
        let text = error.to_string();
        assert!(text.contains("encodedSemanticClassifications-full"));
        assert!(text.contains("No Project."));
    }

    #[test]
    fn only_cancelled_reports_cancellation() {
        assert!(ClassifyError::Cancelled.is_cancelled());
        assert!(!ClassifyError::ConnectionClosed.is_cancelled());
        assert!(!ClassifyError::missing_body("status").is_cancelled());
    }

    #[test]
    fn recover_poison_returns_inner_guard() {
        let lock = Arc::new(Mutex::new(7));
        let poisoner = Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(lock.is_poisoned());
        let guard = lock.lock().recover_poison("test");
        assert_eq!(*guard, 7);
    }
}
