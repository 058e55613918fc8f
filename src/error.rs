//! Error types for stream sessions and frame decoding.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context for debugging and recovery guidance.
//!
//! ## Error Categories
//!
//! - **Lifecycle Errors**: Operations invoked on a session in the wrong state
//! - **Connection Errors**: Backend unreachable or configuration rejected at open
//! - **Bounds Errors**: A declared frame shape exceeds the payload length
//! - **Release Errors**: Field access on a packet that was already released
//! - **Config Errors**: Configuration documents that cannot be read or parsed
//!
//! `Status::Wait` and `Status::Discarded` are not errors. They are normal
//! retrieval outcomes the caller branches on.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use hlstream::StreamError;
//!
//! let error = StreamError::connection_failed("192.168.1.7", 3810, "connection refused");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stream operations.
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Main error type for stream operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StreamError {
    #[error("Cannot {operation} while session is {state}")]
    Lifecycle { operation: &'static str, state: &'static str },

    #[error("Failed to open stream {host}:{port}: {reason}")]
    Connection {
        host: String,
        port: u16,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Out of bounds while decoding {context}: need {required} bytes, have {available}")]
    OutOfBounds { context: &'static str, required: usize, available: usize },

    #[error("Packet {frame_stamp} was already released")]
    UseAfterRelease { frame_stamp: i64 },

    #[error("Invalid configuration: {details}")]
    Config { details: String },

    #[error("Configuration file error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Backend {operation} failed: {details}")]
    Backend { operation: &'static str, details: String },
}

impl StreamError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Connection { .. } => true,
            StreamError::Backend { .. } => true,
            StreamError::Lifecycle { .. } => false,
            StreamError::OutOfBounds { .. } => false,
            StreamError::UseAfterRelease { .. } => false,
            StreamError::Config { .. } => false,
            StreamError::Io { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            StreamError::Lifecycle { .. } => vec![
                "Call open() before retrieving packets",
                "Avoid using a session after close()",
            ],
            StreamError::Connection { .. } => vec![
                "Check the headset address and that the streaming service is running",
                "Verify the port matches the configuration's stream type",
                "Check the configuration values are supported by the device",
            ],
            StreamError::OutOfBounds { .. } => vec![
                "Verify the configured decoded format matches the stream",
                "Check that the payload was delivered already decoded",
            ],
            StreamError::UseAfterRelease { .. } => vec![
                "Copy frame data out before releasing the packet",
                "Release packets only once the caller is done with them",
            ],
            StreamError::Config { .. } => vec![
                "Check the configuration document against the expected fields",
                "Use StreamConfig::for_port to start from device defaults",
            ],
            StreamError::Io { .. } => {
                vec!["Check file exists and is readable", "Check file permissions"]
            }
            StreamError::Backend { .. } => vec![
                "Retry the operation",
                "Reopen the session if the backend keeps failing",
            ],
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(
        host: impl Into<String>,
        port: u16,
        reason: impl Into<String>,
    ) -> Self {
        StreamError::Connection { host: host.into(), port, reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        host: impl Into<String>,
        port: u16,
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        StreamError::Connection {
            host: host.into(),
            port,
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// Helper constructor for decode bounds failures.
    pub fn out_of_bounds(context: &'static str, required: usize, available: usize) -> Self {
        StreamError::OutOfBounds { context, required, available }
    }

    /// Helper constructor for lifecycle violations.
    pub fn lifecycle(operation: &'static str, state: &'static str) -> Self {
        StreamError::Lifecycle { operation, state }
    }

    /// Helper constructor for backend failures.
    pub fn backend(operation: &'static str, details: impl Into<String>) -> Self {
        StreamError::Backend { operation, details: details.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        StreamError::Io { path, source }
    }
}

impl From<serde_yaml_ng::Error> for StreamError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        StreamError::Config { details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_format_correctly_with_arbitrary_context(
            host in "[a-z0-9.]+",
            port in any::<u16>(),
            reason in ".*",
            required in 0usize..1_000_000usize,
            available in 0usize..1_000_000usize,
            frame_stamp in any::<i64>()
          ) {
            let connection_msg =
                StreamError::connection_failed(host.clone(), port, reason.clone()).to_string();
            prop_assert!(connection_msg.contains(&host));
            prop_assert!(connection_msg.contains(&port.to_string()));
            prop_assert!(connection_msg.contains(&reason));

            let bounds_msg = StreamError::out_of_bounds("pv", required, available).to_string();
            prop_assert!(bounds_msg.contains(&required.to_string()));
            prop_assert!(bounds_msg.contains(&available.to_string()));

            let release_msg = StreamError::UseAfterRelease { frame_stamp }.to_string();
            prop_assert!(release_msg.contains(&frame_stamp.to_string()));
          }

          #[test]
          fn connection_source_chain_is_preserved(base_message in ".*") {
            let source: Box<dyn std::error::Error + Send + Sync> =
              Box::new(std::io::Error::other(base_message.clone()));
            let error = StreamError::connection_failed_with_source("host", 3800, "refused", source);

            let inner = std::error::Error::source(&error);
            prop_assert!(inner.is_some());
            prop_assert_eq!(inner.map(|e| e.to_string()), Some(base_message));
          }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<StreamError>();

        let error = StreamError::lifecycle("get_by_index", "closed");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_methods_work() {
        let connection_error = StreamError::connection_failed("host", 3810, "refused");
        let bounds_error = StreamError::out_of_bounds("rm_vlc", 307220, 307219);
        let lifecycle_error = StreamError::lifecycle("get_by_index", "closed");

        assert!(connection_error.is_retryable());
        assert!(!bounds_error.is_retryable());
        assert!(!lifecycle_error.is_retryable());

        for error in [&connection_error, &bounds_error, &lifecycle_error] {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn yaml_errors_convert_to_config() {
        let err = serde_yaml_ng::from_str::<u32>("not a number").unwrap_err();
        let converted: StreamError = err.into();
        assert!(matches!(converted, StreamError::Config { .. }));
    }
}
