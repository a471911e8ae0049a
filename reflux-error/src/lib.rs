// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the Reflux reactive dataflow library
//!
//! This crate defines the root [`RefluxError`] shared by every Reflux crate.
//! Two kinds are distinguished by the observer protocol:
//!
//! - [`RefluxError::Cancelled`] always propagates unchanged and is never
//!   redirected into an observer's `athrow`.
//! - [`RefluxError::ObserverClosed`] is benign for fan-out senders, which treat
//!   it as "observer already gone".
//!
//! # Examples
//!
//! ```
//! use reflux_error::{RefluxError, Result};
//!
//! fn check(value: i32) -> Result<i32> {
//!     if value < 0 {
//!         return Err(RefluxError::stream_error("negative value"));
//!     }
//!     Ok(value)
//! }
//!
//! assert!(check(-1).is_err());
//! ```

use std::sync::Arc;

/// Root error type for all Reflux operations
///
/// Errors travel through a pipeline exactly like values (via `athrow`), so the
/// type is cheap to clone: a hot stream hands the same error to every observer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefluxError {
    /// Cooperative cancellation
    ///
    /// Irreversible. It walks up the call chain unchanged and bypasses the
    /// `athrow` redirect of the observer protocol.
    #[error("Operation cancelled")]
    Cancelled,

    /// `asend`/`athrow` was called on an observer that is closed or closing
    #[error("Observer is closed")]
    ObserverClosed,

    /// A single-subscriber stream was observed by a second, distinct observer
    #[error("Single stream error: {context}")]
    SingleStream {
        /// What the stream was bound to when the registration was refused
        context: String,
    },

    /// The same observer was registered twice on a multi-subscriber stream
    #[error("Multi stream error: {context}")]
    MultiStream {
        /// Details about the rejected registration
        context: String,
    },

    /// A consumer closed before it received a value or an error
    #[error("Consumer closed without a result")]
    ConsumerClosed,

    /// A single-shot source was observed after its items were handed out
    #[error("Source already consumed: {context}")]
    SourceConsumed {
        /// The source that was observed again
        context: String,
    },

    /// A time limit expired
    ///
    /// The core never raises this itself; it flows through unchanged when an
    /// operator or user code wraps a call in a timeout.
    #[error("Timeout error: {context}")]
    Timeout {
        /// Context about the timeout (e.g. duration)
        context: String,
    },

    /// An operator or callback failed with a message
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// Custom error from user code
    ///
    /// This wraps errors produced by user-provided functions and callbacks,
    /// allowing them to be propagated through the Reflux error system.
    #[error("User error: {0}")]
    UserError(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl RefluxError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Create a single stream registration error
    pub fn single_stream(context: impl Into<String>) -> Self {
        Self::SingleStream {
            context: context.into(),
        }
    }

    /// Create a multi stream registration error
    pub fn multi_stream(context: impl Into<String>) -> Self {
        Self::MultiStream {
            context: context.into(),
        }
    }

    /// Create a consumed-source error
    pub fn source_consumed(context: impl Into<String>) -> Self {
        Self::SourceConsumed {
            context: context.into(),
        }
    }

    /// Create a timeout error with the given context
    pub fn timeout(context: impl Into<String>) -> Self {
        Self::Timeout {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Arc::new(error))
    }

    /// Returns `true` for [`RefluxError::Cancelled`]
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` for [`RefluxError::ObserverClosed`]
    #[must_use]
    pub const fn is_observer_closed(&self) -> bool {
        matches!(self, Self::ObserverClosed)
    }
}

/// Specialized Result type for Reflux operations
///
/// # Examples
///
/// ```
/// use reflux_error::Result;
///
/// fn process() -> Result<String> {
///     Ok("processed".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, RefluxError>;

/// Extension trait for converting errors into `RefluxError`
///
/// This trait is automatically implemented for all types that implement
/// `std::error::Error + Send + Sync + 'static`.
pub trait IntoRefluxError {
    /// Convert this error into a `RefluxError` with additional context
    fn into_reflux_error(self, context: &str) -> RefluxError;

    /// Convert this error into a `RefluxError` without additional context
    fn into_reflux(self) -> RefluxError
    where
        Self: Sized,
    {
        self.into_reflux_error("")
    }
}

impl<E: std::error::Error + Send + Sync + 'static> IntoRefluxError for E {
    fn into_reflux_error(self, context: &str) -> RefluxError {
        if context.is_empty() {
            RefluxError::user_error(self)
        } else {
            RefluxError::stream_error(format!("{context}: {self}"))
        }
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(RefluxError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(RefluxError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<RefluxError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| attach(e.into(), context.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| attach(e.into(), f()))
    }
}

// Protocol errors keep their variant so callers can still match on them.
fn attach(error: RefluxError, context: String) -> RefluxError {
    match error {
        RefluxError::UserError(inner) => RefluxError::StreamProcessingError {
            context: format!("{context}: {inner}"),
        },
        RefluxError::StreamProcessingError { context: inner } => {
            RefluxError::StreamProcessingError {
                context: format!("{context}: {inner}"),
            }
        }
        other => other,
    }
}
