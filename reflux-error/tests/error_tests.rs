// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_error::{IntoRefluxError, RefluxError, Result, ResultExt};
use std::io;

#[test]
fn test_error_display() {
    let err = RefluxError::stream_error("processing failed");
    assert_eq!(
        err.to_string(),
        "Stream processing error: processing failed"
    );

    assert_eq!(RefluxError::ObserverClosed.to_string(), "Observer is closed");
    assert_eq!(
        RefluxError::ConsumerClosed.to_string(),
        "Consumer closed without a result"
    );
}

#[test]
fn test_error_constructors() {
    assert!(matches!(
        RefluxError::single_stream("bound"),
        RefluxError::SingleStream { .. }
    ));
    assert!(matches!(
        RefluxError::multi_stream("duplicate"),
        RefluxError::MultiStream { .. }
    ));
    assert!(matches!(
        RefluxError::source_consumed("FromIterable"),
        RefluxError::SourceConsumed { .. }
    ));
    assert!(matches!(
        RefluxError::timeout("5ms"),
        RefluxError::Timeout { .. }
    ));
}

#[test]
fn test_classification() {
    assert!(RefluxError::Cancelled.is_cancelled());
    assert!(!RefluxError::ObserverClosed.is_cancelled());
    assert!(RefluxError::ObserverClosed.is_observer_closed());
    assert!(!RefluxError::stream_error("x").is_observer_closed());
}

#[test]
fn test_clone_keeps_user_error_source() {
    let err = RefluxError::user_error(io::Error::other("disk full"));
    let cloned = err.clone();

    assert!(matches!(cloned, RefluxError::UserError(_)));
    assert_eq!(err.to_string(), cloned.to_string());
    assert!(std::error::Error::source(&cloned).is_some());
}

#[test]
fn test_result_context_wraps_user_errors() {
    let result: Result<()> = Err(RefluxError::user_error(io::Error::other("test error")));

    let err = result.context("operation failed").unwrap_err();
    assert!(matches!(err, RefluxError::StreamProcessingError { .. }));
    assert!(err.to_string().contains("operation failed"));
    assert!(err.to_string().contains("test error"));
}

#[test]
fn test_result_context_preserves_protocol_errors() {
    let result: Result<()> = Err(RefluxError::ObserverClosed);
    let err = result.context("sending").unwrap_err();
    assert!(err.is_observer_closed());

    let result: Result<()> = Err(RefluxError::Cancelled);
    let err = result.with_context(|| "lazy".to_string()).unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn test_into_reflux_error() {
    let err = io::Error::other("boom").into_reflux();
    assert!(matches!(err, RefluxError::UserError(_)));

    let err = io::Error::other("boom").into_reflux_error("reading");
    assert_eq!(err.to_string(), "Stream processing error: reading: boom");
}
