// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{Observable, Observer, Predicate, RefluxError};
use reflux_stream::{from_iterable, pipe, stop_if, Operator, Stop};
use reflux_test_utils::{wait_closed, Recorder, DEFAULT_TIMEOUT_MS};

#[tokio::test]
async fn test_stop_if_closes_on_first_match() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(1..=10)) | stop_if(|x: &i32| *x == 4))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert_eq!(recorder.close_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_stop_if_forwards_everything_without_match() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(1..=3)) | stop_if(|x: &i32| *x > 100))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_stop_on_error_closes_on_matching_error() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let stream = Stop::new(Predicate::plain(|_: &i32| false))
        .stop_on_error(|error: &RefluxError| {
            matches!(error, RefluxError::StreamProcessingError { .. })
        })
        .into_stream();
    stream.observe(recorder.as_observer()).await?;

    // Act
    stream.asend(1, None).await?;
    stream.athrow(RefluxError::timeout("transient"), None).await?;
    stream.athrow(RefluxError::stream_error("fatal"), None).await?;

    // Assert
    wait_closed(&*recorder, DEFAULT_TIMEOUT_MS).await?;
    assert!(stream.operator().is_stopped());
    assert_eq!(recorder.values(), vec![1]);
    assert_eq!(recorder.errors().len(), 1);
    assert!(stream.closed());
    Ok(())
}

#[tokio::test]
async fn test_nothing_is_forwarded_after_stop() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let stream = stop_if(|x: &i32| *x < 0);
    stream.observe(recorder.as_observer()).await?;

    // Act
    stream.asend(1, None).await?;
    stream.asend(-1, None).await?;
    let late = stream.asend(2, None).await;

    // Assert
    assert!(matches!(late, Err(RefluxError::ObserverClosed)));
    assert_eq!(recorder.values(), vec![1]);
    Ok(())
}
