// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{Observable, Observer, Predicate, RefluxError};
use reflux_stream::{filter, filter_async, filter_indexed, from_iterable, pipe, Filter, Operator};
use reflux_test_utils::Recorder;

#[tokio::test]
async fn test_filter_keeps_matching_values() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(0..10)) | filter(|x: &i32| x % 3 == 0))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![0, 3, 6, 9]);
    assert!(recorder.closed());
    Ok(())
}

#[tokio::test]
async fn test_filter_indexed_sees_input_positions() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(vec!["a", "b", "c", "d"])) | filter_indexed(|_: &&str, i| i % 2 == 1))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec!["b", "d"]);
    Ok(())
}

#[tokio::test]
async fn test_filter_async_awaits_predicate() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let is_even = |x: &i32| {
        let even = x % 2 == 0;
        async move { Ok(even) }
    };

    // Act
    (pipe(from_iterable(1..=6)) | filter_async(is_even))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![2, 4, 6]);
    Ok(())
}

#[tokio::test]
async fn test_failing_predicate_raises_error() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let predicate = Predicate::fallible(|x: &i32| {
        if *x == 2 {
            Err(RefluxError::stream_error("cannot judge 2"))
        } else {
            Ok(true)
        }
    });
    let stream = Filter::new(predicate).into_stream();

    // Act
    (pipe(from_iterable(1..=3)) | stream)
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![1, 3]);
    assert_eq!(recorder.errors().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_filter_errors_drops_rejected_errors() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let stream = Filter::new(Predicate::plain(|_: &i32| true))
        .filter_errors(|error| !matches!(error, RefluxError::Timeout { .. }))
        .into_stream();
    stream.observe(recorder.as_observer()).await?;

    // Act
    stream.athrow(RefluxError::timeout("slow"), None).await?;
    stream.athrow(RefluxError::stream_error("kept"), None).await?;

    // Assert
    assert_eq!(
        recorder.error_messages(),
        vec!["Stream processing error: kept".to_string()]
    );
    Ok(())
}
