// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{Observable, Observer};
use reflux_stream::{from_iterable, pipe, take, MultiStream};
use reflux_test_utils::{wait_closed, Recorder, DEFAULT_TIMEOUT_MS};

#[tokio::test]
async fn test_take_first_n_then_closes() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(1..=10)) | take(3))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert_eq!(recorder.close_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_take_more_than_available() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(1..=2)) | take(5))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_take_zero_closes_on_first_value() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let stream = take::<i32>(0);
    stream.observe(recorder.as_observer()).await?;

    // Act
    stream.asend(1, None).await?;

    // Assert
    wait_closed(&*recorder, DEFAULT_TIMEOUT_MS).await?;
    assert!(recorder.values().is_empty());
    assert!(stream.closed());
    Ok(())
}

#[tokio::test]
async fn test_take_negative_emits_last_values_on_close() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(1..=5)) | take(-2))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![4, 5]);
    Ok(())
}

#[tokio::test]
async fn test_take_negative_emits_nothing_before_close() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let stream = take::<i32>(-2);
    stream.observe(recorder.as_observer()).await?;

    // Act
    for value in 1..=4 {
        stream.asend(value, None).await?;
    }
    let before_close = recorder.values();
    stream.aclose().await;

    // Assert
    assert!(before_close.is_empty());
    assert_eq!(recorder.values(), vec![3, 4]);
    Ok(())
}

#[tokio::test]
async fn test_take_negative_keeps_origin_namespaces() -> anyhow::Result<()> {
    // Arrange
    let hub = MultiStream::<i32>::new();
    let stream = take::<i32>(-1);
    let recorder = Recorder::new();
    hub.observe(stream.clone()).await?;
    stream.observe(recorder.as_observer()).await?;

    // Act
    hub.asend(1, None).await?;
    hub.asend(2, None).await?;
    hub.aclose().await;

    // Assert
    wait_closed(&*recorder, DEFAULT_TIMEOUT_MS).await?;
    assert_eq!(recorder.values(), vec![2]);
    assert!(recorder.namespaces()[0].contains(hub.id()));
    Ok(())
}
