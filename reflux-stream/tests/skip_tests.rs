// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{Observable, Observer};
use reflux_stream::{from_iterable, pipe, skip};
use reflux_test_utils::Recorder;

#[tokio::test]
async fn test_skip_drops_first_n() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(1..=5)) | skip(2))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![3, 4, 5]);
    assert!(recorder.closed());
    Ok(())
}

#[tokio::test]
async fn test_skip_zero_forwards_everything() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(1..=3)) | skip(0))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_skip_negative_drops_last_n() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(1..=5)) | skip(-2))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_skip_negative_releases_with_delay() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let stream = skip::<i32>(-2);
    stream.observe(recorder.as_observer()).await?;

    // Act & Assert
    stream.asend(1, None).await?;
    stream.asend(2, None).await?;
    assert!(recorder.values().is_empty());

    stream.asend(3, None).await?;
    assert_eq!(recorder.values(), vec![1]);

    stream.aclose().await;
    assert_eq!(recorder.values(), vec![1]);
    assert!(recorder.closed());
    Ok(())
}

#[tokio::test]
async fn test_skip_negative_longer_than_input_emits_nothing() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(1..=3)) | skip(-5))
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert!(recorder.values().is_empty());
    Ok(())
}
