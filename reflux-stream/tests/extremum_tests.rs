// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{Observable, Observer};
use reflux_stream::{empty, from_iterable, max, min, pipe};
use reflux_test_utils::test_data::{people, person_alice, person_diane};
use reflux_test_utils::{Person, Recorder};

#[tokio::test]
async fn test_max_emits_greatest_on_close() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(vec![3, 9, 1, 7])) | max())
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![9]);
    Ok(())
}

#[tokio::test]
async fn test_min_emits_least_on_close() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();

    // Act
    (pipe(from_iterable(vec![3, 9, 1, 7])) | min())
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![1]);
    Ok(())
}

#[tokio::test]
async fn test_extremum_uses_value_ordering() -> anyhow::Result<()> {
    // Arrange
    let oldest = Recorder::<Person>::new();
    let youngest = Recorder::<Person>::new();

    // Act
    (pipe(from_iterable(people())) | max()).sink(oldest.as_observer()).await?;
    (pipe(from_iterable(people())) | min()).sink(youngest.as_observer()).await?;

    // Assert
    assert_eq!(oldest.values(), vec![person_diane()]);
    assert_eq!(youngest.values(), vec![person_alice()]);
    Ok(())
}

#[tokio::test]
async fn test_extremum_of_empty_stream_emits_nothing() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::<i32>::new();

    // Act
    (pipe(empty::<i32>()) | max()).sink(recorder.as_observer()).await?;

    // Assert
    assert!(recorder.values().is_empty());
    assert!(recorder.closed());
    Ok(())
}

#[tokio::test]
async fn test_max_keeps_namespace_of_winning_value() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let stream = max::<i32>();
    stream.observe(recorder.as_observer()).await?;

    // Act
    stream.asend(5, None).await?;
    stream.asend(2, None).await?;
    stream.aclose().await;

    // Assert
    assert_eq!(recorder.values(), vec![5]);
    assert!(recorder.namespaces()[0].contains(stream.id()));
    Ok(())
}
