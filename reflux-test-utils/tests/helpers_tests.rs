// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{Observer, RefluxError};
use reflux_test_utils::{assert_still_open, wait_closed, wait_for_values, Recorder};

#[tokio::test]
async fn test_wait_closed_returns_once_closed() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::<i32>::new();
    recorder.aclose().await;

    // Act & Assert
    wait_closed(&*recorder, 100).await?;
    Ok(())
}

#[tokio::test]
async fn test_wait_closed_times_out_on_open_observer() {
    // Arrange
    let recorder = Recorder::<i32>::new();

    // Act
    let result = wait_closed(&*recorder, 20).await;

    // Assert
    assert!(matches!(result, Err(RefluxError::Timeout { .. })));
}

#[tokio::test]
async fn test_wait_for_values_counts_arrivals() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::<i32>::new();
    recorder.asend(1, None).await?;
    recorder.asend(2, None).await?;

    // Act & Assert
    wait_for_values(&recorder, 2, 100).await?;
    assert!(wait_for_values(&recorder, 3, 20).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_assert_still_open_passes_for_open_observer() {
    // Arrange
    let recorder = Recorder::<i32>::new();

    // Act & Assert
    assert_still_open(&*recorder, 20).await;
}

#[tokio::test]
#[should_panic = "expected it to stay open"]
async fn test_assert_still_open_panics_for_closed_observer() {
    // Arrange
    let recorder = Recorder::<i32>::new();
    recorder.aclose().await;

    // Act & Assert
    assert_still_open(&*recorder, 20).await;
}
