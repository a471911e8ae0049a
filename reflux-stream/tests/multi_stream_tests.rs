// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{AnonymousObserver, Observable, Observer, RefluxError};
use reflux_stream::MultiStream;
use reflux_test_utils::Recorder;
use std::sync::Arc;

fn failing_observer() -> Arc<dyn Observer<i32>> {
    AnonymousObserver::<i32>::builder()
        .asend(|_| Err(RefluxError::stream_error("send failed")))
        .athrow(|error| Err(error))
        .build()
}

#[tokio::test]
async fn test_fans_out_to_every_observer() -> anyhow::Result<()> {
    // Arrange
    let stream = MultiStream::<i32>::new();
    let first = Recorder::new();
    let second = Recorder::new();
    stream.observe(first.as_observer()).await?;
    stream.observe(second.as_observer()).await?;

    // Act
    stream.asend(1, None).await?;
    stream.athrow(RefluxError::stream_error("shared"), None).await?;
    stream.asend(2, None).await?;

    // Assert
    assert_eq!(first.values(), vec![1, 2]);
    assert_eq!(second.values(), vec![1, 2]);
    assert_eq!(first.errors().len(), 1);
    assert_eq!(second.errors().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_values_without_observers_are_dropped() -> anyhow::Result<()> {
    // Arrange
    let stream = MultiStream::<i32>::new();
    let late = Recorder::new();

    // Act
    stream.asend(1, None).await?;
    stream.observe(late.as_observer()).await?;
    stream.asend(2, None).await?;

    // Assert
    assert_eq!(late.values(), vec![2]);
    Ok(())
}

#[tokio::test]
async fn test_failing_observer_does_not_affect_others() -> anyhow::Result<()> {
    // Arrange
    let stream = MultiStream::<i32>::new();
    let failing = failing_observer();
    let healthy = Recorder::new();
    stream.observe(failing.clone()).await?;
    stream.observe(healthy.as_observer()).await?;

    // Act
    stream.asend(1, None).await?;
    stream.asend(2, None).await?;

    // Assert
    assert!(failing.closed());
    assert_eq!(healthy.values(), vec![1, 2]);
    assert_eq!(stream.observer_count(), 1);
    assert!(!stream.closed());
    Ok(())
}

#[tokio::test]
async fn test_cancellation_is_raised_after_fan_out() -> anyhow::Result<()> {
    // Arrange
    let stream = MultiStream::<i32>::new();
    let cancelling: Arc<dyn Observer<i32>> = AnonymousObserver::<i32>::builder()
        .asend(|_| Err(RefluxError::Cancelled))
        .build();
    let healthy = Recorder::new();
    stream.observe(cancelling).await?;
    stream.observe(healthy.as_observer()).await?;

    // Act
    let result = stream.asend(1, None).await;

    // Assert
    assert!(matches!(result, Err(RefluxError::Cancelled)));
    assert_eq!(healthy.values(), vec![1]);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_registration_is_refused() -> anyhow::Result<()> {
    // Arrange
    let stream = MultiStream::<i32>::new();
    let recorder = Recorder::new();
    stream.observe(recorder.as_observer()).await?;

    // Act
    let result = stream.observe(recorder.as_observer()).await;

    // Assert
    assert!(matches!(result, Err(RefluxError::MultiStream { .. })));
    assert_eq!(stream.observer_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_close_closes_observers_except_kept_alive() -> anyhow::Result<()> {
    // Arrange
    let stream = MultiStream::<i32>::new();
    let closing = Recorder::new();
    let kept = Recorder::kept_alive();
    stream.observe(closing.as_observer()).await?;
    stream.observe(kept.as_observer()).await?;

    // Act
    stream.aclose().await;

    // Assert
    assert!(closing.closed());
    assert!(!kept.closed());
    assert_eq!(stream.observer_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_late_observer_of_closed_stream_is_closed() -> anyhow::Result<()> {
    // Arrange
    let stream = MultiStream::<i32>::new();
    stream.aclose().await;
    let recorder = Recorder::new();

    // Act
    stream.observe(recorder.as_observer()).await?;

    // Assert
    assert!(recorder.closed());
    assert_eq!(stream.observer_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_dispose_removes_only_that_observer() -> anyhow::Result<()> {
    // Arrange
    let stream = MultiStream::<i32>::new();
    let leaving = Recorder::new();
    let staying = Recorder::new();
    let leaving_observer = leaving.as_observer();
    stream.observe(leaving_observer.clone()).await?;
    stream.observe(staying.as_observer()).await?;

    // Act
    stream.dispose(&leaving_observer).await?;
    stream.asend(5, None).await?;

    // Assert
    assert!(leaving.values().is_empty());
    assert!(!leaving.closed());
    assert_eq!(staying.values(), vec![5]);
    Ok(())
}

#[tokio::test]
async fn test_each_observer_sees_multistream_in_namespace() -> anyhow::Result<()> {
    // Arrange
    let stream = MultiStream::<i32>::new();
    let recorder = Recorder::new();
    stream.observe(recorder.as_observer()).await?;

    // Act
    stream.asend(1, None).await?;

    // Assert
    let namespaces = recorder.namespaces();
    assert!(namespaces[0].contains("MultiStream"));
    assert!(namespaces[0].contains(stream.id()));
    Ok(())
}
