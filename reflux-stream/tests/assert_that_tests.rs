// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{Observable, Observer, RefluxError};
use reflux_stream::{assert_that, from_iterable, pipe};
use reflux_test_utils::Recorder;

#[tokio::test]
async fn test_assert_raises_for_failing_values() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let positive = assert_that(|x: &i32| *x > 0, RefluxError::stream_error("not positive"));

    // Act
    (pipe(from_iterable(vec![1, 2, -1, 3])) | positive)
        .sink(recorder.as_observer())
        .await?;

    // Assert
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert_eq!(
        recorder.error_messages(),
        vec!["Stream processing error: not positive".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_assert_error_carries_the_stream_hop() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let stream = assert_that(|x: &i32| *x != 0, RefluxError::stream_error("zero"));
    stream.observe(recorder.as_observer()).await?;

    // Act
    stream.asend(0, None).await?;

    // Assert
    let namespaces = recorder.namespaces();
    assert_eq!(namespaces.len(), 1);
    assert!(namespaces[0].contains(stream.id()));
    assert!(namespaces[0].contains("athrow"));
    assert!(!stream.closed());
    Ok(())
}
