// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream;
use futures::StreamExt;
use reflux_core::{Observer, RefluxError};
use reflux_exec::{to_stream, IteratorObserver};
use reflux_stream::{from_fallible_stream, from_iterable, map, pipe, try_map};

#[tokio::test]
async fn test_anext_yields_values_errors_then_ends() -> anyhow::Result<()> {
    // Arrange
    let iterator = IteratorObserver::<i32>::new();

    // Act
    iterator.asend(1, None).await?;
    iterator.athrow(RefluxError::stream_error("bad"), None).await?;
    iterator.asend(2, None).await?;
    iterator.aclose().await;

    // Assert
    assert_eq!(iterator.pending(), 3);
    assert!(matches!(iterator.anext().await, Some(Ok(1))));
    assert!(matches!(iterator.anext().await, Some(Err(_))));
    assert!(matches!(iterator.anext().await, Some(Ok(2))));
    assert!(iterator.anext().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_into_stream_drains_after_close() -> anyhow::Result<()> {
    // Arrange
    let iterator = IteratorObserver::<i32>::new();
    for value in 0..3 {
        iterator.asend(value, None).await?;
    }
    iterator.aclose().await;

    // Act
    let items: Vec<i32> = iterator
        .into_stream()
        .map(|item| item.unwrap_or(-1))
        .collect()
        .await;

    // Assert
    assert_eq!(items, vec![0, 1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_to_stream_iterates_a_pipeline() -> anyhow::Result<()> {
    // Arrange
    let chain = pipe(from_iterable(1..=4)) | map(|x: i32| x * 3);

    // Act
    let items = to_stream(chain).await?;
    let values: Vec<i32> = items.map(|item| item.unwrap_or(0)).collect().await;

    // Assert
    assert_eq!(values, vec![3, 6, 9, 12]);
    Ok(())
}

#[tokio::test]
async fn test_to_stream_yields_errors_in_place() -> anyhow::Result<()> {
    // Arrange
    let checked = try_map(|x: i32| {
        if x == 2 {
            Err(RefluxError::stream_error("two"))
        } else {
            Ok(x)
        }
    });

    // Act
    let items: Vec<_> = to_stream(pipe(from_iterable(1..=3)) | checked)
        .await?
        .collect()
        .await;

    // Assert
    assert_eq!(items.len(), 3);
    assert!(matches!(items[0], Ok(1)));
    assert!(matches!(items[1], Err(RefluxError::StreamProcessingError { .. })));
    assert!(matches!(items[2], Ok(3)));
    Ok(())
}

#[tokio::test]
async fn test_to_stream_ends_after_source_error() -> anyhow::Result<()> {
    // Arrange
    let source = from_fallible_stream(stream::iter(vec![
        Ok("a"),
        Err(RefluxError::stream_error("end")),
    ]));

    // Act
    let items: Vec<_> = to_stream(source).await?.collect().await;

    // Assert
    assert_eq!(items.len(), 2);
    assert!(matches!(items[0], Ok("a")));
    assert!(items[1].is_err());
    Ok(())
}

#[tokio::test]
async fn test_to_stream_can_be_dropped_early() -> anyhow::Result<()> {
    // Arrange
    let mut items = to_stream(from_iterable(0..)).await?;

    // Act
    let first = items.next().await;
    drop(items);

    // Assert
    assert!(matches!(first, Some(Ok(0))));
    Ok(())
}
