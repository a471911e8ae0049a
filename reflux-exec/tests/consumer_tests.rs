// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream;
use reflux_core::{subscribe, Observer, RefluxError};
use reflux_exec::{consume, Consumer};
use reflux_stream::{
    empty, filter, from_fallible_stream, from_iterable, pipe, take, unit, MultiStream,
};
use reflux_test_utils::test_data::{people, person_charlie};
use reflux_test_utils::Person;
use std::sync::Arc;

#[tokio::test]
async fn test_consume_resolves_first_value() -> anyhow::Result<()> {
    // Arrange
    let source = from_iterable(vec![10, 20, 30]);

    // Act
    let first = consume(source).await?;

    // Assert
    assert_eq!(first, 10);
    Ok(())
}

#[tokio::test]
async fn test_consume_through_pipe() -> anyhow::Result<()> {
    // Arrange
    let chain = pipe(from_iterable(people())) | filter(|p: &Person| p.age > 30);

    // Act
    let first_over_thirty = consume(chain).await?;

    // Assert
    assert_eq!(first_over_thirty, person_charlie());
    Ok(())
}

#[tokio::test]
async fn test_consume_unit() -> anyhow::Result<()> {
    // Arrange & Act
    let value = consume(unit("only")).await?;

    // Assert
    assert_eq!(value, "only");
    Ok(())
}

#[tokio::test]
async fn test_consume_rejects_on_first_error() {
    // Arrange
    let source = from_fallible_stream(stream::iter(vec![
        Err(RefluxError::stream_error("first")),
        Ok(1),
    ]));

    // Act
    let result = consume(source).await;

    // Assert
    assert!(matches!(result, Err(RefluxError::StreamProcessingError { .. })));
}

#[tokio::test]
async fn test_consume_of_empty_source_reports_closed() {
    // Arrange & Act
    let result = consume(empty::<i32>()).await;

    // Assert
    assert!(matches!(result, Err(RefluxError::ConsumerClosed)));
}

#[tokio::test]
async fn test_consume_of_take_zero_reports_closed() {
    // Arrange & Act
    let result = consume(pipe(from_iterable(1..=3)) | take(0)).await;

    // Assert
    assert!(matches!(result, Err(RefluxError::ConsumerClosed)));
}

#[tokio::test]
async fn test_consumer_closes_itself_after_first_value() -> anyhow::Result<()> {
    // Arrange
    let consumer = Consumer::<i32>::new();

    // Act
    consumer.asend(1, None).await?;
    let late = consumer.asend(2, None).await;

    // Assert
    assert!(consumer.is_settled());
    assert!(consumer.closed());
    assert!(matches!(late, Err(RefluxError::ObserverClosed)));
    assert_eq!(consumer.outcome().await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_consumer_on_hot_stream() -> anyhow::Result<()> {
    // Arrange
    let hub = MultiStream::<i32>::new();
    let consumer = Consumer::<i32>::new();
    let observer: Arc<dyn Observer<i32>> = consumer.clone();
    subscribe(&*hub, &observer).await?;

    // Act
    hub.asend(7, None).await?;
    hub.asend(8, None).await?;

    // Assert
    assert_eq!(consumer.outcome().await?, 7);
    assert_eq!(hub.observer_count(), 0);
    Ok(())
}
