// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{Latch, LatchState, RefluxError};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_new_latch_is_pending() {
    let latch = Latch::new();
    assert_eq!(latch.state(), LatchState::Pending);
    assert!(!latch.is_settled());
}

#[test]
fn test_latch_settles_only_once() {
    let latch = Latch::new();

    assert!(latch.open());
    assert!(!latch.reject());
    assert!(!latch.open());
    assert_eq!(latch.state(), LatchState::Open);
}

#[tokio::test]
async fn test_wait_on_open_latch_resolves_immediately() -> anyhow::Result<()> {
    let latch = Latch::new();
    latch.open();

    latch.wait().await?;
    Ok(())
}

#[tokio::test]
async fn test_wait_on_rejected_latch_fails_with_observer_closed() {
    let latch = Latch::new();
    latch.reject();

    let result = latch.wait().await;
    assert!(matches!(result, Err(RefluxError::ObserverClosed)));
}

#[tokio::test]
async fn test_waiters_are_released_when_opened() -> anyhow::Result<()> {
    // Arrange
    let latch = Arc::new(Latch::new());
    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let latch = latch.clone();
            tokio::spawn(async move { latch.wait().await })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Act
    latch.open();

    // Assert
    for waiter in waiters {
        tokio::time::timeout(Duration::from_millis(500), waiter).await???;
    }
    Ok(())
}

#[tokio::test]
async fn test_waiters_are_released_when_rejected() -> anyhow::Result<()> {
    // Arrange
    let latch = Arc::new(Latch::new());
    let waiter = {
        let latch = latch.clone();
        tokio::spawn(async move { latch.wait().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Act
    latch.reject();

    // Assert
    let result = tokio::time::timeout(Duration::from_millis(500), waiter).await??;
    assert!(matches!(result, Err(RefluxError::ObserverClosed)));
    Ok(())
}
