// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::recorder::Recorder;
use reflux_core::Observer;
use reflux_error::{RefluxError, Result};
use std::time::Duration;
use tokio::time::{sleep, timeout};

pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;

const SETTLE_MS: u64 = 20;
const POLL_MS: u64 = 1;

/// Waits until `observer` is fully closed.
///
/// # Errors
///
/// [`RefluxError::Timeout`] if it is still open after `timeout_ms`.
pub async fn wait_closed<T: Send + 'static>(
    observer: &dyn Observer<T>,
    timeout_ms: u64,
) -> Result<()> {
    timeout(Duration::from_millis(timeout_ms), observer.join())
        .await
        .map_err(|_| {
            RefluxError::timeout(format!(
                "observer {} still open after {timeout_ms}ms",
                observer.id()
            ))
        })
}

/// Waits until `recorder` holds at least `count` values.
///
/// # Errors
///
/// [`RefluxError::Timeout`] if fewer arrived within `timeout_ms`.
pub async fn wait_for_values<T: Send + 'static>(
    recorder: &Recorder<T>,
    count: usize,
    timeout_ms: u64,
) -> Result<()> {
    let poll = async {
        while recorder.value_count() < count {
            sleep(Duration::from_millis(POLL_MS)).await;
        }
    };
    timeout(Duration::from_millis(timeout_ms), poll)
        .await
        .map_err(|_| {
            RefluxError::timeout(format!(
                "expected {count} values, got {}",
                recorder.value_count()
            ))
        })
}

/// Gives spawned workers a moment to run.
pub async fn settle() {
    sleep(Duration::from_millis(SETTLE_MS)).await;
}

/// Panics if `observer` closes within `timeout_ms`.
pub async fn assert_still_open<T: Send + 'static>(observer: &dyn Observer<T>, timeout_ms: u64) {
    tokio::select! {
        () = observer.join() => {
            panic!("observer {} closed, expected it to stay open", observer.id());
        }
        () = sleep(Duration::from_millis(timeout_ms)) => {}
    }
}
