// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use parking_lot::Mutex;
use reflux_core::{observe, Flow, Namespace, Observer, ObserverBehavior, ObserverCore};
use reflux_error::{RefluxError, Result};
use reflux_stream::IntoSource;
use std::sync::Arc;

/// An observer that settles on the first value or error it receives.
///
/// The first value resolves the consumer and the first error rejects it; in
/// both cases the consumer closes itself. A consumer closed before either
/// happened resolves to [`RefluxError::ConsumerClosed`].
pub struct Consumer<T> {
    core: ObserverCore,
    outcome: Mutex<Option<Result<T>>>,
}

impl<T: Send + 'static> Consumer<T> {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            core: ObserverCore::new(me),
            outcome: Mutex::new(None),
        })
    }

    /// `true` once a value or an error arrived.
    pub fn is_settled(&self) -> bool {
        self.outcome.lock().is_some()
    }

    /// Waits for the consumer to close and hands out its outcome.
    ///
    /// The outcome is handed out once; later calls see `ConsumerClosed`.
    ///
    /// # Errors
    ///
    /// The error the consumer was rejected with, or
    /// [`RefluxError::ConsumerClosed`] when it closed empty-handed.
    pub async fn outcome(&self) -> Result<T> {
        self.core.join().await;
        self.outcome
            .lock()
            .take()
            .unwrap_or(Err(RefluxError::ConsumerClosed))
    }

    fn settle(&self, outcome: Result<T>) {
        let mut slot = self.outcome.lock();
        if slot.is_none() {
            *slot = Some(outcome);
        }
    }
}

#[async_trait]
impl<T: Send + 'static> ObserverBehavior<T> for Consumer<T> {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    async fn on_asend(&self, value: T, _ns: Namespace) -> Result<Flow> {
        self.settle(Ok(value));
        Ok(Flow::Close)
    }

    async fn on_athrow(&self, error: RefluxError, _ns: Namespace) -> Result<Flow> {
        self.settle(Err(error));
        Ok(Flow::Close)
    }
}

/// Observes `source` until its first value or error.
///
/// ```
/// use reflux_exec::consume;
/// use reflux_stream::{from_iterable, pipe, skip};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> reflux_core::Result<()> {
/// let third = consume(pipe(from_iterable(1..=5)) | skip(2)).await?;
/// assert_eq!(third, 3);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// The first error `source` delivers, [`RefluxError::ConsumerClosed`] when it
/// closes without a value, or the registration error.
pub async fn consume<T: Send + 'static>(source: impl IntoSource<T>) -> Result<T> {
    let consumer = Consumer::new();
    let observer: Arc<dyn Observer<T>> = consumer.clone();
    observe(source.into_source(), observer)
        .scope(|| consumer.outcome())
        .await
}
