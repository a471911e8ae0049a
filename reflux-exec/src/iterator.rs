// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pull-based consumption of a push pipeline.
//!
//! An [`IteratorObserver`] queues everything it receives on an unbounded
//! channel, so producers never wait for the consumer. Values and errors are
//! pulled back out in arrival order; the sequence ends once the observer is
//! closed and the queue is drained.

use crate::logging::debug;
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reflux_core::{observe, Flow, Namespace, Observer, ObserverBehavior, ObserverCore};
use reflux_error::{RefluxError, Result};
use reflux_stream::IntoSource;
use std::sync::Arc;

/// An observer that turns deliveries into an async sequence.
pub struct IteratorObserver<T> {
    core: ObserverCore,
    sender: Sender<Result<T>>,
    receiver: Receiver<Result<T>>,
}

impl<T: Send + 'static> IteratorObserver<T> {
    pub fn new() -> Arc<Self> {
        let (sender, receiver) = async_channel::unbounded();
        Arc::new_cyclic(|me| Self {
            core: ObserverCore::new(me),
            sender,
            receiver,
        })
    }

    /// The next queued item.
    ///
    /// Values come back as `Some(Ok(_))`, errors as `Some(Err(_))`. Returns
    /// `None` once the observer is closed and nothing is left in the queue.
    pub async fn anext(&self) -> Option<Result<T>> {
        self.receiver.recv().await.ok()
    }

    /// Number of items waiting to be pulled.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// The remaining items as a stream.
    pub fn into_stream(self: Arc<Self>) -> impl Stream<Item = Result<T>> + Send {
        stream::unfold(self, |observer| async move {
            let item = observer.anext().await?;
            Some((item, observer))
        })
    }

    async fn enqueue(&self, item: Result<T>) -> Result<Flow> {
        self.sender
            .send(item)
            .await
            .map_err(|_| RefluxError::ObserverClosed)?;
        Ok(Flow::Continue)
    }
}

#[async_trait]
impl<T: Send + 'static> ObserverBehavior<T> for IteratorObserver<T> {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    async fn on_asend(&self, value: T, _ns: Namespace) -> Result<Flow> {
        self.enqueue(Ok(value)).await
    }

    async fn on_athrow(&self, error: RefluxError, _ns: Namespace) -> Result<Flow> {
        self.enqueue(Err(error)).await
    }

    async fn on_aclose(&self) -> Result<()> {
        self.sender.close();
        Ok(())
    }
}

/// Observes `source` and returns its deliveries as a stream.
///
/// The observation stays open until the stream is exhausted, at which point it
/// is closed, or dropped, at which point it is disposed in the background.
///
/// ```
/// use futures::StreamExt;
/// use reflux_exec::to_stream;
/// use reflux_stream::{from_iterable, map, pipe};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> reflux_core::Result<()> {
/// let items = to_stream(pipe(from_iterable(1..=3)) | map(|x: i32| x * 2)).await?;
/// let doubled: Vec<i32> = items.filter_map(|item| async move { item.ok() }).collect().await;
/// assert_eq!(doubled, vec![2, 4, 6]);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// The registration error.
pub async fn to_stream<T: Send + 'static>(
    source: impl IntoSource<T>,
) -> Result<BoxStream<'static, Result<T>>> {
    let iterator = IteratorObserver::new();
    let observer: Arc<dyn Observer<T>> = iterator.clone();
    let observation = observe(source.into_source(), observer).open().await?;

    let items = stream::unfold(Some((iterator, observation)), |state| async move {
        let (iterator, observation) = state?;
        match iterator.anext().await {
            Some(item) => Some((item, Some((iterator, observation)))),
            None => {
                if let Err(error) = observation.close().await {
                    debug!("closing exhausted observation failed: {}", error);
                }
                None
            }
        }
    });
    Ok(items.boxed())
}
