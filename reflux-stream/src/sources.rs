// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Observables that produce values.
//!
//! Every emitting source pushes from a [`WorkerTask`] spawned per registration,
//! so registering a source never blocks on its observer. Workers yield to the
//! runtime after every value. The worker stops when:
//!
//! - the observer is closed
//! - the registration is disposed
//! - the items run out (the observer is closed unless kept alive)
//! - an item is an error (delivered with `athrow`, then the observer is closed
//!   unless kept alive)
//!
//! Sources built from an iterator, a stream or a future are single-shot: they
//! hand their items to the first observer and refuse later registrations with
//! [`RefluxError::SourceConsumed`].

use crate::logging::{debug, warn};
use async_trait::async_trait;
use core::future::Future;
use futures::future::{select, Either};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use futures::FutureExt;
use parking_lot::Mutex;
use reflux_core::{
    report_unhandled, CancellationToken, Observable, Observer, ObserverId, WorkerTask,
};
use reflux_error::{RefluxError, Result};
use std::sync::Arc;

type Items<T> = BoxStream<'static, Result<T>>;

enum Feed<T> {
    Reusable(Box<dyn Fn() -> Items<T> + Send + Sync>),
    Once(Mutex<Option<Items<T>>>),
}

/// An observable that pushes a finite or infinite sequence of items.
pub struct Source<T: Send + 'static> {
    kind: &'static str,
    feed: Feed<T>,
    workers: Mutex<Vec<(ObserverId, WorkerTask)>>,
}

impl<T: Send + 'static> Source<T> {
    fn reusable<F>(kind: &'static str, items: F) -> Arc<Self>
    where
        F: Fn() -> Items<T> + Send + Sync + 'static,
    {
        Arc::new(Self {
            kind,
            feed: Feed::Reusable(Box::new(items)),
            workers: Mutex::new(Vec::new()),
        })
    }

    fn once(kind: &'static str, items: Items<T>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            feed: Feed::Once(Mutex::new(Some(items))),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Which constructor built this source, e.g. `"FromIterable"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// `true` once a single-shot source handed out its items.
    pub fn is_consumed(&self) -> bool {
        match &self.feed {
            Feed::Reusable(_) => false,
            Feed::Once(slot) => slot.lock().is_none(),
        }
    }

    /// Number of registrations with a worker still attached.
    pub fn active_workers(&self) -> usize {
        self.workers
            .lock()
            .iter()
            .filter(|(_, worker)| !worker.is_finished())
            .count()
    }

    /// Number of worker handles held. Finished workers are released on the
    /// next registration or dispose.
    pub fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }

    fn take_items(&self) -> Result<Items<T>> {
        match &self.feed {
            Feed::Reusable(items) => Ok(items()),
            Feed::Once(slot) => slot
                .lock()
                .take()
                .ok_or_else(|| RefluxError::source_consumed(self.kind)),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Observable<T> for Source<T> {
    async fn observe(&self, observer: Arc<dyn Observer<T>>) -> Result<()> {
        let items = self.take_items()?;
        let id = observer.id();
        let kind = self.kind;
        let worker = WorkerTask::spawn(move |cancel| drive(kind, items, observer, cancel));
        let mut workers = self.workers.lock();
        workers.retain(|(_, worker)| !worker.is_finished());
        workers.push((id, worker));
        Ok(())
    }

    async fn dispose(&self, observer: &Arc<dyn Observer<T>>) -> Result<()> {
        let worker = {
            let mut workers = self.workers.lock();
            workers.retain(|(id, worker)| *id == observer.id() || !worker.is_finished());
            workers
                .iter()
                .position(|(id, _)| *id == observer.id())
                .map(|index| workers.remove(index))
        };

        match worker {
            Some((_, worker)) => worker.stop(),
            None => warn!("{} cannot dispose unknown observer {}", self.kind, observer.id()),
        }
        Ok(())
    }
}

async fn drive<T: Send + 'static>(
    kind: &'static str,
    mut items: Items<T>,
    observer: Arc<dyn Observer<T>>,
    cancel: CancellationToken,
) {
    loop {
        if observer.closed() || cancel.is_cancelled() {
            return;
        }

        let next = match select(items.next(), cancel.cancelled()).await {
            Either::Left((item, _)) => item,
            Either::Right(_) => return,
        };

        match next {
            Some(Ok(value)) => match observer.asend(value, None).await {
                Ok(()) => tokio::task::yield_now().await,
                Err(error) if error.is_observer_closed() || error.is_cancelled() => return,
                Err(error) => {
                    report_unhandled(&error, kind);
                    return;
                }
            },
            Some(Err(error)) => {
                match observer.athrow(error, None).await {
                    Err(error) if !error.is_observer_closed() && !error.is_cancelled() => {
                        report_unhandled(&error, kind);
                    }
                    _ => {}
                }
                finish(kind, &observer).await;
                return;
            }
            None => {
                finish(kind, &observer).await;
                return;
            }
        }
    }
}

async fn finish<T: Send + 'static>(kind: &'static str, observer: &Arc<dyn Observer<T>>) {
    if observer.keep_alive() || observer.closed() {
        return;
    }
    debug!("{} exhausted, closing {}", kind, observer.id());
    observer.aclose().await;
}

/// Emits `value` once to every observer, then closes it.
pub fn unit<T: Clone + Send + Sync + 'static>(value: T) -> Arc<Source<T>> {
    Source::reusable("Unit", move || stream::once(futures::future::ready(Ok(value.clone()))).boxed())
}

/// Awaits `future` and emits its output once. Single-shot.
pub fn unit_from<T, F>(future: F) -> Arc<Source<T>>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    Source::once("Unit", stream::once(future.map(Ok)).boxed())
}

/// Closes every observer without emitting.
pub fn empty<T: Send + 'static>() -> Arc<Source<T>> {
    Source::reusable("Empty", || stream::empty().boxed())
}

/// Emits the items of `iter` in order. Single-shot.
pub fn from_iterable<I>(iter: I) -> Arc<Source<I::Item>>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    Source::once("FromIterable", stream::iter(iter.into_iter().map(Ok)).boxed())
}

/// Emits the items of an async stream in order. Single-shot.
pub fn from_stream<S>(items: S) -> Arc<Source<S::Item>>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    Source::once("FromStream", items.map(Ok).boxed())
}

/// Emits the `Ok` items of a fallible stream; the first `Err` is delivered
/// with `athrow` and ends the sequence. Single-shot.
pub fn from_fallible_stream<T, S>(items: S) -> Arc<Source<T>>
where
    T: Send + 'static,
    S: Stream<Item = Result<T>> + Send + 'static,
{
    Source::once("FromStream", items.boxed())
}

/// An observable that accepts observers and never emits or closes them.
pub struct Never<T>(core::marker::PhantomData<fn() -> T>);

/// Creates a [`Never`] observable.
pub fn never<T: Send + 'static>() -> Arc<Never<T>> {
    Arc::new(Never(core::marker::PhantomData))
}

#[async_trait]
impl<T: Send + 'static> Observable<T> for Never<T> {
    async fn observe(&self, _observer: Arc<dyn Observer<T>>) -> Result<()> {
        Ok(())
    }

    async fn dispose(&self, _observer: &Arc<dyn Observer<T>>) -> Result<()> {
        Ok(())
    }
}
