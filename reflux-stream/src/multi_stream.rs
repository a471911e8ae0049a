// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logging::{debug, warn};
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use reflux_core::{
    report_unhandled, Flow, Namespace, Observable, Observer, ObserverBehavior, ObserverCore,
};
use reflux_error::{RefluxError, Result};
use std::sync::Arc;

/// Hot fan-out stream.
///
/// Every value or error sent into the stream is delivered to all observers
/// registered at that moment, concurrently, and the stream waits for every
/// delivery before accepting the next event. Values sent while nobody is
/// registered are dropped.
///
/// A failing observer never stops the stream: `ObserverClosed` is taken as
/// "already gone", other errors are reported and the observer keeps its own
/// fate. Closed observers are pruned after each event.
///
/// ```
/// use reflux_core::{AnonymousObserver, Observable, Observer};
/// use reflux_stream::MultiStream;
///
/// # async fn example() -> reflux_core::Result<()> {
/// let stream = MultiStream::<i32>::new();
/// stream.observe(AnonymousObserver::builder().asend(|_: i32| Ok(())).build()).await?;
/// stream.observe(AnonymousObserver::builder().asend(|_: i32| Ok(())).build()).await?;
///
/// stream.asend(1, None).await?;
/// assert_eq!(stream.observer_count(), 2);
/// # Ok(())
/// # }
/// ```
pub struct MultiStream<T: Clone + Send + 'static> {
    core: ObserverCore,
    observers: Mutex<Vec<Arc<dyn Observer<T>>>>,
}

impl<T: Clone + Send + 'static> MultiStream<T> {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            core: ObserverCore::new(me),
            observers: Mutex::new(Vec::new()),
        })
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn set_keep_alive(&self, keep_alive: bool) {
        self.core.set_keep_alive(keep_alive);
    }

    fn targets(&self) -> Vec<Arc<dyn Observer<T>>> {
        self.observers
            .lock()
            .iter()
            .filter(|observer| !observer.closed())
            .cloned()
            .collect()
    }

    fn prune(&self) {
        self.observers.lock().retain(|observer| !observer.closed());
    }

    /// Inspects fan-out results. Only `Cancelled` escapes.
    fn settle(&self, results: Vec<Result<()>>) -> Result<Flow> {
        self.prune();

        let mut cancelled = false;
        for result in results {
            match result {
                Ok(()) | Err(RefluxError::ObserverClosed) => {}
                Err(RefluxError::Cancelled) => cancelled = true,
                Err(error) => report_unhandled(&error, self.core.short_type_name()),
            }
        }

        if cancelled {
            return Err(RefluxError::Cancelled);
        }
        Ok(Flow::Continue)
    }
}

#[async_trait]
impl<T: Clone + Send + 'static> ObserverBehavior<T> for MultiStream<T> {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    async fn on_asend(&self, value: T, ns: Namespace) -> Result<Flow> {
        let targets = self.targets();
        if targets.is_empty() {
            return Ok(Flow::Continue);
        }

        let deliveries = targets
            .iter()
            .map(|observer| observer.asend(value.clone(), Some(ns.clone())));
        let results = join_all(deliveries).await;
        self.settle(results)
    }

    async fn on_athrow(&self, error: RefluxError, ns: Namespace) -> Result<Flow> {
        let targets = self.targets();
        if targets.is_empty() {
            return Ok(Flow::Continue);
        }

        let deliveries = targets
            .iter()
            .map(|observer| observer.athrow(error.clone(), Some(ns.clone())));
        let results = join_all(deliveries).await;
        self.settle(results)
    }

    async fn on_aclose(&self) -> Result<()> {
        let observers = core::mem::take(&mut *self.observers.lock());
        let closing = observers
            .iter()
            .filter(|observer| !observer.keep_alive() && !observer.closed())
            .map(|observer| observer.aclose());
        join_all(closing).await;
        Ok(())
    }
}

#[async_trait]
impl<T: Clone + Send + 'static> Observable<T> for MultiStream<T> {
    async fn observe(&self, observer: Arc<dyn Observer<T>>) -> Result<()> {
        if self.core.is_closed() {
            debug!(
                "{} {} is closed, closing late observer {}",
                self.core.short_type_name(),
                self.core.id(),
                observer.id()
            );
            if !observer.keep_alive() && !observer.closed() {
                observer.aclose().await;
            }
            return Ok(());
        }

        let mut observers = self.observers.lock();
        if observers.iter().any(|current| current.id() == observer.id()) {
            return Err(RefluxError::multi_stream(format!(
                "{} {} already has observer {}",
                self.core.short_type_name(),
                self.core.id(),
                observer.id()
            )));
        }
        observers.push(observer);
        Ok(())
    }

    async fn dispose(&self, observer: &Arc<dyn Observer<T>>) -> Result<()> {
        let removed = {
            let mut observers = self.observers.lock();
            let before = observers.len();
            observers.retain(|current| current.id() != observer.id());
            observers.len() != before
        };

        if !removed {
            if observer.closed() || self.core.is_closed() {
                debug!(
                    "{} {} dispose of {} after close",
                    self.core.short_type_name(),
                    self.core.id(),
                    observer.id()
                );
            } else {
                warn!(
                    "{} {} cannot dispose unknown observer {}",
                    self.core.short_type_name(),
                    self.core.id(),
                    observer.id()
                );
            }
        }
        Ok(())
    }
}
