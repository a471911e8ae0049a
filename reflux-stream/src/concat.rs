// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fan-in of several sources into one single-subscriber stream.
//!
//! Every source is connected at once through its own inlet, and values are
//! forwarded in the order they arrive from any of them. The merged stream
//! closes when the last inlet closes. Sources that finish before the next one
//! starts therefore come out concatenated.

use crate::logging::debug;
use crate::single_stream::SingleStream;
use async_trait::async_trait;
use core::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use reflux_core::{
    subscribe, Flow, Namespace, Observable, Observer, ObserverBehavior, ObserverCore,
};
use reflux_error::{RefluxError, Result};
use std::sync::Arc;

/// Observable merging `sources` into a single stream.
pub struct Concat<T: Send + 'static> {
    sources: Vec<Arc<dyn Observable<T>>>,
    stream: Arc<SingleStream<T>>,
    inlets: Mutex<Vec<Arc<dyn Observer<T>>>>,
    open: Arc<AtomicUsize>,
}

impl<T: Send + 'static> Concat<T> {
    pub fn new(sources: Vec<Arc<dyn Observable<T>>>) -> Arc<Self> {
        Arc::new(Self {
            open: Arc::new(AtomicUsize::new(sources.len())),
            sources,
            stream: SingleStream::new(),
            inlets: Mutex::new(Vec::new()),
        })
    }

    /// The merged stream observers are bound to.
    pub fn stream(&self) -> &Arc<SingleStream<T>> {
        &self.stream
    }

    async fn connect(&self) -> Result<()> {
        if self.sources.is_empty() {
            <SingleStream<T> as Observer<T>>::aclose(&self.stream).await;
            return Ok(());
        }

        let mut connected = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let inlet: Arc<dyn Observer<T>> = Inlet::new(self.stream.clone(), self.open.clone());
            if let Err(error) = subscribe(&**source, &inlet).await {
                for (source, inlet) in self.sources.iter().zip(&connected) {
                    if let Err(dispose_error) = source.dispose(inlet).await {
                        debug!("concat rollback dispose failed: {}", dispose_error);
                    }
                }
                return Err(error);
            }
            connected.push(inlet);
        }

        *self.inlets.lock() = connected;
        Ok(())
    }
}

#[async_trait]
impl<T: Send + 'static> Observable<T> for Concat<T> {
    async fn observe(&self, observer: Arc<dyn Observer<T>>) -> Result<()> {
        let first = !self.stream.is_bound() && !self.stream.closed();
        self.stream.observe(observer).await?;
        if first {
            self.connect().await?;
        }
        Ok(())
    }

    async fn dispose(&self, observer: &Arc<dyn Observer<T>>) -> Result<()> {
        let inlets = core::mem::take(&mut *self.inlets.lock());
        for (source, inlet) in self.sources.iter().zip(&inlets) {
            source.dispose(inlet).await?;
        }
        self.stream.dispose(observer).await
    }
}

/// Merges `sources` into one stream, see [`Concat`].
pub fn concat<T: Send + 'static>(sources: Vec<Arc<dyn Observable<T>>>) -> Arc<Concat<T>> {
    Concat::new(sources)
}

/// Forwards one source into the merged stream.
struct Inlet<T: Send + 'static> {
    core: ObserverCore,
    target: Arc<SingleStream<T>>,
    open: Arc<AtomicUsize>,
}

impl<T: Send + 'static> Inlet<T> {
    fn new(target: Arc<SingleStream<T>>, open: Arc<AtomicUsize>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            core: ObserverCore::new(me),
            target,
            open,
        })
    }
}

#[async_trait]
impl<T: Send + 'static> ObserverBehavior<T> for Inlet<T> {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    async fn on_asend(&self, value: T, ns: Namespace) -> Result<Flow> {
        match self.target.asend(value, Some(ns)).await {
            Ok(()) => Ok(Flow::Continue),
            Err(RefluxError::ObserverClosed) => Ok(Flow::Close),
            Err(error) => Err(error),
        }
    }

    async fn on_athrow(&self, error: RefluxError, ns: Namespace) -> Result<Flow> {
        match self.target.athrow(error, Some(ns)).await {
            Ok(()) => Ok(Flow::Continue),
            Err(RefluxError::ObserverClosed) => Ok(Flow::Close),
            Err(error) => Err(error),
        }
    }

    async fn on_aclose(&self) -> Result<()> {
        if self.open.fetch_sub(1, Ordering::AcqRel) == 1 {
            <SingleStream<T> as Observer<T>>::aclose(&self.target).await;
        }
        Ok(())
    }
}
