// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pipeline composition.
//!
//! A [`Pipe`] chains a source through transformers (`pipe(source) | t1 | t2`)
//! and is itself an observable. Binding a final observer with
//! [`sink`](Pipe::sink) gives a [`Sink`], which connects every link
//! source-first when opened and disconnects them in reverse when closed.
//!
//! ```
//! use reflux_core::AnonymousObserver;
//! use reflux_stream::{filter, from_iterable, map, pipe};
//!
//! # async fn example() -> reflux_core::Result<()> {
//! let printer = AnonymousObserver::builder()
//!     .asend(|square: i32| {
//!         println!("{square}");
//!         Ok(())
//!     })
//!     .build();
//!
//! (pipe(from_iterable(0..10)) | filter(|x: &i32| x % 2 == 1) | map(|x: i32| x * x))
//!     .sink(printer)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::logging::debug;
use crate::multi_stream::MultiStream;
use crate::single_stream::{Operator, SingleStream};
use async_trait::async_trait;
use core::future::{Future, IntoFuture};
use core::ops::BitOr;
use futures::future::BoxFuture;
use reflux_core::{subscribe, unsubscribe, Observable, Observer};
use reflux_error::Result;
use std::sync::Arc;

/// A node that is both an observer of `T` and an observable of its output.
pub trait Transformer<T: Send + 'static>: Send + Sync + 'static {
    type Output: Send + 'static;

    fn into_observer(self: Arc<Self>) -> Arc<dyn Observer<T>>;

    fn into_observable(self: Arc<Self>) -> Arc<dyn Observable<Self::Output>>;
}

impl<T: Send + 'static, Op: Operator<T>> Transformer<T> for SingleStream<T, Op> {
    type Output = Op::Output;

    fn into_observer(self: Arc<Self>) -> Arc<dyn Observer<T>> {
        self
    }

    fn into_observable(self: Arc<Self>) -> Arc<dyn Observable<Op::Output>> {
        self
    }
}

impl<T: Clone + Send + 'static> Transformer<T> for MultiStream<T> {
    type Output = T;

    fn into_observer(self: Arc<Self>) -> Arc<dyn Observer<T>> {
        self
    }

    fn into_observable(self: Arc<Self>) -> Arc<dyn Observable<T>> {
        self
    }
}

/// Conversion into a shared observable, for the entry points of a pipeline.
pub trait IntoSource<T: Send + 'static> {
    fn into_source(self) -> Arc<dyn Observable<T>>;
}

impl<T: Send + 'static> IntoSource<T> for Arc<dyn Observable<T>> {
    fn into_source(self) -> Arc<dyn Observable<T>> {
        self
    }
}

impl<T: Send + 'static, S: Observable<T>> IntoSource<T> for Arc<S> {
    fn into_source(self) -> Arc<dyn Observable<T>> {
        self
    }
}

/// One `upstream -> downstream` registration inside a pipe.
#[async_trait]
trait Link: Send + Sync {
    async fn connect(&self) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;
}

struct Edge<U: Send + 'static> {
    upstream: Arc<dyn Observable<U>>,
    downstream: Arc<dyn Observer<U>>,
}

#[async_trait]
impl<U: Send + 'static> Link for Edge<U> {
    async fn connect(&self) -> Result<()> {
        subscribe(&*self.upstream, &self.downstream).await
    }

    /// Disposes the registration and closes the downstream node unless it is
    /// kept alive.
    async fn disconnect(&self) -> Result<()> {
        unsubscribe(&*self.upstream, &self.downstream, None).await
    }
}

async fn connect_all(links: &[Box<dyn Link>]) -> Result<()> {
    for (connected, link) in links.iter().enumerate() {
        if let Err(error) = link.connect().await {
            if let Err(rollback_error) = disconnect_all(&links[..connected]).await {
                debug!("pipe rollback failed: {}", rollback_error);
            }
            return Err(error);
        }
    }
    Ok(())
}

/// Disconnects in reverse, returning the first failure after trying all.
async fn disconnect_all(links: &[Box<dyn Link>]) -> Result<()> {
    let mut first_error = None;
    for link in links.iter().rev() {
        if let Err(error) = link.disconnect().await {
            first_error.get_or_insert(error);
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// A source chained through zero or more transformers.
pub struct Pipe<T: Send + 'static> {
    links: Vec<Box<dyn Link>>,
    tail: Arc<dyn Observable<T>>,
}

/// Starts a pipe at `source`.
pub fn pipe<T: Send + 'static>(source: impl IntoSource<T>) -> Pipe<T> {
    Pipe::new(source)
}

/// Binds `observer` directly to `source`.
pub fn sink<T: Send + 'static>(
    source: impl IntoSource<T>,
    observer: Arc<dyn Observer<T>>,
) -> Sink<T> {
    Pipe::new(source).sink(observer)
}

impl<T: Send + 'static> Pipe<T> {
    pub fn new(source: impl IntoSource<T>) -> Self {
        Self {
            links: Vec::new(),
            tail: source.into_source(),
        }
    }

    /// Appends a transformer.
    pub fn pipe<X: Transformer<T>>(mut self, transformer: Arc<X>) -> Pipe<X::Output> {
        self.links.push(Box::new(Edge {
            upstream: self.tail,
            downstream: transformer.clone().into_observer(),
        }));
        Pipe {
            links: self.links,
            tail: transformer.into_observable(),
        }
    }

    /// Binds the final observer.
    pub fn sink(self, observer: Arc<dyn Observer<T>>) -> Sink<T> {
        Sink {
            pipe: self,
            observer,
            keep_alive: None,
        }
    }

    /// Number of transformers in the pipe.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<T: Send + 'static> IntoSource<T> for Pipe<T> {
    fn into_source(self) -> Arc<dyn Observable<T>> {
        Arc::new(self)
    }
}

impl<T: Send + 'static, X: Transformer<T>> BitOr<Arc<X>> for Pipe<T> {
    type Output = Pipe<X::Output>;

    fn bitor(self, transformer: Arc<X>) -> Self::Output {
        self.pipe(transformer)
    }
}

#[async_trait]
impl<T: Send + 'static> Observable<T> for Pipe<T> {
    /// Connects the links, then registers `observer` at the tail.
    async fn observe(&self, observer: Arc<dyn Observer<T>>) -> Result<()> {
        connect_all(&self.links).await?;
        if let Err(error) = self.tail.observe(observer).await {
            if let Err(rollback_error) = disconnect_all(&self.links).await {
                debug!("pipe rollback failed: {}", rollback_error);
            }
            return Err(error);
        }
        Ok(())
    }

    async fn dispose(&self, observer: &Arc<dyn Observer<T>>) -> Result<()> {
        let disposed = self.tail.dispose(observer).await;
        let disconnected = disconnect_all(&self.links).await;
        disposed.and(disconnected)
    }
}

/// A pipe bound to its final observer, not yet opened.
///
/// Awaiting a sink opens it, waits for the observer to close, then closes it.
#[must_use = "a sink does nothing until opened or awaited"]
pub struct Sink<T: Send + 'static> {
    pipe: Pipe<T>,
    observer: Arc<dyn Observer<T>>,
    keep_alive: Option<bool>,
}

impl<T: Send + 'static> Sink<T> {
    /// Overrides the observer's keep-alive flag when the sink closes.
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    /// Connects every link source-first, then binds the observer.
    ///
    /// # Errors
    ///
    /// The first registration error; links connected before it are
    /// disconnected again.
    pub async fn open(self) -> Result<Subscription<T>> {
        connect_all(&self.pipe.links).await?;
        if let Err(error) = subscribe(&*self.pipe.tail, &self.observer).await {
            if let Err(rollback_error) = disconnect_all(&self.pipe.links).await {
                debug!("sink rollback failed: {}", rollback_error);
            }
            return Err(error);
        }

        Ok(Subscription {
            links: self.pipe.links,
            tail: self.pipe.tail,
            observer: self.observer,
            keep_alive: self.keep_alive,
        })
    }

    /// Runs `body` while the pipeline is open. The pipeline stays open until
    /// the body returns, whether or not data is still flowing.
    ///
    /// # Errors
    ///
    /// Registration errors, then errors of the body, then close errors.
    pub async fn scope<F, Fut, R>(self, body: F) -> Result<R>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let subscription = self.open().await?;
        let outcome = body().await;
        let closed = subscription.close().await;
        match outcome {
            Ok(value) => closed.map(|()| value),
            Err(error) => Err(error),
        }
    }
}

impl<T: Send + 'static> IntoFuture for Sink<T> {
    type Output = Result<()>;
    type IntoFuture = BoxFuture<'static, Result<()>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let subscription = self.open().await?;
            subscription.observer.join().await;
            subscription.close().await
        })
    }
}

/// An open pipeline.
pub struct Subscription<T: Send + 'static> {
    links: Vec<Box<dyn Link>>,
    tail: Arc<dyn Observable<T>>,
    observer: Arc<dyn Observer<T>>,
    keep_alive: Option<bool>,
}

impl<T: Send + 'static> Subscription<T> {
    pub fn observer(&self) -> &Arc<dyn Observer<T>> {
        &self.observer
    }

    /// Waits until the final observer is closed.
    pub async fn finished(&self) {
        self.observer.join().await;
    }

    /// Disposes every registration in reverse, closing the final observer
    /// unless it is kept alive.
    ///
    /// # Errors
    ///
    /// The first dispose error, after every registration was attempted.
    pub async fn close(self) -> Result<()> {
        let unbound = unsubscribe(&*self.tail, &self.observer, self.keep_alive).await;
        let disconnected = disconnect_all(&self.links).await;
        unbound.and(disconnected)
    }
}
