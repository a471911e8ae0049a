// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::single_stream::{Downstream, Operator, SingleStream};
use async_trait::async_trait;
use core::future::Future;
use core::sync::atomic::{AtomicUsize, Ordering};
use futures::FutureExt;
use reflux_core::{Callback, Flow, Namespace};
use reflux_error::{RefluxError, Result};
use std::sync::Arc;

type ErrorMapper = Box<dyn Fn(RefluxError) -> RefluxError + Send + Sync>;

/// Transforms every value, and optionally every error.
///
/// The mapper receives the value and its zero-based index. A failing mapper
/// raises into the stream's `athrow`, so the failure travels downstream as an
/// error.
pub struct Map<T, U> {
    mapper: Callback<(T, usize), Result<U>>,
    error_mapper: Option<ErrorMapper>,
    index: AtomicUsize,
}

impl<T: Send + 'static, U: Send + 'static> Map<T, U> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Self::with(Callback::plain(move |(value, _)| Ok(f(value))))
    }

    /// A mapper that may fail.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        Self::with(Callback::plain(move |(value, _)| f(value)))
    }

    /// A mapper that also receives the value's index.
    pub fn indexed<F>(f: F) -> Self
    where
        F: Fn(T, usize) -> U + Send + Sync + 'static,
    {
        Self::with(Callback::plain(move |(value, index)| Ok(f(value, index))))
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static,
    {
        Self::with(Callback::from_async(move |(value, _)| f(value).map(Ok)))
    }

    /// Also transforms errors before they are forwarded.
    #[must_use]
    pub fn map_errors<G>(mut self, g: G) -> Self
    where
        G: Fn(RefluxError) -> RefluxError + Send + Sync + 'static,
    {
        self.error_mapper = Some(Box::new(g));
        self
    }

    fn with(mapper: Callback<(T, usize), Result<U>>) -> Self {
        Self {
            mapper,
            error_mapper: None,
            index: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<T: Send + 'static, U: Send + 'static> Operator<T> for Map<T, U> {
    type Output = U;

    async fn on_value(&self, value: T, ns: Namespace, downstream: &Downstream<U>) -> Result<Flow> {
        let index = self.index.fetch_add(1, Ordering::AcqRel);
        let mapped = self.mapper.call((value, index)).await?;
        downstream.send(mapped, ns).await
    }

    async fn on_error(
        &self,
        error: RefluxError,
        ns: Namespace,
        downstream: &Downstream<U>,
    ) -> Result<Flow> {
        let error = match &self.error_mapper {
            Some(g) => g(error),
            None => error,
        };
        downstream.throw(error, ns).await
    }
}

/// `x -> f(x)`.
pub fn map<T, U, F>(f: F) -> Arc<SingleStream<T, Map<T, U>>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    Map::new(f).into_stream()
}

/// `x -> f(x)?`; a failure is raised into the stream's error path.
pub fn try_map<T, U, F>(f: F) -> Arc<SingleStream<T, Map<T, U>>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Result<U> + Send + Sync + 'static,
{
    Map::fallible(f).into_stream()
}

/// `(x, i) -> f(x, i)` with `i` the zero-based index of `x`.
pub fn map_indexed<T, U, F>(f: F) -> Arc<SingleStream<T, Map<T, U>>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T, usize) -> U + Send + Sync + 'static,
{
    Map::indexed(f).into_stream()
}

/// `x -> f(x).await`.
pub fn map_async<T, U, F, Fut>(f: F) -> Arc<SingleStream<T, Map<T, U>>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = U> + Send + 'static,
{
    Map::from_async(f).into_stream()
}
