// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::single_stream::{Downstream, Operator, SingleStream};
use async_trait::async_trait;
use core::future::Future;
use core::sync::atomic::{AtomicUsize, Ordering};
use reflux_core::{Flow, Namespace, Predicate};
use reflux_error::{RefluxError, Result};
use std::sync::Arc;

type ErrorPredicate = Box<dyn Fn(&RefluxError) -> bool + Send + Sync>;

/// Forwards the values that pass a predicate.
///
/// Errors are forwarded unless an error predicate was set with
/// [`filter_errors`](Filter::filter_errors) and rejects them.
pub struct Filter<T> {
    predicate: Predicate<T>,
    error_predicate: Option<ErrorPredicate>,
    index: AtomicUsize,
}

impl<T: Send + 'static> Filter<T> {
    pub fn new(predicate: Predicate<T>) -> Self {
        Self {
            predicate,
            error_predicate: None,
            index: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn filter_errors<P>(mut self, p: P) -> Self
    where
        P: Fn(&RefluxError) -> bool + Send + Sync + 'static,
    {
        self.error_predicate = Some(Box::new(p));
        self
    }
}

#[async_trait]
impl<T: Send + 'static> Operator<T> for Filter<T> {
    type Output = T;

    async fn on_value(&self, value: T, ns: Namespace, downstream: &Downstream<T>) -> Result<Flow> {
        let index = self.index.fetch_add(1, Ordering::AcqRel);
        let verdict = self.predicate.test(&value, index);
        if verdict.await? {
            downstream.send(value, ns).await
        } else {
            Ok(Flow::Continue)
        }
    }

    async fn on_error(
        &self,
        error: RefluxError,
        ns: Namespace,
        downstream: &Downstream<T>,
    ) -> Result<Flow> {
        if let Some(keep) = &self.error_predicate {
            if !keep(&error) {
                return Ok(Flow::Continue);
            }
        }
        downstream.throw(error, ns).await
    }
}

pub fn filter<T, P>(p: P) -> Arc<SingleStream<T, Filter<T>>>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    Filter::new(Predicate::plain(p)).into_stream()
}

/// Filters on the value and its zero-based index.
pub fn filter_indexed<T, P>(p: P) -> Arc<SingleStream<T, Filter<T>>>
where
    T: Send + 'static,
    P: Fn(&T, usize) -> bool + Send + Sync + 'static,
{
    Filter::new(Predicate::indexed(p)).into_stream()
}

pub fn filter_async<T, P, Fut>(p: P) -> Arc<SingleStream<T, Filter<T>>>
where
    T: Send + 'static,
    P: Fn(&T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool>> + Send + 'static,
{
    Filter::new(Predicate::from_async(p)).into_stream()
}
