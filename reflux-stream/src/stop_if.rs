// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::single_stream::{Downstream, Operator, SingleStream};
use async_trait::async_trait;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use reflux_core::{Flow, Namespace, Predicate};
use reflux_error::{RefluxError, Result};
use std::sync::Arc;

type ErrorPredicate = Box<dyn Fn(&RefluxError) -> bool + Send + Sync>;

/// Closes the stream on the first value (or error) that satisfies a predicate.
///
/// The triggering item is not forwarded, and neither is anything that was
/// still in flight when the decision was made.
pub struct Stop<T> {
    predicate: Predicate<T>,
    error_predicate: Option<ErrorPredicate>,
    stopped: AtomicBool,
    index: AtomicUsize,
}

impl<T: Send + 'static> Stop<T> {
    pub fn new(predicate: Predicate<T>) -> Self {
        Self {
            predicate,
            error_predicate: None,
            stopped: AtomicBool::new(false),
            index: AtomicUsize::new(0),
        }
    }

    /// Also stops on the first error satisfying `p`.
    #[must_use]
    pub fn stop_on_error<P>(mut self, p: P) -> Self
    where
        P: Fn(&RefluxError) -> bool + Send + Sync + 'static,
    {
        self.error_predicate = Some(Box::new(p));
        self
    }

    /// `true` once the stop decision was made.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    fn stop(&self) -> Flow {
        self.stopped.store(true, Ordering::Release);
        Flow::Close
    }
}

#[async_trait]
impl<T: Send + 'static> Operator<T> for Stop<T> {
    type Output = T;

    async fn on_value(&self, value: T, ns: Namespace, downstream: &Downstream<T>) -> Result<Flow> {
        if self.is_stopped() {
            return Ok(Flow::Close);
        }

        let index = self.index.fetch_add(1, Ordering::AcqRel);
        let verdict = self.predicate.test(&value, index);
        if verdict.await? {
            return Ok(self.stop());
        }
        if self.is_stopped() {
            return Ok(Flow::Close);
        }
        downstream.send(value, ns).await
    }

    async fn on_error(
        &self,
        error: RefluxError,
        ns: Namespace,
        downstream: &Downstream<T>,
    ) -> Result<Flow> {
        if self.is_stopped() {
            return Ok(Flow::Close);
        }
        if self.error_predicate.as_ref().is_some_and(|p| p(&error)) {
            return Ok(self.stop());
        }
        downstream.throw(error, ns).await
    }
}

pub fn stop_if<T, P>(p: P) -> Arc<SingleStream<T, Stop<T>>>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    Stop::new(Predicate::plain(p)).into_stream()
}
