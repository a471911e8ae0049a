// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::single_stream::{Downstream, Operator, SingleStream};
use async_trait::async_trait;
use core::sync::atomic::{AtomicUsize, Ordering};
use reflux_core::{Flow, Namespace, Predicate};
use reflux_error::{RefluxError, Result};
use std::sync::Arc;

/// Forwards values that satisfy a predicate and raises `error` for the rest.
///
/// The raised error goes through the stream's own `athrow`, so downstream
/// receives it like any other error.
pub struct Assert<T> {
    predicate: Predicate<T>,
    error: RefluxError,
    index: AtomicUsize,
}

impl<T: Send + 'static> Assert<T> {
    pub fn new(predicate: Predicate<T>, error: RefluxError) -> Self {
        Self {
            predicate,
            error,
            index: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Operator<T> for Assert<T> {
    type Output = T;

    async fn on_value(&self, value: T, ns: Namespace, downstream: &Downstream<T>) -> Result<Flow> {
        let index = self.index.fetch_add(1, Ordering::AcqRel);
        let verdict = self.predicate.test(&value, index);
        if !verdict.await? {
            return Err(self.error.clone());
        }
        downstream.send(value, ns).await
    }
}

pub fn assert_that<T, P>(p: P, error: RefluxError) -> Arc<SingleStream<T, Assert<T>>>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    Assert::new(Predicate::plain(p), error).into_stream()
}
