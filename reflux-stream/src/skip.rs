// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::single_stream::{Downstream, Operator, SingleStream};
use async_trait::async_trait;
use parking_lot::Mutex;
use reflux_core::{Flow, Namespace};
use reflux_error::Result;
use std::collections::VecDeque;
use std::sync::Arc;

/// Drops the first `n` values, or the last `|n|` values when `n` is negative.
///
/// With a negative count every value is held back until `|n|` newer values
/// arrived; whatever is still held when the stream closes is dropped.
pub struct Skip<T> {
    count: isize,
    state: Mutex<SkipState<T>>,
}

struct SkipState<T> {
    seen: usize,
    held: VecDeque<(T, Namespace)>,
}

impl<T: Send + 'static> Skip<T> {
    pub fn new(count: isize) -> Self {
        Self {
            count,
            state: Mutex::new(SkipState {
                seen: 0,
                held: VecDeque::new(),
            }),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Operator<T> for Skip<T> {
    type Output = T;

    async fn on_value(&self, value: T, ns: Namespace, downstream: &Downstream<T>) -> Result<Flow> {
        let limit = self.count.unsigned_abs();

        let release = if self.count < 0 {
            let mut state = self.state.lock();
            state.held.push_back((value, ns));
            if state.held.len() > limit {
                state.held.pop_front()
            } else {
                None
            }
        } else {
            let mut state = self.state.lock();
            state.seen += 1;
            (state.seen > limit).then_some((value, ns))
        };

        match release {
            Some((value, ns)) => downstream.send(value, ns).await,
            None => Ok(Flow::Continue),
        }
    }
}

pub fn skip<T: Send + 'static>(count: isize) -> Arc<SingleStream<T, Skip<T>>> {
    Skip::new(count).into_stream()
}
