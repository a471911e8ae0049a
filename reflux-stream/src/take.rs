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

/// Keeps the first `n` values, or the last `|n|` values when `n` is negative.
///
/// - `n >= 0`: forwards the first `n` values, then closes. `take(0)` closes on
///   the first value without forwarding it.
/// - `n < 0`: buffers the most recent `|n|` values with their namespaces and
///   forwards them when the stream closes.
pub struct Take<T> {
    count: isize,
    state: Mutex<TakeState<T>>,
}

struct TakeState<T> {
    seen: usize,
    tail: VecDeque<(T, Namespace)>,
}

impl<T: Send + 'static> Take<T> {
    pub fn new(count: isize) -> Self {
        Self {
            count,
            state: Mutex::new(TakeState {
                seen: 0,
                tail: VecDeque::new(),
            }),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Operator<T> for Take<T> {
    type Output = T;

    async fn on_value(&self, value: T, ns: Namespace, downstream: &Downstream<T>) -> Result<Flow> {
        if self.count < 0 {
            let mut state = self.state.lock();
            state.tail.push_back((value, ns));
            if state.tail.len() > self.count.unsigned_abs() {
                state.tail.pop_front();
            }
            return Ok(Flow::Continue);
        }

        let limit = self.count.unsigned_abs();
        let seen = {
            let mut state = self.state.lock();
            state.seen += 1;
            state.seen
        };
        if seen > limit {
            return Ok(Flow::Close);
        }

        let flow = downstream.send(value, ns).await?;
        if seen == limit {
            return Ok(Flow::Close);
        }
        Ok(flow)
    }

    async fn on_complete(&self, downstream: &Downstream<T>) -> Result<()> {
        let tail = core::mem::take(&mut self.state.lock().tail);
        for (value, ns) in tail {
            if downstream.send(value, ns).await? == Flow::Close {
                break;
            }
        }
        Ok(())
    }
}

pub fn take<T: Send + 'static>(count: isize) -> Arc<SingleStream<T, Take<T>>> {
    Take::new(count).into_stream()
}
