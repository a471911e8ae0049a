// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::single_stream::{Downstream, Operator, SingleStream};
use async_trait::async_trait;
use core::cmp::Ordering;
use parking_lot::Mutex;
use reflux_core::{Flow, Namespace};
use reflux_error::Result;
use std::sync::Arc;

/// Emits the greatest (or least) value once the stream closes.
///
/// The emitted value keeps the namespace it arrived with. On ties the earliest
/// value wins. Nothing is emitted for an empty stream.
pub struct Extremum<T> {
    wins_on: Ordering,
    best: Mutex<Option<(T, Namespace)>>,
}

impl<T: Ord + Send + 'static> Extremum<T> {
    pub fn max() -> Self {
        Self::new(Ordering::Greater)
    }

    pub fn min() -> Self {
        Self::new(Ordering::Less)
    }

    fn new(wins_on: Ordering) -> Self {
        Self {
            wins_on,
            best: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<T: Ord + Send + 'static> Operator<T> for Extremum<T> {
    type Output = T;

    async fn on_value(&self, value: T, ns: Namespace, _downstream: &Downstream<T>) -> Result<Flow> {
        let mut best = self.best.lock();
        let replace = match best.as_ref() {
            None => true,
            Some((current, _)) => value.cmp(current) == self.wins_on,
        };
        if replace {
            *best = Some((value, ns));
        }
        Ok(Flow::Continue)
    }

    async fn on_complete(&self, downstream: &Downstream<T>) -> Result<()> {
        let best = self.best.lock().take();
        if let Some((value, ns)) = best {
            downstream.send(value, ns).await?;
        }
        Ok(())
    }
}

pub fn max<T: Ord + Send + 'static>() -> Arc<SingleStream<T, Extremum<T>>> {
    Extremum::max().into_stream()
}

pub fn min<T: Ord + Send + 'static>() -> Arc<SingleStream<T, Extremum<T>>> {
    Extremum::min().into_stream()
}
