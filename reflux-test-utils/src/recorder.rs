// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{async_trait, Flow, Namespace, Observer, ObserverBehavior, ObserverCore};
use reflux_error::{RefluxError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// An observer that records every call it receives.
///
/// A recorder can be told to fail on the n-th value (zero-based). The failure
/// is raised from the value hook, so the observer protocol redirects it into
/// `athrow` and it shows up among [`errors`](Recorder::errors).
pub struct Recorder<T> {
    core: ObserverCore,
    values: Mutex<Vec<T>>,
    errors: Mutex<Vec<RefluxError>>,
    namespaces: Mutex<Vec<Namespace>>,
    received: AtomicUsize,
    closes: AtomicUsize,
    fail_at: Option<(usize, RefluxError)>,
}

impl<T: Send + 'static> Recorder<T> {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::build(None)
    }

    /// A recorder that stays open when the stream feeding it closes.
    #[must_use]
    pub fn kept_alive() -> Arc<Self> {
        let recorder = Self::build(None);
        recorder.core.set_keep_alive(true);
        recorder
    }

    /// A recorder whose value hook fails with `error` on value number `index`.
    #[must_use]
    pub fn failing_at(index: usize, error: RefluxError) -> Arc<Self> {
        Self::build(Some((index, error)))
    }

    fn build(fail_at: Option<(usize, RefluxError)>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            core: ObserverCore::new(me),
            values: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            namespaces: Mutex::new(Vec::new()),
            received: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            fail_at,
        })
    }

    pub fn set_keep_alive(&self, keep_alive: bool) {
        self.core.set_keep_alive(keep_alive);
    }

    /// This recorder as a shared observer handle.
    pub fn as_observer(self: &Arc<Self>) -> Arc<dyn Observer<T>> {
        self.clone()
    }

    pub fn errors(&self) -> Vec<RefluxError> {
        self.errors.lock().clone()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.lock().iter().map(ToString::to_string).collect()
    }

    /// Namespaces received with every value and error, in arrival order.
    pub fn namespaces(&self) -> Vec<Namespace> {
        self.namespaces.lock().clone()
    }

    pub fn value_count(&self) -> usize {
        self.values.lock().len()
    }

    /// How many times the close hook ran. Never more than one.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }
}

#[async_trait]
impl<T: Send + 'static> ObserverBehavior<T> for Recorder<T> {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    async fn on_asend(&self, value: T, ns: Namespace) -> Result<Flow> {
        self.namespaces.lock().push(ns);
        let index = self.received.fetch_add(1, Ordering::SeqCst);
        if let Some((fail_at, error)) = &self.fail_at {
            if *fail_at == index {
                return Err(error.clone());
            }
        }
        self.values.lock().push(value);
        Ok(Flow::Continue)
    }

    async fn on_athrow(&self, error: RefluxError, ns: Namespace) -> Result<Flow> {
        self.namespaces.lock().push(ns);
        self.errors.lock().push(error);
        Ok(Flow::Continue)
    }

    async fn on_aclose(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
