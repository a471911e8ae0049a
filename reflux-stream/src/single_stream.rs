// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cold, single-subscriber transformer.
//!
//! A [`SingleStream`] is both an observer of `T` and an observable of the
//! operator's output. It binds at most one downstream observer and holds every
//! delivery on a latch until that observer is bound, so a source connected
//! before the rest of the pipeline loses nothing.
//!
//! The per-stage logic lives in an [`Operator`]; the stream itself only carries
//! the binding and lifecycle rules shared by every stage.

use crate::logging::{debug, warn};
use async_trait::async_trait;
use core::marker::PhantomData;
use parking_lot::Mutex;
use reflux_core::{
    Flow, Latch, LatchState, Namespace, Observable, Observer, ObserverBehavior, ObserverCore,
};
use reflux_error::{RefluxError, Result};
use std::sync::Arc;

/// Handle to the observer bound below a stream, passed to [`Operator`] hooks.
pub struct Downstream<U: Send + 'static> {
    observer: Arc<dyn Observer<U>>,
}

impl<U: Send + 'static> Downstream<U> {
    fn new(observer: Arc<dyn Observer<U>>) -> Self {
        Self { observer }
    }

    /// Forwards a value.
    ///
    /// Returns [`Flow::Close`] once the observer is closed, so the stream stops
    /// when nobody is left to receive.
    ///
    /// # Errors
    ///
    /// Any error the observer re-raised other than [`RefluxError::ObserverClosed`].
    pub async fn send(&self, value: U, ns: Namespace) -> Result<Flow> {
        if self.observer.closed() {
            return Ok(Flow::Close);
        }
        match self.observer.asend(value, Some(ns)).await {
            Ok(()) => Ok(self.flow()),
            Err(RefluxError::ObserverClosed) => Ok(Flow::Close),
            Err(error) => Err(error),
        }
    }

    /// Forwards an error, with the same closing rule as [`send`](Self::send).
    ///
    /// # Errors
    ///
    /// Any error the observer re-raised other than [`RefluxError::ObserverClosed`].
    pub async fn throw(&self, error: RefluxError, ns: Namespace) -> Result<Flow> {
        if self.observer.closed() {
            return Ok(Flow::Close);
        }
        match self.observer.athrow(error, Some(ns)).await {
            Ok(()) => Ok(self.flow()),
            Err(RefluxError::ObserverClosed) => Ok(Flow::Close),
            Err(error) => Err(error),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.observer.closed()
    }

    pub fn observer(&self) -> &Arc<dyn Observer<U>> {
        &self.observer
    }

    fn flow(&self) -> Flow {
        if self.observer.closed() {
            Flow::Close
        } else {
            Flow::Continue
        }
    }
}

/// The transform a [`SingleStream`] applies between its input and its bound
/// observer.
///
/// Hooks return the stream's [`Flow`]: `Flow::Close` closes the stream once the
/// current call finishes, and nothing is forwarded afterwards.
#[async_trait]
pub trait Operator<T: Send + 'static>: Send + Sync + Sized + 'static {
    type Output: Send + 'static;

    /// Handles one input value.
    ///
    /// An error returned here is redirected into the stream's own `athrow`,
    /// which by default forwards it downstream.
    async fn on_value(
        &self,
        value: T,
        ns: Namespace,
        downstream: &Downstream<Self::Output>,
    ) -> Result<Flow>;

    /// Handles one input error. Forwards it by default.
    async fn on_error(
        &self,
        error: RefluxError,
        ns: Namespace,
        downstream: &Downstream<Self::Output>,
    ) -> Result<Flow> {
        downstream.throw(error, ns).await
    }

    /// Runs when the stream closes while still bound, before the observer is
    /// closed. Operators that buffer flush here.
    async fn on_complete(&self, _downstream: &Downstream<Self::Output>) -> Result<()> {
        Ok(())
    }

    /// Wraps the operator in a stream.
    fn into_stream(self) -> Arc<SingleStream<T, Self>> {
        SingleStream::from_operator(self)
    }
}

/// The identity operator.
pub struct Passthrough<T>(PhantomData<fn() -> T>);

impl<T> Default for Passthrough<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<T: Send + 'static> Operator<T> for Passthrough<T> {
    type Output = T;

    async fn on_value(&self, value: T, ns: Namespace, downstream: &Downstream<T>) -> Result<Flow> {
        downstream.send(value, ns).await
    }
}

/// A cold transformer with at most one bound observer.
///
/// ```
/// use reflux_stream::SingleStream;
/// use reflux_core::Observer;
///
/// # async fn example() -> reflux_core::Result<()> {
/// let stream = SingleStream::<i32>::new();
///
/// // Nobody is bound yet: closing releases the latch instead of waiting on it.
/// stream.aclose().await;
/// assert!(stream.closed());
/// # Ok(())
/// # }
/// ```
pub struct SingleStream<T: Send + 'static, Op: Operator<T> = Passthrough<T>> {
    core: ObserverCore,
    observer: Mutex<Option<Arc<dyn Observer<Op::Output>>>>,
    lock: Latch,
    op: Op,
    _input: PhantomData<fn(T)>,
}

impl<T: Send + 'static> SingleStream<T> {
    /// Creates a stream that forwards values unchanged.
    pub fn new() -> Arc<Self> {
        Self::from_operator(Passthrough::default())
    }
}

impl<T: Send + 'static, Op: Operator<T>> SingleStream<T, Op> {
    /// Creates a stream applying `op`.
    pub fn from_operator(op: Op) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            core: ObserverCore::new(me),
            observer: Mutex::new(None),
            lock: Latch::new(),
            op,
            _input: PhantomData,
        })
    }

    pub fn operator(&self) -> &Op {
        &self.op
    }

    /// `true` while an observer is bound.
    pub fn is_bound(&self) -> bool {
        self.observer.lock().is_some()
    }

    /// State of the delivery latch: pending until the first observer binds,
    /// rejected if the stream closed before that.
    pub fn lock_state(&self) -> LatchState {
        self.lock.state()
    }

    pub fn set_keep_alive(&self, keep_alive: bool) {
        self.core.set_keep_alive(keep_alive);
    }

    fn downstream(&self) -> Option<Downstream<Op::Output>> {
        self.observer.lock().clone().map(Downstream::new)
    }

    fn unbind(&self, observer: &Arc<dyn Observer<Op::Output>>) -> bool {
        let mut bound = self.observer.lock();
        match bound.as_ref() {
            Some(current) if current.id() == observer.id() => {
                *bound = None;
                true
            }
            _ => false,
        }
    }

    async fn close_self(&self) -> bool {
        <Self as Observer<T>>::aclose(self).await
    }
}

#[async_trait]
impl<T: Send + 'static, Op: Operator<T>> ObserverBehavior<T> for SingleStream<T, Op> {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    async fn on_asend(&self, value: T, ns: Namespace) -> Result<Flow> {
        self.lock.wait().await?;
        let Some(downstream) = self.downstream() else {
            return Ok(Flow::Close);
        };
        self.op.on_value(value, ns, &downstream).await
    }

    async fn on_athrow(&self, error: RefluxError, ns: Namespace) -> Result<Flow> {
        self.lock.wait().await?;
        let Some(downstream) = self.downstream() else {
            return Ok(Flow::Close);
        };
        if downstream.is_closed() {
            return Ok(Flow::Close);
        }
        self.op.on_error(error, ns, &downstream).await
    }

    fn on_draining(&self) {
        if self.lock.reject() {
            debug!(
                "{} {} closed before any observer bound",
                self.core.short_type_name(),
                self.core.id()
            );
        }
    }

    async fn on_aclose(&self) -> Result<()> {
        let Some(observer) = self.observer.lock().take() else {
            return Ok(());
        };

        let downstream = Downstream::new(observer.clone());
        let flushed = if downstream.is_closed() {
            Ok(())
        } else {
            self.op.on_complete(&downstream).await
        };

        if !observer.keep_alive() && !observer.closed() {
            observer.aclose().await;
        }
        flushed
    }
}

#[async_trait]
impl<T: Send + 'static, Op: Operator<T>> Observable<Op::Output> for SingleStream<T, Op> {
    async fn observe(&self, observer: Arc<dyn Observer<Op::Output>>) -> Result<()> {
        {
            let mut bound = self.observer.lock();
            match bound.as_ref() {
                Some(current) if current.id() == observer.id() => return Ok(()),
                Some(current) => {
                    return Err(RefluxError::single_stream(format!(
                        "{} {} is already bound to {}, refused {}",
                        self.core.short_type_name(),
                        self.core.id(),
                        current.id(),
                        observer.id()
                    )));
                }
                None => *bound = Some(observer.clone()),
            }
        }

        if self.core.is_closed() {
            self.unbind(&observer);
            if !observer.keep_alive() && !observer.closed() {
                observer.aclose().await;
            }
            return Ok(());
        }

        self.lock.open();
        Ok(())
    }

    async fn dispose(&self, observer: &Arc<dyn Observer<Op::Output>>) -> Result<()> {
        if !self.unbind(observer) {
            if self.core.is_closed() || observer.closed() {
                debug!(
                    "{} {} dispose of {} after close",
                    self.core.short_type_name(),
                    self.core.id(),
                    observer.id()
                );
            } else {
                warn!(
                    "{} {} cannot dispose unknown observer {}",
                    self.core.short_type_name(),
                    self.core.id(),
                    observer.id()
                );
            }
            return Ok(());
        }

        self.close_self().await;
        Ok(())
    }
}
