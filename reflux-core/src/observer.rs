// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The observer protocol.
//!
//! [`Observer`] is what callers see: `asend`, `athrow`, `aclose`. Concrete nodes
//! implement [`ObserverBehavior`] instead, supplying only their hooks; the blanket
//! implementation below carries the lifecycle rules for all of them:
//!
//! - calls on a closing or closed observer fail with [`RefluxError::ObserverClosed`]
//! - every accepted call extends the namespace with a hop naming this observer
//! - an `asend` hook failure is redirected to this observer's own `athrow`
//! - a `Flow::Close` verdict, or an `athrow` hook failure, closes the observer once
//!   every in-flight call has left its hook
//! - `aclose` runs exactly once and waits for in-flight calls before its hook

use crate::logging::report_unhandled;
use crate::namespace::{Action, Namespace};
use crate::observer_core::ObserverCore;
use async_trait::async_trait;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use reflux_error::{RefluxError, Result};

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    pub(crate) fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Verdict of an observer hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep the observer open
    Continue,
    /// Close the observer once in-flight calls drain
    Close,
}

/// A node that accepts values, errors, and a close signal.
///
/// All methods take `&self`; observers are shared as `Arc<dyn Observer<T>>`
/// between the sources and streams they are bound to.
#[async_trait]
pub trait Observer<T: Send + 'static>: Send + Sync + 'static {
    /// Deliver a value. `ns` describes the caller; `None` marks an external
    /// producer.
    ///
    /// # Errors
    ///
    /// [`RefluxError::ObserverClosed`] when the observer is closing or closed;
    /// otherwise whatever the observer's error handling re-raised.
    async fn asend(&self, value: T, ns: Option<Namespace>) -> Result<()>;

    /// Deliver an error.
    ///
    /// # Errors
    ///
    /// [`RefluxError::ObserverClosed`] when the observer is closing or closed,
    /// unless this call is the observer redirecting its own `asend` failure.
    async fn athrow(&self, error: RefluxError, ns: Option<Namespace>) -> Result<()>;

    /// Close the observer. Returns `true` for the call that performed the close.
    async fn aclose(&self) -> bool;

    /// `true` once the observer started closing.
    fn closed(&self) -> bool;

    /// Whether a scope that bound this observer leaves it open on exit.
    fn keep_alive(&self) -> bool;

    fn id(&self) -> ObserverId;

    /// Waits until the observer is fully closed.
    async fn join(&self);
}

/// The hooks a concrete observer supplies.
///
/// Implementing this trait implements [`Observer`] through the blanket
/// implementation, which enforces the lifecycle around the hooks.
#[async_trait]
pub trait ObserverBehavior<T: Send + 'static>: Send + Sync + 'static {
    fn core(&self) -> &ObserverCore;

    /// Handles a value. `ns` already names this observer.
    async fn on_asend(&self, value: T, ns: Namespace) -> Result<Flow>;

    /// Handles an error. Returning `Err` closes the observer and re-raises the
    /// error to the caller.
    async fn on_athrow(&self, error: RefluxError, ns: Namespace) -> Result<Flow>;

    /// Runs once, after in-flight calls drained.
    async fn on_aclose(&self) -> Result<()> {
        Ok(())
    }

    /// Runs once when the close starts, before waiting for in-flight calls.
    ///
    /// Release anything an in-flight call may be parked on here.
    fn on_draining(&self) {}
}

/// Runs a deferred close whose propagation was dropped before finishing.
///
/// The close is spawned on the current tokio runtime; without one it cannot
/// run and is only logged.
fn close_abandoned<T, B>(core: &ObserverCore)
where
    T: Send + 'static,
    B: ObserverBehavior<T>,
{
    let Some(observer) = core
        .weak_self()
        .upgrade()
        .and_then(|me| me.downcast::<B>().ok())
    else {
        crate::debug!(
            "{} {} dropped before its deferred close",
            core.short_type_name(),
            core.id()
        );
        return;
    };

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                <B as Observer<T>>::aclose(&*observer).await;
            });
        }
        Err(_) => crate::warn!(
            "{} {} deferred close abandoned outside a runtime",
            core.short_type_name(),
            core.id()
        ),
    }
}

#[async_trait]
impl<T, B> Observer<T> for B
where
    T: Send + 'static,
    B: ObserverBehavior<T>,
{
    async fn asend(&self, value: T, ns: Option<Namespace>) -> Result<()> {
        let core = self.core();
        if !core.accepts() {
            return Err(RefluxError::ObserverClosed);
        }

        let ns = Namespace::new(core, Action::Asend, ns);
        let guard = core.enter(close_abandoned::<T, Self>);
        let result = match self.on_asend(value, ns.clone()).await {
            Ok(Flow::Continue) => Ok(()),
            Ok(Flow::Close) => {
                core.request_close();
                Ok(())
            }
            Err(error) if error.is_cancelled() => Err(error),
            Err(error) => {
                crate::debug!(
                    "{} {} redirecting asend failure: {}",
                    core.short_type_name(),
                    core.id(),
                    error
                );
                <Self as Observer<T>>::athrow(self, error, Some(ns)).await
            }
        };

        if guard.finish() {
            <Self as Observer<T>>::aclose(self).await;
        }
        result
    }

    async fn athrow(&self, error: RefluxError, ns: Option<Namespace>) -> Result<()> {
        let core = self.core();
        let redirected = ns
            .as_ref()
            .is_some_and(|ns| ns.contains_hop(core.id(), Action::Asend));
        if !core.accepts() && !redirected {
            return Err(RefluxError::ObserverClosed);
        }

        let ns = Namespace::new(core, Action::Athrow, ns);
        let guard = core.enter(close_abandoned::<T, Self>);
        let result = match self.on_athrow(error, ns).await {
            Ok(Flow::Continue) => Ok(()),
            Ok(Flow::Close) => {
                core.request_close();
                Ok(())
            }
            Err(error) if error.is_cancelled() => Err(error),
            Err(error) => {
                core.request_close();
                Err(error)
            }
        };

        if guard.finish() {
            <Self as Observer<T>>::aclose(self).await;
        }
        result
    }

    async fn aclose(&self) -> bool {
        let core = self.core();
        if !core.begin_close() {
            return false;
        }

        self.on_draining();
        core.drained().await;

        if let Err(error) = self.on_aclose().await {
            report_unhandled(&error, core.short_type_name());
        }
        core.finish_close();
        crate::debug!("{} {} closed", core.short_type_name(), core.id());
        true
    }

    fn closed(&self) -> bool {
        self.core().is_closed()
    }

    fn keep_alive(&self) -> bool {
        self.core().keep_alive()
    }

    fn id(&self) -> ObserverId {
        self.core().id()
    }

    async fn join(&self) {
        self.core().join().await;
    }
}
