// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lifecycle and propagation bookkeeping shared by every observer.
//!
//! An [`ObserverCore`] tracks the Open → Draining → Closed state machine:
//!
//! - **Open**: `asend`/`athrow` are accepted.
//! - **Draining**: `aclose` was entered (`closed` is set); new calls are rejected
//!   and the close waits for in-flight propagations to finish.
//! - **Closed**: the close hook returned; [`join`](ObserverCore::join) resolves.
//!
//! A close requested from inside a propagation (an operator deciding to stop, a
//! fatal error) is deferred: `close_guard` rejects new calls immediately, and the
//! call that brings the propagation count back to zero performs the close.

use crate::latch::Latch;
use crate::namespace::short_name;
use crate::observer::ObserverId;
use core::any::{Any, TypeId};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use event_listener::Event;
use std::sync::Weak;

/// Lifecycle state embedded in every observer.
///
/// Build it inside `Arc::new_cyclic` so namespaces can refer back to the
/// observer weakly:
///
/// ```
/// use reflux_core::ObserverCore;
/// use std::sync::Arc;
///
/// struct Counter {
///     core: ObserverCore,
/// }
///
/// let counter = Arc::new_cyclic(|me| Counter {
///     core: ObserverCore::new(me),
/// });
/// assert!(!counter.core.is_closed());
/// ```
pub struct ObserverCore {
    id: ObserverId,
    type_name: &'static str,
    type_id: TypeId,
    me: Weak<dyn Any + Send + Sync>,
    keep_alive: AtomicBool,
    closed: AtomicBool,
    close_guard: AtomicBool,
    close_pending: AtomicBool,
    propagation: AtomicUsize,
    drained: Event,
    finished: Latch,
}

impl ObserverCore {
    /// Creates the core of the observer `me` points to.
    pub fn new<O: Any + Send + Sync>(me: &Weak<O>) -> Self {
        let me: Weak<dyn Any + Send + Sync> = me.clone();
        Self {
            id: ObserverId::next(),
            type_name: core::any::type_name::<O>(),
            type_id: TypeId::of::<O>(),
            me,
            keep_alive: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            close_guard: AtomicBool::new(false),
            close_pending: AtomicBool::new(false),
            propagation: AtomicUsize::new(0),
            drained: Event::new(),
            finished: Latch::new(),
        }
    }

    /// Identity of the owning observer.
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Full type name of the owning observer.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without module path or generics.
    pub fn short_type_name(&self) -> &'static str {
        short_name(self.type_name)
    }

    /// Concrete type of the owning observer.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Weak reference to the owning observer.
    pub fn weak_self(&self) -> Weak<dyn Any + Send + Sync> {
        self.me.clone()
    }

    /// Whether a scope that bound this observer leaves it open on exit.
    pub fn keep_alive(&self) -> bool {
        self.keep_alive.load(Ordering::Acquire)
    }

    pub fn set_keep_alive(&self, keep_alive: bool) {
        self.keep_alive.store(keep_alive, Ordering::Release);
    }

    /// `true` once `aclose` was entered.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// `true` once a close was requested or entered.
    pub fn is_closing(&self) -> bool {
        self.close_guard.load(Ordering::Acquire) || self.is_closed()
    }

    /// `true` once the close hook returned.
    pub fn is_finished(&self) -> bool {
        self.finished.is_settled()
    }

    /// Number of `asend`/`athrow` calls currently inside their hooks.
    pub fn propagation_count(&self) -> usize {
        self.propagation.load(Ordering::Acquire)
    }

    /// Requests a close once in-flight propagations drain.
    ///
    /// New `asend`/`athrow` calls are rejected from now on.
    pub fn request_close(&self) {
        self.close_guard.store(true, Ordering::Release);
        self.close_pending.store(true, Ordering::Release);
    }

    /// Waits until the owning observer is fully closed.
    pub async fn join(&self) {
        // The finished latch is only ever opened.
        let _ = self.finished.wait().await;
    }

    pub(crate) fn accepts(&self) -> bool {
        !self.is_closing()
    }

    /// Counts one propagation. `abandoned` runs when the guard is dropped
    /// without [`finish`](PropagationGuard::finish) and a deferred close is due.
    pub(crate) fn enter(&self, abandoned: fn(&ObserverCore)) -> PropagationGuard<'_> {
        self.propagation.fetch_add(1, Ordering::AcqRel);
        PropagationGuard {
            core: self,
            abandoned,
            released: false,
        }
    }

    /// Open → Draining. Returns `false` if the close already started.
    pub(crate) fn begin_close(&self) -> bool {
        self.close_guard.store(true, Ordering::Release);
        self.close_pending.store(false, Ordering::Release);
        !self.closed.swap(true, Ordering::AcqRel)
    }

    pub(crate) async fn drained(&self) {
        loop {
            if self.propagation_count() == 0 {
                return;
            }

            let listener = self.drained.listen();
            if self.propagation_count() == 0 {
                return;
            }
            listener.await;
        }
    }

    /// Draining → Closed.
    pub(crate) fn finish_close(&self) {
        self.finished.open();
    }

    /// Releases one propagation. Returns `true` when a deferred close is now
    /// due.
    fn release(&self) -> bool {
        let remaining = self.propagation.fetch_sub(1, Ordering::AcqRel) - 1;
        if remaining == 0 {
            self.drained.notify(usize::MAX);
        }
        remaining == 0 && self.close_pending.swap(false, Ordering::AcqRel) && !self.is_closed()
    }
}

impl core::fmt::Debug for ObserverCore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverCore")
            .field("id", &self.id)
            .field("type", &self.short_type_name())
            .field("closed", &self.is_closed())
            .field("closing", &self.is_closing())
            .field("keep_alive", &self.keep_alive())
            .field("propagation", &self.propagation_count())
            .finish()
    }
}

/// Counts one propagation for as long as it lives.
///
/// Dropping the guard (including when the propagating future is cancelled)
/// releases the count, so `aclose` can never wait on a propagation that no
/// longer exists. If that drop leaves a deferred close due, the guard hands it
/// to its `abandoned` hook, since nobody is left to await it.
pub(crate) struct PropagationGuard<'a> {
    core: &'a ObserverCore,
    abandoned: fn(&ObserverCore),
    released: bool,
}

impl PropagationGuard<'_> {
    /// Releases the count. Returns `true` when a deferred close is now due and
    /// the caller must run it.
    pub(crate) fn finish(mut self) -> bool {
        self.released = true;
        self.core.release()
    }
}

impl Drop for PropagationGuard<'_> {
    fn drop(&mut self) {
        if !self.released && self.core.release() {
            (self.abandoned)(self.core);
        }
    }
}
