// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One-shot signal that is either opened or rejected exactly once.
//!
//! A [`Latch`] replaces the "future used as a signal" pattern: a single-subscriber
//! stream holds deliveries on its latch until an observer binds, and every observer
//! opens a latch once it is fully closed so callers can wait for completion.

use core::sync::atomic::{AtomicU8, Ordering};
use event_listener::Event;
use reflux_error::{RefluxError, Result};

const PENDING: u8 = 0;
const OPEN: u8 = 1;
const REJECTED: u8 = 2;

/// Observable state of a [`Latch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    /// Neither opened nor rejected yet
    Pending,
    /// Opened: waiters proceed
    Open,
    /// Rejected: waiters fail with [`RefluxError::ObserverClosed`]
    Rejected,
}

/// A one-shot, multi-waiter gate.
///
/// Transitions only happen out of [`LatchState::Pending`]; later calls to
/// [`open`](Latch::open) or [`reject`](Latch::reject) are ignored and report
/// `false`.
#[derive(Debug, Default)]
pub struct Latch {
    state: AtomicU8,
    event: Event,
}

impl Latch {
    /// Creates a pending latch.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
            event: Event::new(),
        }
    }

    /// Opens the latch. Returns `false` if it was already settled.
    pub fn open(&self) -> bool {
        self.settle(OPEN)
    }

    /// Rejects the latch. Returns `false` if it was already settled.
    pub fn reject(&self) -> bool {
        self.settle(REJECTED)
    }

    /// Current state (non-blocking).
    pub fn state(&self) -> LatchState {
        match self.state.load(Ordering::Acquire) {
            PENDING => LatchState::Pending,
            OPEN => LatchState::Open,
            _ => LatchState::Rejected,
        }
    }

    /// Returns `true` once the latch left the pending state.
    pub fn is_settled(&self) -> bool {
        self.state() != LatchState::Pending
    }

    /// Waits until the latch is settled.
    ///
    /// # Errors
    ///
    /// Returns [`RefluxError::ObserverClosed`] if the latch was rejected.
    pub async fn wait(&self) -> Result<()> {
        loop {
            match self.state() {
                LatchState::Open => return Ok(()),
                LatchState::Rejected => return Err(RefluxError::ObserverClosed),
                LatchState::Pending => {}
            }

            let listener = self.event.listen();
            if self.is_settled() {
                continue;
            }
            listener.await;
        }
    }

    fn settle(&self, to: u8) -> bool {
        let settled = self
            .state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if settled {
            self.event.notify(usize::MAX);
        }
        settled
    }
}
