// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core contract of Reflux: observers, observables, namespaces and the
//! lifecycle every node shares.
//!
//! Concrete streams and sources live in `reflux-stream`; this crate only defines
//! the protocol they speak and the primitives they are built from.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
pub mod logging;

pub mod anonymous;
pub mod callback;
pub mod cancellation_token;
pub mod latch;
pub mod namespace;
pub mod observable;
pub mod observe;
pub mod observer;
pub mod observer_core;
pub mod task;

pub use self::anonymous::{AnonymousObserver, AnonymousObserverBuilder};
pub use self::callback::{Callback, Predicate, Verdict};
pub use self::cancellation_token::CancellationToken;
pub use self::latch::{Latch, LatchState};
pub use self::logging::report_unhandled;
pub use self::namespace::{Action, Chain, Lookup, Namespace};
pub use self::observable::Observable;
pub use self::observe::{observe, subscribe, unsubscribe, Observation, Observe};
pub use self::observer::{Flow, Observer, ObserverBehavior, ObserverId};
pub use self::observer_core::ObserverCore;
pub use self::task::{WorkerTask, STOP_GRACE};

pub use async_trait::async_trait;
pub use reflux_error::{IntoRefluxError, RefluxError, Result, ResultExt};
