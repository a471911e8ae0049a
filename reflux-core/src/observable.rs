// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observer::Observer;
use async_trait::async_trait;
use reflux_error::Result;
use std::sync::Arc;

/// Something observers can be registered with.
///
/// `observe` binds an observer; `dispose` releases that binding. Neither
/// closes the observer: deciding that is the job of the scope that bound it
/// (see [`observe`](crate::observe())).
#[async_trait]
pub trait Observable<T: Send + 'static>: Send + Sync + 'static {
    /// Registers `observer`.
    ///
    /// # Errors
    ///
    /// Implementations reject registrations they cannot accept, e.g. a second
    /// observer on a single-subscriber stream.
    async fn observe(&self, observer: Arc<dyn Observer<T>>) -> Result<()>;

    /// Releases a registration made with [`observe`](Self::observe).
    ///
    /// Disposing an observer that is not registered logs a warning and succeeds.
    async fn dispose(&self, observer: &Arc<dyn Observer<T>>) -> Result<()>;
}
