// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::callback::Callback;
use crate::logging::report_unhandled;
use crate::namespace::Namespace;
use crate::observer::{Flow, ObserverBehavior};
use crate::observer_core::ObserverCore;
use async_trait::async_trait;
use core::future::Future;
use reflux_error::{RefluxError, Result};
use std::sync::Arc;

/// An observer assembled from callbacks.
///
/// Missing callbacks are no-ops, except `athrow`: without a callback, errors
/// are reported through the logging layer and the observer stays open. An
/// `athrow` callback that fails closes the observer.
///
/// ```
/// use reflux_core::{AnonymousObserver, Observer};
///
/// # async fn example() -> reflux_core::Result<()> {
/// let observer = AnonymousObserver::builder()
///     .asend(|value: i32| {
///         assert_eq!(value, 42);
///         Ok(())
///     })
///     .build();
///
/// observer.asend(42, None).await?;
/// observer.aclose().await;
/// # Ok(())
/// # }
/// ```
pub struct AnonymousObserver<T> {
    core: ObserverCore,
    on_asend: Option<Callback<T, Result<()>>>,
    on_athrow: Option<Callback<RefluxError, Result<()>>>,
    on_aclose: Option<Callback<(), Result<()>>>,
}

impl<T: Send + 'static> AnonymousObserver<T> {
    pub fn builder() -> AnonymousObserverBuilder<T> {
        AnonymousObserverBuilder {
            on_asend: None,
            on_athrow: None,
            on_aclose: None,
            keep_alive: false,
        }
    }
}

/// Builder for [`AnonymousObserver`].
pub struct AnonymousObserverBuilder<T> {
    on_asend: Option<Callback<T, Result<()>>>,
    on_athrow: Option<Callback<RefluxError, Result<()>>>,
    on_aclose: Option<Callback<(), Result<()>>>,
    keep_alive: bool,
}

impl<T: Send + 'static> AnonymousObserverBuilder<T> {
    pub fn asend<F>(mut self, f: F) -> Self
    where
        F: Fn(T) -> Result<()> + Send + Sync + 'static,
    {
        self.on_asend = Some(Callback::plain(f));
        self
    }

    pub fn asend_async<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_asend = Some(Callback::from_async(f));
        self
    }

    pub fn athrow<F>(mut self, f: F) -> Self
    where
        F: Fn(RefluxError) -> Result<()> + Send + Sync + 'static,
    {
        self.on_athrow = Some(Callback::plain(f));
        self
    }

    pub fn athrow_async<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RefluxError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_athrow = Some(Callback::from_async(f));
        self
    }

    pub fn aclose<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.on_aclose = Some(Callback::plain(move |()| f()));
        self
    }

    pub fn aclose_async<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_aclose = Some(Callback::from_async(move |()| f()));
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn build(self) -> Arc<AnonymousObserver<T>> {
        let observer = Arc::new_cyclic(|me| AnonymousObserver {
            core: ObserverCore::new(me),
            on_asend: self.on_asend,
            on_athrow: self.on_athrow,
            on_aclose: self.on_aclose,
        });
        observer.core.set_keep_alive(self.keep_alive);
        observer
    }
}

#[async_trait]
impl<T: Send + 'static> ObserverBehavior<T> for AnonymousObserver<T> {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    async fn on_asend(&self, value: T, _ns: Namespace) -> Result<Flow> {
        if let Some(callback) = &self.on_asend {
            callback.call(value).await?;
        }
        Ok(Flow::Continue)
    }

    async fn on_athrow(&self, error: RefluxError, _ns: Namespace) -> Result<Flow> {
        match &self.on_athrow {
            Some(callback) => callback.call(error).await.map(|()| Flow::Continue),
            None => {
                report_unhandled(&error, self.core.short_type_name());
                Ok(Flow::Continue)
            }
        }
    }

    async fn on_aclose(&self) -> Result<()> {
        match &self.on_aclose {
            Some(callback) => callback.call(()).await,
            None => Ok(()),
        }
    }
}
