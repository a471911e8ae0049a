// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Scoped registration of an observer with an observable.
//!
//! The scope owns the decision to close: on exit the observer is disposed from
//! the source and, unless it is kept alive, closed. A failed dispose always
//! closes the observer, since its binding can no longer be trusted.

use crate::observable::Observable;
use crate::observer::Observer;
use core::future::Future;
use reflux_error::Result;
use std::sync::Arc;

/// Registers `observer` with `source`, disposing it again if registration fails.
///
/// # Errors
///
/// Returns the registration error.
pub async fn subscribe<T: Send + 'static>(
    source: &dyn Observable<T>,
    observer: &Arc<dyn Observer<T>>,
) -> Result<()> {
    if let Err(error) = source.observe(observer.clone()).await {
        if let Err(dispose_error) = source.dispose(observer).await {
            crate::debug!(
                "dispose after failed observe of {} also failed: {}",
                observer.id(),
                dispose_error
            );
        }
        return Err(error);
    }
    Ok(())
}

/// Disposes `observer` from `source` and closes it unless it is kept alive.
///
/// `keep_alive` overrides the observer's own flag when set.
///
/// # Errors
///
/// Returns the dispose error after closing the observer. A cancelled dispose
/// leaves the keep-alive decision untouched.
pub async fn unsubscribe<T: Send + 'static>(
    source: &dyn Observable<T>,
    observer: &Arc<dyn Observer<T>>,
    keep_alive: Option<bool>,
) -> Result<()> {
    let mut keep_alive = keep_alive.unwrap_or_else(|| observer.keep_alive());

    let disposed = source.dispose(observer).await;
    if let Err(error) = &disposed {
        if !error.is_cancelled() {
            keep_alive = false;
        }
    }

    if !keep_alive && !observer.closed() {
        observer.aclose().await;
    }
    disposed
}

/// Starts a scoped registration of `observer` with `source`.
///
/// ```
/// use reflux_core::{observe, AnonymousObserver, Observable, Observer};
/// use std::sync::Arc;
///
/// # async fn example(source: Arc<dyn Observable<i32>>) -> reflux_core::Result<()> {
/// let printer: Arc<dyn Observer<i32>> = AnonymousObserver::builder()
///     .asend(|value: i32| {
///         println!("{value}");
///         Ok(())
///     })
///     .build();
///
/// observe(source, printer.clone())
///     .scope(|| async {
///         printer.join().await;
///         Ok(())
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
pub fn observe<T: Send + 'static>(
    source: Arc<dyn Observable<T>>,
    observer: Arc<dyn Observer<T>>,
) -> Observe<T> {
    Observe {
        source,
        observer,
        keep_alive: None,
    }
}

/// Builder returned by [`observe`].
#[must_use = "an observation does nothing until opened"]
pub struct Observe<T: Send + 'static> {
    source: Arc<dyn Observable<T>>,
    observer: Arc<dyn Observer<T>>,
    keep_alive: Option<bool>,
}

impl<T: Send + 'static> Observe<T> {
    /// Overrides the observer's keep-alive flag for this scope.
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    /// Registers the observer and returns the open observation.
    ///
    /// # Errors
    ///
    /// Returns the registration error; the observer was disposed again.
    pub async fn open(self) -> Result<Observation<T>> {
        subscribe(&*self.source, &self.observer).await?;
        Ok(Observation {
            source: self.source,
            observer: self.observer,
            keep_alive: self.keep_alive,
            released: false,
        })
    }

    /// Runs `body` while the observer is registered.
    ///
    /// The scope is exited on every path, including when the body fails.
    ///
    /// # Errors
    ///
    /// Registration errors, then errors of the body, then exit errors.
    pub async fn scope<F, Fut, R>(self, body: F) -> Result<R>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let observation = self.open().await?;
        let outcome = body().await;
        let exited = observation.close().await;
        match outcome {
            Ok(value) => exited.map(|()| value),
            Err(error) => {
                if let Err(exit_error) = exited {
                    crate::debug!("scope exit failed after body error: {}", exit_error);
                }
                Err(error)
            }
        }
    }
}

/// An open registration. Close it with [`close`](Observation::close).
///
/// Dropping an unclosed observation inside a tokio runtime disposes it in the
/// background.
pub struct Observation<T: Send + 'static> {
    source: Arc<dyn Observable<T>>,
    observer: Arc<dyn Observer<T>>,
    keep_alive: Option<bool>,
    released: bool,
}

impl<T: Send + 'static> Observation<T> {
    pub fn observer(&self) -> &Arc<dyn Observer<T>> {
        &self.observer
    }

    pub fn source(&self) -> &Arc<dyn Observable<T>> {
        &self.source
    }

    /// Exits the scope: dispose, then close unless kept alive.
    ///
    /// # Errors
    ///
    /// Returns the dispose error, after the observer was closed.
    pub async fn close(mut self) -> Result<()> {
        self.released = true;
        unsubscribe(&*self.source, &self.observer, self.keep_alive).await
    }
}

impl<T: Send + 'static> Drop for Observation<T> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        crate::warn!(
            "observation of {} dropped without close, disposing in the background",
            self.observer.id()
        );
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let source = self.source.clone();
            let observer = self.observer.clone();
            let keep_alive = self.keep_alive;
            handle.spawn(async move {
                if let Err(error) = unsubscribe(&*source, &observer, keep_alive).await {
                    crate::debug!("background dispose of {} failed: {}", observer.id(), error);
                }
            });
        }
    }
}
