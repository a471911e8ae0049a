// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! User functions that may be plain or asynchronous.
//!
//! Operators and anonymous observers accept either shape; the variant decides
//! at call time whether there is anything to await.

use core::future::Future;
use futures::future::{self, BoxFuture, Either, Ready};
use reflux_error::Result;

type PlainFn<A, R> = Box<dyn Fn(A) -> R + Send + Sync>;
type AsyncFn<A, R> = Box<dyn Fn(A) -> BoxFuture<'static, R> + Send + Sync>;

/// A callback taking `A` and producing `R`, directly or through a future.
pub enum Callback<A, R> {
    Plain(PlainFn<A, R>),
    Async(AsyncFn<A, R>),
}

impl<A, R> Callback<A, R> {
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::Plain(Box::new(f))
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self::Async(Box::new(move |arg| Box::pin(f(arg))))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// Invokes the callback, awaiting it if it is asynchronous.
    pub async fn call(&self, arg: A) -> R {
        match self {
            Self::Plain(f) => f(arg),
            Self::Async(f) => f(arg).await,
        }
    }
}

impl<A, R> core::fmt::Debug for Callback<A, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(if self.is_async() {
            "Callback::Async"
        } else {
            "Callback::Plain"
        })
    }
}

type PlainPredicate<T> = Box<dyn Fn(&T, usize) -> Result<bool> + Send + Sync>;
type AsyncPredicate<T> = Box<dyn Fn(&T, usize) -> BoxFuture<'static, Result<bool>> + Send + Sync>;

/// Future returned by [`Predicate::test`].
pub type Verdict = Either<Ready<Result<bool>>, BoxFuture<'static, Result<bool>>>;

/// A test over a value and its zero-based index in the stream.
///
/// The predicate only borrows the value while it is being called; an
/// asynchronous predicate must copy out what its future needs.
pub enum Predicate<T> {
    Plain(PlainPredicate<T>),
    Async(AsyncPredicate<T>),
}

impl<T> Predicate<T> {
    /// An infallible test on the value alone.
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::Plain(Box::new(move |value, _| Ok(f(value))))
    }

    /// An infallible test on the value and its index.
    pub fn indexed<F>(f: F) -> Self
    where
        F: Fn(&T, usize) -> bool + Send + Sync + 'static,
    {
        Self::Plain(Box::new(move |value, index| Ok(f(value, index))))
    }

    /// A test that may fail; the failure goes down the error channel.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&T) -> Result<bool> + Send + Sync + 'static,
    {
        Self::Plain(Box::new(move |value, _| f(value)))
    }

    /// An asynchronous test on the value.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        Self::Async(Box::new(move |value, _| Box::pin(f(value))))
    }

    /// Starts the test. The returned future does not borrow `value`.
    pub fn test(&self, value: &T, index: usize) -> Verdict {
        match self {
            Self::Plain(f) => Either::Left(future::ready(f(value, index))),
            Self::Async(f) => Either::Right(f(value, index)),
        }
    }
}

impl<T> core::fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Plain(_) => "Predicate::Plain",
            Self::Async(_) => "Predicate::Async",
        })
    }
}
