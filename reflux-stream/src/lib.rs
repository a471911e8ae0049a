// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Streams, sources and operators for Reflux pipelines.
//!
//! # Architecture
//!
//! - **[`SingleStream`]**: cold transformer with one observer; deliveries wait
//!   until that observer is bound. Every operator is a `SingleStream` carrying an
//!   [`Operator`].
//! - **[`MultiStream`]**: hot fan-out to any number of observers.
//! - **Sources**: [`unit`], [`empty`], [`never`], [`from_iterable`],
//!   [`from_stream`] push from a worker task per registration.
//! - **[`Pipe`] / [`Sink`]**: `pipe(source) | transformer | ...` composes;
//!   `.sink(observer)` binds the final observer and is awaitable.
//!
//! ## Operators
//!
//! | Function | Operator | Behavior |
//! |----------|----------|----------|
//! | [`map`], [`try_map`], [`map_indexed`], [`map_async`] | [`Map`] | transform values |
//! | [`filter`], [`filter_indexed`], [`filter_async`] | [`Filter`] | keep matching values |
//! | [`assert_that`] | [`Assert`] | raise an error for failing values |
//! | [`stop_if`] | [`Stop`] | close on the first match |
//! | [`take`] | [`Take`] | first `n`, or last `\|n\|` on close |
//! | [`skip`] | [`Skip`] | drop first `n`, or last `\|n\|` |
//! | [`max`], [`min`] | [`Extremum`] | emit the extremum on close |
//! | [`concat`] | [`Concat`] | merge several sources |
//!
//! # Example
//!
//! ```
//! use reflux_core::AnonymousObserver;
//! use reflux_stream::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> reflux_core::Result<()> {
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let collect = AnonymousObserver::builder()
//!     .asend({
//!         let seen = seen.clone();
//!         move |value: i32| {
//!             seen.lock().unwrap().push(value);
//!             Ok(())
//!         }
//!     })
//!     .build();
//!
//! (pipe(from_iterable(1..=5)) | take(-2)).sink(collect).await?;
//!
//! assert_eq!(*seen.lock().unwrap(), vec![4, 5]);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

mod logging;

pub mod assert_that;
pub mod concat;
pub mod extremum;
pub mod filter;
pub mod map;
pub mod multi_stream;
pub mod pipe;
pub mod prelude;
pub mod single_stream;
pub mod skip;
pub mod sources;
pub mod stop_if;
pub mod take;

pub use self::assert_that::{assert_that, Assert};
pub use self::concat::{concat, Concat};
pub use self::extremum::{max, min, Extremum};
pub use self::filter::{filter, filter_async, filter_indexed, Filter};
pub use self::map::{map, map_async, map_indexed, try_map, Map};
pub use self::multi_stream::MultiStream;
pub use self::pipe::{pipe, sink, IntoSource, Pipe, Sink, Subscription, Transformer};
pub use self::single_stream::{Downstream, Operator, Passthrough, SingleStream};
pub use self::skip::{skip, Skip};
pub use self::sources::{
    empty, from_fallible_stream, from_iterable, from_stream, never, unit, unit_from, Never,
    Source,
};
pub use self::stop_if::{stop_if, Stop};
pub use self::take::{take, Take};
