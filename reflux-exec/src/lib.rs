// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal observers that turn a Reflux pipeline back into ordinary async
//! values.
//!
//! - [`consume`] / [`Consumer`]: await the first value (or error) of a source.
//! - [`to_stream`] / [`IteratorObserver`]: pull every delivery as a
//!   `futures::Stream` of `Result<T>`.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

mod logging;

pub mod consumer;
pub mod iterator;

pub use consumer::{consume, Consumer};
pub use iterator::{to_stream, IteratorObserver};
