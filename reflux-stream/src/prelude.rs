// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude re-exporting the constructors and traits pipelines are built from.
//!
//! ```
//! use reflux_stream::prelude::*;
//!
//! let odd_squares = pipe(from_iterable(0..10)) | filter(|x: &i32| x % 2 == 1) | map(|x: i32| x * x);
//! # let _ = odd_squares;
//! ```

pub use crate::assert_that::assert_that;
pub use crate::concat::concat;
pub use crate::extremum::{max, min};
pub use crate::filter::{filter, filter_async, filter_indexed};
pub use crate::map::{map, map_async, map_indexed, try_map};
pub use crate::multi_stream::MultiStream;
pub use crate::pipe::{pipe, sink, IntoSource, Pipe, Sink, Transformer};
pub use crate::single_stream::{Operator, SingleStream};
pub use crate::skip::skip;
pub use crate::sources::{empty, from_iterable, from_stream, never, unit, unit_from};
pub use crate::stop_if::stop_if;
pub use crate::take::take;

pub use reflux_core::{Observable, Observer};
