// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Reflux
//!
//! An async reactive dataflow library. Values and errors are pushed from
//! sources through chains of transformers to observers, and every delivery
//! carries a namespace recording where it came from.
//!
//! ## Overview
//!
//! - **Observers** receive `asend` / `athrow` / `aclose`. Closing waits for
//!   in-flight deliveries and is idempotent.
//! - **Streams** are observers that are also observables:
//!   [`SingleStream`](reflux_stream::SingleStream) (cold, one observer) and
//!   [`MultiStream`](reflux_stream::MultiStream) (hot fan-out).
//! - **Operators** (`map`, `filter`, `take`, ...) are single streams carrying
//!   a transform.
//! - **Pipes** compose them: `pipe(source) | op | op`, then `.sink(observer)`.
//! - **Terminal observers** bring results back: [`consume`](reflux_exec::consume)
//!   and [`to_stream`](reflux_exec::to_stream).
//!
//! ## Quick Start
//!
//! ```rust
//! use reflux::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> reflux::Result<()> {
//! let largest_odd_square =
//!     consume(pipe(from_iterable(0..10)) | filter(|x: &i32| x % 2 == 1) | map(|x: i32| x * x) | max())
//!         .await?;
//!
//! assert_eq!(largest_odd_square, 81);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `reflux-core` | observer protocol, namespaces, `observe` scopes |
//! | `reflux-error` | [`RefluxError`] |
//! | `reflux-stream` | streams, sources, operators, pipes |
//! | `reflux-exec` | consumers and pull-based iteration |

pub use reflux_core as core;
pub use reflux_exec as exec;
pub use reflux_stream as stream;

pub use reflux_core::{
    observe, AnonymousObserver, Namespace, Observable, Observer, ObserverBehavior, ObserverCore,
};
pub use reflux_error::{RefluxError, Result};
pub use reflux_exec::{consume, to_stream};
pub use reflux_stream::{pipe, sink, MultiStream, SingleStream};

/// Prelude module for convenient imports
pub mod prelude {
    pub use reflux_core::{
        observe, Action, AnonymousObserver, Flow, Lookup, Namespace, Observable, Observer,
        ObserverBehavior, ObserverCore,
    };
    pub use reflux_error::{RefluxError, Result};
    pub use reflux_exec::{consume, to_stream, Consumer, IteratorObserver};
    pub use reflux_stream::prelude::*;
}
