// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Reflux reactive dataflow library.
//!
//! This crate is meant for development and testing only.
//!
//! # Key Types
//!
//! ## `Recorder<T>`
//!
//! An observer that records everything it receives: values, errors, closes and
//! the namespace attached to each call.
//!
//! ```rust
//! use reflux_core::Observer;
//! use reflux_test_utils::Recorder;
//!
//! # async fn example() -> reflux_core::Result<()> {
//! let recorder = Recorder::<i32>::new();
//! recorder.asend(1, None).await?;
//! recorder.aclose().await;
//!
//! assert_eq!(recorder.values(), vec![1]);
//! assert_eq!(recorder.close_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Fixtures
//!
//! - `Person` - a name and an age, ordered by age
//! - `person_alice()`, `person_bob()`, ... - predefined people
//!
//! # Module Organization
//!
//! - `recorder` - `Recorder<T>` observer
//! - `helpers` - timeout-bounded waits
//! - `person`, `test_data` - fixture types and values

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod person;
pub mod recorder;
pub mod test_data;

pub use helpers::{assert_still_open, settle, wait_closed, wait_for_values, DEFAULT_TIMEOUT_MS};
pub use person::Person;
pub use recorder::Recorder;
