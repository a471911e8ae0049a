// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Origin records threaded through every `asend`/`athrow` call.
//!
//! Each observer that handles a call wraps the namespace it received in a new hop
//! naming itself and the action, so a node deep in a pipeline can ask where a value
//! came from, and a node that calls back into itself (an operator redirecting its
//! own `asend` failure into `athrow`) can recognise the re-entry.
//!
//! Producers are referenced weakly: a namespace never keeps a node alive, and a
//! dead producer simply stops matching type queries.
//!
//! # Example
//!
//! ```
//! use reflux_core::{Action, Lookup, Namespace};
//!
//! fn came_from_a_send(ns: &Namespace) -> bool {
//!     ns.previous()
//!         .is_some_and(|previous| previous.action() == Action::Asend)
//! }
//!
//! fn passed_through_multistream(ns: &Namespace) -> bool {
//!     ns.contains("MultiStream")
//! }
//! # let _ = (came_from_a_send, passed_through_multistream, Lookup::Name("asend"));
//! ```

use crate::observer::ObserverId;
use crate::observer_core::ObserverCore;
use core::any::{Any, TypeId};
use core::fmt;
use std::sync::{Arc, Weak};

/// The protocol call a namespace hop documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// A value delivered through `asend`
    Asend,
    /// An error delivered through `athrow`
    Athrow,
}

impl Action {
    /// The protocol method name, `"asend"` or `"athrow"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asend => "asend",
            Self::Athrow => "athrow",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query for [`Namespace::search`].
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    /// Matches the producer's short type name (`"MultiStream"`), its full type
    /// name, or the action name (`"asend"`, `"athrow"`)
    Name(&'a str),
    /// Matches the producer's concrete type while the producer is still alive
    Type(TypeId),
    /// Matches one specific producer
    Producer(ObserverId),
}

impl Lookup<'static> {
    /// Type query for `O`.
    #[must_use]
    pub fn of<O: Any>() -> Self {
        Self::Type(TypeId::of::<O>())
    }
}

impl<'a> From<&'a str> for Lookup<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<TypeId> for Lookup<'_> {
    fn from(type_id: TypeId) -> Self {
        Self::Type(type_id)
    }
}

impl From<ObserverId> for Lookup<'_> {
    fn from(id: ObserverId) -> Self {
        Self::Producer(id)
    }
}

impl From<Action> for Lookup<'_> {
    fn from(action: Action) -> Self {
        Self::Name(action.as_str())
    }
}

/// An immutable origin record `(producer, action, previous)`.
///
/// Cloning is cheap; hops are shared between the namespaces built on top of them.
#[derive(Clone)]
pub struct Namespace {
    hop: Arc<Hop>,
}

struct Hop {
    producer_type: &'static str,
    producer_type_id: TypeId,
    producer_id: ObserverId,
    action: Action,
    previous: Option<Namespace>,
    producer: Weak<dyn Any + Send + Sync>,
}

impl Namespace {
    /// Records that the observer owning `core` is handling `action`, on behalf
    /// of the caller described by `previous` (`None` for a root hop).
    pub fn new(core: &ObserverCore, action: Action, previous: Option<Namespace>) -> Self {
        Self {
            hop: Arc::new(Hop {
                producer_type: core.type_name(),
                producer_type_id: core.type_id(),
                producer_id: core.id(),
                action,
                previous,
                producer: core.weak_self(),
            }),
        }
    }

    /// The action of this hop.
    #[must_use]
    pub fn action(&self) -> Action {
        self.hop.action
    }

    /// Full type name of the producer, generics included.
    #[must_use]
    pub fn producer_type(&self) -> &'static str {
        self.hop.producer_type
    }

    /// Producer type name without module path or generics.
    #[must_use]
    pub fn short_type_name(&self) -> &'static str {
        short_name(self.hop.producer_type)
    }

    /// Identity of the producer.
    #[must_use]
    pub fn producer_id(&self) -> ObserverId {
        self.hop.producer_id
    }

    /// The hop this one was built on, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&Namespace> {
        self.hop.previous.as_ref()
    }

    /// `true` when this hop has no predecessor.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.hop.previous.is_none()
    }

    /// `true` while the producer is still alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.hop.producer.strong_count() > 0
    }

    /// The producer, if it is still alive and of type `O`.
    #[must_use]
    pub fn producer<O: Any + Send + Sync>(&self) -> Option<Arc<O>> {
        self.hop.producer.upgrade()?.downcast::<O>().ok()
    }

    /// Iterates from this hop to the root.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Number of hops from this one to the root, inclusive.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Finds the first hop, starting with this one, that matches `query`.
    pub fn search<'q>(&self, query: impl Into<Lookup<'q>>) -> Option<&Namespace> {
        let query = query.into();
        self.chain().find(|hop| hop.matches(&query))
    }

    /// `true` when [`search`](Self::search) finds a match.
    pub fn contains<'q>(&self, query: impl Into<Lookup<'q>>) -> bool {
        self.search(query).is_some()
    }

    /// `true` when `id` already handled `action` somewhere along this chain.
    #[must_use]
    pub fn contains_hop(&self, id: ObserverId, action: Action) -> bool {
        self.chain()
            .any(|hop| hop.hop.producer_id == id && hop.hop.action == action)
    }

    fn matches(&self, query: &Lookup<'_>) -> bool {
        match *query {
            Lookup::Name(name) => {
                name == self.short_type_name()
                    || name == self.hop.producer_type
                    || name == self.hop.action.as_str()
            }
            Lookup::Type(type_id) => self.hop.producer_type_id == type_id && self.is_live(),
            Lookup::Producer(id) => self.hop.producer_id == id,
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Namespace[")?;
        for (i, hop) in self.chain().enumerate() {
            if i > 0 {
                f.write_str(" <- ")?;
            }
            write!(f, "{}:{}", hop.short_type_name(), hop.action())?;
        }
        f.write_str("]")
    }
}

/// Iterator over a namespace chain, see [`Namespace::chain`].
pub struct Chain<'a> {
    next: Option<&'a Namespace>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Namespace;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous();
        Some(current)
    }
}

pub(crate) fn short_name(full: &'static str) -> &'static str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}
