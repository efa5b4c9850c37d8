// Copyright (c) 2025 - Cowboy AI, Inc.
//! Wire - Multicast broadcast point
//!
//! A `Wire<A, R>` is at once a [`Channel`] (it can be subscribed to), an
//! [`Observer`] (values can be pushed into it) and an activity (it can be
//! finished).
//!
//! # Lifecycle
//!
//! ```text
//! live ──finish()──▶ done
//!  │                  │
//!  ├ subscribe: add   ├ subscribe: inert activity
//!  ├ next: broadcast  ├ next: no-op
//!  └ finish: clear    └ finish: no-op
//! ```
//!
//! Broadcasts iterate over a snapshot of the subscriber list taken before
//! the first delivery. Subscribing or unsubscribing from inside a handler
//! only affects later broadcasts.
//!
//! ```rust,ignore
//! let wire: Wire<i32> = Wire::new();
//! let activity = wire.subscribe(|x: i32| println!("got {x}"));
//! wire.next(1);
//! activity.finish();
//! wire.next(2); // nobody listening
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::activity::Activity;
use super::channel::Channel;
use super::continuation::{Continuation, Observer};
use super::lock;
use crate::errors::{StreamError, StreamResult};

struct WireState<A, R> {
    done: bool,
    next_key: u64,
    subscribers: Vec<(u64, Continuation<A, R>)>,
}

struct WireInner<A, R> {
    id: Uuid,
    state: Mutex<WireState<A, R>>,
}

/// Stateful multicast hub
pub struct Wire<A, R = ()> {
    inner: Arc<WireInner<A, R>>,
}

impl<A, R> Wire<A, R> {
    /// Create a live wire with no subscribers
    pub fn new() -> Self {
        Self {
            inner: Arc::new(WireInner {
                id: Uuid::now_v7(),
                state: Mutex::new(WireState {
                    done: false,
                    next_key: 0,
                    subscribers: Vec::new(),
                }),
            }),
        }
    }

    /// Identifier used in log fields
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Whether `finish` has been called
    pub fn is_done(&self) -> bool {
        lock(&self.inner.state).done
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.state).subscribers.len()
    }

    /// Broadcast `value` to every current subscriber
    ///
    /// A no-op once the wire is done.
    pub fn next(&self, value: A)
    where
        A: Clone,
    {
        let snapshot = {
            let state = lock(&self.inner.state);
            if state.done {
                return;
            }
            state.subscribers.clone()
        };

        trace!(wire_id = %self.inner.id, subscribers = snapshot.len(), "Broadcasting");
        for (_, continuation) in snapshot {
            continuation.next(value.clone());
        }
    }

    /// Broadcast `value`, reporting a finished wire as an error
    pub fn try_next(&self, value: A) -> StreamResult<()>
    where
        A: Clone,
    {
        if self.is_done() {
            warn!(wire_id = %self.inner.id, "Value offered to finished wire");
            return Err(StreamError::Finished);
        }
        self.next(value);
        Ok(())
    }

    /// Terminate the wire: drop every subscriber and refuse new ones
    ///
    /// Idempotent.
    pub fn finish(&self) {
        let dropped = {
            let mut state = lock(&self.inner.state);
            if state.done {
                return;
            }
            state.done = true;
            std::mem::take(&mut state.subscribers)
        };
        debug!(wire_id = %self.inner.id, dropped = dropped.len(), "Wire finished");
    }

    /// Feed this wire from a pipeline: `source.subscribe(wire.continuation())`
    pub fn continuation(&self) -> Continuation<A>
    where
        A: Clone + 'static,
        R: 'static,
    {
        let wire = self.clone();
        Continuation::new(move |value| wire.next(value))
    }

    /// An activity that finishes this wire
    pub fn activity(&self) -> Activity
    where
        A: 'static,
        R: 'static,
    {
        let wire = self.clone();
        Activity::from_fn(move || wire.finish())
    }
}

impl<A: 'static, R: 'static> Channel<A, R> for Wire<A, R> {
    fn connect(&self, continuation: Continuation<A, R>) -> Activity {
        let key = {
            let mut state = lock(&self.inner.state);
            if state.done {
                debug!(wire_id = %self.inner.id, "Subscribe on finished wire ignored");
                return Activity::noop();
            }
            let key = state.next_key;
            state.next_key += 1;
            state.subscribers.push((key, continuation));
            key
        };
        debug!(wire_id = %self.inner.id, key, "Subscriber attached");

        let wire: Weak<WireInner<A, R>> = Arc::downgrade(&self.inner);
        Activity::from_fn(move || {
            let Some(inner) = wire.upgrade() else {
                return;
            };
            let removed = {
                let mut state = lock(&inner.state);
                state
                    .subscribers
                    .iter()
                    .position(|(k, _)| *k == key)
                    .map(|index| state.subscribers.remove(index))
            };
            if removed.is_some() {
                debug!(wire_id = %inner.id, key, "Subscriber detached");
            }
        })
    }
}

impl<A: Clone, R> Observer<A> for Wire<A, R> {
    fn next(&self, value: A) {
        Wire::next(self, value)
    }
}

impl<A, R> Clone for Wire<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R> Default for Wire<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> fmt::Debug for Wire<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Wire")
            .field("id", &self.inner.id)
            .field("done", &state.done)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}
