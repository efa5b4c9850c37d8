// Copyright (c) 2025 - Cowboy AI, Inc.
//! Behavior - A wire that remembers its current value
//!
//! A `Behavior<A, R>` always has a value. New subscribers receive it
//! immediately, inside `subscribe`, and then every later value pushed
//! through `next`.
//!
//! ```text
//! Time:   ────────────────────────────→
//! Value:  ▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬▬
//!             ↑ subscribe sees the current value
//! ```
//!
//! The value only changes through the behavior's own `next`. It is stored
//! before the broadcast starts, so a handler that subscribes during a
//! broadcast is replayed the value being broadcast.
//!
//! # Examples
//!
//! ```rust,ignore
//! let temperature = Behavior::new(20);
//! let _activity = temperature.subscribe(|t: i32| println!("now {t}"));
//! // prints "now 20"
//! temperature.next(21);
//! // prints "now 21"
//! assert_eq!(temperature.value(), 21);
//! ```

use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex};

use tracing::warn;

use super::activity::Activity;
use super::channel::Channel;
use super::continuation::{Continuation, Observer};
use super::lock;
use super::wire::Wire;
use crate::errors::{StreamError, StreamResult};

/// Multicast hub holding a current value
pub struct Behavior<A, R = ()> {
    wire: Wire<A, R>,
    value: Arc<Mutex<A>>,
}

impl<A: Clone, R> Behavior<A, R> {
    /// Create a live behavior holding `initial`
    pub fn new(initial: A) -> Self {
        Self {
            wire: Wire::new(),
            value: Arc::new(Mutex::new(initial)),
        }
    }

    /// The most recently accepted value
    pub fn value(&self) -> A {
        lock(&self.value).clone()
    }

    /// Whether `finish` has been called
    pub fn is_done(&self) -> bool {
        self.wire.is_done()
    }

    /// Store `value` and broadcast it
    ///
    /// Rejected once the behavior is done: the stored value stays as it
    /// was and nothing is broadcast.
    pub fn next(&self, value: A) {
        if self.wire.is_done() {
            return;
        }
        *lock(&self.value) = value.clone();
        self.wire.next(value);
    }

    /// Store and broadcast `value`, reporting a finished behavior as an error
    pub fn try_next(&self, value: A) -> StreamResult<()> {
        if self.wire.is_done() {
            warn!(wire_id = %self.wire.id(), "Value offered to finished behavior");
            return Err(StreamError::Finished);
        }
        self.next(value);
        Ok(())
    }

    /// Terminate: drop every subscriber and freeze the value
    pub fn finish(&self) {
        self.wire.finish();
    }

    /// Feed this behavior from a pipeline
    pub fn continuation(&self) -> Continuation<A>
    where
        A: Send + 'static,
        R: 'static,
    {
        let behavior = self.clone();
        Continuation::new(move |value| behavior.next(value))
    }
}

impl<A: Clone + 'static, R: 'static> Channel<A, R> for Behavior<A, R> {
    fn connect(&self, continuation: Continuation<A, R>) -> Activity {
        if self.wire.is_done() {
            return Activity::noop();
        }
        let activity = self.wire.connect(continuation.clone());
        continuation.next(self.value());
        activity
    }
}

impl<A: Clone + Send, R> Observer<A> for Behavior<A, R> {
    fn next(&self, value: A) {
        Behavior::next(self, value)
    }
}

impl<A, R> Clone for Behavior<A, R> {
    fn clone(&self) -> Self {
        Self {
            wire: self.wire.clone(),
            value: Arc::clone(&self.value),
        }
    }
}

impl<A: Debug, R> Debug for Behavior<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("value", &*lock(&self.value))
            .field("wire", &self.wire)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frp::testing::recorder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_subscribe_replays_current_value() {
        let behavior: Behavior<i32> = Behavior::new(5);
        let (k, seen) = recorder();
        let _activity = behavior.subscribe(k);

        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    #[test]
    fn test_initial_value_precedes_updates() {
        let behavior: Behavior<i32> = Behavior::new(0);
        let (k, seen) = recorder();
        let _activity = behavior.subscribe(k);

        behavior.next(1);
        behavior.next(2);

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(behavior.value(), 2);
    }

    #[test]
    fn test_next_after_finish_is_rejected() {
        let behavior: Behavior<i32> = Behavior::new(1);
        let (k, seen) = recorder();
        let _activity = behavior.subscribe(k);

        behavior.finish();
        behavior.next(9);

        assert_eq!(behavior.value(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(behavior.try_next(9), Err(StreamError::Finished));
    }

    #[test]
    fn test_finished_behavior_is_inert() {
        let behavior: Behavior<i32> = Behavior::new(1);
        behavior.finish();
        let (k, seen) = recorder();
        behavior.subscribe(k).finish();

        assert!(seen.lock().unwrap().is_empty());
        assert!(behavior.is_done());
    }

    #[test]
    fn test_value_is_stored_before_broadcast() {
        let behavior: Behavior<i32> = Behavior::new(0);
        let (late, late_seen) = recorder();
        let held = Arc::new(Mutex::new(Vec::new()));

        let source = behavior.clone();
        let keep = Arc::clone(&held);
        let _a = behavior.subscribe(move |x: i32| {
            if x == 1 {
                keep.lock().unwrap().push(source.subscribe(late.clone()));
            }
        });

        behavior.next(1);

        assert_eq!(*late_seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_unsubscribed_continuation_stops_receiving() {
        let behavior: Behavior<&str> = Behavior::new("idle");
        let (k, seen) = recorder();
        let activity = behavior.subscribe(k);

        behavior.next("busy");
        activity.finish();
        behavior.next("idle");

        assert_eq!(*seen.lock().unwrap(), vec!["idle", "busy"]);
    }
}
