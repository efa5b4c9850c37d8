// Copyright (c) 2025 - Cowboy AI, Inc.
//! Channel Trait - Base abstraction for push streams
//!
//! A `Channel<A, R>` is anything that can be subscribed to with a
//! [`Continuation`] and hands back an [`Activity`] to stop the delivery.
//!
//! # Type Hierarchy
//!
//! ```text
//! Channel<A, R>
//!   ├── Observable<A, R>  (immutable subscription recipe)
//!   ├── Wire<A, R>        (multicast hub)
//!   └── Behavior<A, R>    (multicast hub with a current value)
//! ```
//!
//! Operators accept any `Channel` and always produce an `Observable`.

use super::activity::Activity;
use super::continuation::Continuation;
use super::observable::Observable;

/// Something that delivers values of type `A` to a continuation returning `R`
pub trait Channel<A, R = ()> {
    /// Attach a canonical continuation and start delivery
    fn connect(&self, continuation: Continuation<A, R>) -> Activity;

    /// Attach a closure or continuation and start delivery
    ///
    /// The returned `Activity` is the caller's cancellation handle.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let activity = pure(1).subscribe(|x: i32| println!("{x}"));
    /// activity.finish();
    /// ```
    fn subscribe<K>(&self, continuation: K) -> Activity
    where
        K: Into<Continuation<A, R>>,
        Self: Sized,
    {
        self.connect(continuation.into())
    }

    /// View this channel as a plain `Observable`
    fn observe(self) -> Observable<A, R>
    where
        Self: Sized + Send + Sync + 'static,
        A: 'static,
        R: 'static,
    {
        Observable::new(move |continuation| self.connect(continuation))
    }
}
