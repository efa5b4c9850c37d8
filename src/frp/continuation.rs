// Copyright (c) 2025 - Cowboy AI, Inc.
//! Continuation - What happens when a value arrives
//!
//! A `Continuation<A, R>` is the single capability a stream talks to: it is
//! handed each delivered value and returns a result to whoever delivered it.
//! Most streams ignore the result, but `shift` hands it back to the producer,
//! so a producer can observe what the downstream did with every value.
//!
//! Two shapes are accepted at the `subscribe` boundary:
//!
//! - a plain closure `Fn(A) -> R`, via `From`
//! - an object implementing [`Observer`], via [`Continuation::from_observer`]
//!
//! Both are adapted once into the same canonical type; nothing past the
//! boundary knows which shape the caller supplied.
//!
//! ```rust,ignore
//! let printer: Continuation<i32> = Continuation::new(|x| println!("{x}"));
//! printer.next(42);
//! ```

use std::fmt;
use std::sync::Arc;

/// An object that can receive values
///
/// Implemented by [`Wire`](super::Wire) and [`Behavior`](super::Behavior),
/// which lets a pipeline feed straight into a broadcast point.
pub trait Observer<A, R = ()>: Send + Sync {
    /// Receive one value
    fn next(&self, value: A) -> R;
}

/// Canonical callback invoked with each delivered value
pub struct Continuation<A, R = ()> {
    inner: Arc<dyn Fn(A) -> R + Send + Sync>,
}

impl<A, R> Continuation<A, R> {
    /// Wrap a plain function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Adapt an object exposing `next` into a continuation
    pub fn from_observer<O>(observer: O) -> Self
    where
        O: Observer<A, R> + 'static,
    {
        Self::new(move |value| observer.next(value))
    }

    /// Deliver a value and return the continuation's result
    pub fn next(&self, value: A) -> R {
        (self.inner)(value)
    }

    /// True when both handles wrap the same function
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A, R> Clone for Continuation<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R> fmt::Debug for Continuation<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Continuation<{}, {}>",
            std::any::type_name::<A>(),
            std::any::type_name::<R>()
        )
    }
}

impl<A, R, F> From<F> for Continuation<A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

impl<A, R> Observer<A, R> for Continuation<A, R> {
    fn next(&self, value: A) -> R {
        Continuation::next(self, value)
    }
}
