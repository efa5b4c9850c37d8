// Copyright (c) 2025 - Cowboy AI, Inc.
//! Functional Reactive Programming (FRP) Streams
//!
//! This module provides push-based streams in continuation-passing style.
//! A stream is a recipe that, given a continuation, starts delivering
//! values to it and hands back a handle to stop.
//!
//! # Core Concepts
//!
//! ## Continuation<A, R>
//!
//! What happens when a value arrives. Called with each value; its result
//! goes back to the producer.
//!
//! ## Activity
//!
//! An idempotent cancellation handle returned by every `subscribe`.
//!
//! ## Observable<A, R>
//!
//! An immutable stream recipe. Built from primitives (`pure`, `each`,
//! `keep`, `shift`, `par`) and transformed by combinators (`map`,
//! `filter`, `join`, `then`, `prune`).
//!
//! ```text
//! Time: ────────────────────────────→
//! Value:      ●       ●   ●       ●
//! ```
//!
//! ## Wire<A, R> and Behavior<A, R>
//!
//! Long-lived multicast points. A `Wire` forwards whatever is pushed into
//! it; a `Behavior` also remembers the latest value and replays it to each
//! new subscriber.
//!
//! ```text
//! Time: ────────────────────────────→
//! Value:  ≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈
//! ```
//!
//! # Scheduling
//!
//! Everything runs on the ambient Tokio runtime. `pure`, `shift` and the
//! combinators deliver synchronously within the calling turn; `each`,
//! `par`, `keep`, `tick` and `from_stream` defer their work to a later
//! turn, so the caller always holds its `Activity` before they emit.
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_reactive::frp::*;
//!
//! let status: Behavior<&str> = Behavior::new("booting");
//!
//! let activity = status
//!     .clone()
//!     .filter(|s, _| *s != "booting")
//!     .subscribe(|s: &str| println!("status: {s}"));
//!
//! status.next("ready");
//! activity.finish();
//!
//! let first = reset(each(vec![3, 2, 1])).await;
//! assert_eq!(first, 3);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

pub mod activity;
pub mod behavior;
pub mod channel;
pub mod combinators;
pub mod continuation;
pub mod observable;
mod scheduler;
pub mod wire;

pub use activity::{Activity, Teardown};
pub use behavior::Behavior;
pub use channel::Channel;
pub use combinators::*;
pub use continuation::{Continuation, Observer};
pub use observable::{
    each, from_stream, keep, keep_ok, par, pure, shift, tick, Observable, TickConfig,
};
pub use wire::Wire;

/// Wall-clock arrival time of a value
pub type Time = DateTime<Utc>;

/// A value paired with the time it arrived
pub type Occurrence<T> = (Time, T);

/// Lock a mutex, recovering the data if a panicking continuation poisoned it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
