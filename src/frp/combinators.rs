// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stream Combinators
//!
//! This module provides the operators that turn one stream into another.
//! Every operator is a plain function from a [`Channel`] to a new
//! [`Observable`], built only from the public primitives. Per-pipeline
//! state (emission counters, latches) lives in the closure created for
//! each subscription and is never shared between subscriptions.
//!
//! # Available Combinators
//!
//! - `map` - Transform values, with a per-subscription index
//! - `filter` - Keep values matching a predicate, with the same index
//! - `join` - Flatten a stream of streams
//! - `then` - Flat-map: `join(map(source, f))`
//! - `prune` - Take the first value and cancel the source
//! - `stamp` - Pair each value with its arrival time
//! - `reset` - First value as a future
//! - `reset_timeout` - `reset` bounded by a deadline
//! - `into_stream` - Pull values through a `futures::Stream`
//!
//! The same operators are available as methods through [`ChannelExt`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use cim_reactive::frp::*;
//!
//! let evens = each(vec![1, 2, 3, 4])
//!     .map(|x, _| x * 10)
//!     .filter(|x, _| x % 20 == 0);
//!
//! let first = reset(evens).await;
//! assert_eq!(first, 20);
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures::channel::oneshot;
use futures::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::trace;

use super::activity::Activity;
use super::channel::Channel;
use super::continuation::Continuation;
use super::observable::Observable;
use super::{lock, Occurrence};
use crate::errors::{StreamError, StreamResult};

/// Transform each value with `f(value, index)`
///
/// `index` counts emissions of this subscription, starting at 0.
///
/// # Examples
///
/// ```rust,ignore
/// let labelled = map(each(vec!["a", "b"]), |s, i| format!("{i}:{s}"));
/// // "0:a", "1:b"
/// ```
pub fn map<C, A, B, R, F>(source: C, f: F) -> Observable<B, R>
where
    C: Channel<A, R> + Send + Sync + 'static,
    F: Fn(A, usize) -> B + Send + Sync + 'static,
    A: 'static,
    B: 'static,
    R: 'static,
{
    let f = Arc::new(f);

    Observable::new(move |continuation: Continuation<B, R>| {
        let f = Arc::clone(&f);
        let index = AtomicUsize::new(0);
        source.connect(Continuation::new(move |value| {
            let i = index.fetch_add(1, Ordering::Relaxed);
            continuation.next(f(value, i))
        }))
    })
}

/// Keep values for which `predicate(&value, index)` holds
///
/// Dropped values never reach the downstream continuation; the producer
/// receives `R::default()` for them.
pub fn filter<C, A, R, P>(source: C, predicate: P) -> Observable<A, R>
where
    C: Channel<A, R> + Send + Sync + 'static,
    P: Fn(&A, usize) -> bool + Send + Sync + 'static,
    A: 'static,
    R: Default + 'static,
{
    let predicate = Arc::new(predicate);

    Observable::new(move |continuation: Continuation<A, R>| {
        let predicate = Arc::clone(&predicate);
        let index = AtomicUsize::new(0);
        source.connect(Continuation::new(move |value: A| {
            let i = index.fetch_add(1, Ordering::Relaxed);
            if predicate(&value, i) {
                continuation.next(value)
            } else {
                R::default()
            }
        }))
    })
}

#[derive(Default)]
struct JoinState {
    finished: bool,
    inner: Vec<Activity>,
}

impl JoinState {
    /// Hold `activity` for cancellation, dropping handles with nothing left
    /// to release
    fn track(&mut self, activity: Activity) {
        self.inner.retain(|held| !held.is_spent());
        if !activity.is_spent() {
            self.inner.push(activity);
        }
    }
}

/// Flatten a stream of streams
///
/// Each inner stream is subscribed as soon as it arrives; inner streams
/// run concurrently. Finishing the activity stops the outer stream and
/// every inner stream started so far.
///
/// Inner subscriptions that hold nothing to release (synchronous sources
/// such as `pure`) are not retained. An inner stream that stops emitting
/// on its own but still owns a disposer stays held until the join is
/// finished.
pub fn join<C, S, A, R>(source: C) -> Observable<A, R>
where
    C: Channel<S, R> + Send + Sync + 'static,
    S: Channel<A, R> + 'static,
    A: 'static,
    R: Default + 'static,
{
    Observable::new(move |continuation: Continuation<A, R>| {
        let state = Arc::new(Mutex::new(JoinState::default()));

        let inner_state = Arc::clone(&state);
        let outer = source.connect(Continuation::new(move |stream: S| {
            if lock(&inner_state).finished {
                return R::default();
            }
            let activity = stream.connect(continuation.clone());

            let late = {
                let mut state = lock(&inner_state);
                if state.finished {
                    Some(activity)
                } else {
                    state.track(activity);
                    None
                }
            };
            if let Some(activity) = late {
                activity.finish();
            }
            R::default()
        }));

        Activity::from_fn(move || {
            outer.finish();
            let inner = {
                let mut state = lock(&state);
                state.finished = true;
                std::mem::take(&mut state.inner)
            };
            trace!(inner = inner.len(), "join cancelled");
            for activity in inner {
                activity.finish();
            }
        })
    })
}

/// Map each value to a stream and flatten: `join(map(source, f))`
pub fn then<C, A, S, B, R, F>(source: C, f: F) -> Observable<B, R>
where
    C: Channel<A, R> + Send + Sync + 'static,
    F: Fn(A, usize) -> S + Send + Sync + 'static,
    S: Channel<B, R> + 'static,
    A: 'static,
    B: 'static,
    R: Default + 'static,
{
    join(map(source, f))
}

#[derive(Default)]
struct PruneState {
    fired: AtomicBool,
    source: Mutex<Option<Activity>>,
}

impl PruneState {
    fn cancel_source(&self) {
        let source = lock(&self.source).take();
        if let Some(activity) = source {
            activity.finish();
        }
    }
}

/// Deliver only the first value, cancelling the source before it is forwarded
///
/// A source that emits synchronously inside `subscribe` cannot be
/// cancelled before its activity exists; the latch drops its later values
/// and the activity is finished as soon as `subscribe` returns it.
pub fn prune<C, A, R>(source: C) -> Observable<A, R>
where
    C: Channel<A, R> + Send + Sync + 'static,
    A: 'static,
    R: Default + 'static,
{
    Observable::new(move |continuation: Continuation<A, R>| {
        let state = Arc::new(PruneState::default());

        let first = Arc::clone(&state);
        let activity = source.connect(Continuation::new(move |value| {
            if first.fired.swap(true, Ordering::AcqRel) {
                return R::default();
            }
            first.cancel_source();
            continuation.next(value)
        }));

        let fired_early = {
            let mut slot = lock(&state.source);
            if state.fired.load(Ordering::Acquire) {
                Some(activity)
            } else {
                *slot = Some(activity);
                None
            }
        };
        if let Some(activity) = fired_early {
            activity.finish();
            return Activity::noop();
        }

        Activity::from_fn(move || {
            state.fired.store(true, Ordering::Release);
            state.cancel_source();
        })
    })
}

/// Pair each value with the wall-clock time it arrived
pub fn stamp<C, A, R>(source: C) -> Observable<Occurrence<A>, R>
where
    C: Channel<A, R> + Send + Sync + 'static,
    A: 'static,
    R: 'static,
{
    map(source, |value, _| (Utc::now(), value))
}

struct FinishOnDrop(Activity);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Resolve with the first value of `source`
///
/// Subscribes immediately through [`prune`]. The future never resolves if
/// the source never emits; dropping it cancels the subscription.
pub fn reset<C, A, R>(source: C) -> impl Future<Output = A> + Send + 'static
where
    C: Channel<A, R> + Send + Sync + 'static,
    A: Send + 'static,
    R: Default + 'static,
{
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));

    let activity = prune(source).subscribe(move |value: A| {
        if let Some(tx) = lock(&tx).take() {
            let _ = tx.send(value);
        }
        R::default()
    });
    let guard = FinishOnDrop(activity);

    async move {
        let _guard = guard;
        match rx.await {
            Ok(value) => value,
            Err(_) => futures::future::pending().await,
        }
    }
}

/// [`reset`] bounded by `timeout`
pub async fn reset_timeout<C, A, R>(source: C, timeout: Duration) -> StreamResult<A>
where
    C: Channel<A, R> + Send + Sync + 'static,
    A: Send + 'static,
    R: Default + 'static,
{
    tokio::time::timeout(timeout, reset(source))
        .await
        .map_err(|_| StreamError::Timeout(timeout))
}

/// Pull the values of `source` through a `futures::Stream`
///
/// Unbounded: values queue until polled. Dropping the stream finishes
/// the subscription.
pub fn into_stream<C, A, R>(source: C) -> impl Stream<Item = A> + Send + Unpin + 'static
where
    C: Channel<A, R>,
    A: Send + 'static,
    R: Default + 'static,
{
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let activity = source.subscribe(move |value: A| {
        let _ = tx.send(value);
        R::default()
    });

    ActivityStream {
        inner: UnboundedReceiverStream::new(rx),
        _guard: FinishOnDrop(activity),
    }
}

struct ActivityStream<A> {
    inner: UnboundedReceiverStream<A>,
    _guard: FinishOnDrop,
}

impl<A> Stream for ActivityStream<A> {
    type Item = A;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<A>> {
        std::pin::Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Method-style access to every combinator
///
/// # Examples
///
/// ```rust,ignore
/// let first_even = each(vec![1, 3, 4, 6]).filter(|x, _| x % 2 == 0).prune();
/// ```
pub trait ChannelExt<A, R = ()>: Channel<A, R> + Sized + Send + Sync + 'static
where
    A: 'static,
    R: 'static,
{
    /// See [`map`]
    fn map<B, F>(self, f: F) -> Observable<B, R>
    where
        F: Fn(A, usize) -> B + Send + Sync + 'static,
        B: 'static,
    {
        map(self, f)
    }

    /// See [`filter`]
    fn filter<P>(self, predicate: P) -> Observable<A, R>
    where
        P: Fn(&A, usize) -> bool + Send + Sync + 'static,
        R: Default,
    {
        filter(self, predicate)
    }

    /// See [`join`]
    fn join<B>(self) -> Observable<B, R>
    where
        A: Channel<B, R>,
        B: 'static,
        R: Default,
    {
        join(self)
    }

    /// See [`then`]
    fn then<S, B, F>(self, f: F) -> Observable<B, R>
    where
        F: Fn(A, usize) -> S + Send + Sync + 'static,
        S: Channel<B, R> + 'static,
        B: 'static,
        R: Default,
    {
        then(self, f)
    }

    /// See [`prune`]
    fn prune(self) -> Observable<A, R>
    where
        R: Default,
    {
        prune(self)
    }

    /// See [`stamp`]
    fn stamp(self) -> Observable<Occurrence<A>, R> {
        stamp(self)
    }

    /// See [`reset`]
    fn reset(self) -> impl Future<Output = A> + Send + 'static
    where
        A: Send,
        R: Default,
    {
        reset(self)
    }
}

impl<C, A, R> ChannelExt<A, R> for C
where
    C: Channel<A, R> + Send + Sync + 'static,
    A: 'static,
    R: 'static,
{
}
