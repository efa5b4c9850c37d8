// Copyright (c) 2025 - Cowboy AI, Inc.
//! Observable - The public stream type and its construction primitives
//!
//! An `Observable<A, R>` is an immutable subscription recipe: one function
//! from a [`Continuation`] to a [`Teardown`]. It holds no state of its own;
//! every `subscribe` call is an independent activation.
//!
//! # Primitives
//!
//! - [`pure`] - one value, delivered synchronously inside `subscribe`
//! - [`each`] - a finite sequence, replayed on a later turn
//! - [`keep`] / [`keep_ok`] - one value when a future resolves
//! - [`shift`] - raw access to the downstream continuation
//! - [`par`] - concurrent merge of several sources
//! - [`tick`] - a counter driven by the runtime's timer
//! - [`from_stream`] - bridge from a `futures::Stream`
//!
//! ```rust,ignore
//! use cim_reactive::frp::*;
//!
//! let activity = each(vec![1, 2, 3]).subscribe(|x: i32| println!("{x}"));
//! // later
//! activity.finish();
//! ```

use std::fmt::{self, Display};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::{FutureExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::activity::{Activity, Teardown};
use super::channel::Channel;
use super::continuation::Continuation;
use super::{lock, scheduler};
use crate::errors::{StreamError, StreamResult};

type Subscription<A, R> = Arc<dyn Fn(Continuation<A, R>) -> Teardown + Send + Sync>;

/// A push stream of values of type `A`
///
/// `R` is what each continuation returns to the producer. It is `()` for
/// almost every stream; `shift` producers can make use of it.
pub struct Observable<A, R = ()> {
    subscription: Subscription<A, R>,
}

impl<A: 'static, R: 'static> Observable<A, R> {
    /// Create an observable from a subscription function
    ///
    /// The function runs once per `subscribe` call. It may return `()`, an
    /// [`Activity`], or a [`Teardown`]; all are normalized into the
    /// caller's `Activity`.
    pub fn new<F, T>(subscribe: F) -> Self
    where
        F: Fn(Continuation<A, R>) -> T + Send + Sync + 'static,
        T: Into<Teardown>,
    {
        Self {
            subscription: Arc::new(move |continuation| subscribe(continuation).into()),
        }
    }

    /// A stream that never emits
    pub fn never() -> Self {
        Self::new(|_| ())
    }
}

impl<A, R> Clone for Observable<A, R> {
    fn clone(&self) -> Self {
        Self {
            subscription: Arc::clone(&self.subscription),
        }
    }
}

impl<A, R> fmt::Debug for Observable<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observable<{}>", std::any::type_name::<A>())
    }
}

impl<A: 'static, R: 'static> Channel<A, R> for Observable<A, R> {
    fn connect(&self, continuation: Continuation<A, R>) -> Activity {
        (self.subscription)(continuation).into_activity()
    }

    fn observe(self) -> Observable<A, R> {
        self
    }
}

/// Emit `value` once, synchronously, inside `subscribe`
///
/// # Examples
///
/// ```rust,ignore
/// let activity = pure(42).subscribe(|x: i32| assert_eq!(x, 42));
/// ```
pub fn pure<A>(value: A) -> Observable<A>
where
    A: Clone + Send + Sync + 'static,
{
    Observable::new(move |continuation: Continuation<A>| {
        continuation.next(value.clone());
    })
}

/// Replay every element of a finite sequence, starting on a later turn
///
/// Cancellation is checked before each element, and the producer yields
/// to the runtime between elements so other tasks can cancel mid-way.
pub fn each<I, A>(items: I) -> Observable<A>
where
    I: IntoIterator<Item = A>,
    A: Clone + Send + Sync + 'static,
{
    let items: Arc<[A]> = items.into_iter().collect();

    Observable::new(move |continuation: Continuation<A>| {
        let items = Arc::clone(&items);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let _ = scheduler::defer(async move {
            for (index, item) in items.iter().enumerate() {
                if flag.load(Ordering::Acquire) {
                    trace!(index, remaining = items.len() - index, "each cancelled");
                    return;
                }
                continuation.next(item.clone());
                tokio::task::yield_now().await;
            }
        });

        Teardown::dispose(move || cancelled.store(true, Ordering::Release))
    })
}

/// Emit the output of `future` once it resolves
///
/// The future is shared between subscriptions and runs at most once.
/// Finishing the activity suppresses the emission; it does not abort the
/// future for other subscribers.
pub fn keep<Fut, A>(future: Fut) -> Observable<A>
where
    Fut: Future<Output = A> + Send + 'static,
    A: Clone + Send + Sync + 'static,
{
    settle(future.map(Some).boxed().shared())
}

/// Like [`keep`], for futures that can fail
///
/// `Ok(value)` is emitted once. `Err` drops the emission and is logged at
/// warn level; no error ever travels down the stream.
pub fn keep_ok<Fut, A, E>(future: Fut) -> Observable<A>
where
    Fut: Future<Output = Result<A, E>> + Send + 'static,
    A: Clone + Send + Sync + 'static,
    E: Display + Send + 'static,
{
    let settled = async move {
        match future.await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Future failed; emission dropped");
                None
            }
        }
    };
    settle(settled.boxed().shared())
}

fn settle<A>(shared: Shared<BoxFuture<'static, Option<A>>>) -> Observable<A>
where
    A: Clone + Send + Sync + 'static,
{
    Observable::new(move |continuation: Continuation<A>| {
        let future = shared.clone();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let waiter = scheduler::defer(async move {
            let settled = future.await;
            if flag.load(Ordering::Acquire) {
                trace!("future settled after cancellation");
                return;
            }
            if let Some(value) = settled {
                continuation.next(value);
            }
        });

        Teardown::dispose(move || {
            cancelled.store(true, Ordering::Release);
            if let Ok(waiter) = waiter {
                waiter.abort();
            }
        })
    })
}

/// Raw access to the downstream continuation
///
/// `escape` receives the continuation itself. Calling `k.next(value)`
/// delivers synchronously and returns the downstream result, as many times
/// as the producer likes. Whatever `escape` returns becomes the teardown.
///
/// # Examples
///
/// ```rust,ignore
/// let doubled: Observable<i32, i32> = shift(|k: Continuation<i32, i32>| {
///     let first = k.next(1);
///     let second = k.next(2);
///     assert_eq!((first, second), (10, 20));
/// });
/// doubled.subscribe(|x: i32| x * 10);
/// ```
pub fn shift<A, R, F, T>(escape: F) -> Observable<A, R>
where
    F: Fn(Continuation<A, R>) -> T + Send + Sync + 'static,
    T: Into<Teardown>,
    A: 'static,
    R: 'static,
{
    Observable::new(escape)
}

#[derive(Default)]
struct ParState {
    cancelled: bool,
    started: Vec<Activity>,
}

/// Merge several sources, each subscribed on its own later turn
///
/// Values arrive in whatever order the sources produce them. Finishing
/// the activity stops every source already started; sources not yet
/// started never start.
pub fn par<I, A, R>(sources: I) -> Observable<A, R>
where
    I: IntoIterator<Item = Observable<A, R>>,
    A: 'static,
    R: 'static,
{
    let sources: Arc<[Observable<A, R>]> = sources.into_iter().collect();

    Observable::new(move |continuation: Continuation<A, R>| {
        let state = Arc::new(Mutex::new(ParState::default()));

        for (index, source) in sources.iter().enumerate() {
            let source = source.clone();
            let state = Arc::clone(&state);
            let continuation = continuation.clone();

            let _ = scheduler::defer(async move {
                if lock(&state).cancelled {
                    trace!(index, "par source cancelled before start");
                    return;
                }
                let activity = source.connect(continuation);

                let late = {
                    let mut state = lock(&state);
                    if state.cancelled {
                        Some(activity)
                    } else {
                        state.started.push(activity);
                        None
                    }
                };
                if let Some(activity) = late {
                    activity.finish();
                }
            });
        }

        Teardown::dispose(move || {
            let started = {
                let mut state = lock(&state);
                state.cancelled = true;
                std::mem::take(&mut state.started)
            };
            trace!(started = started.len(), "par cancelled");
            for activity in started {
                activity.finish();
            }
        })
    })
}

/// Configuration for [`tick`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickConfig {
    /// Time between emissions; the first emission is one period after subscribe
    pub period: Duration,
    /// Stop after this many emissions
    pub limit: Option<u64>,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            limit: None,
        }
    }
}

impl TickConfig {
    /// Set the period
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Stop after `limit` emissions
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check the configuration can drive a timer
    pub fn validate(&self) -> StreamResult<()> {
        if self.period.is_zero() {
            return Err(StreamError::Configuration(
                "tick period must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Emit `0, 1, 2, ...` once per period
///
/// Built on [`shift`] over the runtime's interval timer. Finishing the
/// activity aborts the timer task.
pub fn tick(config: TickConfig) -> StreamResult<Observable<u64>> {
    config.validate()?;

    Ok(shift(move |continuation: Continuation<u64>| {
        let TickConfig { period, limit } = config.clone();

        let timer = scheduler::defer(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            let mut count = 0u64;
            while !matches!(limit, Some(limit) if count >= limit) {
                interval.tick().await;
                continuation.next(count);
                count += 1;
            }
        });

        Teardown::dispose(move || {
            if let Ok(timer) = timer {
                timer.abort();
            }
        })
    }))
}

/// Bridge a `futures::Stream` into an observable
///
/// `factory` builds a fresh stream for every subscription. Polling starts
/// on a later turn and stops when the activity is finished.
pub fn from_stream<F, S, A>(factory: F) -> Observable<A>
where
    F: Fn() -> S + Send + Sync + 'static,
    S: Stream<Item = A> + Send + 'static,
    A: Send + 'static,
{
    Observable::new(move |continuation: Continuation<A>| {
        let mut stream = Box::pin(factory());
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let poller = scheduler::defer(async move {
            while let Some(value) = stream.next().await {
                if flag.load(Ordering::Acquire) {
                    break;
                }
                continuation.next(value);
            }
        });

        Teardown::dispose(move || {
            cancelled.store(true, Ordering::Release);
            if let Ok(poller) = poller {
                poller.abort();
            }
        })
    })
}
