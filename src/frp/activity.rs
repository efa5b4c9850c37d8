// Copyright (c) 2025 - Cowboy AI, Inc.
//! Activity - Cancellation handles
//!
//! An `Activity` represents an ongoing process started by `subscribe`. Its
//! only operation is `finish`, which releases whatever the process
//! registered (a timer, a subscriber-list entry, a pending-future flag).
//!
//! `finish` is idempotent: the release runs at most once, and every later
//! call is a no-op.
//!
//! Subscription functions may end in one of three ways, captured by
//! [`Teardown`]:
//!
//! - nothing to release
//! - a plain disposer closure
//! - an existing `Activity`
//!
//! [`Teardown::into_activity`] is the one place these shapes are reconciled.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

type Disposer = Box<dyn FnOnce() + Send>;

/// Idempotent cancellation handle
///
/// Owned by the subscriber that created it. Not `Clone`: stages that need
/// to share one wrap it in an `Arc`.
pub struct Activity {
    disposer: Mutex<Option<Disposer>>,
    finished: AtomicBool,
}

impl Activity {
    /// An activity with nothing to release
    pub fn noop() -> Self {
        Self {
            disposer: Mutex::new(None),
            finished: AtomicBool::new(false),
        }
    }

    /// An activity whose `finish` runs `f` exactly once
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            disposer: Mutex::new(Some(Box::new(f))),
            finished: AtomicBool::new(false),
        }
    }

    /// Stop the process. Safe to call any number of times.
    pub fn finish(&self) {
        if self.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        // Release outside the lock; the disposer may re-enter this stream.
        let disposer = self
            .disposer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(dispose) = disposer {
            dispose();
        }
    }

    /// Whether `finish` has been called
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Whether `finish` would release nothing: already finished, or no
    /// disposer was ever registered
    pub(crate) fn is_spent(&self) -> bool {
        self.is_finished()
            || self
                .disposer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_none()
    }
}

impl Default for Activity {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activity")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// What a subscription function hands back for cleanup
pub enum Teardown {
    /// Nothing to release
    None,
    /// A disposer closure, run on `finish`
    Dispose(Disposer),
    /// An activity, returned unchanged
    Activity(Activity),
}

impl Teardown {
    /// Wrap a plain disposer closure
    pub fn dispose<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Teardown::Dispose(Box::new(f))
    }

    /// Normalize into the caller's cancellation handle
    pub fn into_activity(self) -> Activity {
        match self {
            Teardown::None => Activity::noop(),
            Teardown::Dispose(dispose) => Activity::from_fn(dispose),
            Teardown::Activity(activity) => activity,
        }
    }
}

impl From<()> for Teardown {
    fn from(_: ()) -> Self {
        Teardown::None
    }
}

impl From<Activity> for Teardown {
    fn from(activity: Activity) -> Self {
        Teardown::Activity(activity)
    }
}

impl From<Option<Activity>> for Teardown {
    fn from(activity: Option<Activity>) -> Self {
        activity.map_or(Teardown::None, Teardown::Activity)
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Teardown::None => write!(f, "Teardown::None"),
            Teardown::Dispose(_) => write!(f, "Teardown::Dispose"),
            Teardown::Activity(a) => write!(f, "Teardown::Activity({a:?})"),
        }
    }
}
