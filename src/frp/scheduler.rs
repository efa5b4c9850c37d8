// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deferral onto a later turn of the host event loop
//!
//! `each`, `par`, `keep`, `tick` and `from_stream` never run their work
//! inside `subscribe`; they hand it to the ambient Tokio runtime so the
//! caller holds its `Activity` before the first value can arrive.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::error;

use crate::errors::{StreamError, StreamResult};

/// Run `work` on a later turn of the current runtime
///
/// Without a runtime the work is dropped and the failure is logged; the
/// stream it belonged to simply never emits.
pub(crate) fn defer<F>(work: F) -> StreamResult<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Ok(handle.spawn(work)),
        Err(e) => {
            error!(error = %e, "No async runtime to defer stream work onto");
            Err(StreamError::Runtime(e.to_string()))
        }
    }
}
