//! Reactive streams for the Composable Information Machine
//!
//! This crate provides push-based value streams in continuation-passing
//! style: construction primitives, multicast wires and behaviors, and the
//! operators that compose them into pipelines, each with explicit,
//! idempotent cancellation.

pub mod errors;
pub mod frp;

// Re-export commonly used types
pub use errors::{StreamError, StreamResult};
pub use frp::{Activity, Behavior, Channel, ChannelExt, Continuation, Observable, Wire};
