// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! This module contains property-based tests using proptest to verify
//! ordering, cancellation and composition laws of the stream engine.

mod stream_laws;
mod wire_laws;
