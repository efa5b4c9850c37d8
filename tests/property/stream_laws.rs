// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Observables and Operators
//!
//! Deferred sources run on a fresh current-thread runtime per case, the
//! same single-threaded cooperative loop the library is designed for.

use std::sync::{Arc, Mutex};

use cim_reactive::frp::*;
use proptest::prelude::*;
use tokio::sync::mpsc::unbounded_channel;

// ============================================================================
// Helpers
// ============================================================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime builds")
        .block_on(future)
}

/// Subscribe, then collect every value until the source lets go of the continuation
async fn collect_all<A: Send + 'static>(source: Observable<A>) -> Vec<A> {
    let (tx, mut rx) = unbounded_channel();
    let _activity = source.subscribe(move |value: A| {
        let _ = tx.send(value);
    });

    let mut values = Vec::new();
    while let Some(value) = rx.recv().await {
        values.push(value);
    }
    values
}

/// A source that emits `items` synchronously inside `subscribe`
fn synchronous(items: Vec<i32>) -> Observable<i32> {
    shift(move |k: Continuation<i32>| {
        for item in &items {
            k.next(*item);
        }
    })
}

fn recorded(source: Observable<i32>) -> Vec<i32> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    source
        .subscribe(move |x: i32| sink.lock().unwrap().push(x))
        .finish();
    let values = seen.lock().unwrap().clone();
    values
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn sequence() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-1000i32..1000, 0..40)
}

fn non_empty_sequence() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-1000i32..1000, 1..40)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: each replays the sequence exactly, in order
    #[test]
    fn prop_each_replays_sequence(items in sequence()) {
        let values = block_on(collect_all(each(items.clone())));
        prop_assert_eq!(values, items);
    }

    /// Property: cancelling each at any position stops delivery there
    #[test]
    fn prop_each_cancel_stops_delivery(items in non_empty_sequence(), cut in 0usize..40) {
        let cut = cut % items.len();
        let values = block_on(async {
            let slot: Arc<Mutex<Option<Activity>>> = Arc::new(Mutex::new(None));
            let (tx, mut rx) = unbounded_channel();
            let cancel = Arc::clone(&slot);
            let index = Arc::new(Mutex::new(0usize));

            let activity = each(items.clone()).subscribe(move |x: i32| {
                let _ = tx.send(x);
                let mut index = index.lock().unwrap();
                if *index == cut {
                    if let Some(activity) = cancel.lock().unwrap().as_ref() {
                        activity.finish();
                    }
                }
                *index += 1;
            });
            *slot.lock().unwrap() = Some(activity);

            let mut values = Vec::new();
            while let Some(value) = rx.recv().await {
                values.push(value);
            }
            values
        });

        prop_assert_eq!(values, items[..=cut].to_vec());
    }

    /// Property: filter after map indexes the mapped stream
    #[test]
    fn prop_map_then_filter_composes(items in sequence(), offset in -50i32..50) {
        let values = recorded(
            synchronous(items.clone())
                .map(move |x, _| x + offset)
                .filter(|x, i| (x + i as i32) % 3 == 0),
        );

        let expected: Vec<i32> = items
            .iter()
            .map(|x| x + offset)
            .enumerate()
            .filter(|(i, x)| (x + *i as i32) % 3 == 0)
            .map(|(_, x)| x)
            .collect();
        prop_assert_eq!(values, expected);
    }

    /// Property: map indices count from zero for every subscription
    #[test]
    fn prop_map_index_is_position(items in sequence()) {
        let source = synchronous(items.clone()).map(|_, i| i as i32);
        let expected: Vec<i32> = (0..items.len() as i32).collect();

        prop_assert_eq!(recorded(source.clone()), expected.clone());
        prop_assert_eq!(recorded(source), expected);
    }

    /// Property: prune yields exactly the first value of a synchronous source
    #[test]
    fn prop_prune_yields_first_only(items in non_empty_sequence()) {
        prop_assert_eq!(recorded(synchronous(items.clone()).prune()), vec![items[0]]);
    }

    /// Property: reset resolves to the first element of each
    #[test]
    fn prop_reset_resolves_head(items in non_empty_sequence()) {
        let first = block_on(async { reset(each(items.clone())).await });
        prop_assert_eq!(first, items[0]);
    }

    /// Property: par delivers every value of every source exactly once
    #[test]
    fn prop_par_delivers_every_value(items in sequence()) {
        let sources: Vec<Observable<i32>> = items.iter().copied().map(pure).collect();
        let mut values = block_on(collect_all(par(sources)));
        let mut expected = items.clone();

        values.sort();
        expected.sort();
        prop_assert_eq!(values, expected);
    }
}
