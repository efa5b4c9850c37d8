// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Wires and Behaviors
//!
//! Random interleavings of `next` and `finish` must never deliver a value
//! after the first `finish`.

use std::sync::{Arc, Mutex};

use cim_reactive::frp::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Next(i32),
    Finish,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Next),
        1 => Just(Op::Finish),
    ]
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..40)
}

/// Values sent before the first `finish`
fn accepted(ops: &[Op]) -> Vec<i32> {
    ops.iter()
        .take_while(|op| !matches!(op, Op::Finish))
        .filter_map(|op| match op {
            Op::Next(v) => Some(*v),
            Op::Finish => None,
        })
        .collect()
}

proptest! {
    /// Property: nothing reaches a wire subscriber after finish
    #[test]
    fn prop_wire_silent_after_finish(ops in ops()) {
        let wire: Wire<i32> = Wire::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _activity = wire.subscribe(move |x: i32| sink.lock().unwrap().push(x));

        for op in &ops {
            match op {
                Op::Next(v) => wire.next(*v),
                Op::Finish => wire.finish(),
            }
        }

        prop_assert_eq!(seen.lock().unwrap().clone(), accepted(&ops));
    }

    /// Property: a behavior's value is the last value accepted before finish
    #[test]
    fn prop_behavior_value_is_last_accepted(initial in any::<i32>(), ops in ops()) {
        let behavior: Behavior<i32> = Behavior::new(initial);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _activity = behavior.subscribe(move |x: i32| sink.lock().unwrap().push(x));

        for op in &ops {
            match op {
                Op::Next(v) => behavior.next(*v),
                Op::Finish => behavior.finish(),
            }
        }

        let accepted = accepted(&ops);
        let mut expected = vec![initial];
        expected.extend(accepted.iter().copied());

        prop_assert_eq!(behavior.value(), accepted.last().copied().unwrap_or(initial));
        prop_assert_eq!(seen.lock().unwrap().clone(), expected);
    }
}
