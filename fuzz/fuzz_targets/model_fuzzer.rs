//! Fuzz target comparing real handles against the reference model
//!
//! # Strategy
//!
//! - Slot layout and operation sequence both come from the fuzzer
//! - Operations cover update, finish, scrub, export/resume, cross-slot
//!   copies, truncated imports and rekeying
//!
//! # Invariants
//!
//! - Every operation result matches the model
//! - Per-slot byte counters match the model after every operation

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shastate_harness::{ModelWorld, Operation, RealWorld, SlotKind};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    layout: Vec<SlotKind>,
    ops: Vec<Operation>,
}

fuzz_target!(|input: FuzzInput| {
    let layout: Vec<SlotKind> = input.layout.into_iter().take(8).collect();

    let mut model = ModelWorld::new(&layout);
    let mut real = RealWorld::new(&layout);

    for op in input.ops.iter().take(256) {
        assert_eq!(model.apply(op), real.apply(op), "divergence on {op:?}");
        assert_eq!(model.observable_state(), real.observable_state(), "state after {op:?}");
    }
});
