//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! handles behave identically to the reference model.

use proptest::prelude::*;
use shastate_harness::{
    ModelWorld, Operation, OperationResult, RealWorld, SlotId, SlotKind, SmallChunk,
};

/// Strategy for generating SmallChunk.
fn small_chunk_strategy() -> impl Strategy<Value = SmallChunk> {
    (any::<u8>(), any::<u8>()).prop_map(|(seed, size_class)| SmallChunk { seed, size_class })
}

/// Strategy for generating operations with valid slot IDs.
fn operation_strategy(num_slots: usize) -> impl Strategy<Value = Operation> {
    let slot = 0..num_slots as SlotId;

    prop_oneof![
        // Weight towards absorbing input so states get interesting
        6 => (slot.clone(), small_chunk_strategy())
            .prop_map(|(slot, chunk)| Operation::Update { slot, chunk }),
        2 => slot.clone().prop_map(|slot| Operation::Finish { slot }),
        1 => slot.clone().prop_map(|slot| Operation::Scrub { slot }),
        3 => slot.clone().prop_map(|slot| Operation::ExportResume { slot }),
        2 => (slot.clone(), slot.clone()).prop_map(|(from, to)| Operation::CopyState { from, to }),
        1 => (slot.clone(), any::<u8>()).prop_map(|(slot, cut)| Operation::TruncatedImport {
            slot,
            cut
        }),
        1 => (slot, small_chunk_strategy()).prop_map(|(slot, key)| Operation::Rekey { slot, key }),
    ]
}

/// Slot layouts: one of each kind, plus duplicates so copies can succeed.
fn layout_strategy() -> impl Strategy<Value = Vec<SlotKind>> {
    prop::collection::vec(prop::sample::select(SlotKind::ALL.to_vec()), 1..6)
}

proptest! {
    /// Verify that operation results match between model and real implementation.
    #[test]
    fn prop_model_matches_real(
        layout in layout_strategy(),
        ops in prop::collection::vec(operation_strategy(6), 0..60),
    ) {
        let mut model = ModelWorld::new(&layout);
        let mut real = RealWorld::new(&layout);

        for (i, op) in ops.iter().enumerate() {
            let model_result = model.apply(op);
            let real_result = real.apply(op);

            prop_assert_eq!(
                &model_result,
                &real_result,
                "Divergence at operation {}: {:?}",
                i,
                op
            );
            prop_assert_eq!(
                model.observable_state(),
                real.observable_state(),
                "State divergence after operation {}: {:?}",
                i,
                op
            );
        }
    }

    /// Same operations, same snapshots: nothing depends on hidden state.
    #[test]
    fn prop_real_is_deterministic(
        ops in prop::collection::vec(operation_strategy(4), 0..40),
    ) {
        let mut first = RealWorld::new(&SlotKind::ALL);
        let mut second = RealWorld::new(&SlotKind::ALL);

        for op in &ops {
            prop_assert_eq!(first.apply(op), second.apply(op));
        }

        for slot in 0..4 {
            prop_assert_eq!(first.export_slot(slot), second.export_slot(slot));
        }
    }

    /// Finishing every slot yields the same outputs whether or not the
    /// states were shuttled through snapshots in between.
    #[test]
    fn prop_export_resume_is_transparent(
        chunks in prop::collection::vec((0..4 as SlotId, small_chunk_strategy()), 0..30),
    ) {
        let mut direct = RealWorld::new(&SlotKind::ALL);
        let mut shuttled = RealWorld::new(&SlotKind::ALL);

        for (slot, chunk) in &chunks {
            let update = Operation::Update { slot: *slot, chunk: *chunk };
            direct.apply(&update);
            shuttled.apply(&update);
            prop_assert_eq!(
                shuttled.apply(&Operation::ExportResume { slot: *slot }),
                OperationResult::Ok
            );
        }

        for slot in 0..4 {
            prop_assert_eq!(
                direct.apply(&Operation::Finish { slot }),
                shuttled.apply(&Operation::Finish { slot })
            );
        }
    }
}

#[test]
fn scrubbed_mac_runs_under_empty_key() {
    let layout = [SlotKind::ALL[2]];
    let mut model = ModelWorld::new(&layout);
    let mut real = RealWorld::new(&layout);
    let chunk = SmallChunk { seed: 42, size_class: 3 };

    for op in [
        Operation::Update { slot: 0, chunk },
        Operation::Scrub { slot: 0 },
        Operation::Update { slot: 0, chunk },
        Operation::Finish { slot: 0 },
    ] {
        assert_eq!(model.apply(&op), real.apply(&op), "{op:?}");
    }
}

#[test]
fn copy_between_macs_transfers_key() {
    let layout = [SlotKind::ALL[2], SlotKind::ALL[2]];
    let mut model = ModelWorld::new(&layout);
    let mut real = RealWorld::new(&layout);
    let chunk = SmallChunk { seed: 7, size_class: 5 };

    for op in [
        Operation::Update { slot: 0, chunk },
        Operation::CopyState { from: 0, to: 1 },
        Operation::Finish { slot: 0 },
        Operation::Finish { slot: 1 },
    ] {
        assert_eq!(model.apply(&op), real.apply(&op), "{op:?}");
    }
    assert_eq!(model.observable_state(), real.observable_state());
}
