//! Real system wrapper that mirrors [`ModelWorld`](crate::ModelWorld)'s
//! interface.
//!
//! Every slot holds an actual `shastate-core` handle, and every state
//! transfer goes through `export_state` / `import_state`.

use shastate_core::{
    AnyDigest, HmacSha256, HmacSha512, StateError, StateSnapshot, StatefulDigest,
};

use crate::model::{
    ModelAlgorithm, ObservableState, Operation, OperationError, OperationResult, SlotId, SlotKind,
    SmallChunk, initial_key,
};

/// Key given to handles created by `ExportResume` before they import.
const RESUME_KEY: &[u8] = b"a different key";

#[derive(Debug, Clone)]
enum RealSlot {
    Digest(AnyDigest),
    MacSha256(HmacSha256),
    MacSha512(HmacSha512),
}

impl RealSlot {
    fn new(kind: SlotKind, key: &[u8]) -> Self {
        match kind {
            SlotKind::Digest(a) => Self::Digest(AnyDigest::new(a.into())),
            SlotKind::Mac(ModelAlgorithm::Sha256) => Self::MacSha256(HmacSha256::new(key)),
            SlotKind::Mac(ModelAlgorithm::Sha512) => Self::MacSha512(HmacSha512::new(key)),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Digest(h) => h.update(data),
            Self::MacSha256(h) => h.update(data),
            Self::MacSha512(h) => h.update(data),
        }
    }

    fn finish(&mut self) -> Vec<u8> {
        match self {
            Self::Digest(h) => h.finish(),
            Self::MacSha256(h) => h.finish().to_vec(),
            Self::MacSha512(h) => h.finish().to_vec(),
        }
    }

    fn scrub(&mut self) {
        match self {
            Self::Digest(h) => h.scrub(),
            Self::MacSha256(h) => h.scrub(),
            Self::MacSha512(h) => h.scrub(),
        }
    }

    fn export_state(&self) -> StateSnapshot {
        match self {
            Self::Digest(h) => h.export_state(),
            Self::MacSha256(h) => h.export_state(),
            Self::MacSha512(h) => h.export_state(),
        }
    }

    fn import_state(&mut self, state: &[u8]) -> Result<(), StateError> {
        match self {
            Self::Digest(h) => h.import_state(state),
            Self::MacSha256(h) => h.import_state(state),
            Self::MacSha512(h) => h.import_state(state),
        }
    }

    fn bytes_processed(&self) -> u64 {
        match self {
            Self::Digest(h) => h.bytes_processed(),
            Self::MacSha256(h) => h.bytes_processed(),
            Self::MacSha512(h) => h.bytes_processed(),
        }
    }

    fn rekey(&mut self, key: &[u8]) -> bool {
        match self {
            Self::Digest(_) => false,
            Self::MacSha256(h) => {
                h.rekey(key);
                true
            },
            Self::MacSha512(h) => {
                h.rekey(key);
                true
            },
        }
    }
}

fn import_result(result: Result<(), StateError>) -> OperationResult {
    match result {
        Ok(()) => OperationResult::Ok,
        Err(StateError::InvalidLength { .. }) => {
            OperationResult::Error(OperationError::InvalidLength)
        },
        Err(_) => OperationResult::Error(OperationError::Corrupt),
    }
}

/// Real world - digest handles driven through their public API.
#[derive(Debug, Clone)]
pub struct RealWorld {
    kinds: Vec<SlotKind>,
    slots: Vec<RealSlot>,
}

impl RealWorld {
    /// Create a real world with one handle per entry of `kinds`.
    pub fn new(kinds: &[SlotKind]) -> Self {
        let slots = kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| RealSlot::new(kind, &initial_key(i as SlotId)))
            .collect();

        Self { kinds: kinds.to_vec(), slots }
    }

    /// Apply an operation and return the result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Update { slot, chunk } => self.with_slot(*slot, |s| {
                s.update(&chunk.to_bytes());
                OperationResult::Ok
            }),
            Operation::Finish { slot } => {
                self.with_slot(*slot, |s| OperationResult::Output(s.finish()))
            },
            Operation::Scrub { slot } => self.with_slot(*slot, |s| {
                s.scrub();
                OperationResult::Ok
            }),
            Operation::ExportResume { slot } => self.apply_export_resume(*slot),
            Operation::CopyState { from, to } => self.apply_copy_state(*from, *to),
            Operation::TruncatedImport { slot, cut } => self.with_slot(*slot, |s| {
                let snapshot = s.export_state();
                let keep = snapshot.len().saturating_sub(usize::from(*cut) + 1);
                import_result(s.import_state(&snapshot.as_bytes()[..keep]))
            }),
            Operation::Rekey { slot, key } => self.apply_rekey(*slot, *key),
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            bytes_processed: self.slots.iter().map(RealSlot::bytes_processed).collect(),
        }
    }

    /// Raw snapshot of a slot, for determinism checks.
    pub fn export_slot(&self, slot: SlotId) -> Option<StateSnapshot> {
        self.slots.get(usize::from(slot)).map(RealSlot::export_state)
    }

    fn with_slot(
        &mut self,
        slot: SlotId,
        f: impl FnOnce(&mut RealSlot) -> OperationResult,
    ) -> OperationResult {
        match self.slots.get_mut(usize::from(slot)) {
            Some(s) => f(s),
            None => OperationResult::Error(OperationError::InvalidSlot),
        }
    }

    fn apply_export_resume(&mut self, slot: SlotId) -> OperationResult {
        let Some(&kind) = self.kinds.get(usize::from(slot)) else {
            return OperationResult::Error(OperationError::InvalidSlot);
        };

        let mut fresh = RealSlot::new(kind, RESUME_KEY);
        self.with_slot(slot, |s| {
            let snapshot = s.export_state();
            let result = import_result(fresh.import_state(snapshot.as_bytes()));
            if result.is_ok() {
                *s = fresh;
            }
            result
        })
    }

    fn apply_copy_state(&mut self, from: SlotId, to: SlotId) -> OperationResult {
        let Some(snapshot) = self.export_slot(from) else {
            return OperationResult::Error(OperationError::InvalidSlot);
        };
        self.with_slot(to, |s| import_result(s.import_state(snapshot.as_bytes())))
    }

    fn apply_rekey(&mut self, slot: SlotId, key: SmallChunk) -> OperationResult {
        self.with_slot(slot, |s| {
            if s.rekey(&key.to_bytes()) {
                OperationResult::Ok
            } else {
                OperationResult::Error(OperationError::NotKeyed)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_resume_carries_mac_key() {
        let mut world = RealWorld::new(&SlotKind::ALL);
        let chunk = SmallChunk { seed: 3, size_class: 6 };

        for slot in 0..4 {
            assert!(world.apply(&Operation::Update { slot, chunk }).is_ok());
        }
        let mut twin = world.clone();

        for slot in 0..4 {
            assert_eq!(world.apply(&Operation::ExportResume { slot }), OperationResult::Ok);
        }

        for slot in 0..4 {
            assert_eq!(
                world.apply(&Operation::Finish { slot }),
                twin.apply(&Operation::Finish { slot })
            );
        }
    }

    #[test]
    fn truncated_import_is_rejected() {
        let mut world = RealWorld::new(&SlotKind::ALL);
        let before = world.export_slot(2);

        let result = world.apply(&Operation::TruncatedImport { slot: 2, cut: 255 });

        assert_eq!(result, OperationResult::Error(OperationError::InvalidLength));
        assert_eq!(world.export_slot(2), before);
    }

    #[test]
    fn out_of_range_slot() {
        let mut world = RealWorld::new(&SlotKind::ALL[..1]);
        assert_eq!(
            world.apply(&Operation::Finish { slot: 1 }),
            OperationResult::Error(OperationError::InvalidSlot)
        );
    }
}
