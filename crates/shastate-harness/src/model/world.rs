//! Model world - the reference implementation.
//!
//! Each slot remembers the key and the whole message absorbed since the last
//! reset. Outputs are computed from scratch with the RustCrypto `sha2` and
//! `hmac` crates, so the model never exports or imports anything.

use hmac::{Mac, digest::KeyInit};
use sha2::Digest;
use shastate_core::AlgorithmId;

use super::operation::{
    Operation, OperationError, OperationResult, SlotId, SlotKind, SmallChunk, initial_key,
};

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Per-slot bytes absorbed since the last reset.
    pub bytes_processed: Vec<u64>,
}

#[derive(Debug, Clone)]
struct ModelSlot {
    kind: SlotKind,
    key: Vec<u8>,
    message: Vec<u8>,
}

impl ModelSlot {
    fn output(&self) -> Vec<u8> {
        match (self.kind, self.kind.algorithm()) {
            (SlotKind::Digest(_), AlgorithmId::Sha256) => {
                sha2::Sha256::digest(&self.message).to_vec()
            },
            (SlotKind::Digest(_), AlgorithmId::Sha512) => {
                sha2::Sha512::digest(&self.message).to_vec()
            },
            (SlotKind::Mac(_), AlgorithmId::Sha256) => {
                mac::<hmac::Hmac<sha2::Sha256>>(&self.key, &self.message)
            },
            (SlotKind::Mac(_), AlgorithmId::Sha512) => {
                mac::<hmac::Hmac<sha2::Sha512>>(&self.key, &self.message)
            },
        }
    }
}

fn mac<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, the fallback is unreachable.
    let mut mac = <M as KeyInit>::new_from_slice(key)
        .unwrap_or_else(|_| <M as KeyInit>::new(&Default::default()));
    Mac::update(&mut mac, message);
    Mac::finalize(mac).into_bytes().to_vec()
}

/// Model world - the reference implementation.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    slots: Vec<ModelSlot>,
}

impl ModelWorld {
    /// Create a model world with one slot per entry of `kinds`.
    pub fn new(kinds: &[SlotKind]) -> Self {
        let slots = kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| ModelSlot {
                kind,
                key: if kind.is_keyed() { initial_key(i as SlotId) } else { Vec::new() },
                message: Vec::new(),
            })
            .collect();

        Self { slots }
    }

    /// Number of slots in the world.
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Apply an operation and return the result.
    ///
    /// The result should match the real implementation's result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Update { slot, chunk } => self.apply_update(*slot, *chunk),
            Operation::Finish { slot } => self.apply_finish(*slot),
            Operation::Scrub { slot } => self.apply_scrub(*slot),
            Operation::ExportResume { slot } => {
                // Snapshots carry everything, so nothing changes.
                if self.slot(*slot).is_none() {
                    return OperationResult::Error(OperationError::InvalidSlot);
                }
                OperationResult::Ok
            },
            Operation::CopyState { from, to } => self.apply_copy_state(*from, *to),
            Operation::TruncatedImport { slot, .. } => {
                if self.slot(*slot).is_none() {
                    return OperationResult::Error(OperationError::InvalidSlot);
                }
                OperationResult::Error(OperationError::InvalidLength)
            },
            Operation::Rekey { slot, key } => self.apply_rekey(*slot, *key),
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            bytes_processed: self.slots.iter().map(|s| s.message.len() as u64).collect(),
        }
    }

    fn slot(&self, slot: SlotId) -> Option<&ModelSlot> {
        self.slots.get(usize::from(slot))
    }

    fn slot_mut(&mut self, slot: SlotId) -> Option<&mut ModelSlot> {
        self.slots.get_mut(usize::from(slot))
    }

    fn apply_update(&mut self, slot: SlotId, chunk: SmallChunk) -> OperationResult {
        let Some(slot) = self.slot_mut(slot) else {
            return OperationResult::Error(OperationError::InvalidSlot);
        };
        slot.message.extend_from_slice(&chunk.to_bytes());
        OperationResult::Ok
    }

    fn apply_finish(&mut self, slot: SlotId) -> OperationResult {
        let Some(slot) = self.slot_mut(slot) else {
            return OperationResult::Error(OperationError::InvalidSlot);
        };
        let output = slot.output();
        slot.message.clear();
        OperationResult::Output(output)
    }

    /// Scrub forgets the key too; a scrubbed MAC runs under the empty key.
    fn apply_scrub(&mut self, slot: SlotId) -> OperationResult {
        let Some(slot) = self.slot_mut(slot) else {
            return OperationResult::Error(OperationError::InvalidSlot);
        };
        slot.message.clear();
        slot.key.clear();
        OperationResult::Ok
    }

    fn apply_copy_state(&mut self, from: SlotId, to: SlotId) -> OperationResult {
        let (Some(source), Some(target)) = (self.slot(from), self.slot(to)) else {
            return OperationResult::Error(OperationError::InvalidSlot);
        };

        // Snapshot sizes differ between every pair of kinds.
        if source.kind.state_size() != target.kind.state_size() {
            return OperationResult::Error(OperationError::InvalidLength);
        }

        let source = source.clone();
        if let Some(target) = self.slot_mut(to) {
            target.key = source.key;
            target.message = source.message;
        }
        OperationResult::Ok
    }

    fn apply_rekey(&mut self, slot: SlotId, key: SmallChunk) -> OperationResult {
        let Some(slot) = self.slot_mut(slot) else {
            return OperationResult::Error(OperationError::InvalidSlot);
        };
        if !slot.kind.is_keyed() {
            return OperationResult::Error(OperationError::NotKeyed);
        }
        slot.key = key.to_bytes();
        slot.message.clear();
        OperationResult::Ok
    }
}
