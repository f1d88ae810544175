//! Operations for model-based testing.
//!
//! Operations represent everything a caller can do to a set of digest
//! handles. They are generated randomly by proptest (or decoded from fuzz
//! input) and applied to both the model and the real implementation.

use arbitrary::Arbitrary;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shastate_core::AlgorithmId;

/// Slot identifier (0-indexed).
pub type SlotId = u8;

/// What kind of handle lives in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Arbitrary)]
pub enum SlotKind {
    /// Plain digest.
    Digest(ModelAlgorithm),
    /// HMAC keyed with [`initial_key`] of the slot.
    Mac(ModelAlgorithm),
}

impl SlotKind {
    /// Every slot kind, one of each.
    pub const ALL: [Self; 4] = [
        Self::Digest(ModelAlgorithm::Sha256),
        Self::Digest(ModelAlgorithm::Sha512),
        Self::Mac(ModelAlgorithm::Sha256),
        Self::Mac(ModelAlgorithm::Sha512),
    ];

    /// Underlying hash algorithm.
    pub fn algorithm(self) -> AlgorithmId {
        match self {
            Self::Digest(a) | Self::Mac(a) => a.into(),
        }
    }

    /// Snapshot size of a handle of this kind.
    pub fn state_size(self) -> usize {
        match self {
            Self::Digest(a) => AlgorithmId::from(a).state_size(),
            Self::Mac(a) => 3 * AlgorithmId::from(a).state_size(),
        }
    }

    /// Whether handles of this kind carry a key.
    pub fn is_keyed(self) -> bool {
        matches!(self, Self::Mac(_))
    }
}

/// Hash algorithm as generated by `arbitrary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Arbitrary)]
pub enum ModelAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
}

impl From<ModelAlgorithm> for AlgorithmId {
    fn from(algorithm: ModelAlgorithm) -> Self {
        match algorithm {
            ModelAlgorithm::Sha256 => Self::Sha256,
            ModelAlgorithm::Sha512 => Self::Sha512,
        }
    }
}

/// Key a MAC slot starts with, distinct per slot.
pub fn initial_key(slot: SlotId) -> Vec<u8> {
    let len = 16 + usize::from(slot) * 40;
    (0..len).map(|i| slot.wrapping_mul(31).wrapping_add(i as u8)).collect()
}

/// Operations that can be applied to the system.
///
/// Each operation targets one slot (two for [`Operation::CopyState`]).
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Absorb a chunk of input.
    Update {
        /// Target slot.
        slot: SlotId,
        /// Input (kept small for efficiency).
        chunk: SmallChunk,
    },

    /// Produce the digest and reset.
    Finish {
        /// Target slot.
        slot: SlotId,
    },

    /// Wipe and reinitialize.
    Scrub {
        /// Target slot.
        slot: SlotId,
    },

    /// Export, then import into a brand-new handle that replaces the old one.
    ///
    /// The new handle is created with a different key, so MAC slots only
    /// survive if the key travels with the snapshot.
    ExportResume {
        /// Target slot.
        slot: SlotId,
    },

    /// Export one slot and import it into another.
    ///
    /// Fails unless both slots have the same kind.
    CopyState {
        /// Exporting slot.
        from: SlotId,
        /// Importing slot.
        to: SlotId,
    },

    /// Import a truncated copy of the slot's own snapshot.
    ///
    /// Always rejected; the handle must be left untouched.
    TruncatedImport {
        /// Target slot.
        slot: SlotId,
        /// Bytes to drop from the end (at least one).
        cut: u8,
    },

    /// Replace a MAC slot's key, discarding absorbed input.
    Rekey {
        /// Target slot.
        slot: SlotId,
        /// New key.
        key: SmallChunk,
    },
}

/// Small input chunk for testing.
///
/// A compact representation keeps test cases small. The size classes sit on
/// both sides of the SHA-256 and SHA-512 block and padding boundaries, and
/// the content is deterministic from the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct SmallChunk {
    /// Content seed.
    pub seed: u8,
    /// Length selector.
    pub size_class: u8,
}

impl SmallChunk {
    /// Lengths selected by `size_class`.
    pub const SIZES: [usize; 8] = [0, 1, 55, 56, 64, 111, 128, 300];

    /// Expand to the actual bytes.
    pub fn to_bytes(self) -> Vec<u8> {
        let len = Self::SIZES[usize::from(self.size_class) % Self::SIZES.len()];
        let mut bytes = vec![0u8; len];
        ChaCha8Rng::seed_from_u64(u64::from(self.seed)).fill_bytes(&mut bytes);
        bytes
    }
}

/// Result of applying an operation.
///
/// Used to compare model and real system behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// Operation produced a digest or MAC.
    Output(Vec<u8>),

    /// Operation failed with expected error.
    Error(OperationError),
}

/// Expected errors that can occur during operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// Slot index out of range.
    InvalidSlot,

    /// Snapshot rejected because its size is wrong for the importer.
    InvalidLength,

    /// Rekey on a slot that has no key.
    NotKeyed,

    /// Snapshot of the right size rejected as corrupt.
    ///
    /// Only live handles' snapshots are imported, so the model never
    /// produces this.
    Corrupt,
}

impl OperationResult {
    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        !self.is_err()
    }

    /// Check if operation failed.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_is_deterministic() {
        let chunk = SmallChunk { seed: 9, size_class: 7 };
        assert_eq!(chunk.to_bytes(), chunk.to_bytes());
        assert_eq!(chunk.to_bytes().len(), 300);
        assert_ne!(chunk.to_bytes(), SmallChunk { seed: 10, size_class: 7 }.to_bytes());
    }

    #[test]
    fn keys_differ_per_slot() {
        assert_ne!(initial_key(0), initial_key(1));
        // Slot 3 gets a key longer than a SHA-256 block.
        assert!(initial_key(3).len() > 64);
    }

    #[test]
    fn state_sizes_are_distinct() {
        let mut sizes: Vec<usize> = SlotKind::ALL.iter().map(|k| k.state_size()).collect();
        sizes.sort_unstable();
        sizes.dedup();
        assert_eq!(sizes, vec![112, 208, 336, 624]);
    }
}
