//! Runtime algorithm selection.

use crate::{
    algorithm::AlgorithmId,
    error::StateError,
    handle::{Sha256, Sha512, StatefulDigest},
    state::StateSnapshot,
};

/// A digest handle whose algorithm is chosen at runtime.
///
/// Snapshots are not tagged with their algorithm; importing a snapshot from
/// the other algorithm fails with [`StateError::InvalidLength`] because the
/// two snapshot sizes differ.
#[derive(Debug, Clone)]
pub enum AnyDigest {
    /// SHA-256 handle.
    Sha256(Sha256),
    /// SHA-512 handle.
    Sha512(Sha512),
}

impl AnyDigest {
    /// Creates a handle for `algorithm` in the initial state.
    pub fn new(algorithm: AlgorithmId) -> Self {
        match algorithm {
            AlgorithmId::Sha256 => Self::Sha256(Sha256::new()),
            AlgorithmId::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    /// The algorithm this handle computes.
    pub fn algorithm(&self) -> AlgorithmId {
        match self {
            Self::Sha256(_) => AlgorithmId::Sha256,
            Self::Sha512(_) => AlgorithmId::Sha512,
        }
    }
}

impl From<Sha256> for AnyDigest {
    fn from(hasher: Sha256) -> Self {
        Self::Sha256(hasher)
    }
}

impl From<Sha512> for AnyDigest {
    fn from(hasher: Sha512) -> Self {
        Self::Sha512(hasher)
    }
}

impl StatefulDigest for AnyDigest {
    type Output = Vec<u8>;

    fn scrub(&mut self) {
        match self {
            Self::Sha256(h) => h.scrub(),
            Self::Sha512(h) => h.scrub(),
        }
    }

    fn export_state(&self) -> StateSnapshot {
        match self {
            Self::Sha256(h) => h.export_state(),
            Self::Sha512(h) => h.export_state(),
        }
    }

    fn import_state(&mut self, state: &[u8]) -> Result<(), StateError> {
        match self {
            Self::Sha256(h) => h.import_state(state),
            Self::Sha512(h) => h.import_state(state),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    fn finish(&mut self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finish().to_vec(),
            Self::Sha512(h) => h.finish().to_vec(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Sha256(h) => h.reset(),
            Self::Sha512(h) => h.reset(),
        }
    }

    fn bytes_processed(&self) -> u64 {
        match self {
            Self::Sha256(h) => h.bytes_processed(),
            Self::Sha512(h) => h.bytes_processed(),
        }
    }

    fn output_size(&self) -> usize {
        self.algorithm().digest_size()
    }

    fn state_size(&self) -> usize {
        self.algorithm().state_size()
    }
}
