//! Digest handles.

use std::fmt;

use crate::{
    algorithm::{Algorithm, AlgorithmId, Sha256Algorithm, Sha512Algorithm},
    engine::DigestCore,
    error::StateError,
    state::StateSnapshot,
};

/// A streaming digest whose running state can be exported and imported.
///
/// # Invariants
///
/// - Chunking: any split of the input across `update` calls produces the
///   same output as a single call with the concatenation
/// - Resumption: `import_state(export_state())` on a fresh handle of the same
///   type continues exactly where the exporter left off
/// - Atomic import: a rejected snapshot leaves the handle unchanged
/// - Reset: after `finish` or `scrub` the handle exports the same snapshot as
///   a freshly constructed one
pub trait StatefulDigest: Clone + Send + Sync {
    /// Digest output.
    type Output: Clone + Eq + fmt::Debug + AsRef<[u8]>;

    /// Wipes the running state and returns to the initial state.
    fn scrub(&mut self);

    /// Snapshots the running state without disturbing it.
    fn export_state(&self) -> StateSnapshot;

    /// Replaces the running state with a previously exported snapshot.
    fn import_state(&mut self, state: &[u8]) -> Result<(), StateError>;

    /// Absorbs more input.
    fn update(&mut self, data: &[u8]);

    /// Produces the digest of everything absorbed since the last reset, then
    /// resets the handle.
    fn finish(&mut self) -> Self::Output;

    /// Returns to the initial state, discarding absorbed input.
    fn reset(&mut self);

    /// Bytes of input absorbed since the last reset (modulo 2^64).
    fn bytes_processed(&self) -> u64;

    /// Digest output size in bytes.
    fn output_size(&self) -> usize;

    /// Snapshot size in bytes.
    fn state_size(&self) -> usize;
}

/// Streaming SHA-2 digest.
#[derive(Clone)]
pub struct Hasher<A: Algorithm> {
    core: DigestCore<A>,
}

/// Streaming SHA-256.
pub type Sha256 = Hasher<Sha256Algorithm>;

/// Streaming SHA-512.
pub type Sha512 = Hasher<Sha512Algorithm>;

impl<A: Algorithm> Hasher<A> {
    /// Creates a handle in the initial state.
    pub fn new() -> Self {
        Self { core: DigestCore::new() }
    }

    /// Computes the digest of `data` in one shot.
    pub fn digest(data: &[u8]) -> A::Output {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finish()
    }

    /// The algorithm this handle computes.
    pub fn algorithm(&self) -> AlgorithmId {
        A::ID
    }
}

impl<A: Algorithm> Default for Hasher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Algorithm> fmt::Debug for Hasher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher")
            .field("algorithm", &A::ID)
            .field("bytes_processed", &self.core.length)
            .finish_non_exhaustive()
    }
}

impl<A: Algorithm> StatefulDigest for Hasher<A> {
    type Output = A::Output;

    fn scrub(&mut self) {
        tracing::trace!(algorithm = %A::ID, "scrubbing digest state");
        self.core.scrub();
    }

    fn export_state(&self) -> StateSnapshot {
        let mut bytes = Vec::with_capacity(A::state_size());
        self.core.encode_into(&mut bytes);

        tracing::debug!(
            algorithm = %A::ID,
            bytes_processed = self.core.length,
            size = bytes.len(),
            "exported digest state"
        );

        StateSnapshot::from_vec(bytes)
    }

    fn import_state(&mut self, state: &[u8]) -> Result<(), StateError> {
        let core = DigestCore::decode(state).inspect_err(|error| {
            tracing::warn!(algorithm = %A::ID, %error, "rejected digest state");
        })?;
        self.core = core;

        tracing::debug!(
            algorithm = %A::ID,
            bytes_processed = self.core.length,
            "imported digest state"
        );

        Ok(())
    }

    fn update(&mut self, data: &[u8]) {
        self.core.update(data);
    }

    fn finish(&mut self) -> A::Output {
        tracing::trace!(
            algorithm = %A::ID,
            bytes_processed = self.core.length,
            "finishing digest"
        );

        let mut out = A::zero_output();
        self.core.finalize_into(out.as_mut());
        self.core.scrub();
        out
    }

    fn reset(&mut self) {
        self.core.scrub();
    }

    fn bytes_processed(&self) -> u64 {
        self.core.length
    }

    fn output_size(&self) -> usize {
        A::DIGEST_SIZE
    }

    fn state_size(&self) -> usize {
        A::state_size()
    }
}
