//! State snapshot format.
//!
//! A digest snapshot is the running context laid out as fixed-width fields,
//! all integers big-endian:
//!
//! ```text
//! +---------------------+----------------------+--------------+-------------+
//! | chaining value      | partial block        | buffered     | length      |
//! | DIGEST_SIZE bytes   | BLOCK_SIZE bytes     | u64 BE       | u64 BE      |
//! +---------------------+----------------------+--------------+-------------+
//! ```
//!
//! Bytes of the partial block past `buffered` are always written as zero and
//! ignored on import. `length` counts bytes, not bits.
//!
//! | algorithm | snapshot size |
//! |-----------|---------------|
//! | SHA-256   | 112 bytes     |
//! | SHA-512   | 208 bytes     |
//!
//! HMAC snapshots concatenate three digest snapshots (see [`crate::hmac`]).

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    algorithm::{Algorithm, COUNTER_SIZE, Word},
    engine::DigestCore,
    error::StateError,
};

/// Exported digest state.
///
/// Contains the buffered tail of the input, so it is treated as secret:
/// the bytes are zeroized on drop and `Debug` only reports the size.
#[derive(Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    bytes: Vec<u8>,
}

impl StateSnapshot {
    pub(crate) fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Snapshot bytes, suitable for `import_state`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Snapshot size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the snapshot holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Takes ownership of the bytes. The caller becomes responsible for
    /// wiping them.
    pub fn into_bytes(mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

impl AsRef<[u8]> for StateSnapshot {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for StateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSnapshot")
            .field("bytes", &format!("<redacted {} bytes>", self.bytes.len()))
            .finish()
    }
}

impl Drop for StateSnapshot {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl ZeroizeOnDrop for StateSnapshot {}

impl<A: Algorithm> DigestCore<A> {
    /// Appends this core's snapshot to `out`.
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + A::state_size(), 0);
        let snapshot = &mut out[start..];

        let (words, rest) = snapshot.split_at_mut(A::DIGEST_SIZE);
        let (block, counters) = rest.split_at_mut(A::BLOCK_SIZE);
        let (buffered, length) = counters.split_at_mut(COUNTER_SIZE);

        for (word, chunk) in self.state.iter().zip(words.chunks_exact_mut(A::Word::SIZE)) {
            word.write_be(chunk);
        }
        block[..self.buffered].copy_from_slice(&self.block.as_ref()[..self.buffered]);
        buffered.copy_from_slice(&(self.buffered as u64).to_be_bytes());
        length.copy_from_slice(&self.length.to_be_bytes());
    }

    /// Parses and validates one digest snapshot.
    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, StateError> {
        let expected = A::state_size();
        if bytes.len() != expected {
            return Err(StateError::InvalidLength { expected, actual: bytes.len() });
        }

        let (words, rest) = bytes.split_at(A::DIGEST_SIZE);
        let (block, counters) = rest.split_at(A::BLOCK_SIZE);
        let (buffered, length) = counters.split_at(COUNTER_SIZE);
        let buffered = read_counter(buffered);
        let length = read_counter(length);

        let block_size = A::BLOCK_SIZE;
        let buffered_len = usize::try_from(buffered)
            .ok()
            .filter(|&n| n < block_size)
            .ok_or(StateError::BufferedOverflow { buffered, block_size })?;

        if length % block_size as u64 != buffered {
            return Err(StateError::LengthMismatch { buffered, length });
        }

        let mut core = Self::new();
        for (word, chunk) in core.state.iter_mut().zip(words.chunks_exact(A::Word::SIZE)) {
            *word = A::Word::read_be(chunk);
        }
        core.block.as_mut()[..buffered_len].copy_from_slice(&block[..buffered_len]);
        core.buffered = buffered_len;
        core.length = length;

        Ok(core)
    }
}

fn read_counter(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; COUNTER_SIZE];
    buf.copy_from_slice(bytes);
    u64::from_be_bytes(buf)
}
