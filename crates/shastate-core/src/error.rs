//! Error types.

use thiserror::Error;

/// Errors from importing a state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Snapshot size doesn't match the handle's algorithm.
    #[error("invalid state length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Snapshot size for the importing handle.
        expected: usize,
        /// Size of the provided snapshot.
        actual: usize,
    },

    /// Buffered byte count doesn't fit in one block.
    #[error("buffered byte count {buffered} exceeds block size {block_size}")]
    BufferedOverflow {
        /// Buffered byte count found in the snapshot.
        buffered: u64,
        /// Block size of the importing handle.
        block_size: usize,
    },

    /// Buffered byte count disagrees with the total length.
    #[error("buffered byte count {buffered} inconsistent with total length {length}")]
    LengthMismatch {
        /// Buffered byte count found in the snapshot.
        buffered: u64,
        /// Total length found in the snapshot.
        length: u64,
    },

    /// A keyed HMAC state has not absorbed exactly one padded key block.
    #[error("invalid HMAC key state: length {length}, buffered {buffered}")]
    InvalidHmacKeyState {
        /// Total length found in the keyed state.
        length: u64,
        /// Buffered byte count found in the keyed state.
        buffered: u64,
    },
}

impl StateError {
    /// Returns true if the snapshot has the right size but corrupt contents.
    ///
    /// A size mismatch usually means the snapshot was produced by a different
    /// algorithm. Everything else means the bytes were damaged or forged.
    pub fn is_corrupt(&self) -> bool {
        match self {
            Self::InvalidLength { .. } => false,

            Self::BufferedOverflow { .. }
            | Self::LengthMismatch { .. }
            | Self::InvalidHmacKeyState { .. } => true,
        }
    }
}

/// Unrecognized algorithm name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm: {0} (expected sha256 or sha512)")]
pub struct UnknownAlgorithm(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_length_is_not_corrupt() {
        let err = StateError::InvalidLength { expected: 112, actual: 208 };
        assert!(!err.is_corrupt());
    }

    #[test]
    fn counter_errors_are_corrupt() {
        assert!(StateError::BufferedOverflow { buffered: 64, block_size: 64 }.is_corrupt());
        assert!(StateError::LengthMismatch { buffered: 3, length: 64 }.is_corrupt());
        assert!(StateError::InvalidHmacKeyState { length: 0, buffered: 0 }.is_corrupt());
    }

    #[test]
    fn error_display() {
        let err = StateError::InvalidLength { expected: 112, actual: 7 };
        assert_eq!(err.to_string(), "invalid state length: expected 112 bytes, got 7");

        let err = UnknownAlgorithm("md5".to_string());
        assert_eq!(err.to_string(), "unknown algorithm: md5 (expected sha256 or sha512)");
    }
}
