//! Streaming engine shared by every handle.
//!
//! `DigestCore` owns the chaining value, the partial-block buffer and the two
//! counters. It knows nothing about snapshots or keys; those are layered on
//! top in `state` and `hmac`.
//!
//! # Invariants
//!
//! - `buffered < A::BLOCK_SIZE` between calls
//! - `length % A::BLOCK_SIZE == buffered` (length wraps at 2^64)
//! - bytes of `block` past `buffered` are meaningless

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::algorithm::{Algorithm, Word};

#[derive(Clone)]
pub(crate) struct DigestCore<A: Algorithm> {
    pub(crate) state: [A::Word; 8],
    pub(crate) block: A::Block,
    pub(crate) buffered: usize,
    pub(crate) length: u64,
}

impl<A: Algorithm> DigestCore<A> {
    pub(crate) fn new() -> Self {
        Self { state: A::INITIAL_STATE, block: A::zero_block(), buffered: 0, length: 0 }
    }

    pub(crate) fn update(&mut self, mut data: &[u8]) {
        self.length = self.length.wrapping_add(data.len() as u64);

        // Top up a partially filled block first.
        if self.buffered > 0 {
            let take = (A::BLOCK_SIZE - self.buffered).min(data.len());
            self.block.as_mut()[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];

            if self.buffered < A::BLOCK_SIZE {
                return;
            }

            A::compress(&mut self.state, self.block.as_ref());
            self.buffered = 0;
        }

        let mut blocks = data.chunks_exact(A::BLOCK_SIZE);
        for block in &mut blocks {
            A::compress(&mut self.state, block);
        }

        let rest = blocks.remainder();
        self.block.as_mut()[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Pads, compresses the final block(s) and writes the digest to `out`.
    ///
    /// Leaves the core in a spent state; callers reset or wipe it afterwards.
    pub(crate) fn finalize_into(&mut self, out: &mut [u8]) {
        let bit_length = u128::from(self.length) << 3;
        let length_offset = A::BLOCK_SIZE - A::LENGTH_SIZE;
        let block = self.block.as_mut();

        block[self.buffered] = 0x80;

        if A::BLOCK_SIZE - self.buffered <= A::LENGTH_SIZE {
            // No room for the length field, spill into an extra block.
            block[self.buffered + 1..].fill(0);
            A::compress(&mut self.state, block);
            block[..length_offset].fill(0);
        } else {
            block[self.buffered + 1..length_offset].fill(0);
        }

        // SHA-256 keeps the low 64 bits of the bit length, SHA-512 all 128.
        let encoded = bit_length.to_be_bytes();
        block[length_offset..].copy_from_slice(&encoded[encoded.len() - A::LENGTH_SIZE..]);
        A::compress(&mut self.state, block);

        for (word, chunk) in self.state.iter().zip(out.chunks_exact_mut(A::Word::SIZE)) {
            word.write_be(chunk);
        }
    }

    /// Zeroizes everything and reloads the initial chaining value.
    pub(crate) fn scrub(&mut self) {
        self.zeroize();
        self.state = A::INITIAL_STATE;
    }

    #[cfg(test)]
    pub(crate) fn is_initial(&self) -> bool {
        self.length == 0 && self.buffered == 0 && self.state == A::INITIAL_STATE
    }
}

impl<A: Algorithm> Zeroize for DigestCore<A> {
    fn zeroize(&mut self) {
        self.state.zeroize();
        self.block.zeroize();
        self.buffered.zeroize();
        self.length.zeroize();
    }
}

impl<A: Algorithm> Drop for DigestCore<A> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<A: Algorithm> ZeroizeOnDrop for DigestCore<A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{Sha256Algorithm, Sha512Algorithm};

    fn finish<A: Algorithm>(core: &mut DigestCore<A>) -> A::Output {
        let mut out = A::zero_output();
        core.finalize_into(out.as_mut());
        out
    }

    #[test]
    fn update_keeps_counters_consistent() {
        let mut core = DigestCore::<Sha256Algorithm>::new();
        for len in [0usize, 1, 63, 64, 65, 127, 200] {
            core.update(&vec![0xAB; len]);
            assert!(core.buffered < Sha256Algorithm::BLOCK_SIZE);
            assert_eq!(core.length % 64, core.buffered as u64);
        }
        assert_eq!(core.length, 520);
    }

    #[test]
    fn exact_block_leaves_nothing_buffered() {
        let mut core = DigestCore::<Sha512Algorithm>::new();
        core.update(&[7u8; 128]);
        assert_eq!(core.buffered, 0);
        assert_ne!(core.state, Sha512Algorithm::INITIAL_STATE);
    }

    #[test]
    fn padding_boundaries_match_one_shot() {
        // 55/56 bytes straddle the SHA-256 length-field boundary,
        // 111/112 the SHA-512 one.
        for len in [55usize, 56, 63, 64, 111, 112, 119, 120, 127, 128] {
            let data = vec![b'x'; len];

            let mut whole = DigestCore::<Sha256Algorithm>::new();
            whole.update(&data);

            let mut split = DigestCore::<Sha256Algorithm>::new();
            for byte in &data {
                split.update(std::slice::from_ref(byte));
            }

            assert_eq!(finish(&mut whole), finish(&mut split), "sha256 len {len}");

            let mut whole = DigestCore::<Sha512Algorithm>::new();
            whole.update(&data);

            let mut split = DigestCore::<Sha512Algorithm>::new();
            let (head, tail) = data.split_at(len / 3);
            split.update(head);
            split.update(tail);

            assert_eq!(finish(&mut whole), finish(&mut split), "sha512 len {len}");
        }
    }

    #[test]
    fn scrub_restores_initial_state() {
        let mut core = DigestCore::<Sha256Algorithm>::new();
        core.update(b"secret material");
        assert!(!core.is_initial());

        core.scrub();

        assert!(core.is_initial());
        assert!(core.block.iter().all(|&b| b == 0));
    }
}
