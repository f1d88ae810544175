//! HMAC (RFC 2104) over the SHA-2 digests.
//!
//! The handle keeps three digest cores:
//!
//! - `inner`: the running inner hash over `key ^ ipad || message`
//! - `keyed_inner`: the inner hash right after absorbing `key ^ ipad`
//! - `keyed_outer`: the outer hash right after absorbing `key ^ opad`
//!
//! The keyed cores let `finish` and `reset` return to the keyed state without
//! retaining the raw key.
//!
//! # Snapshot format
//!
//! Three digest snapshots back to back: `inner || keyed_inner || keyed_outer`.
//! Both keyed parts must have absorbed exactly one block. This is 336 bytes
//! for HMAC-SHA-256 and 624 bytes for HMAC-SHA-512.
//!
//! # Scrubbing
//!
//! `scrub` wipes all three cores, including the keyed ones. The handle then
//! holds no key material and computes the MAC under the empty key until
//! [`Hmac::rekey`] is called.

use std::fmt;

use zeroize::Zeroize;

use crate::{
    algorithm::{Algorithm, AlgorithmId, Sha256Algorithm, Sha512Algorithm},
    engine::DigestCore,
    error::StateError,
    handle::StatefulDigest,
    state::StateSnapshot,
};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Streaming HMAC with exportable state.
#[derive(Clone)]
pub struct Hmac<A: Algorithm> {
    inner: DigestCore<A>,
    keyed_inner: DigestCore<A>,
    keyed_outer: DigestCore<A>,
}

/// Streaming HMAC-SHA-256.
pub type HmacSha256 = Hmac<Sha256Algorithm>;

/// Streaming HMAC-SHA-512.
pub type HmacSha512 = Hmac<Sha512Algorithm>;

impl<A: Algorithm> Hmac<A> {
    /// Creates a handle keyed with `key`.
    ///
    /// Keys longer than one block are hashed first, as RFC 2104 requires.
    pub fn new(key: &[u8]) -> Self {
        let mut hmac = Self {
            inner: DigestCore::new(),
            keyed_inner: DigestCore::new(),
            keyed_outer: DigestCore::new(),
        };
        hmac.rekey(key);
        hmac
    }

    /// Computes the MAC of `data` under `key` in one shot.
    pub fn mac(key: &[u8], data: &[u8]) -> A::Output {
        let mut hmac = Self::new(key);
        hmac.update(data);
        hmac.finish()
    }

    /// Discards the running state and re-keys the handle.
    pub fn rekey(&mut self, key: &[u8]) {
        let mut key_block = A::zero_block();

        if key.len() > A::BLOCK_SIZE {
            let mut hashed = DigestCore::<A>::new();
            hashed.update(key);
            let mut digest = A::zero_output();
            hashed.finalize_into(digest.as_mut());
            key_block.as_mut()[..A::DIGEST_SIZE].copy_from_slice(digest.as_ref());
            digest.zeroize();
        } else {
            key_block.as_mut()[..key.len()].copy_from_slice(key);
        }

        let mut pad = key_block;
        pad.as_mut().iter_mut().for_each(|b| *b ^= IPAD);
        self.keyed_inner.scrub();
        self.keyed_inner.update(pad.as_ref());

        for (p, k) in pad.as_mut().iter_mut().zip(key_block.as_ref()) {
            *p = k ^ OPAD;
        }
        self.keyed_outer.scrub();
        self.keyed_outer.update(pad.as_ref());

        pad.zeroize();
        key_block.zeroize();

        self.inner = self.keyed_inner.clone();
    }

    /// The underlying digest algorithm.
    pub fn algorithm(&self) -> AlgorithmId {
        A::ID
    }
}

impl<A: Algorithm> fmt::Debug for Hmac<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hmac")
            .field("algorithm", &A::ID)
            .field("bytes_processed", &self.bytes_processed())
            .finish_non_exhaustive()
    }
}

impl<A: Algorithm> StatefulDigest for Hmac<A> {
    type Output = A::Output;

    fn scrub(&mut self) {
        tracing::trace!(algorithm = %A::ID, "scrubbing hmac state");
        self.inner.zeroize();
        self.keyed_inner.zeroize();
        self.keyed_outer.zeroize();
        self.rekey(&[]);
    }

    fn export_state(&self) -> StateSnapshot {
        let mut bytes = Vec::with_capacity(3 * A::state_size());
        self.inner.encode_into(&mut bytes);
        self.keyed_inner.encode_into(&mut bytes);
        self.keyed_outer.encode_into(&mut bytes);

        tracing::debug!(
            algorithm = %A::ID,
            bytes_processed = self.bytes_processed(),
            size = bytes.len(),
            "exported hmac state"
        );

        StateSnapshot::from_vec(bytes)
    }

    fn import_state(&mut self, state: &[u8]) -> Result<(), StateError> {
        let (inner, keyed_inner, keyed_outer) = decode_parts::<A>(state).inspect_err(|error| {
            tracing::warn!(algorithm = %A::ID, %error, "rejected hmac state");
        })?;

        self.inner = inner;
        self.keyed_inner = keyed_inner;
        self.keyed_outer = keyed_outer;

        tracing::debug!(
            algorithm = %A::ID,
            bytes_processed = self.bytes_processed(),
            "imported hmac state"
        );

        Ok(())
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finish(&mut self) -> A::Output {
        let mut inner_digest = A::zero_output();
        self.inner.finalize_into(inner_digest.as_mut());

        let mut outer = self.keyed_outer.clone();
        outer.update(inner_digest.as_ref());
        let mut out = A::zero_output();
        outer.finalize_into(out.as_mut());

        inner_digest.zeroize();
        self.inner = self.keyed_inner.clone();
        out
    }

    fn reset(&mut self) {
        self.inner = self.keyed_inner.clone();
    }

    fn bytes_processed(&self) -> u64 {
        self.inner.length.wrapping_sub(A::BLOCK_SIZE as u64)
    }

    fn output_size(&self) -> usize {
        A::DIGEST_SIZE
    }

    fn state_size(&self) -> usize {
        3 * A::state_size()
    }
}

fn decode_parts<A: Algorithm>(
    state: &[u8],
) -> Result<(DigestCore<A>, DigestCore<A>, DigestCore<A>), StateError> {
    let part = A::state_size();
    if state.len() != 3 * part {
        return Err(StateError::InvalidLength { expected: 3 * part, actual: state.len() });
    }

    let (inner, keyed) = state.split_at(part);
    let (keyed_inner, keyed_outer) = keyed.split_at(part);

    let inner = DigestCore::<A>::decode(inner)?;
    let keyed_inner = decode_keyed::<A>(keyed_inner)?;
    let keyed_outer = decode_keyed::<A>(keyed_outer)?;

    // The running inner hash always starts with the padded key block.
    if inner.length < A::BLOCK_SIZE as u64 {
        return Err(StateError::InvalidHmacKeyState {
            length: inner.length,
            buffered: inner.buffered as u64,
        });
    }

    Ok((inner, keyed_inner, keyed_outer))
}

fn decode_keyed<A: Algorithm>(bytes: &[u8]) -> Result<DigestCore<A>, StateError> {
    let core = DigestCore::<A>::decode(bytes)?;
    if core.length != A::BLOCK_SIZE as u64 || core.buffered != 0 {
        return Err(StateError::InvalidHmacKeyState {
            length: core.length,
            buffered: core.buffered as u64,
        });
    }
    Ok(core)
}
