//! SHA-2 family parameters.
//!
//! An [`Algorithm`] describes everything the streaming engine needs to know
//! about one member of the family: block and digest sizes, the width of the
//! length field written during padding, the initial chaining value, and the
//! compression function.

use std::{fmt, str::FromStr};

use sha2::digest::{
    consts::{U64, U128},
    generic_array::GenericArray,
};
use zeroize::Zeroize;

use crate::error::UnknownAlgorithm;

/// Size of each counter (buffered bytes, total length) in a state snapshot.
pub const COUNTER_SIZE: usize = 8;

/// A chaining-value word (`u32` for SHA-256, `u64` for SHA-512).
pub trait Word: Copy + Eq + fmt::Debug + Zeroize + Send + Sync + 'static {
    /// Width of the word in bytes.
    const SIZE: usize;

    /// Writes the word big-endian into `out`, which must be `SIZE` bytes.
    fn write_be(self, out: &mut [u8]);

    /// Reads a big-endian word from `bytes`, which must be `SIZE` bytes.
    fn read_be(bytes: &[u8]) -> Self;
}

impl Word for u32 {
    const SIZE: usize = 4;

    fn write_be(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_be_bytes());
    }

    fn read_be(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Self::from_be_bytes(buf)
    }
}

impl Word for u64 {
    const SIZE: usize = 8;

    fn write_be(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_be_bytes());
    }

    fn read_be(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Self::from_be_bytes(buf)
    }
}

/// A member of the SHA-2 family with an eight-word chaining value.
///
/// Implementations are zero-sized markers; all behaviour lives in associated
/// constants and functions.
pub trait Algorithm: Clone + Copy + fmt::Debug + Default + Send + Sync + 'static {
    /// Chaining-value word.
    type Word: Word;

    /// Partial-block buffer, exactly [`Self::BLOCK_SIZE`] bytes.
    type Block: Copy + AsRef<[u8]> + AsMut<[u8]> + Zeroize + Send + Sync;

    /// Digest output, exactly [`Self::DIGEST_SIZE`] bytes.
    type Output: Copy + Eq + fmt::Debug + AsRef<[u8]> + AsMut<[u8]> + Zeroize + Send + Sync;

    /// Runtime identifier.
    const ID: AlgorithmId;

    /// Compression block size in bytes.
    const BLOCK_SIZE: usize;

    /// Digest size in bytes.
    const DIGEST_SIZE: usize;

    /// Width of the big-endian bit-length field appended during padding.
    const LENGTH_SIZE: usize;

    /// Initial chaining value (FIPS 180-4, section 5.3).
    const INITIAL_STATE: [Self::Word; 8];

    /// Returns an all-zero block.
    fn zero_block() -> Self::Block;

    /// Returns an all-zero digest.
    fn zero_output() -> Self::Output;

    /// Applies the compression function to one `BLOCK_SIZE` block.
    fn compress(state: &mut [Self::Word; 8], block: &[u8]);

    /// Size of an exported state snapshot in bytes.
    fn state_size() -> usize {
        Self::DIGEST_SIZE + Self::BLOCK_SIZE + 2 * COUNTER_SIZE
    }
}

/// SHA-256 parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Algorithm;

impl Algorithm for Sha256Algorithm {
    type Word = u32;
    type Block = [u8; 64];
    type Output = [u8; 32];

    const ID: AlgorithmId = AlgorithmId::Sha256;
    const BLOCK_SIZE: usize = 64;
    const DIGEST_SIZE: usize = 32;
    const LENGTH_SIZE: usize = 8;
    const INITIAL_STATE: [u32; 8] = [
        0x6a09_e667,
        0xbb67_ae85,
        0x3c6e_f372,
        0xa54f_f53a,
        0x510e_527f,
        0x9b05_688c,
        0x1f83_d9ab,
        0x5be0_cd19,
    ];

    fn zero_block() -> Self::Block {
        [0u8; 64]
    }

    fn zero_output() -> Self::Output {
        [0u8; 32]
    }

    fn compress(state: &mut [u32; 8], block: &[u8]) {
        let block = GenericArray::<u8, U64>::from_slice(block);
        sha2::compress256(state, std::slice::from_ref(block));
    }
}

/// SHA-512 parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha512Algorithm;

impl Algorithm for Sha512Algorithm {
    type Word = u64;
    type Block = [u8; 128];
    type Output = [u8; 64];

    const ID: AlgorithmId = AlgorithmId::Sha512;
    const BLOCK_SIZE: usize = 128;
    const DIGEST_SIZE: usize = 64;
    const LENGTH_SIZE: usize = 16;
    const INITIAL_STATE: [u64; 8] = [
        0x6a09_e667_f3bc_c908,
        0xbb67_ae85_84ca_a73b,
        0x3c6e_f372_fe94_f82b,
        0xa54f_f53a_5f1d_36f1,
        0x510e_527f_ade6_82d1,
        0x9b05_688c_2b3e_6c1f,
        0x1f83_d9ab_fb41_bd6b,
        0x5be0_cd19_137e_2179,
    ];

    fn zero_block() -> Self::Block {
        [0u8; 128]
    }

    fn zero_output() -> Self::Output {
        [0u8; 64]
    }

    fn compress(state: &mut [u64; 8], block: &[u8]) {
        let block = GenericArray::<u8, U128>::from_slice(block);
        sha2::compress512(state, std::slice::from_ref(block));
    }
}

/// Runtime selector for a SHA-2 family member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    /// SHA-256 (32-byte digest, 64-byte blocks).
    Sha256,
    /// SHA-512 (64-byte digest, 128-byte blocks).
    Sha512,
}

impl AlgorithmId {
    /// All supported algorithms.
    pub const ALL: [Self; 2] = [Self::Sha256, Self::Sha512];

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Compression block size in bytes.
    pub fn block_size(self) -> usize {
        match self {
            Self::Sha256 => Sha256Algorithm::BLOCK_SIZE,
            Self::Sha512 => Sha512Algorithm::BLOCK_SIZE,
        }
    }

    /// Digest size in bytes.
    pub fn digest_size(self) -> usize {
        match self {
            Self::Sha256 => Sha256Algorithm::DIGEST_SIZE,
            Self::Sha512 => Sha512Algorithm::DIGEST_SIZE,
        }
    }

    /// Size of an exported digest state snapshot in bytes.
    pub fn state_size(self) -> usize {
        match self {
            Self::Sha256 => Sha256Algorithm::state_size(),
            Self::Sha512 => Sha512Algorithm::state_size(),
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmId {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}
