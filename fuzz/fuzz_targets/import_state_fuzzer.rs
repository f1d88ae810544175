//! Fuzz target for snapshot import
//!
//! Snapshots cross process boundaries, so `import_state` sees attacker
//! controlled bytes.
//!
//! # Strategy
//!
//! - Raw bytes: arbitrary lengths and contents, fed to every handle type
//! - Near-valid: a real snapshot with fuzzer-chosen bytes patched in, so the
//!   length check passes and the counter checks are exercised
//!
//! # Invariants
//!
//! - NEVER panic on any input
//! - Rejected snapshot leaves the handle's exported state unchanged
//! - Accepted snapshot re-exports byte-identically apart from the ignored
//!   block tail
//! - Accepted snapshot never yields `buffered >= block size`: the handle can
//!   absorb and finish without panicking

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shastate_core::{HmacSha256, HmacSha512, Sha256, Sha512, StatefulDigest};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    target: u8,
    prefix: Vec<u8>,
    patch_offset: u16,
    patch: Vec<u8>,
    raw: bool,
    tail: Vec<u8>,
}

fn counter(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_be_bytes(buf)
}

/// Compares every snapshot part field by field: chaining value, counters and
/// the buffered block prefix must survive, and the block tail re-exports as
/// zeros.
fn assert_reexport_matches(exported: &[u8], candidate: &[u8], chaining: usize) {
    // Every algorithm here has a block twice the chaining value's size.
    let block = 2 * chaining;
    let part = chaining + block + 16;
    assert_eq!(exported.len(), candidate.len());

    for (out, src) in exported.chunks_exact(part).zip(candidate.chunks_exact(part)) {
        assert_eq!(out[..chaining], src[..chaining], "chaining value changed");
        assert_eq!(out[chaining + block..], src[chaining + block..], "counters changed");

        let buffered = usize::try_from(counter(&src[chaining + block..part - 8]))
            .unwrap_or(usize::MAX);
        assert!(buffered < block, "accepted buffered count {buffered}");

        let out_block = &out[chaining..chaining + block];
        let src_block = &src[chaining..chaining + block];
        assert_eq!(out_block[..buffered], src_block[..buffered], "buffered bytes changed");
        assert!(out_block[buffered..].iter().all(|&b| b == 0), "stale block bytes exported");
    }
}

fn check<D: StatefulDigest>(mut handle: D, input: &FuzzInput) {
    handle.update(&input.prefix);
    let before = handle.export_state();

    let candidate = if input.raw {
        input.patch.clone()
    } else {
        let mut bytes = before.as_bytes().to_vec();
        let start = usize::from(input.patch_offset) % bytes.len();
        for (dst, src) in bytes[start..].iter_mut().zip(&input.patch) {
            *dst = *src;
        }
        bytes
    };

    match handle.import_state(&candidate) {
        Ok(()) => {
            let exported = handle.export_state();
            assert_reexport_matches(exported.as_bytes(), &candidate, handle.output_size());
            handle.update(&input.tail);
            let output = handle.finish();
            assert_eq!(output.as_ref().len(), handle.output_size());
        },
        Err(_) => {
            assert_eq!(handle.export_state(), before, "rejected import modified the handle");
        },
    }
}

fuzz_target!(|input: FuzzInput| {
    match input.target % 4 {
        0 => check(Sha256::new(), &input),
        1 => check(Sha512::new(), &input),
        2 => check(HmacSha256::new(b"fuzz key"), &input),
        _ => check(HmacSha512::new(b"fuzz key"), &input),
    }
});
