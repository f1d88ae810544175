//! Differential tests against the RustCrypto `sha2` and `hmac` crates.
//!
//! Inputs are chunked, exported, resumed and reset at arbitrary points; the
//! final output must always match the reference computed over the whole
//! message.

use proptest::prelude::*;
use shastate_core::{
    AlgorithmId, AnyDigest, HmacSha256, HmacSha512, Sha256, Sha512, StatefulDigest,
};

fn reference_digest(algorithm: AlgorithmId, data: &[u8]) -> Vec<u8> {
    use sha2::Digest as _;
    match algorithm {
        AlgorithmId::Sha256 => sha2::Sha256::digest(data).to_vec(),
        AlgorithmId::Sha512 => sha2::Sha512::digest(data).to_vec(),
    }
}

fn reference_mac(algorithm: AlgorithmId, key: &[u8], data: &[u8]) -> Vec<u8> {
    use hmac::Mac as _;
    match algorithm {
        AlgorithmId::Sha256 => {
            let mut mac = hmac::Hmac::<sha2::Sha256>::new_from_slice(key).unwrap();
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        },
        AlgorithmId::Sha512 => {
            let mut mac = hmac::Hmac::<sha2::Sha512>::new_from_slice(key).unwrap();
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        },
    }
}

fn algorithm_strategy() -> impl Strategy<Value = AlgorithmId> {
    prop_oneof![Just(AlgorithmId::Sha256), Just(AlgorithmId::Sha512)]
}

/// Feeds `data` in data-dependent steps of 1..=97 bytes.
fn update_choppy<D: StatefulDigest>(digest: &mut D, data: &[u8]) {
    let mut i = 0usize;
    while i < data.len() {
        let step = (data[i] as usize % 97) + 1;
        let end = data.len().min(i + step);
        digest.update(&data[i..end]);
        i = end;
    }
}

proptest! {
    #[test]
    fn sha256_streaming_matches_sha2(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let mut hasher = Sha256::new();
        update_choppy(&mut hasher, &data);

        prop_assert_eq!(hasher.finish().to_vec(), reference_digest(AlgorithmId::Sha256, &data));
    }

    #[test]
    fn sha512_streaming_matches_sha2(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let mut hasher = Sha512::new();
        update_choppy(&mut hasher, &data);

        prop_assert_eq!(hasher.finish().to_vec(), reference_digest(AlgorithmId::Sha512, &data));
    }

    #[test]
    fn resume_at_any_split_point(
        algorithm in algorithm_strategy(),
        data in prop::collection::vec(any::<u8>(), 0..1024),
        split in any::<prop::sample::Index>(),
    ) {
        let cut = split.index(data.len() + 1);
        let (head, tail) = data.split_at(cut);

        let mut origin = AnyDigest::new(algorithm);
        origin.update(head);
        let snapshot = origin.export_state();
        prop_assert_eq!(snapshot.len(), algorithm.state_size());

        let mut resumed = AnyDigest::new(algorithm);
        resumed.import_state(snapshot.as_bytes()).unwrap();
        resumed.update(tail);

        prop_assert_eq!(resumed.bytes_processed(), data.len() as u64);
        prop_assert_eq!(resumed.finish(), reference_digest(algorithm, &data));
    }

    #[test]
    fn snapshot_chain_through_many_handles(
        algorithm in algorithm_strategy(),
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..200), 0..8),
    ) {
        // Every chunk is absorbed by a new handle resumed from the previous one.
        let mut snapshot = AnyDigest::new(algorithm).export_state();
        for chunk in &chunks {
            let mut handle = AnyDigest::new(algorithm);
            handle.import_state(snapshot.as_bytes()).unwrap();
            handle.update(chunk);
            snapshot = handle.export_state();
        }

        let mut last = AnyDigest::new(algorithm);
        last.import_state(snapshot.as_bytes()).unwrap();

        prop_assert_eq!(last.finish(), reference_digest(algorithm, &chunks.concat()));
    }

    #[test]
    fn finish_and_scrub_reset_to_fresh(
        algorithm in algorithm_strategy(),
        first in prop::collection::vec(any::<u8>(), 0..300),
        second in prop::collection::vec(any::<u8>(), 0..300),
        use_scrub in any::<bool>(),
    ) {
        let mut digest = AnyDigest::new(algorithm);
        digest.update(&first);
        if use_scrub {
            digest.scrub();
        } else {
            prop_assert_eq!(digest.finish(), reference_digest(algorithm, &first));
        }

        prop_assert_eq!(digest.export_state(), AnyDigest::new(algorithm).export_state());

        digest.update(&second);
        prop_assert_eq!(digest.finish(), reference_digest(algorithm, &second));
    }

    #[test]
    fn hmac_sha256_matches_hmac_crate(
        key in prop::collection::vec(any::<u8>(), 0..200),
        data in prop::collection::vec(any::<u8>(), 0..1024),
        split in any::<prop::sample::Index>(),
    ) {
        let (head, tail) = data.split_at(split.index(data.len() + 1));

        let mut origin = HmacSha256::new(&key);
        origin.update(head);
        let snapshot = origin.export_state();

        // The resumed handle starts from an unrelated key; the snapshot
        // carries the real one.
        let mut resumed = HmacSha256::new(b"unrelated");
        resumed.import_state(snapshot.as_bytes()).unwrap();
        resumed.update(tail);

        let expected = reference_mac(AlgorithmId::Sha256, &key, &data);
        prop_assert_eq!(resumed.finish().to_vec(), expected.clone());

        // Same key, next message.
        resumed.update(&data);
        prop_assert_eq!(resumed.finish().to_vec(), expected);
    }

    #[test]
    fn hmac_sha512_matches_hmac_crate(
        key in prop::collection::vec(any::<u8>(), 0..300),
        data in prop::collection::vec(any::<u8>(), 0..1024),
    ) {
        let mut mac = HmacSha512::new(&key);
        update_choppy(&mut mac, &data);

        prop_assert_eq!(mac.finish().to_vec(), reference_mac(AlgorithmId::Sha512, &key, &data));
    }

    #[test]
    fn import_of_arbitrary_bytes_never_panics(
        algorithm in algorithm_strategy(),
        bytes in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut digest = AnyDigest::new(algorithm);
        digest.update(b"before");
        let before = digest.export_state();

        if digest.import_state(&bytes).is_err() {
            prop_assert_eq!(digest.export_state(), before);
        }
    }
}
