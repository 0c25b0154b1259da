//! Tests for the Dagger-Hashimoto core

use proptest::prelude::*;

use crate::{
    Cache, Dataset, DatasetLookup, Error, Hasher, Keccak512Hasher, LightLookup, RawLookup,
    Sha512Hasher, build_cache, build_dataset_item, build_mask_item, hashimoto, hashimoto_full,
    hashimoto_light, hashimoto_seeded, quick_digest, ROW_BYTES, ROW_WORDS,
};

/// Header digest used by the reference vectors
const REFERENCE_HEADER: &str = "2cfe17dc69e953b28d77cdb7cdc86ce378dfe1e846f4be9cbe9dfb18efa5dfb5";

/// Cache size of the reference vectors (16 rows)
const REFERENCE_CACHE_BYTES: usize = 1024;

/// Dataset size of the Hashimoto reference vectors (64 rows)
const REFERENCE_DATASET_BYTES: usize = 64 * ROW_BYTES;

fn reference_header() -> [u8; 32] {
    let mut header = [0u8; 32];
    header.copy_from_slice(&hex::decode(REFERENCE_HEADER).unwrap());
    header
}

fn reference_cache() -> Cache {
    Cache::new(0, b"123", REFERENCE_CACHE_BYTES, &mut Sha512Hasher::default()).unwrap()
}

#[test]
fn test_cache_is_deterministic() {
    let mut hasher = Sha512Hasher::default();
    let mut first = vec![0u32; 64 * ROW_WORDS];
    let mut second = vec![0xFFFF_FFFFu32; 64 * ROW_WORDS];

    build_cache(&mut first, 3, b"epoch-3 seed", &mut hasher).unwrap();
    build_cache(&mut second, 3, b"epoch-3 seed", &mut hasher.clone()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_different_seeds_produce_different_caches() {
    let mut hasher = Sha512Hasher::default();
    let a = Cache::new(0, b"seed a", 2048, &mut hasher).unwrap();
    let b = Cache::new(0, b"seed b", 2048, &mut hasher).unwrap();
    assert_ne!(a.as_words(), b.as_words());
}

#[test]
fn test_cache_size_validation() {
    let mut hasher = Sha512Hasher::default();
    let mut buffer = vec![0u32; 2 * ROW_WORDS - 1];
    assert_eq!(
        build_cache(&mut buffer, 0, b"123", &mut hasher),
        Err(Error::UnalignedCache {
            len: 2 * ROW_WORDS - 1
        })
    );
}

/// Seed "123", 1024-byte cache, SHA-512: these words match the Python
/// reference (`generate_cache` with `sha512`) and must never change.
#[test]
fn test_reference_cache_vector() {
    let cache = reference_cache();
    let words = cache.as_words();

    assert_eq!(cache.rows(), 16);
    assert_eq!(&words[..4], &[2554638917, 1129735422, 3491177676, 2878799325]);
    assert_eq!(words[words.len() - 1], 2653144808);
}

#[test]
fn test_reference_item_vector() {
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();

    let item = build_dataset_item(&cache, 123, &mut hasher);
    assert_eq!(
        hex::encode(item),
        "c098aa298730026b820035f4587d37737e3f5733010a61e5f833ee4e7535955f\
         6f3cbc75a65881d3957ec972b4fae8226804a78a09bb450d5d0b5303fb836fc1"
    );
}

#[test]
fn test_reference_mask_vector() {
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();

    let init_hash = build_dataset_item(&cache, 123, &mut hasher);
    let mask = build_mask_item(&cache, 123, &init_hash, &mut hasher);
    assert_eq!(
        hex::encode(mask),
        "46df553f850fc96736a154a247c7e511a70d5f8c3f8bdd1fc098c64dad77bd73\
         41be534f0538e525cf79cede6c9ecf45b1c1418aba2cfbc5021b78517d87372a"
    );
}

#[test]
fn test_reference_item_vector_wide_index() {
    // Index wider than 32 bits: the row is picked modulo the cache, the
    // low 32 bits feed the mixing
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();

    let item = build_dataset_item(&cache, (1u64 << 40) + 5, &mut hasher);
    assert_eq!(
        hex::encode(item),
        "387bf9571b609d6c0994d287b1c6f5cf5910a8cb9dcc1a5db88aa9ba2f416b94\
         b14ad739a772ff24f803ac76d01ee33f93684ef7abab86c5615c8648a5b03c86"
    );
}

#[test]
fn test_reference_hashimoto_vectors() {
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();
    let header = reference_header();

    let cases = [
        (
            0u64,
            "6fe888d8aaf67178b1b0ad61ea9729c12dbac19e9a787eae769cc52cac52e406",
            "29a48d64bd8765b5d9fa295df87a30d0b930c042cf51dc3dea6f7dca0805f31e",
        ),
        (
            42u64,
            "b8d7ba9c26f76d8d3c678544bff70c9b2d50f415d99866d8b044777603b38869",
            "1606ac83985c1a2b233d7fb9f8d0cbe42f87e88710e8f1d9bc062c64197f796e",
        ),
    ];

    for (nonce, digest, mix) in cases {
        let out =
            hashimoto_light(&cache, &header, nonce, REFERENCE_DATASET_BYTES as u64, &mut hasher)
                .unwrap();
        assert_eq!(hex::encode(out.digest), digest, "digest, nonce {}", nonce);
        assert_eq!(hex::encode(out.mix_digest), mix, "mix digest, nonce {}", nonce);
    }
}

#[test]
fn test_reference_keccak512_vectors() {
    let mut hasher = Keccak512Hasher::default();
    let cache = Cache::new(0, b"123", REFERENCE_CACHE_BYTES, &mut hasher).unwrap();

    let item = build_dataset_item(&cache, 123, &mut hasher);
    assert_eq!(
        hex::encode(item),
        "50bb0fc70648cbdee4c38cdf06e5f5d5d050175b2e3079231363c53c2ce47319\
         64f583dd038c9f67fa5ff9321bef91f0e46cb571561edb914d409a3c214e38e0"
    );

    let out = hashimoto_light(
        &cache,
        &reference_header(),
        0,
        REFERENCE_DATASET_BYTES as u64,
        &mut hasher,
    )
    .unwrap();
    assert_eq!(
        hex::encode(out.digest),
        "28be9854b0c0ec51dfc578fe65e5f519c97c467594caaa58a85a5ce9cbaa0355"
    );
    assert_eq!(
        hex::encode(out.mix_digest),
        "a1d606ff98a8f0da23bb81fd2c653afbf5e72a5994d6229c8a05e52deba18278"
    );
}

/// Self-check of the reference: seed `H("123")`, rows read straight out of
/// the 16-row cache, which is therefore also the whole dataset.
#[test]
fn test_reference_seeded_hashimoto_over_cache_rows() {
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();
    let seed = hasher.digest(b"123");

    let bytes = cache.to_bytes();
    let mut lookup = RawLookup::new(&bytes);
    let out = hashimoto_seeded(&mut hasher, &seed, bytes.len() as u64, &mut lookup).unwrap();

    assert_eq!(bytes.len(), REFERENCE_CACHE_BYTES);
    assert_eq!(
        hex::encode(out.mix_digest),
        "a35905961116a162bd58f9bf83ea40198b7cb2469ddb6844df1cbc9109f194aa"
    );
    assert_eq!(
        hex::encode(out.digest),
        "63e4b9cac3dd59639c7ecd46f452b048f49612d5f8235bf561d34b8928d887d8"
    );
}

#[test]
fn test_light_and_full_rows_match() {
    let cache = reference_cache();
    let hasher = Sha512Hasher::default();
    let dataset = Dataset::generate(&cache, REFERENCE_DATASET_BYTES, &hasher).unwrap();

    let mut light = LightLookup::new(&cache, hasher.clone());
    let mut full = &dataset;
    for index in 0..dataset.rows() {
        assert_eq!(
            light.fetch(index).unwrap(),
            full.fetch(index).unwrap(),
            "row {} differs",
            index
        );
    }
}

#[test]
fn test_light_and_full_hashimoto_match() {
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();
    let dataset = Dataset::generate(&cache, REFERENCE_DATASET_BYTES, &hasher).unwrap();
    let header = reference_header();

    for nonce in [0u64, 1, 42, u64::MAX] {
        let light =
            hashimoto_light(&cache, &header, nonce, dataset.size_bytes(), &mut hasher).unwrap();
        let full = hashimoto_full(&dataset, &header, nonce, &mut hasher).unwrap();
        assert_eq!(light, full, "nonce {}", nonce);
    }
}

#[test]
fn test_raw_bytes_lookup_matches_dataset() {
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();
    let dataset = Dataset::generate(&cache, REFERENCE_DATASET_BYTES, &hasher).unwrap();

    let mut bytes = vec![0u8; REFERENCE_DATASET_BYTES];
    for (index, chunk) in bytes.chunks_exact_mut(ROW_BYTES).enumerate() {
        chunk.copy_from_slice(&build_dataset_item(&cache, index as u64, &mut hasher));
    }

    let header = reference_header();
    let mut raw = RawLookup::new(&bytes);
    let from_raw = hashimoto(&mut hasher, &header, 9, bytes.len() as u64, &mut raw).unwrap();
    let from_dataset = hashimoto_full(&dataset, &header, 9, &mut hasher).unwrap();
    assert_eq!(from_raw, from_dataset);
}

#[test]
fn test_dataset_size_must_match_lookup() {
    // A full dataset cannot answer for rows it does not hold
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();
    let dataset = Dataset::generate(&cache, 4 * ROW_BYTES, &hasher).unwrap();

    let mut lookup = &dataset;
    let result = hashimoto(
        &mut hasher,
        &reference_header(),
        0,
        REFERENCE_DATASET_BYTES as u64,
        &mut lookup,
    );
    // The first access for nonce 0 already lands on page 26
    assert_eq!(
        result,
        Err(Error::RowOutOfRange {
            index: 52,
            available: 4
        })
    );
}

#[test]
fn test_verify_rejects_unaligned_dataset_size() {
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();
    let result = hashimoto_light(&cache, &reference_header(), 0, 4095, &mut hasher);
    assert_eq!(result, Err(Error::UnalignedDataset { bytes: 4095 }));
}

#[test]
fn test_quick_digest_accepts_honest_proof() {
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();
    let header = reference_header();

    let out = hashimoto_light(&cache, &header, 77, 8192, &mut hasher).unwrap();
    assert_eq!(quick_digest(&mut hasher, &header, 77, &out.mix_digest), out.digest);
}

#[test]
fn test_avalanche_on_nonce_bit_flip() {
    // Flipping one nonce bit should change ~50% of the 256 digest bits
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();
    let header = reference_header();

    let samples = 16u32;
    let mut total_diff = 0u32;
    for sample in 0..samples {
        let nonce = 0x0123_4567_89AB_CDEFu64.wrapping_mul(sample as u64 + 1);
        let flipped = nonce ^ (1u64 << (sample % 64));

        let a = hashimoto_light(&cache, &header, nonce, 8192, &mut hasher).unwrap();
        let b = hashimoto_light(&cache, &header, flipped, 8192, &mut hasher).unwrap();

        total_diff += a
            .digest
            .iter()
            .zip(b.digest.iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum::<u32>();
    }

    let average = total_diff / samples;
    assert!(
        (100..=156).contains(&average),
        "Avalanche effect: {} bits differ on average (expected ~128)",
        average
    );
}

#[test]
fn test_concurrent_verification_matches_sequential() {
    let cache = reference_cache();
    let header = reference_header();
    let hasher = Sha512Hasher::default();

    let expected: Vec<_> = (0..8u64)
        .map(|nonce| hashimoto_light(&cache, &header, nonce, 8192, &mut hasher.clone()).unwrap())
        .collect();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8u64)
            .map(|nonce| {
                let cache = &cache;
                let mut hasher = hasher.clone();
                scope.spawn(move || {
                    hashimoto_light(cache, &header, nonce, 8192, &mut hasher).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, expected);
}

#[test]
fn test_lookup_as_trait_object() {
    let cache = reference_cache();
    let mut hasher = Sha512Hasher::default();
    let header = reference_header();

    let mut light = LightLookup::new(&cache, hasher.clone());
    let lookup: &mut dyn DatasetLookup = &mut light;
    let dynamic = hashimoto(&mut hasher, &header, 5, 8192, lookup).unwrap();
    let direct = hashimoto_light(&cache, &header, 5, 8192, &mut hasher).unwrap();
    assert_eq!(dynamic, direct);
}

fn small_cache() -> Cache {
    Cache::new(1, b"proptest", 512, &mut Sha512Hasher::default()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_item_independent_of_hasher_history(index in any::<u64>(), noise in any::<Vec<u8>>()) {
        let cache = small_cache();
        let mut fresh = Sha512Hasher::default();
        let mut used = Sha512Hasher::default();
        let _ = used.digest(&noise);

        prop_assert_eq!(
            build_dataset_item(&cache, index, &mut fresh),
            build_dataset_item(&cache, index, &mut used)
        );
    }

    #[test]
    fn prop_light_matches_full(header in any::<[u8; 32]>(), nonce in any::<u64>()) {
        let cache = small_cache();
        let mut hasher = Sha512Hasher::default();
        let dataset = Dataset::generate(&cache, 32 * ROW_BYTES, &hasher).unwrap();

        let size = dataset.size_bytes();
        let light = hashimoto_light(&cache, &header, nonce, size, &mut hasher).unwrap();
        let full = hashimoto_full(&dataset, &header, nonce, &mut hasher).unwrap();
        prop_assert_eq!(light, full);
    }
}
