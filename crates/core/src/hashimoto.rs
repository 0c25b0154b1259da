//! Hashimoto: the mixing/verification loop
//!
//! ```text
//! seed = H(header_digest || nonce_le)
//! mix  = seed || seed                                 (128 bytes)
//! for i in 0..HASHIMOTO_ACCESSES:
//!     p   = fnv(i ^ seed[0], mix[i mod 32]) mod pages
//!     mix = fnv(mix, row[2p] || row[2p + 1])
//! cmix[k] = fnv(fnv(fnv(mix[4k], mix[4k+1]), mix[4k+2]), mix[4k+3])
//! digest  = H(seed || cmix)[..32]
//! ```
//!
//! Where rows come from is the [`DatasetLookup`]'s business; the loop is
//! the same for light and full verification.

use crate::cache::Cache;
use crate::dataset::{Dataset, build_dataset_item, validate_dataset_size};
use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::params::{
    DIGEST_BYTES, HASHIMOTO_ACCESSES, MIX_ROWS, MIX_WORDS, ROW_BYTES, ROW_WORDS, Row, WORD_BYTES,
};
use crate::primitives::{fnv, fnv_into, read_words, row_to_words, words_to_row};

/// Source of dataset rows for [`hashimoto`]
pub trait DatasetLookup {
    fn fetch(&mut self, index: u64) -> Result<Row>;
}

/// Rows derived on demand from a cache
pub struct LightLookup<'a, H> {
    cache: &'a Cache,
    hasher: H,
}

impl<'a, H: Hasher> LightLookup<'a, H> {
    pub fn new(cache: &'a Cache, hasher: H) -> Self {
        Self { cache, hasher }
    }
}

impl<H: Hasher> DatasetLookup for LightLookup<'_, H> {
    #[inline]
    fn fetch(&mut self, index: u64) -> Result<Row> {
        Ok(build_dataset_item(self.cache, index, &mut self.hasher))
    }
}

impl DatasetLookup for &Dataset {
    #[inline]
    fn fetch(&mut self, index: u64) -> Result<Row> {
        self.row(index)
            .map(words_to_row)
            .ok_or(Error::RowOutOfRange {
                index,
                available: self.rows(),
            })
    }
}

/// Rows read straight out of a caller-owned byte image of the dataset
pub struct RawLookup<'a> {
    bytes: &'a [u8],
}

impl<'a> RawLookup<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl DatasetLookup for RawLookup<'_> {
    fn fetch(&mut self, index: u64) -> Result<Row> {
        let out_of_range = Error::RowOutOfRange {
            index,
            available: (self.bytes.len() / ROW_BYTES) as u64,
        };

        let start = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_mul(ROW_BYTES))
            .ok_or_else(|| out_of_range.clone())?;
        let end = start.checked_add(ROW_BYTES).ok_or_else(|| out_of_range.clone())?;
        let bytes = self.bytes.get(start..end).ok_or(out_of_range)?;

        let mut row = [0u8; ROW_BYTES];
        row.copy_from_slice(bytes);
        Ok(row)
    }
}

/// Result of one Hashimoto evaluation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HashimotoOutput {
    /// Compared by the caller against the difficulty target
    pub digest: [u8; DIGEST_BYTES],
    /// Compressed mix, published alongside the proof
    pub mix_digest: [u8; DIGEST_BYTES],
}

/// Run the mixing loop for `header_digest` and `nonce` over a dataset of
/// `dataset_size` bytes.
///
/// Fails if `dataset_size` is not a whole number of rows, holds less than
/// one mix page, or if `lookup` cannot produce a requested row.
pub fn hashimoto<H, L>(
    hasher: &mut H,
    header_digest: &[u8; DIGEST_BYTES],
    nonce: u64,
    dataset_size: u64,
    lookup: &mut L,
) -> Result<HashimotoOutput>
where
    H: Hasher,
    L: DatasetLookup + ?Sized,
{
    let seed = seed_hash(hasher, header_digest, nonce);
    hashimoto_seeded(hasher, &seed, dataset_size, lookup)
}

/// Run the mixing loop from an already computed 64-byte seed hash.
///
/// [`hashimoto`] is this with `seed = H(header_digest || nonce_le)`.
pub fn hashimoto_seeded<H, L>(
    hasher: &mut H,
    seed: &Row,
    dataset_size: u64,
    lookup: &mut L,
) -> Result<HashimotoOutput>
where
    H: Hasher,
    L: DatasetLookup + ?Sized,
{
    let rows = validate_dataset_size(dataset_size)?;
    let pages = rows / MIX_ROWS as u64;
    if pages == 0 {
        return Err(Error::DatasetTooSmall {
            bytes: dataset_size,
        });
    }

    let seed_words = row_to_words(seed);

    let mut mix = [0u32; MIX_WORDS];
    for chunk in mix.chunks_exact_mut(ROW_WORDS) {
        chunk.copy_from_slice(&seed_words);
    }

    let mut page = [0u32; MIX_WORDS];
    for i in 0..HASHIMOTO_ACCESSES {
        let p = fnv(i ^ seed_words[0], mix[i as usize % MIX_WORDS]) as u64 % pages;
        for (offset, chunk) in page.chunks_exact_mut(ROW_WORDS).enumerate() {
            let row = lookup.fetch(p * MIX_ROWS as u64 + offset as u64)?;
            read_words(&row, chunk);
        }
        fnv_into(&mut mix, &page);
    }

    let mix_digest = compress_mix(&mix);
    let digest = final_digest(hasher, seed, &mix_digest);
    Ok(HashimotoOutput { digest, mix_digest })
}

/// Hashimoto with rows derived from `cache` (light verification)
pub fn hashimoto_light<H: Hasher>(
    cache: &Cache,
    header_digest: &[u8; DIGEST_BYTES],
    nonce: u64,
    dataset_size: u64,
    hasher: &mut H,
) -> Result<HashimotoOutput> {
    let mut lookup = LightLookup::new(cache, hasher.clone());
    hashimoto(hasher, header_digest, nonce, dataset_size, &mut lookup)
}

/// Hashimoto with rows read from a materialised dataset
pub fn hashimoto_full<H: Hasher>(
    dataset: &Dataset,
    header_digest: &[u8; DIGEST_BYTES],
    nonce: u64,
    hasher: &mut H,
) -> Result<HashimotoOutput> {
    let mut lookup = dataset;
    hashimoto(hasher, header_digest, nonce, dataset.size_bytes(), &mut lookup)
}

/// Recompute the final digest from a claimed mix digest.
///
/// Costs two hashes and no dataset access, so a verifier can check the
/// claimed result against its target before paying for a full pass.
pub fn quick_digest<H: Hasher>(
    hasher: &mut H,
    header_digest: &[u8; DIGEST_BYTES],
    nonce: u64,
    mix_digest: &[u8; DIGEST_BYTES],
) -> [u8; DIGEST_BYTES] {
    let seed = seed_hash(hasher, header_digest, nonce);
    final_digest(hasher, &seed, mix_digest)
}

#[inline]
fn seed_hash<H: Hasher>(hasher: &mut H, header_digest: &[u8; DIGEST_BYTES], nonce: u64) -> Row {
    let nonce_bytes = nonce.to_le_bytes();
    hasher.digest_parts(&[header_digest.as_slice(), nonce_bytes.as_slice()])
}

/// Fold each group of four mix words into one
#[inline]
fn compress_mix(mix: &[u32; MIX_WORDS]) -> [u8; DIGEST_BYTES] {
    let mut out = [0u8; DIGEST_BYTES];
    for (chunk, group) in out.chunks_exact_mut(WORD_BYTES).zip(mix.chunks_exact(4)) {
        let folded = fnv(fnv(fnv(group[0], group[1]), group[2]), group[3]);
        chunk.copy_from_slice(&folded.to_le_bytes());
    }
    out
}

#[inline]
fn final_digest<H: Hasher>(
    hasher: &mut H,
    seed: &Row,
    mix_digest: &[u8; DIGEST_BYTES],
) -> [u8; DIGEST_BYTES] {
    let full = hasher.digest_parts(&[seed.as_slice(), mix_digest.as_slice()]);
    let mut digest = [0u8; DIGEST_BYTES];
    digest.copy_from_slice(&full[..DIGEST_BYTES]);
    digest
}
