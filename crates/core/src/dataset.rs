//! Dataset rows derived on demand from a cache
//!
//! Any row of the (conceptually huge) dataset can be computed from the
//! cache alone:
//!
//! ```text
//! mix = cache.row(index mod rows); mix[0] ^= index
//! mix = H(mix)
//! for j in 0..DATASET_PARENTS:
//!     parent = fnv(index ^ j, mix[j mod 16]) mod rows
//!     mix = fnv(mix, cache.row(parent))
//! item = H(mix)
//! ```
//!
//! Light verifiers derive the handful of rows they touch; full nodes
//! materialise every row once with [`Dataset::generate`].

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use std::time::Instant;
use tracing::debug;

use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::params::{DATASET_PARENTS, ROW_BYTES, ROW_WORDS, Row, WORD_BYTES};
use crate::primitives::{fnv, fnv_into, read_words, row_to_words, words_to_row};

/// Derive dataset row `index` from `cache`.
///
/// Every index is meaningful, none is rejected. Below 2^32 the result is
/// identical to the 32-bit reference derivation. Wider indices are an
/// extension: the starting cache row uses the full 64-bit index modulo
/// the row count, while the seed word and parent selection only see the
/// low 32 bits, so such rows do not interoperate with 32-bit or
/// arbitrary-precision implementations.
#[inline]
pub fn build_dataset_item<H: Hasher>(cache: &Cache, index: u64, hasher: &mut H) -> Row {
    derive_item(cache, index, None, hasher)
}

/// Derive the mask for row `index`, bound to `init_hash`.
///
/// Same derivation as [`build_dataset_item`], except the seeded row is
/// XORed with `init_hash` before the first whitening hash, so every
/// initial hash yields an unrelated mask sequence over the same cache.
/// Indices at or above 2^32 follow the same 64-bit extension as
/// [`build_dataset_item`].
#[inline]
pub fn build_mask_item<H: Hasher>(
    cache: &Cache,
    index: u64,
    init_hash: &Row,
    hasher: &mut H,
) -> Row {
    derive_item(cache, index, Some(init_hash), hasher)
}

fn derive_item<H: Hasher>(cache: &Cache, index: u64, mask: Option<&Row>, hasher: &mut H) -> Row {
    let rows = cache.rows();

    let mut mix = [0u32; ROW_WORDS];
    mix.copy_from_slice(cache.row((index % rows as u64) as usize));
    mix[0] ^= index as u32;

    let mut seeded = words_to_row(&mix);
    if let Some(mask) = mask {
        for (byte, m) in seeded.iter_mut().zip(mask) {
            *byte ^= m;
        }
    }
    mix = row_to_words(&hasher.digest(&seeded));

    // Hot loop: no hashing, only FNV over cache parents
    let index_lo = index as u32;
    for j in 0..DATASET_PARENTS {
        let parent = fnv(index_lo ^ j, mix[j as usize % ROW_WORDS]) as usize % rows;
        fnv_into(&mut mix, cache.row(parent));
    }

    hasher.digest(&words_to_row(&mix))
}

/// A fully materialised dataset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataset {
    words: Box<[u32]>,
}

impl Dataset {
    /// Compute every row of a `size_bytes` dataset from `cache`.
    ///
    /// With the `parallel` feature rows are spread over the rayon pool,
    /// each worker hashing with its own clone of `hasher`.
    pub fn generate<H: Hasher + Sync>(
        cache: &Cache,
        size_bytes: usize,
        hasher: &H,
    ) -> Result<Self> {
        let rows = validate_dataset_size(size_bytes as u64)?;

        let start = Instant::now();
        let mut words = vec![0u32; size_bytes / WORD_BYTES];
        fill_dataset(&mut words, cache, hasher);
        debug!(
            epoch = cache.epoch(),
            rows,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dataset generated"
        );

        Ok(Self {
            words: words.into_boxed_slice(),
        })
    }

    /// Adopt a precomputed dataset
    pub fn from_words(words: Vec<u32>) -> Result<Self> {
        validate_dataset_size((words.len() * WORD_BYTES) as u64)?;
        Ok(Self {
            words: words.into_boxed_slice(),
        })
    }

    pub fn rows(&self) -> u64 {
        (self.words.len() / ROW_WORDS) as u64
    }

    pub fn size_bytes(&self) -> u64 {
        (self.words.len() * WORD_BYTES) as u64
    }

    /// Words of row `index`, if present
    #[inline(always)]
    pub fn row(&self, index: u64) -> Option<&[u32]> {
        let start = usize::try_from(index).ok()?.checked_mul(ROW_WORDS)?;
        self.words.get(start..start.checked_add(ROW_WORDS)?)
    }

    pub fn as_words(&self) -> &[u32] {
        &self.words
    }
}

/// Number of rows in a dataset of `bytes` bytes
pub(crate) fn validate_dataset_size(bytes: u64) -> Result<u64> {
    if bytes % ROW_BYTES as u64 != 0 {
        return Err(Error::UnalignedDataset { bytes });
    }
    if bytes == 0 {
        return Err(Error::EmptyDataset);
    }
    Ok(bytes / ROW_BYTES as u64)
}

#[cfg(feature = "parallel")]
fn fill_dataset<H: Hasher + Sync>(words: &mut [u32], cache: &Cache, hasher: &H) {
    words
        .par_chunks_mut(ROW_WORDS)
        .enumerate()
        .for_each_init(
            || hasher.clone(),
            |hasher, (index, row)| {
                let item = build_dataset_item(cache, index as u64, hasher);
                read_words(&item, row);
            },
        );
}

#[cfg(not(feature = "parallel"))]
fn fill_dataset<H: Hasher + Sync>(words: &mut [u32], cache: &Cache, hasher: &H) {
    let mut hasher = hasher.clone();
    for (index, row) in words.chunks_exact_mut(ROW_WORDS).enumerate() {
        let item = build_dataset_item(cache, index as u64, &mut hasher);
        read_words(&item, row);
    }
}
