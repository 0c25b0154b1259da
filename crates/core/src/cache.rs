//! Epoch cache construction
//!
//! The cache is a hash chain over `rows` 64-byte rows followed by
//! `CACHE_ROUNDS` passes of data-dependent mixing:
//!
//! ```text
//! row[0] = H(seed)
//! row[i] = H(row[i-1])
//! repeat CACHE_ROUNDS:
//!     for i in 0..rows:
//!         v = row[i].word[0] mod rows
//!         row[i] = H(row[v] ^ row[(i - 1 + rows) mod rows])
//! ```
//!
//! Each round reads rows rewritten earlier in the same or the previous
//! round, so the mixing phase is strictly sequential.

use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::params::{CACHE_ROUNDS, ROW_BYTES, ROW_WORDS, Row, WORD_BYTES};
use crate::primitives::{read_words, words_to_row, write_words};

/// Fill a caller-owned buffer with the cache for `seed`.
///
/// The buffer length picks the cache size and must be a non-zero multiple
/// of [`ROW_WORDS`]. `epoch` only labels the work; identical seeds produce
/// identical caches.
#[instrument(level = "debug", skip(buffer, seed, hasher), fields(rows = buffer.len() / ROW_WORDS))]
pub fn build_cache<H: Hasher>(
    buffer: &mut [u32],
    epoch: u64,
    seed: &[u8],
    hasher: &mut H,
) -> Result<()> {
    let rows = validate_cache_len(buffer.len())?;

    // Phase 1: sequential hash chain
    let mut row = hasher.digest(seed);
    read_words(&row, &mut buffer[..ROW_WORDS]);
    for i in 1..rows {
        row = hasher.digest(&row);
        read_words(&row, row_mut(buffer, i));
    }

    // Phase 2: data-dependent mix rounds
    let mut mixed: Row = [0u8; ROW_BYTES];
    for _ in 0..CACHE_ROUNDS {
        for i in 0..rows {
            let v = (buffer[i * ROW_WORDS] as usize) % rows;
            let prev = (i + rows - 1) % rows;

            let mut xored = [0u32; ROW_WORDS];
            for (k, word) in xored.iter_mut().enumerate() {
                *word = buffer[v * ROW_WORDS + k] ^ buffer[prev * ROW_WORDS + k];
            }
            write_words(&xored, &mut mixed);

            let rehashed = hasher.digest(&mixed);
            read_words(&rehashed, row_mut(buffer, i));
        }
    }

    debug!(epoch, rows, "cache built");
    Ok(())
}

/// Number of rows in a cache buffer of `len` words
fn validate_cache_len(len: usize) -> Result<usize> {
    if len % ROW_WORDS != 0 {
        return Err(Error::UnalignedCache { len });
    }
    if len == 0 {
        return Err(Error::EmptyCache);
    }
    Ok(len / ROW_WORDS)
}

#[inline(always)]
fn row_mut(buffer: &mut [u32], index: usize) -> &mut [u32] {
    &mut buffer[index * ROW_WORDS..(index + 1) * ROW_WORDS]
}

/// A completed, immutable epoch cache.
///
/// Built once, then shared by reference (or behind an `Arc`) between any
/// number of dataset derivations and verifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cache {
    epoch: u64,
    words: Box<[u32]>,
}

impl Cache {
    /// Allocate and build a cache of `size_bytes` bytes
    pub fn new<H: Hasher>(
        epoch: u64,
        seed: &[u8],
        size_bytes: usize,
        hasher: &mut H,
    ) -> Result<Self> {
        if size_bytes % ROW_BYTES != 0 {
            return Err(Error::UnalignedCache {
                len: size_bytes / WORD_BYTES,
            });
        }

        let mut words = vec![0u32; size_bytes / WORD_BYTES];
        build_cache(&mut words, epoch, seed, hasher)?;
        Ok(Self {
            epoch,
            words: words.into_boxed_slice(),
        })
    }

    /// Adopt an already-built cache, e.g. one loaded from storage
    pub fn from_words(epoch: u64, words: Vec<u32>) -> Result<Self> {
        validate_cache_len(words.len())?;
        Ok(Self {
            epoch,
            words: words.into_boxed_slice(),
        })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of 64-byte rows
    pub fn rows(&self) -> usize {
        self.words.len() / ROW_WORDS
    }

    pub fn size_bytes(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Words of row `index`; panics if `index >= rows()`
    #[inline(always)]
    pub fn row(&self, index: usize) -> &[u32] {
        &self.words[index * ROW_WORDS..(index + 1) * ROW_WORDS]
    }

    /// Row `index` as bytes
    pub fn row_bytes(&self, index: usize) -> Row {
        words_to_row(self.row(index))
    }

    pub fn as_words(&self) -> &[u32] {
        &self.words
    }

    /// Little-endian byte image of the whole cache
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.size_bytes()];
        write_words(&self.words, &mut bytes);
        bytes
    }
}
