//! Non-cryptographic mixing kernel for Dagger-Hashimoto
//!
//! These run inside the per-parent and per-access loops, so they stay
//! branch-free and allocation-free.

use crate::params::{FNV_PRIME, ROW_BYTES, ROW_WORDS, Row, RowWords, WORD_BYTES};

/// FNV-style combine: `(a * FNV_PRIME) ^ b` over 32-bit words
#[inline(always)]
pub fn fnv(a: u32, b: u32) -> u32 {
    a.wrapping_mul(FNV_PRIME) ^ b
}

/// Fold `data` into `acc` word by word with [`fnv`]
#[inline(always)]
pub fn fnv_into(acc: &mut [u32], data: &[u32]) {
    debug_assert_eq!(acc.len(), data.len());
    for (a, d) in acc.iter_mut().zip(data) {
        *a = fnv(*a, *d);
    }
}

/// Read a row as little-endian words
#[inline(always)]
pub fn row_to_words(row: &Row) -> RowWords {
    let mut words = [0u32; ROW_WORDS];
    read_words(row, &mut words);
    words
}

/// Serialize little-endian words back into a row
#[inline(always)]
pub fn words_to_row(words: &[u32]) -> Row {
    debug_assert_eq!(words.len(), ROW_WORDS);
    let mut row = [0u8; ROW_BYTES];
    write_words(words, &mut row);
    row
}

/// Decode `bytes` into `words`; both must describe the same span
#[inline(always)]
pub fn read_words(bytes: &[u8], words: &mut [u32]) {
    debug_assert_eq!(bytes.len(), words.len() * WORD_BYTES);
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(WORD_BYTES)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}

/// Encode `words` into `bytes`; both must describe the same span
#[inline(always)]
pub fn write_words(words: &[u32], bytes: &mut [u8]) {
    debug_assert_eq!(bytes.len(), words.len() * WORD_BYTES);
    for (chunk, word) in bytes.chunks_exact_mut(WORD_BYTES).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}
