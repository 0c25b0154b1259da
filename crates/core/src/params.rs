//! Dagger-Hashimoto Algorithm Parameters
//!
//! Every value here is part of the wire-level definition of the scheme.
//! Changing any of them yields a self-consistent but incompatible variant.

/// Bytes per row (one 512-bit hash output)
pub const ROW_BYTES: usize = 64;

/// Bytes per word (little-endian u32)
pub const WORD_BYTES: usize = 4;

/// Words per row
pub const ROW_WORDS: usize = ROW_BYTES / WORD_BYTES;

/// Number of mix rounds over the whole cache
pub const CACHE_ROUNDS: usize = 3;

/// Number of cache parents folded into each dataset item
pub const DATASET_PARENTS: u32 = 256;

/// Width of the Hashimoto mix buffer in bytes
pub const MIX_BYTES: usize = 128;

/// Words in the Hashimoto mix buffer
pub const MIX_WORDS: usize = MIX_BYTES / WORD_BYTES;

/// Consecutive dataset rows fetched per Hashimoto access
pub const MIX_ROWS: usize = MIX_BYTES / ROW_BYTES;

/// Number of dataset accesses per Hashimoto evaluation
pub const HASHIMOTO_ACCESSES: u32 = 64;

/// Size of the result digest and of the compressed mix
pub const DIGEST_BYTES: usize = 32;

/// 32-bit FNV multiplier
pub const FNV_PRIME: u32 = 0x0100_0193;

/// A single cache or dataset row
pub type Row = [u8; ROW_BYTES];

/// A row viewed as little-endian words
pub type RowWords = [u32; ROW_WORDS];
