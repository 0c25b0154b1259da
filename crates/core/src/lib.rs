//! # Dagger-Hashimoto Core Algorithm
//!
//! A memory-hard proof-of-work primitive in three stages:
//!
//! - **Cache**: a per-epoch seed is expanded into a pseudo-random cache by
//!   a hash chain followed by data-dependent mix rounds.
//! - **Dataset**: any 64-byte row of a much larger dataset is derived from
//!   the cache on demand by folding 256 pseudo-randomly chosen cache rows.
//! - **Hashimoto**: a header digest and nonce select 64 data-dependent
//!   dataset pages which are folded into a 128-byte mix, compressed to a
//!   32-byte mix digest and hashed into the final digest.
//!
//! Light verifiers hold only the cache and derive the rows they touch;
//! full nodes materialise the dataset once and read rows directly. Both
//! paths produce bit-identical results.
//!
//! ## Algorithm Parameters
//!
//! - 64-byte rows of sixteen little-endian `u32` words
//! - 3 cache mix rounds
//! - 256 cache parents per dataset row
//! - 128-byte mix, 64 dataset accesses
//! - SHA-512 as the reference 512-bit primitive (Keccak-512 also supported)
//!
//! ## Example
//!
//! ```rust
//! use dagger_core::{Cache, Sha512Hasher, build_dataset_item, hashimoto_light};
//!
//! let mut hasher = Sha512Hasher::default();
//!
//! // Built once per epoch, then shared read-only
//! let cache = Cache::new(0, b"epoch seed", 1024, &mut hasher)?;
//!
//! // Any dataset row, straight from the cache
//! let row = build_dataset_item(&cache, 123, &mut hasher);
//! assert_eq!(row.len(), 64);
//!
//! // Light verification over a 4 KiB logical dataset
//! let header = [0u8; 32];
//! let out = hashimoto_light(&cache, &header, 42, 4096, &mut hasher)?;
//! assert_ne!(out.digest, [0u8; 32]);
//! # Ok::<(), dagger_core::Error>(())
//! ```
//!
//! ## Concurrency
//!
//! [`Cache`] and [`Dataset`] are immutable once built and `Sync`; any
//! number of threads may derive rows or run Hashimoto against them, each
//! with its own [`Hasher`] clone.

mod cache;
mod dataset;
mod error;
mod hasher;
mod hashimoto;
mod params;
mod primitives;

pub use cache::{Cache, build_cache};
pub use dataset::{Dataset, build_dataset_item, build_mask_item};
pub use error::{Error, Result};
pub use hasher::{DigestHasher, DynHasher, Hasher, Keccak512Hasher, Sha512Hasher, make_hasher};
pub use hashimoto::{
    DatasetLookup, HashimotoOutput, LightLookup, RawLookup, hashimoto, hashimoto_full,
    hashimoto_light, hashimoto_seeded, quick_digest,
};
pub use params::*;
pub use primitives::fnv;

#[cfg(test)]
mod tests;
