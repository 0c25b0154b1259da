//! Dagger-Hashimoto Epoch Library
//!
//! Epoch management on top of the Dagger-Hashimoto proof-of-work core.
//!
//! # Overview
//!
//! Each epoch has a seed from which a cache is built. Verifiers hold only
//! that cache and derive the few dataset rows each proof touches; miners
//! can also materialise the full dataset. On every epoch boundary the
//! next context is built off to the side and swapped in atomically, so
//! verification never waits on a rebuild.
//!
//! # Example
//!
//! ```rust
//! use dagger::{DaggerConfig, EpochStore, HashKind};
//!
//! let config = DaggerConfig {
//!     cache_bytes: 1024,
//!     dataset_bytes: 4096,
//!     hash: HashKind::Sha512,
//!     full_dataset: false,
//! };
//!
//! let store = EpochStore::new(config)?;
//! store.rollover(1, b"epoch one seed")?;
//!
//! let out = store.verify(&[0u8; 32], 42)?;
//! assert_eq!(out.mix_digest.len(), 32);
//! # Ok::<(), dagger::EpochError>(())
//! ```

// Re-export the core algorithm
pub use dagger_core as algorithm;

pub mod config;
pub mod epoch;

// Convenience re-exports
pub use algorithm::{Cache, Dataset, HashimotoOutput, Hasher};
pub use config::{ConfigError, DaggerConfig, HashKind, SelectedHasher};
pub use epoch::{EpochContext, EpochError, EpochStore, Proof};
