//! Per-epoch verification state
//!
//! An [`EpochContext`] owns one epoch's cache (and optionally its full
//! dataset). It is never mutated after construction; [`EpochStore`]
//! publishes contexts behind `Arc`s and swaps them on rollover.

mod store;

pub use store::EpochStore;

use std::time::Instant;

use dagger_core::{
    Cache, DIGEST_BYTES, Dataset, HashimotoOutput, hashimoto_full, hashimoto_light, quick_digest,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{ConfigError, DaggerConfig, HashKind, SelectedHasher};

#[derive(Error, Debug)]
pub enum EpochError {
    #[error("Algorithm error: {0}")]
    Algorithm(#[from] dagger_core::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed hex: {0}")]
    SeedHex(#[from] hex::FromHexError),

    #[error("Epoch {requested} is not newer than published epoch {current}")]
    StaleEpoch { current: u64, requested: u64 },

    #[error("No epoch has been published")]
    NotPublished,

    #[error("Claimed mix digest does not match the recomputed one")]
    MixMismatch,
}

/// What a prover publishes for one nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "hex::serde")]
    pub header_digest: [u8; DIGEST_BYTES],
    pub nonce: u64,
    #[serde(with = "hex::serde")]
    pub mix_digest: [u8; DIGEST_BYTES],
}

/// One epoch's cache, optional full dataset and parameters
#[derive(Debug)]
pub struct EpochContext {
    hash: HashKind,
    dataset_bytes: u64,
    cache: Cache,
    dataset: Option<Dataset>,
}

impl EpochContext {
    /// Build the cache (and the dataset when configured) for `epoch`
    #[instrument(
        skip(config, seed),
        fields(cache_bytes = config.cache_bytes, full = config.full_dataset)
    )]
    pub fn build(config: &DaggerConfig, epoch: u64, seed: &[u8]) -> Result<Self, EpochError> {
        config.validate()?;

        let start = Instant::now();
        let mut hasher = config.hash.hasher();
        let cache = Cache::new(epoch, seed, config.cache_bytes, &mut hasher)?;

        let dataset = if config.full_dataset {
            let size = usize::try_from(config.dataset_bytes).map_err(|_| ConfigError::Invalid {
                field: "dataset_bytes",
                reason: "too large to materialise on this platform".to_string(),
            })?;
            Some(Dataset::generate(&cache, size, &hasher)?)
        } else {
            None
        };

        debug!(
            epoch,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "epoch context built"
        );

        Ok(Self {
            hash: config.hash,
            dataset_bytes: config.dataset_bytes,
            cache,
            dataset,
        })
    }

    pub fn epoch(&self) -> u64 {
        self.cache.epoch()
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn dataset_bytes(&self) -> u64 {
        self.dataset_bytes
    }

    pub fn hash_kind(&self) -> HashKind {
        self.hash
    }

    /// Fresh hasher for this epoch's primitive
    pub fn hasher(&self) -> SelectedHasher {
        self.hash.hasher()
    }

    /// Hashimoto over the full dataset when present, otherwise the cache
    pub fn verify(
        &self,
        header_digest: &[u8; DIGEST_BYTES],
        nonce: u64,
    ) -> Result<HashimotoOutput, EpochError> {
        let mut hasher = self.hasher();
        let out = match &self.dataset {
            Some(dataset) => hashimoto_full(dataset, header_digest, nonce, &mut hasher)?,
            None => {
                hashimoto_light(&self.cache, header_digest, nonce, self.dataset_bytes, &mut hasher)?
            }
        };
        Ok(out)
    }

    /// Hashimoto with rows always derived from the cache
    pub fn verify_light(
        &self,
        header_digest: &[u8; DIGEST_BYTES],
        nonce: u64,
    ) -> Result<HashimotoOutput, EpochError> {
        let mut hasher = self.hasher();
        Ok(hashimoto_light(
            &self.cache,
            header_digest,
            nonce,
            self.dataset_bytes,
            &mut hasher,
        )?)
    }

    /// Digest implied by the proof's claimed mix, without touching the
    /// dataset. Compare it against the target before calling
    /// [`EpochContext::check_proof`].
    pub fn quick_digest(&self, proof: &Proof) -> [u8; DIGEST_BYTES] {
        let mut hasher = self.hasher();
        quick_digest(&mut hasher, &proof.header_digest, proof.nonce, &proof.mix_digest)
    }

    /// Recompute the mix and return the digest if the claimed mix holds
    pub fn check_proof(&self, proof: &Proof) -> Result<[u8; DIGEST_BYTES], EpochError> {
        let out = self.verify(&proof.header_digest, proof.nonce)?;
        if out.mix_digest != proof.mix_digest {
            warn!(
                epoch = self.epoch(),
                nonce = proof.nonce,
                claimed = %hex::encode(proof.mix_digest),
                "mix digest mismatch"
            );
            return Err(EpochError::MixMismatch);
        }
        Ok(out.digest)
    }
}
