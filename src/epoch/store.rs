use std::sync::{Arc, PoisonError, RwLock};

use dagger_core::{DIGEST_BYTES, HashimotoOutput};
use tracing::{info, instrument, warn};

use super::{EpochContext, EpochError};
use crate::config::DaggerConfig;

/// Holds the currently published epoch context
///
/// Readers clone the `Arc` and keep verifying against it even after a
/// rollover replaces it. Contexts are built outside the lock, so a
/// rollover only blocks readers for the pointer swap.
#[derive(Debug)]
pub struct EpochStore {
    config: DaggerConfig,
    current: RwLock<Option<Arc<EpochContext>>>,
}

impl EpochStore {
    pub fn new(config: DaggerConfig) -> Result<Self, EpochError> {
        config.validate()?;
        Ok(Self {
            config,
            current: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &DaggerConfig {
        &self.config
    }

    /// Currently published context, if any
    pub fn current(&self) -> Option<Arc<EpochContext>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_epoch(&self) -> Option<u64> {
        self.current().map(|context| context.epoch())
    }

    /// Build the context for `epoch` and publish it
    #[instrument(skip(self, seed))]
    pub fn rollover(&self, epoch: u64, seed: &[u8]) -> Result<Arc<EpochContext>, EpochError> {
        // Fail before the expensive build; `publish` checks again under the lock.
        if let Some(current) = self.current_epoch() {
            if epoch <= current {
                warn!(current, requested = epoch, "stale epoch rollover");
                return Err(EpochError::StaleEpoch { current, requested: epoch });
            }
        }

        let context = Arc::new(EpochContext::build(&self.config, epoch, seed)?);
        self.publish(Arc::clone(&context))?;
        Ok(context)
    }

    /// Rollover with a hex-encoded seed
    pub fn rollover_hex(
        &self,
        epoch: u64,
        seed_hex: &str,
    ) -> Result<Arc<EpochContext>, EpochError> {
        let seed = hex::decode(seed_hex.trim_start_matches("0x"))?;
        self.rollover(epoch, &seed)
    }

    /// Replace the published context; the epoch must strictly increase
    pub fn publish(&self, context: Arc<EpochContext>) -> Result<(), EpochError> {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = slot.as_ref() {
            if context.epoch() <= current.epoch() {
                warn!(
                    current = current.epoch(),
                    requested = context.epoch(),
                    "stale epoch publication"
                );
                return Err(EpochError::StaleEpoch {
                    current: current.epoch(),
                    requested: context.epoch(),
                });
            }
        }

        info!(
            epoch = context.epoch(),
            cache_bytes = context.cache().size_bytes(),
            full = context.dataset().is_some(),
            "epoch published"
        );
        *slot = Some(context);
        Ok(())
    }

    /// Verify against whatever context is published right now
    pub fn verify(
        &self,
        header_digest: &[u8; DIGEST_BYTES],
        nonce: u64,
    ) -> Result<HashimotoOutput, EpochError> {
        let context = self.current().ok_or(EpochError::NotPublished)?;
        context.verify(header_digest, nonce)
    }
}
