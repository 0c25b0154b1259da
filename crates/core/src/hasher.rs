//! Reentrant 512-bit digest capability
//!
//! Every cryptographic hash in the scheme goes through [`Hasher`]. The
//! wrapped primitive is stateful, so each adapter resets it around every
//! call and takes `&mut self`: one call at a time per instance. Threads
//! that need to hash concurrently clone their own instance.

use digest::consts::U64;
use digest::{Digest, DynDigest, FixedOutputReset, OutputSizeUser};

use crate::error::{Error, Result};
use crate::params::{ROW_BYTES, Row};

/// `digest(bytes) -> [u8; 64]` with no state carried between calls
pub trait Hasher: Clone {
    /// Digest the concatenation of `parts`
    fn digest_parts(&mut self, parts: &[&[u8]]) -> Row;

    /// Digest a single input
    #[inline]
    fn digest(&mut self, input: &[u8]) -> Row {
        self.digest_parts(&[input])
    }
}

/// Adapter for any RustCrypto primitive with a 64-byte output.
///
/// The output size is part of the type, so a mis-sized primitive is a
/// compile error rather than a runtime one.
#[derive(Clone, Debug, Default)]
pub struct DigestHasher<D> {
    inner: D,
}

impl<D> DigestHasher<D>
where
    D: Digest + FixedOutputReset + OutputSizeUser<OutputSize = U64> + Clone,
{
    pub fn new(mut inner: D) -> Self {
        // Drop anything the caller fed in before handing it over
        Digest::reset(&mut inner);
        Self { inner }
    }
}

impl<D> Hasher for DigestHasher<D>
where
    D: Digest + FixedOutputReset + OutputSizeUser<OutputSize = U64> + Clone,
{
    #[inline]
    fn digest_parts(&mut self, parts: &[&[u8]]) -> Row {
        for part in parts {
            Digest::update(&mut self.inner, *part);
        }
        let out = Digest::finalize_reset(&mut self.inner);

        let mut row = [0u8; ROW_BYTES];
        row.copy_from_slice(&out);
        row
    }
}

/// Wrap a statically 64-byte primitive as a [`Hasher`]
pub fn make_hasher<D>(primitive: D) -> DigestHasher<D>
where
    D: Digest + FixedOutputReset + OutputSizeUser<OutputSize = U64> + Clone,
{
    DigestHasher::new(primitive)
}

/// Reference primitive: SHA-512
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

/// Keccak-512 with the legacy (pre-SHA-3) padding
pub type Keccak512Hasher = DigestHasher<sha3::Keccak512>;

/// Adapter for a primitive chosen at runtime.
///
/// Output size is only known once the primitive exists, so it is checked
/// here and anything other than 64 bytes is refused.
pub struct DynHasher {
    inner: Box<dyn DynDigest>,
}

impl DynHasher {
    pub fn new(mut inner: Box<dyn DynDigest>) -> Result<Self> {
        let actual = inner.output_size();
        if actual != ROW_BYTES {
            return Err(Error::HashOutputSize { actual });
        }
        inner.reset();
        Ok(Self { inner })
    }
}

impl Clone for DynHasher {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.box_clone(),
        }
    }
}

impl Hasher for DynHasher {
    fn digest_parts(&mut self, parts: &[&[u8]]) -> Row {
        for part in parts {
            self.inner.update(part);
        }

        let mut row = [0u8; ROW_BYTES];
        if self.inner.finalize_into_reset(&mut row).is_err() {
            unreachable!("output size is checked in DynHasher::new");
        }
        row
    }
}
