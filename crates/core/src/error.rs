//! Contract violations reported by the core
//!
//! None of these are transient: each one means the caller handed in a
//! malformed buffer, size or primitive, and retrying cannot help.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cache buffer of {len} words is not a multiple of the 16-word row")]
    UnalignedCache { len: usize },

    #[error("cache buffer holds no rows")]
    EmptyCache,

    #[error("dataset size {bytes} is not a multiple of the 64-byte row")]
    UnalignedDataset { bytes: u64 },

    #[error("dataset holds no rows")]
    EmptyDataset,

    #[error("dataset size {bytes} is smaller than one 128-byte mix page")]
    DatasetTooSmall { bytes: u64 },

    #[error("hash primitive produces {actual}-byte digests, expected 64")]
    HashOutputSize { actual: usize },

    #[error("row {index} is outside the {available} available rows")]
    RowOutOfRange { index: u64, available: u64 },
}

pub type Result<T> = core::result::Result<T, Error>;
