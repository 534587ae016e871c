//! Error types for the earth-cube pipeline.

use thiserror::Error;

/// Result type alias using CubeError.
pub type CubeResult<T> = Result<T, CubeError>;

/// Primary error type for the observation pipeline.
///
/// Every variant is fatal: errors propagate to the entry point and abort
/// the whole run. There is no retry logic anywhere in the pipeline; batches
/// committed to the store before a failure stay committed.
#[derive(Debug, Error)]
pub enum CubeError {
    /// Input data violates a structural requirement (missing pixel/data
    /// pairing, shape mismatch, invalid band index, non-power-of-three
    /// tile size, unmatched filename, missing attribute).
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Network or store failure while committing a batch.
    #[error("Store upload failed: {0}")]
    StoreUpload(String),

    #[error("Failed to read raster: {0}")]
    RasterRead(String),

    #[error("Failed to read container: {0}")]
    ContainerRead(String),

    #[error("Image encoding failed: {0}")]
    ImageEncode(String),

    #[error("Failed to parse schema document: {0}")]
    SchemaParse(String),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),
}
