//! SPARQL triple-store client and batched uploader.
//!
//! The store is reached through a pair of endpoint URLs (query, update).
//! Statements are committed in fixed-size batches, each batch through its
//! own connection: open, add every statement tagged with the fixed default
//! graph, then close, which posts one `INSERT DATA` update operation.

pub mod batch;
pub mod client;

pub use batch::{BatchExt, BatchUploader, Batches, UploadStats};
pub use client::{StoreConfig, UpdateConnection};
