//! Object storage client.
//!
//! This crate provides:
//! - File upload/download against an S3-compatible object store
//! - Presigned URL generation
//! - The three named buckets the pipeline moves clips through

pub mod buckets;
pub mod client;
pub mod error;

pub use buckets::ObjectStores;
pub use client::{ObjectStoreClient, ObjectStoreConfig};
pub use error::{StorageError, StorageResult};
