//! Storage module for proof-of-work photos
//!
//! Provides MinIO/S3-compatible storage client for uploads, deletes
//! and presigned download URLs.

mod minio_client;

pub use minio_client::MinIOClient;
