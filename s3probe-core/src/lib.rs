//! Core types for s3probe
//!
//! This crate provides the deterministic test data written to the object store
//! and the digests used to verify what comes back.

pub mod digest;
pub mod fixtures;
pub mod sized;

pub use digest::{md5_etag, normalize_etag, sha256_hex, sha256_hex_async};
pub use sized::SizeReader;
