//! Write/read-back/list checks against a live server

use anyhow::{bail, Context, Result};
use aws_sdk_s3::Client;
use s3probe_core::{md5_etag, sha256_hex, SizeReader};
use s3probe_test::objects::{bucket_names, create_buckets, object_sha256, put_sized_object};
use std::fmt;
use tracing::info;

/// Digests a server should report for a generated object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expected {
    pub etag: String,
    pub sha256: String,
}

impl Expected {
    pub fn for_size(size: u64) -> Result<Self> {
        Ok(Self {
            etag: md5_etag(SizeReader::new(size)).context("hashing generated stream")?,
            sha256: sha256_hex(SizeReader::new(size)).context("hashing generated stream")?,
        })
    }
}

/// What the server reported
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub buckets_before: Vec<String>,
    pub buckets_after: Vec<String>,
    pub bucket: String,
    pub etag: String,
    pub sha256: String,
}

impl CheckReport {
    pub fn verify(&self, expected: &Expected) -> Result<()> {
        if !self.buckets_before.is_empty() {
            bail!(
                "fresh server already had buckets: {:?}",
                self.buckets_before
            );
        }
        if !self.buckets_after.contains(&self.bucket) {
            bail!(
                "bucket {} missing from listing {:?}",
                self.bucket,
                self.buckets_after
            );
        }
        if self.etag != expected.etag {
            bail!("invalid ETag {}, expected {}", self.etag, expected.etag);
        }
        if self.sha256 != expected.sha256 {
            bail!(
                "invalid content hash {}, expected {}",
                self.sha256,
                expected.sha256
            );
        }
        Ok(())
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "buckets: {:?}", self.buckets_after)?;
        writeln!(f, "etag:    {}", self.etag)?;
        writeln!(f, "sha256:  {}", self.sha256)
    }
}

pub async fn run_checks(client: &Client, bucket: &str, key: &str, size: u64) -> Result<CheckReport> {
    let buckets_before = bucket_names(client).await?;

    create_buckets(client, [bucket]).await?;
    let etag = put_sized_object(client, bucket, key, size).await?;
    info!(bucket = %bucket, key = %key, etag = %etag, "Object written");

    let sha256 = object_sha256(client, bucket, key).await?;
    info!(bucket = %bucket, key = %key, sha256 = %sha256, "Object read back");

    let buckets_after = bucket_names(client).await?;

    Ok(CheckReport {
        buckets_before,
        buckets_after,
        bucket: bucket.to_string(),
        etag,
        sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3probe_core::fixtures::{FIXTURE_ETAG, FIXTURE_SHA256, FIXTURE_SIZE};

    fn report() -> CheckReport {
        CheckReport {
            buckets_before: vec![],
            buckets_after: vec!["test".to_string()],
            bucket: "test".to_string(),
            etag: FIXTURE_ETAG.to_string(),
            sha256: FIXTURE_SHA256.to_string(),
        }
    }

    #[test]
    fn test_expected_for_fixture_size() {
        let expected = Expected::for_size(FIXTURE_SIZE).unwrap();
        assert_eq!(expected.etag, FIXTURE_ETAG);
        assert_eq!(expected.sha256, FIXTURE_SHA256);
    }

    #[test]
    fn test_verify_accepts_matching_report() {
        let expected = Expected::for_size(FIXTURE_SIZE).unwrap();
        assert!(report().verify(&expected).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_etag() {
        let expected = Expected::for_size(FIXTURE_SIZE).unwrap();
        let mut report = report();
        report.etag = "0".repeat(32);

        let err = report.verify(&expected).unwrap_err();
        assert!(err.to_string().contains("invalid ETag"));
    }

    #[test]
    fn test_verify_rejects_preexisting_buckets() {
        let expected = Expected::for_size(FIXTURE_SIZE).unwrap();
        let mut report = report();
        report.buckets_before = vec!["leftover".to_string()];

        assert!(report.verify(&expected).is_err());
    }

    #[test]
    fn test_verify_rejects_missing_bucket() {
        let expected = Expected::for_size(FIXTURE_SIZE).unwrap();
        let mut report = report();
        report.buckets_after.clear();

        let err = report.verify(&expected).unwrap_err();
        assert!(err.to_string().contains("missing from listing"));
    }
}
