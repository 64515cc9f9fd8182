//! Bucket and object helpers for test bodies

use crate::error::HarnessError;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use s3probe_core::{normalize_etag, sha256_hex_async, SizeReader};
use tracing::debug;

/// Largest object S3 accepts in a single PutObject request (5 GiB)
pub const MAX_PUT_SIZE: u64 = 5 * 1024 * 1024 * 1024;

fn s3_error<E: std::error::Error>(operation: &str, e: E) -> HarnessError {
    HarnessError::operation(operation, DisplayErrorContext(e).to_string())
}

/// Upload `size` bytes of the deterministic stream, returning the unquoted ETag.
///
/// The body is generated in memory because the request is signed over a
/// sized, replayable payload. Sizes above [`MAX_PUT_SIZE`] are rejected
/// before anything is allocated.
pub async fn put_sized_object(
    client: &Client,
    bucket: &str,
    key: &str,
    size: u64,
) -> Result<String, HarnessError> {
    if size > MAX_PUT_SIZE {
        return Err(HarnessError::operation(
            "PutObject",
            format!(
                "size {} exceeds the single-upload limit of {} bytes",
                size, MAX_PUT_SIZE
            ),
        ));
    }
    let content_length = i64::try_from(size)
        .map_err(|_| HarnessError::operation("PutObject", format!("size {} too large", size)))?;
    let body = SizeReader::new(size).into_bytes();

    let output = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .content_length(content_length)
        .body(ByteStream::from(body))
        .send()
        .await
        .map_err(|e| s3_error("PutObject", e))?;

    let etag = output
        .e_tag()
        .map(normalize_etag)
        .ok_or_else(|| HarnessError::operation("PutObject", "response carried no ETag"))?;

    debug!(bucket = %bucket, key = %key, size, etag = %etag, "Wrote object");
    Ok(etag.to_string())
}

/// Download an object and return the SHA-256 of its content, hashing as it streams.
pub async fn object_sha256(client: &Client, bucket: &str, key: &str) -> Result<String, HarnessError> {
    let output = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| s3_error("GetObject", e))?;

    sha256_hex_async(Box::pin(output.body.into_async_read()))
        .await
        .map_err(|e| HarnessError::operation("GetObject", format!("reading body: {}", e)))
}

pub async fn create_buckets<I, S>(client: &Client, names: I) -> Result<(), HarnessError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for name in names {
        let name = name.as_ref();
        client
            .create_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(|e| s3_error(&format!("CreateBucket {}", name), e))?;
    }
    Ok(())
}

/// Names of all buckets visible to the client
pub async fn bucket_names(client: &Client) -> Result<Vec<String>, HarnessError> {
    let output = client
        .list_buckets()
        .send()
        .await
        .map_err(|e| s3_error("ListBuckets", e))?;

    Ok(output
        .buckets()
        .iter()
        .filter_map(|b| b.name())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_client, MinioConfig};

    #[tokio::test]
    async fn test_put_rejects_size_above_single_upload_limit() {
        // Nothing listens on port 1; the size check must fail before any request
        let client = build_client("http://127.0.0.1:1", &MinioConfig::default())
            .await
            .unwrap();

        let result = put_sized_object(&client, "test", "too-big.bin", MAX_PUT_SIZE + 1).await;

        match result {
            Err(HarnessError::Operation { operation, reason }) => {
                assert_eq!(operation, "PutObject");
                assert!(reason.contains("single-upload limit"), "{}", reason);
            }
            other => panic!("expected PutObject rejection, got {:?}", other),
        }
    }
}
