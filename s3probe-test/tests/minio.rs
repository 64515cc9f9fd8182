//! MinIO integration tests using aws-sdk-s3
//!
//! Each test gets its own MinIO container. They need a Docker daemon, so they
//! are ignored by default: run them with `cargo test -p s3probe-test -- --ignored`.

use s3probe_core::fixtures::{FIXTURE_ETAG, FIXTURE_KEY, FIXTURE_SHA256, FIXTURE_SIZE};
use s3probe_test::objects::{bucket_names, create_buckets, object_sha256, put_sized_object};
use s3probe_test::{init_tracing, run_with_minio, MinioConfig};

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_write_bucket() {
    init_tracing();

    run_with_minio(&MinioConfig::default(), |client| async move {
        let bucket = "test";

        client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .expect("unable to create bucket");

        let etag = put_sized_object(&client, bucket, FIXTURE_KEY, FIXTURE_SIZE)
            .await
            .expect("unable to write object");
        assert_eq!(etag, FIXTURE_ETAG, "invalid ETag");

        let hash = object_sha256(&client, bucket, FIXTURE_KEY)
            .await
            .expect("unable to read object");
        assert_eq!(hash, FIXTURE_SHA256, "invalid content hash");
    })
    .await;
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_list_buckets() {
    init_tracing();

    run_with_minio(&MinioConfig::default(), |client| async move {
        let buckets = bucket_names(&client).await.expect("unable to list buckets");
        assert!(buckets.is_empty(), "didn't expect any buckets: {:?}", buckets);

        let names: Vec<String> = (0..3).map(|i| format!("bucket-{}", i)).collect();
        create_buckets(&client, &names)
            .await
            .expect("unable to create buckets");

        let mut buckets = bucket_names(&client).await.expect("unable to list buckets");
        buckets.sort();
        assert_eq!(buckets, names);
    })
    .await;
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_get_missing_object_fails() {
    init_tracing();

    run_with_minio(&MinioConfig::default(), |client| async move {
        create_buckets(&client, ["empty"])
            .await
            .expect("unable to create bucket");

        let result = object_sha256(&client, "empty", "missing.bin").await;
        assert!(result.is_err(), "expected GetObject on a missing key to fail");
    })
    .await;
}
