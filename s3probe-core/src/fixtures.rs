//! Fixed regression values for the standard test object

/// Size of the standard test object
pub const FIXTURE_SIZE: u64 = 100 * 1024;

/// Key the standard test object is written under
pub const FIXTURE_KEY: &str = "prefix/test.bin";

/// ETag returned for a single-part upload of the standard test object
pub const FIXTURE_ETAG: &str = "44d088cef136d178e9c8ba84c3fdf6ca";

/// SHA-256 of the standard test object
pub const FIXTURE_SHA256: &str =
    "27783e87963a4efb6829b531c9ba57b44f45797f6770bd637fbf0d807cbdbae0";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{md5_etag, sha256_hex, SizeReader};

    #[test]
    fn test_fixture_etag_matches_generated_stream() {
        let etag = md5_etag(SizeReader::new(FIXTURE_SIZE)).unwrap();
        assert_eq!(etag, FIXTURE_ETAG);
    }

    #[test]
    fn test_fixture_hash_matches_generated_stream() {
        let hash = sha256_hex(SizeReader::new(FIXTURE_SIZE)).unwrap();
        assert_eq!(hash, FIXTURE_SHA256);
    }
}
