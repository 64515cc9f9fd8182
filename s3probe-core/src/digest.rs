//! Content hashes and ETags

use md5::Md5;
use sha2::{Digest, Sha256};
use std::io::{self, Read};
use tokio::io::{AsyncRead, AsyncReadExt};

const BUFFER_SIZE: usize = 64 * 1024;

/// SHA-256 of everything `reader` yields, as lowercase hex
pub fn sha256_hex<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Async variant of [`sha256_hex`], used to hash a response body as it streams in.
pub async fn sha256_hex_async<R: AsyncRead + Unpin>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// ETag an S3 server assigns to a single-part, unencrypted upload of `reader`'s content.
///
/// This is the MD5 of the content in lowercase hex, without the quotes servers
/// put around it on the wire.
pub fn md5_etag<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Md5::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Strip the double quotes S3 wraps around ETag values
pub fn normalize_etag(etag: &str) -> &str {
    etag.trim().trim_matches('"')
}
