//! SHA-256 content digests.
//!
//! Every digest in a handoff pack is the lowercase hex SHA-256 of raw bytes.
//! String inputs are hashed over their UTF-8 encoding, which is the same
//! encoding byte offsets are measured in.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Compute the SHA-256 of bytes as a lowercase hex string.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute the SHA-256 of a string's UTF-8 encoding.
pub fn sha256_str(data: &str) -> String {
    sha256_bytes(data.as_bytes())
}

/// Compute the SHA-256 of a file, streaming it in 8 KiB chunks.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
