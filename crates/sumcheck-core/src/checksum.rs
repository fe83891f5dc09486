use crate::backend::Storage;
use crate::error::Error;
use crate::model::FileNode;
use std::fmt;

/// Digest algorithms that make up a checksum record, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Md5,
    Adler32,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 3] =
        [HashAlgorithm::Sha1, HashAlgorithm::Md5, HashAlgorithm::Adler32];

    /// Lowercase name used when asking a storage backend for a digest.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Adler32 => "adler32",
        }
    }

    /// Field label inside a checksum record.
    pub fn label(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Adler32 => "ADLER32",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Composite checksum `SHA1:<hex> MD5:<hex> ADLER32:<hex>`.
///
/// Records compare as whole strings; there is no per-algorithm matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRecord(String);

impl ChecksumRecord {
    pub fn compose(sha1: &str, md5: &str, adler32: &str) -> Self {
        ChecksumRecord(format!(
            "{}:{} {}:{} {}:{}",
            HashAlgorithm::Sha1.label(),
            sha1,
            HashAlgorithm::Md5.label(),
            md5,
            HashAlgorithm::Adler32.label(),
            adler32
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Byte-for-byte comparison with a stored value.
    pub fn matches(&self, stored: &str) -> bool {
        self.0 == stored
    }
}

impl fmt::Display for ChecksumRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recompute the record for `node` from its current content.
/// Asks the backend for each algorithm in record order; the first failure wins.
pub fn compute_record(storage: &dyn Storage, node: &FileNode) -> Result<ChecksumRecord, Error> {
    let sha1 = storage.digest(HashAlgorithm::Sha1, node)?;
    let md5 = storage.digest(HashAlgorithm::Md5, node)?;
    let adler32 = storage.digest(HashAlgorithm::Adler32, node)?;
    Ok(ChecksumRecord::compose(&sha1, &md5, &adler32))
}
