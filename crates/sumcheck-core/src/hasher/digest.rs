use crate::checksum::HashAlgorithm;
use md5::Md5;
use sha1::digest::Output;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

const READ_BUFFER_LENGTH: usize = 64 * 1024; // 64KB

/// Hash the full content of `file` with one algorithm.
/// The file is re-read on every call; nothing is cached.
pub fn digest_file(algorithm: HashAlgorithm, file: &Path) -> io::Result<String> {
    let f = File::open(file)?;
    digest_reader(algorithm, f)
}

/// Hash everything `reader` yields. SHA-1 and MD5 come back as lowercase hex,
/// Adler-32 as 8 lowercase hex digits.
pub fn digest_reader<R: Read>(algorithm: HashAlgorithm, reader: R) -> io::Result<String> {
    let reader = BufReader::with_capacity(READ_BUFFER_LENGTH, reader);
    match algorithm {
        HashAlgorithm::Sha1 => hash::<Sha1, _>(reader).map(hex::encode),
        HashAlgorithm::Md5 => hash::<Md5, _>(reader).map(hex::encode),
        HashAlgorithm::Adler32 => adler2::adler32(reader).map(|sum| format!("{:08x}", sum)),
    }
}

fn hash<D: Digest + Write, R: Read>(mut reader: R) -> io::Result<Output<D>> {
    let mut hasher = D::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hasher.finalize())
}
