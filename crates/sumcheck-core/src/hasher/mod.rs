mod digest;

pub use digest::{digest_file, digest_reader};
