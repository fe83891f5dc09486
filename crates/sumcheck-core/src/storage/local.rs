use crate::backend::Storage;
use crate::checksum::HashAlgorithm;
use crate::error::Error;
use crate::hasher;
use crate::model::FileNode;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Home storages laid out as `<data_dir>/<user>/<path>` on the local disk.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    data_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// On-disk location of a node.
    pub fn local_path(&self, user: &str, path: &str) -> PathBuf {
        self.data_dir.join(user).join(path)
    }
}

impl Storage for LocalStorage {
    fn digest(&self, algorithm: HashAlgorithm, node: &FileNode) -> Result<String, Error> {
        let file = self.local_path(&node.user, &node.path);
        trace!("Computing {} of {}", algorithm, file.display());
        hasher::digest_file(algorithm, &file).map_err(|source| Error::StorageUnavailable {
            path: node.display_path(),
            source,
        })
    }
}
