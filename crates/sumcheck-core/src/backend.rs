//! Collaborators the scanner is handed at construction time.
//!
//! The local implementations are [`LocalStorage`](crate::storage::LocalStorage),
//! [`Database`](crate::storage::Database) and [`DataDirUsers`](crate::users::DataDirUsers).

use crate::checksum::{ChecksumRecord, HashAlgorithm};
use crate::error::Error;
use crate::model::FileNode;

/// Content access for the storage that owns a node.
pub trait Storage {
    /// Digest of the node's current bytes. Must read the content, not a cached value.
    fn digest(&self, algorithm: HashAlgorithm, node: &FileNode) -> Result<String, Error>;
}

/// Persistent per-file metadata keyed by file id.
pub trait FileCache {
    /// Set only the checksum of entry `id`; nothing else about the entry changes.
    fn update_checksum(&self, id: i64, checksum: &ChecksumRecord) -> Result<(), Error>;
}

/// Tree structure of every user's files.
pub trait TreeProvider {
    /// Direct children of `folder`, in whatever order the backend keeps them.
    fn listing(&self, folder: &FileNode) -> Result<Vec<FileNode>, Error>;

    /// Look up `/<user>/<path>`.
    fn resolve(&self, path: &str) -> Result<Option<FileNode>, Error>;

    /// The user's home folder (`files`).
    fn user_root(&self, user: &str) -> Result<Option<FileNode>, Error>;
}

pub trait UserDirectory {
    fn exists(&self, user: &str) -> Result<bool, Error>;

    /// Every known user. Order carries no meaning.
    fn users(&self) -> Result<Vec<String>, Error>;
}

/// Storage path of every user's home folder.
pub const HOME_FOLDER: &str = "files";

/// Split `/<user>/<path>` into its user and storage-relative path.
/// A bare `/<user>` addresses the home folder.
pub fn split_user_path(path: &str) -> Option<(&str, String)> {
    let trimmed = path.trim_matches('/');
    let (user, rest) = match trimmed.split_once('/') {
        Some((user, rest)) => (user, rest),
        None => (trimmed, ""),
    };
    if user.is_empty() {
        return None;
    }

    let rest: Vec<&str> = rest.split('/').filter(|c| !c.is_empty()).collect();
    if rest.is_empty() {
        Some((user, HOME_FOLDER.to_string()))
    } else {
        Some((user, rest.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_user_path() {
        assert_eq!(
            split_user_path("/alice/files/a.txt"),
            Some(("alice", "files/a.txt".to_string()))
        );
        assert_eq!(
            split_user_path("alice/files//docs/"),
            Some(("alice", "files/docs".to_string()))
        );
        assert_eq!(split_user_path("/alice"), Some(("alice", "files".to_string())));
        assert_eq!(split_user_path("/"), None);
        assert_eq!(split_user_path(""), None);
    }
}
