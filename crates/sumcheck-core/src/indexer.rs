use crate::backend::HOME_FOLDER;
use crate::checksum;
use crate::error::Error;
use crate::model::{FileNode, NodeKind};
use crate::progress::IndexReporter;
use crate::storage::models::{NewEntry, UpsertOutcome};
use crate::storage::{Database, LocalStorage};
use glob::Pattern;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path};
use std::time::{Instant, UNIX_EPOCH};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub hashed: usize,
    pub errors: usize,
}

impl IndexStats {
    pub fn merge(&mut self, other: &IndexStats) {
        self.added += other.added;
        self.updated += other.updated;
        self.removed += other.removed;
        self.hashed += other.hashed;
        self.errors += other.errors;
    }
}

/// Mirrors users' `files` trees from the data directory into the filecache.
pub struct Indexer<'a> {
    db: &'a Database,
    storage: &'a LocalStorage,
    ignore_patterns: Vec<Pattern>,
}

impl<'a> Indexer<'a> {
    /// Invalid glob patterns are logged and dropped.
    pub fn new(db: &'a Database, storage: &'a LocalStorage, ignore_globs: &[String]) -> Self {
        let ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();
        Self {
            db,
            storage,
            ignore_patterns,
        }
    }

    /// Bring one user's filecache in line with the disk.
    ///
    /// New entries start without a checksum. With `with_checksums`, every file
    /// still lacking one afterwards gets it computed.
    pub fn index_user(
        &self,
        user: &str,
        with_checksums: bool,
        reporter: &dyn IndexReporter,
    ) -> Result<IndexStats, Error> {
        let user_dir = self.storage.data_dir().join(user);
        let home = user_dir.join(HOME_FOLDER);
        if !home.is_dir() {
            return Err(Error::UserNotFound(user.to_string()));
        }

        let start = Instant::now();
        reporter.on_index_start(user);
        let mut stats = IndexStats::default();
        let mut walk_errors = 0usize;
        let mut seen: HashSet<i64> = HashSet::new();
        let mut folder_ids: HashMap<String, i64> = HashMap::new();

        let walker = WalkDir::new(&home)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_ignored(entry.path()));

        for (entries_seen, entry) in walker.enumerate() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!("Error walking {}: {}", home.display(), e);
                    walk_errors += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                NodeKind::Folder
            } else if file_type.is_file() {
                NodeKind::File
            } else {
                debug!("Skipping {} (not a regular file)", entry.path().display());
                continue;
            };

            let Some(path) = storage_path(&user_dir, entry.path()) else {
                warn!("Skipping {} (name is not valid UTF-8)", entry.path().display());
                stats.errors += 1;
                continue;
            };
            reporter.on_index_progress(entries_seen + 1, &path);

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    error!("Error reading metadata for {}: {}", entry.path().display(), e);
                    walk_errors += 1;
                    continue;
                }
            };
            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            let parent = path
                .rsplit_once('/')
                .and_then(|(parent, _)| folder_ids.get(parent).copied());
            let name = path.rsplit('/').next().unwrap_or(&path).to_string();

            let outcome = self.db.upsert_entry(&NewEntry {
                user: user.to_string(),
                path: path.clone(),
                parent,
                name,
                kind,
                size: if kind == NodeKind::File { metadata.len() as i64 } else { 0 },
                mtime,
            })?;
            match outcome {
                UpsertOutcome::Inserted(_) => stats.added += 1,
                UpsertOutcome::Changed(_) => stats.updated += 1,
                UpsertOutcome::Unchanged(_) => {}
            }
            seen.insert(outcome.fileid());
            if kind == NodeKind::Folder {
                folder_ids.insert(path, outcome.fileid());
            }
        }

        if walk_errors > 0 {
            // Entries below an unreadable folder were not seen; keep them.
            warn!(
                "{} errors while walking {}, not removing vanished entries",
                walk_errors, user
            );
        } else {
            stats.removed = self.remove_vanished(user, &seen)?;
        }
        stats.errors += walk_errors;

        if with_checksums {
            self.fill_checksums(user, &mut stats)?;
        }

        let duration = start.elapsed();
        info!(
            "Indexed {} in {:.2}s: {} added, {} updated, {} removed, {} hashed",
            user,
            duration.as_secs_f64(),
            stats.added,
            stats.updated,
            stats.removed,
            stats.hashed
        );
        reporter.on_index_complete(user, &stats, duration.as_secs_f64());
        Ok(stats)
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    fn remove_vanished(&self, user: &str, seen: &HashSet<i64>) -> Result<usize, Error> {
        let vanished: Vec<_> = self
            .db
            .entries_for_user(user)?
            .into_iter()
            .filter(|entry| !seen.contains(&entry.fileid))
            .collect();
        for entry in &vanished {
            // Children of an already deleted folder are gone through the cascade.
            self.db.delete_entry(entry.fileid)?;
            debug!("Removed /{}/{} from filecache", user, entry.path);
        }
        Ok(vanished.len())
    }

    /// Hash in parallel, write on this thread.
    fn fill_checksums(&self, user: &str, stats: &mut IndexStats) -> Result<(), Error> {
        let nodes: Vec<FileNode> = self
            .db
            .files_without_checksum(user)?
            .into_iter()
            .map(FileNode::from)
            .collect();
        debug!("Computing checksums for {} files of {}", nodes.len(), user);

        let storage = self.storage;
        let computed: Vec<_> = nodes
            .par_iter()
            .map(|node| (node, checksum::compute_record(storage, node)))
            .collect();

        for (node, record) in computed {
            match record {
                Ok(record) => {
                    self.db.set_checksum(node.id, record.as_str())?;
                    stats.hashed += 1;
                }
                Err(e) => {
                    error!("Error hashing {}: {}", node.display_path(), e);
                    stats.errors += 1;
                }
            }
        }
        Ok(())
    }
}

/// `<user_dir>/files/a/b` → `files/a/b`, always with `/` separators.
fn storage_path(user_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(user_dir).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_storage_path_uses_forward_slashes() {
        let user_dir = PathBuf::from("/data/alice");
        let path = user_dir.join("files").join("docs").join("a.txt");
        assert_eq!(
            storage_path(&user_dir, &path).as_deref(),
            Some("files/docs/a.txt")
        );
        assert_eq!(storage_path(&user_dir, Path::new("/elsewhere/x")), None);
    }
}
