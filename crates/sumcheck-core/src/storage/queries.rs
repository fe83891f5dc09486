use super::models::*;
use super::sqlite::Database;
use crate::backend::{split_user_path, FileCache, TreeProvider, HOME_FOLDER};
use crate::checksum::ChecksumRecord;
use crate::error::Error;
use crate::model::{FileNode, NodeKind};
use rusqlite::{params, OptionalExtension, Result, Row};
use tracing::{debug, trace};

const ENTRY_COLUMNS: &str = "fileid, user, path, parent, name, kind, size, mtime, checksum";

fn entry_from_row(row: &Row<'_>) -> Result<CacheEntry> {
    Ok(CacheEntry {
        fileid: row.get(0)?,
        user: row.get(1)?,
        path: row.get(2)?,
        parent: row.get(3)?,
        name: row.get(4)?,
        kind: row.get(5)?,
        size: row.get(6)?,
        mtime: row.get(7)?,
        checksum: row.get(8)?,
    })
}

impl Database {
    // ── Lookups ──────────────────────────────────────────────────

    pub fn get_entry(&self, user: &str, path: &str) -> Result<Option<CacheEntry>> {
        self.connection()
            .query_row(
                &format!(
                    "SELECT {} FROM filecache WHERE user = ?1 AND path = ?2",
                    ENTRY_COLUMNS
                ),
                params![user, path],
                entry_from_row,
            )
            .optional()
    }

    pub fn get_entry_by_id(&self, fileid: i64) -> Result<Option<CacheEntry>> {
        self.connection()
            .query_row(
                &format!("SELECT {} FROM filecache WHERE fileid = ?1", ENTRY_COLUMNS),
                params![fileid],
                entry_from_row,
            )
            .optional()
    }

    /// Direct children of a folder, ordered by name.
    pub fn children(&self, parent: i64) -> Result<Vec<CacheEntry>> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM filecache WHERE parent = ?1 ORDER BY name",
            ENTRY_COLUMNS
        ))?;
        let entries = stmt
            .query_map(params![parent], entry_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Every entry a user has, ordered by path.
    pub fn entries_for_user(&self, user: &str) -> Result<Vec<CacheEntry>> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM filecache WHERE user = ?1 ORDER BY path",
            ENTRY_COLUMNS
        ))?;
        let entries = stmt
            .query_map(params![user], entry_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Files of a user whose checksum was never computed.
    pub fn files_without_checksum(&self, user: &str) -> Result<Vec<CacheEntry>> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM filecache \
             WHERE user = ?1 AND kind = 'file' AND checksum = '' ORDER BY path",
            ENTRY_COLUMNS
        ))?;
        let entries = stmt
            .query_map(params![user], entry_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Insert a new entry or refresh an existing one.
    ///
    /// A file whose size or mtime changed loses its checksum: the recorded
    /// value no longer describes the content. An entry whose kind flipped
    /// (file replaced by folder or the other way round) is recreated.
    pub fn upsert_entry(&self, entry: &NewEntry) -> Result<UpsertOutcome> {
        if let Some(existing) = self.get_entry(&entry.user, &entry.path)? {
            if existing.kind != entry.kind {
                debug!(
                    "/{}/{} changed from {} to {}, recreating",
                    entry.user, entry.path, existing.kind, entry.kind
                );
                self.delete_entry(existing.fileid)?;
                return self.insert_entry(entry).map(UpsertOutcome::Inserted);
            }

            let changed = entry.kind == NodeKind::File
                && (existing.size != entry.size || existing.mtime != entry.mtime);
            if changed {
                self.connection().execute(
                    "UPDATE filecache SET size = ?1, mtime = ?2, checksum = '' WHERE fileid = ?3",
                    params![entry.size, entry.mtime, existing.fileid],
                )?;
                trace!("/{}/{} changed on disk", entry.user, entry.path);
                return Ok(UpsertOutcome::Changed(existing.fileid));
            }
            return Ok(UpsertOutcome::Unchanged(existing.fileid));
        }

        self.insert_entry(entry).map(UpsertOutcome::Inserted)
    }

    fn insert_entry(&self, entry: &NewEntry) -> Result<i64> {
        self.connection().execute(
            "INSERT INTO filecache (user, path, parent, name, kind, size, mtime, checksum) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, '')",
            params![
                entry.user,
                entry.path,
                entry.parent,
                entry.name,
                entry.kind,
                entry.size,
                entry.mtime
            ],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    /// Delete an entry; its descendants cascade.
    pub fn delete_entry(&self, fileid: i64) -> Result<usize> {
        self.connection()
            .execute("DELETE FROM filecache WHERE fileid = ?1", params![fileid])
    }

    /// Set only the checksum column. Returns the number of rows touched.
    pub fn set_checksum(&self, fileid: i64, checksum: &str) -> Result<usize> {
        self.connection().execute(
            "UPDATE filecache SET checksum = ?1 WHERE fileid = ?2",
            params![checksum, fileid],
        )
    }
}

impl TreeProvider for Database {
    fn listing(&self, folder: &FileNode) -> Result<Vec<FileNode>, Error> {
        Ok(self
            .children(folder.id)?
            .into_iter()
            .map(FileNode::from)
            .collect())
    }

    fn resolve(&self, path: &str) -> Result<Option<FileNode>, Error> {
        let Some((user, storage_path)) = split_user_path(path) else {
            return Ok(None);
        };
        Ok(self.get_entry(user, &storage_path)?.map(FileNode::from))
    }

    fn user_root(&self, user: &str) -> Result<Option<FileNode>, Error> {
        Ok(self.get_entry(user, HOME_FOLDER)?.map(FileNode::from))
    }
}

impl FileCache for Database {
    fn update_checksum(&self, id: i64, checksum: &ChecksumRecord) -> Result<(), Error> {
        match self.set_checksum(id, checksum.as_str())? {
            0 => Err(Error::Other(format!("no filecache entry with id {}", id))),
            _ => Ok(()),
        }
    }
}
