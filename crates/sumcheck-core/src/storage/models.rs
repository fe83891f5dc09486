use crate::model::{FileNode, NodeKind};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

/// One row of the filecache table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub fileid: i64,
    pub user: String,
    pub path: String,
    pub parent: Option<i64>,
    pub name: String,
    pub kind: NodeKind,
    pub size: i64,
    pub mtime: i64,
    /// Empty when never computed.
    pub checksum: String,
}

impl From<CacheEntry> for FileNode {
    fn from(entry: CacheEntry) -> Self {
        FileNode {
            id: entry.fileid,
            user: entry.user,
            path: entry.path,
            kind: entry.kind,
            checksum: Some(entry.checksum).filter(|c| !c.is_empty()),
        }
    }
}

/// Fields the indexer knows about a file on disk.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user: String,
    pub path: String,
    pub parent: Option<i64>,
    pub name: String,
    pub kind: NodeKind,
    pub size: i64,
    pub mtime: i64,
}

/// Outcome of writing a [`NewEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(i64),
    /// Size or mtime changed; the checksum was cleared.
    Changed(i64),
    Unchanged(i64),
}

impl UpsertOutcome {
    pub fn fileid(&self) -> i64 {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Changed(id) | UpsertOutcome::Unchanged(id) => {
                *id
            }
        }
    }
}

impl ToSql for NodeKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for NodeKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "file" => Ok(NodeKind::File),
            "folder" => Ok(NodeKind::Folder),
            other => Err(FromSqlError::Other(
                format!("unknown node kind '{}'", other).into(),
            )),
        }
    }
}
