use std::fmt;

/// Whether a filecache entry is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a user's tree as the scanner sees it.
///
/// `path` is relative to the owner's home storage (`files/docs/a.txt`),
/// `checksum` is the value last recorded in the filecache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub id: i64,
    pub user: String,
    pub path: String,
    pub kind: NodeKind,
    pub checksum: Option<String>,
}

impl FileNode {
    /// The recorded checksum, treating an empty string as never computed.
    pub fn stored_checksum(&self) -> Option<&str> {
        self.checksum.as_deref().filter(|c| !c.is_empty())
    }

    /// Absolute form used in diagnostics: `/<user>/<path>`.
    pub fn display_path(&self) -> String {
        format!("/{}/{}", self.user, self.path)
    }
}
