use sumcheck_core::backend::{FileCache, TreeProvider};
use sumcheck_core::storage::models::{NewEntry, UpsertOutcome};
use sumcheck_core::storage::Database;
use sumcheck_core::{ChecksumRecord, Error, FileNode, NodeKind};
use tempfile::tempdir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn entry(user: &str, path: &str, parent: Option<i64>, kind: NodeKind, size: i64) -> NewEntry {
    NewEntry {
        user: user.to_string(),
        path: path.to_string(),
        parent,
        name: path.rsplit('/').next().unwrap().to_string(),
        kind,
        size,
        mtime: 1_700_000_000,
    }
}

/// alice: files/{docs/{b.txt, a.txt}, top.txt}
fn seeded() -> (Database, i64, i64) {
    let db = Database::open_in_memory().unwrap();
    let home = db
        .upsert_entry(&entry("alice", "files", None, NodeKind::Folder, 0))
        .unwrap()
        .fileid();
    let docs = db
        .upsert_entry(&entry("alice", "files/docs", Some(home), NodeKind::Folder, 0))
        .unwrap()
        .fileid();
    db.upsert_entry(&entry("alice", "files/docs/b.txt", Some(docs), NodeKind::File, 10))
        .unwrap();
    db.upsert_entry(&entry("alice", "files/docs/a.txt", Some(docs), NodeKind::File, 20))
        .unwrap();
    db.upsert_entry(&entry("alice", "files/top.txt", Some(home), NodeKind::File, 30))
        .unwrap();
    (db, home, docs)
}

// ── Schema ───────────────────────────────────────────────────────────────────

#[test]
fn test_open_creates_schema_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::open(path).unwrap();
        db.upsert_entry(&entry("alice", "files", None, NodeKind::Folder, 0))
            .unwrap();
    }

    // Reopening keeps existing rows.
    let db = Database::open(path).unwrap();
    assert!(db.get_entry("alice", "files").unwrap().is_some());
    let version: i64 = db
        .connection()
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, 1);
}

// ── Upsert ───────────────────────────────────────────────────────────────────

#[test]
fn test_upsert_reports_insert_then_unchanged() {
    let db = Database::open_in_memory().unwrap();
    let new = entry("alice", "files", None, NodeKind::Folder, 0);

    let first = db.upsert_entry(&new).unwrap();
    let second = db.upsert_entry(&new).unwrap();

    assert!(matches!(first, UpsertOutcome::Inserted(_)));
    assert_eq!(second, UpsertOutcome::Unchanged(first.fileid()));
}

#[test]
fn test_changed_file_loses_checksum() {
    let (db, _, _) = seeded();
    let a = db.get_entry("alice", "files/docs/a.txt").unwrap().unwrap();
    db.set_checksum(a.fileid, "SHA1:x MD5:y ADLER32:z").unwrap();

    let mut changed = entry("alice", "files/docs/a.txt", a.parent, NodeKind::File, 21);
    changed.mtime += 5;
    let outcome = db.upsert_entry(&changed).unwrap();

    assert_eq!(outcome, UpsertOutcome::Changed(a.fileid));
    let after = db.get_entry_by_id(a.fileid).unwrap().unwrap();
    assert_eq!(after.size, 21);
    assert_eq!(after.checksum, "");
}

#[test]
fn test_unchanged_file_keeps_checksum() {
    let (db, _, _) = seeded();
    let a = db.get_entry("alice", "files/docs/a.txt").unwrap().unwrap();
    db.set_checksum(a.fileid, "SHA1:x MD5:y ADLER32:z").unwrap();

    let same = entry("alice", "files/docs/a.txt", a.parent, NodeKind::File, 20);
    assert_eq!(db.upsert_entry(&same).unwrap(), UpsertOutcome::Unchanged(a.fileid));
    assert_eq!(
        db.get_entry_by_id(a.fileid).unwrap().unwrap().checksum,
        "SHA1:x MD5:y ADLER32:z"
    );
}

#[test]
fn test_kind_change_recreates_entry() {
    let (db, home, _) = seeded();
    let old = db.get_entry("alice", "files/top.txt").unwrap().unwrap();

    let outcome = db
        .upsert_entry(&entry("alice", "files/top.txt", Some(home), NodeKind::Folder, 0))
        .unwrap();

    assert!(matches!(outcome, UpsertOutcome::Inserted(_)));
    assert_ne!(outcome.fileid(), old.fileid);
    assert!(db.get_entry_by_id(old.fileid).unwrap().is_none());
    let new = db.get_entry("alice", "files/top.txt").unwrap().unwrap();
    assert_eq!(new.kind, NodeKind::Folder);
}

#[test]
fn test_deleting_folder_cascades() {
    let (db, _, docs) = seeded();
    db.delete_entry(docs).unwrap();

    let paths: Vec<String> = db
        .entries_for_user("alice")
        .unwrap()
        .into_iter()
        .map(|e| e.path)
        .collect();
    assert_eq!(paths, vec!["files", "files/top.txt"]);
}

#[test]
fn test_files_without_checksum_skips_folders_and_hashed() {
    let (db, _, _) = seeded();
    let b = db.get_entry("alice", "files/docs/b.txt").unwrap().unwrap();
    db.set_checksum(b.fileid, "SHA1:x MD5:y ADLER32:z").unwrap();

    let paths: Vec<String> = db
        .files_without_checksum("alice")
        .unwrap()
        .into_iter()
        .map(|e| e.path)
        .collect();
    assert_eq!(paths, vec!["files/docs/a.txt", "files/top.txt"]);
}

// ── Tree provider ────────────────────────────────────────────────────────────

#[test]
fn test_listing_is_ordered_by_name() {
    let (db, _, docs) = seeded();
    let folder: FileNode = db.get_entry_by_id(docs).unwrap().unwrap().into();

    let names: Vec<String> = db
        .listing(&folder)
        .unwrap()
        .into_iter()
        .map(|n| n.path)
        .collect();
    assert_eq!(names, vec!["files/docs/a.txt", "files/docs/b.txt"]);
}

#[test]
fn test_resolve_user_paths() {
    let (db, home, docs) = seeded();

    assert_eq!(db.resolve("/alice/files/docs").unwrap().unwrap().id, docs);
    assert_eq!(db.resolve("/alice").unwrap().unwrap().id, home);
    assert_eq!(db.resolve("/alice/files/docs/").unwrap().unwrap().id, docs);
    assert!(db.resolve("/alice/files/nope").unwrap().is_none());
    assert!(db.resolve("/bob/files").unwrap().is_none());
    assert!(db.resolve("/").unwrap().is_none());

    assert_eq!(db.user_root("alice").unwrap().unwrap().id, home);
    assert!(db.user_root("bob").unwrap().is_none());
}

#[test]
fn test_empty_checksum_reads_as_none() {
    let (db, _, _) = seeded();
    let node = db.resolve("/alice/files/top.txt").unwrap().unwrap();
    assert_eq!(node.checksum, None);
    assert_eq!(node.kind, NodeKind::File);
}

// ── File cache ───────────────────────────────────────────────────────────────

#[test]
fn test_update_checksum_touches_only_checksum() {
    let (db, _, _) = seeded();
    let before = db.get_entry("alice", "files/top.txt").unwrap().unwrap();
    let record = ChecksumRecord::compose("ccc", "ddd", "00000002");

    db.update_checksum(before.fileid, &record).unwrap();

    let after = db.get_entry_by_id(before.fileid).unwrap().unwrap();
    assert_eq!(after.checksum, "SHA1:ccc MD5:ddd ADLER32:00000002");
    assert_eq!(after.size, before.size);
    assert_eq!(after.mtime, before.mtime);
    assert_eq!(after.parent, before.parent);
}

#[test]
fn test_update_checksum_of_missing_entry_fails() {
    let db = Database::open_in_memory().unwrap();
    let record = ChecksumRecord::compose("ccc", "ddd", "00000002");
    assert!(matches!(db.update_checksum(42, &record), Err(Error::Other(_))));
}
