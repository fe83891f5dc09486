mod walk;

pub use walk::FileWalker;

use crate::backend::{FileCache, Storage, TreeProvider, UserDirectory, HOME_FOLDER};
use crate::checksum::{self, ChecksumRecord};
use crate::error::Error;
use crate::model::FileNode;
use crate::progress::ScanReporter;
use std::fmt;
use tracing::{debug, info};

/// The part of the tree one verification pass covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// `/<user>/<path>`, a single file or a folder.
    Path(String),
    User(String),
    AllUsers,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Path(path) => write!(f, "path {}", path),
            Scope::User(user) => write!(f, "user {}", user),
            Scope::AllUsers => f.write_str("all users"),
        }
    }
}

/// Scopes as requested on the command line, before validation.
#[derive(Debug, Clone, Default)]
pub struct ScopeSelector {
    pub paths: Vec<String>,
    pub users: Vec<String>,
}

impl ScopeSelector {
    /// Paths and users are mutually exclusive; neither means every user.
    pub fn resolve(&self) -> Result<Vec<Scope>, Error> {
        match (self.paths.is_empty(), self.users.is_empty()) {
            (false, false) => Err(Error::Configuration(
                "ambiguous scope: give either paths or users, not both".to_string(),
            )),
            (true, true) => Ok(vec![Scope::AllUsers]),
            (false, true) => Ok(self.paths.iter().cloned().map(Scope::Path).collect()),
            (true, false) => Ok(self.users.iter().cloned().map(Scope::User).collect()),
        }
    }
}

/// What to do with a file whose checksum does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairPolicy {
    ReportOnly,
    /// Write the computed checksum as soon as the mismatch is found.
    Immediate,
    /// Hand mismatches back in [`ScopeReport::pending`] for a later [`Scanner::repair`].
    Collect,
}

/// A file whose recorded checksum differs from its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub node: FileNode,
    pub stored: String,
    pub actual: ChecksumRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files: usize,
    pub verified: usize,
    pub skipped: usize,
    pub mismatches: usize,
    pub repaired: usize,
    pub errors: usize,
}

impl ScanStats {
    pub fn merge(&mut self, other: &ScanStats) {
        self.files += other.files;
        self.verified += other.verified;
        self.skipped += other.skipped;
        self.mismatches += other.mismatches;
        self.repaired += other.repaired;
        self.errors += other.errors;
    }
}

#[derive(Debug, Default)]
pub struct ScopeReport {
    pub stats: ScanStats,
    /// Mismatches awaiting repair; only filled under [`RepairPolicy::Collect`].
    pub pending: Vec<Mismatch>,
}

/// Validates recorded checksums against file content.
///
/// Every collaborator is passed in; the scanner holds no other state, so one
/// instance can run any number of scopes.
pub struct Scanner<'a> {
    tree: &'a dyn TreeProvider,
    storage: &'a dyn Storage,
    cache: &'a dyn FileCache,
    users: &'a dyn UserDirectory,
}

impl<'a> Scanner<'a> {
    pub fn new(
        tree: &'a dyn TreeProvider,
        storage: &'a dyn Storage,
        cache: &'a dyn FileCache,
        users: &'a dyn UserDirectory,
    ) -> Self {
        Self {
            tree,
            storage,
            cache,
            users,
        }
    }

    /// Verify one scope.
    ///
    /// A missing user or path is returned as an error before anything is
    /// read. Once traversal starts, per-file and per-folder failures are
    /// reported and counted, never returned.
    pub fn verify_scope(
        &self,
        scope: &Scope,
        policy: RepairPolicy,
        reporter: &dyn ScanReporter,
    ) -> Result<ScopeReport, Error> {
        let roots = self.resolve_roots(scope)?;
        reporter.on_scope_start(scope);

        let mut report = ScopeReport::default();
        for root in roots {
            let root = match root {
                Root::Node(node) => node,
                Root::Home(user) => match self.tree.user_root(&user) {
                    Ok(Some(node)) => node,
                    Ok(None) => {
                        report.stats.errors += 1;
                        reporter.on_error(&user, &Error::PathNotFound(home_path(&user)));
                        continue;
                    }
                    Err(e) => {
                        report.stats.errors += 1;
                        reporter.on_error(&user, &e);
                        continue;
                    }
                },
            };
            debug!("Verifying tree at {}", root.display_path());
            self.verify_tree(root, policy, reporter, &mut report);
        }

        info!(
            "Finished {}: {} files, {} mismatches, {} skipped, {} errors",
            scope,
            report.stats.files,
            report.stats.mismatches,
            report.stats.skipped,
            report.stats.errors
        );
        reporter.on_scope_complete(scope, &report.stats);
        Ok(report)
    }

    /// Write back every collected mismatch. Failures are reported per file.
    pub fn repair(&self, pending: &[Mismatch], reporter: &dyn ScanReporter) -> ScanStats {
        let mut stats = ScanStats::default();
        for mismatch in pending {
            self.write_back(mismatch, reporter, &mut stats);
        }
        stats
    }

    /// Check a single file node against its recorded checksum.
    pub fn check_file(
        &self,
        node: FileNode,
        policy: RepairPolicy,
        reporter: &dyn ScanReporter,
        report: &mut ScopeReport,
    ) {
        report.stats.files += 1;

        let Some(stored) = node.stored_checksum() else {
            debug!("No checksum for {}", node.display_path());
            report.stats.skipped += 1;
            reporter.on_skipped(&node);
            return;
        };

        let actual = match checksum::compute_record(self.storage, &node) {
            Ok(actual) => actual,
            Err(e) => {
                report.stats.errors += 1;
                reporter.on_error(&node.display_path(), &e);
                return;
            }
        };

        if actual.matches(stored) {
            report.stats.verified += 1;
            reporter.on_verified(&node);
            return;
        }

        let mismatch = Mismatch {
            stored: stored.to_string(),
            node,
            actual,
        };
        report.stats.mismatches += 1;
        reporter.on_mismatch(&mismatch);

        match policy {
            RepairPolicy::ReportOnly => {}
            RepairPolicy::Immediate => self.write_back(&mismatch, reporter, &mut report.stats),
            RepairPolicy::Collect => report.pending.push(mismatch),
        }
    }

    fn verify_tree(
        &self,
        root: FileNode,
        policy: RepairPolicy,
        reporter: &dyn ScanReporter,
        report: &mut ScopeReport,
    ) {
        for item in FileWalker::new(self.tree, root) {
            match item {
                Ok(node) => self.check_file(node, policy, reporter, report),
                Err(e) => {
                    let subject = match &e {
                        Error::Listing { path, .. } => path.clone(),
                        _ => "listing".to_string(),
                    };
                    report.stats.errors += 1;
                    reporter.on_error(&subject, &e);
                }
            }
        }
    }

    fn write_back(&self, mismatch: &Mismatch, reporter: &dyn ScanReporter, stats: &mut ScanStats) {
        match self.cache.update_checksum(mismatch.node.id, &mismatch.actual) {
            Ok(()) => {
                stats.repaired += 1;
                reporter.on_repaired(mismatch);
            }
            Err(e) => {
                stats.errors += 1;
                reporter.on_error(&mismatch.node.display_path(), &e);
            }
        }
    }

    /// Roots to walk for `scope`. An error here ends the scope.
    fn resolve_roots(&self, scope: &Scope) -> Result<Vec<Root>, Error> {
        match scope {
            Scope::Path(path) => match self.tree.resolve(path)? {
                Some(node) => Ok(vec![Root::Node(node)]),
                None => Err(Error::PathNotFound(path.clone())),
            },
            Scope::User(user) => {
                if !self.users.exists(user)? {
                    return Err(Error::UserNotFound(user.clone()));
                }
                match self.tree.user_root(user)? {
                    Some(node) => Ok(vec![Root::Node(node)]),
                    None => Err(Error::PathNotFound(home_path(user))),
                }
            }
            Scope::AllUsers => {
                let mut users = self.users.users()?;
                users.sort();
                Ok(users.into_iter().map(Root::Home).collect())
            }
        }
    }
}

/// A tree to walk. Homes in all-users mode are looked up only when reached,
/// and a failed lookup skips just that user.
enum Root {
    Node(FileNode),
    Home(String),
}

fn home_path(user: &str) -> String {
    format!("/{}/{}", user, HOME_FOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_defaults_to_all_users() {
        let scopes = ScopeSelector::default().resolve().unwrap();
        assert_eq!(scopes, vec![Scope::AllUsers]);
    }

    #[test]
    fn test_selector_rejects_path_and_user() {
        let selector = ScopeSelector {
            paths: vec!["/alice/files".to_string()],
            users: vec!["alice".to_string()],
        };
        assert!(matches!(selector.resolve(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_selector_one_scope_per_entry() {
        let selector = ScopeSelector {
            paths: vec!["/alice/files/a".to_string(), "/bob/files".to_string()],
            users: Vec::new(),
        };
        assert_eq!(
            selector.resolve().unwrap(),
            vec![
                Scope::Path("/alice/files/a".to_string()),
                Scope::Path("/bob/files".to_string()),
            ]
        );
    }

    #[test]
    fn test_stats_merge() {
        let mut total = ScanStats {
            files: 2,
            verified: 1,
            skipped: 1,
            ..Default::default()
        };
        total.merge(&ScanStats {
            files: 3,
            mismatches: 2,
            repaired: 2,
            errors: 1,
            ..Default::default()
        });
        assert_eq!(total.files, 5);
        assert_eq!(total.mismatches, 2);
        assert_eq!(total.repaired, 2);
        assert_eq!(total.errors, 1);
    }
}
