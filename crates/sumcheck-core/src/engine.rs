use crate::backend::UserDirectory;
use crate::config::{AppConfig, RepairMode};
use crate::error::Error;
use crate::indexer::{IndexStats, Indexer};
use crate::progress::{IndexReporter, ScanReporter};
use crate::scanner::{Mismatch, RepairPolicy, ScanStats, Scanner, Scope};
use crate::storage::{Database, LocalStorage};
use crate::users::DataDirUsers;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Wires the local collaborators together from an [`AppConfig`].
pub struct Engine {
    config: AppConfig,
    db: Database,
    storage: LocalStorage,
    users: DataDirUsers,
}

#[derive(Debug, Default)]
pub struct VerifyOutcome {
    pub duration: Duration,
    pub stats: ScanStats,
    /// Mismatches collected under [`RepairPolicy::Collect`], across all scopes.
    pub pending: Vec<Mismatch>,
    /// Scopes that could not be traversed at all.
    pub failed_scopes: Vec<(Scope, Error)>,
}

#[derive(Debug, Default)]
pub struct IndexOutcome {
    pub duration: Duration,
    pub stats: IndexStats,
    pub failed_users: Vec<(String, Error)>,
}

/// Scanner policy for a configured mode and whether `--repair` was given.
pub fn repair_policy(mode: RepairMode, repair_requested: bool) -> RepairPolicy {
    match (mode, repair_requested) {
        (RepairMode::Immediate, true) => RepairPolicy::Immediate,
        (RepairMode::Immediate, false) => RepairPolicy::ReportOnly,
        (RepairMode::Deferred, _) => RepairPolicy::Collect,
    }
}

impl Engine {
    pub fn open(config: AppConfig) -> Result<Self, Error> {
        debug!("Opening filecache at {}", config.database_path);
        let db = Database::open(&config.database_path)?;
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: AppConfig, db: Database) -> Self {
        let storage = LocalStorage::new(&config.data_dir);
        let users = DataDirUsers::new(&config.data_dir);
        Self {
            config,
            db,
            storage,
            users,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn scanner(&self) -> Scanner<'_> {
        Scanner::new(&self.db, &self.storage, &self.db, &self.users)
    }

    /// Verify each scope in turn.
    ///
    /// A scope that cannot be resolved is reported, recorded in
    /// [`VerifyOutcome::failed_scopes`], and the remaining scopes still run.
    /// Build `scopes` with [`ScopeSelector::resolve`](crate::scanner::ScopeSelector::resolve),
    /// which rejects an ambiguous selection before anything is opened.
    pub fn verify(
        &self,
        scopes: &[Scope],
        policy: RepairPolicy,
        reporter: &dyn ScanReporter,
    ) -> VerifyOutcome {
        let scanner = self.scanner();
        let start = Instant::now();
        let mut outcome = VerifyOutcome::default();

        for scope in scopes {
            match scanner.verify_scope(scope, policy, reporter) {
                Ok(report) => {
                    outcome.stats.merge(&report.stats);
                    outcome.pending.extend(report.pending);
                }
                Err(e) => {
                    debug!("Cannot verify {}: {}", scope, e);
                    reporter.on_error(&scope.to_string(), &e);
                    outcome.failed_scopes.push((scope.clone(), e));
                }
            }
        }

        outcome.duration = start.elapsed();
        outcome
    }

    /// Write back mismatches collected by a deferred [`Engine::verify`].
    pub fn repair(&self, pending: &[Mismatch], reporter: &dyn ScanReporter) -> ScanStats {
        info!("Repairing {} checksums", pending.len());
        self.scanner().repair(pending, reporter)
    }

    /// Index the given users, or every user of the data directory.
    pub fn index(
        &self,
        users: &[String],
        with_checksums: bool,
        reporter: &dyn IndexReporter,
    ) -> Result<IndexOutcome, Error> {
        let users = if users.is_empty() {
            self.users.users()?
        } else {
            users.to_vec()
        };

        let indexer = Indexer::new(&self.db, &self.storage, &self.config.ignore_patterns);
        let start = Instant::now();
        let mut outcome = IndexOutcome::default();

        for user in users {
            if !self.users.exists(&user)? {
                error!("Cannot index {}: no such user", user);
                outcome
                    .failed_users
                    .push((user.clone(), Error::UserNotFound(user)));
                continue;
            }
            match indexer.index_user(&user, with_checksums, reporter) {
                Ok(stats) => outcome.stats.merge(&stats),
                Err(e) => {
                    error!("Cannot index {}: {}", user, e);
                    outcome.failed_users.push((user, e));
                }
            }
        }

        outcome.duration = start.elapsed();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_policy_mapping() {
        assert_eq!(repair_policy(RepairMode::Immediate, true), RepairPolicy::Immediate);
        assert_eq!(repair_policy(RepairMode::Immediate, false), RepairPolicy::ReportOnly);
        assert_eq!(repair_policy(RepairMode::Deferred, false), RepairPolicy::Collect);
        assert_eq!(repair_policy(RepairMode::Deferred, true), RepairPolicy::Collect);
    }
}
