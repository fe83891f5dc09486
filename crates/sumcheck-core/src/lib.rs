pub mod backend;
pub mod checksum;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod indexer;
pub mod model;
pub mod progress;
pub mod scanner;
pub mod storage;
pub mod users;

pub use checksum::{ChecksumRecord, HashAlgorithm};
pub use config::{AppConfig, RepairMode};
pub use engine::{Engine, IndexOutcome, VerifyOutcome};
pub use error::Error;
pub use model::{FileNode, NodeKind};
pub use progress::{IndexReporter, ScanReporter, SilentReporter};
pub use scanner::{Mismatch, RepairPolicy, ScanStats, Scanner, Scope, ScopeSelector};
