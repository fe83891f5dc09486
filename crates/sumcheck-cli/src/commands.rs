use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sumcheck")]
#[command(about = "Verify and repair recorded file checksums", long_about = None)]
pub struct Cli {
    /// More output; repeat for trace level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file to use instead of ./Config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured data directory
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Override the configured filecache database
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Recompute checksums and compare them with the filecache
    Verify(VerifyArgs),
    /// Sync the filecache with the data directory
    Index(IndexArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Only check this path, e.g. /alice/files/docs (repeatable)
    #[arg(short, long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// Only check this user's files (repeatable)
    #[arg(short, long = "user", value_name = "USER")]
    pub users: Vec<String>,

    /// Write the computed checksum for every mismatch
    #[arg(short, long)]
    pub repair: bool,

    /// Collect mismatches and repair them together at the end
    #[arg(long)]
    pub deferred: bool,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Only index this user (repeatable)
    #[arg(short, long = "user", value_name = "USER")]
    pub users: Vec<String>,

    /// Compute checksums for files that have none
    #[arg(long)]
    pub with_checksums: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verify_accepts_repeated_scopes() {
        let cli = Cli::try_parse_from([
            "sumcheck", "verify", "-p", "/alice/files/a", "--path", "/bob/files", "-r",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Verify(args)) => {
                assert_eq!(args.paths, vec!["/alice/files/a", "/bob/files"]);
                assert!(args.users.is_empty());
                assert!(args.repair);
                assert!(!args.deferred);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_path_and_user_both_parse() {
        // Rejected by the scanner with a configuration error, not by clap.
        let cli =
            Cli::try_parse_from(["sumcheck", "verify", "-p", "/alice/files", "-u", "alice"]).unwrap();
        match cli.command {
            Some(Commands::Verify(args)) => {
                assert_eq!(args.paths.len(), 1);
                assert_eq!(args.users.len(), 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_verbosity() {
        let cli = Cli::try_parse_from(["sumcheck", "verify", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(Cli::try_parse_from(["sumcheck", "-v", "-q", "verify"]).is_err());
    }
}
