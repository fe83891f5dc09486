use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::Path;

/// How mismatches get written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairMode {
    /// Each mismatch is fixed as soon as it is found (needs `--repair`).
    Immediate,
    /// Mismatches are collected and fixed together after one confirmation.
    Deferred,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_dir: String,
    pub database_path: String,
    pub ignore_patterns: Vec<String>,
    pub repair_mode: RepairMode,
}

/// Defaults, then `Config.toml` if present, then `SUMCHECK_*` variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    build(ConfigFile::with_name("Config").required(false))
}

/// Like [`load_configuration`] but reads the given file, which must exist.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    build(ConfigFile::from(path).required(true))
}

fn build(file: ConfigFile<config::FileSourceFile, config::FileFormat>) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("data_dir", "./data")?
        .set_default("database_path", "./sumcheck.db")?
        .set_default("ignore_patterns", Vec::<String>::new())?
        .set_default("repair_mode", "immediate")?
        .add_source(file)
        .add_source(
            Environment::with_prefix("SUMCHECK")
                .list_separator(",")
                .with_list_parse_key("ignore_patterns")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_apply_to_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "").unwrap();

        let config = load_configuration_from(&path).unwrap();
        assert_eq!(config.data_dir, "./data");
        assert_eq!(config.database_path, "./sumcheck.db");
        assert!(config.ignore_patterns.is_empty());
        assert_eq!(config.repair_mode, RepairMode::Immediate);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
data_dir = "/srv/cloud/data"
ignore_patterns = ["**/.DS_Store", "**/*.part"]
repair_mode = "deferred"
"#,
        )
        .unwrap();

        let config = load_configuration_from(&path).unwrap();
        assert_eq!(config.data_dir, "/srv/cloud/data");
        assert_eq!(config.ignore_patterns.len(), 2);
        assert_eq!(config.repair_mode, RepairMode::Deferred);
    }

    #[test]
    fn test_unknown_repair_mode_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "repair_mode = \"sometimes\"\n").unwrap();

        assert!(load_configuration_from(&path).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_configuration_from(&dir.path().join("nope.toml")).is_err());
    }
}
