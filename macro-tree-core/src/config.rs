//! Configuration record supplied by the host.
//!
//! Nothing here is global: the host builds a `MacroTreeConfig` (usually by
//! parsing JSON) and hands it to the view-model and the logger.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{NodeType, TreeError, TreeResult};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MacroTreeConfig {
    /// Directory of the tree repository.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Node type given to items created by `add_item`.
    #[serde(default)]
    pub default_node_type: NodeType,

    /// Expand a group when an item is added under it.
    #[serde(default = "default_true")]
    pub auto_expand_parent: bool,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for MacroTreeConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            default_node_type: NodeType::default(),
            auto_expand_parent: true,
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Log file stem: `<dir>/<app_name>.log`
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Size at which the log is rotated on start-up.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Rotated files kept besides the live one.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Lines kept in memory for `recent_lines`.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            app_name: default_app_name(),
            max_file_bytes: default_max_file_bytes(),
            max_files: default_max_files(),
            buffer_capacity: default_buffer_capacity(),
            level: default_level(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./trees")
}
fn default_true() -> bool {
    true
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}
fn default_app_name() -> String {
    "MacroTree".into()
}
fn default_max_file_bytes() -> u64 {
    1024 * 1024
}
fn default_max_files() -> usize {
    3
}
fn default_buffer_capacity() -> usize {
    200
}
fn default_level() -> String {
    "info".into()
}

impl MacroTreeConfig {
    pub fn from_json_str(json: &str) -> TreeResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TreeError::invalid_document(format!("config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> TreeResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| TreeError::io(path, e))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = MacroTreeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MacroTreeConfig::default());
        assert_eq!(config.default_node_type, NodeType::Instruction);
        assert_eq!(config.log.max_file_bytes, 1_048_576);
        assert_eq!(config.log.app_name, "MacroTree");
    }

    #[test]
    fn test_partial_override() {
        let config = MacroTreeConfig::from_json_str(
            r#"{"default_node_type": "group", "log": {"level": "debug", "max_files": 5}}"#,
        )
        .unwrap();
        assert_eq!(config.default_node_type, NodeType::Group);
        assert!(config.auto_expand_parent);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.max_files, 5);
        assert_eq!(config.log.buffer_capacity, 200);
    }

    #[test]
    fn test_bad_node_type_rejected() {
        let err = MacroTreeConfig::from_json_str(r#"{"default_node_type": "folder"}"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidDocument);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"storage_dir": "/tmp/macros"}"#).unwrap();

        let config = MacroTreeConfig::from_file(&path).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/macros"));

        let missing = MacroTreeConfig::from_file(dir.path().join("none.json")).unwrap_err();
        assert_eq!(missing.code(), ErrorCode::IoError);
    }
}
