//! File Repository
//!
//! One `<uuid>.json` file per tree inside a single directory.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{error, info, warn};
use serde::Deserialize;
use uuid::Uuid;

use super::traits::TreeRepository;
use crate::domain::{TreeError, TreeResult};
use crate::serializer::{write_atomic, TreeDocument};

const EXTENSION: &str = "json";

/// Listing entry with the file's modification time
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSummary {
    pub id: String,
    pub name: String,
    pub modified: Option<DateTime<Local>>,
}

/// Only the top-level name is needed for listings
#[derive(Deserialize)]
struct DocumentHeader {
    #[serde(default)]
    name: Option<String>,
}

pub struct FileTreeRepository {
    dir: PathBuf,
}

impl FileTreeRepository {
    /// Open a repository rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> TreeResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            error!("Failed to create repository dir {}: {}", dir.display(), e);
            TreeError::io(&dir, e)
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical lowercase hyphenated form; anything else is rejected
    pub fn normalize_id(id: &str) -> TreeResult<String> {
        Uuid::parse_str(id.trim())
            .map(|uuid| uuid.hyphenated().to_string())
            .map_err(|_| TreeError::InvalidId { id: id.to_string() })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    /// Display name from the file, or `Tree <id>` when it cannot be read
    fn display_name(&self, id: &str, path: &Path) -> String {
        let header = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                serde_json::from_str::<DocumentHeader>(&json).map_err(|e| e.to_string())
            });
        match header {
            Ok(DocumentHeader { name: Some(name) }) if !name.is_empty() => name,
            Ok(_) => format!("Tree {id}"),
            Err(e) => {
                warn!("Unreadable metadata in {}: {}", path.display(), e);
                format!("Tree {id}")
            }
        }
    }

    /// Stored ids paired with their file paths, in directory order
    fn stored(&self) -> TreeResult<Vec<(String, PathBuf)>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| TreeError::io(&self.dir, e))?;
        let mut stored = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TreeError::io(&self.dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match Self::normalize_id(stem) {
                Ok(id) if id == stem => stored.push((id, path)),
                _ => continue,
            }
        }
        Ok(stored)
    }

    /// Listing with modification times, newest first
    pub fn list_summaries(&self) -> TreeResult<Vec<TreeSummary>> {
        let mut summaries: Vec<TreeSummary> = self
            .stored()?
            .into_iter()
            .map(|(id, path)| {
                let modified = fs::metadata(&path)
                    .and_then(|meta| meta.modified())
                    .ok()
                    .map(DateTime::<Local>::from);
                TreeSummary {
                    name: self.display_name(&id, &path),
                    id,
                    modified,
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }
}

impl TreeRepository for FileTreeRepository {
    fn save(&self, doc: &TreeDocument, id: Option<&str>) -> TreeResult<String> {
        let id = match id {
            Some(id) => Self::normalize_id(id)?,
            None => Uuid::new_v4().to_string(),
        };

        let mut stored = doc.clone();
        stored.id = id.clone();
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| TreeError::invalid_document(e.to_string()))?;

        let path = self.path_for(&id);
        write_atomic(&path, &json).inspect_err(|e| {
            error!("Failed to save tree {}: {}", id, e);
        })?;
        info!("Saved tree {} ({} item(s))", id, stored.items.len());
        Ok(id)
    }

    fn load(&self, id: &str) -> TreeResult<Option<TreeDocument>> {
        let id = Self::normalize_id(id)?;
        let path = self.path_for(&id);

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                return Err(TreeError::io(&path, e));
            }
        };

        let doc: TreeDocument = serde_json::from_str(&json).map_err(|e| {
            warn!("Malformed tree file {}: {}", path.display(), e);
            TreeError::invalid_document(format!("{}: {}", path.display(), e))
        })?;
        info!("Loaded tree {}", id);
        Ok(Some(doc))
    }

    fn delete(&self, id: &str) -> TreeResult<bool> {
        let id = Self::normalize_id(id)?;
        let path = self.path_for(&id);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted tree {}", id);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => {
                error!("Failed to delete {}: {}", path.display(), e);
                Err(TreeError::io(&path, e))
            }
        }
    }

    fn list(&self) -> TreeResult<BTreeMap<String, String>> {
        Ok(self
            .stored()?
            .into_iter()
            .map(|(id, path)| {
                let name = self.display_name(&id, &path);
                (id, name)
            })
            .collect())
    }
}
