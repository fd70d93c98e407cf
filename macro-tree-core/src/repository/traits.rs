//! Repository Layer - Core Traits
//!
//! Defines the abstract interface for tree document storage.
//! Implementations can use a directory of JSON files, memory, etc.

use std::collections::BTreeMap;

use crate::domain::TreeResult;
use crate::serializer::TreeDocument;

/// Persistent store of tree documents addressed by id
pub trait TreeRepository {
    /// Store `doc` under `id`, or under a fresh id when None. Overwrites.
    /// Returns the id the document was stored under.
    fn save(&self, doc: &TreeDocument, id: Option<&str>) -> TreeResult<String>;

    /// `Ok(None)` if nothing is stored under `id`
    fn load(&self, id: &str) -> TreeResult<Option<TreeDocument>>;

    /// `Ok(false)` if nothing was stored under `id`
    fn delete(&self, id: &str) -> TreeResult<bool>;

    /// Stored id -> display name
    fn list(&self) -> TreeResult<BTreeMap<String, String>>;
}
