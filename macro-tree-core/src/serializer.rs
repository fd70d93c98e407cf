//! Tree <-> JSON Document
//!
//! Document shape:
//! `{ "id", "name", "root_id", "items": { "<id>": { "id", ...attributes } } }`
//!
//! Items are written in pre-order so children order survives a round-trip.
//! Reading rebuilds every item first and wires parents in a second pass, so
//! any declaration order is accepted.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::domain::{keys, Item, TreeError, TreeResult};
use crate::tree::MacroTree;

/// Raw item attributes keyed by item id
pub type ItemRecords = IndexMap<String, Map<String, JsonValue>>;

/// Serializable form of a tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub root_id: Option<String>,
    #[serde(deserialize_with = "unique_items")]
    pub items: ItemRecords,
}

/// Rejects a repeated item id instead of letting the last one win
fn unique_items<'de, D>(deserializer: D) -> Result<ItemRecords, D::Error>
where
    D: Deserializer<'de>,
{
    struct ItemsVisitor;

    impl<'de> Visitor<'de> for ItemsVisitor {
        type Value = ItemRecords;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of item id to item object")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut items = ItemRecords::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((id, record)) = access.next_entry::<String, Map<String, JsonValue>>()? {
                if items.contains_key(&id) {
                    return Err(de::Error::custom(format!("duplicate item id `{id}`")));
                }
                items.insert(id, record);
            }
            Ok(items)
        }
    }

    deserializer.deserialize_map(ItemsVisitor)
}

/// Snapshot a tree into its document form. `selected` is not persisted.
pub fn to_document(tree: &MacroTree) -> TreeDocument {
    let children = tree.children_map();
    let mut items = ItemRecords::with_capacity(tree.len());

    fn visit<'a>(
        item: &'a Item,
        children: &crate::tree::ChildrenMap<'a>,
        items: &mut ItemRecords,
    ) {
        let mut record = Map::new();
        record.insert("id".to_string(), JsonValue::String(item.id().to_string()));
        for (key, value) in item.attributes() {
            if key != keys::SELECTED {
                record.insert(key.clone(), value.clone());
            }
        }
        items.insert(item.id().to_string(), record);

        if let Some(kids) = children.get(&Some(item.id())) {
            for kid in kids {
                visit(kid, children, items);
            }
        }
    }

    if let Some(roots) = children.get(&None) {
        for root in roots {
            visit(root, &children, &mut items);
        }
    }

    TreeDocument {
        id: tree.id().to_string(),
        name: tree.name().to_string(),
        root_id: tree.root_id().map(str::to_string),
        items,
    }
}

/// Rebuild a tree. Fails on the first structural problem; never returns a partial tree.
pub fn from_document(doc: TreeDocument) -> TreeResult<MacroTree> {
    let tree_id = if doc.id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        doc.id
    };
    let mut tree = MacroTree::with_id(tree_id, doc.name);

    // Pass 1: items without parents
    let mut parents: Vec<(String, Option<String>)> = Vec::with_capacity(doc.items.len());
    for (id, record) in doc.items {
        let mut attributes = flatten_legacy(record);

        match attributes.remove("id") {
            None => {}
            Some(JsonValue::String(embedded)) if embedded == id => {}
            Some(other) => {
                return Err(TreeError::invalid_document(format!(
                    "item key `{id}` does not match embedded id {other}"
                )));
            }
        }

        let parent_id = match attributes.remove(keys::PARENT_ID) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(pid)) => Some(pid),
            Some(other) => {
                return Err(TreeError::invalid_document(format!(
                    "item `{id}` has non-string parent_id {other}"
                )));
            }
        };
        attributes.remove(keys::SELECTED);

        let mut item = Item::from_attributes(id.clone(), attributes);
        item.set_parent(None);
        tree.insert_unchecked(item);
        parents.push((id, parent_id));
    }

    // Pass 2: wire parents
    for (id, parent_id) in parents {
        let Some(parent_id) = parent_id else {
            continue;
        };
        if !tree.contains(&parent_id) {
            return Err(TreeError::invalid_document(format!(
                "item `{id}` references missing parent `{parent_id}`"
            )));
        }
        tree.set_parent_unchecked(&id, Some(&parent_id));
    }

    tree.set_root_unchecked(doc.root_id);
    tree.validate()?;
    debug!("Rebuilt tree {} with {} item(s)", tree.id(), tree.len());
    Ok(tree)
}

/// `{ "id": .., "data": { .. } }` records from older documents. Current
/// records always carry `parent_id` at the top level, so a `data` attribute
/// next to it is left alone.
fn flatten_legacy(mut record: Map<String, JsonValue>) -> Map<String, JsonValue> {
    let is_legacy = record.keys().all(|k| k == "id" || k == "data")
        && matches!(record.get("data"), Some(JsonValue::Object(_)));
    if !is_legacy {
        return record;
    }
    let Some(JsonValue::Object(mut data)) = record.remove("data") else {
        return record;
    };
    if let Some(id) = record.remove("id") {
        data.entry("id").or_insert(id);
    }
    data
}

/// Pretty-printed JSON; non-ASCII text is written as-is
pub fn to_json(tree: &MacroTree) -> TreeResult<String> {
    serde_json::to_string_pretty(&to_document(tree))
        .map_err(|e| TreeError::invalid_document(e.to_string()))
}

pub fn from_json(json: &str) -> TreeResult<MacroTree> {
    let doc: TreeDocument =
        serde_json::from_str(json).map_err(|e| TreeError::invalid_document(e.to_string()))?;
    from_document(doc)
}

/// Replace `path` with `contents` via a temp file in the same directory
pub(crate) fn write_atomic(path: &Path, contents: &str) -> TreeResult<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| TreeError::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| TreeError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| TreeError::io(path, e.error))?;
    Ok(())
}

pub fn save_to_file(tree: &MacroTree, path: impl AsRef<Path>) -> TreeResult<()> {
    let path = path.as_ref();
    write_atomic(path, &to_json(tree)?)?;
    info!("Saved tree {} to {}", tree.id(), path.display());
    Ok(())
}

pub fn load_from_file(path: impl AsRef<Path>) -> TreeResult<MacroTree> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| TreeError::io(path, e))?;
    let tree = from_json(&json)?;
    info!("Loaded tree {} from {}", tree.id(), path.display());
    Ok(tree)
}
