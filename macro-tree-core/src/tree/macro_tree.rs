//! Macro Tree - Core State and Read Operations
//!
//! Owns the items keyed by id. Specialized operations are in separate modules:
//! - mutation: add, remove, move, modify, reset
//! - traversal: BFS iteration, descendants, ancestors

use std::collections::HashMap;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::domain::{Item, TreeError, TreeResult};
use crate::events::{EventBus, EventPayload, SubscriptionId, TreeEvent, TreeObserver};

/// Parent id (None = root level) -> children in sibling order
pub type ChildrenMap<'a> = HashMap<Option<&'a str>, Vec<&'a Item>>;

/// The macro document: items keyed by id plus the parent/child relation
///
/// The relation is stored only as `parent_id` on each child. Sibling order is
/// the order of the items in the map.
#[derive(Debug)]
pub struct MacroTree {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) root_id: Option<String>,
    pub(super) items: IndexMap<String, Item>,
    pub(super) events: EventBus<TreeEvent, EventPayload>,
}

impl Default for MacroTree {
    fn default() -> Self {
        Self::new("")
    }
}

impl MacroTree {
    /// Create an empty tree with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            root_id: None,
            items: IndexMap::new(),
            events: EventBus::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Re-key the tree, e.g. after a repository assigned its storage id
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root_id.as_deref()
    }

    /// Designate a root item. Roots are still every item without a parent;
    /// the designation is document metadata.
    pub fn set_root_id(&mut self, root_id: Option<&str>) -> TreeResult<()> {
        if let Some(id) = root_id {
            if !self.items.contains_key(id) {
                return Err(TreeError::UnknownId { id: id.to_string() });
            }
        }
        self.root_id = root_id.map(str::to_string);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn get_item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Owned copy of every item in insertion order
    pub fn get_all_items(&self) -> IndexMap<String, Item> {
        self.items.clone()
    }

    /// Children of `parent_id` (None = roots) in sibling order
    pub fn get_children(&self, parent_id: Option<&str>) -> Vec<&Item> {
        self.items
            .values()
            .filter(|item| item.parent_id() == parent_id)
            .collect()
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.items
            .values()
            .any(|item| item.parent_id() == Some(id))
    }

    pub fn roots(&self) -> Vec<&Item> {
        self.get_children(None)
    }

    /// Parent -> children index built in one pass over the items
    pub fn children_map(&self) -> ChildrenMap<'_> {
        let mut map: ChildrenMap<'_> = HashMap::new();
        for item in self.items.values() {
            map.entry(item.parent_id()).or_default().push(item);
        }
        map
    }

    /// Copy with the same id, name and items but no subscribers
    pub fn detached_clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            root_id: self.root_id.clone(),
            items: self.items.clone(),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(
        &mut self,
        event: TreeEvent,
        observer: impl TreeObserver<TreeEvent, EventPayload> + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(event, observer)
    }

    pub fn unsubscribe(&mut self, event: TreeEvent, id: SubscriptionId) -> bool {
        self.events.unsubscribe(event, id)
    }

    /// Re-check the structural invariants: every parent exists and is not an
    /// instruction, the parent relation is acyclic, the designated root exists.
    pub fn validate(&self) -> TreeResult<()> {
        for item in self.items.values() {
            let Some(parent_id) = item.parent_id() else {
                continue;
            };
            let Some(parent) = self.items.get(parent_id) else {
                return Err(TreeError::invalid_document(format!(
                    "item `{}` references missing parent `{}`",
                    item.id(),
                    parent_id
                )));
            };
            if parent.is_instruction() {
                return Err(TreeError::invalid_document(format!(
                    "item `{}` is a child of instruction `{}`",
                    item.id(),
                    parent_id
                )));
            }
        }

        for item in self.items.values() {
            let mut steps = 0;
            let mut cursor = item.parent_id();
            while let Some(current) = cursor {
                steps += 1;
                if current == item.id() || steps > self.items.len() {
                    return Err(TreeError::invalid_document(format!(
                        "item `{}` is its own ancestor",
                        item.id()
                    )));
                }
                cursor = self.items.get(current).and_then(Item::parent_id);
            }
        }

        if let Some(root_id) = self.root_id.as_deref() {
            if !self.items.contains_key(root_id) {
                return Err(TreeError::invalid_document(format!(
                    "root_id `{root_id}` is not an item"
                )));
            }
        }
        Ok(())
    }

    /// Bypasses parent checks; callers must `validate()` afterwards.
    pub(crate) fn insert_unchecked(&mut self, item: Item) {
        self.items.insert(item.id().to_string(), item);
    }

    pub(crate) fn set_parent_unchecked(&mut self, id: &str, parent_id: Option<&str>) {
        if let Some(item) = self.items.get_mut(id) {
            item.set_parent(parent_id);
        }
    }

    pub(crate) fn set_root_unchecked(&mut self, root_id: Option<String>) {
        self.root_id = root_id;
    }
}
