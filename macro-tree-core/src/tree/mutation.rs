//! Tree Mutation Operations
//!
//! Every mutation checks its preconditions before touching the map, so a
//! rejected call leaves the tree unchanged. Events are published after the
//! change is applied.

use log::debug;
use serde_json::{Map, Value};

use super::macro_tree::MacroTree;
use crate::domain::{keys, Item, NodeType, TreeError, TreeResult};
use crate::events::{EventPayload, TreeEvent};

impl MacroTree {
    /// Insert `item` under `parent_id` (None = root), appended after its siblings
    pub fn add_item(&mut self, mut item: Item, parent_id: Option<&str>) -> TreeResult<()> {
        if self.items.contains_key(item.id()) {
            return Err(TreeError::IdCollision {
                id: item.id().to_string(),
            });
        }
        if let Some(pid) = parent_id {
            self.check_parent(pid)?;
        }

        item.set_parent(parent_id);
        let id = item.id().to_string();
        self.items.insert(id.clone(), item);
        debug!("Added item {} under {:?}", id, parent_id);

        self.events.publish(
            TreeEvent::ItemAdded,
            &EventPayload::for_item(&id).with_parent(parent_id),
        );
        Ok(())
    }

    /// Remove `id` and its whole subtree, descendants first
    pub fn remove_item(&mut self, id: &str) -> TreeResult<()> {
        if !self.items.contains_key(id) {
            return Err(TreeError::UnknownId { id: id.to_string() });
        }

        let doomed = self.post_order_ids(id);
        for removed_id in &doomed {
            let Some(removed) = self.items.shift_remove(removed_id.as_str()) else {
                continue;
            };
            if self.root_id.as_deref() == Some(removed_id.as_str()) {
                self.root_id = None;
            }
            self.events.publish(
                TreeEvent::ItemRemoved,
                &EventPayload::for_item(removed_id).with_parent(removed.parent_id()),
            );
        }
        debug!("Removed {} item(s) rooted at {}", doomed.len(), id);
        Ok(())
    }

    /// Reparent `id` under `new_parent_id` (None = root), appended after its new siblings
    pub fn move_item(&mut self, id: &str, new_parent_id: Option<&str>) -> TreeResult<()> {
        self.move_item_to(id, new_parent_id, None)
    }

    /// Reparent `id` and place it at sibling position `index` (None or past the end = last)
    ///
    /// Moving under the current parent reorders the item among its siblings.
    pub fn move_item_to(
        &mut self,
        id: &str,
        new_parent_id: Option<&str>,
        index: Option<usize>,
    ) -> TreeResult<()> {
        if !self.items.contains_key(id) {
            return Err(TreeError::UnknownId { id: id.to_string() });
        }
        if let Some(pid) = new_parent_id {
            if pid == id {
                return Err(TreeError::Cycle {
                    id: id.to_string(),
                    parent_id: pid.to_string(),
                });
            }
            self.check_parent(pid)?;
            if self.is_descendant(id, pid) {
                return Err(TreeError::Cycle {
                    id: id.to_string(),
                    parent_id: pid.to_string(),
                });
            }
        }

        let Some((key, mut item)) = self.items.shift_remove_entry(id) else {
            return Err(TreeError::UnknownId { id: id.to_string() });
        };
        let old_parent_id = item.parent_id().map(str::to_string);
        item.set_parent(new_parent_id);

        let sibling_slots: Vec<usize> = self
            .items
            .values()
            .enumerate()
            .filter(|(_, sibling)| sibling.parent_id() == new_parent_id)
            .map(|(slot, _)| slot)
            .collect();
        match index.and_then(|i| sibling_slots.get(i).copied()) {
            Some(slot) => {
                self.items.shift_insert(slot, key, item);
            }
            None => {
                self.items.insert(key, item);
            }
        }
        debug!(
            "Moved item {} from {:?} to {:?} (index {:?})",
            id, old_parent_id, new_parent_id, index
        );

        self.events.publish(
            TreeEvent::ItemMoved,
            &EventPayload::for_item(id)
                .with_parent(new_parent_id)
                .with_old_parent(old_parent_id.as_deref())
                .with_index(index),
        );
        Ok(())
    }

    /// Apply attribute changes. `id` and `parent_id` are ignored; use `move_item`.
    pub fn modify_item(&mut self, id: &str, changes: Map<String, Value>) -> TreeResult<()> {
        if !self.items.contains_key(id) {
            return Err(TreeError::UnknownId { id: id.to_string() });
        }

        let delta: Map<String, Value> = changes
            .into_iter()
            .filter(|(key, _)| {
                let protected = keys::PROTECTED.contains(&key.as_str());
                if protected {
                    debug!("Ignoring change to protected key {} on {}", key, id);
                }
                !protected
            })
            .collect();

        let demotes_to_instruction = delta
            .get(keys::NODE_TYPE)
            .and_then(Value::as_str)
            .is_some_and(|t| t == NodeType::Instruction.as_str());
        if demotes_to_instruction && self.has_children(id) {
            return Err(TreeError::ParentNotGroup { id: id.to_string() });
        }

        let Some(item) = self.items.get_mut(id) else {
            return Err(TreeError::UnknownId { id: id.to_string() });
        };
        for (key, value) in &delta {
            item.set(key, value.clone());
        }
        debug!("Modified item {} ({} key(s))", id, delta.len());

        self.events.publish(
            TreeEvent::ItemModified,
            &EventPayload::for_item(id).with_delta(delta),
        );
        Ok(())
    }

    /// Drop every item
    pub fn reset(&mut self) {
        self.items.clear();
        self.root_id = None;
        debug!("Reset tree {}", self.id);
        self.events
            .publish(TreeEvent::TreeReset, &EventPayload::default());
    }

    /// Take over another tree's id, name and items, keeping this tree's subscribers
    pub fn replace_with(&mut self, other: MacroTree) {
        self.id = other.id;
        self.name = other.name;
        self.root_id = other.root_id;
        self.items = other.items;
        debug!("Replaced contents of tree {} ({} item(s))", self.id, self.items.len());
        self.events
            .publish(TreeEvent::TreeReset, &EventPayload::default());
    }

    fn check_parent(&self, parent_id: &str) -> TreeResult<()> {
        match self.items.get(parent_id) {
            None => Err(TreeError::UnknownParent {
                id: parent_id.to_string(),
            }),
            Some(parent) if parent.is_instruction() => Err(TreeError::ParentNotGroup {
                id: parent_id.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Ids of `id`'s subtree, children before their parent
    fn post_order_ids(&self, id: &str) -> Vec<String> {
        fn collect<'a>(
            id: &'a str,
            children: &super::macro_tree::ChildrenMap<'a>,
            out: &mut Vec<String>,
        ) {
            if let Some(kids) = children.get(&Some(id)) {
                for kid in kids {
                    collect(kid.id(), children, out);
                }
            }
            out.push(id.to_string());
        }

        let children = self.children_map();
        let mut out = Vec::new();
        collect(id, &children, &mut out);
        out
    }
}
