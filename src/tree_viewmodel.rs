//! Tree View Model
//!
//! Command surface for the tree view. Operations return `bool` (or an
//! `Option` for `add_item`); the failure behind the last `false` is kept in
//! `last_error()` until the next operation succeeds.

use std::path::Path;

use log::{debug, warn};
use serde_json::{Map, Value};
use uuid::Uuid;

use macro_tree_core::serializer::{self, from_document, to_document};
use macro_tree_core::{
    keys, Device, ErrorReport, EventBus, EventPayload, Item, MacroTree, MacroTreeConfig, NodeType,
    SubscriptionId, TreeError, TreeEvent, TreeObserver, TreeRepository, TreeResult, ViewEvent,
};

use crate::item_viewmodel::ItemViewModel;
use crate::models::VisibleRow;
use crate::store::SelectionStore;
use crate::tree::flatten_visible;

#[derive(Debug)]
pub struct TreeViewModel {
    tree: MacroTree,
    selection: SelectionStore,
    view_events: EventBus<ViewEvent, EventPayload>,
    default_node_type: NodeType,
    auto_expand_parent: bool,
    last_error: Option<TreeError>,
}

impl Default for TreeViewModel {
    fn default() -> Self {
        Self::new(MacroTree::default())
    }
}

impl TreeViewModel {
    pub fn new(tree: MacroTree) -> Self {
        Self::with_config(tree, &MacroTreeConfig::default())
    }

    pub fn with_config(tree: MacroTree, config: &MacroTreeConfig) -> Self {
        Self {
            tree,
            selection: SelectionStore::default(),
            view_events: EventBus::new(),
            default_node_type: config.default_node_type,
            auto_expand_parent: config.auto_expand_parent,
            last_error: None,
        }
    }

    pub fn tree(&self) -> &MacroTree {
        &self.tree
    }

    /// Failure behind the most recent `false`/`None`
    pub fn last_error(&self) -> Option<&TreeError> {
        self.last_error.as_ref()
    }

    pub fn last_error_report(&self) -> Option<ErrorReport> {
        self.last_error.as_ref().map(TreeError::report)
    }

    fn track<T>(&mut self, result: TreeResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(e) => {
                warn!("Rejected: {}", e);
                self.last_error = Some(e);
                None
            }
        }
    }

    fn succeeded(&mut self, result: TreeResult<()>) -> bool {
        self.track(result).is_some()
    }

    // ========================
    // Structure
    // ========================

    /// Create an item of the configured default type. Returns the new id.
    pub fn add_item(&mut self, name: &str, parent_id: Option<&str>) -> Option<String> {
        self.add_item_of_type(name, parent_id, self.default_node_type)
    }

    pub fn add_item_of_type(
        &mut self,
        name: &str,
        parent_id: Option<&str>,
        node_type: NodeType,
    ) -> Option<String> {
        let item = match node_type {
            NodeType::Group => Item::group(name),
            NodeType::Instruction => Item::instruction(name, Device::Mouse),
        };
        let id = item.id().to_string();
        let added = self.tree.add_item(item, parent_id);
        self.track(added)?;

        if let Some(parent_id) = parent_id {
            if self.auto_expand_parent {
                self.set_expanded(parent_id, true);
            }
        }
        Some(id)
    }

    /// Remove `id` with its subtree; removed items leave the selection
    pub fn delete_item(&mut self, id: &str) -> bool {
        let removed = self.tree.remove_item(id);
        if !self.succeeded(removed) {
            return false;
        }
        let tree = &self.tree;
        let dropped = self.selection.retain(|selected| tree.contains(selected));
        self.publish_each(ViewEvent::ItemDeselected, dropped);
        true
    }

    /// Rename and/or reparent. `None` leaves that field alone.
    pub fn update_item(&mut self, id: &str, name: Option<&str>, parent_id: Option<&str>) -> bool {
        if !self.tree.contains(id) {
            return self.succeeded(Err(TreeError::UnknownId { id: id.to_string() }));
        }
        if let Some(parent_id) = parent_id {
            if !self.move_item(id, Some(parent_id)) {
                return false;
            }
        }
        match name {
            Some(name) => self.rename_item(id, name),
            None => self.succeeded(Ok(())),
        }
    }

    pub fn rename_item(&mut self, id: &str, name: &str) -> bool {
        let mut changes = Map::new();
        changes.insert(keys::NAME.to_string(), Value::from(name));
        let renamed = self.tree.modify_item(id, changes);
        self.succeeded(renamed)
    }

    /// Reparent; `None` moves the item to the top level
    pub fn move_item(&mut self, id: &str, new_parent_id: Option<&str>) -> bool {
        self.move_item_to(id, new_parent_id, None)
    }

    pub fn move_item_to(
        &mut self,
        id: &str,
        new_parent_id: Option<&str>,
        index: Option<usize>,
    ) -> bool {
        let moved = self.tree.move_item_to(id, new_parent_id, index);
        self.succeeded(moved)
    }

    /// Drop every item and the selection
    pub fn reset(&mut self) {
        self.tree.reset();
        self.clear_selection();
        self.last_error = None;
    }

    // ========================
    // Selection
    // ========================

    pub fn select_item(&mut self, id: &str, multi: bool) -> bool {
        if !self.tree.contains(id) {
            return self.succeeded(Err(TreeError::UnknownId { id: id.to_string() }));
        }
        let dropped = self.selection.select(id, multi);
        self.publish_each(ViewEvent::ItemDeselected, dropped);
        self.view_events
            .publish(ViewEvent::ItemSelected, &EventPayload::for_item(id));
        self.succeeded(Ok(()))
    }

    pub fn deselect_item(&mut self, id: &str) -> bool {
        if !self.selection.deselect(id) {
            return false;
        }
        self.view_events
            .publish(ViewEvent::ItemDeselected, &EventPayload::for_item(id));
        true
    }

    pub fn clear_selection(&mut self) {
        let dropped = self.selection.clear();
        self.publish_each(ViewEvent::ItemDeselected, dropped);
    }

    /// Selected ids in selection order
    pub fn get_selected(&self) -> Vec<String> {
        self.selection.ids()
    }

    // ========================
    // Expansion
    // ========================

    /// Set `expanded` to `value`, or flip it when `value` is None
    pub fn toggle_expanded(&mut self, id: &str, value: Option<bool>) -> bool {
        let Some(item) = self.tree.get_item(id) else {
            return self.succeeded(Err(TreeError::UnknownId { id: id.to_string() }));
        };
        let target = value.unwrap_or(!item.is_expanded());
        self.set_expanded(id, target)
    }

    fn set_expanded(&mut self, id: &str, expanded: bool) -> bool {
        let current = self.tree.get_item(id).map(Item::is_expanded);
        if current == Some(expanded) {
            return self.succeeded(Ok(()));
        }
        let mut changes = Map::new();
        changes.insert(keys::EXPANDED.to_string(), Value::Bool(expanded));
        let modified = self.tree.modify_item(id, changes);
        if !self.succeeded(modified) {
            return false;
        }
        let event = if expanded {
            ViewEvent::ItemExpanded
        } else {
            ViewEvent::ItemCollapsed
        };
        self.view_events.publish(event, &EventPayload::for_item(id));
        true
    }

    pub fn expand_all(&mut self) {
        self.set_all_expanded(true);
    }

    pub fn collapse_all(&mut self) {
        self.set_all_expanded(false);
    }

    fn set_all_expanded(&mut self, expanded: bool) {
        let ids: Vec<String> = self
            .tree
            .get_all_items()
            .into_values()
            .filter(|item| item.is_group() || self.tree.has_children(item.id()))
            .map(|item| item.id().to_string())
            .collect();
        for id in ids {
            self.set_expanded(&id, expanded);
        }
    }

    // ========================
    // Projection
    // ========================

    pub fn get_visible_items(&self) -> Vec<VisibleRow> {
        flatten_visible(&self.tree, &self.selection)
    }

    pub fn item_view(&self, id: &str) -> Option<ItemViewModel> {
        self.tree.get_item(id).cloned().map(ItemViewModel::new)
    }

    /// Apply an edited item view to the tree
    pub fn commit_item(&mut self, view: &ItemViewModel) -> bool {
        let changes = view.changes();
        if changes.is_empty() {
            return self.succeeded(Ok(()));
        }
        let committed = self.tree.modify_item(view.id(), changes);
        self.succeeded(committed)
    }

    // ========================
    // Persistence
    // ========================

    pub fn save_tree(&mut self, path: impl AsRef<Path>) -> bool {
        let saved = serializer::save_to_file(&self.tree, path);
        self.succeeded(saved)
    }

    /// Replace the tree with the file's contents; the selection is cleared
    pub fn load_tree(&mut self, path: impl AsRef<Path>) -> bool {
        match self.track(serializer::load_from_file(path)) {
            Some(loaded) => {
                self.install(loaded);
                true
            }
            None => false,
        }
    }

    /// Store the tree under its own id when that id is a UUID. Otherwise the
    /// tree adopts the id the repository assigns, so later saves overwrite
    /// the same entry. Returns the storage id.
    pub fn save_to_repository(&mut self, repo: &impl TreeRepository) -> Option<String> {
        let id = Uuid::parse_str(self.tree.id()).ok().map(|uuid| uuid.to_string());
        let doc = to_document(&self.tree);
        let stored = self.track(repo.save(&doc, id.as_deref()))?;
        if stored != self.tree.id() {
            debug!("Tree {} re-keyed to storage id {}", self.tree.id(), stored);
            self.tree.set_id(stored.as_str());
        }
        Some(stored)
    }

    pub fn load_from_repository(&mut self, repo: &impl TreeRepository, id: &str) -> bool {
        let loaded = repo.load(id).and_then(|doc| match doc {
            Some(doc) => from_document(doc),
            None => Err(TreeError::UnknownId { id: id.to_string() }),
        });
        match self.track(loaded) {
            Some(tree) => {
                self.install(tree);
                true
            }
            None => false,
        }
    }

    fn install(&mut self, loaded: MacroTree) {
        self.clear_selection();
        self.tree.replace_with(loaded);
    }

    // ========================
    // Observers
    // ========================

    pub fn subscribe_tree(
        &mut self,
        event: TreeEvent,
        observer: impl TreeObserver<TreeEvent, EventPayload> + 'static,
    ) -> SubscriptionId {
        self.tree.subscribe(event, observer)
    }

    pub fn unsubscribe_tree(&mut self, event: TreeEvent, id: SubscriptionId) -> bool {
        self.tree.unsubscribe(event, id)
    }

    pub fn subscribe_view(
        &mut self,
        event: ViewEvent,
        observer: impl TreeObserver<ViewEvent, EventPayload> + 'static,
    ) -> SubscriptionId {
        self.view_events.subscribe(event, observer)
    }

    pub fn unsubscribe_view(&mut self, event: ViewEvent, id: SubscriptionId) -> bool {
        self.view_events.unsubscribe(event, id)
    }

    fn publish_each(&mut self, event: ViewEvent, ids: Vec<String>) {
        for id in ids {
            self.view_events.publish(event, &EventPayload::for_item(&id));
        }
    }
}
