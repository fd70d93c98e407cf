//! Tree Utilities
//!
//! Helper functions for tree rendering.

use macro_tree_core::{ChildrenMap, MacroTree};

use crate::models::VisibleRow;
use crate::store::SelectionStore;

/// Rows in display order using recursive DFS
///
/// Descent stops at any collapsed node; the node itself is still emitted.
pub fn flatten_visible(tree: &MacroTree, selection: &SelectionStore) -> Vec<VisibleRow> {
    fn collect<'a>(
        parent_id: Option<&'a str>,
        level: usize,
        children_map: &ChildrenMap<'a>,
        selection: &SelectionStore,
        result: &mut Vec<VisibleRow>,
    ) {
        let Some(children) = children_map.get(&parent_id) else {
            return;
        };
        for item in children {
            let has_children = children_map.contains_key(&Some(item.id()));
            result.push(VisibleRow::from_item(
                item,
                level,
                has_children,
                selection.contains(item.id()),
            ));
            if item.is_expanded() {
                collect(Some(item.id()), level + 1, children_map, selection, result);
            }
        }
    }

    let children_map = tree.children_map();
    let mut result = Vec::new();
    collect(None, 0, &children_map, selection, &mut result);
    result
}
