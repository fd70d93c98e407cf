//! View Models
//!
//! Flat records handed to the row UI.

use serde::{Deserialize, Serialize};

use macro_tree_core::Item;

/// One visible row of the tree view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleRow {
    pub id: String,
    pub name: String,
    pub level: usize,
    pub expanded: bool,
    pub has_children: bool,
    pub selected: bool,
    pub device: Option<String>,
    pub sub_action: Option<String>,
    pub sub_content: String,
    pub node_type: Option<String>,
}

impl VisibleRow {
    pub fn from_item(item: &Item, level: usize, has_children: bool, selected: bool) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            level,
            expanded: item.is_expanded(),
            has_children,
            selected,
            device: item.device().map(|d| d.as_str().to_string()),
            sub_action: item.sub_action().map(|a| a.as_str().to_string()),
            sub_content: item.sub_content().to_string(),
            node_type: item.node_type().map(|t| t.as_str().to_string()),
        }
    }
}
