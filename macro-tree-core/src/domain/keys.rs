//! Attribute keys recognised on items.

pub const NAME: &str = "name";
pub const PARENT_ID: &str = "parent_id";
pub const NODE_TYPE: &str = "node_type";
pub const DEVICE: &str = "device";
pub const SUB_ACTION: &str = "sub_action";
pub const SUB_CONTENT: &str = "sub_content";
pub const KEY_STATE: &str = "key_state";
pub const EXPANDED: &str = "expanded";
/// Transient UI state, never persisted.
pub const SELECTED: &str = "selected";
pub const ICON: &str = "icon";

/// Keys `modify_item` refuses to rewrite.
pub const PROTECTED: [&str; 2] = ["id", PARENT_ID];
