//! Item Entity
//!
//! A single node of the macro tree: a stable id plus a heterogeneous
//! attribute bag. Typed accessors read the recognised keys; unknown keys are
//! carried untouched so documents round-trip losslessly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::keys;
use super::kinds::{Device, KeyState, NodeType, SubAction};
use super::point::Point;

/// A node of the macro tree
///
/// `parent_id` lives in the attribute bag; it is written only by the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: String,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Item {
    /// Create an item with no attributes
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Create an item with a fresh random id
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn from_attributes(id: impl Into<String>, mut attributes: Map<String, Value>) -> Self {
        attributes.remove("id");
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// A collapsed group with a generated id
    pub fn group(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::generate()
            .with(keys::NAME, name)
            .with(keys::NODE_TYPE, NodeType::Group.as_str())
            .with(keys::EXPANDED, false)
    }

    /// An instruction bound to `device` with its default sub-action
    pub fn instruction(name: impl Into<String>, device: Device) -> Self {
        let name: String = name.into();
        let mut item = Self::generate()
            .with(keys::NAME, name)
            .with(keys::NODE_TYPE, NodeType::Instruction.as_str())
            .with(keys::DEVICE, device.as_str())
            .with(keys::SUB_CONTENT, "")
            .with(keys::EXPANDED, false);
        if let Some(action) = device.default_sub_action() {
            item.set(keys::SUB_ACTION, action.as_str());
        }
        item
    }

    /// Builder-style `set`
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Attribute read with a fallback
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.attributes.get(key).cloned().unwrap_or(default)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.attributes.get(key).and_then(Value::as_bool)
    }

    /// Attribute write without validation. The id is immutable, so `"id"` is ignored.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        if key == "id" {
            log::debug!("Ignoring attempt to rewrite id of item {}", self.id);
            return;
        }
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    pub(crate) fn set_parent(&mut self, parent_id: Option<&str>) {
        let value = parent_id.map_or(Value::Null, |p| Value::String(p.to_string()));
        self.attributes.insert(keys::PARENT_ID.to_string(), value);
    }

    pub fn name(&self) -> &str {
        self.get_str(keys::NAME).unwrap_or_default()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.get_str(keys::PARENT_ID)
    }

    /// Check if this is a root item (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id().is_none()
    }

    pub fn node_type(&self) -> Option<NodeType> {
        self.get_str(keys::NODE_TYPE).and_then(|s| s.parse().ok())
    }

    pub fn is_group(&self) -> bool {
        self.node_type() == Some(NodeType::Group)
    }

    pub fn is_instruction(&self) -> bool {
        self.node_type() == Some(NodeType::Instruction)
    }

    pub fn device(&self) -> Option<Device> {
        self.get_str(keys::DEVICE).and_then(|s| s.parse().ok())
    }

    /// Sub-action resolved against the item's device
    pub fn sub_action(&self) -> Option<SubAction> {
        let raw = self.get_str(keys::SUB_ACTION)?;
        match self.device() {
            Some(device) => SubAction::canonicalize(device, raw),
            None => raw.parse().ok(),
        }
    }

    pub fn sub_content(&self) -> &str {
        self.get_str(keys::SUB_CONTENT).unwrap_or_default()
    }

    pub fn coordinates(&self) -> Option<Point> {
        Point::parse(self.sub_content())
    }

    pub fn key_state(&self) -> Option<KeyState> {
        self.get_str(keys::KEY_STATE).and_then(|s| s.parse().ok())
    }

    pub fn is_expanded(&self) -> bool {
        self.get_bool(keys::EXPANDED).unwrap_or(false)
    }

    pub fn is_selected(&self) -> bool {
        self.get_bool(keys::SELECTED).unwrap_or(false)
    }

    pub fn icon(&self) -> Option<&str> {
        self.get_str(keys::ICON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_creation() {
        let item = Item::new("a").with(keys::NAME, "A");
        assert_eq!(item.id(), "a");
        assert_eq!(item.name(), "A");
        assert!(item.is_root());
        assert_eq!(item.node_type(), None);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Item::generate();
        let b = Item::generate();
        assert_ne!(a.id(), b.id());
        assert!(Uuid::parse_str(a.id()).is_ok());
    }

    #[test]
    fn test_group_and_instruction_constructors() {
        let group = Item::group("Login");
        assert!(group.is_group());
        assert!(!group.is_expanded());

        let click = Item::instruction("Click OK", Device::Mouse);
        assert!(click.is_instruction());
        assert_eq!(click.sub_action(), Some(SubAction::MouseClick));
        assert_eq!(click.get_str(keys::SUB_ACTION), Some("M_click"));

        let stick = Item::instruction("Fire", Device::Joystick);
        assert_eq!(stick.get(keys::SUB_ACTION), None);
    }

    #[test]
    fn test_get_with_default() {
        let item = Item::new("a");
        assert_eq!(item.get_or("missing", json!(3)), json!(3));
        assert_eq!(item.get("missing"), None);
    }

    #[test]
    fn test_id_is_immutable() {
        let mut item = Item::new("a");
        item.set("id", "b");
        assert_eq!(item.id(), "a");
        assert!(item.get("id").is_none());
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Item::new("a").with(keys::NAME, "before");
        let mut copy = original.clone();
        copy.set(keys::NAME, "after");
        assert_eq!(original.name(), "before");
        assert_eq!(copy.id(), original.id());
    }

    #[test]
    fn test_sub_action_tolerates_bare_names() {
        let item = Item::new("k")
            .with(keys::DEVICE, "keyboard")
            .with(keys::SUB_ACTION, "copy");
        assert_eq!(item.sub_action(), Some(SubAction::KeyCopy));
    }

    #[test]
    fn test_coordinates() {
        let item = Item::new("m").with(keys::SUB_CONTENT, "10,20");
        assert_eq!(item.coordinates(), Some(Point::new(10, 20)));
    }

    #[test]
    fn test_serialization_flattens_attributes() {
        let mut item = Item::new("a").with(keys::NAME, "A").with("custom", json!({"k": 1}));
        item.set_parent(None);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({"id": "a", "name": "A", "custom": {"k": 1}, "parent_id": null})
        );
    }
}
