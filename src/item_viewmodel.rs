//! Item View Model
//!
//! Editable copy of one item for the row UI. Every mutator returns a new
//! value and leaves `self` untouched; nothing reaches the tree until the
//! caller commits through `TreeViewModel::commit_item`.

use serde_json::{Map, Value};

use macro_tree_core::{keys, Device, Item, KeyState, Point, SubAction};

use crate::cyclic::CyclicList;

/// Joystick is not part of the toggle cycle
const DEVICES: CyclicList<'static, Device> = CyclicList::new(&[Device::Mouse, Device::Keyboard]);
const MOUSE_ACTIONS: CyclicList<'static, SubAction> =
    CyclicList::new(&[SubAction::MouseClick, SubAction::MouseDouble]);
const KEYBOARD_ACTIONS: CyclicList<'static, SubAction> = CyclicList::new(&[
    SubAction::KeyTyping,
    SubAction::KeyCopy,
    SubAction::KeyPaste,
]);
const KEY_STATES: CyclicList<'static, KeyState> =
    CyclicList::new(&[KeyState::Pressed, KeyState::Released]);

#[derive(Debug, Clone, PartialEq)]
pub struct ItemViewModel {
    original: Item,
    current: Item,
}

impl ItemViewModel {
    pub fn new(item: Item) -> Self {
        Self {
            original: item.clone(),
            current: item,
        }
    }

    pub fn id(&self) -> &str {
        self.current.id()
    }

    pub fn item(&self) -> &Item {
        &self.current
    }

    pub fn name(&self) -> &str {
        self.current.name()
    }

    /// Mouse when the item names no device
    pub fn device(&self) -> Device {
        self.current.device().unwrap_or_default()
    }

    pub fn sub_action(&self) -> Option<SubAction> {
        self.current.sub_action()
    }

    pub fn sub_content(&self) -> &str {
        self.current.sub_content()
    }

    pub fn key_state(&self) -> KeyState {
        self.current.key_state().unwrap_or_default()
    }

    fn with_attr(&self, key: &str, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.current.set(key, value);
        next
    }

    /// Next device in the cycle; the sub-action resets to the device default
    pub fn toggle_input(&self) -> Self {
        if self.current.is_group() {
            return self.clone();
        }
        let device = DEVICES.next(&self.device()).copied().unwrap_or_default();
        let mut next = self.with_attr(keys::DEVICE, device.as_str());
        match device.default_sub_action() {
            Some(action) => next.current.set(keys::SUB_ACTION, action.as_str()),
            None => {
                next.current.remove(keys::SUB_ACTION);
            }
        }
        next
    }

    /// Next sub-action for the current device
    pub fn toggle_subaction(&self) -> Self {
        if self.current.is_group() {
            return self.clone();
        }
        let actions = match self.device() {
            Device::Mouse => MOUSE_ACTIONS,
            Device::Keyboard => KEYBOARD_ACTIONS,
            Device::Joystick => return self.clone(),
        };
        let next_action = match self.sub_action() {
            Some(current) => actions.next(&current),
            None => actions.first(),
        };
        match next_action {
            Some(action) => self.with_attr(keys::SUB_ACTION, action.as_str()),
            None => self.clone(),
        }
    }

    pub fn toggle_key_state(&self) -> Self {
        let state = KEY_STATES.next(&self.key_state()).copied().unwrap_or_default();
        self.with_attr(keys::KEY_STATE, state.as_str())
    }

    pub fn with_name(&self, name: &str) -> Self {
        self.with_attr(keys::NAME, name)
    }

    pub fn with_sub_content(&self, content: &str) -> Self {
        self.with_attr(keys::SUB_CONTENT, content)
    }

    pub fn with_coordinates(&self, point: Point) -> Self {
        self.with_attr(keys::SUB_CONTENT, point.to_string())
    }

    /// Attributes that differ from the wrapped item
    pub fn changes(&self) -> Map<String, Value> {
        self.current
            .attributes()
            .iter()
            .filter(|(key, value)| {
                !keys::PROTECTED.contains(&key.as_str()) && self.original.get(key) != Some(*value)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .chain(
                self.original
                    .attributes()
                    .keys()
                    .filter(|key| self.current.get(key).is_none())
                    .map(|key| (key.clone(), Value::Null)),
            )
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mouse_click() -> ItemViewModel {
        ItemViewModel::new(Item::instruction("Click", Device::Mouse))
    }

    #[test]
    fn test_subaction_cycle() {
        let vm = mouse_click();
        let once = vm.toggle_subaction();
        assert_eq!(once.sub_action(), Some(SubAction::MouseDouble));
        assert_eq!(once.toggle_subaction().sub_action(), Some(SubAction::MouseClick));
        assert_eq!(vm.sub_action(), Some(SubAction::MouseClick));
    }

    #[test]
    fn test_toggle_input_resets_subaction() {
        let vm = mouse_click().toggle_subaction().toggle_input();
        assert_eq!(vm.device(), Device::Keyboard);
        assert_eq!(vm.sub_action(), Some(SubAction::KeyTyping));
        assert_eq!(vm.item().get_str(keys::SUB_ACTION), Some("K_typing"));

        let back = vm.toggle_input();
        assert_eq!(back.device(), Device::Mouse);
        assert_eq!(back.sub_action(), Some(SubAction::MouseClick));
    }

    #[test]
    fn test_keyboard_cycle_wraps() {
        let vm = mouse_click().toggle_input();
        let steps: Vec<&str> = std::iter::successors(Some(vm), |v| Some(v.toggle_subaction()))
            .take(4)
            .map(|v| v.sub_action().map(|a| a.as_str()).unwrap_or_default())
            .collect();
        assert_eq!(steps, vec!["K_typing", "K_copy", "K_paste", "K_typing"]);
    }

    #[test]
    fn test_joystick_leaves_cycle() {
        let vm = ItemViewModel::new(Item::instruction("Stick", Device::Joystick));
        assert_eq!(vm.toggle_subaction(), vm);
        assert_eq!(vm.toggle_input().device(), Device::Mouse);
    }

    #[test]
    fn test_bare_subaction_is_canonicalized() {
        let item = Item::instruction("Old", Device::Mouse).with(keys::SUB_ACTION, "double");
        let vm = ItemViewModel::new(item);
        assert_eq!(vm.toggle_subaction().item().get_str(keys::SUB_ACTION), Some("M_click"));
    }

    #[test]
    fn test_key_state_toggle() {
        let vm = mouse_click().toggle_input();
        assert_eq!(vm.key_state(), KeyState::Pressed);
        assert_eq!(vm.toggle_key_state().key_state(), KeyState::Released);
        assert_eq!(vm.toggle_key_state().toggle_key_state().key_state(), KeyState::Pressed);
    }

    #[test]
    fn test_group_ignores_input_toggle() {
        let vm = ItemViewModel::new(Item::group("Folder"));
        assert_eq!(vm.toggle_input(), vm);
    }

    #[test]
    fn test_group_ignores_subaction_toggle() {
        let vm = ItemViewModel::new(Item::group("Folder"));
        let toggled = vm.toggle_subaction();
        assert_eq!(toggled, vm);
        assert_eq!(toggled.sub_action(), None);
        assert!(!toggled.is_dirty());
    }

    #[test]
    fn test_changes() {
        let vm = mouse_click();
        assert!(!vm.is_dirty());

        let edited = vm
            .with_name("Press")
            .with_coordinates(Point::new(3, -4))
            .toggle_input();
        let changes = edited.changes();

        assert_eq!(changes.get(keys::NAME), Some(&json!("Press")));
        assert_eq!(changes.get(keys::SUB_CONTENT), Some(&json!("3,-4")));
        assert_eq!(changes.get(keys::DEVICE), Some(&json!("keyboard")));
        assert_eq!(changes.get(keys::SUB_ACTION), Some(&json!("K_typing")));
        assert_eq!(changes.len(), 4);
        assert_eq!(vm.name(), "Click");
    }

    #[test]
    fn test_with_sub_content() {
        let vm = mouse_click().with_sub_content("hello");
        assert_eq!(vm.sub_content(), "hello");
    }
}
