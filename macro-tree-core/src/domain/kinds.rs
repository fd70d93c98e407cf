//! Item Kinds
//!
//! Enumerations stored as strings in item attributes: node type, input
//! device, device-specific sub-action and key state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when an attribute string is not a member of its enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseKindError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Node type determines whether an item may hold children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Folder-like node, may contain children
    Group,
    /// Executable leaf
    #[default]
    Instruction,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Group => "group",
            NodeType::Instruction => "instruction",
        }
    }
}

impl FromStr for NodeType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(NodeType::Group),
            "instruction" => Ok(NodeType::Instruction),
            other => Err(ParseKindError::new("node type", other)),
        }
    }
}

/// Input device an instruction drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Mouse,
    Keyboard,
    Joystick,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Mouse => "mouse",
            Device::Keyboard => "keyboard",
            Device::Joystick => "joystick",
        }
    }

    /// Prefix used by canonical sub-action strings (`M_click`)
    pub fn prefix(&self) -> &'static str {
        match self {
            Device::Mouse => "M",
            Device::Keyboard => "K",
            Device::Joystick => "J",
        }
    }

    pub fn sub_actions(&self) -> &'static [SubAction] {
        match self {
            Device::Mouse => &[
                SubAction::MouseClick,
                SubAction::MouseDouble,
                SubAction::MouseRightClick,
                SubAction::MouseDrag,
                SubAction::MouseMove,
            ],
            Device::Keyboard => &[
                SubAction::KeyTyping,
                SubAction::KeyCopy,
                SubAction::KeyPaste,
                SubAction::KeyShortcut,
            ],
            Device::Joystick => &[],
        }
    }

    /// Sub-action selected when switching to this device
    pub fn default_sub_action(&self) -> Option<SubAction> {
        self.sub_actions().first().copied()
    }
}

impl FromStr for Device {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mouse" => Ok(Device::Mouse),
            "keyboard" => Ok(Device::Keyboard),
            "joystick" => Ok(Device::Joystick),
            other => Err(ParseKindError::new("device", other)),
        }
    }
}

/// Device-specific operation
///
/// Stored in canonical prefixed form (`M_click`, `K_typing`) so values
/// stay unambiguous across devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubAction {
    MouseClick,
    MouseDouble,
    MouseRightClick,
    MouseDrag,
    MouseMove,
    KeyTyping,
    KeyCopy,
    KeyPaste,
    KeyShortcut,
}

impl SubAction {
    pub fn device(&self) -> Device {
        match self {
            SubAction::MouseClick
            | SubAction::MouseDouble
            | SubAction::MouseRightClick
            | SubAction::MouseDrag
            | SubAction::MouseMove => Device::Mouse,
            SubAction::KeyTyping
            | SubAction::KeyCopy
            | SubAction::KeyPaste
            | SubAction::KeyShortcut => Device::Keyboard,
        }
    }

    /// Name without the device prefix
    pub fn bare(&self) -> &'static str {
        match self {
            SubAction::MouseClick => "click",
            SubAction::MouseDouble => "double",
            SubAction::MouseRightClick => "right_click",
            SubAction::MouseDrag => "drag",
            SubAction::MouseMove => "move",
            SubAction::KeyTyping => "typing",
            SubAction::KeyCopy => "copy",
            SubAction::KeyPaste => "paste",
            SubAction::KeyShortcut => "shortcut",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubAction::MouseClick => "M_click",
            SubAction::MouseDouble => "M_double",
            SubAction::MouseRightClick => "M_right_click",
            SubAction::MouseDrag => "M_drag",
            SubAction::MouseMove => "M_move",
            SubAction::KeyTyping => "K_typing",
            SubAction::KeyCopy => "K_copy",
            SubAction::KeyPaste => "K_paste",
            SubAction::KeyShortcut => "K_shortcut",
        }
    }

    /// Resolves `raw` against `device`, accepting both `click` and `M_click`.
    ///
    /// Returns `None` when the value belongs to another device or to none.
    pub fn canonicalize(device: Device, raw: &str) -> Option<SubAction> {
        let bare = match raw.split_once('_') {
            Some((prefix, rest)) if prefix == device.prefix() => rest,
            _ => raw,
        };
        device
            .sub_actions()
            .iter()
            .copied()
            .find(|action| action.bare() == bare)
    }
}

impl FromStr for SubAction {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Device::Mouse, Device::Keyboard]
            .into_iter()
            .find_map(|device| SubAction::canonicalize(device, s))
            .ok_or_else(|| ParseKindError::new("sub-action", s))
    }
}

impl std::fmt::Display for SubAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key state for keyboard sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyState {
    #[default]
    Pressed,
    Released,
}

impl KeyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyState::Pressed => "pressed",
            KeyState::Released => "released",
        }
    }
}

impl FromStr for KeyState {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pressed" => Ok(KeyState::Pressed),
            "released" => Ok(KeyState::Released),
            other => Err(ParseKindError::new("key state", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_strings() {
        assert_eq!(NodeType::Group.as_str(), "group");
        assert_eq!("instruction".parse::<NodeType>(), Ok(NodeType::Instruction));
        assert!("folder".parse::<NodeType>().is_err());
    }

    #[test]
    fn test_canonicalize_accepts_bare_and_prefixed() {
        assert_eq!(
            SubAction::canonicalize(Device::Mouse, "click"),
            Some(SubAction::MouseClick)
        );
        assert_eq!(
            SubAction::canonicalize(Device::Mouse, "M_right_click"),
            Some(SubAction::MouseRightClick)
        );
        assert_eq!(
            SubAction::canonicalize(Device::Keyboard, "K_paste"),
            Some(SubAction::KeyPaste)
        );
    }

    #[test]
    fn test_canonicalize_rejects_other_device() {
        assert_eq!(SubAction::canonicalize(Device::Keyboard, "M_click"), None);
        assert_eq!(SubAction::canonicalize(Device::Mouse, "typing"), None);
        assert_eq!(SubAction::canonicalize(Device::Joystick, "click"), None);
    }

    #[test]
    fn test_device_defaults() {
        assert_eq!(Device::Mouse.default_sub_action(), Some(SubAction::MouseClick));
        assert_eq!(Device::Keyboard.default_sub_action(), Some(SubAction::KeyTyping));
        assert_eq!(Device::Joystick.default_sub_action(), None);
    }

    #[test]
    fn test_sub_action_from_str() {
        assert_eq!("K_shortcut".parse::<SubAction>(), Ok(SubAction::KeyShortcut));
        assert_eq!("drag".parse::<SubAction>(), Ok(SubAction::MouseDrag));
        let err = "J_fire".parse::<SubAction>().unwrap_err();
        assert_eq!(err.kind, "sub-action");
    }

    #[test]
    fn test_key_state_serde() {
        let json = serde_json::to_string(&KeyState::Released).unwrap();
        assert_eq!(json, "\"released\"");
        assert_eq!("pressed".parse::<KeyState>(), Ok(KeyState::Pressed));
    }
}
