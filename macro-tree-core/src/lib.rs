//! Macro Tree Core
//!
//! Layered architecture:
//! - domain: Item entity, attribute kinds and the shared error type
//! - tree: the in-memory tree with its mutation and traversal operations
//! - events: synchronous observer bus for tree and view changes
//! - serializer: tree <-> JSON document
//! - repository: storage abstraction and the file-backed implementation
//! - config: host-supplied settings

pub mod config;
pub mod domain;
pub mod events;
pub mod repository;
pub mod serializer;
pub mod tree;

pub use config::{LogConfig, MacroTreeConfig};
pub use domain::{
    keys, Device, ErrorCode, ErrorReport, Item, KeyState, NodeType, ParseKindError,
    Point, SubAction, TreeError, TreeResult,
};
pub use events::{
    EventBus, EventPayload, ListenerResult, SubscriptionId, TreeEvent, TreeObserver, ViewEvent,
};
pub use repository::{FileTreeRepository, TreeRepository, TreeSummary};
pub use serializer::TreeDocument;
pub use tree::{Bfs, ChildrenMap, MacroTree};
