//! Tree Layer
//!
//! The in-memory macro tree with its mutation and traversal operations.

mod macro_tree;
mod mutation;
mod traversal;

pub use macro_tree::{ChildrenMap, MacroTree};
pub use traversal::Bfs;
