//! Macro Tree View-Model Layer
//!
//! Sits between a host UI and `macro-tree-core`:
//! - tree_viewmodel: commands, selection, expansion, visible rows, persistence
//! - item_viewmodel: value-semantics editor for a single row
//! - cyclic: wrap-around lists driving the row toggles
//! - logging: rolling file logger bootstrap

pub mod cyclic;
pub mod item_viewmodel;
pub mod logging;
pub mod models;
pub mod store;
pub mod tree;
pub mod tree_viewmodel;

pub use cyclic::CyclicList;
pub use item_viewmodel::ItemViewModel;
pub use logging::{init_logging, recent_log_lines};
pub use models::VisibleRow;
pub use store::SelectionStore;
pub use tree_viewmodel::TreeViewModel;

pub use macro_tree_core;
