//! Repository Layer
//!
//! Storage abstraction for tree documents and its file-backed implementation.

mod traits;
mod file_repo;


pub use traits::TreeRepository;
pub use file_repo::{FileTreeRepository, TreeSummary};
