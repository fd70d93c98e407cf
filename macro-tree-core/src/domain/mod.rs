//! Domain Layer
//!
//! Contains the item entity, its enumerations and the shared error type.

mod error;
mod item;
pub mod keys;
mod kinds;
mod point;

pub use error::{ErrorCode, ErrorReport, TreeError, TreeResult};
pub use item::Item;
pub use kinds::{Device, KeyState, NodeType, ParseKindError, SubAction};
pub use point::Point;
