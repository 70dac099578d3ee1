//! Domain layer: component model and its operations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod fieldset;

pub use arena::{ComponentArena, ComponentNode, NodeId, Relation, RootMasters};
pub use builder::{ComponentSpec, Page, PageBuilder, PageSpec};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use fieldset::{AttributeFieldset, Choice, FieldKind};
