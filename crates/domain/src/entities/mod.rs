//! Domain entities - Core business objects with identity

mod component;
mod furniture;
mod module;

pub use component::{Component, JoinError};
pub use furniture::{Furniture, Placement, PlacementPolicy};
pub use module::{Module, ModuleKind, ShelvingModuleKind};
