//! Modular furniture domain
//!
//! Pure placement and connectivity rules: grid positions, colors, modules,
//! components, and the furniture grid that owns them. No I/O and no logging
//! happen here; the engine crate drives these types.

pub mod entities;
pub mod error;
pub mod factories;
pub mod ids;
pub mod value_objects;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    Component, Furniture, JoinError, Module, ModuleKind, Placement, PlacementPolicy,
    ShelvingModuleKind,
};

pub use error::DomainError;
pub use factories::{ComponentType, FurnitureType};

// Re-export ID types
pub use ids::{ComponentId, FurnitureId};

// Re-export value objects (explicit list in value_objects/mod.rs)
pub use value_objects::{
    hex_to_rgb, rgb_to_hex, Axis, Color, Direction, FurnitureName, Position, Rgb,
};
