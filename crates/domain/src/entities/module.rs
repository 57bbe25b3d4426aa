//! Module - the smallest placeable furniture unit

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::factories::FurnitureType;
use crate::value_objects::{Color, Position};

/// The shelving module variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShelvingModuleKind {
    /// Open back, no door
    #[default]
    Open,
    /// Closed back, no door
    Closed,
    /// Closed back with a door
    ClosedWithDoor,
}

impl ShelvingModuleKind {
    pub const ALL: [ShelvingModuleKind; 3] = [
        ShelvingModuleKind::Open,
        ShelvingModuleKind::Closed,
        ShelvingModuleKind::ClosedWithDoor,
    ];

    pub fn is_back_closed(&self) -> bool {
        !matches!(self, Self::Open)
    }

    pub fn has_door(&self) -> bool {
        matches!(self, Self::ClosedWithDoor)
    }
}

impl fmt::Display for ShelvingModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::ClosedWithDoor => write!(f, "closed_with_door"),
        }
    }
}

impl FromStr for ShelvingModuleKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "closed_with_door" | "door" => Ok(Self::ClosedWithDoor),
            _ => Err(DomainError::parse(format!("Unknown shelving module: {}", s))),
        }
    }
}

/// Type-specific module attributes, one variant per furniture kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
    Shelving(ShelvingModuleKind),
}

impl ModuleKind {
    /// The furniture kind this module belongs to.
    pub fn furniture_type(&self) -> FurnitureType {
        match self {
            Self::Shelving(_) => FurnitureType::Shelving,
        }
    }

    pub fn is_back_closed(&self) -> bool {
        match self {
            Self::Shelving(kind) => kind.is_back_closed(),
        }
    }

    pub fn has_door(&self) -> bool {
        match self {
            Self::Shelving(kind) => kind.has_door(),
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shelving(kind) => write!(f, "shelving/{}", kind),
        }
    }
}

/// An immutable module: size, grid position, color and kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ModuleRecord")]
pub struct Module {
    size: u32,
    position: Position,
    color: Color,
    kind: ModuleKind,
}

/// Stored shape, validated back into a [`Module`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleRecord {
    size: u32,
    position: Position,
    color: Color,
    kind: ModuleKind,
}

impl TryFrom<ModuleRecord> for Module {
    type Error = DomainError;

    fn try_from(record: ModuleRecord) -> Result<Self, Self::Error> {
        Module::new(record.size, record.position, record.color, record.kind)
    }
}

impl Module {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `size` is zero.
    pub fn new(
        size: u32,
        position: Position,
        color: Color,
        kind: ModuleKind,
    ) -> Result<Self, DomainError> {
        if size == 0 {
            return Err(DomainError::validation("Module size must be positive"));
        }
        Ok(Self {
            size,
            position,
            color,
            kind,
        })
    }

    pub fn shelving(
        size: u32,
        position: Position,
        color: Color,
        kind: ShelvingModuleKind,
    ) -> Result<Self, DomainError> {
        Self::new(size, position, color, ModuleKind::Shelving(kind))
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn is_back_closed(&self) -> bool {
        self.kind.is_back_closed()
    }

    pub fn has_door(&self) -> bool {
        self.kind.has_door()
    }
}
