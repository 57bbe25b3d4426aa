//! Factories - one variant per furniture kind
//!
//! New kinds are added by extending [`FurnitureType`] and [`ComponentType`];
//! the compiler then points at every `match` that needs a new arm.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::{Component, Furniture, Module, ModuleKind, ShelvingModuleKind};
use crate::error::DomainError;
use crate::value_objects::{Color, FurnitureName, Position};

/// The furniture kinds that can be built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FurnitureType {
    #[default]
    Shelving,
}

impl FurnitureType {
    pub const ALL: [FurnitureType; 1] = [FurnitureType::Shelving];

    /// Build an empty furniture of this kind.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if any dimension is zero.
    pub fn create(
        self,
        name: FurnitureName,
        width: u32,
        height: u32,
        module_size: u32,
    ) -> Result<Furniture, DomainError> {
        Furniture::new(name, self, width, height, module_size)
    }

    /// Whether components of `component_type` can be placed on this furniture.
    pub fn accepts(self, component_type: ComponentType) -> bool {
        component_type.furniture_type() == self
    }

    /// Every component variant available for this furniture kind.
    pub fn component_types(self) -> Vec<ComponentType> {
        match self {
            Self::Shelving => ShelvingModuleKind::ALL
                .into_iter()
                .map(ComponentType::Shelving)
                .collect(),
        }
    }
}

impl fmt::Display for FurnitureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shelving => write!(f, "shelving"),
        }
    }
}

impl FromStr for FurnitureType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shelving" | "shelf" => Ok(Self::Shelving),
            _ => Err(DomainError::parse(format!("Unknown furniture type: {}", s))),
        }
    }
}

/// The component kinds that can be built, tagged by furniture kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentType {
    Shelving(ShelvingModuleKind),
}

impl ComponentType {
    pub fn furniture_type(self) -> FurnitureType {
        match self {
            Self::Shelving(_) => FurnitureType::Shelving,
        }
    }

    pub fn module_kind(self) -> ModuleKind {
        match self {
            Self::Shelving(kind) => ModuleKind::Shelving(kind),
        }
    }

    /// Build a single-module component at `position`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `module_size` is zero.
    pub fn create(
        self,
        module_size: u32,
        position: Position,
        color: Color,
    ) -> Result<Component, DomainError> {
        let module = Module::new(module_size, position, color, self.module_kind())?;
        Ok(Component::single(module))
    }
}

impl From<ModuleKind> for ComponentType {
    fn from(kind: ModuleKind) -> Self {
        match kind {
            ModuleKind::Shelving(kind) => Self::Shelving(kind),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.module_kind())
    }
}

impl FromStr for ComponentType {
    type Err = DomainError;

    /// Accepts `"<furniture>/<variant>"`, or a bare shelving variant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (furniture, variant) = match s.split_once('/') {
            Some((furniture, variant)) => (furniture.parse()?, variant),
            None => (FurnitureType::Shelving, s),
        };
        match furniture {
            FurnitureType::Shelving => variant
                .parse::<ShelvingModuleKind>()
                .map(Self::Shelving)
                .map_err(|_| DomainError::parse(format!("Unknown component type: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name() -> FurnitureName {
        FurnitureName::new("Shelf").unwrap()
    }

    #[test]
    fn furniture_factory_builds_empty_grid() {
        let furniture = FurnitureType::Shelving.create(name(), 5, 4, 30).unwrap();
        assert_eq!(furniture.furniture_type(), FurnitureType::Shelving);
        assert_eq!((furniture.width(), furniture.height()), (5, 4));
        assert_eq!(furniture.module_size(), 30);
        assert!(furniture.get_components().is_empty());
    }

    #[test]
    fn furniture_factory_rejects_zero_dimensions() {
        assert!(matches!(
            FurnitureType::Shelving.create(name(), 0, 4, 30),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn component_factory_builds_single_module() {
        let color = Color::from_hex_named("#8b4513", "Walnut").unwrap();
        let component = ComponentType::Shelving(ShelvingModuleKind::ClosedWithDoor)
            .create(40, Position::planar(2, 1), color.clone())
            .unwrap();

        assert_eq!(component.module_count(), 1);
        let module = &component.modules()[0];
        assert_eq!(module.position(), Position::planar(2, 1));
        assert_eq!(module.size(), 40);
        assert_eq!(module.color(), &color);
        assert!(module.has_door());
    }

    #[test]
    fn component_factory_rejects_zero_size() {
        let result = ComponentType::Shelving(ShelvingModuleKind::Open).create(
            0,
            Position::planar(0, 0),
            Color::from_rgb(0, 0, 0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn shelving_accepts_every_shelving_variant() {
        let types = FurnitureType::Shelving.component_types();
        assert_eq!(types.len(), 3);
        assert!(types.iter().all(|t| FurnitureType::Shelving.accepts(*t)));
    }

    #[test]
    fn names_parse() {
        assert_eq!("Shelving".parse::<FurnitureType>().unwrap(), FurnitureType::Shelving);
        assert!("wardrobe".parse::<FurnitureType>().is_err());

        let door = ComponentType::Shelving(ShelvingModuleKind::ClosedWithDoor);
        assert_eq!(door.to_string(), "shelving/closed_with_door");
        assert_eq!(door.to_string().parse::<ComponentType>().unwrap(), door);
        assert_eq!(
            "closed".parse::<ComponentType>().unwrap(),
            ComponentType::Shelving(ShelvingModuleKind::Closed)
        );
        assert!("wardrobe/open".parse::<ComponentType>().is_err());
        assert!("shelving/drawer".parse::<ComponentType>().is_err());
    }
}
