//! Component - one or more modules placed and moved as a unit

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::entities::Module;
use crate::error::DomainError;
use crate::factories::{ComponentType, FurnitureType};
use crate::ids::ComponentId;
use crate::value_objects::{Axis, Position};

/// Why a set of components could not be joined into one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// A chain needs at least two modules
    #[error("At least two modules are needed to form a chain, got {0}")]
    TooFewModules(usize),
    /// Input exceeds the connectivity search cap
    #[error("Joining {count} modules exceeds the limit of {max}")]
    TooManyModules { count: usize, max: usize },
    /// Two modules claim the same cell
    #[error("Position {0} is claimed by more than one module")]
    DuplicatePosition(Position),
    /// No axis yields a single chain
    #[error("Modules are not connected along any axis (checked {failed_axes:?})")]
    NotConnected { failed_axes: Vec<Axis> },
}

/// An ordered, non-empty group of modules
///
/// # Invariants
///
/// - `modules` is never empty
/// - Module positions are expected to be unique; only [`Component::try_join`]
///   enforces it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ComponentRecord")]
pub struct Component {
    id: ComponentId,
    modules: Vec<Module>,
}

/// Stored shape, validated back into a [`Component`]
#[derive(Deserialize)]
struct ComponentRecord {
    id: ComponentId,
    modules: Vec<Module>,
}

impl TryFrom<ComponentRecord> for Component {
    type Error = DomainError;

    fn try_from(record: ComponentRecord) -> Result<Self, Self::Error> {
        Ok(Component::new(record.modules)?.with_id(record.id))
    }
}

impl Component {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `modules` is empty.
    pub fn new(modules: Vec<Module>) -> Result<Self, DomainError> {
        if modules.is_empty() {
            return Err(DomainError::validation(
                "A component needs at least one module",
            ));
        }
        Ok(Self {
            id: ComponentId::new(),
            modules,
        })
    }

    pub fn single(module: Module) -> Self {
        Self {
            id: ComponentId::new(),
            modules: vec![module],
        }
    }

    /// Set the component's ID (used when loading from storage).
    pub fn with_id(mut self, id: ComponentId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// The module at exactly `position`, if any.
    pub fn module_at(&self, position: &Position) -> Option<&Module> {
        self.modules.iter().find(|m| m.position() == *position)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.modules.iter().map(Module::position)
    }

    /// The variant this component was built from, taken from its first module.
    pub fn component_type(&self) -> ComponentType {
        ComponentType::from(self.modules[0].kind())
    }

    pub fn furniture_type(&self) -> FurnitureType {
        self.component_type().furniture_type()
    }

    /// Merge `components` into a new component when all of their modules form
    /// a single chain along some axis.
    ///
    /// The joined component gets a fresh ID and its modules follow the chain
    /// order. At most `max_modules` modules are searched.
    pub fn try_join(components: &[Component], max_modules: usize) -> Result<Component, JoinError> {
        let modules: Vec<&Module> = components.iter().flat_map(|c| c.modules.iter()).collect();

        if modules.len() < 2 {
            return Err(JoinError::TooFewModules(modules.len()));
        }
        if modules.len() > max_modules {
            return Err(JoinError::TooManyModules {
                count: modules.len(),
                max: max_modules,
            });
        }

        let mut seen = HashSet::with_capacity(modules.len());
        for module in &modules {
            if !seen.insert(module.position()) {
                return Err(JoinError::DuplicatePosition(module.position()));
            }
        }

        let positions: Vec<Position> = modules.iter().map(|m| m.position()).collect();
        let chain = Axis::ALL
            .into_iter()
            .find_map(|axis| Position::find_chain(&positions, axis))
            .ok_or_else(|| JoinError::NotConnected {
                failed_axes: Axis::ALL.to_vec(),
            })?;

        let mut by_position: HashMap<Position, &Module> =
            modules.into_iter().map(|m| (m.position(), m)).collect();
        let ordered = chain
            .iter()
            .filter_map(|p| by_position.remove(p))
            .cloned()
            .collect();

        Ok(Component {
            id: ComponentId::new(),
            modules: ordered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ShelvingModuleKind;
    use crate::value_objects::Color;

    fn module_at(x: i32, y: i32) -> Module {
        Module::shelving(
            40,
            Position::planar(x, y),
            Color::from_rgb(200, 180, 140),
            ShelvingModuleKind::Open,
        )
        .unwrap()
    }

    fn single_at(x: i32, y: i32) -> Component {
        Component::single(module_at(x, y))
    }

    mod construction {
        use super::*;

        #[test]
        fn empty_component_is_rejected() {
            assert!(matches!(
                Component::new(vec![]),
                Err(DomainError::Validation(_))
            ));
        }

        #[test]
        fn single_wraps_one_module() {
            let component = single_at(1, 1);
            assert_eq!(component.module_count(), 1);
            assert_eq!(component.furniture_type(), FurnitureType::Shelving);
            assert_eq!(
                component.component_type(),
                ComponentType::Shelving(ShelvingModuleKind::Open)
            );
        }

        #[test]
        fn deserialization_rejects_empty_modules() {
            let json = serde_json::json!({ "id": ComponentId::new(), "modules": [] });
            assert!(serde_json::from_value::<Component>(json).is_err());
        }

        #[test]
        fn with_id_restores_identity() {
            let id = ComponentId::new();
            assert_eq!(single_at(0, 0).with_id(id).id(), id);
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn module_at_exact_position() {
            let component = Component::new(vec![module_at(0, 0), module_at(1, 0)]).unwrap();
            let found = component.module_at(&Position::planar(1, 0)).unwrap();
            assert_eq!(found.position(), Position::planar(1, 0));
        }

        #[test]
        fn missing_position_is_none() {
            let component = Component::new(vec![module_at(0, 0), module_at(1, 0)]).unwrap();
            assert!(component.module_at(&Position::planar(2, 0)).is_none());
            assert!(component.module_at(&Position::new(0, 0, 1)).is_none());
        }

        #[test]
        fn positions_follow_module_order() {
            let component = Component::new(vec![module_at(2, 0), module_at(1, 0)]).unwrap();
            let positions: Vec<Position> = component.positions().collect();
            assert_eq!(positions, vec![Position::planar(2, 0), Position::planar(1, 0)]);
        }
    }

    mod join {
        use super::*;

        #[test]
        fn row_of_singles_joins_in_chain_order() {
            let parts = vec![single_at(2, 0), single_at(0, 0), single_at(1, 0)];
            let joined = Component::try_join(&parts, 64).unwrap();

            assert_eq!(joined.module_count(), 3);
            assert!(parts.iter().all(|p| p.id() != joined.id()));
            let positions: Vec<Position> = joined.positions().collect();
            for pair in positions.windows(2) {
                assert!(pair[0].is_adjacent_along(&pair[1], Axis::X));
            }
        }

        #[test]
        fn column_joins_along_y() {
            let parts = vec![single_at(0, 0), single_at(0, 1)];
            let joined = Component::try_join(&parts, 64).unwrap();
            assert_eq!(joined.module_count(), 2);
        }

        #[test]
        fn multi_module_components_join() {
            let left = Component::new(vec![module_at(0, 0), module_at(1, 0)]).unwrap();
            let right = Component::new(vec![module_at(3, 0), module_at(2, 0)]).unwrap();
            let joined = Component::try_join(&[left, right], 64).unwrap();
            assert_eq!(joined.module_count(), 4);
        }

        #[test]
        fn gap_reports_every_axis() {
            let parts = vec![single_at(0, 0), single_at(2, 0)];
            let err = Component::try_join(&parts, 64).unwrap_err();
            assert_eq!(
                err,
                JoinError::NotConnected {
                    failed_axes: vec![Axis::X, Axis::Y, Axis::Z]
                }
            );
        }

        #[test]
        fn l_shape_is_not_a_chain() {
            let parts = vec![single_at(0, 0), single_at(1, 0), single_at(1, 1)];
            assert!(matches!(
                Component::try_join(&parts, 64),
                Err(JoinError::NotConnected { .. })
            ));
        }

        #[test]
        fn single_module_is_too_few() {
            assert_eq!(
                Component::try_join(&[single_at(0, 0)], 64),
                Err(JoinError::TooFewModules(1))
            );
            assert_eq!(Component::try_join(&[], 64), Err(JoinError::TooFewModules(0)));
        }

        #[test]
        fn duplicate_position_is_rejected() {
            let parts = vec![single_at(0, 0), single_at(1, 0), single_at(0, 0)];
            assert_eq!(
                Component::try_join(&parts, 64),
                Err(JoinError::DuplicatePosition(Position::planar(0, 0)))
            );
        }

        #[test]
        fn cap_is_enforced_before_searching() {
            let parts: Vec<Component> = (0..5).map(|x| single_at(x, 0)).collect();
            assert_eq!(
                Component::try_join(&parts, 4),
                Err(JoinError::TooManyModules { count: 5, max: 4 })
            );
            assert!(Component::try_join(&parts, 5).is_ok());
        }
    }
}
