//! Furniture - the bounded grid that components are placed on
//!
//! # Placement policies
//!
//! - [`PlacementPolicy::Overwrite`] keeps the historical behaviour: placing a
//!   component claims its cells unconditionally (last write wins) and removing
//!   one clears its cells whoever holds them now.
//! - [`PlacementPolicy::Strict`] rejects out-of-bounds and overlapping
//!   placements, and removal only clears cells the component still owns.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::entities::Component;
use crate::error::DomainError;
use crate::factories::FurnitureType;
use crate::ids::{ComponentId, FurnitureId};
use crate::value_objects::{Direction, FurnitureName, Position};

/// How a furniture reacts to conflicting placements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPolicy {
    #[default]
    Overwrite,
    Strict,
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for PlacementPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "strict" => Ok(Self::Strict),
            _ => Err(DomainError::parse(format!("Invalid placement policy: {}", s))),
        }
    }
}

/// Report of a successful placement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Components that lost at least one cell to the new one
    pub displaced: Vec<ComponentId>,
}

impl Placement {
    pub fn is_clean(&self) -> bool {
        self.displaced.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Placed {
    component: Component,
    cells: usize,
}

/// A bounded `width x height` grid owning placed components
///
/// # Invariants
///
/// - `width`, `height` and `module_size` are positive
/// - Every occupancy key is the position of a module of the component it maps to
/// - A component is listed exactly while it holds at least one cell
#[derive(Debug, Clone)]
pub struct Furniture {
    id: FurnitureId,
    name: FurnitureName,
    furniture_type: FurnitureType,
    width: u32,
    height: u32,
    module_size: u32,
    policy: PlacementPolicy,
    components: HashMap<ComponentId, Placed>,
    occupancy: HashMap<Position, ComponentId>,
}

impl Furniture {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create an empty furniture grid with the overwrite policy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if any dimension is zero.
    pub fn new(
        name: FurnitureName,
        furniture_type: FurnitureType,
        width: u32,
        height: u32,
        module_size: u32,
    ) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::validation(format!(
                "Furniture dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if module_size == 0 {
            return Err(DomainError::validation("Module size must be a positive integer"));
        }
        Ok(Self {
            id: FurnitureId::new(),
            name,
            furniture_type,
            width,
            height,
            module_size,
            policy: PlacementPolicy::default(),
            components: HashMap::new(),
            occupancy: HashMap::new(),
        })
    }

    pub fn with_policy(mut self, policy: PlacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the furniture's ID (used when loading from storage).
    pub fn with_id(mut self, id: FurnitureId) -> Self {
        self.id = id;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> FurnitureId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &FurnitureName {
        &self.name
    }

    #[inline]
    pub fn furniture_type(&self) -> FurnitureType {
        self.furniture_type
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn module_size(&self) -> u32 {
        self.module_size
    }

    #[inline]
    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether `position` lies inside `[0, width) x [0, height)`.
    pub fn contains(&self, position: &Position) -> bool {
        let inside = |value: i32, limit: u32| value >= 0 && i64::from(value) < i64::from(limit);
        inside(position.x(), self.width) && inside(position.y(), self.height)
    }

    /// The component occupying `position`, if any.
    pub fn get_component(&self, position: &Position) -> Option<&Component> {
        let id = self.occupancy.get(position)?;
        self.components.get(id).map(|placed| &placed.component)
    }

    /// Every placed component, each listed once.
    pub fn get_components(&self) -> Vec<&Component> {
        self.components.values().map(|placed| &placed.component).collect()
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id).map(|placed| &placed.component)
    }

    pub fn is_occupied(&self, position: &Position) -> bool {
        self.occupancy.contains_key(position)
    }

    pub fn occupant(&self, position: &Position) -> Option<ComponentId> {
        self.occupancy.get(position).copied()
    }

    pub fn occupied_positions(&self) -> impl Iterator<Item = &Position> {
        self.occupancy.keys()
    }

    /// Faces of the module at `position` with no neighbour from the same
    /// component, i.e. the faces that need a panel.
    pub fn exterior_faces(&self, position: &Position) -> Option<Vec<Direction>> {
        let component = self.get_component(position)?;
        let faces = Direction::ALL
            .into_iter()
            .filter(|direction| {
                !component.modules().iter().any(|m| {
                    matches!(
                        position.is_adjacent_towards(&m.position(), &[*direction]),
                        Ok(true)
                    )
                })
            })
            .collect();
        Some(faces)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Register `component` on every cell its modules cover.
    ///
    /// Under [`PlacementPolicy::Overwrite`] cells held by other components are
    /// taken over and reported in [`Placement::displaced`]. Under
    /// [`PlacementPolicy::Strict`] such a placement is rejected untouched.
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation` if the component belongs to another furniture kind
    /// - `DomainError::OutOfBounds` / `DomainError::Occupied` under the strict policy
    pub fn add_component(&mut self, component: Component) -> Result<Placement, DomainError> {
        self.check_placement(&component, &[component.id()])?;
        Ok(self.place(component))
    }

    /// Clear the cells of `component` and forget it.
    ///
    /// Under the overwrite policy every module position is cleared whoever
    /// holds it; under the strict policy only cells the component owns.
    /// Returns the number of cells cleared.
    pub fn remove_component(&mut self, component: &Component) -> usize {
        let id = component.id();
        let mut cleared = 0;
        for position in component.positions() {
            let owner = match self.occupancy.get(&position) {
                Some(owner) => *owner,
                None => continue,
            };
            if owner != id && self.policy == PlacementPolicy::Strict {
                continue;
            }
            self.occupancy.remove(&position);
            cleared += 1;
            if owner != id {
                self.release_cell(owner);
            }
        }
        self.components.remove(&id);
        cleared
    }

    /// Swap the components in `old` for `replacement` in one step.
    ///
    /// The replacement may reuse any cell held by the components it replaces.
    /// Nothing changes when the placement is rejected.
    pub fn replace_components(
        &mut self,
        old: &[ComponentId],
        replacement: Component,
    ) -> Result<Placement, DomainError> {
        let mut allowed: Vec<ComponentId> = old.to_vec();
        allowed.push(replacement.id());
        self.check_placement(&replacement, &allowed)?;

        for id in old {
            if let Some(placed) = self.components.get(id) {
                let component = placed.component.clone();
                self.remove_component(&component);
            }
        }
        Ok(self.place(replacement))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_placement(
        &self,
        component: &Component,
        allowed_owners: &[ComponentId],
    ) -> Result<(), DomainError> {
        let component_type = component.component_type();
        if !self.furniture_type.accepts(component_type) {
            return Err(DomainError::validation(format!(
                "A {} component cannot be placed on {} furniture",
                component_type, self.furniture_type
            )));
        }
        if self.policy == PlacementPolicy::Overwrite {
            return Ok(());
        }

        for position in component.positions() {
            if !self.contains(&position) {
                return Err(DomainError::out_of_bounds(position, self.width, self.height));
            }
            if let Some(owner) = self.occupancy.get(&position) {
                if !allowed_owners.contains(owner) {
                    return Err(DomainError::occupied(position));
                }
            }
        }
        Ok(())
    }

    fn place(&mut self, component: Component) -> Placement {
        let id = component.id();
        if let Some(previous) = self.components.remove(&id) {
            for position in previous.component.positions() {
                if self.occupancy.get(&position) == Some(&id) {
                    self.occupancy.remove(&position);
                }
            }
        }

        let mut displaced = Vec::new();
        let mut cells = 0;
        for position in component.positions() {
            match self.occupancy.insert(position, id) {
                Some(owner) if owner == id => {}
                Some(owner) => {
                    cells += 1;
                    self.release_cell(owner);
                    if !displaced.contains(&owner) {
                        displaced.push(owner);
                    }
                }
                None => cells += 1,
            }
        }

        self.components.insert(id, Placed { component, cells });
        Placement { displaced }
    }

    /// Drop one cell from `owner`, forgetting it once it holds none.
    fn release_cell(&mut self, owner: ComponentId) {
        let emptied = match self.components.get_mut(&owner) {
            Some(placed) => {
                placed.cells = placed.cells.saturating_sub(1);
                placed.cells == 0
            }
            None => false,
        };
        if emptied {
            self.components.remove(&owner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Module, ShelvingModuleKind};
    use crate::value_objects::Color;

    fn module(x: i32, y: i32) -> Module {
        Module::shelving(
            40,
            Position::planar(x, y),
            Color::from_rgb_named(255, 255, 255, "White"),
            ShelvingModuleKind::Open,
        )
        .unwrap()
    }

    fn component(cells: &[(i32, i32)]) -> Component {
        Component::new(cells.iter().map(|&(x, y)| module(x, y)).collect()).unwrap()
    }

    fn furniture(policy: PlacementPolicy) -> Furniture {
        Furniture::new(
            FurnitureName::new("Bookcase").unwrap(),
            FurnitureType::Shelving,
            4,
            3,
            40,
        )
        .unwrap()
        .with_policy(policy)
    }

    mod constructor {
        use super::*;

        #[test]
        fn new_furniture_is_empty() {
            let f = furniture(PlacementPolicy::Overwrite);
            assert_eq!(f.name().as_str(), "Bookcase");
            assert_eq!((f.width(), f.height(), f.module_size()), (4, 3, 40));
            assert!(f.get_components().is_empty());
            assert!(f.get_component(&Position::planar(0, 0)).is_none());
        }

        #[test]
        fn zero_dimensions_are_rejected() {
            let name = || FurnitureName::new("Bad").unwrap();
            assert!(Furniture::new(name(), FurnitureType::Shelving, 0, 3, 40).is_err());
            assert!(Furniture::new(name(), FurnitureType::Shelving, 4, 0, 40).is_err());
            assert!(Furniture::new(name(), FurnitureType::Shelving, 4, 3, 0).is_err());
        }

        #[test]
        fn default_policy_is_overwrite() {
            let f = Furniture::new(
                FurnitureName::new("Default").unwrap(),
                FurnitureType::Shelving,
                1,
                1,
                1,
            )
            .unwrap();
            assert_eq!(f.policy(), PlacementPolicy::Overwrite);
        }

        #[test]
        fn policy_parses() {
            assert_eq!("STRICT".parse::<PlacementPolicy>().unwrap(), PlacementPolicy::Strict);
            assert!("lenient".parse::<PlacementPolicy>().is_err());
        }
    }

    mod placement {
        use super::*;

        #[test]
        fn add_registers_every_module_position() {
            let mut f = furniture(PlacementPolicy::Overwrite);
            let c = component(&[(0, 0), (1, 0)]);
            let placement = f.add_component(c.clone()).unwrap();

            assert!(placement.is_clean());
            assert_eq!(f.get_component(&Position::planar(0, 0)), Some(&c));
            assert_eq!(f.get_component(&Position::planar(1, 0)), Some(&c));
            assert_eq!(f.get_components().len(), 1);
        }

        #[test]
        fn add_then_remove_leaves_no_trace() {
            let mut f = furniture(PlacementPolicy::Overwrite);
            let c = component(&[(0, 0), (1, 0), (2, 0)]);
            f.add_component(c.clone()).unwrap();

            assert_eq!(f.remove_component(&c), 3);
            for position in c.positions() {
                assert!(f.get_component(&position).is_none());
            }
            assert!(f.get_components().is_empty());
        }

        // Historical behaviour, kept under the overwrite policy.
        #[test]
        fn overlapping_add_overwrites_silently() {
            let mut f = furniture(PlacementPolicy::Overwrite);
            let first = component(&[(0, 0), (1, 0)]);
            let second = component(&[(1, 0)]);
            f.add_component(first.clone()).unwrap();
            let placement = f.add_component(second.clone()).unwrap();

            assert_eq!(placement.displaced, vec![first.id()]);
            assert_eq!(f.get_component(&Position::planar(1, 0)), Some(&second));
            assert_eq!(f.get_component(&Position::planar(0, 0)), Some(&first));
            assert_eq!(f.get_components().len(), 2);
        }

        #[test]
        fn fully_overwritten_component_disappears() {
            let mut f = furniture(PlacementPolicy::Overwrite);
            let first = component(&[(0, 0)]);
            f.add_component(first.clone()).unwrap();
            f.add_component(component(&[(0, 0)])).unwrap();

            assert!(f.component(first.id()).is_none());
            assert_eq!(f.get_components().len(), 1);
        }

        #[test]
        fn overwrite_remove_clears_cells_of_later_component() {
            let mut f = furniture(PlacementPolicy::Overwrite);
            let first = component(&[(0, 0), (1, 0)]);
            let second = component(&[(1, 0)]);
            f.add_component(first.clone()).unwrap();
            f.add_component(second.clone()).unwrap();

            f.remove_component(&first);
            assert!(f.get_component(&Position::planar(1, 0)).is_none());
            assert!(f.component(second.id()).is_none());
        }

        #[test]
        fn overwrite_does_not_check_bounds() {
            let mut f = furniture(PlacementPolicy::Overwrite);
            let outside = component(&[(10, 10)]);
            assert!(f.add_component(outside).is_ok());
            assert!(f.is_occupied(&Position::planar(10, 10)));
        }

        #[test]
        fn readding_same_component_is_idempotent() {
            let mut f = furniture(PlacementPolicy::Strict);
            let c = component(&[(0, 0), (1, 0)]);
            f.add_component(c.clone()).unwrap();
            let placement = f.add_component(c.clone()).unwrap();

            assert!(placement.is_clean());
            assert_eq!(f.get_components().len(), 1);
            assert_eq!(f.remove_component(&c), 2);
        }
    }

    mod strict {
        use super::*;

        #[test]
        fn overlap_is_rejected_without_changes() {
            let mut f = furniture(PlacementPolicy::Strict);
            let first = component(&[(0, 0), (1, 0)]);
            f.add_component(first.clone()).unwrap();

            let err = f.add_component(component(&[(2, 0), (1, 0)])).unwrap_err();
            assert_eq!(err, DomainError::occupied(Position::planar(1, 0)));
            assert!(!f.is_occupied(&Position::planar(2, 0)));
            assert_eq!(f.occupant(&Position::planar(1, 0)), Some(first.id()));
        }

        #[test]
        fn every_kind_of_the_furniture_type_is_accepted() {
            let mut f = furniture(PlacementPolicy::Strict);
            let white = Color::from_rgb_named(255, 255, 255, "White");
            for (x, kind) in FurnitureType::Shelving.component_types().into_iter().enumerate() {
                let c = kind.create(40, Position::planar(x as i32, 0), white.clone()).unwrap();
                assert_eq!(c.component_type(), kind);
                assert!(f.add_component(c).unwrap().is_clean());
            }
        }

        #[test]
        fn out_of_bounds_is_rejected() {
            let mut f = furniture(PlacementPolicy::Strict);
            for cell in [(4, 0), (0, 3), (-1, 0), (0, -1)] {
                let err = f.add_component(component(&[cell])).unwrap_err();
                assert!(matches!(err, DomainError::OutOfBounds { .. }), "{:?}", cell);
            }
            assert!(f.add_component(component(&[(3, 2)])).is_ok());
        }

        #[test]
        fn remove_only_clears_owned_cells() {
            let mut f = furniture(PlacementPolicy::Overwrite);
            let first = component(&[(0, 0), (1, 0)]);
            let second = component(&[(1, 0)]);
            f.add_component(first.clone()).unwrap();
            f.add_component(second.clone()).unwrap();

            let mut f = f.with_policy(PlacementPolicy::Strict);
            assert_eq!(f.remove_component(&first), 1);
            assert_eq!(f.get_component(&Position::planar(1, 0)), Some(&second));
        }
    }

    mod replace {
        use super::*;

        #[test]
        fn replacement_takes_over_cells_of_replaced() {
            let mut f = furniture(PlacementPolicy::Strict);
            let a = component(&[(0, 0)]);
            let b = component(&[(1, 0)]);
            f.add_component(a.clone()).unwrap();
            f.add_component(b.clone()).unwrap();

            let joined = component(&[(0, 0), (1, 0)]);
            f.replace_components(&[a.id(), b.id()], joined.clone()).unwrap();

            assert_eq!(f.get_components(), vec![&joined]);
            assert_eq!(f.get_component(&Position::planar(0, 0)), Some(&joined));
        }

        #[test]
        fn replacement_cannot_steal_from_others() {
            let mut f = furniture(PlacementPolicy::Strict);
            let a = component(&[(0, 0)]);
            let other = component(&[(1, 0)]);
            f.add_component(a.clone()).unwrap();
            f.add_component(other.clone()).unwrap();

            let result = f.replace_components(&[a.id()], component(&[(0, 0), (1, 0)]));
            assert!(matches!(result, Err(DomainError::Occupied { .. })));
            assert_eq!(f.get_components().len(), 2);
            assert_eq!(f.get_component(&Position::planar(0, 0)), Some(&a));
        }
    }

    mod faces {
        use super::*;

        #[test]
        fn lone_module_is_exterior_everywhere() {
            let mut f = furniture(PlacementPolicy::Strict);
            f.add_component(component(&[(1, 1)])).unwrap();
            let faces = f.exterior_faces(&Position::planar(1, 1)).unwrap();
            assert_eq!(faces.len(), 6);
        }

        #[test]
        fn shared_faces_are_interior() {
            let mut f = furniture(PlacementPolicy::Strict);
            f.add_component(component(&[(0, 0), (1, 0), (2, 0)])).unwrap();
            f.add_component(component(&[(1, 1)])).unwrap();

            let middle = f.exterior_faces(&Position::planar(1, 0)).unwrap();
            assert!(!middle.contains(&Direction::Left));
            assert!(!middle.contains(&Direction::Right));
            // Neighbour below belongs to another component
            assert!(middle.contains(&Direction::Bottom));
            assert!(middle.contains(&Direction::Top));
        }

        #[test]
        fn empty_cell_has_no_faces() {
            let f = furniture(PlacementPolicy::Strict);
            assert!(f.exterior_faces(&Position::planar(0, 0)).is_none());
        }
    }
}
