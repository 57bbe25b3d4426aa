//! In-memory furniture storage.
//!
//! Keeps plain records rather than live `Furniture` values so that loading
//! always rebuilds the grid through the factories, the same way a durable
//! store would.
//!
//! Component changes are kept as an ordered log and replayed on load. Under
//! the overwrite policy a removal can clear cells another component claimed,
//! so the log keeps such removals instead of simply dropping the placement.

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use mfs_domain::{
    Color, Component, ComponentId, Furniture, FurnitureId, FurnitureName, FurnitureType,
    PlacementPolicy, Position,
};

use crate::infrastructure::ports::{DataService, DataServiceError};

#[derive(Debug, Clone)]
enum Change {
    Placed(Component),
    Removed(Component),
}

impl Change {
    fn component(&self) -> &Component {
        match self {
            Self::Placed(component) | Self::Removed(component) => component,
        }
    }
}

/// Stored shape of a furniture and the changes made to it
#[derive(Debug, Clone)]
struct FurnitureRecord {
    sequence: u64,
    name: FurnitureName,
    furniture_type: FurnitureType,
    width: u32,
    height: u32,
    module_size: u32,
    policy: PlacementPolicy,
    /// Replayed in order on load
    changes: Vec<Change>,
}

impl FurnitureRecord {
    /// IDs of components currently placed, in placement order.
    fn placed_ids(&self) -> Vec<ComponentId> {
        let mut ids: Vec<ComponentId> = Vec::new();
        for change in &self.changes {
            let id = change.component().id();
            ids.retain(|placed| *placed != id);
            if let Change::Placed(_) = change {
                ids.push(id);
            }
        }
        ids
    }

    fn is_placed(&self, id: ComponentId) -> bool {
        self.changes
            .iter()
            .rev()
            .find(|change| change.component().id() == id)
            .is_some_and(|change| matches!(change, Change::Placed(_)))
    }

    /// Whether any other logged placement shares a cell with `component`.
    fn overlaps_others(&self, component: &Component) -> bool {
        let cells: HashSet<Position> = component.positions().collect();
        self.changes.iter().any(|change| match change {
            Change::Placed(other) if other.id() != component.id() => {
                other.positions().any(|p| cells.contains(&p))
            }
            _ => false,
        })
    }

    /// Log the removal of `component`.
    ///
    /// A component that never shared a cell leaves no effect on replay, so its
    /// history is dropped outright.
    fn record_removal(&mut self, component: &Component) {
        if self.policy == PlacementPolicy::Strict || !self.overlaps_others(component) {
            let id = component.id();
            self.changes.retain(|change| change.component().id() != id);
        } else {
            self.changes.push(Change::Removed(component.clone()));
        }
    }
}

/// Thread-safe store backed by a `DashMap`.
pub struct InMemoryDataService {
    furnitures: DashMap<FurnitureId, FurnitureRecord>,
    next_sequence: AtomicU64,
    palette: Vec<Color>,
}

impl InMemoryDataService {
    /// Store serving the built-in palette.
    pub fn new() -> Self {
        Self::with_palette(default_palette())
    }

    pub fn with_palette(palette: Vec<Color>) -> Self {
        Self {
            furnitures: DashMap::new(),
            next_sequence: AtomicU64::new(0),
            palette,
        }
    }

    pub fn furniture_count(&self) -> usize {
        self.furnitures.len()
    }

    /// Stored component IDs of a furniture still placed, in placement order.
    pub fn component_ids(&self, furniture_id: FurnitureId) -> Option<Vec<ComponentId>> {
        self.furnitures
            .get(&furniture_id)
            .map(|record| record.placed_ids())
    }

    fn rebuild(id: FurnitureId, record: &FurnitureRecord) -> Result<Furniture, DataServiceError> {
        let mut furniture = record
            .furniture_type
            .create(
                record.name.clone(),
                record.width,
                record.height,
                record.module_size,
            )
            .map_err(|e| DataServiceError::storage("load_furnitures", e))?
            .with_id(id)
            .with_policy(record.policy);

        for change in &record.changes {
            match change {
                Change::Placed(component) => {
                    furniture
                        .add_component(component.clone())
                        .map_err(|e| DataServiceError::storage("load_furnitures", e))?;
                }
                Change::Removed(component) => {
                    furniture.remove_component(component);
                }
            }
        }
        Ok(furniture)
    }
}

impl Default for InMemoryDataService {
    fn default() -> Self {
        Self::new()
    }
}

impl DataService for InMemoryDataService {
    fn create_furniture(&self, furniture: &Furniture) -> Result<(), DataServiceError> {
        if self.furnitures.contains_key(&furniture.id()) {
            return Err(DataServiceError::storage(
                "create_furniture",
                format!("furniture {} is already stored", furniture.id()),
            ));
        }

        let record = FurnitureRecord {
            sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
            name: furniture.name().clone(),
            furniture_type: furniture.furniture_type(),
            width: furniture.width(),
            height: furniture.height(),
            module_size: furniture.module_size(),
            policy: furniture.policy(),
            changes: Vec::new(),
        };
        self.furnitures.insert(furniture.id(), record);
        Ok(())
    }

    fn create_component(
        &self,
        furniture: &Furniture,
        component: &Component,
    ) -> Result<(), DataServiceError> {
        let mut record = self
            .furnitures
            .get_mut(&furniture.id())
            .ok_or_else(|| DataServiceError::not_found("Furniture", furniture.id()))?;

        record.changes.push(Change::Placed(component.clone()));
        Ok(())
    }

    fn remove_component(
        &self,
        furniture: &Furniture,
        component: &Component,
    ) -> Result<(), DataServiceError> {
        let mut record = self
            .furnitures
            .get_mut(&furniture.id())
            .ok_or_else(|| DataServiceError::not_found("Furniture", furniture.id()))?;

        if !record.is_placed(component.id()) {
            return Err(DataServiceError::not_found("Component", component.id()));
        }
        record.record_removal(component);
        Ok(())
    }

    /// Applies the whole swap under one entry lock, or nothing at all.
    fn replace_components(
        &self,
        furniture: &Furniture,
        old: &[Component],
        replacement: &Component,
    ) -> Result<(), DataServiceError> {
        let mut record = self
            .furnitures
            .get_mut(&furniture.id())
            .ok_or_else(|| DataServiceError::not_found("Furniture", furniture.id()))?;

        if let Some(missing) = old.iter().find(|part| !record.is_placed(part.id())) {
            return Err(DataServiceError::not_found("Component", missing.id()));
        }
        for part in old {
            record.record_removal(part);
        }
        record.changes.push(Change::Placed(replacement.clone()));
        Ok(())
    }

    fn available_colors(&self) -> Result<Vec<Color>, DataServiceError> {
        Ok(self.palette.clone())
    }

    fn load_furnitures(&self) -> Result<Vec<Furniture>, DataServiceError> {
        let mut records: Vec<(FurnitureId, FurnitureRecord)> = self
            .furnitures
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        records.sort_by_key(|(_, record)| record.sequence);

        records
            .iter()
            .map(|(id, record)| Self::rebuild(*id, record))
            .collect()
    }
}

/// Finishes offered when no catalog is supplied.
pub fn default_palette() -> Vec<Color> {
    [
        (255, 255, 255, "White"),
        (33, 33, 33, "Graphite"),
        (158, 158, 158, "Grey"),
        (222, 184, 135, "Oak"),
        (139, 69, 19, "Walnut"),
        (178, 34, 34, "Red"),
    ]
    .into_iter()
    .map(|(r, g, b, name)| Color::from_rgb_named(r, g, b, name))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfs_domain::{ComponentType, ShelvingModuleKind};
    use std::collections::HashMap;

    fn furniture(name: &str) -> Furniture {
        FurnitureType::Shelving
            .create(FurnitureName::new(name).unwrap(), 3, 2, 40)
            .unwrap()
            .with_policy(PlacementPolicy::Strict)
    }

    fn component(x: i32, y: i32) -> Component {
        ComponentType::Shelving(ShelvingModuleKind::Closed)
            .create(40, Position::planar(x, y), Color::from_rgb(222, 184, 135))
            .unwrap()
    }

    #[test]
    fn serves_default_palette() {
        let store = InMemoryDataService::new();
        let colors = store.available_colors().unwrap();
        assert!(!colors.is_empty());
        assert!(colors.iter().any(|c| c.name() == "Walnut"));
    }

    #[test]
    fn serves_supplied_palette() {
        let store = InMemoryDataService::with_palette(vec![Color::from_rgb(1, 2, 3)]);
        assert_eq!(store.available_colors().unwrap(), vec![Color::from_rgb(1, 2, 3)]);
    }

    #[test]
    fn load_rebuilds_furniture_with_components() {
        let store = InMemoryDataService::new();
        let mut shelf = furniture("Shelf");
        store.create_furniture(&shelf).unwrap();

        let a = component(0, 0);
        let b = component(1, 1);
        for c in [&a, &b] {
            shelf.add_component(c.clone()).unwrap();
            store.create_component(&shelf, c).unwrap();
        }

        let loaded = store.load_furnitures().unwrap();
        assert_eq!(loaded.len(), 1);
        let restored = &loaded[0];
        assert_eq!(restored.id(), shelf.id());
        assert_eq!(restored.name().as_str(), "Shelf");
        assert_eq!(restored.policy(), PlacementPolicy::Strict);
        assert_eq!(restored.get_component(&Position::planar(0, 0)), Some(&a));
        assert_eq!(restored.get_component(&Position::planar(1, 1)), Some(&b));
        assert_eq!(restored.get_components().len(), 2);
    }

    #[test]
    fn load_keeps_creation_order() {
        let store = InMemoryDataService::new();
        for name in ["First", "Second", "Third"] {
            store.create_furniture(&furniture(name)).unwrap();
        }
        let names: Vec<String> = store
            .load_furnitures()
            .unwrap()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn removed_component_is_not_reloaded() {
        let store = InMemoryDataService::new();
        let shelf = furniture("Shelf");
        store.create_furniture(&shelf).unwrap();
        let c = component(2, 0);
        store.create_component(&shelf, &c).unwrap();

        store.remove_component(&shelf, &c).unwrap();
        assert_eq!(store.component_ids(shelf.id()), Some(vec![]));
        assert!(store.load_furnitures().unwrap()[0].get_components().is_empty());
    }

    #[test]
    fn unknown_targets_are_not_found() {
        let store = InMemoryDataService::new();
        let shelf = furniture("Shelf");
        let c = component(0, 0);
        assert!(store.create_component(&shelf, &c).unwrap_err().is_not_found());

        store.create_furniture(&shelf).unwrap();
        assert!(store.remove_component(&shelf, &c).unwrap_err().is_not_found());
    }

    #[test]
    fn storing_same_furniture_twice_fails() {
        let store = InMemoryDataService::new();
        let shelf = furniture("Shelf");
        store.create_furniture(&shelf).unwrap();
        assert!(matches!(
            store.create_furniture(&shelf),
            Err(DataServiceError::Storage { .. })
        ));
        assert_eq!(store.furniture_count(), 1);
    }

    fn occupancy(furniture: &Furniture) -> HashMap<Position, ComponentId> {
        furniture
            .occupied_positions()
            .filter_map(|p| furniture.occupant(p).map(|id| (*p, id)))
            .collect()
    }

    #[test]
    fn overwrite_history_replays_exactly() {
        let store = InMemoryDataService::new();
        let mut shelf = furniture("Shelf").with_policy(PlacementPolicy::Overwrite);
        store.create_furniture(&shelf).unwrap();

        let wide = Component::try_join(&[component(0, 0), component(1, 0)], 8).unwrap();
        let cover = component(1, 0);
        for c in [&wide, &cover] {
            shelf.add_component(c.clone()).unwrap();
            store.create_component(&shelf, c).unwrap();
        }
        store.remove_component(&shelf, &cover).unwrap();
        shelf.remove_component(&cover);

        let loaded = store.load_furnitures().unwrap();
        assert_eq!(occupancy(&loaded[0]), occupancy(&shelf));
        assert!(!loaded[0].is_occupied(&Position::planar(1, 0)));
    }

    #[test]
    fn replace_is_all_or_nothing() {
        let store = InMemoryDataService::new();
        let shelf = furniture("Shelf");
        store.create_furniture(&shelf).unwrap();
        let a = component(0, 0);
        let b = component(1, 0);
        store.create_component(&shelf, &a).unwrap();

        let joined = Component::try_join(&[a.clone(), b.clone()], 8).unwrap();
        let err = store
            .replace_components(&shelf, &[a.clone(), b], &joined)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.component_ids(shelf.id()), Some(vec![a.id()]));

        let single = component(2, 0);
        store
            .replace_components(&shelf, &[a], &single)
            .unwrap();
        assert_eq!(store.component_ids(shelf.id()), Some(vec![single.id()]));
    }
}
