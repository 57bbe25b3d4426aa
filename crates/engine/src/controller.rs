//! Session controller - the operations a configurator UI triggers.
//!
//! Holds the furniture list, the color palette, the chosen factories and the
//! active furniture/position/color. Every change is validated on a staged
//! copy of the furniture, persisted through the [`DataService`], and only then
//! committed, so a failed store call leaves the session untouched.

use std::sync::Arc;

use mfs_domain::{
    Color, Component, ComponentId, ComponentType, DomainError, Furniture, FurnitureId,
    FurnitureName, FurnitureType, JoinError, Position,
};

use crate::config::EngineConfig;
use crate::infrastructure::ports::{DataService, DataServiceError};

/// Errors surfaced to the caller of a controller operation
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Join failed: {0}")]
    Join(#[from] JoinError),

    #[error(transparent)]
    DataService(#[from] DataServiceError),

    /// A factory or active value the operation needs was never set
    #[error("No {0} selected")]
    NotConfigured(&'static str),

    #[error("Furniture not found: {0}")]
    FurnitureNotFound(String),

    #[error("Furniture with the same name already exists: {0}")]
    DuplicateFurniture(String),
}

pub struct Controller {
    data_service: Arc<dyn DataService>,
    config: EngineConfig,
    furnitures: Vec<Furniture>,
    colors: Vec<Color>,
    furniture_type: Option<FurnitureType>,
    component_type: Option<ComponentType>,
    active_furniture: Option<FurnitureId>,
    active_position: Option<Position>,
    active_color: Option<Color>,
    selection: Vec<ComponentId>,
}

impl Controller {
    /// Create a controller and fetch the available colors.
    pub fn new(
        data_service: Arc<dyn DataService>,
        config: EngineConfig,
    ) -> Result<Self, ControllerError> {
        let colors = data_service.available_colors()?;
        tracing::debug!(colors = colors.len(), "Loaded available colors");

        Ok(Self {
            data_service,
            config,
            furnitures: Vec::new(),
            colors,
            furniture_type: None,
            component_type: None,
            active_furniture: None,
            active_position: None,
            active_color: None,
            selection: Vec::new(),
        })
    }

    // =========================================================================
    // Session setup
    // =========================================================================

    pub fn set_furniture_type(&mut self, furniture_type: FurnitureType) {
        self.furniture_type = Some(furniture_type);
    }

    pub fn set_component_type(&mut self, component_type: ComponentType) {
        self.component_type = Some(component_type);
    }

    pub fn set_active_color(&mut self, color: Color) {
        self.active_color = Some(color);
    }

    /// Pick a palette color by its hex code.
    ///
    /// # Errors
    ///
    /// - `DomainError::Parse` for a malformed hex string
    /// - `DomainError::Validation` when the color is not in the palette
    pub fn set_active_color_by_hex(&mut self, hex: &str) -> Result<(), ControllerError> {
        let wanted = Color::from_hex(hex)?;
        let color = self
            .colors
            .iter()
            .find(|c| c.hex() == wanted.hex())
            .cloned()
            .ok_or_else(|| {
                DomainError::validation(format!("Color {} is not available", wanted.hex()))
            })?;
        self.active_color = Some(color);
        Ok(())
    }

    pub fn set_active_position(&mut self, position: Position) {
        self.active_position = Some(position);
    }

    /// Make the furniture called `name` the target of later operations.
    ///
    /// Switching furniture drops the current selection.
    pub fn set_active_furniture(&mut self, name: &str) -> Result<(), ControllerError> {
        let furniture = self
            .furnitures
            .iter()
            .find(|f| f.name().as_str() == name.trim())
            .ok_or_else(|| ControllerError::FurnitureNotFound(name.to_string()))?;

        self.active_furniture = Some(furniture.id());
        self.selection.clear();
        tracing::debug!(furniture = %furniture.name(), "Active furniture changed");
        Ok(())
    }

    // =========================================================================
    // Furniture and components
    // =========================================================================

    /// Build a furniture with the selected furniture factory and store it.
    ///
    /// The new furniture uses the configured placement policy. It does not
    /// become active.
    pub fn create_furniture(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        module_size: u32,
    ) -> Result<FurnitureId, ControllerError> {
        let name = FurnitureName::new(name)?;
        if self.furnitures.iter().any(|f| f.name() == &name) {
            return Err(ControllerError::DuplicateFurniture(name.to_string()));
        }
        let factory = self
            .furniture_type
            .ok_or(ControllerError::NotConfigured("furniture type"))?;

        let furniture = factory
            .create(name, width, height, module_size)?
            .with_policy(self.config.placement_policy);
        self.data_service.create_furniture(&furniture)?;

        tracing::info!(
            furniture = %furniture.name(),
            furniture_type = %factory,
            width,
            height,
            module_size,
            "Furniture created"
        );
        let id = furniture.id();
        self.furnitures.push(furniture);
        Ok(id)
    }

    /// Place a single-module component at the active position of the active
    /// furniture, using the selected component type and active color.
    pub fn create_component(&mut self) -> Result<Component, ControllerError> {
        let component_type = self
            .component_type
            .ok_or(ControllerError::NotConfigured("component type"))?;
        let position = self
            .active_position
            .ok_or(ControllerError::NotConfigured("active position"))?;
        let color = self
            .active_color
            .clone()
            .ok_or(ControllerError::NotConfigured("active color"))?;
        let furniture = find_mut(&mut self.furnitures, self.active_furniture)?;

        let component = component_type.create(furniture.module_size(), position, color)?;
        let mut staged = furniture.clone();
        let placement = staged.add_component(component.clone())?;
        self.data_service.create_component(&staged, &component)?;

        if !placement.is_clean() {
            tracing::warn!(
                furniture = %staged.name(),
                position = %position,
                displaced = placement.displaced.len(),
                "Component overwrote existing cells"
            );
        }
        tracing::info!(
            furniture = %staged.name(),
            position = %position,
            component_type = %component_type,
            "Component created"
        );
        *furniture = staged;
        Ok(component)
    }

    /// Remove the component covering `position` on the active furniture.
    ///
    /// Returns the removed component, or `None` when the cell is empty.
    pub fn remove_component_at(
        &mut self,
        position: Position,
    ) -> Result<Option<Component>, ControllerError> {
        let furniture = find_mut(&mut self.furnitures, self.active_furniture)?;
        let Some(component) = furniture.get_component(&position).cloned() else {
            return Ok(None);
        };

        self.data_service.remove_component(furniture, &component)?;
        let cleared = furniture.remove_component(&component);
        self.selection.retain(|id| *id != component.id());

        tracing::info!(
            furniture = %furniture.name(),
            position = %position,
            cleared,
            "Component removed"
        );
        Ok(Some(component))
    }

    // =========================================================================
    // Selection and join
    // =========================================================================

    /// Add the component covering `position` to the selection.
    ///
    /// Returns `false` when the cell is empty.
    pub fn select_component_at(&mut self, position: Position) -> Result<bool, ControllerError> {
        let furniture = find(&self.furnitures, self.active_furniture)?;
        let Some(id) = furniture.occupant(&position) else {
            return Ok(false);
        };
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        Ok(true)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected components still present on the active furniture.
    pub fn selected_components(&self) -> Vec<&Component> {
        match find(&self.furnitures, self.active_furniture) {
            Ok(furniture) => self
                .selection
                .iter()
                .filter_map(|id| furniture.component(*id))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Merge the selected components into one when their modules form a
    /// single chain along some axis.
    ///
    /// The old components are removed from storage and the joined one is
    /// created before the furniture is updated. The selection is cleared on
    /// success.
    pub fn join_selected(&mut self) -> Result<Component, ControllerError> {
        let furniture = find_mut(&mut self.furnitures, self.active_furniture)?;
        let parts: Vec<Component> = self
            .selection
            .iter()
            .filter_map(|id| furniture.component(*id).cloned())
            .collect();

        let joined = match Component::try_join(&parts, self.config.max_join_modules) {
            Ok(joined) => joined,
            Err(e) => {
                tracing::warn!(
                    furniture = %furniture.name(),
                    components = parts.len(),
                    error = %e,
                    "Join rejected"
                );
                return Err(e.into());
            }
        };

        let old_ids: Vec<ComponentId> = parts.iter().map(Component::id).collect();
        let mut staged = furniture.clone();
        staged.replace_components(&old_ids, joined.clone())?;

        if let Err(e) = self
            .data_service
            .replace_components(&staged, &parts, &joined)
        {
            tracing::error!(
                furniture = %staged.name(),
                components = parts.len(),
                error = %e,
                "Joined component could not be stored"
            );
            return Err(e.into());
        }

        tracing::info!(
            furniture = %staged.name(),
            components = parts.len(),
            modules = joined.module_count(),
            "Components joined"
        );
        *furniture = staged;
        self.selection.clear();
        Ok(joined)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Replace the furniture list with what the store holds.
    ///
    /// The active furniture survives when the store still has it; the
    /// selection is always dropped.
    pub fn reload(&mut self) -> Result<(), ControllerError> {
        let furnitures = self.data_service.load_furnitures()?;
        tracing::info!(furnitures = furnitures.len(), "Furniture list reloaded");

        self.active_furniture = self
            .active_furniture
            .filter(|id| furnitures.iter().any(|f| f.id() == *id));
        self.furnitures = furnitures;
        self.selection.clear();
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn furnitures(&self) -> &[Furniture] {
        &self.furnitures
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn active_furniture(&self) -> Option<&Furniture> {
        find(&self.furnitures, self.active_furniture).ok()
    }

    pub fn active_position(&self) -> Option<Position> {
        self.active_position
    }

    pub fn active_color(&self) -> Option<&Color> {
        self.active_color.as_ref()
    }

    pub fn furniture_type(&self) -> Option<FurnitureType> {
        self.furniture_type
    }

    pub fn component_type(&self) -> Option<ComponentType> {
        self.component_type
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn find(furnitures: &[Furniture], id: Option<FurnitureId>) -> Result<&Furniture, ControllerError> {
    let id = id.ok_or(ControllerError::NotConfigured("active furniture"))?;
    furnitures
        .iter()
        .find(|f| f.id() == id)
        .ok_or_else(|| ControllerError::FurnitureNotFound(id.to_string()))
}

fn find_mut(
    furnitures: &mut [Furniture],
    id: Option<FurnitureId>,
) -> Result<&mut Furniture, ControllerError> {
    let id = id.ok_or(ControllerError::NotConfigured("active furniture"))?;
    furnitures
        .iter_mut()
        .find(|f| f.id() == id)
        .ok_or_else(|| ControllerError::FurnitureNotFound(id.to_string()))
}
