use mfs_domain::{Color, Component, Furniture};

use super::DataServiceError;

// =============================================================================
// Furniture Storage
// =============================================================================

/// Where furniture and their components are kept between sessions.
///
/// Removal and loading are optional capabilities; stores that lack them keep
/// the default bodies, which report [`DataServiceError::Unsupported`].
///
/// Loading must give back the furniture as the session left it. Under the
/// overwrite policy that means applying creations and removals in the order
/// they were made, since a removal may clear cells another component claimed.
#[cfg_attr(test, mockall::automock)]
pub trait DataService: Send + Sync {
    fn create_furniture(&self, furniture: &Furniture) -> Result<(), DataServiceError>;

    fn create_component(
        &self,
        furniture: &Furniture,
        component: &Component,
    ) -> Result<(), DataServiceError>;

    fn remove_component(
        &self,
        _furniture: &Furniture,
        _component: &Component,
    ) -> Result<(), DataServiceError> {
        Err(DataServiceError::Unsupported("remove_component"))
    }

    /// Swap `old` for `replacement` in one step.
    ///
    /// The default removes each part and then creates the replacement. When a
    /// step fails, the parts already removed are created again before the
    /// error is returned. Stores that can do this atomically should override it.
    fn replace_components(
        &self,
        furniture: &Furniture,
        old: &[Component],
        replacement: &Component,
    ) -> Result<(), DataServiceError> {
        let mut removed = 0;
        let mut outcome = Ok(());
        for part in old {
            outcome = self.remove_component(furniture, part);
            if outcome.is_err() {
                break;
            }
            removed += 1;
        }
        if outcome.is_ok() {
            outcome = self.create_component(furniture, replacement);
        }

        if outcome.is_err() {
            for part in old.iter().take(removed) {
                if let Err(e) = self.create_component(furniture, part) {
                    tracing::error!(
                        furniture = %furniture.name(),
                        component = %part.id(),
                        error = %e,
                        "Removed component could not be restored"
                    );
                }
            }
        }
        outcome
    }

    /// Colors a user may pick from.
    fn available_colors(&self) -> Result<Vec<Color>, DataServiceError>;

    /// Every stored furniture, rebuilt with its components placed.
    fn load_furnitures(&self) -> Result<Vec<Furniture>, DataServiceError> {
        Err(DataServiceError::Unsupported("load_furnitures"))
    }
}
