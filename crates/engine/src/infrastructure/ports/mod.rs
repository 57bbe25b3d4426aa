//! Port traits for infrastructure boundaries.
//!
//! The persistence port is the only abstraction in the engine; everything
//! else is concrete types.

mod error;
mod repos;

pub use error::DataServiceError;
pub use repos::DataService;

#[cfg(test)]
pub use repos::MockDataService;
