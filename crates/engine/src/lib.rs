//! Modular furniture engine library.
//!
//! Drives the pure `mfs-domain` types on behalf of a user session.
//!
//! ## Structure
//!
//! - `controller` - Session state and the operations a UI triggers
//! - `infrastructure/` - Persistence port and its in-memory adapter
//! - `config` - Environment-driven settings
//! - `grid` - Text rendering of a furniture's occupancy

pub mod config;
pub mod controller;
pub mod grid;
pub mod infrastructure;

pub use config::EngineConfig;
pub use controller::{Controller, ControllerError};
