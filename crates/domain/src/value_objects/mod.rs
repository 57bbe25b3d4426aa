//! Value objects - Immutable objects defined by their attributes

mod color;
mod names;
mod position;

pub use color::{hex_to_rgb, rgb_to_hex, Color, Rgb};
pub use names::FurnitureName;
pub use position::{Axis, Direction, Position};
