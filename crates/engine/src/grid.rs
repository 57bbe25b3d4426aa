//! Plain-text occupancy view of a furniture.

use std::collections::HashMap;

use mfs_domain::{ComponentId, Furniture, Position};

const EMPTY_CELL: char = '.';
const LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Render the `z = 0` layer row by row, top row first.
///
/// Each component gets a letter in reading order of its first cell; cells of
/// the same component share a letter. Empty cells print as `.` and components
/// beyond the label set print as `#`.
pub fn occupancy_grid(furniture: &Furniture) -> String {
    let mut labels: HashMap<ComponentId, char> = HashMap::new();
    let mut out = String::new();

    for y in 0..furniture.height() {
        for x in 0..furniture.width() {
            let cell = match (i32::try_from(x), i32::try_from(y)) {
                (Ok(x), Ok(y)) => furniture.occupant(&Position::planar(x, y)),
                _ => None,
            };
            let symbol = match cell {
                Some(id) => {
                    let next = labels.len();
                    *labels.entry(id).or_insert_with(|| {
                        LABELS.get(next).map(|b| char::from(*b)).unwrap_or('#')
                    })
                }
                None => EMPTY_CELL,
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfs_domain::{Color, ComponentType, FurnitureName, FurnitureType, ShelvingModuleKind};

    fn shelf(width: u32, height: u32) -> Furniture {
        FurnitureType::Shelving
            .create(FurnitureName::new("Shelf").unwrap(), width, height, 40)
            .unwrap()
    }

    fn place(furniture: &mut Furniture, x: i32, y: i32) {
        let component = ComponentType::Shelving(ShelvingModuleKind::Open)
            .create(40, Position::planar(x, y), Color::from_rgb(0, 0, 0))
            .unwrap();
        furniture.add_component(component).unwrap();
    }

    #[test]
    fn empty_furniture_renders_dots() {
        assert_eq!(occupancy_grid(&shelf(3, 2)), "...\n...\n");
    }

    #[test]
    fn components_get_letters_in_reading_order() {
        let mut f = shelf(3, 2);
        place(&mut f, 2, 0);
        place(&mut f, 0, 1);
        assert_eq!(occupancy_grid(&f), "..A\nB..\n");
    }
}
