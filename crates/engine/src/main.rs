//! Modular furniture engine - scripted demo session.
//!
//! Builds a shelving unit, places a few modules, joins a row, attempts an
//! illegal join and prints the occupancy grid after each step.

use std::sync::Arc;

use mfs_domain::{ComponentType, FurnitureType, Position, ShelvingModuleKind};
use mfs_engine::grid::occupancy_grid;
use mfs_engine::infrastructure::memory::InMemoryDataService;
use mfs_engine::{Controller, EngineConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHELF_NAME: &str = "Living room shelf";

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mfs_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();
    tracing::info!(
        policy = %config.placement_policy,
        max_join_modules = config.max_join_modules,
        "Starting modular furniture engine"
    );
    let module_size = config.default_module_size;

    let store = Arc::new(InMemoryDataService::new());
    let mut controller = Controller::new(store, config)?;

    controller.set_furniture_type(FurnitureType::Shelving);
    controller.create_furniture(SHELF_NAME, 5, 3, module_size)?;
    controller.set_active_furniture(SHELF_NAME)?;
    controller.set_active_color_by_hex("#deb887")?;

    // Bottom row of closed modules, one open module on top
    controller.set_component_type(ComponentType::Shelving(ShelvingModuleKind::Closed));
    for x in 0..3 {
        controller.set_active_position(Position::planar(x, 2));
        controller.create_component()?;
    }
    controller.set_component_type(ComponentType::Shelving(ShelvingModuleKind::ClosedWithDoor));
    controller.set_active_position(Position::planar(4, 0));
    controller.create_component()?;
    print_grid(&controller, "after placement");

    for x in 0..3 {
        controller.select_component_at(Position::planar(x, 2))?;
    }
    let joined = controller.join_selected()?;
    println!("joined {} modules into one component", joined.module_count());
    print_grid(&controller, "after join");

    controller.select_component_at(Position::planar(0, 2))?;
    controller.select_component_at(Position::planar(4, 0))?;
    if let Err(e) = controller.join_selected() {
        println!("second join rejected: {}", e);
    }
    controller.clear_selection();

    if let Some(furniture) = controller.active_furniture() {
        for face in furniture
            .exterior_faces(&Position::planar(1, 2))
            .unwrap_or_default()
        {
            println!("module (1, 2) needs a {} panel", face);
        }
    }

    controller.reload()?;
    print_grid(&controller, "after reload");
    Ok(())
}

fn print_grid(controller: &Controller, label: &str) {
    if let Some(furniture) = controller.active_furniture() {
        println!("{} ({}):", furniture.name(), label);
        print!("{}", occupancy_grid(furniture));
    }
}
