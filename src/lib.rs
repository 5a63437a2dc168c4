pub mod catalog;
pub mod colony;
pub mod config;
pub mod error;
pub mod generator;
pub mod hex;
pub mod map;
pub mod placement;
pub mod resources;
pub mod rng;
pub mod scenario;
pub mod session;
pub mod terraform;
pub mod terrain;
pub mod tile;

pub use catalog::{BuildingCatalog, BuildingType};
pub use colony::Colony;
pub use config::GeneratorConfig;
pub use generator::WorldGenerator;
pub use hex::HexCoord;
pub use map::TileMap;
pub use resources::{Resource, ResourceVector};
pub use session::{Session, TickSummary};
