//! Business logic layered over the repositories

pub mod setup;
pub mod tile_store;

pub use setup::SetupGate;
pub use tile_store::TileStore;
