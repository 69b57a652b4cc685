pub mod setup;
pub mod tile;

pub use setup::*;
pub use tile::*;
