//! Repository pattern implementation for data access
//!
//! Repositories own the SQL. Writes take the caller's [`Clock`](crate::utils::Clock)
//! and read it once the write lock is held, so the caller decides what "now"
//! means for every write and for the expiry predicate.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tileboard::repositories::{SqliteTileRepository, TileRepository};
//!
//! async fn example(database: tileboard::database::Database) -> tileboard::errors::AppResult<()> {
//!     let repo = SqliteTileRepository::new(&database);
//!     let active = repo.find_active().await?;
//!     println!("{} active tiles", active.len());
//!     Ok(())
//! }
//! ```

pub mod settings;
pub mod tile;
pub mod traits;

// Re-export main traits and types
pub use settings::SettingsRepository;
pub use tile::SqliteTileRepository;
pub use traits::*;
