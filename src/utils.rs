//! Utility functions for the tile board
//!
//! - `utils::datetime` for timestamp storage and formatting
//! - `utils::clock` for the injectable time source used by the store

pub mod clock;
pub mod datetime;

pub use clock::{Clock, ManualClock, SystemClock};
pub use datetime::DateTimeParser;
