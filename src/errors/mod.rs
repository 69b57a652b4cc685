//! Centralized error handling for the tile board
//!
//! # Error Categories
//!
//! - **Validation Errors**: missing or empty required input, reported with the
//!   offending field so the caller can correct it
//! - **Not Found Errors**: unknown tile identity on lookup or removal
//! - **Store Errors**: SQLite failures (connection loss, constraint violation,
//!   I/O), surfaced unchanged and never retried
//!
//! # Usage
//!
//! ```rust
//! use tileboard::errors::{AppError, AppResult};
//!
//! fn require_title(title: &str) -> AppResult<()> {
//!     if title.is_empty() {
//!         return Err(AppError::validation("title", "title is required"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
