//! Status-board tile store
//!
//! Clients push named tiles (value, status, icon, expiry) and the board shows
//! the active set. Auto-expiring tiles are deactivated by a periodic sweep
//! once their fixed 24 hour window has passed.

pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod scheduler;
pub mod services;
pub mod utils;
