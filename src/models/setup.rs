//! Setup settings stored in the `settings` table

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

pub const SETTING_SETUP_COMPLETED: &str = "setup_completed";
pub const SETTING_DASHBOARD_TITLE: &str = "dashboard_title";
pub const SETTING_TILE_LIFETIME_HOURS: &str = "tile_lifetime_hours";

/// Whether the board has been initialised, and why not if it hasn't
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupStatus {
    pub completed: bool,
    pub reason: Option<String>,
}

impl SetupStatus {
    pub fn completed() -> Self {
        Self {
            completed: true,
            reason: None,
        }
    }

    pub fn required(reason: impl Into<String>) -> Self {
        Self {
            completed: false,
            reason: Some(reason.into()),
        }
    }

    /// Interpret the stored `setup_completed` value
    pub fn from_setting(value: Option<&str>) -> Self {
        match value {
            None => Self::required("Setup completion status not found"),
            Some("true") => Self::completed(),
            Some(_) => Self::required("Setup not marked as completed"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    pub dashboard_title: Option<String>,
    #[serde(alias = "tileLifetime")]
    pub tile_lifetime_hours: Option<u32>,
}

impl SetupRequest {
    pub fn new(dashboard_title: impl Into<String>, tile_lifetime_hours: u32) -> Self {
        Self {
            dashboard_title: Some(dashboard_title.into()),
            tile_lifetime_hours: Some(tile_lifetime_hours),
        }
    }

    /// Returns the title and lifetime, both of which are required
    pub fn validate(&self) -> AppResult<(String, u32)> {
        match (self.dashboard_title.as_deref(), self.tile_lifetime_hours) {
            (Some(title), Some(hours)) if !title.is_empty() => Ok((title.to_string(), hours)),
            _ => Err(AppError::validation(
                "dashboardTitle, tileLifetime",
                "Missing required fields: dashboardTitle, tileLifetime",
            )),
        }
    }
}
