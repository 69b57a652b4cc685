//! Tile model, upsert request validation and the fixed expiry window

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{AppError, AppResult};
use crate::utils::datetime::{serialize_datetime, serialize_optional_datetime};

/// Hours an auto-expiring tile stays active after its last upsert
pub const TILE_LIFETIME_HOURS: i64 = 24;

pub const DEFAULT_ICON: &str = "📊";
pub const DEFAULT_TILE_TYPE: &str = "standard";
pub const DEFAULT_STATUS: &str = "info";
pub const DEFAULT_CURRENT_VALUE: f64 = 0.0;
pub const DEFAULT_MAX_VALUE: f64 = 100.0;
pub const DEFAULT_PRIORITY: i64 = 50;

/// Expiry timestamp for a tile written at `now`; `None` when the tile never expires
pub fn expiry_for(now: DateTime<Utc>, auto_expire: bool) -> Option<DateTime<Utc>> {
    auto_expire.then(|| now + Duration::hours(TILE_LIFETIME_HOURS))
}

/// A status record rendered on the board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub tile_id: String,
    pub title: String,
    pub icon: String,
    pub tile_type: String,
    pub value: String,
    pub sub_value: String,
    pub status: String,
    pub status_text: String,
    pub additional_info: String,
    pub current_value: f64,
    pub max_value: f64,
    pub priority: i64,
    pub auto_expire: bool,
    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_optional_datetime")]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Tile {
    /// True once the expiry window has passed, regardless of whether a sweep ran yet
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.auto_expire && self.expires_at.is_some_and(|expires| expires < now)
    }
}

/// Insert-or-update payload as received from the API layer
///
/// Every field is optional on the wire; [`TileUpsertRequest::validate`]
/// enforces the required ones and fills in defaults for the rest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TileUpsertRequest {
    #[serde(alias = "id")]
    pub tile_id: Option<String>,
    pub title: Option<String>,
    pub value: Option<String>,
    pub icon: Option<String>,
    pub tile_type: Option<String>,
    pub sub_value: Option<String>,
    pub status: Option<String>,
    pub status_text: Option<String>,
    pub additional_info: Option<String>,
    pub current_value: Option<f64>,
    pub max_value: Option<f64>,
    pub priority: Option<i64>,
    pub auto_expire: Option<bool>,
}

impl TileUpsertRequest {
    /// Request carrying only the required fields
    pub fn new(
        tile_id: impl Into<String>,
        title: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            tile_id: Some(tile_id.into()),
            title: Some(title.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_auto_expire(mut self, auto_expire: bool) -> Self {
        self.auto_expire = Some(auto_expire);
        self
    }

    pub fn with_progress(mut self, current_value: f64, max_value: f64) -> Self {
        self.current_value = Some(current_value);
        self.max_value = Some(max_value);
        self
    }

    /// Check required fields and resolve defaults
    pub fn validate(self) -> AppResult<TileFields> {
        let missing: Vec<&str> = [
            ("id", &self.tile_id),
            ("title", &self.title),
            ("value", &self.value),
        ]
        .into_iter()
        .filter(|(_, field)| field.as_deref().map_or(true, str::is_empty))
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(AppError::validation(
                missing.join(", "),
                "Missing required fields: id, title, value",
            ));
        }

        Ok(TileFields {
            tile_id: self.tile_id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            value: self.value.unwrap_or_default(),
            icon: self.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            tile_type: self.tile_type.unwrap_or_else(|| DEFAULT_TILE_TYPE.to_string()),
            sub_value: self.sub_value.unwrap_or_default(),
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            status_text: self.status_text.unwrap_or_default(),
            additional_info: self.additional_info.unwrap_or_default(),
            current_value: self.current_value.unwrap_or(DEFAULT_CURRENT_VALUE),
            max_value: self.max_value.unwrap_or(DEFAULT_MAX_VALUE),
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            auto_expire: self.auto_expire.unwrap_or(true),
        })
    }
}

/// Validated, fully-defaulted tile content; everything an upsert overwrites
#[derive(Debug, Clone, PartialEq)]
pub struct TileFields {
    pub tile_id: String,
    pub title: String,
    pub value: String,
    pub icon: String,
    pub tile_type: String,
    pub sub_value: String,
    pub status: String,
    pub status_text: String,
    pub additional_info: String,
    pub current_value: f64,
    pub max_value: f64,
    pub priority: i64,
    pub auto_expire: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertAction::Created => write!(f, "created"),
            UpsertAction::Updated => write!(f, "updated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertOutcome {
    pub tile_id: String,
    pub action: UpsertAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveOutcome {
    pub tile_id: String,
    pub removed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    pub expired_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub active_tiles: i64,
    #[serde(serialize_with = "serialize_datetime")]
    pub timestamp: DateTime<Utc>,
}
