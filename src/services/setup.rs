//! Setup gate
//!
//! Whether the board has been initialised is read from the `settings` table
//! once at startup and cached here. The cache is only changed by a successful
//! [`SetupGate::complete`], so request paths never hit the database to check it.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppResult;
use crate::models::{SetupRequest, SetupStatus, SETTING_SETUP_COMPLETED};
use crate::repositories::SettingsRepository;

#[derive(Clone)]
pub struct SetupGate {
    settings: SettingsRepository,
    status: Arc<RwLock<SetupStatus>>,
}

impl SetupGate {
    /// Read the stored setup state and cache it
    pub async fn load(settings: SettingsRepository) -> AppResult<Self> {
        let stored = settings.get(SETTING_SETUP_COMPLETED).await?;
        let status = SetupStatus::from_setting(stored.as_deref());

        match &status.reason {
            None => info!("Setup verified"),
            Some(reason) => info!("Setup required: {}", reason),
        }

        Ok(Self {
            settings,
            status: Arc::new(RwLock::new(status)),
        })
    }

    pub async fn status(&self) -> SetupStatus {
        self.status.read().await.clone()
    }

    pub async fn is_completed(&self) -> bool {
        self.status.read().await.completed
    }

    /// Persist the setup choices, then mark the cached state completed
    ///
    /// On failure the cached state is left untouched.
    pub async fn complete(&self, request: &SetupRequest) -> AppResult<SetupStatus> {
        let (dashboard_title, tile_lifetime_hours) = request.validate()?;
        self.settings
            .complete_setup(&dashboard_title, tile_lifetime_hours, Utc::now())
            .await?;

        let completed = SetupStatus::completed();
        *self.status.write().await = completed.clone();
        info!("Board '{}' initialized", dashboard_title);
        Ok(completed)
    }

    pub async fn settings(&self) -> AppResult<BTreeMap<String, String>> {
        self.settings.all().await
    }
}
