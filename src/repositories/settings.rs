//! Key/value settings repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{
    SETTING_DASHBOARD_TITLE, SETTING_SETUP_COMPLETED, SETTING_TILE_LIFETIME_HOURS,
};
use crate::utils::datetime::DateTimeParser;

const UPSERT_SETTING: &str = r#"
    INSERT INTO settings (key, value, updated_at)
    VALUES (?, ?, ?)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
"#;

#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Sqlite>,
    write_lock: Arc<Mutex<()>>,
}

impl SettingsRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool(),
            write_lock: database.write_lock(),
        }
    }

    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    pub async fn all(&self) -> AppResult<BTreeMap<String, String>> {
        let rows = sqlx::query("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;

        let mut settings: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            settings.insert(row.try_get("key")?, row.try_get("value")?);
        }
        Ok(settings)
    }

    pub async fn put(&self, key: &str, value: &str, now: DateTime<Utc>) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        sqlx::query(UPSERT_SETTING)
            .bind(key)
            .bind(value)
            .bind(DateTimeParser::format_for_storage(&now))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record the setup choices and mark setup completed, all or nothing
    pub async fn complete_setup(
        &self,
        dashboard_title: &str,
        tile_lifetime_hours: u32,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let now_str = DateTimeParser::format_for_storage(&now);
        let lifetime = tile_lifetime_hours.to_string();
        let entries = [
            (SETTING_DASHBOARD_TITLE, dashboard_title),
            (SETTING_TILE_LIFETIME_HOURS, lifetime.as_str()),
            (SETTING_SETUP_COMPLETED, "true"),
        ];

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(UPSERT_SETTING)
                .bind(key)
                .bind(value)
                .bind(&now_str)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
