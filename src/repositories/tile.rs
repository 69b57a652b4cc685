//! SQLite tile repository
//!
//! Upserts run inside one transaction that starts with a write
//! (`INSERT ... ON CONFLICT(tile_id) DO NOTHING`) while holding the database
//! write lock. The `UNIQUE` constraint on `tile_id` is the final word on
//! identity; the lock only keeps concurrent writers from tripping over
//! SQLite lock upgrades.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::traits::TileRepository;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{expiry_for, Tile, TileFields, UpsertAction};
use crate::utils::clock::Clock;
use crate::utils::datetime::DateTimeParser;

const TILE_COLUMNS: &str = "tile_id, title, icon, tile_type, value, sub_value, status, \
     status_text, additional_info, current_value, max_value, priority, auto_expire, \
     created_at, updated_at, expires_at, is_active";

pub struct SqliteTileRepository {
    pool: Pool<Sqlite>,
    write_lock: Arc<Mutex<()>>,
}

impl SqliteTileRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool(),
            write_lock: database.write_lock(),
        }
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTimeParser::parse_flexible(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn tile_from_row(row: &SqliteRow) -> Result<Tile, sqlx::Error> {
    let expires_at = row
        .try_get::<Option<String>, _>("expires_at")?
        .map(|value| parse_timestamp(&value))
        .transpose()?;

    Ok(Tile {
        tile_id: row.try_get("tile_id")?,
        title: row.try_get("title")?,
        icon: row.try_get("icon")?,
        tile_type: row.try_get("tile_type")?,
        value: row.try_get("value")?,
        sub_value: row.try_get("sub_value")?,
        status: row.try_get("status")?,
        status_text: row.try_get("status_text")?,
        additional_info: row.try_get("additional_info")?,
        current_value: row.try_get("current_value")?,
        max_value: row.try_get("max_value")?,
        priority: row.try_get("priority")?,
        auto_expire: row.try_get("auto_expire")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
        expires_at,
        is_active: row.try_get("is_active")?,
    })
}

#[async_trait]
impl TileRepository for SqliteTileRepository {
    async fn upsert(&self, fields: &TileFields, clock: &dyn Clock) -> AppResult<UpsertAction> {
        let _guard = self.write_lock.lock().await;
        let now = clock.now();
        let now_str = DateTimeParser::format_for_storage(&now);
        let expires_str = expiry_for(now, fields.auto_expire)
            .map(|expires| DateTimeParser::format_for_storage(&expires));

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO tiles (
                tile_id, title, icon, tile_type, value, sub_value,
                status, status_text, additional_info,
                current_value, max_value, priority,
                created_at, updated_at, expires_at, auto_expire, is_active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
            ON CONFLICT(tile_id) DO NOTHING
            "#,
        )
        .bind(&fields.tile_id)
        .bind(&fields.title)
        .bind(&fields.icon)
        .bind(&fields.tile_type)
        .bind(&fields.value)
        .bind(&fields.sub_value)
        .bind(&fields.status)
        .bind(&fields.status_text)
        .bind(&fields.additional_info)
        .bind(fields.current_value)
        .bind(fields.max_value)
        .bind(fields.priority)
        .bind(&now_str)
        .bind(&now_str)
        .bind(&expires_str)
        .bind(fields.auto_expire)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let action = if inserted > 0 {
            UpsertAction::Created
        } else {
            sqlx::query(
                r#"
                UPDATE tiles SET
                    title = ?, icon = ?, tile_type = ?, value = ?, sub_value = ?,
                    status = ?, status_text = ?, additional_info = ?,
                    current_value = ?, max_value = ?, priority = ?,
                    updated_at = ?, expires_at = ?, auto_expire = ?, is_active = 1
                WHERE tile_id = ?
                "#,
            )
            .bind(&fields.title)
            .bind(&fields.icon)
            .bind(&fields.tile_type)
            .bind(&fields.value)
            .bind(&fields.sub_value)
            .bind(&fields.status)
            .bind(&fields.status_text)
            .bind(&fields.additional_info)
            .bind(fields.current_value)
            .bind(fields.max_value)
            .bind(fields.priority)
            .bind(&now_str)
            .bind(&expires_str)
            .bind(fields.auto_expire)
            .bind(&fields.tile_id)
            .execute(&mut *tx)
            .await?;

            UpsertAction::Updated
        };

        tx.commit().await?;
        debug!("Tile '{}' {}", fields.tile_id, action);
        Ok(action)
    }

    async fn find_active(&self) -> AppResult<Vec<Tile>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tiles WHERE is_active = 1 \
             ORDER BY priority ASC, created_at ASC, tile_id ASC",
            TILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut tiles = Vec::with_capacity(rows.len());
        for row in &rows {
            tiles.push(tile_from_row(row)?);
        }
        Ok(tiles)
    }

    async fn find_active_by_id(&self, tile_id: &str) -> AppResult<Option<Tile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM tiles WHERE tile_id = ? AND is_active = 1",
            TILE_COLUMNS
        ))
        .bind(tile_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(tile_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn deactivate(&self, tile_id: &str, clock: &dyn Clock) -> AppResult<bool> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query("UPDATE tiles SET is_active = 0, updated_at = ? WHERE tile_id = ?")
            .bind(DateTimeParser::format_for_storage(&clock.now()))
            .bind(tile_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_expired(&self, clock: &dyn Clock) -> AppResult<u64> {
        let _guard = self.write_lock.lock().await;
        let now_str = DateTimeParser::format_for_storage(&clock.now());
        let result = sqlx::query(
            r#"
            UPDATE tiles
            SET is_active = 0, updated_at = ?
            WHERE auto_expire = 1 AND is_active = 1 AND expires_at < ?
            "#,
        )
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_active(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tiles WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
