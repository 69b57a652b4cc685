//! Tile Store
//!
//! Owns the tile lifecycle: created on the first upsert of an identity,
//! overwritten and reactivated by later upserts, deactivated by explicit
//! removal or by the expiry sweep. Rows are never physically deleted.
//!
//! Reads do not filter on `expires_at`. A tile past its expiry stays in the
//! active list until the next sweep deactivates it.

use std::sync::Arc;
use tracing::{debug, info};

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    HealthReport, RemoveOutcome, SweepOutcome, Tile, TileUpsertRequest, UpsertOutcome,
};
use crate::repositories::{SqliteTileRepository, TileRepository};
use crate::utils::clock::{Clock, SystemClock};

const TILE_RESOURCE: &str = "tile";

#[derive(Clone)]
pub struct TileStore {
    repository: Arc<dyn TileRepository>,
    clock: Arc<dyn Clock>,
}

impl TileStore {
    pub fn new(repository: Arc<dyn TileRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// SQLite-backed store on the wall clock
    pub fn sqlite(database: &Database) -> Self {
        Self::new(
            Arc::new(SqliteTileRepository::new(database)),
            Arc::new(SystemClock),
        )
    }

    /// Create or overwrite the tile named by `request`
    ///
    /// Fails with a validation error, writing nothing, when the id, title or
    /// value is missing or empty.
    pub async fn upsert(&self, request: TileUpsertRequest) -> AppResult<UpsertOutcome> {
        let fields = request.validate()?;
        let action = self.repository.upsert(&fields, self.clock.as_ref()).await?;

        Ok(UpsertOutcome {
            tile_id: fields.tile_id,
            action,
        })
    }

    pub async fn get_active_tiles(&self) -> AppResult<Vec<Tile>> {
        self.repository.find_active().await
    }

    /// Fails with not found when the tile never existed or is inactive
    pub async fn get_by_id(&self, tile_id: &str) -> AppResult<Tile> {
        self.repository
            .find_active_by_id(tile_id)
            .await?
            .ok_or_else(|| AppError::not_found(TILE_RESOURCE, tile_id))
    }

    /// Deactivate a tile. Removing an already inactive tile succeeds again;
    /// only an identity that was never created is reported as not found.
    pub async fn remove(&self, tile_id: &str) -> AppResult<RemoveOutcome> {
        if !self.repository.deactivate(tile_id, self.clock.as_ref()).await? {
            return Err(AppError::not_found(TILE_RESOURCE, tile_id));
        }

        debug!("Tile '{}' removed", tile_id);
        Ok(RemoveOutcome {
            tile_id: tile_id.to_string(),
            removed: true,
        })
    }

    /// Deactivate every active auto-expiring tile whose expiry has passed
    pub async fn sweep(&self) -> AppResult<SweepOutcome> {
        let expired_count = self.repository.deactivate_expired(self.clock.as_ref()).await?;

        if expired_count > 0 {
            info!("Auto-cleanup: {} tiles expired", expired_count);
        } else {
            debug!("Auto-cleanup: no expired tiles");
        }

        Ok(SweepOutcome { expired_count })
    }

    pub async fn health(&self) -> AppResult<HealthReport> {
        let active_tiles = self.repository.count_active().await?;
        Ok(HealthReport {
            active_tiles,
            timestamp: self.clock.now(),
        })
    }
}
