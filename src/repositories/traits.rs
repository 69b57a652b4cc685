//! Repository trait definitions

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{Tile, TileFields, UpsertAction};
use crate::utils::clock::Clock;

/// Persistence operations behind the tile store
///
/// Implementations must guarantee at most one row per `tile_id`, enforced by
/// the store itself rather than by a read-then-write in application code.
///
/// Writes read `clock` only once they hold the store's write lock, so stamped
/// times follow commit order.
#[async_trait]
pub trait TileRepository: Send + Sync {
    /// Insert a new row or overwrite every mutable field of the existing one
    ///
    /// # Returns
    ///
    /// * `Ok(UpsertAction::Created)` - No row existed for `fields.tile_id`
    /// * `Ok(UpsertAction::Updated)` - Existing row overwritten and reactivated
    /// * `Err(AppError::Store)` - Database error; no change was persisted
    async fn upsert(&self, fields: &TileFields, clock: &dyn Clock) -> AppResult<UpsertAction>;

    /// All rows with `is_active = true`, expired-but-unswept rows included
    async fn find_active(&self) -> AppResult<Vec<Tile>>;

    /// The row for `tile_id` if it exists and is active
    async fn find_active_by_id(&self, tile_id: &str) -> AppResult<Option<Tile>>;

    /// Deactivate a row and stamp `updated_at`
    ///
    /// Returns `false` only when no row with that identity exists at all.
    async fn deactivate(&self, tile_id: &str, clock: &dyn Clock) -> AppResult<bool>;

    /// Deactivate every active auto-expiring row whose `expires_at` is before
    /// the clock's current time
    ///
    /// Returns the number of rows changed.
    async fn deactivate_expired(&self, clock: &dyn Clock) -> AppResult<u64>;

    async fn count_active(&self) -> AppResult<i64>;
}
