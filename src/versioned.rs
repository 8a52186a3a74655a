//! Optimistic concurrency for mutable, owned records.
//!
//! Reads hand out snapshots carrying the `version` they were read at. A write
//! submits that version back and the storage layer applies it only if the
//! row still carries it, bumping `version` by one in the same statement.
//! Nothing here retries: a lost race is reported as `EditConflict` and the
//! caller decides whether to re-fetch.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::store::error::{StoreError, StoreResult};

/// A record guarded by a version stamp.
pub trait Versioned: Send + Sync + 'static {
    const KIND: &'static str;

    /// Fields the caller supplies on insert.
    type Draft: Send + 'static;

    fn id(&self) -> i64;
    fn version(&self) -> i32;
    fn set_version(&mut self, version: i32);
}

/// Row-level primitives a table must offer to be version-controlled.
#[async_trait]
pub trait VersionedTable<R: Versioned>: Send + Sync {
    /// Inserts a new row; storage assigns id, created_at and `version = 1`.
    async fn insert(&self, draft: R::Draft) -> StoreResult<R>;

    /// `UPDATE .. SET .., version = version + 1 WHERE id = $id AND version = $version
    /// RETURNING version`. `None` when no row matched.
    async fn update_if_version(&self, record: &R) -> StoreResult<Option<i32>>;

    /// Unconditional delete by id, returning the affected row count.
    async fn delete_row(&self, id: i64) -> StoreResult<u64>;
}

pub async fn insert<R, T>(table: &T, draft: R::Draft) -> StoreResult<R>
where
    R: Versioned,
    T: VersionedTable<R> + ?Sized,
{
    let record = table.insert(draft).await?;
    debug!(kind = R::KIND, id = record.id(), "record inserted");
    Ok(record)
}

/// Writes `record` if the stored row is still at `record.version()` and
/// returns the snapshot carrying the new version.
pub async fn update<R, T>(table: &T, mut record: R) -> StoreResult<R>
where
    R: Versioned,
    T: VersionedTable<R> + ?Sized,
{
    let (id, expected) = (record.id(), record.version());

    match table.update_if_version(&record).await? {
        Some(version) => {
            debug!(kind = R::KIND, id, from = expected, to = version, "record updated");
            record.set_version(version);
            Ok(record)
        }
        None => {
            warn!(kind = R::KIND, id, version = expected, "edit conflict");
            Err(StoreError::EditConflict)
        }
    }
}

pub async fn delete_by_id<R, T>(table: &T, id: i64) -> StoreResult<()>
where
    R: Versioned,
    T: VersionedTable<R> + ?Sized,
{
    if id < 1 {
        return Err(StoreError::NotFound);
    }
    match table.delete_row(id).await? {
        0 => Err(StoreError::NotFound),
        _ => {
            debug!(kind = R::KIND, id, "record deleted");
            Ok(())
        }
    }
}
