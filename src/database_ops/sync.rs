//! Catalog synchronization: reconcile a pushed batch of raw product items
//! against the products table, upserting each by SKU.
//!
//! One linear pass in input order, one transaction. Items without a SKU are
//! skipped; everything else either overwrites the existing record for its SKU
//! or stages a new one. Any failure (malformed numeric field, store error)
//! rolls the whole batch back; there is no partial-success mode.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::database_ops::store::{ProductRecord, ProductStore};
use crate::normalization::item::CoercionError;

/// Aggregate outcome of one committed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub created: u64,
    pub updated: u64,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    #[error("store failure: {0}")]
    Store(anyhow::Error),
}

/// Run one sync batch to its terminal outcome: commit-with-counts or
/// rollback-with-error. Re-running the identical batch afterwards is
/// idempotent (everything reports as updated, fields unchanged).
pub async fn synchronize<S: ProductStore>(
    batch: &[Value],
    store: &mut S,
) -> Result<SyncOutcome, SyncError> {
    match run_batch(batch, store).await {
        Ok(outcome) => {
            store.commit().await.map_err(SyncError::Store)?;
            Ok(outcome)
        }
        Err(err) => {
            if let Err(rb) = store.rollback().await {
                warn!(error = %rb, "rollback after failed sync batch also failed");
            }
            Err(err)
        }
    }
}

async fn run_batch<S: ProductStore>(
    batch: &[Value],
    store: &mut S,
) -> Result<SyncOutcome, SyncError> {
    let mut outcome = SyncOutcome::default();
    for raw in batch {
        let Some(record) = ProductRecord::from_raw(raw)? else {
            debug!("skipping item without sku");
            continue;
        };
        // A staged insert earlier in the same batch is visible here, so a
        // duplicate SKU within one batch counts create-then-update.
        match store.fetch_by_sku(&record.sku).await.map_err(SyncError::Store)? {
            Some(_) => {
                store.update(&record).await.map_err(SyncError::Store)?;
                outcome.updated += 1;
                debug!(sku = %record.sku, "updated product");
            }
            None => {
                store.insert(&record).await.map_err(SyncError::Store)?;
                outcome.created += 1;
                debug!(sku = %record.sku, "created product");
            }
        }
    }
    Ok(outcome)
}
