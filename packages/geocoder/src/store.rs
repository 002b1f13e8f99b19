//! The settlement store seam.
//!
//! The portal keeps settlement reference data in its own persistence
//! layer; the dispatcher only needs two operations from it: select
//! ungeocoded entities and write coordinates back. The in-memory
//! implementation backs the CLI's file-based workflow and the tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use grievance_map_models::{SettlementKind, SettlementPoint};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from settlement store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Write-back referenced an entity the store does not hold.
    #[error("No {kind} with id {id}")]
    UnknownEntity {
        /// Settlement kind that was addressed.
        kind: SettlementKind,
        /// The missing identifier.
        id: u64,
    },
}

/// Read/write access to settlement reference data.
#[async_trait]
pub trait SettlementStore: Send + Sync {
    /// Up to `limit` entities of `kind` with `geocoded == false`.
    async fn ungeocoded(
        &self,
        kind: SettlementKind,
        limit: usize,
    ) -> Result<Vec<SettlementPoint>, StoreError>;

    /// Writes coordinates for one entity and marks it geocoded.
    async fn record_coordinates(
        &self,
        kind: SettlementKind,
        id: u64,
        longitude: f64,
        latitude: f64,
    ) -> Result<(), StoreError>;
}

/// In-memory settlement store.
#[derive(Debug, Default)]
pub struct MemorySettlementStore {
    inner: RwLock<BTreeMap<SettlementKind, Vec<SettlementPoint>>>,
}

impl MemorySettlementStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entities of `kind`.
    pub async fn load(&self, kind: SettlementKind, points: Vec<SettlementPoint>) {
        self.inner.write().await.insert(kind, points);
    }

    /// A snapshot of the entities of `kind`, in insertion order.
    pub async fn snapshot(&self, kind: SettlementKind) -> Vec<SettlementPoint> {
        self.inner
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SettlementStore for MemorySettlementStore {
    async fn ungeocoded(
        &self,
        kind: SettlementKind,
        limit: usize,
    ) -> Result<Vec<SettlementPoint>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .get(&kind)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| !p.geocoded)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn record_coordinates(
        &self,
        kind: SettlementKind,
        id: u64,
        longitude: f64,
        latitude: f64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let point = inner
            .get_mut(&kind)
            .and_then(|points| points.iter_mut().find(|p| p.id == id))
            .ok_or(StoreError::UnknownEntity { kind, id })?;

        point.longitude = Some(longitude);
        point.latitude = Some(latitude);
        point.geocoded = true;
        Ok(())
    }
}
