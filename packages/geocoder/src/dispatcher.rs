//! The batch geocode dispatcher.
//!
//! Invariants:
//! - Batches for the same settlement kind are serialized behind a
//!   per-kind async mutex. Two concurrent batches could otherwise both
//!   select the same ungeocoded entity before either writes its result,
//!   breaking idempotence.
//! - Every provider call runs under a timeout; a timed-out call counts
//!   as a failure in the tally and the entity stays ungeocoded.
//! - One failing entity never aborts the rest of the batch.

use std::collections::BTreeMap;
use std::time::Duration;

use grievance_map_models::SettlementKind;
use tokio::sync::Mutex;

use crate::store::{SettlementStore, StoreError};
use crate::{BatchOutcome, GeocodeProvider, GeocodeQuery};

/// Per-call timeout applied to every provider lookup.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs geocode batches against a provider and writes results back to
/// the settlement store.
pub struct BatchGeocodeDispatcher<S, P> {
    store: S,
    provider: P,
    batch_locks: BTreeMap<SettlementKind, Mutex<()>>,
    call_timeout: Duration,
}

impl<S, P> BatchGeocodeDispatcher<S, P>
where
    S: SettlementStore,
    P: GeocodeProvider,
{
    /// A dispatcher with the default per-call timeout.
    #[must_use]
    pub fn new(store: S, provider: P) -> Self {
        Self {
            store,
            provider,
            batch_locks: SettlementKind::all()
                .into_iter()
                .map(|kind| (kind, Mutex::new(())))
                .collect(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Overrides the per-call timeout.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// The store this dispatcher writes back to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Geocodes up to `batch_size` ungeocoded entities of `kind`.
    ///
    /// Entities already marked geocoded are never re-selected; once this
    /// call returns, each selected entity is either geocoded or counted
    /// in `failed` and eligible for a later batch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when the initial selection fails;
    /// per-entity provider and write-back failures are tallied instead.
    pub async fn request_batch(
        &self,
        kind: SettlementKind,
        batch_size: usize,
    ) -> Result<BatchOutcome, StoreError> {
        // Serialize batches per kind; see the module invariants.
        let _guard = self
            .batch_locks
            .get(&kind)
            .expect("all settlement kinds have a lock")
            .lock()
            .await;

        let pending = self.store.ungeocoded(kind, batch_size).await?;
        log::info!(
            "Geocoding batch of {count} {kind} entities",
            count = pending.len()
        );

        let mut outcome = BatchOutcome::default();

        for entity in pending {
            let query = GeocodeQuery {
                name: entity.name.clone(),
                subdistrict_name: entity.subdistrict_name.clone(),
                kind,
            };

            match tokio::time::timeout(self.call_timeout, self.provider.locate(&query)).await {
                Err(_) => {
                    log::warn!("Geocode timed out for {kind} '{}'", entity.name);
                    outcome.failed += 1;
                }
                Ok(Err(err)) => {
                    log::warn!("Geocode failed for {kind} '{}': {err}", entity.name);
                    outcome.failed += 1;
                }
                Ok(Ok(None)) => {
                    log::debug!("No geocode match for {kind} '{}'", entity.name);
                    outcome.failed += 1;
                }
                Ok(Ok(Some(located))) => {
                    match self
                        .store
                        .record_coordinates(kind, entity.id, located.longitude, located.latitude)
                        .await
                    {
                        Ok(()) => outcome.success += 1,
                        Err(err) => {
                            log::warn!(
                                "Coordinate write-back failed for {kind} '{}': {err}",
                                entity.name
                            );
                            outcome.failed += 1;
                        }
                    }
                }
            }
        }

        log::info!(
            "Geocode batch for {kind} finished: {} succeeded, {} failed",
            outcome.success,
            outcome.failed
        );
        Ok(outcome)
    }
}
