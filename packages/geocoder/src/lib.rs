#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch geocoding for settlement reference data.
//!
//! Villages, towns, and wards arrive from upstream registers without
//! coordinates. The [`dispatcher::BatchGeocodeDispatcher`] selects
//! ungeocoded entities from a [`store::SettlementStore`], resolves each
//! one through a [`GeocodeProvider`], and writes coordinates back so the
//! next map composition can render them. Failures are per-entity and
//! tallied, never batch-fatal.

pub mod dispatcher;
pub mod nominatim;
pub mod store;

use async_trait::async_trait;
use grievance_map_models::SettlementKind;
use serde::Serialize;
use thiserror::Error;

/// Coordinates returned by a geocoding provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// One settlement lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeQuery {
    /// Settlement name.
    pub name: String,
    /// Subdistrict the settlement belongs to, for disambiguation.
    pub subdistrict_name: String,
    /// What kind of settlement is being looked up.
    pub kind: SettlementKind,
}

/// Resolves a settlement query to coordinates.
///
/// `Ok(None)` means the provider answered but found no match; that is a
/// per-entity failure for tally purposes, not an error.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Looks up coordinates for one settlement.
    async fn locate(&self, query: &GeocodeQuery) -> Result<Option<Located>, GeocodeError>;
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Tally of one batch invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Entities geocoded and written back.
    pub success: usize,
    /// Entities that failed (provider error, no match, timeout, or
    /// write-back failure) and remain ungeocoded.
    pub failed: usize,
}
