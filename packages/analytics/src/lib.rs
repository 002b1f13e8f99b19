#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Complaint aggregation and heat-tier classification.
//!
//! Pure, infallible functions over in-memory snapshots: counts are
//! rebuilt from scratch for every composition rather than incrementally
//! patched, so there is no stale-state risk. `BTreeMap` keeps the
//! resulting buckets deterministic regardless of input iteration order.

pub mod aggregate;
pub mod heat;
