#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Command-line front end for the grievance map.
//!
//! `compose` loads boundary `GeoJSON` plus settlement/POI/complaint JSON
//! files, runs one composition, and writes the resulting feature
//! collection. `geocode` runs a batch of Nominatim lookups over a
//! settlement JSON file and writes the updated records back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr as _;

use clap::{Parser, Subcommand};
use grievance_map_compose::{ComposeInputs, compose};
use grievance_map_geocoder::dispatcher::BatchGeocodeDispatcher;
use grievance_map_geocoder::nominatim::NominatimProvider;
use grievance_map_geocoder::store::{MemorySettlementStore, StoreError};
use grievance_map_models::{
    ComplaintRecord, FilterContext, PoiPoint, SettlementKind, SettlementPoint,
};
use grievance_map_spatial::{GeometryIndex, boundaries_from_geojson};
use thiserror::Error;

#[derive(Parser)]
#[command(name = "grievance_map_cli", about = "Grievance map composer and geocoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the renderable feature collection from input files
    Compose {
        /// Boundary GeoJSON feature collection
        #[arg(long)]
        boundaries: PathBuf,
        /// Complaint records (JSON array)
        #[arg(long)]
        complaints: PathBuf,
        /// Village points (JSON array)
        #[arg(long)]
        villages: Option<PathBuf>,
        /// Town points (JSON array)
        #[arg(long)]
        towns: Option<PathBuf>,
        /// Ward points (JSON array)
        #[arg(long)]
        wards: Option<PathBuf>,
        /// POI points (JSON array)
        #[arg(long)]
        pois: Option<PathBuf>,
        /// Restrict the composition to one subdistrict
        #[arg(long)]
        subdistrict: Option<String>,
        /// Keep only complaints in this category
        #[arg(long)]
        category: Option<String>,
        /// Keep only complaints with this status
        #[arg(long)]
        status: Option<String>,
        /// Keep only complaints with this priority
        #[arg(long)]
        priority: Option<String>,
        /// Output path (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Geocode a batch of ungeocoded settlements via Nominatim
    Geocode {
        /// Settlement records (JSON array), updated in place
        #[arg(long)]
        settlements: PathBuf,
        /// Settlement kind: Village, Town, or Ward
        #[arg(long)]
        kind: String,
        /// Maximum entities to geocode in this batch
        #[arg(long, default_value_t = 25)]
        batch_size: usize,
        /// Nominatim search endpoint
        #[arg(long, default_value = "https://nominatim.openstreetmap.org/search")]
        base_url: String,
        /// Region context appended to every query (district, state)
        #[arg(long)]
        region_context: Option<String>,
    },
}

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
enum CliError {
    /// File read/write failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GeoJSON parsing failed.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// Settlement store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// HTTP client construction failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid command-line argument.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong.
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compose {
            boundaries,
            complaints,
            villages,
            towns,
            wards,
            pois,
            subdistrict,
            category,
            status,
            priority,
            output,
        } => {
            run_compose(&ComposeArgs {
                boundaries,
                complaints,
                villages,
                towns,
                wards,
                pois,
                subdistrict,
                category,
                status,
                priority,
                output,
            })
        }
        Commands::Geocode {
            settlements,
            kind,
            batch_size,
            base_url,
            region_context,
        } => run_geocode(&settlements, &kind, batch_size, base_url, region_context).await,
    }
}

struct ComposeArgs {
    boundaries: PathBuf,
    complaints: PathBuf,
    villages: Option<PathBuf>,
    towns: Option<PathBuf>,
    wards: Option<PathBuf>,
    pois: Option<PathBuf>,
    subdistrict: Option<String>,
    category: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    output: Option<PathBuf>,
}

fn run_compose(args: &ComposeArgs) -> Result<(), CliError> {
    let collection = read_feature_collection(&args.boundaries)?;
    let index = GeometryIndex::load(boundaries_from_geojson(&collection));

    let complaints: Vec<ComplaintRecord> = read_json(&args.complaints)?;

    let mut settlements: BTreeMap<SettlementKind, Vec<SettlementPoint>> = BTreeMap::new();
    for (kind, path) in [
        (SettlementKind::Village, &args.villages),
        (SettlementKind::Town, &args.towns),
        (SettlementKind::Ward, &args.wards),
    ] {
        if let Some(path) = path {
            settlements.insert(kind, read_json(path)?);
        }
    }

    let pois: Vec<PoiPoint> = match &args.pois {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let filter = FilterContext {
        selected_subdistrict: args.subdistrict.clone(),
        category: args.category.clone(),
        status: args.status.clone(),
        priority: args.priority.clone(),
        ..FilterContext::all_layers()
    };

    let outlines = BTreeMap::new();
    let composed = compose(&ComposeInputs {
        index: &index,
        settlements: &settlements,
        outlines: &outlines,
        pois: &pois,
        complaints: &complaints,
        filter: &filter,
        highlight: None,
    });

    log::info!("Composed {} features", composed.features.len());

    let rendered = serde_json::to_string_pretty(&composed)?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }
    Ok(())
}

async fn run_geocode(
    settlements_path: &Path,
    kind: &str,
    batch_size: usize,
    base_url: String,
    region_context: Option<String>,
) -> Result<(), CliError> {
    let kind = SettlementKind::from_str(kind).map_err(|_| CliError::InvalidArgument {
        message: format!("Unknown settlement kind '{kind}'; expected Village, Town, or Ward"),
    })?;

    let points: Vec<SettlementPoint> = read_json(settlements_path)?;
    let store = MemorySettlementStore::new();
    store.load(kind, points).await;

    let client = reqwest::Client::builder()
        .user_agent("grievance-map/0.1")
        .build()?;
    let mut provider = NominatimProvider::new(client, base_url);
    if let Some(context) = region_context {
        provider = provider.with_region_context(context);
    }

    let dispatcher = BatchGeocodeDispatcher::new(store, provider);
    let outcome = dispatcher.request_batch(kind, batch_size).await?;

    log::info!(
        "Batch finished: {} geocoded, {} failed",
        outcome.success,
        outcome.failed
    );

    let updated = dispatcher.store().snapshot(kind).await;
    std::fs::write(settlements_path, serde_json::to_string_pretty(&updated)?)?;
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn read_feature_collection(path: &Path) -> Result<geojson::FeatureCollection, CliError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.parse::<geojson::FeatureCollection>()?)
}
