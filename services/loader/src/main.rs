//! Observation loader.
//!
//! Streams georeferenced imagery into a remote SPARQL triple store as RDF
//! data-cube observations. Two input shapes are supported: flat AGDC
//! GeoTIFF rasters and hierarchical DGGS containers.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dggs_parser::DggsDataset;
use observation::{assemble, dggs_statements, raster_statements};
use raster_parser::RasterDataset;
use sparql_store::{BatchUploader, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "loader")]
#[command(about = "Loads georeferenced imagery into a SPARQL store as data-cube observations")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Arguments shared by both input shapes.
#[derive(Args, Debug)]
struct StoreArgs {
    /// Query URL for the SPARQL endpoint
    #[arg(long, default_value = "http://localhost:3030/landsat/query")]
    query_url: String,

    /// Update URL for the SPARQL endpoint
    #[arg(long, default_value = "http://localhost:3030/landsat/update")]
    update_url: String,

    /// Number of statements committed per batch
    #[arg(long, default_value_t = 100)]
    batch_size: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a flat georeferenced raster (AGDC GeoTIFF)
    Raster {
        /// Path to the GeoTIFF file to load
        input: PathBuf,

        #[command(flatten)]
        store: StoreArgs,

        /// Sizes of tiles to output
        #[arg(long, num_args = 1.., default_values_t = [64, 128])]
        tile_sizes: Vec<usize>,
    },
    /// Load a hierarchical DGGS container
    Dggs {
        /// Path to the DGGS container file to load
        input: PathBuf,

        #[command(flatten)]
        store: StoreArgs,

        /// Band to load from each cell
        #[arg(long, default_value_t = 0)]
        band: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Command::Raster {
            input,
            store,
            tile_sizes,
        } => run_raster(input, store, tile_sizes),
        Command::Dggs { input, store, band } => run_dggs(input, store, *band),
    }
}

fn store_config(args: &StoreArgs) -> StoreConfig {
    StoreConfig {
        query_url: args.query_url.clone(),
        update_url: args.update_url.clone(),
        ..StoreConfig::default()
    }
}

fn run_raster(input: &Path, store: &StoreArgs, tile_sizes: &[usize]) -> Result<()> {
    let config = store_config(store);
    info!(
        input = %input.display(),
        query = %config.query_url,
        update = %config.update_url,
        ?tile_sizes,
        "Loading raster observations"
    );

    let dataset = RasterDataset::open(input)?;
    info!(
        satellite = %dataset.info().satellite,
        sensor = %dataset.info().sensor,
        bands = dataset.band_count(),
        "Parsed raster metadata"
    );

    let statements = assemble(raster_statements(&dataset, tile_sizes))?;
    let stats = BatchUploader::new(config, store.batch_size).upload(statements)?;

    info!(
        statements = stats.statements,
        batches = stats.batches,
        "Done"
    );
    Ok(())
}

fn run_dggs(input: &Path, store: &StoreArgs, band: usize) -> Result<()> {
    let config = store_config(store);
    info!(
        input = %input.display(),
        query = %config.query_url,
        update = %config.update_url,
        band,
        "Loading DGGS observations"
    );

    let dataset = DggsDataset::open(input, band)?;
    let statements = assemble(dggs_statements(&dataset))?;
    let stats = BatchUploader::new(config, store.batch_size).upload(statements)?;

    info!(
        statements = stats.statements,
        batches = stats.batches,
        "Done"
    );
    Ok(())
}
