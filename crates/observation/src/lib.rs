//! Observation generation.
//!
//! Turns tiles from either source into RDF data-cube statements:
//!
//! - [`image`] encodes a masked tile as a PNG data URI (or a bare scalar
//!   for 1x1 tiles)
//! - [`builder`] produces the fixed statement set for one observation
//! - [`schema`] holds the static data-cube schema
//! - [`assemble`] chains schema and observations into one lazy sequence
//!
//! The two pipeline entry points, [`raster_statements`] and
//! [`dggs_statements`], are strictly sequential pull-driven sequences: no
//! tile is read and no statement is built until the consumer asks for it.

pub mod assemble;
pub mod builder;
pub mod image;
pub mod schema;

use oxrdf::Triple;
use tracing::info;

use cube_common::{CubeResult, ProgressExt};
use dggs_parser::DggsDataset;
use raster_parser::RasterDataset;

pub use assemble::assemble;
pub use image::ImagePayload;

/// Lazy observation statements for every band and tile size of a raster.
///
/// Bands use 1-based GDAL indices. Each (band, tile size) pass re-reads the
/// band so only one band's samples are resident at a time.
pub fn raster_statements<'a>(
    dataset: &'a RasterDataset,
    tile_sizes: &'a [usize],
) -> impl Iterator<Item = CubeResult<Triple>> + 'a {
    (1..=dataset.band_count()).flat_map(move |band| {
        tile_sizes
            .iter()
            .flat_map(move |&tile_size| band_statements(dataset, band, tile_size))
    })
}

fn band_statements(
    dataset: &RasterDataset,
    band: usize,
    tile_size: usize,
) -> Box<dyn Iterator<Item = CubeResult<Triple>> + '_> {
    info!(band, total = dataset.band_count(), tile_size, "Processing band");

    let data = match dataset.read_band(band) {
        Ok(data) => data,
        Err(e) => return Box::new(std::iter::once(Err(e))),
    };

    let info = dataset.info().clone();
    let transform = *dataset.transform();
    Box::new(
        data.into_tile_windows(tile_size)
            .progress(10, "tiles processed")
            .flat_map(move |(row, col, tile)| {
                let statements = builder::raster_tile_statements(
                    &info, &transform, band, tile_size, row, col, &tile,
                );
                match statements {
                    Ok(triples) => triples.into_iter().map(Ok).collect::<Vec<_>>().into_iter(),
                    Err(e) => vec![Err(e)].into_iter(),
                }
            }),
    )
}

/// Lazy observation statements for every data cell of a DGGS container.
///
/// Each cell yields a pixel observation and a tile observation.
pub fn dggs_statements(dataset: &DggsDataset) -> impl Iterator<Item = CubeResult<Triple>> + '_ {
    dataset
        .cells()
        .progress(500, "cells processed")
        .flat_map(|cell| {
            match cell.and_then(|cell| builder::cell_statements(&cell)) {
                Ok(triples) => triples.into_iter().map(Ok).collect::<Vec<_>>().into_iter(),
                Err(e) => vec![Err(e)].into_iter(),
            }
        })
}
