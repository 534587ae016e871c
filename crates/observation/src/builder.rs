//! Observation statement construction.
//!
//! Each observation produces a fixed statement set: type assertion, dataset
//! membership, bounding polygon, band, timestamp, resolution and the image
//! or scalar payload, plus (grid path) the cell identifier and hierarchy
//! levels. The centroid hangs off a blank node as a latitude/longitude
//! pair.

use oxrdf::vocab::rdf;
use oxrdf::{BlankNode, NamedNode, Term, Triple};

use chrono::{DateTime, Utc};
use cube_common::geometry::{pixel_level, resolution, square_level};
use cube_common::statement::{
    datetime_literal, decimal_literal, double_literal, integer_literal, wkt_literal,
};
use cube_common::{vocab, BoundingPolygon, CubeError, CubeResult, GeoPoint, Tile};
use dggs_parser::DataCell;
use raster_parser::RasterFileInfo;

use crate::image::{encode_tile, ImagePayload};

/// DGGS hierarchy levels of a grid observation.
#[derive(Debug, Clone, Copy)]
struct GridLevels {
    square: u32,
    pixel: u32,
}

/// Statements for one raster tile observation.
///
/// `tile_size` is the nominal window size used in the observation identity;
/// geometry is derived from the actual (possibly edge-clipped) tile shape
/// through the affine transform.
pub fn raster_tile_statements(
    info: &RasterFileInfo,
    transform: &cube_common::AffineTransform,
    band: usize,
    tile_size: usize,
    row: usize,
    col: usize,
    tile: &Tile,
) -> CubeResult<Vec<Triple>> {
    let start = transform.apply(row as f64, col as f64);
    let end = transform.apply((row + tile.rows()) as f64, (col + tile.cols()) as f64);
    let polygon = BoundingPolygon::from_corner_span(start, end);

    let res = resolution(tile.rows(), tile.cols(), &polygon.extent())?;
    let payload = encode_tile(tile)?;

    let subject = observation_iri(&format!(
        "observation/lat/{}/lon/{}/tile-size/{tile_size}/band/{band}",
        start.lat, start.lon
    ))?;

    Ok(observation_statements(
        subject,
        &polygon,
        polygon.centroid(),
        &info.timestamp,
        band as i64,
        res,
        payload,
        None,
    ))
}

/// Statements for one grid cell: a pixel observation summarizing the whole
/// cell and a tile observation carrying the fine data.
pub fn cell_statements(cell: &DataCell) -> CubeResult<Vec<Triple>> {
    let square = square_level(&cell.address)?;
    let polygon = BoundingPolygon::from_corners(cell.meta.bounds);

    // Pixel observation: a 1x1 summary at the cell's own level
    let pixel_levels = GridLevels {
        square,
        pixel: square,
    };
    let pixel_subject = grid_observation_iri(cell, pixel_levels, "pixel")?;
    let mut statements = observation_statements(
        pixel_subject,
        &polygon,
        cell.meta.centre,
        &cell.meta.timestamp,
        cell.band as i64,
        resolution(1, 1, &polygon.extent())?,
        ImagePayload::Scalar(cell.pixel_value),
        Some((&cell.ident, pixel_levels)),
    );

    // Tile observation: the data tile, power-of-three side length required
    let tile_levels = GridLevels {
        square,
        pixel: pixel_level(square, cell.tile.rows())?,
    };
    let tile_subject = grid_observation_iri(cell, tile_levels, "tile")?;
    statements.extend(observation_statements(
        tile_subject,
        &polygon,
        cell.meta.centre,
        &cell.meta.timestamp,
        cell.band as i64,
        resolution(cell.tile.rows(), cell.tile.cols(), &polygon.extent())?,
        encode_tile(&cell.tile)?,
        Some((&cell.ident, tile_levels)),
    ));

    Ok(statements)
}

fn observation_iri(suffix: &str) -> CubeResult<NamedNode> {
    NamedNode::new(format!("{}{suffix}", vocab::LED_NS))
        .map_err(|e| CubeError::MalformedInput(format!("bad observation IRI: {e}")))
}

fn grid_observation_iri(cell: &DataCell, levels: GridLevels, kind: &str) -> CubeResult<NamedNode> {
    observation_iri(&format!(
        "observation/cell/{}/levelSquare-{}/levelPixel-{}/band-{}/{kind}",
        cell.ident, levels.square, levels.pixel, cell.band
    ))
}

/// The fixed statement set shared by both pipelines.
#[allow(clippy::too_many_arguments)]
fn observation_statements(
    subject: NamedNode,
    polygon: &BoundingPolygon,
    centroid: GeoPoint,
    timestamp: &DateTime<Utc>,
    band: i64,
    res: f64,
    payload: ImagePayload,
    grid: Option<(&str, GridLevels)>,
) -> Vec<Triple> {
    let payload_term: Term = match payload {
        // The original publishes image data URIs as resources, not literals
        ImagePayload::DataUri(uri) => NamedNode::new_unchecked(uri).into(),
        ImagePayload::Scalar(value) => double_literal(value).into(),
    };

    let mut statements = vec![
        Triple::new(subject.clone(), rdf::TYPE, vocab::qb("Observation")),
        Triple::new(
            subject.clone(),
            vocab::qb("dataSet"),
            vocab::landsat_dataset(),
        ),
        Triple::new(subject.clone(), vocab::led("bounds"), wkt_literal(polygon.wkt())),
        Triple::new(subject.clone(), vocab::led("etmBand"), integer_literal(band)),
        Triple::new(subject.clone(), vocab::led("time"), datetime_literal(timestamp)),
        Triple::new(
            subject.clone(),
            vocab::led("resolution"),
            decimal_literal(res),
        ),
        Triple::new(subject.clone(), vocab::led("imageData"), payload_term),
    ];

    if let Some((ident, levels)) = grid {
        statements.push(Triple::new(
            subject.clone(),
            vocab::led("dggsCell"),
            oxrdf::Literal::new_simple_literal(ident),
        ));
        statements.push(Triple::new(
            subject.clone(),
            vocab::led("levelSquare"),
            integer_literal(levels.square as i64),
        ));
        statements.push(Triple::new(
            subject.clone(),
            vocab::led("levelPixel"),
            integer_literal(levels.pixel as i64),
        ));
    }

    // Centroid as a blank-node latitude/longitude pair
    let location = BlankNode::default();
    statements.push(Triple::new(
        subject,
        vocab::led("location"),
        location.clone(),
    ));
    statements.push(Triple::new(
        location.clone(),
        vocab::geo("lat"),
        decimal_literal(centroid.lat),
    ));
    statements.push(Triple::new(
        location,
        vocab::geo("lon"),
        decimal_literal(centroid.lon),
    ));

    statements
}
