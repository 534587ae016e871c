//! Geometry for observation footprints.
//!
//! Covers bounding polygons and their WKT emission, affine geotransforms,
//! resolution, and the DGGS hierarchy levels attached to grid observations.

use serde::{Deserialize, Serialize};

use crate::error::{CubeError, CubeResult};

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Geographic extent of a polygon (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Extent {
    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// An extent with zero span on either axis cannot carry a resolution.
    pub fn is_degenerate(&self) -> bool {
        self.lon_span() == 0.0 || self.lat_span() == 0.0
    }

    /// Midpoint of the extent.
    pub fn midpoint(&self) -> GeoPoint {
        GeoPoint::new(
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }
}

/// Bounding polygon of an observation: four corners in (lon, lat) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingPolygon {
    corners: [GeoPoint; 4],
}

impl BoundingPolygon {
    /// Polygon from four stored corner attributes (grid path).
    pub fn from_corners(corners: [GeoPoint; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned polygon from two opposite corners (raster path).
    pub fn from_corner_span(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            corners: [
                GeoPoint::new(a.lon, a.lat),
                GeoPoint::new(a.lon, b.lat),
                GeoPoint::new(b.lon, b.lat),
                GeoPoint::new(b.lon, a.lat),
            ],
        }
    }

    pub fn corners(&self) -> &[GeoPoint; 4] {
        &self.corners
    }

    /// WKT emission as a closed ring: the first vertex is repeated last.
    pub fn wkt(&self) -> String {
        let ring = self
            .corners
            .iter()
            .chain(std::iter::once(&self.corners[0]))
            .map(|p| format!("{} {}", p.lon, p.lat))
            .collect::<Vec<_>>()
            .join(", ");
        format!("POLYGON(({ring}))")
    }

    /// Smallest axis-aligned extent containing all corners.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent {
            lon_min: f64::INFINITY,
            lon_max: f64::NEG_INFINITY,
            lat_min: f64::INFINITY,
            lat_max: f64::NEG_INFINITY,
        };
        for corner in &self.corners {
            extent.lon_min = extent.lon_min.min(corner.lon);
            extent.lon_max = extent.lon_max.max(corner.lon);
            extent.lat_min = extent.lat_min.min(corner.lat);
            extent.lat_max = extent.lat_max.max(corner.lat);
        }
        extent
    }

    /// Centroid as the midpoint of the extent.
    pub fn centroid(&self) -> GeoPoint {
        self.extent().midpoint()
    }
}

/// GDAL-style affine geotransform mapping (row, col) to (lat, lon).
///
/// Coefficient order matches `Dataset::geo_transform`:
/// `[lon0, dlon/dcol, dlon/drow, lat0, dlat/dcol, dlat/drow]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform(pub [f64; 6]);

impl AffineTransform {
    /// Recover the geographic position of a pixel corner.
    pub fn apply(&self, row: f64, col: f64) -> GeoPoint {
        let t = &self.0;
        GeoPoint::new(
            t[0] + col * t[1] + row * t[2],
            t[3] + col * t[4] + row * t[5],
        )
    }
}

/// Resolution of a tile over an extent: the mean, across the two spatial
/// axes, of tile side length divided by the absolute geographic span of
/// that axis. Both pipelines use this one formula.
pub fn resolution(rows: usize, cols: usize, extent: &Extent) -> CubeResult<f64> {
    if extent.is_degenerate() {
        return Err(CubeError::MalformedInput(format!(
            "degenerate extent has no resolution: {extent:?}"
        )));
    }
    let lat_res = rows as f64 / extent.lat_span().abs();
    let lon_res = cols as f64 / extent.lon_span().abs();
    Ok((lat_res + lon_res) / 2.0)
}

/// Level of a cell in the DGGS hierarchy: its depth below the root cell.
///
/// The address is a slash-delimited path of child indices, e.g.
/// `/R/0/0/0/0/5` sits at level 5.
pub fn square_level(address: &str) -> CubeResult<u32> {
    let segments = address.split('/').filter(|s| !s.is_empty()).count();
    if segments == 0 {
        return Err(CubeError::MalformedInput(format!(
            "empty cell address: {address:?}"
        )));
    }
    Ok((segments - 1) as u32)
}

/// Level in the DGGS hierarchy that individual pixels of a tile correspond
/// to. A 1x1 tile sits at the cell's own level; a larger tile must have a
/// power-of-three side length, each factor of three adding one level.
pub fn pixel_level(square_level: u32, tile_size: usize) -> CubeResult<u32> {
    if tile_size == 0 {
        return Err(CubeError::MalformedInput("empty tile".to_string()));
    }
    if tile_size == 1 {
        return Ok(square_level);
    }
    let exact = (tile_size as f64).ln() / 3f64.ln();
    let rounded = exact.round();
    if (exact - rounded).abs() >= 1e-5 {
        return Err(CubeError::MalformedInput(format!(
            "tile size must be a power of three, got {tile_size}"
        )));
    }
    Ok(square_level + rounded as u32)
}
