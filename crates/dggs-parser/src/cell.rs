//! Data-cell extraction and band selection.

use chrono::{DateTime, Utc};

use cube_common::{CubeError, CubeResult, GeoPoint, Tile};

use crate::node::{ArrayData, GridNode};

/// Structured per-cell attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMeta {
    /// Bounding polygon corners in (lon, lat) order.
    pub bounds: [GeoPoint; 4],
    /// Acquisition timestamp.
    pub timestamp: DateTime<Utc>,
    /// Cell centre.
    pub centre: GeoPoint,
    /// Sentinel marking invalid samples, if the cell declares one.
    pub missing_value: Option<f64>,
}

/// How a band is picked out of the paired pixel/data arrays.
///
/// Resolved once per dataset from the configured band index and the first
/// cell's band count, instead of re-checking array sizes ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandSelection {
    /// The cell arrays carry exactly one band; the configured index must
    /// be 0.
    SingleBand,
    /// The cell arrays carry several bands; the selected index applies to
    /// both the pixel and the data array.
    MultiBand(usize),
}

impl BandSelection {
    /// Resolve the configured band index against a cell's band count.
    pub fn resolve(requested: usize, band_count: usize) -> CubeResult<Self> {
        match band_count {
            0 => Err(CubeError::MalformedInput(
                "cell `pixel` member is empty".to_string(),
            )),
            1 if requested == 0 => Ok(Self::SingleBand),
            1 => Err(CubeError::MalformedInput(format!(
                "band {requested} requested from a single-band cell"
            ))),
            n if requested < n => Ok(Self::MultiBand(requested)),
            n => Err(CubeError::MalformedInput(format!(
                "band {requested} out of range for a {n}-band cell"
            ))),
        }
    }

    /// The selected band index.
    pub fn band(&self) -> usize {
        match self {
            Self::SingleBand => 0,
            Self::MultiBand(band) => *band,
        }
    }

    fn check_band_count(&self, band_count: usize, address: &str) -> CubeResult<()> {
        let consistent = match self {
            Self::SingleBand => band_count == 1,
            Self::MultiBand(band) => *band < band_count,
        };
        if consistent {
            Ok(())
        } else {
            Err(CubeError::MalformedInput(format!(
                "cell {address:?} has {band_count} bands, inconsistent with the dataset"
            )))
        }
    }
}

/// One data cell: its coarse pixel sample, its data tile (band already
/// selected, sentinel mask applied) and its attributes.
#[derive(Debug, Clone)]
pub struct DataCell {
    /// Slash-delimited cell address, e.g. `/R/0/0/0/0/5`.
    pub address: String,
    /// Compact cell identifier: the address without separators.
    pub ident: String,
    /// Selected band index.
    pub band: usize,
    /// The coarse sample summarizing the whole cell for the selected band.
    pub pixel_value: f64,
    /// The fine data tile for the selected band.
    pub tile: Tile,
    pub meta: CellMeta,
}

/// Band count of a cell, taken from its pixel member.
pub fn cell_band_count<N: GridNode>(node: &N) -> CubeResult<usize> {
    Ok(node.read_member("pixel")?.values.len())
}

/// Extract a [`DataCell`] from a node yielded by the traversal.
///
/// `fallback_timestamp` is the container-level acquisition time, used when
/// the cell carries no `datetime` attribute of its own.
pub fn extract_cell<N: GridNode>(
    node: &N,
    selection: BandSelection,
    fallback_timestamp: Option<DateTime<Utc>>,
) -> CubeResult<DataCell> {
    let address = node.address().to_string();
    let pixel = node.read_member("pixel")?;
    let data = node.read_member("data")?;

    selection.check_band_count(pixel.values.len(), &address)?;
    let band = selection.band();
    let tile = select_band_plane(&data, &pixel, band, &address)?;
    let meta = read_meta(node, fallback_timestamp)?;

    let tile = match meta.missing_value {
        Some(sentinel) => tile.masked_by_sentinel(sentinel),
        None => tile,
    };

    Ok(DataCell {
        ident: address.replace('/', ""),
        band,
        pixel_value: pixel.values[band],
        tile,
        meta,
        address,
    })
}

/// Slice the selected band's plane out of the data array.
///
/// Multi-band cells store `band x rows x cols`; single-band cells store a
/// plain `rows x cols` plane. The pixel array's element count must pair up
/// with the data array's band axis, and grid tiles must be square.
fn select_band_plane(
    data: &ArrayData,
    pixel: &ArrayData,
    band: usize,
    address: &str,
) -> CubeResult<Tile> {
    let band_count = pixel.values.len();
    let (rows, cols, plane) = match data.shape[..] {
        [rows, cols] => {
            if band_count != 1 {
                return Err(CubeError::MalformedInput(format!(
                    "cell {address:?} has {band_count} pixel bands but a 2-D data member"
                )));
            }
            (rows, cols, data.values.clone())
        }
        [bands, rows, cols] => {
            if bands != band_count {
                return Err(CubeError::MalformedInput(format!(
                    "cell {address:?} has {band_count} pixel bands but {bands} data bands"
                )));
            }
            let plane_len = rows * cols;
            let start = band * plane_len;
            (rows, cols, data.values[start..start + plane_len].to_vec())
        }
        _ => {
            return Err(CubeError::MalformedInput(format!(
                "cell {address:?} data member must be 2-D or 3-D, got shape {:?}",
                data.shape
            )));
        }
    };

    if rows != cols {
        return Err(CubeError::MalformedInput(format!(
            "cell {address:?} tile must be square, got {rows}x{cols}"
        )));
    }

    Tile::new(rows, cols, plane)
}

fn read_meta<N: GridNode>(
    node: &N,
    fallback_timestamp: Option<DateTime<Utc>>,
) -> CubeResult<CellMeta> {
    let address = node.address();

    let bounds = node.attr_doubles("bounds")?.ok_or_else(|| {
        CubeError::MalformedInput(format!("cell {address:?} has no `bounds` attribute"))
    })?;
    if bounds.len() != 8 {
        return Err(CubeError::MalformedInput(format!(
            "cell {address:?} `bounds` must hold 4 (lon, lat) pairs, got {} values",
            bounds.len()
        )));
    }
    let corners = [
        GeoPoint::new(bounds[0], bounds[1]),
        GeoPoint::new(bounds[2], bounds[3]),
        GeoPoint::new(bounds[4], bounds[5]),
        GeoPoint::new(bounds[6], bounds[7]),
    ];

    let centre = node.attr_doubles("centre")?.ok_or_else(|| {
        CubeError::MalformedInput(format!("cell {address:?} has no `centre` attribute"))
    })?;
    let [centre_lon, centre_lat] = centre[..] else {
        return Err(CubeError::MalformedInput(format!(
            "cell {address:?} `centre` must hold one (lon, lat) pair"
        )));
    };

    let timestamp = match node.attr_string("datetime")? {
        Some(text) => parse_timestamp(&text, address)?,
        None => fallback_timestamp.ok_or_else(|| {
            CubeError::MalformedInput(format!(
                "cell {address:?} has no `datetime` attribute and the container has none either"
            ))
        })?,
    };

    let missing_value = match node.attr_doubles("missing_value")? {
        Some(values) if values.len() == 1 => Some(values[0]),
        Some(values) => {
            return Err(CubeError::MalformedInput(format!(
                "cell {address:?} `missing_value` must hold one value, got {}",
                values.len()
            )));
        }
        None => None,
    };

    Ok(CellMeta {
        bounds: corners,
        timestamp,
        centre: GeoPoint::new(centre_lon, centre_lat),
        missing_value,
    })
}

pub(crate) fn parse_timestamp(text: &str, address: &str) -> CubeResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            CubeError::MalformedInput(format!("cell {address:?} has bad timestamp {text:?}: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{MemGroup, MemNode};

    fn cell_node(group: MemGroup) -> MemNode {
        let tree = MemGroup::default().with_group("R", group);
        let root = MemNode::root(tree);
        root.children().unwrap().into_iter().next().unwrap()
    }

    fn single_band_group() -> MemGroup {
        MemGroup::default()
            .with_member("pixel", vec![1], vec![42.0])
            .with_member("data", vec![3, 3], (0..9).map(|i| i as f64).collect())
            .with_attr_doubles(
                "bounds",
                vec![149.0, -36.0, 149.0, -35.0, 150.0, -35.0, 150.0, -36.0],
            )
            .with_attr_doubles("centre", vec![149.5, -35.5])
            .with_attr_string("datetime", "2013-05-27T23:58:20Z")
    }

    #[test]
    fn test_single_band_extraction() {
        let node = cell_node(single_band_group());
        let selection = BandSelection::resolve(0, cell_band_count(&node).unwrap()).unwrap();
        assert_eq!(selection, BandSelection::SingleBand);

        let cell = extract_cell(&node, selection, None).unwrap();
        assert_eq!(cell.address, "/R");
        assert_eq!(cell.ident, "R");
        assert_eq!(cell.band, 0);
        assert_eq!(cell.pixel_value, 42.0);
        assert_eq!((cell.tile.rows(), cell.tile.cols()), (3, 3));
        assert_eq!(cell.meta.centre, GeoPoint::new(149.5, -35.5));
        assert_eq!(cell.meta.missing_value, None);
    }

    #[test]
    fn test_multi_band_selects_from_both_arrays() {
        let data: Vec<f64> = (0..27).map(|i| i as f64).collect();
        let group = single_band_group()
            .with_member("pixel", vec![3], vec![10.0, 11.0, 12.0])
            .with_member("data", vec![3, 3, 3], data);
        let node = cell_node(group);

        let selection = BandSelection::resolve(1, cell_band_count(&node).unwrap()).unwrap();
        assert_eq!(selection, BandSelection::MultiBand(1));

        let cell = extract_cell(&node, selection, None).unwrap();
        assert_eq!(cell.pixel_value, 11.0);
        // Band 1 plane of a 3x3x3 row-major array starts at 9
        assert_eq!(cell.tile.get(0, 0), 9.0);
        assert_eq!(cell.tile.get(2, 2), 17.0);
    }

    #[test]
    fn test_band_selection_violations() {
        assert!(BandSelection::resolve(1, 1).is_err());
        assert!(BandSelection::resolve(3, 3).is_err());
        assert!(BandSelection::resolve(0, 0).is_err());
        assert_eq!(
            BandSelection::resolve(2, 6).unwrap(),
            BandSelection::MultiBand(2)
        );
    }

    #[test]
    fn test_band_count_mismatch_is_fatal() {
        // Dataset resolved as 3-band, but this cell's data has 2 band planes
        let group = single_band_group()
            .with_member("pixel", vec![3], vec![1.0, 2.0, 3.0])
            .with_member("data", vec![2, 3, 3], (0..18).map(|i| i as f64).collect());
        let node = cell_node(group);

        let err = extract_cell(&node, BandSelection::MultiBand(1), None).unwrap_err();
        assert!(matches!(err, CubeError::MalformedInput(_)));
    }

    #[test]
    fn test_non_square_tile_is_fatal() {
        let group = single_band_group().with_member(
            "data",
            vec![2, 3],
            (0..6).map(|i| i as f64).collect(),
        );
        let node = cell_node(group);

        let err = extract_cell(&node, BandSelection::SingleBand, None).unwrap_err();
        assert!(matches!(err, CubeError::MalformedInput(_)));
    }

    #[test]
    fn test_sentinel_masks_tile() {
        let group = single_band_group()
            .with_member("data", vec![3, 3], vec![1.0, -999.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, -999.0])
            .with_attr_doubles("missing_value", vec![-999.0]);
        let node = cell_node(group);

        let cell = extract_cell(&node, BandSelection::SingleBand, None).unwrap();
        assert_eq!(cell.meta.missing_value, Some(-999.0));
        assert!(!cell.tile.is_valid(0, 1));
        assert!(!cell.tile.is_valid(2, 2));
        assert!(cell.tile.is_valid(1, 1));
    }

    #[test]
    fn test_timestamp_fallback_to_container() {
        let mut group = single_band_group();
        group.attr_strings.clear();
        let node = cell_node(group);

        let fallback = parse_timestamp("2012-02-10T23:50:47Z", "/").unwrap();
        let cell = extract_cell(&node, BandSelection::SingleBand, Some(fallback)).unwrap();
        assert_eq!(cell.meta.timestamp, fallback);

        let mut group = single_band_group();
        group.attr_strings.clear();
        let node = cell_node(group);
        assert!(extract_cell(&node, BandSelection::SingleBand, None).is_err());
    }

    #[test]
    fn test_missing_bounds_is_fatal() {
        let mut group = single_band_group();
        group.attr_doubles.remove("bounds");
        let node = cell_node(group);

        assert!(extract_cell(&node, BandSelection::SingleBand, None).is_err());
    }
}
