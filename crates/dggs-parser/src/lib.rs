//! Hierarchical DGGS container access backed by the NetCDF-4/HDF5 library.
//!
//! The container is a tree of nested named groups. A group is a data cell
//! iff it holds a "data" member, in which case it must also hold a "pixel"
//! member (the coarse per-band sample) and attributes describing its
//! footprint. Traversal uses an explicit worklist over an abstract node
//! handle; see [`node::GridNode`].

pub mod cell;
pub mod node;
pub mod walk;

use std::path::Path;

use chrono::{DateTime, Utc};

use cube_common::{CubeError, CubeResult};

pub use cell::{BandSelection, CellMeta, DataCell};
pub use node::{ArrayData, GridNode, MemGroup, MemNode};
pub use walk::CellWalk;

fn nc_err(e: netcdf::Error) -> CubeError {
    CubeError::ContainerRead(e.to_string())
}

/// An opened DGGS container file.
pub struct DggsDataset {
    file: netcdf::File,
    requested_band: usize,
    /// Container-level acquisition time, used by cells without their own.
    timestamp: Option<DateTime<Utc>>,
}

impl DggsDataset {
    /// Open a container. `band` is the 0-based band index to load; it is
    /// validated against the first data cell encountered.
    pub fn open(path: &Path, band: usize) -> CubeResult<Self> {
        let file = netcdf::open(path).map_err(nc_err)?;

        let root = NcNode::root(&file);
        let timestamp = match root.attr_string("datetime")? {
            Some(text) => Some(cell::parse_timestamp(&text, "/")?),
            None => None,
        };

        tracing::debug!(path = %path.display(), band, "Opened DGGS container");

        Ok(Self {
            file,
            requested_band: band,
            timestamp,
        })
    }

    /// Lazy sequence of data cells in traversal order.
    pub fn cells(&self) -> Cells<'_> {
        Cells {
            walk: CellWalk::new(NcNode::root(&self.file)),
            requested_band: self.requested_band,
            selection: None,
            fallback_timestamp: self.timestamp,
        }
    }
}

/// Iterator over the data cells of a container.
///
/// Band selection is resolved once, at the first data cell, and every later
/// cell is checked against it.
pub struct Cells<'f> {
    walk: CellWalk<NcNode<'f>>,
    requested_band: usize,
    selection: Option<BandSelection>,
    fallback_timestamp: Option<DateTime<Utc>>,
}

impl Iterator for Cells<'_> {
    type Item = CubeResult<DataCell>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = match self.walk.next()? {
            Ok(node) => node,
            Err(e) => return Some(Err(e)),
        };

        let selection = match self.selection {
            Some(selection) => selection,
            None => {
                let band_count = match cell::cell_band_count(&node) {
                    Ok(count) => count,
                    Err(e) => return Some(Err(e)),
                };
                match BandSelection::resolve(self.requested_band, band_count) {
                    Ok(selection) => *self.selection.insert(selection),
                    Err(e) => return Some(Err(e)),
                }
            }
        };

        Some(cell::extract_cell(&node, selection, self.fallback_timestamp))
    }
}

/// Grid-node handle over a NetCDF group, resolved by address on each access.
pub struct NcNode<'f> {
    file: &'f netcdf::File,
    address: String,
}

impl<'f> NcNode<'f> {
    pub fn root(file: &'f netcdf::File) -> Self {
        Self {
            file,
            address: String::new(),
        }
    }

    fn group(&self) -> CubeResult<netcdf::Group<'f>> {
        let path: String = self
            .address
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        if path.is_empty() {
            return self.file.root().ok_or_else(|| {
                CubeError::ContainerRead("container has no root group".to_string())
            });
        }
        self.file
            .group(&path)
            .map_err(nc_err)?
            .ok_or_else(|| CubeError::ContainerRead(format!("missing group {:?}", self.address)))
    }
}

impl GridNode for NcNode<'_> {
    fn address(&self) -> &str {
        &self.address
    }

    fn children(&self) -> CubeResult<Vec<Self>> {
        let group = self.group()?;
        Ok(group
            .groups()
            .map(|child| Self {
                file: self.file,
                address: format!("{}/{}", self.address, child.name()),
            })
            .collect())
    }

    fn has_member(&self, name: &str) -> bool {
        self.group()
            .map(|group| group.variable(name).is_some())
            .unwrap_or(false)
    }

    fn read_member(&self, name: &str) -> CubeResult<ArrayData> {
        let group = self.group()?;
        let variable = group.variable(name).ok_or_else(|| {
            CubeError::ContainerRead(format!("missing member {name:?} at {:?}", self.address))
        })?;

        let shape: Vec<usize> = variable.dimensions().iter().map(|d| d.len()).collect();
        let values = variable.get_values::<f64, _>(..).map_err(nc_err)?;
        ArrayData::new(shape, values)
    }

    fn attr_doubles(&self, name: &str) -> CubeResult<Option<Vec<f64>>> {
        let group = self.group()?;
        let Some(attribute) = group.attribute(name) else {
            return Ok(None);
        };

        use netcdf::AttributeValue;
        let values = match attribute.value().map_err(nc_err)? {
            AttributeValue::Double(v) => vec![v],
            AttributeValue::Doubles(v) => v,
            AttributeValue::Float(v) => vec![v as f64],
            AttributeValue::Floats(v) => v.into_iter().map(f64::from).collect(),
            other => {
                return Err(CubeError::ContainerRead(format!(
                    "attribute {name:?} at {:?} is not numeric: {other:?}",
                    self.address
                )));
            }
        };
        Ok(Some(values))
    }

    fn attr_string(&self, name: &str) -> CubeResult<Option<String>> {
        let group = self.group()?;
        let Some(attribute) = group.attribute(name) else {
            return Ok(None);
        };

        match attribute.value().map_err(nc_err)? {
            netcdf::AttributeValue::Str(v) => Ok(Some(v)),
            other => Err(CubeError::ContainerRead(format!(
                "attribute {name:?} at {:?} is not a string: {other:?}",
                self.address
            ))),
        }
    }
}
