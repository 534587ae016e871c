//! Flat AGDC raster access backed by GDAL.
//!
//! Opens a georeferenced single- or multi-band raster, recovers acquisition
//! metadata from its archive filename, and exposes each band as a lazy
//! sequence of masked tile windows. Validity comes from the GDAL mask band,
//! which GDAL synthesizes as all-valid when the file carries none.

pub mod filename;
pub mod windows;

use std::path::Path;

use gdal::Dataset;

use cube_common::{AffineTransform, CubeError, CubeResult};

pub use filename::{parse_filename, RasterFileInfo};
pub use windows::{BandData, TileWindows, TileWindowsOwned};

fn gdal_err(e: gdal::errors::GdalError) -> CubeError {
    CubeError::RasterRead(e.to_string())
}

/// An opened AGDC raster file.
pub struct RasterDataset {
    dataset: Dataset,
    info: RasterFileInfo,
    transform: AffineTransform,
}

impl RasterDataset {
    /// Open a raster and parse its filename metadata. A filename that does
    /// not match the AGDC pattern is malformed input.
    pub fn open(path: &Path) -> CubeResult<Self> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CubeError::MalformedInput(format!("unreadable path: {path:?}")))?;
        let info = filename::parse_filename(name)?;

        let dataset = Dataset::open(path).map_err(gdal_err)?;
        let transform = AffineTransform(dataset.geo_transform().map_err(gdal_err)?);

        tracing::debug!(
            path = %path.display(),
            satellite = %info.satellite,
            bands = dataset.raster_count(),
            "Opened raster dataset"
        );

        Ok(Self {
            dataset,
            info,
            transform,
        })
    }

    /// Number of bands in the raster.
    pub fn band_count(&self) -> usize {
        self.dataset.raster_count()
    }

    /// Filename metadata for the whole raster.
    pub fn info(&self) -> &RasterFileInfo {
        &self.info
    }

    /// Affine geotransform mapping (row, col) to (lat, lon).
    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    /// Read one band (1-based GDAL index) and its validity mask into memory.
    pub fn read_band(&self, band: usize) -> CubeResult<BandData> {
        let rasterband = self.dataset.rasterband(band).map_err(gdal_err)?;
        let (cols, rows) = rasterband.size();

        let values = rasterband
            .read_as::<f64>((0, 0), (cols, rows), (cols, rows), None)
            .map_err(gdal_err)?;

        let mask_band = rasterband.open_mask_band().map_err(gdal_err)?;
        let mask = mask_band
            .read_as::<u8>((0, 0), (cols, rows), (cols, rows), None)
            .map_err(gdal_err)?;
        let valid = mask.data().iter().map(|&v| v != 0).collect();

        BandData::from_parts(band, rows, cols, values.data().to_vec(), valid)
    }
}
