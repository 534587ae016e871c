//! Metadata extraction from AGDC archive filenames.
//!
//! Landsat observations in the AGDC are named like
//! `LS7_ETM_NBAR_149_-036_2012-02-10T23-50-47.650696.tif`: satellite id,
//! sensor id, product code, longitude, latitude, and a timestamp whose
//! time-of-day separators are dashes. A filename that does not match the
//! pattern is fatal.

use chrono::{DateTime, NaiveDate, Utc};

use cube_common::{CubeError, CubeResult};

/// Metadata recovered from an AGDC observation filename.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterFileInfo {
    /// Satellite identifier (e.g. LS7)
    pub satellite: String,
    /// Sensor identifier (e.g. ETM)
    pub sensor: String,
    /// Product code (e.g. NBAR)
    pub product: String,
    /// Longitude of the tile reference corner (degrees)
    pub lon: f64,
    /// Latitude of the tile reference corner (degrees)
    pub lat: f64,
    /// Acquisition timestamp (UTC, microsecond precision)
    pub timestamp: DateTime<Utc>,
}

impl RasterFileInfo {
    /// Format back into the archive filename. `format_name` and
    /// [`parse_filename`] round-trip to microsecond precision.
    pub fn format_name(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}_{}.tif",
            self.satellite,
            self.sensor,
            self.product,
            self.lon,
            self.lat,
            self.timestamp.format("%Y-%m-%dT%H-%M-%S%.6f")
        )
    }
}

fn malformed(name: &str) -> CubeError {
    CubeError::MalformedInput(format!("invalid AGDC filename: {name:?}"))
}

/// Parse an AGDC observation filename.
pub fn parse_filename(name: &str) -> CubeResult<RasterFileInfo> {
    let stem = name.strip_suffix(".tif").ok_or_else(|| malformed(name))?;

    let parts: Vec<&str> = stem.split('_').collect();
    let [satellite, sensor, product, lon, lat, timestamp] = parts[..] else {
        return Err(malformed(name));
    };

    Ok(RasterFileInfo {
        satellite: satellite.to_string(),
        sensor: sensor.to_string(),
        product: product.to_string(),
        lon: lon.parse().map_err(|_| malformed(name))?,
        lat: lat.parse().map_err(|_| malformed(name))?,
        timestamp: parse_timestamp(timestamp).ok_or_else(|| malformed(name))?,
    })
}

/// Parse the dash-separated timestamp: `YYYY-MM-DDTHH-MM-SS[.ffffff]`.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let (date, time) = s.split_once('T')?;

    let date_parts: Vec<&str> = date.split('-').collect();
    let [year, month, day] = date_parts[..] else {
        return None;
    };
    let time_parts: Vec<&str> = time.split('-').collect();
    let [hour, minute, second] = time_parts[..] else {
        return None;
    };

    // Seconds may carry a fractional part, kept to microsecond precision
    let raw_second: f64 = second.parse().ok()?;
    if !(0.0..60.0).contains(&raw_second) {
        return None;
    }
    let whole_second = raw_second as u32;
    let microsecond = ((raw_second - whole_second as f64) * 1e6).round() as u32;

    let naive = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?
        .and_hms_micro_opt(hour.parse().ok()?, minute.parse().ok()?, whole_second, microsecond)?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const SAMPLE: &str = "LS7_ETM_NBAR_149_-036_2012-02-10T23-50-47.650696.tif";

    #[test]
    fn test_parse_sample_filename() {
        let info = parse_filename(SAMPLE).unwrap();
        assert_eq!(info.satellite, "LS7");
        assert_eq!(info.sensor, "ETM");
        assert_eq!(info.product, "NBAR");
        assert_eq!(info.lon, 149.0);
        assert_eq!(info.lat, -36.0);
        assert_eq!(
            info.timestamp.to_rfc3339(),
            "2012-02-10T23:50:47.650696+00:00"
        );
    }

    #[test]
    fn test_round_trip() {
        let info = parse_filename(SAMPLE).unwrap();
        let reparsed = parse_filename(&info.format_name()).unwrap();
        assert_eq!(reparsed, info);
        assert_eq!(reparsed.timestamp.nanosecond(), 650_696_000);
    }

    #[test]
    fn test_whole_second_timestamp() {
        let info = parse_filename("LS5_TM_PQA_117_-021_1998-06-01T01-15-30.tif").unwrap();
        assert_eq!(info.timestamp.to_rfc3339(), "1998-06-01T01:15:30+00:00");
        let reparsed = parse_filename(&info.format_name()).unwrap();
        assert_eq!(reparsed.timestamp, info.timestamp);
    }

    #[test]
    fn test_rejects_non_matching_names() {
        for name in [
            "observation.tif",
            "LS7_ETM_NBAR_149_-036.tif",
            "LS7_ETM_NBAR_149_-036_2012-02-10T23-50-47.650696.png",
            "LS7_ETM_NBAR_abc_-036_2012-02-10T23-50-47.650696.tif",
            "LS7_ETM_NBAR_149_-036_2012-02-10T23-50-99.tif",
            "",
        ] {
            assert!(parse_filename(name).is_err(), "accepted {name:?}");
        }
    }
}
