//! Aerosol optical depth (AOD) discovery and spatial filtering
//!
//! Satellite aerosol products name their AOD field differently per mission
//! (PACE OCI, VIIRS Deep Blue / Dark Target, MODIS). This module finds the
//! field, locates the latitude/longitude coordinates and filters the grid
//! to a bounding box.

use crate::dataset::Dataset;
use crate::errors::{InspectorError, Result};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Known AOD variable names, most preferred first.
pub const AOD_VARIABLE_CANDIDATES: &[&str] = &[
    // PACE OCI
    "Aerosol_Optical_Depth_550",
    // VIIRS (NOAA-20, NOAA-21, Suomi NPP)
    "COMBINE_AOD_550_AVG",
    "DT_AOD_550_AVG",
    "DB_AOD_550_AVG",
    "DT_DB_AOD_550_AVG",
    "DB_DT_AOD_550_AVG",
    // MODIS and others
    "Optical_Depth_Land_And_Ocean",
    "AOD_550nm_Combined_Mean",
    "Aerosol_Optical_Depth_550nm_Mean",
    "AOD_550nm",
    "Deep_Blue_Aerosol_Optical_Depth_550_Land_Mean",
    "Dark_Target_Aerosol_Optical_Depth_550_Ocean_Mean",
];

/// Substrings that mark a variable as aerosol related.
pub const AOD_KEYWORDS: &[&str] = &["aod", "aerosol", "optical", "depth", "aot"];

pub const LATITUDE_NAMES: &[&str] = &["lat", "latitude", "Latitude", "LAT"];
pub const LONGITUDE_NAMES: &[&str] = &["lon", "longitude", "Longitude", "LON"];

/// First AOD candidate present in the dataset, in candidate order.
pub fn find_aod_variable(dataset: &Dataset) -> Option<&'static str> {
    AOD_VARIABLE_CANDIDATES
        .iter()
        .copied()
        .find(|name| dataset.has_variable(name))
}

/// Data variables whose name contains one of [`AOD_KEYWORDS`].
pub fn search_aerosol_variables(dataset: &Dataset) -> Vec<String> {
    dataset
        .data_variables()
        .into_iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            AOD_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .collect()
}

/// Names of the latitude/longitude variables and the dimensions they index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoCoordinates {
    pub lat: String,
    pub lon: String,
    pub lat_dim: String,
    pub lon_dim: String,
}

fn find_axis(dataset: &Dataset, names: &[&str]) -> Result<(String, String)> {
    for name in names {
        if let Ok(var) = dataset.variable(name) {
            if let [dim] = var.dimensions() {
                return Ok(((*name).to_string(), dim.name()));
            }
        }
    }
    Err(InspectorError::CoordinateNotFound {
        names: names.iter().map(|s| (*s).to_string()).collect(),
    })
}

/// Finds 1-D latitude and longitude variables; first matching name wins.
pub fn find_coordinates(dataset: &Dataset) -> Result<GeoCoordinates> {
    let (lat, lat_dim) = find_axis(dataset, LATITUDE_NAMES)?;
    let (lon, lon_dim) = find_axis(dataset, LONGITUDE_NAMES)?;
    Ok(GeoCoordinates {
        lat,
        lon,
        lat_dim,
        lon_dim,
    })
}

/// Geographic bounding box in degrees, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Seattle metro area
    pub const SEATTLE: Self = Self {
        west: -122.4,
        south: 47.4,
        east: -122.2,
        north: 47.7,
    };

    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self> {
        if !(west < east) {
            return Err(format!("west ({west}) must be less than east ({east})").into());
        }
        if !(south < north) {
            return Err(format!("south ({south}) must be less than north ({north})").into());
        }
        if south < -90.0 || north > 90.0 {
            return Err("latitudes must lie within -90..=90".into());
        }
        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::SEATTLE
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat {}-{}, Lon {}-{}",
            self.south, self.north, self.west, self.east
        )
    }
}

impl FromStr for BoundingBox {
    type Err = InspectorError;

    /// Parses `west,south,east,north`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| format!("invalid bounding box '{s}': {e}"))?;
        match parts.as_slice() {
            [west, south, east, north] => Self::new(*west, *south, *east, *north),
            _ => Err(format!(
                "invalid bounding box '{s}': expected 'west,south,east,north'"
            )
            .into()),
        }
    }
}

/// One valid grid cell inside a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

fn decoded_coordinate(dataset: &Dataset, name: &str) -> Result<Vec<f64>> {
    dataset
        .read_decoded(name)?
        .map(|a| a.into_raw_vec())
        .ok_or_else(|| format!("coordinate '{name}' is not numeric").into())
}

/// Valid cells of `var_name` whose coordinates fall inside `bbox`.
///
/// The variable must span both the latitude and longitude dimensions; any
/// other dimensions are flattened, yielding one point per cell.
pub fn filter_bbox(dataset: &Dataset, var_name: &str, bbox: &BoundingBox) -> Result<Vec<GridPoint>> {
    let coords = find_coordinates(dataset)?;
    let var = dataset.variable(var_name)?;
    let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();

    let axis_of = |dim: &str| {
        dim_names.iter().position(|d| d == dim).ok_or_else(|| {
            InspectorError::Generic(format!(
                "variable '{var_name}' does not span dimension '{dim}'"
            ))
        })
    };
    let lat_axis = axis_of(&coords.lat_dim)?;
    let lon_axis = axis_of(&coords.lon_dim)?;

    let lats = decoded_coordinate(dataset, &coords.lat)?;
    let lons = decoded_coordinate(dataset, &coords.lon)?;
    let data = dataset
        .read_decoded(var_name)?
        .ok_or_else(|| format!("variable '{var_name}' is not numeric"))?;

    let points: Vec<GridPoint> = data
        .indexed_iter()
        .filter_map(|(idx, &value)| {
            let lat = lats[idx[lat_axis]];
            let lon = lons[idx[lon_axis]];
            (value.is_finite() && bbox.contains(lat, lon)).then_some(GridPoint { lat, lon, value })
        })
        .collect();

    debug!(var = var_name, points = points.len(), bbox = %bbox, "filtered to bounding box");
    Ok(points)
}

/// Number of valid cells of `var_name` inside `bbox`.
pub fn count_valid_in_bbox(dataset: &Dataset, var_name: &str, bbox: &BoundingBox) -> Result<usize> {
    Ok(filter_bbox(dataset, var_name, bbox)?.len())
}
