//! Exports: dataset and variable tables (CSV, Parquet), bounding-box CSV,
//! dataset info text and GeoJSON
//!
//! Every export writes a single file and returns enough information for the
//! caller to report what was written. Tables go through polars writers, so
//! names containing the separator are quoted.

use crate::aerosol::{filter_bbox, find_aod_variable, find_coordinates, BoundingBox, GridPoint};
use crate::dataset::Dataset;
use crate::errors::{InspectorError, Result};
use crate::metadata::{dataset_overview, get_variable_metadata};
use crate::table::{dataset_frame, variable_frame};
use chrono::Utc;
use polars::prelude::{
    Column, CsvWriter, DataFrame, ParquetCompression, ParquetWriter, SerWriter,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory GeoJSON files go to when none is given.
pub const DEFAULT_GEOJSON_DIR: &str = "data/geojson";

fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<usize> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(frame)?;
    Ok(frame.height())
}

/// Writes every element of `var_name` as one CSV row.
///
/// Columns are the variable's dimensions followed by the variable itself.
/// A dimension column holds the coordinate values when the dimension has a
/// coordinate variable, otherwise the index. Missing values are empty.
/// Returns the number of data rows written.
pub fn export_variable_csv(dataset: &Dataset, var_name: &str, path: &Path) -> Result<usize> {
    let mut frame = variable_frame(dataset, var_name)?;
    let rows = write_csv(&mut frame, path)?;
    info!(var = var_name, rows, path = %path.display(), "exported variable to CSV");
    Ok(rows)
}

/// Writes all numeric data variables, joined over their dimensions, as CSV.
/// Returns the number of data rows written.
pub fn export_dataset_csv(dataset: &Dataset, path: &Path) -> Result<usize> {
    let mut frame = dataset_frame(dataset)?;
    let rows = write_csv(&mut frame, path)?;
    info!(rows, columns = frame.width(), path = %path.display(), "exported dataset to CSV");
    Ok(rows)
}

/// Same table as [`export_dataset_csv`], written as Snappy-compressed Parquet.
pub fn export_dataset_parquet(dataset: &Dataset, path: &Path) -> Result<usize> {
    let mut frame = dataset_frame(dataset)?;
    let mut file = File::create(path)?;
    ParquetWriter::new(&mut file)
        .with_compression(ParquetCompression::Snappy)
        .finish(&mut frame)?;
    info!(rows = frame.height(), path = %path.display(), "exported dataset to Parquet");
    Ok(frame.height())
}

/// Writes the bounding-box filtered cells of `var_name` as `lat,lon,<var>`.
/// Returns the number of data rows written.
pub fn export_bbox_csv(
    dataset: &Dataset,
    var_name: &str,
    bbox: &BoundingBox,
    path: &Path,
) -> Result<usize> {
    let points = filter_bbox(dataset, var_name, bbox)?;
    let column = |name: &str, pick: fn(&GridPoint) -> f64| {
        Column::new(name.into(), points.iter().map(pick).collect::<Vec<f64>>())
    };
    let mut frame = DataFrame::new(vec![
        column("lat", |p| p.lat),
        column("lon", |p| p.lon),
        column(var_name, |p| p.value),
    ])?;

    let rows = write_csv(&mut frame, path)?;
    info!(var = var_name, rows, path = %path.display(), "exported filtered CSV");
    Ok(rows)
}

/// Writes the dataset overview text to `path`.
pub fn export_info(dataset: &Dataset, path: &Path) -> Result<()> {
    let overview = dataset_overview(dataset)?;
    fs::write(path, overview)?;
    info!(path = %path.display(), "exported dataset info");
    Ok(())
}

/// GeoJSON `FeatureCollection` with a product metadata block
#[derive(Debug, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub metadata: GeoJsonMetadata,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct GeoJsonMetadata {
    pub source_product: String,
    pub time_start: String,
    pub time_end: String,
    pub variable_description: String,
    pub variable_name: String,
    pub exported_at: String,
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct FeatureProperties {
    pub aod: f64,
    pub lat: f64,
    pub lon: f64,
}

impl From<GridPoint> for Feature {
    fn from(p: GridPoint) -> Self {
        Self {
            kind: "Feature",
            geometry: Geometry {
                kind: "Point",
                coordinates: [p.lon, p.lat],
            },
            properties: FeatureProperties {
                aod: p.value,
                lat: p.lat,
                lon: p.lon,
            },
        }
    }
}

/// What [`export_geojson`] wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoJsonExport {
    pub path: PathBuf,
    pub variable: String,
    pub features: usize,
}

/// Builds the output file name from a PACE or VIIRS product file name.
///
/// `PACE_OCI.20250702.L3m.DAY.AER_UAA.V3_1.0p1deg.NRT.nc` becomes
/// `seattle_aod_PACE_20250702_0p1deg.geojson`.
pub fn geojson_file_name(nc_path: &Path) -> String {
    let base = nc_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut satellite = "unknown";
    let mut date = "undated".to_string();

    if let Some(rest) = base.split_once("PACE_OCI.").map(|(_, r)| r) {
        satellite = "PACE";
        if let Some(d) = rest.split('.').next().filter(|d| !d.is_empty()) {
            date = d.to_string();
        }
    } else if base.contains("VIIRS") {
        if let Some(julian) = base
            .split('.')
            .find(|part| part.len() == 7 && part.chars().all(|c| c.is_ascii_digit()))
        {
            date = julian.to_string();
        }
        satellite = if base.contains("NOAA20") {
            "NOAA20"
        } else if base.contains("NOAA21") || base.contains("JPSS2") {
            "NOAA21"
        } else if base.contains("NPP") {
            "NPP"
        } else {
            "VIIRS"
        };
    }

    let resolution = if base.contains("0p1deg") || base.contains("0.1deg") {
        "_0p1deg"
    } else if base.contains("1deg") {
        "_1deg"
    } else if base.contains("D10KM") {
        "_10km"
    } else {
        ""
    };

    format!("seattle_aod_{satellite}_{date}{resolution}.geojson")
}

fn attribute_or(dataset: &Dataset, names: &[&str], fallback: &str) -> String {
    names
        .iter()
        .find_map(|n| dataset.global_attribute_string(n))
        .unwrap_or_else(|| fallback.to_string())
}

/// Filters the AOD variable to `bbox` and writes a GeoJSON point collection
/// into `out_dir`, creating the directory if needed.
///
/// # Errors
///
/// Fails when the file has no known AOD variable, no latitude/longitude
/// coordinates, or no valid cells inside the box.
pub fn export_geojson(dataset: &Dataset, out_dir: &Path, bbox: &BoundingBox) -> Result<GeoJsonExport> {
    let variable = find_aod_variable(dataset).ok_or_else(|| {
        InspectorError::Generic(format!(
            "No AOD variable found in file. Looked for: {}",
            crate::aerosol::AOD_VARIABLE_CANDIDATES.join(", ")
        ))
    })?;
    let coords = find_coordinates(dataset)?;
    debug!(var = variable, lat = %coords.lat, lon = %coords.lon, "exporting GeoJSON");

    let points = filter_bbox(dataset, variable, bbox)?;
    if points.is_empty() {
        return Err(format!("No valid {variable} data points inside {bbox}").into());
    }

    let file_name = dataset
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let description = get_variable_metadata(dataset, variable)?
        .string_attribute("long_name")
        .unwrap_or("Aerosol Optical Depth")
        .to_string();

    let collection = FeatureCollection {
        kind: "FeatureCollection",
        metadata: GeoJsonMetadata {
            source_product: attribute_or(dataset, &["product_name"], &file_name),
            time_start: attribute_or(dataset, &["time_coverage_start", "RangeBeginningDate"], "N/A"),
            time_end: attribute_or(dataset, &["time_coverage_end", "RangeEndingDate"], "N/A"),
            variable_description: description,
            variable_name: variable.to_string(),
            exported_at: Utc::now().to_rfc3339(),
        },
        features: points.into_iter().map(Feature::from).collect(),
    };

    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(geojson_file_name(dataset.path()));
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, &collection)?;
    writer.flush()?;

    info!(path = %path.display(), features = collection.features.len(), "exported GeoJSON");
    Ok(GeoJsonExport {
        path,
        variable: variable.to_string(),
        features: collection.features.len(),
    })
}
