//! Defines command-line interface options using `clap` for nc_inspector.
//!
//! Every option is optional: with no arguments the inspector prompts for the
//! file path and the variable.

use crate::aerosol::BoundingBox;
use crate::export::DEFAULT_GEOJSON_DIR;
use clap::Parser;
use std::path::PathBuf;

/// An interactive inspector for NASA NetCDF satellite products
#[derive(Parser, Debug, Default)]
#[command(
    version,
    name = "nc_inspector",
    about = "Inspect NetCDF (.nc) satellite data files and their aerosol products"
)]
pub struct Args {
    /// Path to the NetCDF file. Prompted for when omitted.
    #[arg(short, long, env = "NC_INSPECTOR_FILE")]
    pub file: Option<PathBuf>,

    /// Variable to render. Prompted for when omitted.
    #[arg(long)]
    pub variable: Option<String>,

    /// List all variables in the file and exit
    #[arg(long)]
    pub list_vars: bool,

    /// Print the dataset overview (dimensions, coordinates, variables, global attributes)
    #[arg(long)]
    pub overview: bool,

    /// Search the file for aerosol optical depth variables
    #[arg(long)]
    pub find_aod: bool,

    /// Export the selected variable to CSV
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Export the selected variable, filtered to --bbox, to CSV as lat,lon,value rows
    #[arg(long, value_name = "PATH")]
    pub export_bbox_csv: Option<PathBuf>,

    /// Export every numeric data variable, joined over its dimensions, to CSV
    #[arg(long, value_name = "PATH")]
    pub export_dataset_csv: Option<PathBuf>,

    /// Export the same dataset table to Parquet
    #[arg(long, value_name = "PATH")]
    pub export_parquet: Option<PathBuf>,

    /// Write the dataset overview to a text file
    #[arg(long, value_name = "PATH")]
    pub export_info: Option<PathBuf>,

    /// Export the AOD variable within --bbox as GeoJSON into DIR
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = DEFAULT_GEOJSON_DIR)]
    pub export_geojson: Option<PathBuf>,

    /// Bounding box as west,south,east,north in degrees. Defaults to the Seattle metro area.
    #[arg(long, value_parser = parse_bbox_arg, allow_hyphen_values = true)]
    pub bbox: Option<BoundingBox>,

    /// Scan a directory for .nc/.nc4 files with valid AOD data inside --bbox
    #[arg(long, value_name = "DIR")]
    pub scan: Option<PathBuf>,

    /// Enable verbose diagnostics on stderr.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Bounding box from the command line, or the Seattle default
    pub fn bbox(&self) -> BoundingBox {
        self.bbox.unwrap_or_default()
    }

    /// Whether any file-level action that does not need a variable was requested.
    pub fn has_dataset_actions(&self) -> bool {
        self.overview
            || self.find_aod
            || self.export_dataset_csv.is_some()
            || self.export_parquet.is_some()
            || self.export_info.is_some()
            || self.export_geojson.is_some()
    }

    /// Whether a variable must be selected.
    pub fn needs_variable(&self) -> bool {
        self.variable.is_some()
            || self.export_csv.is_some()
            || self.export_bbox_csv.is_some()
            || !self.has_dataset_actions()
    }

    /// The export menu is only offered in a fully prompted session.
    pub fn offers_export_menu(&self) -> bool {
        self.variable.is_none()
            && self.export_csv.is_none()
            && self.export_bbox_csv.is_none()
            && !self.has_dataset_actions()
    }
}

fn parse_bbox_arg(s: &str) -> Result<BoundingBox, String> {
    s.parse::<BoundingBox>().map_err(|e| e.to_string())
}
