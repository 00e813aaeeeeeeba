//! nc_inspector: interactive NetCDF inspection for NASA satellite products
//!
//! Opens a NetCDF (.nc) file through libnetcdf, lists its variables and
//! renders the one the user selects: shape, data type, attributes and a
//! summary of the CF-decoded values. Around that core sit the helpers for
//! working with aerosol products such as PACE/OCI and VIIRS AOD:
//!
//! - [`dataset`]: opening files, listing variables, CF decoding
//! - [`render`]: the single-variable rendering
//! - [`metadata`]: structured metadata and the dataset overview
//! - [`statistics`]: value summaries that skip missing data
//! - [`aerosol`]: AOD variable discovery and bounding-box filtering
//! - [`table`]: variables flattened into polars tables
//! - [`export`]: CSV, Parquet, text and GeoJSON exports
//! - [`scan`]: directory scan for files with valid AOD data
//! - [`session`]: the interactive prompt flow
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nc_inspector::prelude::*;
//!
//! let dataset = open("PACE_OCI.20250702.L3m.DAY.AER_UAA.V3_1.0p1deg.NRT.nc").unwrap();
//! for name in list_variables(&dataset) {
//!     println!("{}", name);
//! }
//! println!("{}", select_and_render(&dataset, "Aerosol_Optical_Depth_550").unwrap());
//! ```

pub mod aerosol;
pub mod cli;
pub mod dataset;
pub mod errors;
pub mod export;
pub mod metadata;
pub mod render;
pub mod scan;
pub mod session;
pub mod statistics;
pub mod table;

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::aerosol::{BoundingBox, GridPoint};
    pub use crate::dataset::{list_variables, open, Dataset};
    pub use crate::errors::{InspectorError, Result};
    pub use crate::render::select_and_render;
    pub use crate::session::Session;
    pub use crate::statistics::ValueSummary;
}
