//! Centralized error handling for nc_inspector
//!
//! Every fallible operation in the crate returns [`Result`], so the binary can
//! report any failure with one message and exit with a non-zero status.

use std::fmt;
use std::path::PathBuf;

/// Main error type for nc_inspector operations
#[derive(Debug)]
pub enum InspectorError {
    /// The given path does not exist
    FileNotFound { path: PathBuf },

    /// The path exists but libnetcdf could not open it as a NetCDF file
    InvalidFormat {
        path: PathBuf,
        source: netcdf::Error,
    },

    /// Variable not found in NetCDF file
    VariableNotFound { var: String },

    /// None of the candidate coordinate names exist in the file
    CoordinateNotFound { names: Vec<String> },

    /// User input that does not name a menu entry or a variable
    InvalidSelection { input: String },

    /// NetCDF operation errors after the file was opened
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// GeoJSON serialization error
    JsonError(serde_json::Error),

    /// Building or writing a CSV/Parquet table failed
    TableError(polars::prelude::PolarsError),

    /// Anything else
    Generic(String),
}

impl InspectorError {
    /// Process exit code used by the binary when this error ends the run.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for InspectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectorError::FileNotFound { path } => {
                write!(f, "File not found at {}", path.display())
            }
            InspectorError::InvalidFormat { path, source } => {
                write!(f, "{} is not a valid NetCDF file: {}", path.display(), source)
            }
            InspectorError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in file", var)
            }
            InspectorError::CoordinateNotFound { names } => {
                write!(f, "Could not find a coordinate named any of: {}", names.join(", "))
            }
            InspectorError::InvalidSelection { input } => {
                write!(f, "Invalid selection: '{}'", input)
            }
            InspectorError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            InspectorError::IoError(e) => write!(f, "I/O error: {}", e),
            InspectorError::ArrayError(e) => write!(f, "Array error: {}", e),
            InspectorError::JsonError(e) => write!(f, "JSON error: {}", e),
            InspectorError::TableError(e) => write!(f, "Table export error: {}", e),
            InspectorError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for InspectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InspectorError::InvalidFormat { source, .. } => Some(source),
            InspectorError::NetCDFError(e) => Some(e),
            InspectorError::IoError(e) => Some(e),
            InspectorError::ArrayError(e) => Some(e),
            InspectorError::JsonError(e) => Some(e),
            InspectorError::TableError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for InspectorError {
    fn from(error: netcdf::Error) -> Self {
        InspectorError::NetCDFError(error)
    }
}

impl From<std::io::Error> for InspectorError {
    fn from(error: std::io::Error) -> Self {
        InspectorError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for InspectorError {
    fn from(error: ndarray::ShapeError) -> Self {
        InspectorError::ArrayError(error)
    }
}

impl From<serde_json::Error> for InspectorError {
    fn from(error: serde_json::Error) -> Self {
        InspectorError::JsonError(error)
    }
}

impl From<polars::prelude::PolarsError> for InspectorError {
    fn from(error: polars::prelude::PolarsError) -> Self {
        InspectorError::TableError(error)
    }
}

impl From<std::fmt::Error> for InspectorError {
    fn from(error: std::fmt::Error) -> Self {
        InspectorError::Generic(format!("formatting failed: {}", error))
    }
}

impl From<String> for InspectorError {
    fn from(error: String) -> Self {
        InspectorError::Generic(error)
    }
}

impl From<&str> for InspectorError {
    fn from(error: &str) -> Self {
        InspectorError::Generic(error.to_string())
    }
}

/// Result type alias for nc_inspector operations
pub type Result<T> = std::result::Result<T, InspectorError>;
