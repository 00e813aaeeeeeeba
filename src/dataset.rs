//! Opening NetCDF files and reading their variables
//!
//! [`Dataset`] owns the libnetcdf handle for the lifetime of an inspection.
//! Variables are borrowed from it, so nothing can be listed or selected
//! before a successful [`open`], and the handle is closed when the dataset
//! is dropped.

use crate::errors::{InspectorError, Result};
use ndarray::ArrayD;
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::{AttributeValue, File, Variable};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An opened NetCDF file
pub struct Dataset {
    path: PathBuf,
    file: File,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset").field("path", &self.path).finish()
    }
}

/// Opens the NetCDF file at `path`.
///
/// # Errors
///
/// - [`InspectorError::FileNotFound`] if nothing exists at `path`
/// - [`InspectorError::InvalidFormat`] if libnetcdf rejects the file
pub fn open(path: impl AsRef<Path>) -> Result<Dataset> {
    Dataset::open(path)
}

/// Names of all variables in `dataset`, in file definition order.
pub fn list_variables(dataset: &Dataset) -> Vec<String> {
    dataset.list_variables()
}

impl Dataset {
    /// See [`open`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InspectorError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), "opening NetCDF file");
        let file = netcdf::open(path).map_err(|source| InspectorError::InvalidFormat {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "opened NetCDF file");

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Path the dataset was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying libnetcdf handle
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Names of all variables, in file definition order.
    pub fn list_variables(&self) -> Vec<String> {
        self.file.variables().map(|v| v.name()).collect()
    }

    /// Variables that are not coordinate variables, in file order.
    pub fn data_variables(&self) -> Vec<String> {
        self.file
            .variables()
            .filter(|v| !is_coordinate_variable(v))
            .map(|v| v.name())
            .collect()
    }

    /// 1-D variables named after their own dimension, in file order.
    pub fn coordinate_variables(&self) -> Vec<String> {
        self.file
            .variables()
            .filter(is_coordinate_variable)
            .map(|v| v.name())
            .collect()
    }

    /// Looks up a variable by name.
    pub fn variable(&self, name: &str) -> Result<Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| InspectorError::VariableNotFound {
                var: name.to_string(),
            })
    }

    /// Whether a variable called `name` exists
    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Decoded values of the coordinate variable for dimension `dim`.
    ///
    /// `None` unless a 1-D variable named `dim` runs along `dim` itself with
    /// `len` elements. A same-named variable on another dimension does not
    /// count.
    pub fn coordinate_values(&self, dim: &str, len: usize) -> Result<Option<Vec<f64>>> {
        let Some(var) = self.file.variable(dim) else {
            return Ok(None);
        };
        if !is_coordinate_variable(&var) || variable_shape(&var) != [len] {
            debug!(dim, "no usable coordinate variable, falling back to index");
            return Ok(None);
        }
        Ok(self.read_decoded(dim)?.map(|a| a.into_raw_vec()))
    }

    /// Global `title` attribute, if the file carries one.
    pub fn title(&self) -> Option<String> {
        self.global_attribute_string("title")
    }

    /// Global attribute rendered as text.
    pub fn global_attribute_string(&self, name: &str) -> Option<String> {
        let value = self.file.attribute(name)?.value().ok()?;
        Some(match value {
            AttributeValue::Str(s) => s,
            other => crate::metadata::format_attribute_value(&other),
        })
    }

    /// Reads a numeric variable as `f64` with CF decoding applied.
    ///
    /// `_FillValue` and `missing_value` become NaN, then `scale_factor` and
    /// `add_offset` are applied. Returns `Ok(None)` for non-numeric variables.
    pub fn read_decoded(&self, name: &str) -> Result<Option<ArrayD<f64>>> {
        let var = self.variable(name)?;
        let Some(raw) = read_raw_f64(&var)? else {
            return Ok(None);
        };

        let decoding = CfDecoding::from_variable(&var);
        let values = decoding.apply(raw);
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        Ok(Some(ArrayD::from_shape_vec(shape, values)?))
    }
}

/// A coordinate variable is 1-D and shares its name with its dimension.
pub fn is_coordinate_variable(var: &Variable<'_>) -> bool {
    let dims = var.dimensions();
    dims.len() == 1 && dims[0].name() == var.name()
}

/// Shape of a variable as dimension lengths.
pub fn variable_shape(var: &Variable<'_>) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

/// Short numpy-style name for the variable's storage type, e.g. `float32`.
pub fn dtype_name(var: &Variable<'_>) -> String {
    match var.vartype() {
        NcVariableType::Int(int) => match int {
            IntType::U8 => "uint8",
            IntType::I8 => "int8",
            IntType::U16 => "uint16",
            IntType::I16 => "int16",
            IntType::U32 => "uint32",
            IntType::I32 => "int32",
            IntType::U64 => "uint64",
            IntType::I64 => "int64",
        }
        .to_string(),
        NcVariableType::Float(FloatType::F32) => "float32".to_string(),
        NcVariableType::Float(FloatType::F64) => "float64".to_string(),
        NcVariableType::Char => "char".to_string(),
        NcVariableType::String => "string".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

/// Reads a variable in its native numeric type and widens to `f64`.
fn read_raw_f64(var: &Variable<'_>) -> Result<Option<Vec<f64>>> {
    fn widen<T: Copy + Into<f64>>(values: Vec<T>) -> Vec<f64> {
        values.into_iter().map(Into::into).collect()
    }

    let values = match var.vartype() {
        NcVariableType::Int(IntType::U8) => widen(var.get_values::<u8, _>(..)?),
        NcVariableType::Int(IntType::I8) => widen(var.get_values::<i8, _>(..)?),
        NcVariableType::Int(IntType::U16) => widen(var.get_values::<u16, _>(..)?),
        NcVariableType::Int(IntType::I16) => widen(var.get_values::<i16, _>(..)?),
        NcVariableType::Int(IntType::U32) => widen(var.get_values::<u32, _>(..)?),
        NcVariableType::Int(IntType::I32) => widen(var.get_values::<i32, _>(..)?),
        #[allow(clippy::cast_precision_loss)]
        NcVariableType::Int(IntType::U64) => var
            .get_values::<u64, _>(..)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        #[allow(clippy::cast_precision_loss)]
        NcVariableType::Int(IntType::I64) => var
            .get_values::<i64, _>(..)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        NcVariableType::Float(FloatType::F32) => widen(var.get_values::<f32, _>(..)?),
        NcVariableType::Float(FloatType::F64) => var.get_values::<f64, _>(..)?,
        _ => {
            debug!(var = %var.name(), "skipping non-numeric variable");
            return Ok(None);
        }
    };
    Ok(Some(values))
}

/// Numeric attribute as `f64`, taking the first element of array values.
pub fn attribute_as_f64(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Uchar(v) => Some(f64::from(*v)),
        AttributeValue::Schar(v) => Some(f64::from(*v)),
        AttributeValue::Ushort(v) => Some(f64::from(*v)),
        AttributeValue::Short(v) => Some(f64::from(*v)),
        AttributeValue::Uint(v) => Some(f64::from(*v)),
        AttributeValue::Int(v) => Some(f64::from(*v)),
        AttributeValue::Float(v) => Some(f64::from(*v)),
        AttributeValue::Double(v) => Some(*v),
        AttributeValue::Uchars(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Schars(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Ushorts(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Shorts(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Uints(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Ints(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Floats(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Doubles(v) => v.first().copied(),
        _ => None,
    }
}

fn numeric_attribute(var: &Variable<'_>, name: &str) -> Option<f64> {
    let value = var.attribute(name)?.value().ok()?;
    attribute_as_f64(&value)
}

/// CF packing and masking attributes of one variable
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CfDecoding {
    pub fill_value: Option<f64>,
    pub missing_value: Option<f64>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
}

impl CfDecoding {
    pub fn from_variable(var: &Variable<'_>) -> Self {
        Self {
            fill_value: numeric_attribute(var, "_FillValue"),
            missing_value: numeric_attribute(var, "missing_value"),
            scale_factor: numeric_attribute(var, "scale_factor"),
            add_offset: numeric_attribute(var, "add_offset"),
        }
    }

    /// Masks fill/missing values to NaN, then unpacks.
    pub fn apply(&self, raw: Vec<f64>) -> Vec<f64> {
        let scale = self.scale_factor.unwrap_or(1.0);
        let offset = self.add_offset.unwrap_or(0.0);
        raw.into_iter()
            .map(|x| {
                if self.fill_value == Some(x) || self.missing_value == Some(x) {
                    f64::NAN
                } else {
                    x * scale + offset
                }
            })
            .collect()
    }
}

/// Cleans up a path typed at a prompt: trims whitespace, strips one level of
/// surrounding quotes and expands a leading `~`.
pub fn normalize_input_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(trimmed);

    if unquoted == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = unquoted.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(unquoted)
}
