//! NetCDF metadata inspection and dataset overview
//!
//! This module provides functions for examining NetCDF file structure:
//! structured variable metadata, attribute formatting, the dataset overview
//! and the emptiness pre-check.

use crate::dataset::{dtype_name, variable_shape, Dataset};
use crate::errors::Result;
use crate::statistics::ValueSummary;
use netcdf::AttributeValue;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Global attribute values longer than this are cut in the overview.
pub const MAX_GLOBAL_ATTR_LENGTH: usize = 120;

/// Variable attribute values longer than this are cut in renderings.
pub const MAX_VARIABLE_ATTR_LENGTH: usize = 60;

/// Product attributes highlighted in the overview.
pub const KEY_GLOBAL_ATTRIBUTES: &[&str] = &[
    "product_name",
    "time_coverage_start",
    "time_coverage_end",
    "geospatial_lat_max",
    "geospatial_lat_min",
    "geospatial_lon_max",
    "geospatial_lon_min",
    "processing_version",
    "day_night_flag",
];

const SECTION_RULE: usize = 60;

/// Structured metadata for a NetCDF variable
#[derive(Debug, Clone)]
pub struct VariableMetadata {
    pub name: String,
    pub data_type: String,
    pub dimensions: Vec<DimensionInfo>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub total_elements: usize,
    pub estimated_size_bytes: usize,
}

impl VariableMetadata {
    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(|d| d.length).collect()
    }

    pub fn dimension_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.name.as_str()).collect()
    }

    /// String attribute such as `units` or `long_name`
    pub fn string_attribute(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name)? {
            AttributeValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Information about a dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

/// Get structured metadata for a variable
pub fn get_variable_metadata(dataset: &Dataset, var_name: &str) -> Result<VariableMetadata> {
    let var = dataset.variable(var_name)?;

    let data_type = dtype_name(&var);

    let dimensions: Vec<DimensionInfo> = var
        .dimensions()
        .iter()
        .map(|d| DimensionInfo {
            name: d.name(),
            length: d.len(),
            is_unlimited: d.is_unlimited(),
        })
        .collect();

    let mut attributes = BTreeMap::new();
    for attr in var.attributes() {
        if let Ok(value) = attr.value() {
            attributes.insert(attr.name().to_string(), value);
        }
    }

    let total_elements: usize = dimensions.iter().map(|d| d.length).product();
    let estimated_size_bytes = total_elements * element_size(&data_type);

    Ok(VariableMetadata {
        name: var_name.to_string(),
        data_type,
        dimensions,
        attributes,
        total_elements,
        estimated_size_bytes,
    })
}

/// Bytes per element for a dtype name from [`dtype_name`].
pub fn element_size(data_type: &str) -> usize {
    match data_type {
        "float64" | "int64" | "uint64" => 8,
        "float32" | "int32" | "uint32" => 4,
        "int16" | "uint16" => 2,
        "int8" | "uint8" | "char" => 1,
        _ => 4,
    }
}

/// Human-readable byte count
pub fn format_size(total_bytes: usize) -> String {
    #[allow(clippy::cast_precision_loss)]
    let bytes = total_bytes as f64;
    if total_bytes < 1024 {
        format!("{} bytes", total_bytes)
    } else if total_bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes / 1024.0)
    } else if total_bytes < 1024 * 1024 * 1024 {
        format!("{:.2} MB", bytes / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Shape as a tuple, `(3, 4)`, `(5,)` or `()` for scalars.
pub fn format_shape(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({},)", n),
        _ => format!(
            "({})",
            shape
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Renders an attribute value without Rust debug noise for scalars and strings.
pub fn format_attribute_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Str(s) => s.clone(),
        AttributeValue::Strs(ss) => ss.join(", "),
        AttributeValue::Float(f) => f.to_string(),
        AttributeValue::Floats(fs) => format!("{:?}", fs),
        AttributeValue::Double(d) => d.to_string(),
        AttributeValue::Doubles(ds) => format!("{:?}", ds),
        AttributeValue::Int(i) => i.to_string(),
        AttributeValue::Ints(is) => format!("{:?}", is),
        AttributeValue::Short(s) => s.to_string(),
        AttributeValue::Shorts(ss) => format!("{:?}", ss),
        AttributeValue::Uchar(u) => u.to_string(),
        AttributeValue::Uchars(us) => format!("{:?}", us),
        AttributeValue::Ushort(u) => u.to_string(),
        AttributeValue::Ushorts(us) => format!("{:?}", us),
        AttributeValue::Uint(u) => u.to_string(),
        AttributeValue::Uints(us) => format!("{:?}", us),
        other => format!("{:?}", other),
    }
}

/// Cuts `text` to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn section(out: &mut String, title: &str) -> Result<()> {
    writeln!(out, "\n{}", "=".repeat(SECTION_RULE))?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(SECTION_RULE))?;
    Ok(())
}

/// Global attributes sorted by name, as `(name, value)` text pairs.
pub fn global_attributes(dataset: &Dataset) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = dataset
        .file()
        .attributes()
        .map(|attr| {
            let value = match attr.value() {
                Ok(v) => format_attribute_value(&v),
                Err(e) => format!("(error reading value: {})", e),
            };
            (attr.name().to_string(), value)
        })
        .collect();
    attrs.sort_by(|a, b| a.0.cmp(&b.0));
    attrs
}

/// Full text overview of a dataset: counts, dimensions, coordinates, data
/// variables and global attributes.
pub fn dataset_overview(dataset: &Dataset) -> Result<String> {
    let mut out = String::new();
    let data_vars = dataset.data_variables();
    let coords = dataset.coordinate_variables();
    let mut dimensions: Vec<_> = dataset.file().dimensions().collect();
    dimensions.sort_by(|a, b| a.name().cmp(&b.name()));

    section(&mut out, "DATASET OVERVIEW")?;
    writeln!(out, "File: {}", dataset.path().display())?;
    if let Some(title) = dataset.title() {
        writeln!(out, "Title: {}", title)?;
    }
    writeln!(out, "   Data Variables: {}", data_vars.len())?;
    writeln!(out, "   Coordinates: {}", coords.len())?;
    writeln!(out, "   Dimensions: {}", dimensions.len())?;

    section(&mut out, "DIMENSIONS:")?;
    if dimensions.is_empty() {
        writeln!(out, "  (No dimensions found)")?;
    }
    for dim in &dimensions {
        if dim.is_unlimited() {
            writeln!(out, "  {}: {} (unlimited)", dim.name(), dim.len())?;
        } else {
            writeln!(out, "  {}: {}", dim.name(), dim.len())?;
        }
    }

    section(&mut out, "COORDINATES:")?;
    if coords.is_empty() {
        writeln!(out, "  No coordinates found")?;
    }
    for name in &coords {
        let meta = get_variable_metadata(dataset, name)?;
        writeln!(out, "\n  {}:", name)?;
        writeln!(out, "    Shape: {}", format_shape(&meta.shape()))?;
        writeln!(out, "    Data type: {}", meta.data_type)?;
        if let Some(values) = dataset.read_decoded(name)? {
            if !values.is_empty() && values.len() <= 10 {
                writeln!(out, "    Values: {:?}", values.iter().collect::<Vec<_>>())?;
            } else {
                let summary = ValueSummary::from_array(&values);
                if summary.has_valid() {
                    writeln!(out, "    Range: {} to {}", summary.min, summary.max)?;
                }
            }
        }
    }

    section(&mut out, "DATA VARIABLES:")?;
    if data_vars.is_empty() {
        writeln!(out, "  NO DATA VARIABLES FOUND")?;
    }
    for name in &data_vars {
        let meta = get_variable_metadata(dataset, name)?;
        writeln!(out, "\n- {}", name)?;
        writeln!(out, "  Shape: {}", format_shape(&meta.shape()))?;
        writeln!(out, "  Dimensions: ({})", meta.dimension_names().join(", "))?;
        if let Some(long_name) = meta.string_attribute("long_name") {
            writeln!(out, "  Description: {}", long_name)?;
        }
        if let Some(units) = meta.string_attribute("units") {
            writeln!(out, "  Units: {}", units)?;
        }
    }

    section(&mut out, "GLOBAL ATTRIBUTES (Metadata):")?;
    let attrs = global_attributes(dataset);
    if attrs.is_empty() {
        writeln!(out, "  No global attributes")?;
    }
    for (key, value) in attrs {
        let value = truncate(&value, MAX_GLOBAL_ATTR_LENGTH);
        if KEY_GLOBAL_ATTRIBUTES.contains(&key.as_str()) {
            writeln!(out, "** {}: {}", key, value)?;
        } else {
            writeln!(out, "   - {}: {}", key, value)?;
        }
    }

    Ok(out)
}

/// Outcome of the emptiness check run right after opening a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreCheck {
    pub data_variables: usize,
    pub coordinates: usize,
    pub dimensions: usize,
    /// Element count of the first data variable
    pub total_points: usize,
}

impl PreCheck {
    pub const fn is_empty(&self) -> bool {
        self.total_points == 0
    }

    pub fn render(&self) -> String {
        let mut out = String::from("\n--- FILE VALIDATION CHECK ---\n");
        out.push_str(&format!(
            "Variables: {}, Coordinates: {}, Dimensions: {}\n",
            self.data_variables, self.coordinates, self.dimensions
        ));
        if self.is_empty() {
            out.push_str("\nWARNING: FILE APPEARS EMPTY OR CONTAINS NO DATA POINTS.\n");
            out.push_str("This often happens with Ocean Color (OC) products over land.\n");
            out.push_str("Recommendation: Use Aerosol products for urban air quality.\n");
        } else {
            out.push_str(&format!(
                "File contains {} data points (based on first variable).\n",
                self.total_points
            ));
        }
        out
    }
}

/// Counts variables and data points to flag files with no usable content.
pub fn pre_check(dataset: &Dataset) -> Result<PreCheck> {
    let data_vars = dataset.data_variables();
    let total_points = match data_vars.first() {
        Some(first) => variable_shape(&dataset.variable(first)?).iter().product(),
        None => 0,
    };

    Ok(PreCheck {
        data_variables: data_vars.len(),
        coordinates: dataset.coordinate_variables().len(),
        dimensions: dataset.file().dimensions().count(),
        total_points,
    })
}
