//! Human-readable rendering of a single variable
//!
//! This is what the inspector prints once the user has picked a variable.

use crate::dataset::Dataset;
use crate::errors::Result;
use crate::metadata::{
    format_attribute_value, format_shape, format_size, get_variable_metadata, truncate,
    MAX_VARIABLE_ATTR_LENGTH,
};
use crate::statistics::ValueSummary;
use std::fmt::Write as _;
use tracing::debug;

/// Variables with at most this many elements have every value printed.
pub const MAX_LISTED_VALUES: usize = 20;

/// Renders `name` from `dataset`: shape, dtype, dimensions, attributes and a
/// summary of the decoded values.
///
/// # Errors
///
/// [`crate::errors::InspectorError::VariableNotFound`] if `name` is absent.
pub fn select_and_render(dataset: &Dataset, name: &str) -> Result<String> {
    let meta = get_variable_metadata(dataset, name)?;
    debug!(var = name, dtype = %meta.data_type, "rendering variable");

    let mut out = String::new();
    writeln!(out, "\n  ✓ {}", meta.name)?;
    writeln!(out, "    Shape: {}", format_shape(&meta.shape()))?;
    if meta.dimensions.is_empty() {
        writeln!(out, "    Dimensions: (scalar)")?;
    } else {
        writeln!(out, "    Dimensions: ({})", meta.dimension_names().join(", "))?;
    }
    writeln!(out, "    Data type: {}", meta.data_type)?;

    if !meta.attributes.is_empty() {
        writeln!(out, "    Attributes:")?;
        for (key, value) in &meta.attributes {
            let text = truncate(&format_attribute_value(value), MAX_VARIABLE_ATTR_LENGTH);
            writeln!(out, "      - {}: {}", key, text)?;
        }
    }

    writeln!(
        out,
        "    Storage: {} elements, {}",
        meta.total_elements,
        format_size(meta.estimated_size_bytes)
    )?;

    let Some(values) = dataset.read_decoded(name)? else {
        writeln!(out, "    Data: (non-numeric data)")?;
        return Ok(out);
    };

    if values.len() <= MAX_LISTED_VALUES {
        let listed: Vec<String> = values.iter().map(|v| format_value(*v)).collect();
        writeln!(out, "    Data: [{}]", listed.join(", "))?;
    }

    let summary = ValueSummary::from_array(&values);
    if summary.total > 0 {
        writeln!(
            out,
            "    Non-NaN values: {}/{} ({:.1}%)",
            summary.valid,
            summary.total,
            summary.valid_percent()
        )?;
    }
    if summary.has_valid() {
        writeln!(out, "    Range: {} to {}", summary.min, summary.max)?;
        writeln!(out, "    Mean: {:.4}", summary.mean)?;
        writeln!(out, "    Std Dev: {:.4}", summary.std_dev)?;
    } else if summary.total > 0 {
        writeln!(out, "    ⚠ No valid data (all values are fill or NaN)")?;
    }

    Ok(out)
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        v.to_string()
    }
}
