//! Flattening NetCDF variables into polars tables
//!
//! Rows are the cartesian product of the dimensions, last dimension fastest.
//! Each dimension becomes a column holding its coordinate values, or the
//! index when the dimension has no coordinate variable. A variable that spans
//! only some of the dimensions is repeated along the others. Missing values
//! become nulls.

use crate::dataset::Dataset;
use crate::errors::{InspectorError, Result};
use ndarray::{ArrayD, IxDyn};
use polars::prelude::{Column, DataFrame};
use tracing::debug;

/// A dimension as laid out in a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDimension {
    pub name: String,
    pub length: usize,
}

/// Decoded variable and the names of the dimensions it spans
#[derive(Debug, Clone)]
struct TableVariable {
    name: String,
    dims: Vec<String>,
    data: ArrayD<f64>,
}

fn variable_dimensions(dataset: &Dataset, var_name: &str) -> Result<Vec<TableDimension>> {
    Ok(dataset
        .variable(var_name)?
        .dimensions()
        .iter()
        .map(|d| TableDimension {
            name: d.name(),
            length: d.len(),
        })
        .collect())
}

/// One row per element of `var_name`, with a column per dimension.
///
/// # Errors
///
/// Fails for unknown or non-numeric variables.
pub fn variable_frame(dataset: &Dataset, var_name: &str) -> Result<DataFrame> {
    let data = dataset
        .read_decoded(var_name)?
        .ok_or_else(|| format!("variable '{var_name}' is not numeric and cannot be exported"))?;
    let dims = variable_dimensions(dataset, var_name)?;
    let variable = TableVariable {
        name: var_name.to_string(),
        dims: dims.iter().map(|d| d.name.clone()).collect(),
        data,
    };
    build_frame(dataset, &dims, &[variable])
}

/// Every numeric data variable joined over the union of their dimensions.
///
/// Dimensions are ordered by first use. Non-numeric variables are left out.
pub fn dataset_frame(dataset: &Dataset) -> Result<DataFrame> {
    let mut dims: Vec<TableDimension> = Vec::new();
    let mut variables = Vec::new();

    for name in dataset.data_variables() {
        let Some(data) = dataset.read_decoded(&name)? else {
            debug!(var = %name, "leaving non-numeric variable out of the table");
            continue;
        };
        let var_dims = variable_dimensions(dataset, &name)?;
        for dim in &var_dims {
            if !dims.iter().any(|d| d.name == dim.name) {
                dims.push(dim.clone());
            }
        }
        variables.push(TableVariable {
            name,
            dims: var_dims.into_iter().map(|d| d.name).collect(),
            data,
        });
    }

    if variables.is_empty() {
        return Err("dataset has no numeric data variables to export".into());
    }
    build_frame(dataset, &dims, &variables)
}

fn build_frame(
    dataset: &Dataset,
    dims: &[TableDimension],
    variables: &[TableVariable],
) -> Result<DataFrame> {
    let rows = dims
        .iter()
        .try_fold(1usize, |acc, d| acc.checked_mul(d.length))
        .ok_or_else(|| InspectorError::Generic("table has more rows than can be addressed".into()))?;

    let mut strides = vec![1usize; dims.len()];
    for k in (0..dims.len().saturating_sub(1)).rev() {
        strides[k] = strides[k + 1].saturating_mul(dims[k + 1].length);
    }
    let position = |row: usize, axis: usize| (row / strides[axis]) % dims[axis].length;

    let mut columns = Vec::with_capacity(dims.len() + variables.len());
    for (axis, dim) in dims.iter().enumerate() {
        // A variable column already carries this name
        let taken = variables.iter().any(|v| v.name == dim.name);
        let coordinate = if taken {
            None
        } else {
            dataset.coordinate_values(&dim.name, dim.length)?
        };

        let column = match coordinate {
            Some(values) => Column::new(
                dim.name.as_str().into(),
                (0..rows).map(|r| values[position(r, axis)]).collect::<Vec<f64>>(),
            ),
            None => {
                let name = if taken {
                    format!("{}_index", dim.name)
                } else {
                    dim.name.clone()
                };
                Column::new(
                    name.into(),
                    (0..rows)
                        .map(|r| position(r, axis) as u64)
                        .collect::<Vec<u64>>(),
                )
            }
        };
        columns.push(column);
    }

    for var in variables {
        let axes: Vec<usize> = var
            .dims
            .iter()
            .map(|name| dims.iter().position(|d| &d.name == name))
            .collect::<Option<_>>()
            .ok_or_else(|| format!("variable '{}' spans a dimension outside the table", var.name))?;

        let mut index = vec![0usize; axes.len()];
        let values: Vec<Option<f64>> = (0..rows)
            .map(|r| {
                for (slot, &axis) in index.iter_mut().zip(&axes) {
                    *slot = position(r, axis);
                }
                let value = var.data[IxDyn(&index)];
                value.is_finite().then_some(value)
            })
            .collect();
        columns.push(Column::new(var.name.as_str().into(), values));
    }

    debug!(rows, columns = columns.len(), "built table");
    Ok(DataFrame::new(columns)?)
}
