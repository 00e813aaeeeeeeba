//! NetCDF fixtures shared by the integration tests

#![allow(dead_code)]

use nc_inspector::errors::Result;
use ndarray::{Array1, Array2};
use netcdf::create;
use std::path::Path;

pub const AOD_VAR: &str = "Aerosol_Optical_Depth_550";
pub const ANGSTROM_VAR: &str = "Angstrom_440_670";

pub const LATS: [f32; 3] = [47.5, 47.6, 48.5];
pub const LONS: [f32; 4] = [-123.0, -122.35, -122.25, -121.0];

/// Writes a small PACE-like L3 aerosol file.
///
/// Inside the Seattle box are cells (0,1), (0,2), (1,1) and (1,2); (0,2) holds
/// the fill value, leaving three valid AOD points: 0.2, 0.6 and 0.7.
pub fn write_aod_fixture(path: &Path) -> Result<()> {
    let mut file = create(path)?;

    file.add_attribute("title", "PACE OCI Level-3 Test Aerosol")?;
    file.add_attribute("product_name", "PACE_OCI.20250702.L3m.DAY.AER_UAA.V3_1.0p1deg.NRT.nc")?;
    file.add_attribute("time_coverage_start", "2025-07-02T00:00:00Z")?;
    file.add_attribute("time_coverage_end", "2025-07-02T23:59:59Z")?;

    file.add_dimension("lat", LATS.len())?;
    file.add_dimension("lon", LONS.len())?;

    {
        let mut lat = file.add_variable::<f32>("lat", &["lat"])?;
        lat.put_attribute("units", "degrees_north")?;
        lat.put(Array1::from(LATS.to_vec()).view(), ..)?;
    }
    {
        let mut lon = file.add_variable::<f32>("lon", &["lon"])?;
        lon.put_attribute("units", "degrees_east")?;
        lon.put(Array1::from(LONS.to_vec()).view(), ..)?;
    }
    {
        let mut aod = file.add_variable::<f32>(AOD_VAR, &["lat", "lon"])?;
        aod.put_attribute("long_name", "Aerosol optical depth at 550 nm")?;
        aod.put_attribute("units", "1")?;
        aod.put_attribute("_FillValue", -999.0f32)?;
        let values = Array2::from_shape_vec(
            (3, 4),
            vec![
                0.1f32, 0.2, -999.0, 0.4, //
                0.5, 0.6, 0.7, 0.8, //
                0.9, 1.0, 1.1, 1.2,
            ],
        )?;
        aod.put(values.view(), ..)?;
    }
    {
        let mut angstrom = file.add_variable::<i16>(ANGSTROM_VAR, &["lat", "lon"])?;
        angstrom.put_attribute("_FillValue", -32767i16)?;
        angstrom.put_attribute("scale_factor", 0.001f32)?;
        angstrom.put_attribute("add_offset", 0.0f32)?;
        let values = Array2::from_shape_vec(
            (3, 4),
            vec![
                1000i16, 1200, -32767, 1400, //
                1500, 1600, 1700, 1800, //
                1900, 2000, 2100, 2200,
            ],
        )?;
        angstrom.put(values.view(), ..)?;
    }

    Ok(())
}

/// Writes a file whose AOD grid is entirely fill inside the Seattle box.
pub fn write_masked_fixture(path: &Path) -> Result<()> {
    let mut file = create(path)?;
    file.add_dimension("lat", 2)?;
    file.add_dimension("lon", 2)?;
    {
        let mut lat = file.add_variable::<f32>("lat", &["lat"])?;
        lat.put(Array1::from(vec![47.5f32, 47.6]).view(), ..)?;
    }
    {
        let mut lon = file.add_variable::<f32>("lon", &["lon"])?;
        lon.put(Array1::from(vec![-122.3f32, -122.25]).view(), ..)?;
    }
    {
        let mut aod = file.add_variable::<f32>(AOD_VAR, &["lat", "lon"])?;
        aod.put_attribute("_FillValue", -999.0f32)?;
        let values = Array2::from_shape_vec((2, 2), vec![-999.0f32; 4])?;
        aod.put(values.view(), ..)?;
    }
    Ok(())
}

/// Dimension `x` has no coordinate: the variable named `x` runs along `y`.
pub fn write_mismatched_coordinate_fixture(path: &Path) -> Result<()> {
    let mut file = create(path)?;
    file.add_dimension("x", 3)?;
    file.add_dimension("y", 2)?;
    {
        let mut x = file.add_variable::<f64>("x", &["y"])?;
        x.put(Array1::from(vec![100.0, 200.0]).view(), ..)?;
    }
    {
        let mut data = file.add_variable::<f64>("data", &["x"])?;
        data.put(Array1::from(vec![1.0, 2.0, 3.0]).view(), ..)?;
    }
    Ok(())
}

/// A numeric variable masked through `missing_value` next to a string variable.
pub fn write_mixed_types_fixture(path: &Path) -> Result<()> {
    let mut file = create(path)?;
    file.add_dimension("t", 3)?;
    {
        let mut aod = file.add_variable::<f32>("AOD,550", &["t"])?;
        aod.put_attribute("missing_value", -1.0f32)?;
        aod.put(Array1::from(vec![0.25f32, -1.0, 0.5]).view(), ..)?;
    }
    file.add_string_variable("granule_id", &["t"])?;
    Ok(())
}
