//! End-to-end runs of the interactive session with scripted input

mod common;

use clap::Parser;
use common::{write_aod_fixture, AOD_VAR};
use nc_inspector::{
    cli::Args,
    errors::{InspectorError, Result},
    session::{resolve_selection, Session},
};
use std::io::Cursor;
use std::path::Path;
use tempfile::tempdir;

fn run_session(args: &Args, input: &str) -> (Result<()>, String) {
    let mut session = Session::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
    let result = session.run(args);
    let output = String::from_utf8(session.into_output()).expect("utf-8 output");
    (result, output)
}

// Built directly so NC_INSPECTOR_FILE in the environment cannot leak in
fn no_args() -> Args {
    Args::default()
}

#[test]
fn test_prompted_session_by_number() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;

    let args = Args {
        file: None,
        ..no_args()
    };
    // Quoted path, variable 3, then decline exporting
    let input = format!("\"{}\"\n3\nn\n", path.display());
    let (result, output) = run_session(&args, &input);

    result?;
    assert!(output.contains("Enter path to .nc file: "));
    assert!(output.contains("Successfully opened NetCDF file"));
    assert!(output.contains(&format!("   3. {} (3, 4)", AOD_VAR)));
    assert!(output.contains(&format!("✓ {}", AOD_VAR)));
    assert!(output.contains("Shape: (3, 4)"));
    assert!(output.contains("Would you like to export data? (y/n): "));
    assert!(output.contains("✓ Done!"));
    Ok(())
}

#[test]
fn test_prompted_session_with_export() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;
    let csv_path = temp_dir.path().join("out.csv");

    let args = Args {
        file: Some(path.clone()),
        ..no_args()
    };
    let input = format!("{}\ny\n3\n{}\nn\n", AOD_VAR, csv_path.display());
    let (result, output) = run_session(&args, &input);

    result?;
    assert!(output.contains("EXPORT OPTIONS"));
    assert!(output.contains("(12 rows)"), "{}", output);
    assert!(csv_path.exists());
    Ok(())
}

#[test]
fn test_invalid_export_choice_keeps_session_alive() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;

    let args = Args {
        file: Some(path),
        ..no_args()
    };
    let (result, output) = run_session(&args, "lat\ny\n9\nn\n");

    result?;
    assert!(output.contains("Invalid choice."));
    assert!(output.contains("✓ Done!"));
    Ok(())
}

#[test]
fn test_closed_input_after_render_succeeds() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;

    let args = Args {
        file: Some(path),
        ..no_args()
    };
    // Input ends at the export question
    let (result, output) = run_session(&args, &format!("{}\n", AOD_VAR));
    result?;
    assert!(output.contains("Would you like to export data? (y/n): "));
    assert!(output.contains("✓ Done!"));
    Ok(())
}

#[test]
fn test_export_menu_bbox_prompts() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;
    let custom_csv = temp_dir.path().join("custom.csv");
    let default_csv = temp_dir.path().join("default.csv");

    let args = Args {
        file: Some(path),
        ..no_args()
    };
    let input = format!(
        "{var}\ny\n5\n47.55\n47.65\n-122.4\n-122.2\n{custom}\ny\n5\n\n\n\n\n{default}\ny\n5\nnorth\nn\n",
        var = AOD_VAR,
        custom = custom_csv.display(),
        default = default_csv.display(),
    );
    let (result, output) = run_session(&args, &input);
    result?;

    assert!(output.contains("Found coordinates: lat, lon"), "{}", output);
    assert!(output.contains("lat range: 47.5 to 48.5"), "{}", output);
    assert!(output.contains("Enter minimum lat [47.4]: "));
    assert!(output.contains("Enter maximum lon [-122.2]: "));

    // Only the 47.6 row lies inside the typed box
    assert!(output.contains(&format!("{} (2 rows)", custom_csv.display())), "{}", output);
    assert_eq!(std::fs::read_to_string(&custom_csv)?.lines().count(), 3);

    // Empty answers keep the Seattle default
    assert!(output.contains(&format!("{} (3 rows)", default_csv.display())), "{}", output);

    assert!(output.contains("❌ Export failed: 'north' is not a number"), "{}", output);
    assert!(output.contains("✓ Done!"));
    Ok(())
}

#[test]
fn test_export_menu_file_exports() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("PACE_OCI.20250702.L3m.DAY.AER_UAA.V3_1.0p1deg.NRT.nc");
    write_aod_fixture(&path)?;
    let dataset_csv = temp_dir.path().join("dataset.csv");
    let parquet = temp_dir.path().join("dataset.parquet");
    let info = temp_dir.path().join("info.txt");
    let geojson_dir = temp_dir.path().join("geojson");

    let args = Args {
        file: Some(path),
        ..no_args()
    };
    let input = format!(
        "lat\ny\n1\n{}\ny\n2\n{}\ny\n4\n{}\ny\n6\n{}\ny\n7\nn\n",
        dataset_csv.display(),
        parquet.display(),
        info.display(),
        geojson_dir.display(),
    );
    let (result, output) = run_session(&args, &input);
    result?;

    assert!(output.contains("1. Export entire dataset to CSV"));
    assert!(output.contains(&format!("{} (12 rows)", dataset_csv.display())), "{}", output);
    assert!(output.contains(&format!("{} (12 rows)", parquet.display())), "{}", output);
    assert!(parquet.exists());
    assert!(output.contains("✓ Dataset info saved to"));
    assert!(std::fs::read_to_string(&info)?.contains("DATASET OVERVIEW"));
    assert!(output.contains("Total features exported: 3"), "{}", output);
    assert!(geojson_dir
        .join("seattle_aod_PACE_20250702_0p1deg.geojson")
        .exists());
    assert!(output.contains("Exiting without saving."));
    assert!(!output.contains("Export failed"), "{}", output);
    Ok(())
}

#[test]
fn test_dataset_export_flags() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;
    let dataset_csv = temp_dir.path().join("dataset.csv");
    let parquet = temp_dir.path().join("dataset.parquet");

    let args = Args {
        file: Some(path),
        export_dataset_csv: Some(dataset_csv.clone()),
        export_parquet: Some(parquet.clone()),
        ..no_args()
    };
    let (result, output) = run_session(&args, "");
    result?;
    assert!(dataset_csv.exists());
    assert!(parquet.exists());
    assert!(!output.contains("Select a variable"));
    Ok(())
}

#[test]
fn test_session_missing_file_fails() {
    let args = no_args();
    let (result, _) = run_session(&args, "/no/such/file.nc\n");
    match result {
        Err(e @ InspectorError::FileNotFound { .. }) => assert_ne!(e.exit_code(), 0),
        other => panic!("Expected FileNotFound, got {:?}", other),
    }
}

#[test]
fn test_session_unknown_variable_fails() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;

    let args = Args {
        file: Some(path),
        ..no_args()
    };
    let (result, _) = run_session(&args, "chlor_a\n");
    assert!(matches!(
        result,
        Err(InspectorError::VariableNotFound { ref var }) if var == "chlor_a"
    ));
    Ok(())
}

#[test]
fn test_non_interactive_flags() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;
    let info_path = temp_dir.path().join("info.txt");

    let args = Args::try_parse_from([
        "nc_inspector",
        "--file",
        path.to_str().expect("utf-8 path"),
        "--find-aod",
        "--export-info",
        info_path.to_str().expect("utf-8 path"),
    ])
    .expect("parses");

    // No input needed: nothing is prompted
    let (result, output) = run_session(&args, "");
    result?;
    assert!(output.contains("Potential AOD variables found"));
    assert!(output.contains("Coordinates: lat, lon"));
    assert!(!output.contains("Select a variable"));
    assert!(Path::new(&info_path).exists());
    Ok(())
}

#[test]
fn test_list_vars_only() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;

    let args = Args {
        file: Some(path),
        list_vars: true,
        ..no_args()
    };
    let (result, output) = run_session(&args, "");
    result?;
    assert!(output.contains("Variables available (4):"));
    assert!(output.contains("   1. lat (3,)"));
    assert!(!output.contains("Select a variable"));
    Ok(())
}

#[test]
fn test_scan_flag() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    write_aod_fixture(&temp_dir.path().join("granule.nc"))?;

    let args = Args {
        scan: Some(temp_dir.path().to_path_buf()),
        ..no_args()
    };
    let (result, output) = run_session(&args, "");
    result?;
    assert!(output.contains("Total files with valid AOD data found: 1"));
    Ok(())
}

#[test]
fn test_resolve_selection() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("aod.nc");
    write_aod_fixture(&path)?;
    let dataset = nc_inspector::dataset::open(&path)?;

    assert_eq!(resolve_selection(&dataset, "1")?, "lat");
    assert_eq!(resolve_selection(&dataset, " lon ")?, "lon");
    assert!(matches!(
        resolve_selection(&dataset, "0"),
        Err(InspectorError::InvalidSelection { .. })
    ));
    assert!(matches!(
        resolve_selection(&dataset, "5"),
        Err(InspectorError::InvalidSelection { .. })
    ));
    assert!(matches!(
        resolve_selection(&dataset, ""),
        Err(InspectorError::InvalidSelection { .. })
    ));
    Ok(())
}
