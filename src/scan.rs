//! Directory scan for files with usable AOD data inside a bounding box
//!
//! Cloud and quality masking often leave a granule with no valid pixels over
//! the area of interest; the scan separates those from files worth opening.

use crate::aerosol::{count_valid_in_bbox, find_aod_variable, find_coordinates, BoundingBox};
use crate::dataset::Dataset;
use crate::errors::{InspectorError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions treated as NetCDF files
pub const NETCDF_EXTENSIONS: &[&str] = &["nc", "nc4"];

/// Result of checking one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCheck {
    /// At least one valid AOD cell inside the box
    Valid { variable: String, count: usize },
    /// Unusable, with the reason
    Invalid { reason: String },
}

impl FileCheck {
    pub const fn is_valid(&self) -> bool {
        matches!(self, FileCheck::Valid { .. })
    }
}

/// Outcome of a directory scan, entries sorted by path
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub root: PathBuf,
    pub entries: Vec<(PathBuf, FileCheck)>,
}

impl ScanReport {
    pub fn valid_files(&self) -> Vec<&Path> {
        self.entries
            .iter()
            .filter(|(_, check)| check.is_valid())
            .map(|(path, _)| path.as_path())
            .collect()
    }

    /// Path relative to the scanned root, with `/` separators.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    pub fn render(&self, bbox: &BoundingBox) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Scanning for valid AOD data in: {}\n   Target BBox: {}\n{}\n",
            self.root.display(),
            bbox,
            "=".repeat(60)
        ));
        for (path, check) in &self.entries {
            out.push_str(&format!("\nChecking file: {}\n", self.display_path(path)));
            match check {
                FileCheck::Valid { variable, count } => out.push_str(&format!(
                    "   - SUCCESS: Found {count} non-NaN AOD points in BBox (Variable: {variable}).\n"
                )),
                FileCheck::Invalid { reason } => {
                    out.push_str(&format!("   - FAIL: {reason}\n"));
                }
            }
        }

        let valid = self.valid_files();
        out.push_str(&format!(
            "\n{}\nScan Complete. Total files with valid AOD data found: {}\n{}\n",
            "=".repeat(60),
            valid.len(),
            "=".repeat(60)
        ));
        if valid.is_empty() {
            out.push_str("No NetCDF files were found with valid, non-cloud-masked AOD data for the BBox.\n");
        } else {
            out.push_str("List of Valid Data Files:\n");
            for path in valid {
                out.push_str(&format!("- {}\n", self.display_path(path)));
            }
        }
        out
    }
}

/// Checks whether the file at `path` has valid AOD cells inside `bbox`.
///
/// Never fails: every problem, including an unreadable file, becomes
/// [`FileCheck::Invalid`].
pub fn check_file(path: &Path, bbox: &BoundingBox) -> FileCheck {
    let invalid = |reason: String| FileCheck::Invalid { reason };

    let dataset = match Dataset::open(path) {
        Ok(ds) => ds,
        Err(e) => return invalid(format!("Error reading file: {e}")),
    };
    let Some(variable) = find_aod_variable(&dataset) else {
        return invalid("Missing required AOD variable".to_string());
    };
    if let Err(e) = find_coordinates(&dataset) {
        return invalid(e.to_string());
    }

    match count_valid_in_bbox(&dataset, variable, bbox) {
        Ok(0) => invalid(
            "BBox filtered but all data points were NaN (likely cloud/quality masked).".to_string(),
        ),
        Ok(count) => FileCheck::Valid {
            variable: variable.to_string(),
            count,
        },
        Err(e) => invalid(e.to_string()),
    }
}

fn has_netcdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| NETCDF_EXTENSIONS.contains(&e))
}

/// Recursively checks every `.nc`/`.nc4` file under `dir`.
///
/// # Errors
///
/// [`InspectorError::FileNotFound`] if `dir` is not a directory.
pub fn scan_directory(dir: &Path, bbox: &BoundingBox) -> Result<ScanReport> {
    if !dir.is_dir() {
        return Err(InspectorError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_netcdf_extension(entry.path()) {
            continue;
        }
        let check = check_file(entry.path(), bbox);
        debug!(path = %entry.path().display(), valid = check.is_valid(), "checked file");
        entries.push((entry.into_path(), check));
    }

    Ok(ScanReport {
        root: dir.to_path_buf(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions() {
        assert!(has_netcdf_extension(Path::new("a/b.nc")));
        assert!(has_netcdf_extension(Path::new("b.nc4")));
        assert!(!has_netcdf_extension(Path::new("b.csv")));
        assert!(!has_netcdf_extension(Path::new("nc")));
    }

    #[test]
    fn missing_directory() {
        let err = scan_directory(Path::new("/definitely/not/here"), &BoundingBox::SEATTLE)
            .expect_err("missing dir");
        assert!(matches!(err, InspectorError::FileNotFound { .. }));
    }
}
