//! Interactive inspection session
//!
//! Drives the prompt flow: file path, variable selection, rendering and the
//! optional export menu. Input and output are injected so the whole flow can
//! run against in-memory buffers.

use crate::aerosol::{
    find_aod_variable, find_coordinates, search_aerosol_variables, BoundingBox, GeoCoordinates,
};
use crate::cli::Args;
use crate::dataset::{normalize_input_path, Dataset};
use crate::errors::{InspectorError, Result};
use crate::export::{
    export_bbox_csv, export_dataset_csv, export_dataset_parquet, export_geojson, export_info,
    export_variable_csv, DEFAULT_GEOJSON_DIR,
};
use crate::metadata::{dataset_overview, format_shape, pre_check};
use crate::render::select_and_render;
use crate::scan::scan_directory;
use crate::statistics::ValueSummary;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prompt/response channel around a reader and a writer
pub struct Session<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Gives back the writer, e.g. to inspect captured output.
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Prints `message` and reads one trimmed line, `None` once input is closed.
    fn read_response(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prints `message` and reads one trimmed line.
    ///
    /// # Errors
    ///
    /// Fails when input is closed before a line arrives.
    pub fn prompt(&mut self, message: &str) -> Result<String> {
        self.read_response(message)?
            .ok_or_else(|| "input closed before a response was entered".into())
    }

    /// Yes/no question; closed input counts as no.
    fn prompt_yes(&mut self, message: &str) -> Result<bool> {
        Ok(self
            .read_response(message)?
            .is_some_and(|a| a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes")))
    }

    /// Number prompt where an empty answer keeps `default`.
    fn prompt_number(&mut self, message: &str, default: f64) -> Result<f64> {
        let answer = self.prompt(&format!("{} [{}]: ", message, default))?;
        if answer.is_empty() {
            return Ok(default);
        }
        answer
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", answer).into())
    }

    /// Asks for the file path, normalising quotes and `~`.
    pub fn prompt_path(&mut self) -> Result<PathBuf> {
        let raw = self.prompt("\nEnter path to .nc file: ")?;
        Ok(normalize_input_path(&raw))
    }

    /// Prints the numbered list of variables with their shapes.
    pub fn print_variable_menu(&mut self, dataset: &Dataset) -> Result<()> {
        let names = dataset.list_variables();
        self.say(&format!("\nVariables available ({}):", names.len()))?;
        if names.is_empty() {
            self.say("   (No variables found)")?;
        }
        for (i, name) in names.iter().enumerate() {
            let var = dataset.variable(name)?;
            let shape = crate::dataset::variable_shape(&var);
            self.say(&format!("{:>4}. {} {}", i + 1, name, format_shape(&shape)))?;
        }
        Ok(())
    }

    /// Prompts for a variable by number or name.
    pub fn choose_variable(&mut self, dataset: &Dataset) -> Result<String> {
        let answer = self.prompt("\nSelect a variable (number or name): ")?;
        resolve_selection(dataset, &answer)
    }

    /// Offers the export menu until the user declines.
    pub fn export_loop(&mut self, dataset: &Dataset, selected: &str, bbox: &BoundingBox) -> Result<()> {
        while self.prompt_yes("\nWould you like to export data? (y/n): ")? {
            self.export_menu(dataset, selected, bbox)?;
        }
        Ok(())
    }

    /// Shows the coordinate ranges and asks for the box edges, offering
    /// `current` as the default for each.
    ///
    /// # Errors
    ///
    /// Missing coordinates, non-numeric input or an invalid box.
    pub fn prompt_bbox(&mut self, dataset: &Dataset, current: &BoundingBox) -> Result<BoundingBox> {
        let GeoCoordinates { lat, lon, .. } = find_coordinates(dataset)?;
        self.say(&format!("\nFound coordinates: {}, {}", lat, lon))?;
        for name in [&lat, &lon] {
            if let Some(values) = dataset.read_decoded(name)? {
                let summary = ValueSummary::from_array(&values);
                if summary.has_valid() {
                    self.say(&format!("{} range: {} to {}", name, summary.min, summary.max))?;
                }
            }
        }
        self.say(&format!(
            "\nFor Seattle, WA try: lat {} to {}, lon {} to {}",
            BoundingBox::SEATTLE.south,
            BoundingBox::SEATTLE.north,
            BoundingBox::SEATTLE.west,
            BoundingBox::SEATTLE.east
        ))?;

        let south = self.prompt_number(&format!("Enter minimum {}", lat), current.south)?;
        let north = self.prompt_number(&format!("Enter maximum {}", lat), current.north)?;
        let west = self.prompt_number(&format!("Enter minimum {}", lon), current.west)?;
        let east = self.prompt_number(&format!("Enter maximum {}", lon), current.east)?;
        BoundingBox::new(west, south, east, north)
    }

    /// One pass through the export options.
    ///
    /// Export failures are reported and the session goes on; only I/O on the
    /// session itself ends it.
    pub fn export_menu(&mut self, dataset: &Dataset, selected: &str, bbox: &BoundingBox) -> Result<()> {
        self.say(&format!("\n{}\nEXPORT OPTIONS\n{}", "=".repeat(60), "=".repeat(60)))?;
        self.say("1. Export entire dataset to CSV")?;
        self.say("2. Export entire dataset to Parquet")?;
        self.say(&format!("3. Export '{}' to CSV", selected))?;
        self.say("4. Export dataset info to text file")?;
        self.say(&format!("5. Filter '{}' by bounding box then export CSV", selected))?;
        self.say(&format!("6. Export AOD to GeoJSON (filtered to {})", bbox))?;
        self.say("7. Exit without saving")?;

        let choice = self.prompt("\nEnter your choice (1-7): ")?;
        let outcome = match choice.as_str() {
            "1" => {
                let path = self.prompt("Output filename (e.g., dataset.csv): ")?;
                export_dataset_csv(dataset, Path::new(&path))
                    .map(|rows| format!("✓ Saved to {} ({} rows)", path, rows))
            }
            "2" => {
                let path = self.prompt("Output filename (e.g., dataset.parquet): ")?;
                export_dataset_parquet(dataset, Path::new(&path))
                    .map(|rows| format!("✓ Saved to {} ({} rows)", path, rows))
            }
            "3" => {
                let path = self.prompt(&format!("Output filename (e.g., {}.csv): ", selected))?;
                export_variable_csv(dataset, selected, Path::new(&path))
                    .map(|rows| format!("✓ Saved to {} ({} rows)", path, rows))
            }
            "4" => {
                let path = self.prompt("Output filename (e.g., dataset_info.txt): ")?;
                export_info(dataset, Path::new(&path))
                    .map(|()| format!("✓ Dataset info saved to {}", path))
            }
            "5" => match self.prompt_bbox(dataset, bbox) {
                Ok(chosen) => {
                    self.say(&format!("Filtering to {}...", chosen))?;
                    let path = self.prompt("Output filename (e.g., seattle_data.csv): ")?;
                    export_bbox_csv(dataset, selected, &chosen, Path::new(&path))
                        .map(|rows| format!("✓ Saved filtered data to {} ({} rows)", path, rows))
                }
                Err(e) => Err(e),
            },
            "6" => {
                let dir = self.prompt(&format!("Output directory [{}]: ", DEFAULT_GEOJSON_DIR))?;
                let dir = if dir.is_empty() { DEFAULT_GEOJSON_DIR } else { dir.as_str() };
                export_geojson(dataset, Path::new(dir), bbox).map(|e| {
                    format!(
                        "✓ GeoJSON saved to: {}\n   Total features exported: {}\n   Using AOD variable: {}",
                        e.path.display(),
                        e.features,
                        e.variable
                    )
                })
            }
            "7" => Ok("Exiting without saving.".to_string()),
            other => {
                debug!(choice = other, "invalid export menu choice");
                Ok("Invalid choice.".to_string())
            }
        };

        match outcome {
            Ok(message) => self.say(&message),
            Err(e) => self.say(&format!("❌ Export failed: {}", e)),
        }
    }

    fn report_aerosols(&mut self, dataset: &Dataset) -> Result<()> {
        self.say(&format!(
            "\n{}\nSEARCHING FOR AOD/AEROSOL VARIABLES:\n{}",
            "=".repeat(80),
            "=".repeat(80)
        ))?;
        let found = search_aerosol_variables(dataset);
        if found.is_empty() {
            self.say("  ⚠️  No obvious AOD variables found")?;
            self.say("  💡 Check the full variable list above")?;
        } else {
            self.say("  ✓ Potential AOD variables found:")?;
            for name in found {
                self.say(&format!("    - {}", name))?;
            }
        }
        if let Some(known) = find_aod_variable(dataset) {
            self.say(&format!("  ✓ Known AOD product variable: {}", known))?;
        }
        match find_coordinates(dataset) {
            Ok(c) => self.say(&format!("  ✓ Coordinates: {}, {}", c.lat, c.lon)),
            Err(e) => self.say(&format!("  ⚠️  {}", e)),
        }
    }

    fn run_dataset_actions(&mut self, dataset: &Dataset, args: &Args) -> Result<()> {
        let bbox = args.bbox();
        if args.overview {
            let overview = dataset_overview(dataset)?;
            self.say(&overview)?;
        }
        if args.find_aod {
            self.report_aerosols(dataset)?;
        }
        if let Some(path) = &args.export_dataset_csv {
            let rows = export_dataset_csv(dataset, path)?;
            self.say(&format!("✓ Saved to {} ({} rows)", path.display(), rows))?;
        }
        if let Some(path) = &args.export_parquet {
            let rows = export_dataset_parquet(dataset, path)?;
            self.say(&format!("✓ Saved to {} ({} rows)", path.display(), rows))?;
        }
        if let Some(path) = &args.export_info {
            export_info(dataset, path)?;
            self.say(&format!("✓ Dataset info saved to {}", path.display()))?;
        }
        if let Some(dir) = &args.export_geojson {
            let export = export_geojson(dataset, dir, &bbox)?;
            self.say(&format!(
                "✓ GeoJSON saved to: {} ({} features, variable {})",
                export.path.display(),
                export.features,
                export.variable
            ))?;
        }
        Ok(())
    }

    /// Runs the inspector as configured by `args`.
    ///
    /// # Errors
    ///
    /// Open and selection failures are returned to the caller, which reports
    /// them and exits non-zero.
    pub fn run(&mut self, args: &Args) -> Result<()> {
        let bbox = args.bbox();

        if let Some(dir) = &args.scan {
            info!(dir = %dir.display(), "scanning directory");
            let report = scan_directory(dir, &bbox)?;
            return self.say(&report.render(&bbox));
        }

        let path = match &args.file {
            Some(path) => normalize_input_path(&path.to_string_lossy()),
            None => self.prompt_path()?,
        };

        self.say(&format!("\nOpening {}...", path.display()))?;
        let dataset = Dataset::open(&path)?;
        self.say(&format!("Successfully opened NetCDF file: {}", path.display()))?;
        if let Some(title) = dataset.title() {
            self.say(&format!("Title: {}", title))?;
        }
        self.say(&pre_check(&dataset)?.render())?;

        self.run_dataset_actions(&dataset, args)?;

        if args.list_vars {
            return self.print_variable_menu(&dataset);
        }
        if !args.needs_variable() {
            return Ok(());
        }

        self.print_variable_menu(&dataset)?;
        let selected = match &args.variable {
            Some(name) => resolve_selection(&dataset, name)?,
            None => self.choose_variable(&dataset)?,
        };
        let rendering = select_and_render(&dataset, &selected)?;
        self.say(&rendering)?;

        if let Some(path) = &args.export_csv {
            let rows = export_variable_csv(&dataset, &selected, path)?;
            self.say(&format!("✓ Saved to {} ({} rows)", path.display(), rows))?;
        }
        if let Some(path) = &args.export_bbox_csv {
            let rows = export_bbox_csv(&dataset, &selected, &bbox, path)?;
            self.say(&format!("✓ Saved filtered data to {} ({} rows)", path.display(), rows))?;
        }
        if args.offers_export_menu() {
            self.export_loop(&dataset, &selected, &bbox)?;
        }

        self.say("\n✓ Done!")
    }
}

/// Maps user input to a variable name.
///
/// A number selects from [`Dataset::list_variables`] (1-based); anything
/// else must be an exact variable name.
///
/// # Errors
///
/// - [`InspectorError::InvalidSelection`] for an out-of-range number or empty input
/// - [`InspectorError::VariableNotFound`] for an unknown name
pub fn resolve_selection(dataset: &Dataset, input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InspectorError::InvalidSelection {
            input: input.to_string(),
        });
    }

    if let Ok(number) = input.parse::<usize>() {
        let names = dataset.list_variables();
        return number
            .checked_sub(1)
            .and_then(|i| names.get(i).cloned())
            .ok_or_else(|| InspectorError::InvalidSelection {
                input: input.to_string(),
            });
    }

    if dataset.has_variable(input) {
        Ok(input.to_string())
    } else {
        Err(InspectorError::VariableNotFound {
            var: input.to_string(),
        })
    }
}
