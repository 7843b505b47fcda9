use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::model::bins::BinGeometry;
use crate::model::record::Metric;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read run config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid run config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("case list is empty")]
    EmptyCases,
    #[error("region list is empty (required for per-group layout)")]
    EmptyRegions,
    #[error("cell type list is empty (required for per-group layout)")]
    EmptyCellTypes,
    #[error("marker list has {markers} entries but cell type list has {cell_types}")]
    MarkerMismatch { markers: usize, cell_types: usize },
    #[error("bin range {min}..{max} is not a positive whole multiple of bin size {size}")]
    BinGeometry { size: f64, min: f64, max: f64 },
    #[error("output file name is empty")]
    EmptyOutput,
}

/// Which file layout the export directory uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// One file per (case, [run,] region, cell type).
    #[default]
    PerGroup,
    /// One file per case; the marker is a column of each row.
    PerCase,
}

/// Named column positions for one layout. Column order is a fixed
/// contract of the upstream export, supplied here rather than inferred.
#[derive(Debug, Clone, Copy)]
pub struct ColumnLayout {
    pub kind: LayoutKind,
    pub marker: usize,
    pub area: usize,
    pub volume: usize,
    /// Summary rows the exporter appends after the data rows.
    pub skip_trailing: usize,
}

impl ColumnLayout {
    pub fn per_group() -> Self {
        Self {
            kind: LayoutKind::PerGroup,
            marker: 0,
            area: 1,
            volume: 2,
            skip_trailing: 6,
        }
    }

    pub fn per_case() -> Self {
        Self {
            kind: LayoutKind::PerCase,
            marker: 0,
            area: 4,
            volume: 5,
            skip_trailing: 0,
        }
    }
}

/// Immutable description of one analysis run, loaded from a JSON file
/// and passed by reference into every component.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub cases: Vec<String>,
    /// Empty-string entry means a single run with no run token in
    /// filenames.
    #[serde(default = "default_runs")]
    pub runs: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    /// Cell type names as used in filenames.
    #[serde(default)]
    pub cell_types: Vec<String>,
    /// Marker names as they appear inside the files, index-aligned with
    /// `cell_types`. Defaults to `cell_types`.
    #[serde(default)]
    pub markers: Vec<String>,
    pub metric: Metric,
    pub bin_size: f64,
    pub bin_min: f64,
    pub bin_max: f64,
    pub output_file: String,
    /// Base name of the cell count table in `input_dir`; empty disables
    /// correction.
    #[serde(default)]
    pub correction_source: String,
    #[serde(default)]
    pub layout: LayoutKind,
    #[serde(default)]
    pub marker_column: Option<usize>,
    #[serde(default)]
    pub area_column: Option<usize>,
    #[serde(default)]
    pub volume_column: Option<usize>,
    #[serde(default)]
    pub trailing_summary_rows: Option<usize>,
}

fn default_runs() -> Vec<String> {
    vec![String::new()]
}

impl RunConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cases.is_empty() {
            return Err(ConfigError::EmptyCases);
        }
        if self.layout == LayoutKind::PerGroup {
            if self.regions.is_empty() {
                return Err(ConfigError::EmptyRegions);
            }
            if self.cell_types.is_empty() {
                return Err(ConfigError::EmptyCellTypes);
            }
            if !self.markers.is_empty() && self.markers.len() != self.cell_types.len() {
                return Err(ConfigError::MarkerMismatch {
                    markers: self.markers.len(),
                    cell_types: self.cell_types.len(),
                });
            }
        }
        if !self.geometry().divides_evenly() {
            return Err(ConfigError::BinGeometry {
                size: self.bin_size,
                min: self.bin_min,
                max: self.bin_max,
            });
        }
        if self.output_file.is_empty() {
            return Err(ConfigError::EmptyOutput);
        }
        Ok(())
    }

    pub fn geometry(&self) -> BinGeometry {
        BinGeometry {
            size: self.bin_size,
            min: self.bin_min,
            max: self.bin_max,
        }
    }

    /// Marker names in analysis order. Falls back to the filename form
    /// when no display form was configured.
    pub fn marker_list(&self) -> &[String] {
        if self.markers.is_empty() {
            &self.cell_types
        } else {
            &self.markers
        }
    }

    pub fn column_layout(&self) -> ColumnLayout {
        let mut layout = match self.layout {
            LayoutKind::PerGroup => ColumnLayout::per_group(),
            LayoutKind::PerCase => ColumnLayout::per_case(),
        };
        if let Some(idx) = self.marker_column {
            layout.marker = idx;
        }
        if let Some(idx) = self.area_column {
            layout.area = idx;
        }
        if let Some(idx) = self.volume_column {
            layout.volume = idx;
        }
        if let Some(n) = self.trailing_summary_rows {
            layout.skip_trailing = n;
        }
        layout
    }

    pub fn correction_enabled(&self) -> bool {
        !self.correction_source.is_empty()
    }

    /// Run identity for correction lookups; groups merge runs at
    /// binning time, so this exists only for a single named run.
    pub fn analysis_run(&self) -> Option<&str> {
        match self.runs.as_slice() {
            [run] if !run.is_empty() => Some(run.as_str()),
            _ => None,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.input_dir.join(&self.output_file)
    }

    pub fn correction_table_path(&self) -> PathBuf {
        self.input_dir
            .join(format!("{}.txt", self.correction_source))
    }
}
