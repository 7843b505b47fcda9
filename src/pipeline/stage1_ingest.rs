use std::path::PathBuf;

use tracing::info;

use crate::config::{LayoutKind, RunConfig};
use crate::input::records::{load_case_file, load_group_file, observed_markers};
use crate::input::{InputError, case_file_name, measurement_file_name};
use crate::model::record::MeasurementRecord;

/// Everything later stages need from the export directory: the
/// normalized record set and the marker names in analysis order.
#[derive(Debug)]
pub struct IngestOutput {
    pub records: Vec<MeasurementRecord>,
    pub markers: Vec<String>,
    pub files_read: usize,
}

/// Every measurement file the run config expects, in read order. Used
/// by `--dry-run`; the ingest loops walk the same grouping.
pub fn expected_files(config: &RunConfig) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    match config.layout {
        LayoutKind::PerGroup => {
            for case in &config.cases {
                for run in &config.runs {
                    for region in &config.regions {
                        for cell_type in &config.cell_types {
                            let name = measurement_file_name(case, run, region, cell_type);
                            paths.push(config.input_dir.join(name));
                        }
                    }
                }
            }
        }
        LayoutKind::PerCase => {
            for case in &config.cases {
                paths.push(config.input_dir.join(case_file_name(case)));
            }
        }
    }
    paths
}

pub fn run_stage1(config: &RunConfig) -> Result<IngestOutput, InputError> {
    let output = match config.layout {
        LayoutKind::PerGroup => ingest_per_group(config)?,
        LayoutKind::PerCase => ingest_per_case(config)?,
    };
    info!(
        "ingested {} records from {} files ({} markers)",
        output.records.len(),
        output.files_read,
        output.markers.len()
    );
    Ok(output)
}

fn ingest_per_group(config: &RunConfig) -> Result<IngestOutput, InputError> {
    let layout = config.column_layout();
    let mut records = Vec::new();
    let mut files_read = 0usize;

    for case in &config.cases {
        for run in &config.runs {
            for region in &config.regions {
                for cell_type in &config.cell_types {
                    let name = measurement_file_name(case, run, region, cell_type);
                    let path = config.input_dir.join(name);
                    let loaded = load_group_file(&path, case, run, region, &layout)?;
                    files_read += 1;
                    records.extend(loaded);
                }
            }
        }
    }

    Ok(IngestOutput {
        records,
        markers: config.marker_list().to_vec(),
        files_read,
    })
}

fn ingest_per_case(config: &RunConfig) -> Result<IngestOutput, InputError> {
    let layout = config.column_layout();
    let mut records = Vec::new();
    let mut headers = Vec::new();
    let mut files_read = 0usize;

    for case in &config.cases {
        let path = config.input_dir.join(case_file_name(case));
        let loaded = load_case_file(&path, case, &layout)?;
        files_read += 1;
        headers.push(loaded.marker_header);
        records.extend(loaded.records);
    }

    let markers = observed_markers(&records, &headers, config.marker_list());
    Ok(IngestOutput {
        records,
        markers,
        files_read,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_ingest.rs"]
mod tests;
