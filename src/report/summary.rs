use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::config::{LayoutKind, RunConfig};
use crate::pipeline::stage1_ingest::IngestOutput;
use crate::pipeline::stage2_bin::ExclusionCounts;
use crate::pipeline::stage4_rollup::{GroupRef, RollupOutput};

/// Machine-readable account of one run, written beside the report.
/// Records the silent exclusions and degenerate correction cases the
/// report itself cannot show.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub tool: &'static str,
    pub version: &'static str,
    pub metric: &'static str,
    pub layout: &'static str,
    pub bin_size: f64,
    pub bin_min: f64,
    pub bin_max: f64,
    pub n_bins: usize,
    pub cases: Vec<String>,
    pub markers: Vec<String>,
    pub files_read: usize,
    pub n_records: usize,
    pub rows_emitted: usize,
    pub correction_active: bool,
    pub correction_entries: usize,
    pub records_unparseable: usize,
    pub records_out_of_range: usize,
    pub zero_total_groups: Vec<GroupRef>,
    pub zeroed_groups: Vec<GroupRef>,
}

pub fn build_summary(
    config: &RunConfig,
    ingest: &IngestOutput,
    rollup: &RollupOutput,
    exclusions: ExclusionCounts,
    correction_entries: usize,
) -> RunSummary {
    RunSummary {
        tool: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        metric: config.metric.name(),
        layout: match config.layout {
            LayoutKind::PerGroup => "per-group",
            LayoutKind::PerCase => "per-case",
        },
        bin_size: config.bin_size,
        bin_min: config.bin_min,
        bin_max: config.bin_max,
        n_bins: config.geometry().len(),
        cases: config.cases.clone(),
        markers: ingest.markers.clone(),
        files_read: ingest.files_read,
        n_records: ingest.records.len(),
        rows_emitted: rollup.rows.len(),
        correction_active: config.correction_enabled(),
        correction_entries,
        records_unparseable: exclusions.unparseable,
        records_out_of_range: exclusions.out_of_range,
        zero_total_groups: rollup.diagnostics.zero_total_groups.clone(),
        zeroed_groups: rollup.diagnostics.zeroed_groups.clone(),
    }
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> std::io::Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}
