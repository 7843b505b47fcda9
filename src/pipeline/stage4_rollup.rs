use serde::Serialize;
use tracing::warn;

use crate::config::{LayoutKind, RunConfig};
use crate::input::correction::{CorrectionTable, GroupKey};
use crate::model::bins::BinVector;
use crate::model::record::MeasurementRecord;
use crate::pipeline::stage2_bin::{GroupFilter, bin_group};
use crate::pipeline::stage3_correct::{CorrectedGroup, CorrectionStatus, correct_group};

pub const ALL_CELL_TYPES: &str = "All";
pub const WHOLE_STRUCTURE: &str = "Whole";

/// One output row: a leaf group or a rollup, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRow {
    pub case: String,
    pub cell_type: String,
    pub region: String,
    pub bins: BinVector,
}

impl AggregateRow {
    fn new(case: &str, cell_type: &str, region: &str, bins: BinVector) -> Self {
        Self {
            case: case.to_string(),
            cell_type: cell_type.to_string(),
            region: region.to_string(),
            bins,
        }
    }
}

/// Identity of a group surfaced in the run summary diagnostics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GroupRef {
    pub case: String,
    pub cell_type: String,
    pub region: String,
}

#[derive(Debug, Default)]
pub struct RollupDiagnostics {
    /// Zero raw objects with correction active; passed through as is.
    pub zero_total_groups: Vec<GroupRef>,
    /// No table entry matched; output zeroed.
    pub zeroed_groups: Vec<GroupRef>,
}

#[derive(Debug)]
pub struct RollupOutput {
    pub rows: Vec<AggregateRow>,
    pub diagnostics: RollupDiagnostics,
}

/// Bins, corrects, and rolls up every group of the run. Emission
/// order: per case, each marker's regions followed by that marker's
/// "Whole" rollup, then the case's "All"/"Whole" grand total; then a
/// second block of cell-type-agnostic by-region rows for every case.
pub fn run_rollup(
    config: &RunConfig,
    records: &[MeasurementRecord],
    markers: &[String],
    table: Option<&CorrectionTable>,
) -> RollupOutput {
    match config.layout {
        LayoutKind::PerGroup => rollup_per_group(config, records, markers, table),
        LayoutKind::PerCase => rollup_per_case(config, records, markers, table),
    }
}

fn rollup_per_group(
    config: &RunConfig,
    records: &[MeasurementRecord],
    markers: &[String],
    table: Option<&CorrectionTable>,
) -> RollupOutput {
    let geometry = config.geometry();
    let len = geometry.len();
    let run = config.analysis_run();
    let mut rows = Vec::new();
    let mut diagnostics = RollupDiagnostics::default();

    for case in &config.cases {
        let mut whole_case = BinVector::zeroed(len);
        for marker in markers {
            let mut whole_structure = BinVector::zeroed(len);
            for region in &config.regions {
                let raw = bin_group(
                    records,
                    &GroupFilter {
                        case,
                        region: Some(region),
                        marker: Some(marker),
                    },
                    config.metric,
                    &geometry,
                );
                let corrected = correct_group(
                    raw,
                    &GroupKey {
                        case,
                        run,
                        region: Some(region),
                        marker,
                    },
                    table,
                );
                note_group(&corrected, case, marker, region, &mut diagnostics);
                whole_structure.add_assign(&corrected.bins);
                rows.push(AggregateRow::new(case, marker, region, corrected.bins));
            }
            whole_case.add_assign(&whole_structure);
            rows.push(AggregateRow::new(
                case,
                marker,
                WHOLE_STRUCTURE,
                whole_structure,
            ));
        }
        rows.push(AggregateRow::new(
            case,
            ALL_CELL_TYPES,
            WHOLE_STRUCTURE,
            whole_case,
        ));
    }

    // Cell-type-agnostic view, re-binned across all markers per region.
    for case in &config.cases {
        for region in &config.regions {
            let raw = bin_group(
                records,
                &GroupFilter {
                    case,
                    region: Some(region),
                    marker: None,
                },
                config.metric,
                &geometry,
            );
            let corrected = correct_group(
                raw,
                &GroupKey {
                    case,
                    run,
                    region: Some(region),
                    marker: ALL_CELL_TYPES,
                },
                table,
            );
            note_group(&corrected, case, ALL_CELL_TYPES, region, &mut diagnostics);
            rows.push(AggregateRow::new(
                case,
                ALL_CELL_TYPES,
                region,
                corrected.bins,
            ));
        }
    }

    RollupOutput { rows, diagnostics }
}

fn rollup_per_case(
    config: &RunConfig,
    records: &[MeasurementRecord],
    markers: &[String],
    table: Option<&CorrectionTable>,
) -> RollupOutput {
    let geometry = config.geometry();
    let len = geometry.len();
    let mut rows = Vec::new();
    let mut diagnostics = RollupDiagnostics::default();

    for case in &config.cases {
        let mut whole_case = BinVector::zeroed(len);
        for marker in markers {
            let raw = bin_group(
                records,
                &GroupFilter {
                    case,
                    region: None,
                    marker: Some(marker),
                },
                config.metric,
                &geometry,
            );
            let corrected = correct_group(
                raw,
                &GroupKey {
                    case,
                    run: None,
                    region: None,
                    marker,
                },
                table,
            );
            note_group(&corrected, case, marker, WHOLE_STRUCTURE, &mut diagnostics);
            whole_case.add_assign(&corrected.bins);
            rows.push(AggregateRow::new(
                case,
                marker,
                WHOLE_STRUCTURE,
                corrected.bins,
            ));
        }
        rows.push(AggregateRow::new(
            case,
            ALL_CELL_TYPES,
            WHOLE_STRUCTURE,
            whole_case,
        ));
    }

    RollupOutput { rows, diagnostics }
}

fn note_group(
    corrected: &CorrectedGroup,
    case: &str,
    cell_type: &str,
    region: &str,
    diagnostics: &mut RollupDiagnostics,
) {
    match corrected.status {
        CorrectionStatus::ZeroRawTotal => {
            warn!("zero raw total for {case}/{cell_type}/{region}; correction skipped");
            diagnostics.zero_total_groups.push(GroupRef {
                case: case.to_string(),
                cell_type: cell_type.to_string(),
                region: region.to_string(),
            });
        }
        CorrectionStatus::MissingEntry => {
            warn!("no cell count entry for {case}/{cell_type}/{region}; output zeroed");
            diagnostics.zeroed_groups.push(GroupRef {
                case: case.to_string(),
                cell_type: cell_type.to_string(),
                region: region.to_string(),
            });
        }
        CorrectionStatus::Disabled | CorrectionStatus::Applied { .. } => {}
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_rollup.rs"]
mod tests;
