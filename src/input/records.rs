use std::collections::BTreeSet;
use std::path::Path;

use crate::config::{ColumnLayout, LayoutKind};
use crate::input::{InputError, read_delimited};
use crate::model::record::MeasurementRecord;

/// Absence and non-numeric content both yield `None`; the binning
/// filter handles exclusion.
pub fn parse_value(cell: Option<&String>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
}

fn cell<'a>(row: &'a [String], idx: usize) -> Option<&'a String> {
    row.get(idx)
}

/// Loads one per-group export: header row discarded, the exporter's
/// trailing summary rows dropped, every remaining row tagged with the
/// enclosing case/run/region.
pub fn load_group_file(
    path: &Path,
    case: &str,
    run: &str,
    region: &str,
    layout: &ColumnLayout,
) -> Result<Vec<MeasurementRecord>, InputError> {
    debug_assert_eq!(layout.kind, LayoutKind::PerGroup);
    let rows = read_delimited(path)?;
    let data = data_rows(&rows, layout.skip_trailing);

    let mut records = Vec::with_capacity(data.len());
    for row in data {
        records.push(MeasurementRecord {
            case: case.to_string(),
            run: run.to_string(),
            region: region.to_string(),
            marker: cell(row, layout.marker).cloned().unwrap_or_default(),
            area: parse_value(cell(row, layout.area)),
            volume: parse_value(cell(row, layout.volume)),
        });
    }
    Ok(records)
}

/// One loaded per-case export. The marker column's header text is kept
/// so repeated header rows pasted into the export can be told apart
/// from real marker values during discovery.
#[derive(Debug)]
pub struct CaseFile {
    pub records: Vec<MeasurementRecord>,
    pub marker_header: String,
}

pub fn load_case_file(
    path: &Path,
    case: &str,
    layout: &ColumnLayout,
) -> Result<CaseFile, InputError> {
    debug_assert_eq!(layout.kind, LayoutKind::PerCase);
    let rows = read_delimited(path)?;
    let marker_header = rows
        .first()
        .and_then(|row| cell(row, layout.marker))
        .cloned()
        .unwrap_or_default();
    let data = data_rows(&rows, layout.skip_trailing);

    let mut records = Vec::with_capacity(data.len());
    for row in data {
        records.push(MeasurementRecord {
            case: case.to_string(),
            run: String::new(),
            region: String::new(),
            marker: cell(row, layout.marker).cloned().unwrap_or_default(),
            area: parse_value(cell(row, layout.area)),
            volume: parse_value(cell(row, layout.volume)),
        });
    }
    Ok(CaseFile {
        records,
        marker_header,
    })
}

fn data_rows(rows: &[Vec<String>], skip_trailing: usize) -> &[Vec<String>] {
    if rows.len() <= 1 + skip_trailing {
        return &[];
    }
    &rows[1..rows.len() - skip_trailing]
}

/// Distinct marker identifiers observed in per-case records, excluding
/// empty cells and header-like placeholders. Configured markers keep
/// their configured order; anything else follows lexicographically.
pub fn observed_markers(
    records: &[MeasurementRecord],
    marker_headers: &[String],
    configured: &[String],
) -> Vec<String> {
    let mut seen = BTreeSet::new();
    for rec in records {
        if rec.marker.is_empty() {
            continue;
        }
        if marker_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(&rec.marker))
        {
            continue;
        }
        seen.insert(rec.marker.clone());
    }

    let mut out = Vec::with_capacity(seen.len());
    for name in configured {
        if seen.remove(name) {
            out.push(name.clone());
        }
    }
    out.extend(seen);
    out
}
