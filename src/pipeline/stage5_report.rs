use std::path::Path;

use tracing::info;

use crate::model::bins::BinGeometry;
use crate::pipeline::stage4_rollup::RollupOutput;
use crate::report::summary::{RunSummary, write_summary};
use crate::report::{ReportSink, TsvFileSink, header_row, row_cells};

/// Streams the header and every aggregate row into a sink.
pub fn write_report(
    sink: &mut dyn ReportSink,
    geometry: &BinGeometry,
    output: &RollupOutput,
) -> std::io::Result<()> {
    sink.write_row(&header_row(geometry))?;
    for row in &output.rows {
        sink.write_row(&row_cells(row))?;
    }
    sink.finish()
}

/// Writes the tab-delimited report and the run summary. All rows are
/// already computed by the time this runs, so either both files appear
/// complete or the run aborts before creating them.
pub fn write_reports(
    output: &RollupOutput,
    geometry: &BinGeometry,
    report_path: &Path,
    summary_path: &Path,
    summary: &RunSummary,
) -> std::io::Result<()> {
    let mut sink = TsvFileSink::create(report_path)?;
    write_report(&mut sink, geometry, output)?;
    info!("wrote {} rows to {}", output.rows.len(), report_path.display());

    write_summary(summary_path, summary)?;
    info!("wrote run summary to {}", summary_path.display());
    Ok(())
}
