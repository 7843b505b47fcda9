use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::bins::BinGeometry;
use crate::pipeline::stage4_rollup::AggregateRow;

pub mod summary;

/// Where finished report rows go. Every row is computed before the
/// first one is written, so a sink never sees a partial report.
pub trait ReportSink {
    fn write_row(&mut self, cells: &[String]) -> std::io::Result<()>;
    fn finish(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct TsvFileSink {
    writer: BufWriter<File>,
}

impl TsvFileSink {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl ReportSink for TsvFileSink {
    fn write_row(&mut self, cells: &[String]) -> std::io::Result<()> {
        writeln!(self.writer, "{}", cells.join("\t"))
    }

    fn finish(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<Vec<String>>,
}

impl ReportSink for MemorySink {
    fn write_row(&mut self, cells: &[String]) -> std::io::Result<()> {
        self.rows.push(cells.to_vec());
        Ok(())
    }
}

/// Header: identity columns, then one column per bucket labeled with
/// its upper bound in micrometers.
pub fn header_row(geometry: &BinGeometry) -> Vec<String> {
    let mut cells = vec![
        "Case".to_string(),
        "Cell Type".to_string(),
        "Region".to_string(),
    ];
    for i in 0..geometry.len() {
        cells.push(format!("{} um", format_bound(geometry.upper_bound(i))));
    }
    cells
}

pub fn row_cells(row: &AggregateRow) -> Vec<String> {
    let mut cells = vec![row.case.clone(), row.cell_type.clone(), row.region.clone()];
    cells.extend(row.bins.counts().iter().map(|c| c.to_string()));
    cells
}

/// Whole bounds print without a decimal point, matching the upstream
/// export labels.
fn format_bound(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
