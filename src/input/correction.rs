use std::path::Path;

use crate::input::{InputError, read_delimited};

/// Identity of one binned group for correction lookups. `region` is
/// `None` for the per-case layout; `marker` is the literal `"All"` for
/// the cell-type-agnostic views.
#[derive(Debug, Clone, Copy)]
pub struct GroupKey<'a> {
    pub case: &'a str,
    pub run: Option<&'a str>,
    pub region: Option<&'a str>,
    pub marker: &'a str,
}

// Rows stay raw text; decoding happens at lookup time.
#[derive(Debug, Clone)]
struct CorrectionRow {
    case: String,
    run: String,
    region: String,
    marker: String,
    count: String,
}

/// Externally estimated cell counts, keyed by the same grouping
/// dimensions as the measurement files.
#[derive(Debug)]
pub struct CorrectionTable {
    rows: Vec<CorrectionRow>,
}

impl CorrectionTable {
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let raw = read_delimited(path)?;
        let mut rows = Vec::with_capacity(raw.len().saturating_sub(1));
        for row in raw.iter().skip(1) {
            let field = |idx: usize| row.get(idx).cloned().unwrap_or_default();
            rows.push(CorrectionRow {
                case: field(0),
                run: field(1),
                region: field(2),
                marker: field(3),
                count: field(4),
            });
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ground-truth count for a group, by linear scan. When several
    /// rows match, the last row with a parseable count wins. A blank
    /// run cell matches any run context; a named one must equal it.
    pub fn lookup(&self, key: &GroupKey<'_>) -> Option<f64> {
        let mut found = None;
        for row in &self.rows {
            if row.case != key.case || row.marker != key.marker {
                continue;
            }
            if let Some(region) = key.region {
                if row.region != region {
                    continue;
                }
            }
            if !row.run.is_empty() {
                match key.run {
                    Some(run) if row.run == run => {}
                    Some(_) => continue,
                    None => {}
                }
            }
            if let Ok(count) = row.count.trim().parse::<f64>() {
                found = Some(count);
            }
        }
        found
    }
}
