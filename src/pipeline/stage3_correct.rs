use crate::input::correction::{CorrectionTable, GroupKey};
use crate::model::bins::BinVector;

/// What the correction step did to one group's raw vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrectionStatus {
    /// No correction table configured; corrected equals raw.
    Disabled,
    /// Rescaled by ground-truth / raw-total.
    Applied { factor: f64 },
    /// Correction active but the raw total was zero; raw passes
    /// through.
    ZeroRawTotal,
    /// Correction active but no table entry matched; output zeroed.
    MissingEntry,
}

#[derive(Debug)]
pub struct CorrectedGroup {
    pub bins: BinVector,
    pub raw_total: u64,
    pub status: CorrectionStatus,
}

/// Reconciles a raw bin vector against the estimated cell count for
/// its group; corrected buckets are truncated to whole objects.
pub fn correct_group(
    raw: BinVector,
    key: &GroupKey<'_>,
    table: Option<&CorrectionTable>,
) -> CorrectedGroup {
    let raw_total = raw.total();

    let Some(table) = table else {
        return CorrectedGroup {
            bins: raw,
            raw_total,
            status: CorrectionStatus::Disabled,
        };
    };

    if raw_total == 0 {
        return CorrectedGroup {
            bins: raw,
            raw_total,
            status: CorrectionStatus::ZeroRawTotal,
        };
    }

    match table.lookup(key) {
        Some(ground_truth) => {
            let factor = ground_truth / raw_total as f64;
            CorrectedGroup {
                bins: raw.scaled(factor),
                raw_total,
                status: CorrectionStatus::Applied { factor },
            }
        }
        None => CorrectedGroup {
            bins: raw.scaled(0.0),
            raw_total,
            status: CorrectionStatus::MissingEntry,
        },
    }
}
