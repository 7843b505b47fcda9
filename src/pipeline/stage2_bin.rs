use crate::model::bins::{BinGeometry, BinVector};
use crate::model::record::{MeasurementRecord, Metric};

/// Which records feed one bin vector. `marker: None` is the
/// cell-type-agnostic view; `region: None` is the per-case layout,
/// where region is not a dimension.
#[derive(Debug, Clone, Copy)]
pub struct GroupFilter<'a> {
    pub case: &'a str,
    pub region: Option<&'a str>,
    pub marker: Option<&'a str>,
}

impl GroupFilter<'_> {
    fn matches(&self, rec: &MeasurementRecord) -> bool {
        if rec.case != self.case {
            return false;
        }
        if let Some(region) = self.region {
            if rec.region != region {
                return false;
            }
        }
        if let Some(marker) = self.marker {
            if rec.marker != marker {
                return false;
            }
        }
        true
    }
}

/// Raw bin vector for one group. Records with an absent metric value
/// or an out-of-range index are silently excluded, never an error.
pub fn bin_group(
    records: &[MeasurementRecord],
    filter: &GroupFilter<'_>,
    metric: Metric,
    geometry: &BinGeometry,
) -> BinVector {
    let mut bins = BinVector::zeroed(geometry.len());
    for rec in records {
        if !filter.matches(rec) {
            continue;
        }
        let Some(value) = rec.metric(metric) else {
            continue;
        };
        if let Some(idx) = geometry.index_of(value) {
            bins.increment(idx);
        }
    }
    bins
}

/// Whole-record-set exclusion tallies for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExclusionCounts {
    pub unparseable: usize,
    pub out_of_range: usize,
}

pub fn exclusion_counts(
    records: &[MeasurementRecord],
    metric: Metric,
    geometry: &BinGeometry,
) -> ExclusionCounts {
    let mut counts = ExclusionCounts::default();
    for rec in records {
        match rec.metric(metric) {
            None => counts.unparseable += 1,
            Some(value) => {
                if geometry.index_of(value).is_none() {
                    counts.out_of_range += 1;
                }
            }
        }
    }
    counts
}
