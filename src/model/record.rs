use serde::Deserialize;

/// Which measured magnitude drives the binning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Metric {
    Area,
    Volume,
}

impl Metric {
    pub fn name(self) -> &'static str {
        match self {
            Metric::Area => "Area",
            Metric::Volume => "Volume",
        }
    }
}

/// One measured object, tagged with the experimental identity of the
/// file (or row) it came from. Metric values are `None` when the source
/// cell was blank or not numeric; exclusion happens at binning time.
#[derive(Debug, Clone)]
pub struct MeasurementRecord {
    pub case: String,
    pub run: String,
    pub region: String,
    pub marker: String,
    pub area: Option<f64>,
    pub volume: Option<f64>,
}

impl MeasurementRecord {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Area => self.area,
            Metric::Volume => self.volume,
        }
    }
}
