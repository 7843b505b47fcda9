/// Fixed-width bucket geometry for one run.
///
/// `min` and `max` are expressed in bucket units, matching the index
/// formula `floor(value / size - min)`: bucket `i` covers metric values
/// in `[(min + i) * size, (min + i + 1) * size)`.
#[derive(Debug, Clone, Copy)]
pub struct BinGeometry {
    pub size: f64,
    pub min: f64,
    pub max: f64,
}

impl BinGeometry {
    pub fn len(&self) -> usize {
        ((self.max - self.min) / self.size).round() as usize
    }

    pub fn divides_evenly(&self) -> bool {
        if !(self.size > 0.0) || self.max <= self.min {
            return false;
        }
        let n = (self.max - self.min) / self.size;
        n >= 1.0 && (n - n.round()).abs() < 1e-9
    }

    /// Bucket index for a metric value, `None` when it lands outside
    /// `[0, len)`. Left-closed: a boundary value opens its bucket.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        let idx = (value / self.size - self.min).floor();
        if !idx.is_finite() || idx < 0.0 || idx >= self.len() as f64 {
            return None;
        }
        Some(idx as usize)
    }

    /// Upper bound of bucket `i`, in metric units.
    pub fn upper_bound(&self, i: usize) -> f64 {
        (self.min + i as f64 + 1.0) * self.size
    }
}

/// Ordered per-bucket object counts for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinVector {
    counts: Vec<u64>,
}

impl BinVector {
    pub fn zeroed(len: usize) -> Self {
        Self {
            counts: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn increment(&mut self, idx: usize) {
        self.counts[idx] += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Element-wise fold; both vectors come from the same geometry.
    pub fn add_assign(&mut self, other: &BinVector) {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (acc, v) in self.counts.iter_mut().zip(&other.counts) {
            *acc += v;
        }
    }

    /// Rescale every bucket by `factor`, truncating to whole objects.
    pub fn scaled(&self, factor: f64) -> BinVector {
        let counts = self
            .counts
            .iter()
            .map(|&c| (c as f64 * factor).floor() as u64)
            .collect();
        BinVector { counts }
    }
}

impl From<Vec<u64>> for BinVector {
    fn from(counts: Vec<u64>) -> Self {
        Self { counts }
    }
}
