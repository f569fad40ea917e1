//! Per-sample aggregation of read metrics.

use crate::table::MetricColumns;

/// {min, median, mean, max} over one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub min: f64,
    pub median: f64,
    pub mean: f64,
    pub max: f64,
}

impl SummaryStats {
    /// `None` for an empty column. The median of an even-sized column is the
    /// mean of the two central values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);

        let n = sorted.len();
        let min = sorted[0];
        let max = sorted[n - 1];
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        // summation error must not push the mean outside [min, max]
        let mean = (sorted.iter().sum::<f64>() / n as f64).max(min).min(max);

        Some(Self {
            min,
            median,
            mean,
            max,
        })
    }
}

/// One report row.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSummary {
    pub sample_name: String,
    pub read_count: usize,
    pub length: SummaryStats,
    pub quality: SummaryStats,
    pub avg_base_quality: SummaryStats,
}

/// Aggregate a sample's metric columns. `None` if the sample has no reads.
pub fn summarize(sample_name: &str, cols: &MetricColumns) -> Option<SampleSummary> {
    Some(SampleSummary {
        sample_name: sample_name.to_string(),
        read_count: cols.len(),
        length: SummaryStats::from_values(&cols.lengths)?,
        quality: SummaryStats::from_values(&cols.qualities)?,
        avg_base_quality: SummaryStats::from_values(&cols.avg_base_qualities)?,
    })
}
