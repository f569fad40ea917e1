//! Per-read length and quality metrics.

use crate::record::FastqRecord;

/// Phred+33: quality score = ASCII code - 33.
pub const PHRED_OFFSET: i64 = 33;

/// Length and quality of a single read.
///
/// `read_quality` is the Phred sum divided by the read length, and
/// `average_base_quality` divides that by the length a second time. The
/// second division is the established output of this tool and downstream
/// tables depend on it, so it is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadMetric {
    pub read_id: String,
    pub read_length: usize,
    pub read_quality: f64,
    pub average_base_quality: f64,
}

impl ReadMetric {
    /// The record must have a non-empty sequence; `FastqReader` guarantees it.
    pub fn from_record(rec: &FastqRecord) -> Self {
        let read_length = rec.len();
        let read_quality = phred_sum(&rec.qual) as f64 / read_length as f64;
        Self {
            read_id: rec.id.clone(),
            read_length,
            read_quality,
            average_base_quality: read_quality / read_length as f64,
        }
    }

    /// Row of the per-sample table, without the trailing newline.
    pub fn to_row(&self) -> String {
        format!(
            "{}\t{}\t{:.2}\t{:.2}",
            self.read_id, self.read_length, self.read_quality, self.average_base_quality
        )
    }
}

/// Sum of Phred+33 decoded scores. Bytes below `!` decode to negatives.
#[inline]
pub fn phred_sum(qual: &[u8]) -> i64 {
    qual.iter().map(|&q| i64::from(q) - PHRED_OFFSET).sum()
}
