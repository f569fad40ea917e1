//! Read length and quality statistics for FASTQ samples.
//!
//! - Streaming 4-line record reader for plain and `.gz` input (auto-detect).
//! - Per-read metrics: length, Phred+33 quality per base, and that quality per base again.
//! - Per-sample min/median/mean/max over each metric, via an intermediate TSV table.
//! - One consolidated report across samples; a failing sample is skipped, not fatal.
//! - Samples are processed in parallel with rayon.
//! - Optional `mmap` for plain files; `zlib` feature for system zlib.
//! - Optional async reader behind the `async` feature.

pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod policy;
pub mod reader;
pub mod record;
pub mod report;
pub mod stats;
pub mod table;
mod util;

#[cfg(feature = "async")]
pub mod async_reader;

pub use crate::error::{
    FastqError, FormatError, IoContext, PipelineError, ReportWriteError, SampleError, TableError,
};
pub use crate::metrics::{PHRED_OFFSET, ReadMetric};
pub use crate::pipeline::{PipelineConfig, SampleInput, discover_samples, process_sample, run};
pub use crate::policy::{ErrorPolicy, ReaderOptions};
pub use crate::reader::FastqReader;
pub use crate::record::FastqRecord;
pub use crate::report::{Diagnostic, REPORT_FILE_NAME, REPORT_HEADER, Report, SampleOutcome};
pub use crate::stats::{SampleSummary, SummaryStats, summarize};
pub use crate::table::{MetricColumns, MetricsTableWriter, TABLE_HEADER, read_metrics_table};

#[cfg(feature = "async")]
pub use crate::async_reader::AsyncFastqReader;
