//! Consolidated multi-sample report.

use crate::error::{ReportWriteError, SampleError};
use crate::stats::{SampleSummary, SummaryStats};

use std::collections::HashSet;
use std::fmt;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const REPORT_FILE_NAME: &str = "read.stat.tsv";

pub const REPORT_HEADER: &str = "sample\tread_count\t\
    length_min\tlength_median\tlength_mean\tlength_max\t\
    quality_min\tquality_median\tquality_mean\tquality_max\t\
    avg_base_quality_min\tavg_base_quality_median\tavg_base_quality_mean\tavg_base_quality_max";

/// Result of processing one sample, tagged with its name.
#[derive(Debug)]
pub struct SampleOutcome {
    pub sample: String,
    pub result: Result<SampleSummary, SampleError>,
}

/// A sample left out of the report, and why.
#[derive(Debug)]
pub struct Diagnostic {
    pub sample: String,
    pub error: SampleError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sample {} skipped: {}", self.sample, self.error)
    }
}

/// Rows in discovery order, plus diagnostics for the samples that failed.
#[derive(Debug, Default)]
pub struct Report {
    rows: Vec<SampleSummary>,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Fold outcomes in the order given. A repeated sample name keeps the
    /// first row; later ones become diagnostics.
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = SampleOutcome>,
    {
        let mut seen = HashSet::new();
        outcomes
            .into_iter()
            .fold(Report::default(), |mut report, outcome| {
                match outcome.result {
                    Ok(summary) if seen.insert(summary.sample_name.clone()) => {
                        report.rows.push(summary)
                    }
                    Ok(summary) => report.diagnostics.push(Diagnostic {
                        sample: outcome.sample,
                        error: SampleError::Duplicate {
                            sample: summary.sample_name,
                        },
                    }),
                    Err(error) => report.diagnostics.push(Diagnostic {
                        sample: outcome.sample,
                        error,
                    }),
                }
                report
            })
    }

    pub fn rows(&self) -> &[SampleSummary] {
        &self.rows
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn write_tsv<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "{self}")?;
        out.flush()
    }

    /// Write `<dir>/read.stat.tsv` in one go: the table goes to a temp file in
    /// `dir` which is then renamed over the target.
    pub fn persist(&self, dir: &Path) -> Result<PathBuf, ReportWriteError> {
        let path = dir.join(REPORT_FILE_NAME);
        let err = |source| ReportWriteError {
            path: path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(err)?;
        self.write_tsv(BufWriter::new(tmp.as_file_mut()))
            .map_err(err)?;
        tmp.persist(&path).map_err(|e| err(e.error))?;
        Ok(path)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{REPORT_HEADER}")?;
        for row in &self.rows {
            writeln!(f, "{}", format_row(row))?;
        }
        Ok(())
    }
}

/// `read_count`, `length_min` and `length_max` are integers; the rest use 2 decimals.
pub fn format_row(s: &SampleSummary) -> String {
    let l = &s.length;
    format!(
        "{}\t{}\t{:.0}\t{:.2}\t{:.2}\t{:.0}\t{}\t{}",
        s.sample_name,
        s.read_count,
        l.min,
        l.median,
        l.mean,
        l.max,
        format_stats(&s.quality),
        format_stats(&s.avg_base_quality),
    )
}

fn format_stats(s: &SummaryStats) -> String {
    format!("{:.2}\t{:.2}\t{:.2}\t{:.2}", s.min, s.median, s.mean, s.max)
}
