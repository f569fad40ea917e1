//! Per-sample metrics table: one tab-separated row per read.

use crate::error::TableError;
use crate::metrics::ReadMetric;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const TABLE_HEADER: &str = "read_id\tread_length\tread_quality\taverage_base_quality";

const READ_ID_COL: &str = "read_id";
const LENGTH_COL: &str = "read_length";
const QUALITY_COL: &str = "read_quality";
const AVG_BASE_QUALITY_COL: &str = "average_base_quality";

/// Streams `ReadMetric` rows out as they are computed.
pub struct MetricsTableWriter<W: Write> {
    out: W,
    rows: u64,
}

impl MetricsTableWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let f = File::create(path)?;
        Self::new(BufWriter::with_capacity(256 * 1024, f))
    }
}

impl<W: Write> MetricsTableWriter<W> {
    /// Writes the header immediately.
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{TABLE_HEADER}")?;
        Ok(Self { out, rows: 0 })
    }

    pub fn write(&mut self, m: &ReadMetric) -> io::Result<()> {
        self.rows += 1;
        writeln!(self.out, "{}", m.to_row())
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// The three numeric columns of a metrics table, in row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricColumns {
    pub lengths: Vec<f64>,
    pub qualities: Vec<f64>,
    pub avg_base_qualities: Vec<f64>,
}

impl MetricColumns {
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn push(&mut self, m: &ReadMetric) {
        self.lengths.push(m.read_length as f64);
        self.qualities.push(m.read_quality);
        self.avg_base_qualities.push(m.average_base_quality);
    }
}

pub fn read_metrics_table<P: AsRef<Path>>(path: P) -> Result<MetricColumns, TableError> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_metrics_table(BufReader::new(f), path)
}

/// Columns are located by header name; extra columns are ignored. When
/// `read_id` is the first column, surplus tabs in a row belong to it.
/// `path` is only used for error messages.
pub fn parse_metrics_table<R: BufRead>(
    reader: R,
    path: &Path,
) -> Result<MetricColumns, TableError> {
    let mut lines = reader.lines().enumerate();
    let io_err = |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    };

    let header = match lines.next() {
        Some((_, line)) => line.map_err(io_err)?,
        None => {
            return Err(TableError::MissingHeader {
                path: path.to_path_buf(),
            });
        }
    };
    let names: Vec<&str> = header.trim_end_matches('\r').split('\t').collect();
    let column = |name: &'static str| {
        names
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| TableError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };
    let (len_idx, qual_idx, avg_idx) = (
        column(LENGTH_COL)?,
        column(QUALITY_COL)?,
        column(AVG_BASE_QUALITY_COL)?,
    );
    let expected = names.len();
    // ids are written verbatim and may hold tabs; a leading id column takes the overflow
    let id_first = names.first() == Some(&READ_ID_COL);

    let mut cols = MetricColumns::default();
    for (i, line) in lines {
        let line = line.map_err(io_err)?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = if id_first {
            let mut fields: Vec<&str> = line.rsplitn(expected, '\t').collect();
            fields.reverse();
            fields
        } else {
            line.split('\t').collect()
        };
        if fields.len() != expected {
            return Err(TableError::FieldCount {
                path: path.to_path_buf(),
                line: i + 1,
                expected,
                actual: fields.len(),
            });
        }
        let num = |idx: usize, column: &'static str| {
            fields[idx]
                .trim()
                .parse::<f64>()
                .map_err(|_| TableError::BadNumber {
                    path: path.to_path_buf(),
                    line: i + 1,
                    column,
                    value: fields[idx].to_string(),
                })
        };
        cols.lengths.push(num(len_idx, LENGTH_COL)?);
        cols.qualities.push(num(qual_idx, QUALITY_COL)?);
        cols.avg_base_qualities.push(num(avg_idx, AVG_BASE_QUALITY_COL)?);
    }
    Ok(cols)
}

/// `<dir>/<sample>.tsv`
pub fn table_path(dir: &Path, sample: &str) -> PathBuf {
    dir.join(format!("{sample}.tsv"))
}
