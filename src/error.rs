use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy)]
pub struct IoContext {
    pub byte_pos: u64,
    pub line_num: u64,
}

impl IoContext {
    pub(crate) const START: IoContext = IoContext {
        byte_pos: 0,
        line_num: 0,
    };
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unexpected EOF inside record (fewer than 4 lines left)")]
    UnexpectedEof,
    #[error("quality length ({qual}) does not match sequence length ({seq})")]
    LengthMismatch { seq: usize, qual: usize },
    #[error("empty sequence")]
    EmptySequence,
    #[error("input is gzip-compressed but the `gzip` feature is disabled")]
    GzipDisabled,
}

#[derive(Debug, Error)]
pub enum FastqError {
    #[error("I/O error at {ctx:?}: {source}")]
    Io {
        #[source]
        source: io::Error,
        ctx: IoContext,
    },
    #[error("format error at {ctx:?}: {source}")]
    Format {
        #[source]
        source: FormatError,
        ctx: IoContext,
    },
}

impl FastqError {
    pub(crate) fn io_err(source: io::Error, ctx: IoContext) -> Self {
        Self::Io { source, ctx }
    }
    pub(crate) fn fmt_err(source: FormatError, ctx: IoContext) -> Self {
        Self::Format { source, ctx }
    }

    /// True for a truncated or misaligned record, as opposed to an I/O failure.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

/// Failure to read back a per-sample metrics table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} has no header line", path.display())]
    MissingHeader { path: PathBuf },
    #[error("{} is missing column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{}:{line}: expected {expected} fields, found {actual}", path.display())]
    FieldCount {
        path: PathBuf,
        line: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{}:{line}: column `{column}` has non-numeric value {value:?}", path.display())]
    BadNumber {
        path: PathBuf,
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Everything that can sink a single sample. Never escapes the sample boundary.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("cannot read FASTQ {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: FastqError,
    },
    #[error("no reads in {}", path.display())]
    Empty { path: PathBuf },
    #[error("cannot write metrics table {}: {source}", path.display())]
    TableWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    IntermediateTable(#[from] TableError),
    #[error("sample name `{sample}` is already used by an earlier input")]
    Duplicate { sample: String },
    #[error("sample name `{sample}` would overwrite the report file")]
    ReservedName { sample: String },
}

#[derive(Debug, Error)]
#[error("cannot write report {}: {source}", path.display())]
pub struct ReportWriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Run-level failures; these are the only fatal ones.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot list input folder {}: {source}", path.display())]
    ListInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot create output folder {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Report(#[from] ReportWriteError),
}
