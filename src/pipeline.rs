//! Sample discovery and the per-sample / whole-run drivers.

use crate::error::{PipelineError, SampleError};
use crate::metrics::ReadMetric;
use crate::policy::ReaderOptions;
use crate::reader::FastqReader;
use crate::report::{REPORT_FILE_NAME, Report, SampleOutcome};
use crate::stats::{SampleSummary, summarize};
use crate::table::{MetricsTableWriter, read_metrics_table, table_path};

use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const FASTQ_SUFFIXES: [&str; 2] = [".fastq", ".fq"];
const PROGRESS_EVERY: u64 = 1000;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
    pub reader: ReaderOptions,
}

/// One input file and the sample name derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleInput {
    pub name: String,
    pub path: PathBuf,
}

/// `x.fastq`, `x.fq`, `x.fastq.gz`, `x.fq.gz` -> `x`. `None` for anything else.
pub fn sample_name(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(".gz").unwrap_or(file_name);
    FASTQ_SUFFIXES
        .iter()
        .find_map(|suffix| stem.strip_suffix(suffix))
        .filter(|name| !name.is_empty())
}

/// FASTQ files directly inside `dir`, sorted by file name.
pub fn discover_samples(dir: &Path) -> Result<Vec<SampleInput>, PipelineError> {
    let list_err = |source| PipelineError::ListInput {
        path: dir.to_path_buf(),
        source,
    };
    let mut samples = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
            log::debug!("ignoring non UTF-8 file name {}", path.display());
            continue;
        };
        if let Some(name) = sample_name(file_name) {
            samples.push(SampleInput {
                name: name.to_string(),
                path: path.clone(),
            });
        }
    }
    samples.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(samples)
}

/// True if the sample's table would land on the report file.
fn collides_with_report(sample: &str) -> bool {
    table_path(Path::new(""), sample) == Path::new(REPORT_FILE_NAME)
}

/// Stream the FASTQ into `<out_dir>/<sample>.tsv`, then aggregate that table.
/// On failure the partial table is removed.
pub fn process_sample(
    input: &SampleInput,
    out_dir: &Path,
    opts: &ReaderOptions,
) -> Result<SampleSummary, SampleError> {
    let table = table_path(out_dir, &input.name);
    let result = write_metrics_table(input, &table, opts).and_then(|_| {
        let cols = read_metrics_table(&table)?;
        summarize(&input.name, &cols).ok_or_else(|| SampleError::Empty {
            path: input.path.clone(),
        })
    });
    if result.is_err() && table.exists() {
        if let Err(e) = fs::remove_file(&table) {
            log::debug!("could not remove partial table {}: {e}", table.display());
        }
    }
    result
}

fn write_metrics_table(
    input: &SampleInput,
    table: &Path,
    opts: &ReaderOptions,
) -> Result<u64, SampleError> {
    let read_err = |source| SampleError::Read {
        path: input.path.clone(),
        source,
    };
    let write_err = |source| SampleError::TableWrite {
        path: table.to_path_buf(),
        source,
    };

    let reader = FastqReader::from_path(&input.path, opts.clone()).map_err(read_err)?;
    let mut writer = MetricsTableWriter::create(table).map_err(write_err)?;
    for rec in reader {
        let rec = rec.map_err(read_err)?;
        writer
            .write(&ReadMetric::from_record(&rec))
            .map_err(write_err)?;
        if writer.rows() % PROGRESS_EVERY == 0 {
            log::info!("processed {} reads for sample {}", writer.rows(), input.name);
        }
    }
    let rows = writer.rows();
    writer.finish().map_err(write_err)?;
    if rows == 0 {
        return Err(SampleError::Empty {
            path: input.path.clone(),
        });
    }
    log::debug!("sample {}: {rows} reads", input.name);
    Ok(rows)
}

/// Process every discovered sample in parallel and write the report.
///
/// Per-sample failures are logged as they happen and end up as report
/// diagnostics; only run-level problems are returned as errors.
pub fn run(config: &PipelineConfig) -> Result<Report, PipelineError> {
    fs::create_dir_all(&config.output_dir).map_err(|source| PipelineError::CreateOutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let samples = discover_samples(&config.input_dir)?;
    log::info!(
        "found {} FASTQ files in {}",
        samples.len(),
        config.input_dir.display()
    );

    // Later files mapping to an already-used name would overwrite its table, and
    // a table named like the report would be overwritten by it.
    let mut seen = HashSet::new();
    let jobs: Vec<(SampleInput, Option<SampleError>)> = samples
        .into_iter()
        .map(|s| {
            let rejected = if collides_with_report(&s.name) {
                Some(SampleError::ReservedName {
                    sample: s.name.clone(),
                })
            } else if !seen.insert(s.name.clone()) {
                Some(SampleError::Duplicate {
                    sample: s.name.clone(),
                })
            } else {
                None
            };
            (s, rejected)
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let outcomes: Vec<SampleOutcome> = pool.install(|| {
        jobs.into_par_iter()
            .map(|(input, rejected)| {
                let result = match rejected {
                    Some(e) => Err(e),
                    None => process_sample(&input, &config.output_dir, &config.reader),
                };
                match &result {
                    Ok(s) => log::info!("sample {} done ({} reads)", s.sample_name, s.read_count),
                    Err(e) => log::warn!(
                        "sample {} skipped ({}): {e}",
                        input.name,
                        input.path.display()
                    ),
                }
                SampleOutcome {
                    sample: input.name,
                    result,
                }
            })
            .collect()
    });

    let report = Report::from_outcomes(outcomes);
    let path = report.persist(&config.output_dir)?;
    log::info!(
        "{} samples reported, {} skipped; report written to {}",
        report.rows().len(),
        report.diagnostics().len(),
        path.display()
    );
    Ok(report)
}
