use clap::{ArgAction, Parser};
use fastq_readstat::{ErrorPolicy, PipelineConfig, ReaderOptions};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "fastq_readstat",
    version,
    about = "Per-sample read length/quality statistics for FASTQ folders"
)]
struct Cli {
    /// Folder containing .fastq / .fq files, optionally gzipped
    #[arg(short = 'i', long = "input_folder")]
    input_folder: PathBuf,
    /// Folder for the per-sample tables and read.stat.tsv
    #[arg(short = 'o', long = "output_folder")]
    output_folder: PathBuf,
    /// Worker threads (0 = one per core)
    #[arg(short = 't', long = "threads", default_value_t = 0)]
    threads: usize,
    /// Drop malformed records instead of skipping the whole sample
    #[arg(long = "skip-malformed", action = ArgAction::SetTrue)]
    skip_malformed: bool,
    /// More log output (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = PipelineConfig {
        input_dir: cli.input_folder,
        output_dir: cli.output_folder,
        threads: cli.threads,
        reader: ReaderOptions {
            error_policy: if cli.skip_malformed {
                ErrorPolicy::Skip
            } else {
                ErrorPolicy::Return
            },
        },
    };

    match fastq_readstat::run(&config) {
        Ok(report) => {
            log::info!("\n{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
