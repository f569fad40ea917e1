use fastq_readstat::{
    ErrorPolicy, PipelineConfig, REPORT_FILE_NAME, REPORT_HEADER, ReaderOptions, SampleError,
    SampleInput, TABLE_HEADER, discover_samples, process_sample,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, data: &str) {
    fs::write(path, data).unwrap();
}

fn config(input: &Path, output: &Path) -> PipelineConfig {
    PipelineConfig {
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        threads: 2,
        reader: ReaderOptions::default(),
    }
}

fn fastq(reads: &[(&str, &str)]) -> String {
    reads
        .iter()
        .map(|(id, qual)| format!("@{id}\n{}\n+\n{qual}\n", "A".repeat(qual.len())))
        .collect()
}

#[test]
fn single_zero_quality_read() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let input = SampleInput {
        name: "s".into(),
        path: dir.path().join("s.fastq"),
    };
    write(&input.path, &fastq(&[("r1", "!!!!")]));

    let summary = process_sample(&input, &out, &ReaderOptions::default()).unwrap();
    assert_eq!(summary.read_count, 1);
    assert_eq!(summary.length.min, 4.0);
    assert_eq!(summary.quality.max, 0.0);
    assert_eq!(summary.avg_base_quality.mean, 0.0);

    let table = fs::read_to_string(out.join("s.tsv")).unwrap();
    assert_eq!(table, format!("{TABLE_HEADER}\n@r1\t4\t0.00\t0.00\n"));
}

#[test]
fn two_reads_lengths_ten_and_twenty() {
    let dir = tempdir().unwrap();
    let input = SampleInput {
        name: "s".into(),
        path: dir.path().join("s.fastq"),
    };
    write(
        &input.path,
        &fastq(&[("a", "5".repeat(10).as_str()), ("b", "+".repeat(20).as_str())]),
    );

    let s = process_sample(&input, dir.path(), &ReaderOptions::default()).unwrap();
    assert_eq!(s.read_count, 2);
    assert_eq!(s.length.min, 10.0);
    assert_eq!(s.length.max, 20.0);
    assert_eq!(s.length.median, 15.0);
    assert_eq!(s.length.mean, 15.0);
    // '5' = 20, '+' = 10
    assert_eq!(s.quality.min, 10.0);
    assert_eq!(s.quality.max, 20.0);
    assert_eq!(s.avg_base_quality.min, 0.5);
    assert_eq!(s.avg_base_quality.max, 2.0);
    assert!(s.quality.min <= s.quality.median && s.quality.median <= s.quality.max);
}

#[test]
fn empty_sample_is_an_error_and_leaves_no_table() {
    let dir = tempdir().unwrap();
    let input = SampleInput {
        name: "e".into(),
        path: dir.path().join("e.fastq"),
    };
    write(&input.path, "");
    let err = process_sample(&input, dir.path(), &ReaderOptions::default()).unwrap_err();
    assert!(matches!(err, SampleError::Empty { .. }));
    assert!(!dir.path().join("e.tsv").exists());
}

#[test]
fn truncated_sample_fails_unless_skipping() {
    let dir = tempdir().unwrap();
    let input = SampleInput {
        name: "t".into(),
        path: dir.path().join("t.fastq"),
    };
    write(&input.path, &format!("{}@r2\nACGT\n", fastq(&[("r1", "IIII")])));

    let err = process_sample(&input, dir.path(), &ReaderOptions::default()).unwrap_err();
    assert!(matches!(err, SampleError::Read { .. }));

    let skip = ReaderOptions {
        error_policy: ErrorPolicy::Skip,
    };
    let s = process_sample(&input, dir.path(), &skip).unwrap();
    assert_eq!(s.read_count, 1);
}

#[test]
fn discovery_filters_and_sorts() {
    let dir = tempdir().unwrap();
    for name in ["b.fq", "a.fastq.gz", "c.fastq", "notes.txt", "d.tsv"] {
        write(&dir.path().join(name), "");
    }
    fs::create_dir(dir.path().join("sub.fastq")).unwrap();

    let names: Vec<_> = discover_samples(dir.path())
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn partial_failure_keeps_good_samples() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();

    write(&input.join("s1.fastq"), &fastq(&[("r1", "IIII"), ("r2", "##")]));
    write(&input.join("s2.fastq"), "@r1\nACGT\n+\n");
    {
        let f = File::create(input.join("s3.fastq.gz")).unwrap();
        let mut enc = flate2::write::GzEncoder::new(f, flate2::Compression::fast());
        enc.write_all(fastq(&[("x", "!!!")]).as_bytes()).unwrap();
        enc.finish().unwrap();
    }

    let report = fastq_readstat::run(&config(&input, &output)).unwrap();
    let names: Vec<_> = report.rows().iter().map(|r| r.sample_name.as_str()).collect();
    assert_eq!(names, ["s1", "s3"]);
    assert_eq!(report.diagnostics().len(), 1);
    assert_eq!(report.diagnostics()[0].sample, "s2");

    let text = fs::read_to_string(output.join(REPORT_FILE_NAME)).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], REPORT_HEADER);
    assert_eq!(lines.len(), 3);
    // 'I' = 40, '#' = 2
    assert_eq!(
        lines[1],
        "s1\t2\t2\t3.00\t3.00\t4\t2.00\t21.00\t21.00\t40.00\t1.00\t5.50\t5.50\t10.00"
    );
    assert!(lines[2].starts_with("s3\t1\t3\t3.00\t3.00\t3\t0.00\t"));
    assert!(output.join("s1.tsv").exists());
    assert!(!output.join("s2.tsv").exists());
}

#[test]
fn same_sample_name_twice_keeps_first() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();
    write(&input.join("a.fastq"), &fastq(&[("r1", "II")]));
    write(&input.join("a.fq"), &fastq(&[("r1", "III")]));

    let report = fastq_readstat::run(&config(&input, &output)).unwrap();
    assert_eq!(report.rows().len(), 1);
    assert_eq!(report.rows()[0].length.min, 2.0);
    assert!(matches!(
        report.diagnostics()[0].error,
        SampleError::Duplicate { .. }
    ));
}

#[test]
fn rerun_is_byte_identical() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();
    for i in 0..4 {
        write(
            &input.join(format!("s{i}.fastq")),
            &fastq(&[("r1", "I5+#"), ("r2", "?".repeat(i + 1).as_str())]),
        );
    }

    fastq_readstat::run(&config(&input, &output)).unwrap();
    let first = fs::read(output.join(REPORT_FILE_NAME)).unwrap();
    fastq_readstat::run(&config(&input, &output)).unwrap();
    let second = fs::read(output.join(REPORT_FILE_NAME)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unreadable_input_folder_is_fatal() {
    let dir = tempdir().unwrap();
    let err = fastq_readstat::run(&config(&dir.path().join("missing"), dir.path())).unwrap_err();
    assert!(matches!(
        err,
        fastq_readstat::PipelineError::ListInput { .. }
    ));
}

#[test]
fn read_id_with_tabs_is_kept_whole() {
    let dir = tempdir().unwrap();
    let input = SampleInput {
        name: "tagged".into(),
        path: dir.path().join("tagged.fastq"),
    };
    write(&input.path, "@r1\tRG:Z:grp1\nACGT\n+\nIIII\n");

    let s = process_sample(&input, dir.path(), &ReaderOptions::default()).unwrap();
    assert_eq!(s.read_count, 1);
    assert_eq!(s.length.min, 4.0);
    assert_eq!(s.quality.max, 40.0);
    assert_eq!(s.avg_base_quality.max, 10.0);

    let table = fs::read_to_string(dir.path().join("tagged.tsv")).unwrap();
    assert_eq!(table, format!("{TABLE_HEADER}\n@r1\tRG:Z:grp1\t4\t40.00\t10.00\n"));
}

#[test]
fn report_write_failure_is_fatal_and_leaves_nothing_behind() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();
    write(&input.join("s1.fastq"), &fastq(&[("r1", "IIII")]));
    // a directory where the report should go
    fs::create_dir_all(output.join(REPORT_FILE_NAME)).unwrap();

    let err = fastq_readstat::run(&config(&input, &output)).unwrap_err();
    assert!(matches!(err, fastq_readstat::PipelineError::Report(_)));
    assert!(output.join(REPORT_FILE_NAME).is_dir());

    let mut left: Vec<_> = fs::read_dir(&output)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    left.sort();
    assert_eq!(left, [REPORT_FILE_NAME, "s1.tsv"]);
}

#[test]
fn sample_named_like_the_report_is_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();
    write(&input.join("read.stat.fastq"), &fastq(&[("r1", "II")]));
    write(&input.join("s1.fastq"), &fastq(&[("r1", "III")]));

    let report = fastq_readstat::run(&config(&input, &output)).unwrap();
    let names: Vec<_> = report.rows().iter().map(|r| r.sample_name.as_str()).collect();
    assert_eq!(names, ["s1"]);
    assert_eq!(report.diagnostics().len(), 1);
    assert_eq!(report.diagnostics()[0].sample, "read.stat");
    assert!(matches!(
        report.diagnostics()[0].error,
        SampleError::ReservedName { .. }
    ));

    let text = fs::read_to_string(output.join(REPORT_FILE_NAME)).unwrap();
    assert_eq!(text.lines().next(), Some(REPORT_HEADER));
    assert_eq!(text.lines().count(), 2);
}
