mod common;

use std::process::{Command, Output};

use common::{remove_test_bam, temp_path, write_test_bam};

fn run_cistrans(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cistrans"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_usage_error() {
    let output = run_cistrans(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());

    let output = run_cistrans(&["only_one_argument.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_index_load_failure() {
    let variant_fn = temp_path("index_failure_variants.txt");
    std::fs::write(&variant_fn, "chr1 100\nchr1 200\n").unwrap();
    let not_bam_fn = temp_path("index_failure.bam");
    std::fs::write(&not_bam_fn, "this is not an alignment file\n").unwrap();

    let output = run_cistrans(&[variant_fn.to_str().unwrap(), not_bam_fn.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    // a missing alignment file is the same failure
    let missing_fn = temp_path("index_failure_missing.bam");
    let output = run_cistrans(&[variant_fn.to_str().unwrap(), missing_fn.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    std::fs::remove_file(variant_fn).unwrap();
    std::fs::remove_file(not_bam_fn).unwrap();
}

#[test]
fn test_malformed_variants() {
    let variant_fn = temp_path("malformed_variants.txt");
    std::fs::write(&variant_fn, "chr1 100\nchr1\n").unwrap();
    let bam_fn = write_test_bam("malformed", &[
        "read1\t0\tchr1\t51\t60\t200M\t*\t0\t0\t*\t*"
    ], true);

    let output = run_cistrans(&[variant_fn.to_str().unwrap(), bam_fn.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(exitcode::DATAERR));
    assert!(output.stdout.is_empty());

    // nearby positions past the htslib coordinate range are rejected before any query
    std::fs::write(&variant_fn, "chr1 9223372036854775806\nchr1 9223372036854775807\n").unwrap();
    let output = run_cistrans(&[variant_fn.to_str().unwrap(), bam_fn.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(exitcode::DATAERR));
    assert!(output.stdout.is_empty());

    std::fs::remove_file(variant_fn).unwrap();
    remove_test_bam(&bam_fn);
}

#[test]
fn test_end_to_end() {
    let variant_fn = temp_path("e2e_variants.txt");
    std::fs::write(&variant_fn, "chr1 200\nchr1 100\nchr2 100\nchr1 600\nchr2 400\n").unwrap();
    let bam_fn = write_test_bam("e2e", &[
        "read1\t0\tchr1\t51\t60\t200M\t*\t0\t0\t*\t*",
        "read2\t0\tchr1\t51\t60\t100M\t*\t0\t0\t*\t*",
        "read3\t0\tchr1\t151\t60\t100M\t*\t0\t0\t*\t*",
        "read4\t0\tchr2\t301\t60\t200M\t*\t0\t0\t*\t*"
    ], true);

    let expected = "chr1\t100\tchr1\t200\t1\t1\t2\n\
        chr1\t200\tchr1\t600\t0\t2\t2\n\
        chr2\t100\tchr2\t400\t0\t0\t0\n";

    for extra_args in [vec![], vec!["--threads", "3", "--pair-strategy", "windowed"]] {
        let mut args: Vec<&str> = vec![variant_fn.to_str().unwrap(), bam_fn.to_str().unwrap()];
        args.extend(extra_args.iter());
        let output = run_cistrans(&args);
        assert_eq!(output.status.code(), Some(0));
        assert_eq!(String::from_utf8(output.stdout).unwrap(), expected);
    }

    let output = run_cistrans(&[variant_fn.to_str().unwrap(), bam_fn.to_str().unwrap(), "--counting-mode", "symmetric"]);
    assert_eq!(output.status.code(), Some(0));
    let expected_symmetric = "chr1\t100\tchr1\t200\t1\t2\t3\n\
        chr1\t200\tchr1\t600\t0\t2\t2\n\
        chr2\t100\tchr2\t400\t0\t1\t1\n";
    assert_eq!(String::from_utf8(output.stdout).unwrap(), expected_symmetric);

    std::fs::remove_file(variant_fn).unwrap();
    remove_test_bam(&bam_fn);
}
