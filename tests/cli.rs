use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn tpsgrid(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tpsgrid").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn write_tps_log(path: &Path, count: usize) {
    let lines: Vec<String> = (0..count)
        .map(|i| format!("threads={} TPS: {} ops/sec", i % 8, 100 + i))
        .collect();
    fs::write(path, lines.join("\n") + "\n").unwrap();
}

#[test]
fn extracts_default_paths_and_keeps_input() {
    let temp_dir = TempDir::new().unwrap();
    write_tps_log(&temp_dir.path().join("memcached_f2.txt"), 30);

    tpsgrid(temp_dir.path())
        .args(["--output-format", "plain", "-q"])
        .assert()
        .success();

    let output = fs::read_to_string(temp_dir.path().join("memcached_fig2.txt")).unwrap();
    let rows: Vec<&str> = output.lines().collect();
    assert_eq!(rows.len(), 2);
    assert!(output.ends_with(",\n"));
    for row in rows {
        assert_eq!(row.split_terminator(',').count(), 15);
    }

    assert!(temp_dir.path().join("memcached_f2.txt").exists());
}

#[test]
fn delete_input_removes_log() {
    let temp_dir = TempDir::new().unwrap();
    write_tps_log(&temp_dir.path().join("bench.log"), 15);

    tpsgrid(temp_dir.path())
        .args(["bench.log", "-o", "rows.txt", "--delete-input", "-q"])
        .assert()
        .success();

    assert!(!temp_dir.path().join("bench.log").exists());
    assert!(temp_dir.path().join("rows.txt").exists());
}

#[test]
fn missing_input_fails_without_output() {
    let temp_dir = TempDir::new().unwrap();

    tpsgrid(temp_dir.path())
        .args(["absent.log", "-o", "rows.txt", "--output-format", "plain"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));

    assert!(!temp_dir.path().join("rows.txt").exists());
}

#[test]
fn marker_without_number_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("bench.log"), "TPS: 10\nTPS: ---------\n").unwrap();

    tpsgrid(temp_dir.path())
        .args(["bench.log", "-o", "rows.txt", "--output-format", "plain"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Line 2"));

    assert!(!temp_dir.path().join("rows.txt").exists());
}

#[test]
fn partial_row_is_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    write_tps_log(&temp_dir.path().join("bench.log"), 17);

    tpsgrid(temp_dir.path())
        .args(["bench.log", "-o", "rows.txt", "-q"])
        .assert()
        .code(2);

    let output = fs::read_to_string(temp_dir.path().join("rows.txt")).unwrap();
    assert!(output.ends_with("115,116,"));
    assert_eq!(output.matches('\n').count(), 1);
}

#[test]
fn verify_accepts_full_grid() {
    let temp_dir = TempDir::new().unwrap();
    write_tps_log(&temp_dir.path().join("bench.log"), 120);

    tpsgrid(temp_dir.path())
        .args(["bench.log", "-o", "rows.txt", "--verify", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"grid_check\""));
}

#[test]
fn verify_flags_row_count_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    write_tps_log(&temp_dir.path().join("bench.log"), 45);

    tpsgrid(temp_dir.path())
        .args(["bench.log", "-o", "rows.txt", "--verify", "--threads", "1,2,4,8"])
        .args(["--output-format", "plain"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("3 rows but 4 thread counts"));
}

#[test]
fn no_clobber_keeps_existing_output() {
    let temp_dir = TempDir::new().unwrap();
    write_tps_log(&temp_dir.path().join("bench.log"), 15);
    fs::write(temp_dir.path().join("rows.txt"), "keep").unwrap();

    tpsgrid(temp_dir.path())
        .args(["bench.log", "-o", "rows.txt", "--no-clobber", "-q"])
        .assert()
        .code(6);

    assert_eq!(fs::read_to_string(temp_dir.path().join("rows.txt")).unwrap(), "keep");
}

#[test]
fn config_file_sets_row_width() {
    let temp_dir = TempDir::new().unwrap();
    write_tps_log(&temp_dir.path().join("tpcc.log"), 32);
    fs::write(
        temp_dir.path().join("tpsgrid.toml"),
        "[extract]\nvalues_per_row = 16\n\n[io]\ninput = \"tpcc.log\"\noutput = \"tpcc_f2.txt\"\n",
    )
    .unwrap();

    tpsgrid(temp_dir.path()).arg("-q").assert().success();

    let output = fs::read_to_string(temp_dir.path().join("tpcc_f2.txt")).unwrap();
    assert_eq!(output.lines().count(), 2);
    assert_eq!(output.lines().next().unwrap().split_terminator(',').count(), 16);
}

#[test]
fn generate_config_writes_sample() {
    let temp_dir = TempDir::new().unwrap();

    tpsgrid(temp_dir.path())
        .args(["--generate-config", "--config", "sample.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sample.toml"));

    let content = fs::read_to_string(temp_dir.path().join("sample.toml")).unwrap();
    assert!(content.contains("marker = \"TPS\""));
}

#[test]
fn dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write_tps_log(&temp_dir.path().join("bench.log"), 15);

    tpsgrid(temp_dir.path())
        .args(["bench.log", "-o", "rows.txt", "--delete-input", "--dry-run"])
        .args(["--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Values per row: 15"));

    assert!(temp_dir.path().join("bench.log").exists());
    assert!(!temp_dir.path().join("rows.txt").exists());
}

#[test]
fn dry_run_human_messages_carry_one_mark() {
    let temp_dir = TempDir::new().unwrap();
    write_tps_log(&temp_dir.path().join("bench.log"), 3);

    tpsgrid(temp_dir.path())
        .args(["bench.log", "--dry-run"])
        .args(["--window-offset", "18446744073709551615"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Input log found"))
        .stdout(predicate::str::contains("✓ ✓").not())
        .stdout(predicate::str::contains("+18446744073709551615..+18446744073709551615"));
}
