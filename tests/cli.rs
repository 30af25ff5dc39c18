use std::io;
use std::process::{Command, Output};
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

fn cli_bin() -> &'static str {
    env!("CARGO_BIN_EXE_selectivity")
}

fn run_cli(args: &[&str]) -> io::Result<Output> {
    Command::new(cli_bin()).args(args).output()
}

fn assert_cli_success(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn default_run_prints_sample_report() -> io::Result<()> {
    let output = run_cli(&[])?;
    assert_cli_success(&output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Selectivity of condition A: 0.5\n\
         Selectivity of condition B: 0.2\n\
         Selectivity of condition A AND B: 0.1\n\
         Selectivity of condition A OR B: 0.6\n"
    );
    Ok(())
}

#[test]
fn csv_input_with_custom_conditions() -> io::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("people.csv");
    std::fs::write(&path, "age,city\n30,Oslo\n45,Rome\n22,Oslo\n60,Lima\n")?;
    let path = path.to_string_lossy().into_owned();

    let output = run_cli(&["--input", &path, "-a", "age >= 30", "-b", "city = 'Oslo'"])?;
    assert_cli_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Selectivity of condition A: 0.75\n"), "{stdout}");
    assert!(stdout.contains("Selectivity of condition B: 0.5\n"), "{stdout}");
    assert!(stdout.contains("Selectivity of condition A AND B: 0.25\n"), "{stdout}");
    assert!(stdout.contains("Selectivity of condition A OR B: 1.0\n"), "{stdout}");
    Ok(())
}

#[test]
fn empty_input_fails_unless_zero_policy() -> io::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("empty.json");
    std::fs::write(&path, "[]")?;
    let path = path.to_string_lossy().into_owned();

    let output = run_cli(&["--input", &path, "-a", "true", "-b", "false"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty dataset"));

    let output = run_cli(&["--input", &path, "-a", "true", "-b", "false", "--empty-as-zero"])?;
    assert_cli_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Selectivity of condition A: 0.0\n"));
    Ok(())
}

fn assert_empty_file_policies(path: &str) -> io::Result<()> {
    let output = run_cli(&["--input", path, "-a", "A > 5", "-b", "B == 6"])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("empty dataset"), "{stderr}");

    let output = run_cli(&["--input", path, "-a", "A > 5", "-b", "B == 6", "--empty-as-zero"])?;
    assert_cli_success(&output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Selectivity of condition A: 0.0\n\
         Selectivity of condition B: 0.0\n\
         Selectivity of condition A AND B: 0.0\n\
         Selectivity of condition A OR B: 0.0\n"
    );
    Ok(())
}

#[test]
fn header_only_csv_follows_empty_policy() -> io::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, "A,B\n")?;
    assert_empty_file_policies(&path.to_string_lossy())
}

#[test]
fn zero_row_parquet_follows_empty_policy() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("empty.parquet");
    let schema = Arc::new(Schema::new(vec![
        Field::new("A", DataType::Int64, false),
        Field::new("B", DataType::Int64, false),
    ]));
    let writer = ArrowWriter::try_new(std::fs::File::create(&path)?, schema, None)?;
    writer.close()?;

    assert_empty_file_policies(&path.to_string_lossy())?;
    Ok(())
}

#[test]
fn unknown_column_reports_error() -> io::Result<()> {
    let output = run_cli(&["-b", "Z > 1"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("column 'Z' not found"));
    Ok(())
}

#[test]
fn json_output_lists_entries() -> io::Result<()> {
    let output = run_cli(&["--json"])?;
    assert_cli_success(&output);
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let entries = report["entries"].as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[2]["name"], "A AND B");
    assert_eq!(entries[2]["selectivity"], 0.1);
    Ok(())
}
