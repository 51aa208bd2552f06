mod common;

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::digitizer_json;

/// Write the synthetic chart and a settings file into `dir`.
fn write_inputs(dir: &TempDir) -> (PathBuf, PathBuf) {
    let chart = dir.path().join("wpd.json");
    std::fs::write(&chart, digitizer_json(0.02)).unwrap();
    let config = dir.path().join("planner.toml");
    std::fs::write(&config, "degree = 2\n").unwrap();
    (chart, config)
}

fn planner() -> Command {
    Command::cargo_bin("thinning-planner").unwrap()
}

fn fit_chart(dir: &TempDir) -> (PathBuf, PathBuf) {
    let (chart, config) = write_inputs(dir);
    let models = dir.path().join("models");
    planner()
        .arg("--config")
        .arg(&config)
        .arg("fit")
        .arg("--input")
        .arg(&chart)
        .args(["--name", "synthetic_pine"])
        .args(["--age-thinning", "100", "--age-thinning-save", "60"])
        .arg("--models-dir")
        .arg(&models)
        .assert()
        .success()
        .stdout(predicate::str::contains("Fitted 5 models"));
    (config, models)
}

#[test]
fn test_help() {
    planner()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fit"))
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_fit_writes_model_file() {
    let dir = TempDir::new().unwrap();
    let (_, models) = fit_chart(&dir);
    assert!(models.join("synthetic_pine.json").exists());
}

#[test]
fn test_simulate_prints_plan_and_exports() {
    let dir = TempDir::new().unwrap();
    let (config, models) = fit_chart(&dir);
    let events = dir.path().join("events.csv");
    let track = dir.path().join("track.csv");

    planner()
        .arg("--config")
        .arg(&config)
        .arg("simulate")
        .args(["--name", "synthetic_pine", "--bearing-parameter", "0.2"])
        .arg("--models-dir")
        .arg(&models)
        .arg("--events-csv")
        .arg(&events)
        .arg("--track-csv")
        .arg(&track)
        .assert()
        .success()
        .stdout(predicate::str::contains("Thinning Plan"))
        .stdout(predicate::str::contains("43.0"))
        .stdout(predicate::str::contains("66.5"));

    let content = std::fs::read_to_string(&events).unwrap();
    assert_eq!(content.lines().count(), 4);
    assert!(std::fs::read_to_string(&track).unwrap().lines().count() > 200);
}

#[test]
fn test_simulate_protective() {
    let dir = TempDir::new().unwrap();
    let (config, models) = fit_chart(&dir);
    planner()
        .arg("--config")
        .arg(&config)
        .arg("simulate")
        .args(["--name", "synthetic_pine", "--bearing-parameter", "0.2", "--protective"])
        .arg("--models-dir")
        .arg(&models)
        .assert()
        .success()
        .stdout(predicate::str::contains("43.0"))
        .stdout(predicate::str::contains("66.5").not());
}

#[test]
fn test_simulate_unknown_chart() {
    let dir = TempDir::new().unwrap();
    planner()
        .arg("simulate")
        .args(["--name", "absent"])
        .arg("--models-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_bearing_point_requires_both_coordinates() {
    planner()
        .args(["simulate", "--name", "x", "--bearing-x", "50"])
        .assert()
        .failure();
}

#[test]
fn test_check_reports_fit_quality() {
    let dir = TempDir::new().unwrap();
    let (config, models) = fit_chart(&dir);
    let test_csv = dir.path().join("test.csv");
    std::fs::write(
        &test_csv,
        "line,x,y\ngrowth line 9,0,0.35\ngrowth line 9,50,0.7\nmin level logging,20,0.2\n",
    )
    .unwrap();

    planner()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .args(["--name", "synthetic_pine"])
        .arg("--models-dir")
        .arg(&models)
        .arg("--test")
        .arg(&test_csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Fit Quality"))
        .stdout(predicate::str::contains("growth line 9"))
        .stdout(predicate::str::contains("Maximum approximation error"));
}

#[test]
fn test_fit_rejects_unsupported_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("chart.xlsx");
    std::fs::write(&input, "not a chart").unwrap();
    planner()
        .arg("fit")
        .arg("--input")
        .arg(&input)
        .args(["--name", "x", "--age-thinning", "80", "--age-thinning-save", "100"])
        .arg("--models-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported series format"));
}
