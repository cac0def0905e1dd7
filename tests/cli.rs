use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("figspec").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("timeseries"));
}

#[test]
fn preset_prints_yaml() {
    let mut cmd = Command::cargo_bin("figspec").unwrap();
    cmd.args(["preset", "presentation"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("figure_width:"))
        .stdout(predicate::str::contains("title_size:"));
}

#[test]
fn preset_written_to_file_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cfg/pub.yaml");
    let mut cmd = Command::cargo_bin("figspec").unwrap();
    cmd.args(["preset", "publication", "--out"]).arg(&out);
    cmd.assert().success();
    let mut loaded = figspec::GlobalPlotSettings::load_yaml(&out).unwrap();
    let expected = figspec::preset("publication").unwrap();
    // stamped when the other process built its registry
    loaded.created.clone_from(&expected.created);
    assert_eq!(loaded, expected);
}

#[test]
fn unknown_preset_fails_with_the_list() {
    let mut cmd = Command::cargo_bin("figspec").unwrap();
    cmd.args(["preset", "poster"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("science_style"));
}

#[test]
fn demo_writes_three_figures() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("figspec").unwrap();
    cmd.args(["demo", "--outdir"]).arg(dir.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Demo figures created:"));
    for name in ["demo_line.png", "demo_histogram.png", "demo_subplots.png"] {
        let meta = fs::metadata(dir.path().join(name)).unwrap();
        assert!(meta.len() > 0, "{name}");
    }
}

#[test]
fn timeseries_reads_csv_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("load.csv");
    fs::write(
        &csv,
        "DATE,north,south\n2024-03-01 00:00,5,1\n2024-03-02 00:00,6,2\n2024-03-04 00:00,4,3\n2024-03-05 00:00,7,2\n",
    )
    .unwrap();
    let config = dir.path().join("style.json");
    fs::write(&config, r#"{"title": "Load", "figure_width": 5.0, "figure_height": 3.0}"#).unwrap();
    let out = dir.path().join("plots/load.svg");

    let mut cmd = Command::cargo_bin("figspec").unwrap();
    cmd.args(["timeseries", "--csv"])
        .arg(&csv)
        .args(["--column", "north;south", "--aggregate", "max", "--fill", "--weeks", "--boundaries"])
        .arg("--config")
        .arg(&config)
        .arg("--out")
        .arg(&out);
    cmd.assert().success();
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn timeseries_rejects_unknown_config_format() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("x.csv");
    fs::write(&csv, "DATE,v\n2024-01-01,1\n2024-01-02,2\n").unwrap();
    let config = dir.path().join("style.toml");
    fs::write(&config, "title = 'x'\n").unwrap();

    let mut cmd = Command::cargo_bin("figspec").unwrap();
    cmd.args(["timeseries", "--csv"])
        .arg(&csv)
        .args(["--column", "v", "--config"])
        .arg(&config)
        .arg("--out")
        .arg(dir.path().join("x.png"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unsupported config format"));
}
