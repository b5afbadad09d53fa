use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

const SAMPLE: &str = "= Guide\n\n== Getting Started\n\nSome *bold* text.\n\n=== Install It\n\n* step one\n* step two\n";

#[allow(deprecated)]
fn libadoc() -> Command {
    Command::cargo_bin("libadoc").expect("binary")
}

#[test]
fn parse_prints_document_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("guide.adoc");
    fs::write(&input, SAMPLE)?;

    let assert = libadoc().arg("parse").arg(&input).assert().success();
    let json: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(json["header"]["title"]["id"], "_guide");
    assert_eq!(json["elements"][0]["type"], "section");
    assert_eq!(json["elements"][0]["title"]["id"], "_getting_started");
    Ok(())
}

#[test]
fn anchors_lists_sections() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("guide.adoc");
    fs::write(&input, SAMPLE)?;

    libadoc()
        .arg("anchors")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::eq("_getting_started\n  _install_it\n"));
    Ok(())
}

#[test]
fn check_reports_failure_location() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("broken.adoc");
    fs::write(&input, "----\nunterminated\n")?;

    libadoc()
        .arg("check")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error at line 3, column 1"))
        .stderr(predicate::str::contains("no match found"));
    Ok(())
}

#[test]
fn check_with_stats_and_options_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("guide.adoc");
    fs::write(&input, SAMPLE)?;
    let options = dir.path().join("options.yml");
    fs::write(&options, "memoize: true\n")?;

    libadoc()
        .arg("--options")
        .arg(&options)
        .arg("check")
        .arg(&input)
        .arg("--stats")
        .assert()
        .success()
        .stdout(predicate::str::contains(": ok"))
        .stdout(predicate::str::contains("\"memo_hits\""));
    Ok(())
}

#[test]
fn check_rejects_unknown_entry() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("guide.adoc");
    fs::write(&input, SAMPLE)?;

    libadoc()
        .args(["check", "--entry", "NoSuchRule"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid entrypoint: NoSuchRule"));
    Ok(())
}

#[test]
fn expression_budget_stops_parse() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("guide.adoc");
    fs::write(&input, SAMPLE)?;

    libadoc()
        .args(["parse", "--max-expressions", "5"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max number of expressions parsed (5)"));
    Ok(())
}
