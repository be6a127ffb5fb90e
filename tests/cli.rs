mod common;

use assert_cmd::Command;
use bin_atlas::config::Config;
use common::{GEUMCHEON_CSV, GURO_REGION_CSV, MAPO_CSV, TestWorkspace};
use predicates::{prelude::*, str::contains};

fn bin_atlas() -> Command {
    Command::cargo_bin("bin-atlas").expect("binary exists")
}

fn seeded_workspace() -> TestWorkspace {
    let workspace = TestWorkspace::new();
    workspace.write_euc_kr("구로구.csv", GURO_REGION_CSV);
    workspace.write_euc_kr("금천구.csv", GEUMCHEON_CSV);
    workspace.write_euc_kr("마포구.csv", MAPO_CSV);
    workspace
}

#[test]
fn ingest_prints_report_table_and_summary() {
    let workspace = seeded_workspace();
    bin_atlas()
        .args(["ingest", "--data-dir"])
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(contains("구로구.csv"))
        .stdout(contains("loaded"))
        .stdout(contains("EUC-KR"))
        .stdout(contains("7 record(s); loaded: [구로구, 금천구, 마포구]; failed: []"));
}

#[test]
fn ingest_json_reports_missing_districts() {
    let workspace = seeded_workspace();
    let output = bin_atlas()
        .args(["ingest", "--json", "--data-dir"])
        .arg(workspace.path())
        .output()
        .expect("run ingest");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["total_records"], 7);
    assert_eq!(report["missing_districts"].as_array().map(Vec::len), Some(22));
    assert_eq!(report["files"][0]["status"], "loaded");
    assert_eq!(report["files"][0]["district"], "구로구");
}

#[test]
fn query_for_geumcheon_prints_placeholder_json() {
    let workspace = seeded_workspace();
    bin_atlas()
        .args(["query", "--district", "금천구", "--data-dir"])
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(
            r#"[{"latitude":"37.4566","longitude":"126.8958","address":"서울특별시 금천구 시흥대로73길 70"}]
"#,
        );
}

#[test]
fn query_filters_by_text_and_renders_table() {
    let workspace = seeded_workspace();
    bin_atlas()
        .args(["query", "-q", "독막", "--table", "--data-dir"])
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(contains("latitude"))
        .stdout(contains("서울특별시 마포구 독막로 10"))
        .stdout(contains("37.5481"))
        .stdout(contains("월드컵로").not());
}

#[test]
fn query_against_missing_directory_returns_empty_array() {
    let workspace = TestWorkspace::new();
    bin_atlas()
        .args(["query", "--data-dir"])
        .arg(workspace.path().join("absent"))
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let workspace = TestWorkspace::new();
    let config_path = workspace.path().join("bin-atlas.yaml");

    bin_atlas()
        .args(["config", "init", "-o"])
        .arg(&config_path)
        .assert()
        .success();
    let written = Config::load(&config_path).expect("load written config");
    assert_eq!(written, Config::default());

    bin_atlas()
        .args(["config", "init", "-o"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(contains("already exists"));

    bin_atlas()
        .args(["config", "init", "--force", "-o"])
        .arg(&config_path)
        .assert()
        .success();
}

#[test]
fn custom_config_changes_accepted_extensions() {
    let workspace = seeded_workspace();
    workspace.write_euc_kr("강남구.txt", MAPO_CSV);
    let config_path = workspace.path().join("config.yaml");
    let config = Config {
        extensions: vec!["txt".into()],
        ..Config::default()
    };
    config.save(&config_path).expect("save config");

    bin_atlas()
        .args(["ingest", "--config"])
        .arg(&config_path)
        .arg("--data-dir")
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(contains("2 record(s); loaded: [강남구]"));
}

#[test]
fn invalid_config_is_reported() {
    let workspace = TestWorkspace::new();
    let config_path = workspace.write("broken.yaml", "sample_rows: [not, a, number]\n");
    bin_atlas()
        .args(["districts", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn districts_lists_the_default_table() {
    let output = bin_atlas()
        .arg("districts")
        .assert()
        .success()
        .stdout(contains("구로구"))
        .stdout(contains("DigitResidue"))
        .stdout(contains("BoundingBox"))
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf-8 output");
    // Header, separator, then one line per district.
    assert_eq!(text.lines().count(), 27);
}

#[test]
fn table_and_pretty_conflict() {
    bin_atlas()
        .args(["query", "--table", "--pretty"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}
