use std::path::PathBuf;

use bin_atlas::{
    dataset::Record,
    districts::DistrictTable,
    ingest::{FileOutcome, FileStatus, LoadReport},
    table::{render_districts, render_load_report, render_records, render_table},
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn render_table_aligns_columns() {
    let headers = strings(&["id", "name"]);
    let rows = vec![strings(&["1", "Alice"]), strings(&["2", "Bob"])];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines, vec!["id  name", "---  -----", "1   Alice", "2   Bob"]);
}

#[test]
fn render_table_normalizes_control_characters() {
    let headers = strings(&["address"]);
    let rows = vec![strings(&["line1\nline2\tvalue"])];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "line1 line2 value");
}

#[test]
fn render_table_counts_hangul_as_double_width() {
    let headers = strings(&["구", "n"]);
    let rows = vec![strings(&["마포구", "1"]), strings(&["x", "2"])];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(
        lines,
        vec!["구      n", "------  ---", "마포구  1", "x       2"]
    );
}

#[test]
fn render_table_skips_ansi_sequences_when_measuring() {
    let headers = strings(&["status", "code"]);
    let rows = vec![strings(&["\u{1b}[31mERR\u{1b}[0m", "1"])];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[2], "\u{1b}[31mERR\u{1b}[0m     1");
}

#[test]
fn records_render_with_decimal_coordinates_and_blank_unknowns() {
    let records = vec![
        Record::new(Some(37.5), Some(127.0), "서울특별시 마포구 독막로 10"),
        Record::new(None, None, "구로3동"),
    ];

    let rendered = render_records(&records);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "latitude  longitude  address");
    assert_eq!(lines[2], "37.5      127.0      서울특별시 마포구 독막로 10");
    assert_eq!(lines[3], format!("{}구로3동", " ".repeat(21)));
}

#[test]
fn load_report_lists_each_file_outcome() {
    let report = LoadReport {
        files: vec![
            FileOutcome {
                path: PathBuf::from("data/마포구.csv"),
                district: Some("마포구".into()),
                status: FileStatus::Loaded {
                    encoding: "EUC-KR".into(),
                    rows: 12,
                    excluded: 1,
                },
            },
            FileOutcome {
                path: PathBuf::from("data/bins.csv"),
                district: None,
                status: FileStatus::Skipped {
                    reason: "bad bytes".into(),
                },
            },
        ],
        total_records: 12,
        ..LoadReport::default()
    };

    let rendered = render_load_report(&report);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("file"));
    assert!(lines[2].starts_with("마포구.csv"));
    assert!(lines[2].contains("loaded"));
    assert!(lines[2].ends_with("12    1"));
    assert!(lines[3].contains("skipped: bad bytes"));
    assert!(lines[3].contains(" - "));
}

#[test]
fn district_table_renders_one_line_per_rule() {
    let rendered = render_districts(&DistrictTable::seoul());
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 27);
    assert!(lines[6].contains("구로구"));
    assert!(lines[6].contains("DigitResidue"));
}
