//! Terminal tables for load reports, query results, and the district table.
//!
//! Column widths count terminal cells rather than bytes or chars: Hangul and
//! other wide scripts take two cells, ANSI colour sequences take none.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    dataset::{Record, format_coordinate},
    districts::DistrictTable,
    ingest::{FileStatus, LoadReport},
    io_utils,
};

const RECORD_HEADERS: &[&str] = &["latitude", "longitude", "address"];
const REPORT_HEADERS: &[&str] = &["file", "district", "status", "encoding", "rows", "excluded"];
const DISTRICT_HEADERS: &[&str] = &["#", "district", "keywords", "cleanup", "coordinates"];

/// Query results, one row per record. Unknown coordinates render blank.
pub fn render_records(records: &[Record]) -> String {
    let coordinate = |value: Option<f64>| value.map(format_coordinate).unwrap_or_default();
    let rows = records
        .iter()
        .map(|record| {
            vec![
                coordinate(record.latitude),
                coordinate(record.longitude),
                record.address.clone(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers(RECORD_HEADERS), &rows)
}

/// One row per discovered file, in discovery order.
pub fn render_load_report(report: &LoadReport) -> String {
    let rows = report
        .files
        .iter()
        .map(|outcome| {
            let file = io_utils::file_name_lossy(&outcome.path);
            let district = outcome.district.clone().unwrap_or_else(|| "-".into());
            let (status, encoding, rows, excluded) = match &outcome.status {
                FileStatus::Loaded {
                    encoding,
                    rows,
                    excluded,
                } => ("loaded".to_string(), encoding.clone(), *rows, *excluded),
                FileStatus::Empty { encoding, excluded } => {
                    ("empty".to_string(), encoding.clone(), 0, *excluded)
                }
                FileStatus::Skipped { reason } => {
                    (format!("skipped: {reason}"), "-".to_string(), 0, 0)
                }
            };
            vec![
                file,
                district,
                status,
                encoding,
                rows.to_string(),
                excluded.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers(REPORT_HEADERS), &rows)
}

pub fn render_districts(districts: &DistrictTable) -> String {
    let rows = districts
        .rules()
        .iter()
        .enumerate()
        .map(|(idx, rule)| {
            vec![
                (idx + 1).to_string(),
                rule.name.clone(),
                rule.keywords.join(","),
                format!("{:?}", rule.cleanup),
                format!("{:?}", rule.coordinates),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers(DISTRICT_HEADERS), &rows)
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Aligns `rows` under `headers` with a two-space gutter. Cells beyond the
/// header count are dropped; trailing padding is trimmed from every line.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));

    let rule_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();
    let rule_cells = rule_widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule_cells, &rule_widths));

    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let sanitized = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&sanitized));
            let mut cell = sanitized.into_owned();
            cell.push_str(&" ".repeat(padding));
            cell
        })
        .collect::<Vec<_>>();
    cells.join("  ").trim_end_matches(' ').to_string()
}

/// Terminal columns occupied by `ch`. Hangul and CJK ideographs render two
/// columns wide in a monospace terminal.
fn char_width(ch: char) -> usize {
    match ch as u32 {
        0x1100..=0x115F | 0x2E80..=0x303E | 0x3041..=0x33FF | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF | 0xA960..=0xA97F | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
        | 0xFF01..=0xFF60 | 0xFFE0..=0xFFE6 => 2,
        _ => 1,
    }
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip to the end of the SGR sequence.
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += char_width(ch);
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
