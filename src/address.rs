//! Address reconstruction.
//!
//! Produces one best-effort address per table row from whatever combination
//! of address and region-code columns the classifier found:
//!
//! | roles available         | result                                                |
//! |-------------------------|-------------------------------------------------------|
//! | address only            | the address cell, or a digit-residue rebuild for      |
//! |                         | districts whose sources arrive garbled                |
//! | region code, district   | `city district region` with duplicated names removed  |
//! | region code, no district| the region cell as-is                                 |
//! | both                    | `city district address`, or `city district sub-area`  |
//! |                         | when the address cell is blank                        |
//! | neither                 | every row excluded                                    |
//!
//! A `None` entry marks a row that has to be excluded.

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info};
use regex::Regex;

use crate::{
    districts::{CleanupStrategy, DistrictRule, DistrictTable},
    io_utils::RawTable,
    roles::ColumnRoles,
};

const ABSENT_MARKERS: &[&str] = &["nan", "none", "null"];

/// True for blank cells and the textual stand-ins exporters write for them.
pub fn is_absent(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || ABSENT_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

fn is_hangul_syllable(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

/// Trims a reconstructed address, rejecting empty and absent results.
pub fn finalize(address: &str) -> Option<String> {
    if is_absent(address) {
        None
    } else {
        Some(address.trim().to_string())
    }
}

fn join_parts<'p>(parts: impl IntoIterator<Item = &'p str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .join(" ")
}

pub struct AddressReconstructor<'a> {
    city: &'a str,
    districts: &'a DistrictTable,
    sample_rows: usize,
    leading_index: Regex,
    subarea: Regex,
    unexpected_char: Regex,
    non_residue: Regex,
}

impl<'a> AddressReconstructor<'a> {
    pub fn new(city: &'a str, districts: &'a DistrictTable, sample_rows: usize) -> Result<Self> {
        let stems = districts
            .stems()
            .filter(|stem| !stem.is_empty())
            .map(regex::escape)
            .join("|");
        let subarea = Regex::new(&format!(r"(?:{stems})\d+동"))
            .context("Building sub-area pattern from district table")?;
        Ok(Self {
            city,
            districts,
            sample_rows,
            leading_index: Regex::new(r"^\s*\d+[\s\-_.]*")?,
            subarea,
            unexpected_char: Regex::new(r"[^\w\s\-.,()\[\]{}?!/:;@#$%&*=+가-힣]")?,
            non_residue: Regex::new(r"[^0-9\-.]+")?,
        })
    }

    pub fn reconstruct(
        &self,
        table: &RawTable,
        roles: &ColumnRoles,
        district: Option<&DistrictRule>,
    ) -> Vec<Option<String>> {
        match (roles.address, roles.region_code) {
            (Some(address), None) => self.from_address(table, address, district),
            (None, Some(region)) => self.from_region(table, region, district),
            (Some(address), Some(region)) => self.from_both(table, address, region, district),
            (None, None) => vec![None; table.len()],
        }
    }

    fn from_address(
        &self,
        table: &RawTable,
        column: usize,
        district: Option<&DistrictRule>,
    ) -> Vec<Option<String>> {
        let cleanup = district
            .filter(|rule| rule.cleanup == CleanupStrategy::DigitResidue)
            .filter(|_| self.looks_corrupted(table, column));
        if let Some(rule) = cleanup {
            info!(
                "Address text for {} looks garbled; rebuilding from digits",
                rule.name
            );
        }
        table
            .rows
            .iter()
            .map(|row| {
                let value = row.get(column).map(|s| s.as_str()).unwrap_or("");
                match cleanup {
                    Some(rule) => Some(self.digit_residue(value, rule)),
                    None if is_absent(value) => None,
                    None => Some(value.to_string()),
                }
            })
            .collect()
    }

    fn from_region(
        &self,
        table: &RawTable,
        column: usize,
        district: Option<&DistrictRule>,
    ) -> Vec<Option<String>> {
        table
            .rows
            .iter()
            .map(|row| {
                let value = row.get(column).map(|s| s.as_str()).unwrap_or("");
                if is_absent(value) {
                    return None;
                }
                match district {
                    Some(rule) => {
                        let local = self.strip_index(value);
                        let local = self.districts.strip_names(&local);
                        Some(join_parts([self.city, rule.name.as_str(), local.as_str()]))
                    }
                    None => Some(value.to_string()),
                }
            })
            .collect()
    }

    fn from_both(
        &self,
        table: &RawTable,
        address: usize,
        region: usize,
        district: Option<&DistrictRule>,
    ) -> Vec<Option<String>> {
        table
            .rows
            .iter()
            .map(|row| {
                let region_value = row.get(region).map(|s| s.as_str()).unwrap_or("");
                let address_value = row.get(address).map(|s| s.as_str()).unwrap_or("");
                let region_absent = is_absent(region_value);
                if region_absent && is_absent(address_value) {
                    return None;
                }
                let district_name = self
                    .districts
                    .match_locality(region_value)
                    .or(district)
                    .map(|rule| rule.name.as_str())
                    .unwrap_or("");
                if !is_absent(address_value) {
                    Some(join_parts([self.city, district_name, address_value]))
                } else {
                    let subarea = self.extract_subarea(region_value);
                    Some(join_parts([self.city, district_name, subarea.as_str()]))
                }
            })
            .collect()
    }

    /// Normalized sub-area (`194구로3동` -> `구로3동`). Falls back to the
    /// region text without its leading index when no pattern matches.
    pub fn extract_subarea(&self, region: &str) -> String {
        let stripped = self.strip_index(region);
        match self.subarea.find(&stripped) {
            Some(found) => found.as_str().to_string(),
            None => stripped,
        }
    }

    fn strip_index(&self, region: &str) -> String {
        self.leading_index
            .replace(region.trim(), "")
            .trim()
            .to_string()
    }

    /// A sample is garbled when any value holds characters outside the
    /// printable/Hangul set, or when no value holds any Hangul at all.
    pub fn looks_corrupted(&self, table: &RawTable, column: usize) -> bool {
        let samples = table.sample(column, self.sample_rows).collect::<Vec<_>>();
        let foreign = samples
            .iter()
            .any(|value| self.unexpected_char.is_match(value));
        let no_hangul = samples
            .iter()
            .all(|value| !value.chars().any(is_hangul_syllable));
        debug!("Corruption check: foreign={foreign} no_hangul={no_hangul}");
        foreign || no_hangul
    }

    /// Rebuilds `city district [stemN동] digits` from whatever digits and
    /// separators survived the garbling.
    pub fn digit_residue(&self, value: &str, rule: &DistrictRule) -> String {
        let replaced = self.non_residue.replace_all(value, " ");
        let residue = replaced.trim();
        if !residue.chars().any(|c| c.is_ascii_digit()) {
            return join_parts([self.city, rule.name.as_str()]);
        }
        let lead = residue.chars().next().filter(|c| ('1'..='9').contains(c));
        match lead {
            Some(n) => {
                let subarea = format!("{}{n}동", rule.stem());
                join_parts([self.city, rule.name.as_str(), subarea.as_str(), residue])
            }
            None => join_parts([self.city, rule.name.as_str(), residue]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITY: &str = "서울특별시";

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn region_only_with_known_district() {
        let districts = DistrictTable::seoul();
        let builder = AddressReconstructor::new(CITY, &districts, 5).expect("builder");
        let roles = ColumnRoles {
            region_code: Some(0),
            ..ColumnRoles::default()
        };
        let rows = builder.reconstruct(
            &table(&["1"], &[&["194구로3동"], &["195-구로구 개봉1동"], &[""]]),
            &roles,
            districts.by_name("구로구"),
        );
        assert_eq!(
            rows,
            vec![
                Some("서울특별시 구로구 구로3동".to_string()),
                Some("서울특별시 구로구 개봉1동".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn region_only_without_district_is_verbatim() {
        let districts = DistrictTable::seoul();
        let builder = AddressReconstructor::new(CITY, &districts, 5).expect("builder");
        let roles = ColumnRoles {
            region_code: Some(0),
            ..ColumnRoles::default()
        };
        let rows = builder.reconstruct(&table(&["1"], &[&["194구로3동"]]), &roles, None);
        assert_eq!(rows, vec![Some("194구로3동".to_string())]);
    }

    #[test]
    fn both_columns_prefer_address_then_subarea() {
        let districts = DistrictTable::seoul();
        let builder = AddressReconstructor::new(CITY, &districts, 5).expect("builder");
        let roles = ColumnRoles {
            region_code: Some(0),
            address: Some(1),
            ..ColumnRoles::default()
        };
        let rows = builder.reconstruct(
            &table(
                &["region", "address"],
                &[
                    &["12마포2동", "독막로 10"],
                    &["194구로3동", "nan"],
                    &["77알수없음", ""],
                    &["", ""],
                ],
            ),
            &roles,
            districts.by_name("강서구"),
        );
        assert_eq!(
            rows,
            vec![
                Some("서울특별시 마포구 독막로 10".to_string()),
                Some("서울특별시 구로구 구로3동".to_string()),
                Some("서울특별시 강서구 알수없음".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn clean_address_only_source_is_verbatim() {
        let districts = DistrictTable::seoul();
        let builder = AddressReconstructor::new(CITY, &districts, 5).expect("builder");
        let roles = ColumnRoles {
            address: Some(0),
            ..ColumnRoles::default()
        };
        let rows = builder.reconstruct(
            &table(&["주소"], &[&["서울특별시 구로구 경인로 20"], &["None"]]),
            &roles,
            districts.by_name("구로구"),
        );
        assert_eq!(
            rows,
            vec![Some("서울특별시 구로구 경인로 20".to_string()), None]
        );
    }

    #[test]
    fn garbled_source_is_rebuilt_from_digits() {
        let districts = DistrictTable::seoul();
        let builder = AddressReconstructor::new(CITY, &districts, 5).expect("builder");
        let roles = ColumnRoles {
            address: Some(0),
            ..ColumnRoles::default()
        };
        let garbled = table(
            &["address"],
            &[
                &["±¸·Î3µ¿ 12-4"],
                &["¼­¿ï"],
                &["±¸·Î 0.5"],
                &["±¸·Î-µ¿."],
            ],
        );
        assert!(builder.looks_corrupted(&garbled, 0));
        let rows = builder.reconstruct(&garbled, &roles, districts.by_name("구로구"));
        assert_eq!(
            rows,
            vec![
                Some("서울특별시 구로구 구로3동 3 12-4".to_string()),
                Some("서울특별시 구로구".to_string()),
                Some("서울특별시 구로구 0.5".to_string()),
                Some("서울특별시 구로구".to_string()),
            ]
        );
    }

    #[test]
    fn cleanup_is_limited_to_flagged_districts() {
        let districts = DistrictTable::seoul();
        let builder = AddressReconstructor::new(CITY, &districts, 5).expect("builder");
        let roles = ColumnRoles {
            address: Some(0),
            ..ColumnRoles::default()
        };
        let rows = builder.reconstruct(
            &table(&["address"], &[&["Main St 12"]]),
            &roles,
            districts.by_name("마포구"),
        );
        assert_eq!(rows, vec![Some("Main St 12".to_string())]);
    }

    #[test]
    fn no_address_roles_excludes_every_row() {
        let districts = DistrictTable::seoul();
        let builder = AddressReconstructor::new(CITY, &districts, 5).expect("builder");
        let rows = builder.reconstruct(
            &table(&["lat"], &[&["37.5"], &["37.6"]]),
            &ColumnRoles::default(),
            None,
        );
        assert_eq!(rows, vec![None, None]);
    }

    #[test]
    fn finalize_rejects_blank_and_markers() {
        assert_eq!(finalize("  "), None);
        assert_eq!(finalize("NaN"), None);
        assert_eq!(finalize(" 구로3동 "), Some("구로3동".to_string()));
    }

    #[test]
    fn subarea_extraction_strips_index() {
        let districts = DistrictTable::seoul();
        let builder = AddressReconstructor::new(CITY, &districts, 5).expect("builder");
        assert_eq!(builder.extract_subarea("194구로3동"), "구로3동");
        assert_eq!(builder.extract_subarea("194-구로3동"), "구로3동");
        assert_eq!(builder.extract_subarea("3 신도림동"), "신도림동");
    }
}
