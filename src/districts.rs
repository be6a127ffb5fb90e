//! Declarative district table.
//!
//! Every district-specific decision in the pipeline (file-name inference,
//! locality sampling, region-code parsing, corrupted-source cleanup, and
//! coordinate trust) is looked up here by rule instead of being spelled out
//! as a branch in the classifier or reconstructor. Table order is
//! significant: all "first match wins" lookups walk it front to back.

use serde::{Deserialize, Serialize};

/// Cleanup pass applied to address-only sources whose text arrives garbled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupStrategy {
    #[default]
    None,
    /// Keep only digits and separators, then rebuild a synthetic address
    /// around the surviving numbers.
    DigitResidue,
}

/// Whether coordinates reported by a district's sources can be taken as-is.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinatePolicy {
    #[default]
    Trusted,
    /// Out-of-bounds coordinates are downgraded to unknown at ingest.
    BoundingBox,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistrictRule {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub cleanup: CleanupStrategy,
    #[serde(default)]
    pub coordinates: CoordinatePolicy,
}

impl DistrictRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            cleanup: CleanupStrategy::None,
            coordinates: CoordinatePolicy::Trusted,
        }
    }

    pub fn with_cleanup(mut self, cleanup: CleanupStrategy) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn with_coordinates(mut self, coordinates: CoordinatePolicy) -> Self {
        self.coordinates = coordinates;
        self
    }

    pub fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && text.contains(keyword.as_str()))
    }

    /// Short locality stem used when synthesizing sub-area names (`구로` -> `구로3동`).
    pub fn stem(&self) -> &str {
        self.keywords
            .first()
            .map(|k| k.as_str())
            .unwrap_or(self.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DistrictTable {
    rules: Vec<DistrictRule>,
}

impl Default for DistrictTable {
    fn default() -> Self {
        Self::seoul()
    }
}

impl DistrictTable {
    /// The 25 Seoul districts, in the order source files are matched against.
    pub fn seoul() -> Self {
        let rules = vec![
            DistrictRule::new("송파구", &["송파"]),
            DistrictRule::new("마포구", &["마포"]),
            DistrictRule::new("도봉구", &["도봉"]),
            DistrictRule::new("노원구", &["노원"]),
            DistrictRule::new("구로구", &["구로"]).with_cleanup(CleanupStrategy::DigitResidue),
            DistrictRule::new("광진구", &["광진"]),
            DistrictRule::new("관악구", &["관악"]),
            DistrictRule::new("강북구", &["강북"]),
            DistrictRule::new("강동구", &["강동"]),
            DistrictRule::new("강남구", &["강남"]),
            DistrictRule::new("강서구", &["강서"]),
            DistrictRule::new("금천구", &["금천"]).with_coordinates(CoordinatePolicy::BoundingBox),
            DistrictRule::new("동대문구", &["동대문"]),
            DistrictRule::new("동작구", &["동작"]),
            DistrictRule::new("서대문구", &["서대문"]),
            DistrictRule::new("서초구", &["서초"]),
            DistrictRule::new("성동구", &["성동"]),
            DistrictRule::new("성북구", &["성북"]),
            DistrictRule::new("양천구", &["양천"]),
            DistrictRule::new("영등포구", &["영등포"]),
            DistrictRule::new("용산구", &["용산"]),
            DistrictRule::new("은평구", &["은평"]),
            DistrictRule::new("종로구", &["종로"]),
            DistrictRule::new("중구", &["중구"]),
            DistrictRule::new("중랑구", &["중랑"]),
        ];
        Self { rules }
    }

    pub fn rules(&self) -> &[DistrictRule] {
        &self.rules
    }

    pub fn by_name(&self, name: &str) -> Option<&DistrictRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// District whose full name appears in `file_name`.
    pub fn infer_from_file_name(&self, file_name: &str) -> Option<&DistrictRule> {
        self.rules
            .iter()
            .find(|rule| file_name.contains(rule.name.as_str()))
    }

    /// First district any of whose locality keywords occurs in `text`.
    pub fn match_locality(&self, text: &str) -> Option<&DistrictRule> {
        self.rules.iter().find(|rule| rule.matches(text))
    }

    pub fn contains_locality(&self, text: &str) -> bool {
        self.match_locality(text).is_some()
    }

    /// Removes every full district name from `text` so that it can be
    /// prefixed with a district without doubling it.
    pub fn strip_names(&self, text: &str) -> String {
        let mut stripped = text.to_string();
        // Longest names first so `동대문구` is not split by a shorter rule.
        let mut names = self.rules.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        names.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));
        for name in names {
            if !name.is_empty() {
                stripped = stripped.replace(name, "");
            }
        }
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Locality stems of every rule, in table order.
    pub fn stems(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.stem())
    }
}
