//! Column role inference.
//!
//! Roles are assigned in three passes over a [`RawTable`]:
//!
//! 1. **Header keywords**: case-insensitive keyword sets per role.
//! 2. **Content sampling**: anonymous headers (digits, a single letter,
//!    blank, or `Unnamed: N`) whose first rows carry district locality tokens
//!    become the region-code column.
//! 3. **Positional fallback**: with three or more columns and still no
//!    address, column 1 is tested for locality tokens (region code) and
//!    column 2 for street-shaped tokens (address).
//!
//! Each pass only reads the table, so classifying the same table twice
//! always yields the same [`ColumnRoles`].

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::{districts::DistrictTable, io_utils::RawTable};

const LATITUDE_KEYWORDS: &[&str] = &["위도", "latitude", "lat"];
const LONGITUDE_KEYWORDS: &[&str] = &["경도", "longitude", "lng", "lon"];
const ADDRESS_KEYWORDS: &[&str] = &["주소", "address", "소재지", "위치"];
const ADDRESS_SHAPE_TOKENS: &[&str] = &["로", "길", "-"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Latitude,
    Longitude,
    Address,
    RegionCode,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Latitude => "latitude",
            Role::Longitude => "longitude",
            Role::Address => "address",
            Role::RegionCode => "region_code",
        };
        f.write_str(label)
    }
}

/// Positional column index per role. Each role is held by at most one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRoles {
    pub latitude: Option<usize>,
    pub longitude: Option<usize>,
    pub address: Option<usize>,
    pub region_code: Option<usize>,
}

impl ColumnRoles {
    pub fn get(&self, role: Role) -> Option<usize> {
        match role {
            Role::Latitude => self.latitude,
            Role::Longitude => self.longitude,
            Role::Address => self.address,
            Role::RegionCode => self.region_code,
        }
    }

    pub fn role_of(&self, column: usize) -> Option<Role> {
        [
            Role::Latitude,
            Role::Longitude,
            Role::Address,
            Role::RegionCode,
        ]
        .into_iter()
        .find(|role| self.get(*role) == Some(column))
    }

    pub fn is_assigned(&self, column: usize) -> bool {
        self.role_of(column).is_some()
    }

    /// True when some address can be derived from these roles.
    pub fn has_address_source(&self) -> bool {
        self.address.is_some() || self.region_code.is_some()
    }

    fn slot(&mut self, role: Role) -> &mut Option<usize> {
        match role {
            Role::Latitude => &mut self.latitude,
            Role::Longitude => &mut self.longitude,
            Role::Address => &mut self.address,
            Role::RegionCode => &mut self.region_code,
        }
    }

    /// Assigns `role` to `column` unless either is already taken.
    fn claim(&mut self, role: Role, column: usize) -> bool {
        if self.get(role).is_some() || self.is_assigned(column) {
            return false;
        }
        *self.slot(role) = Some(column);
        true
    }
}

#[derive(Debug, Clone)]
pub struct RoleClassifier<'a> {
    districts: &'a DistrictTable,
    sample_rows: usize,
}

impl<'a> RoleClassifier<'a> {
    pub fn new(districts: &'a DistrictTable, sample_rows: usize) -> Self {
        Self {
            districts,
            sample_rows,
        }
    }

    pub fn classify(&self, table: &RawTable) -> ColumnRoles {
        let mut roles = ColumnRoles::default();

        for (idx, header) in table.headers.iter().enumerate() {
            if let Some(role) = header_role(header) {
                roles.claim(role, idx);
            }
        }

        if roles.address.is_none() && roles.region_code.is_none() {
            for (idx, header) in table.headers.iter().enumerate() {
                if roles.is_assigned(idx) || !is_anonymous_header(header) {
                    continue;
                }
                if self.sample_has_locality(table, idx) {
                    roles.claim(Role::RegionCode, idx);
                    break;
                }
            }
        }

        if table.width() >= 3 && roles.address.is_none() {
            if roles.region_code.is_none() && self.sample_has_locality(table, 1) {
                roles.claim(Role::RegionCode, 1);
            }
            if self.sample_has_address_shape(table, 2) {
                roles.claim(Role::Address, 2);
            }
        }

        debug!(
            "Column roles: lat={:?} lng={:?} address={:?} region={:?}",
            roles.latitude, roles.longitude, roles.address, roles.region_code
        );
        roles
    }

    fn sample_has_locality(&self, table: &RawTable, column: usize) -> bool {
        table
            .sample(column, self.sample_rows)
            .any(|value| self.districts.contains_locality(value))
    }

    fn sample_has_address_shape(&self, table: &RawTable, column: usize) -> bool {
        table
            .sample(column, self.sample_rows)
            .any(|value| ADDRESS_SHAPE_TOKENS.iter().any(|token| value.contains(token)))
    }
}

/// Role implied by a header's text alone.
pub fn header_role(header: &str) -> Option<Role> {
    let lowered = header.trim().to_lowercase();
    if lowered == "y" || LATITUDE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Some(Role::Latitude)
    } else if lowered == "x" || LONGITUDE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Some(Role::Longitude)
    } else if ADDRESS_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Some(Role::Address)
    } else {
        None
    }
}

/// Headers that carry no meaning of their own: numeric indices, spreadsheet
/// column letters, blanks, and pandas-style `Unnamed: N` placeholders.
pub fn is_anonymous_header(header: &str) -> bool {
    let trimmed = header.trim();
    if trimmed.is_empty() {
        return true;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_ascii_alphabetic();
    }
    trimmed.to_ascii_lowercase().starts_with("unnamed")
}
