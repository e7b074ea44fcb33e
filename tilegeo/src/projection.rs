//! Column projection by detail level.
//!
//! Each [`DetailLevel`] maps to a fixed, monotonically growing set of
//! [`Column`]s. The orchestrator passes the set to the backend so that only
//! the needed columns are transferred and decoded.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named column of the address partition files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Longitude,
    Latitude,
    HouseNumber,
    StreetAr,
    StreetEn,
    Postcode,
    DistrictAr,
    DistrictEn,
    City,
    GovernorateAr,
    GovernorateEn,
    RegionAr,
    RegionEn,
    FullAddressAr,
    FullAddressEn,
}

impl Column {
    /// Every column, in storage order.
    pub const ALL: [Column; 16] = [
        Column::Id,
        Column::Longitude,
        Column::Latitude,
        Column::HouseNumber,
        Column::StreetAr,
        Column::StreetEn,
        Column::Postcode,
        Column::DistrictAr,
        Column::DistrictEn,
        Column::City,
        Column::GovernorateAr,
        Column::GovernorateEn,
        Column::RegionAr,
        Column::RegionEn,
        Column::FullAddressAr,
        Column::FullAddressEn,
    ];

    /// Physical column name in the partition files.
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Longitude => "longitude",
            Column::Latitude => "latitude",
            Column::HouseNumber => "house_number",
            Column::StreetAr => "street_ar",
            Column::StreetEn => "street_en",
            Column::Postcode => "postcode",
            Column::DistrictAr => "district_ar",
            Column::DistrictEn => "district_en",
            Column::City => "city",
            Column::GovernorateAr => "governorate_ar",
            Column::GovernorateEn => "governorate_en",
            Column::RegionAr => "region_ar",
            Column::RegionEn => "region_en",
            Column::FullAddressAr => "full_address_ar",
            Column::FullAddressEn => "full_address_en",
        }
    }

    /// Looks up a column by its physical name.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Returns true for the coordinate columns, which are stored as floats.
    pub fn is_numeric(self) -> bool {
        matches!(self, Column::Longitude | Column::Latitude)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much per-record data a query returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Identifier and coordinates only.
    Minimal,
    /// Minimal plus postcode and region labels.
    Postcode,
    /// Postcode plus district and city labels.
    Region,
    /// Every stored column.
    #[default]
    Full,
}

const MINIMAL: &[Column] = &[Column::Id, Column::Longitude, Column::Latitude];

const POSTCODE: &[Column] = &[
    Column::Id,
    Column::Longitude,
    Column::Latitude,
    Column::Postcode,
    Column::RegionAr,
    Column::RegionEn,
];

const REGION: &[Column] = &[
    Column::Id,
    Column::Longitude,
    Column::Latitude,
    Column::Postcode,
    Column::DistrictAr,
    Column::DistrictEn,
    Column::City,
    Column::RegionAr,
    Column::RegionEn,
];

impl DetailLevel {
    /// Columns projected for this level.
    pub fn columns(self) -> &'static [Column] {
        match self {
            DetailLevel::Minimal => MINIMAL,
            DetailLevel::Postcode => POSTCODE,
            DetailLevel::Region => REGION,
            DetailLevel::Full => &Column::ALL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DetailLevel::Minimal => "minimal",
            DetailLevel::Postcode => "postcode",
            DetailLevel::Region => "region",
            DetailLevel::Full => "full",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(DetailLevel::Minimal),
            "postcode" => Ok(DetailLevel::Postcode),
            "region" => Ok(DetailLevel::Region),
            "full" => Ok(DetailLevel::Full),
            other => Err(format!(
                "unknown detail level '{}' (expected minimal, postcode, region or full)",
                other
            )),
        }
    }
}

/// Columns for `level`, extended with any extra columns a query needs for
/// filtering or ordering. The result keeps storage order and has no
/// duplicates.
pub fn project(level: DetailLevel, extra: &[Column]) -> Vec<Column> {
    let base = level.columns();
    Column::ALL
        .iter()
        .copied()
        .filter(|c| base.contains(c) || extra.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn set(level: DetailLevel) -> HashSet<Column> {
        level.columns().iter().copied().collect()
    }

    #[test]
    fn test_minimal_is_three_fields() {
        assert_eq!(
            DetailLevel::Minimal.columns(),
            &[Column::Id, Column::Longitude, Column::Latitude]
        );
    }

    #[test]
    fn test_levels_are_strict_supersets() {
        let minimal = set(DetailLevel::Minimal);
        let postcode = set(DetailLevel::Postcode);
        let region = set(DetailLevel::Region);
        let full = set(DetailLevel::Full);

        assert!(minimal.is_subset(&postcode) && minimal != postcode);
        assert!(postcode.is_subset(&region) && postcode != region);
        assert!(region.is_subset(&full) && region != full);
        assert_eq!(full.len(), 16);
    }

    #[test]
    fn test_project_adds_extra_without_duplicates() {
        let cols = project(DetailLevel::Minimal, &[Column::FullAddressEn, Column::Id]);
        assert_eq!(
            cols,
            vec![
                Column::Id,
                Column::Longitude,
                Column::Latitude,
                Column::FullAddressEn
            ]
        );
    }

    #[test]
    fn test_detail_level_parse() {
        assert_eq!("MINIMAL".parse::<DetailLevel>(), Ok(DetailLevel::Minimal));
        assert_eq!("region".parse::<DetailLevel>(), Ok(DetailLevel::Region));
        assert!("everything".parse::<DetailLevel>().is_err());
    }

    #[test]
    fn test_column_name_lookup() {
        for col in Column::ALL {
            assert_eq!(Column::from_name(col.name()), Some(col));
        }
        assert_eq!(Column::from_name("nope"), None);
    }
}
