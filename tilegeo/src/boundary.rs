//! Administrative boundary checks.
//!
//! [`BoundaryGate`] answers country, region and district containment by
//! delegating polygon tests to the [`QueryBackend`]. Country checks for the
//! supported country are pre-gated by a cheap bounding-box test, so
//! obviously-outside points never reach the backend.

use crate::backend::{BackendError, BoundaryLayer, QueryBackend};
use crate::geo::BoundingBox;
use crate::label::Label;
use serde::Serialize;

/// Country containing a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryInfo {
    pub iso_code: String,
    pub name: Label,
}

/// District and region labels for a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<Label>,
    pub region: Label,
}

/// Administrative hierarchy of a point, from country down to district.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminHierarchy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CountryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<Label>,
}

/// Country, region and district containment.
#[derive(Debug, Clone)]
pub struct BoundaryGate {
    iso_code: String,
    country_bbox: BoundingBox,
}

impl BoundaryGate {
    /// Creates a gate for the supported country.
    pub fn new(iso_code: impl Into<String>, country_bbox: BoundingBox) -> Self {
        Self {
            iso_code: iso_code.into().to_ascii_uppercase(),
            country_bbox,
        }
    }

    pub fn iso_code(&self) -> &str {
        &self.iso_code
    }

    pub fn country_bbox(&self) -> &BoundingBox {
        &self.country_bbox
    }

    /// Returns true if the point lies in country `iso_code`.
    ///
    /// For the supported country, points outside its bounding box return
    /// false without a backend call.
    pub async fn country_contains<B: QueryBackend>(
        &self,
        backend: &B,
        lat: f64,
        lon: f64,
        iso_code: &str,
    ) -> Result<bool, BackendError> {
        if iso_code.eq_ignore_ascii_case(&self.iso_code) && !self.country_bbox.contains(lat, lon) {
            return Ok(false);
        }
        let feature = backend
            .boundary_lookup(BoundaryLayer::World, lat, lon)
            .await?;
        Ok(feature
            .and_then(|f| f.iso_code)
            .is_some_and(|code| code.eq_ignore_ascii_case(iso_code)))
    }

    /// Region polygon containing the point.
    pub async fn region_containing<B: QueryBackend>(
        &self,
        backend: &B,
        lat: f64,
        lon: f64,
    ) -> Result<Option<Label>, BackendError> {
        if !self.country_bbox.contains(lat, lon) {
            return Ok(None);
        }
        let feature = backend
            .boundary_lookup(BoundaryLayer::Regions, lat, lon)
            .await?;
        Ok(feature.map(|f| f.name))
    }

    /// District polygon containing the point, with its region.
    ///
    /// Falls back to region-only when no district contains the point.
    pub async fn district_containing<B: QueryBackend>(
        &self,
        backend: &B,
        lat: f64,
        lon: f64,
    ) -> Result<Option<DistrictInfo>, BackendError> {
        if !self.country_bbox.contains(lat, lon) {
            return Ok(None);
        }
        let district = backend
            .boundary_lookup(BoundaryLayer::Districts, lat, lon)
            .await?;

        match district {
            Some(feature) => {
                let region = match feature.parent {
                    Some(parent) => parent,
                    None => self
                        .region_containing(backend, lat, lon)
                        .await?
                        .unwrap_or_default(),
                };
                Ok(Some(DistrictInfo {
                    district: Some(feature.name),
                    region,
                }))
            }
            None => Ok(self
                .region_containing(backend, lat, lon)
                .await?
                .map(|region| DistrictInfo {
                    district: None,
                    region,
                })),
        }
    }

    /// Country containing the point, from the world layer.
    pub async fn country_of<B: QueryBackend>(
        &self,
        backend: &B,
        lat: f64,
        lon: f64,
    ) -> Result<Option<CountryInfo>, BackendError> {
        let feature = backend
            .boundary_lookup(BoundaryLayer::World, lat, lon)
            .await?;
        Ok(feature.and_then(|f| {
            f.iso_code.map(|iso| CountryInfo {
                iso_code: iso.to_ascii_uppercase(),
                name: f.name,
            })
        }))
    }

    /// Country, region and district of the point.
    ///
    /// Region and district are resolved only inside the supported country.
    pub async fn hierarchy<B: QueryBackend>(
        &self,
        backend: &B,
        lat: f64,
        lon: f64,
    ) -> Result<AdminHierarchy, BackendError> {
        let country = self.country_of(backend, lat, lon).await?;
        let in_supported = country
            .as_ref()
            .is_some_and(|c| c.iso_code == self.iso_code);
        if !in_supported {
            return Ok(AdminHierarchy {
                country,
                ..Default::default()
            });
        }

        let district = self.district_containing(backend, lat, lon).await?;
        Ok(match district {
            Some(info) => AdminHierarchy {
                country,
                region: (!info.region.is_empty()).then_some(info.region),
                district: info.district,
            },
            None => AdminHierarchy {
                country,
                ..Default::default()
            },
        })
    }
}
