//! Common types and utilities shared across CLI commands.

use clap::Args;
use serde::Serialize;
use tilegeo::backend::AddressRecord;
use tilegeo::geo::BoundingBox;
use tilegeo::projection::DetailLevel;
use tilegeo::service::{GeocodeResult, Language, QueryOptions};

use crate::error::CliError;

/// Options shared by every address query.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Returned fields: minimal, postcode, region or full
    #[arg(long, default_value = "full", value_parser = parse_detail)]
    pub detail: DetailLevel,

    /// Restrict to a box given as minLat,minLon,maxLat,maxLon
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    pub bbox: Option<BoundingBox>,

    /// Restrict to a region, by Arabic or English name
    #[arg(long)]
    pub region: Option<String>,

    /// Language for ordering and display: ar or en
    #[arg(long, default_value = "ar", value_parser = parse_language)]
    pub lang: Language,
}

impl QueryArgs {
    pub fn to_options(&self) -> QueryOptions {
        let mut opts = QueryOptions::new()
            .with_detail_level(self.detail)
            .with_language(self.lang);
        if let Some(limit) = self.limit {
            opts = opts.with_limit(limit);
        }
        if let Some(bbox) = self.bbox {
            opts = opts.with_bbox(bbox);
        }
        if let Some(region) = &self.region {
            opts = opts.with_region(region.clone());
        }
        opts
    }
}

fn parse_detail(s: &str) -> Result<DetailLevel, String> {
    s.parse()
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

/// Parses `minLat,minLon,maxLat,maxLon`.
pub fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", v.trim()))
        })
        .collect::<Result<_, _>>()?;
    let values: [f64; 4] = values
        .try_into()
        .map_err(|_| "expected four values: minLat,minLon,maxLat,maxLon".to_string())?;
    BoundingBox::from_lat_lon_array(values).map_err(|e| e.to_string())
}

/// Prints any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn address_label(record: &AddressRecord, lang: Language) -> &str {
    let (primary, secondary) = match lang {
        Language::Ar => (&record.full_address_ar, &record.full_address_en),
        Language::En => (&record.full_address_en, &record.full_address_ar),
    };
    primary
        .as_deref()
        .or(secondary.as_deref())
        .unwrap_or("-")
}

/// Prints a query result as a table, or as JSON.
pub fn print_result(result: &GeocodeResult, lang: Language, json: bool) -> Result<(), CliError> {
    if json {
        return print_json(result);
    }

    for warning in &result.warnings {
        eprintln!("Warning: {}", warning);
    }

    if result.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!(
        "{:<20} {:>10} {:>11} {:>10} {:>8}  ADDRESS",
        "ID", "LAT", "LON", "METRIC", "POSTCODE"
    );
    for record in &result.records {
        let metric = match (record.distance_m, record.score) {
            (Some(d), _) => format!("{:.0}m", d),
            (None, Some(s)) => format!("{:.3}", s),
            (None, None) => "-".to_string(),
        };
        println!(
            "{:<20} {:>10.5} {:>11.5} {:>10} {:>8}  {}",
            record.id,
            record.latitude,
            record.longitude,
            metric,
            record.postcode.as_deref().unwrap_or("-"),
            address_label(record, lang)
        );
    }
    if let Some(mode) = result.search_mode {
        println!();
        println!("{} result(s), {:?} search", result.len(), mode);
    } else {
        println!();
        println!("{} result(s)", result.len());
    }
    Ok(())
}
